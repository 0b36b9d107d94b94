//! Per-field text state kept by the [`InputValueStore`](crate::InputValueStore).

#[derive(Clone, Debug, Default)]
pub(crate) struct InputState {
    /// Current text value, single line.
    pub value: String,

    /// Caret as a byte index into `value`, always on a char boundary.
    pub caret: usize,
}

use input_core::InputId;
use serde::{Serialize, Serializer};

use crate::candidate::Candidate;

/// Something the user did with a bound field that the host should act on.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldEvent {
    #[serde(serialize_with = "raw_input")]
    pub input: InputId,
    pub kind: FieldEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum FieldEventKind {
    /// A row was activated; carries the full service record.
    Selected(Candidate),
    /// The "create new" row was activated with the field's text.
    SelectedNew { name: String },
    /// Enter was pressed without a row to activate.
    Submitted {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
}

fn raw_input<S: Serializer>(input: &InputId, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(input.as_raw())
}

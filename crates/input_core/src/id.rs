//! Opaque identifier for an editable text control.
//!
//! The host decides what the raw value means (a DOM node id, a widget index,
//! ...). The engine only uses it as a map key and never interprets it.

/// Identifies one text control inside an [`InputValueStore`](crate::InputValueStore).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputId(u64);

impl InputId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for InputId {
    #[inline]
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<u32> for InputId {
    #[inline]
    fn from(raw: u32) -> Self {
        Self::from_raw(raw as u64)
    }
}

impl std::fmt::Display for InputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "input#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_raw_value() {
        assert_eq!(InputId::from_raw(7).to_string(), "input#7");
    }

    #[test]
    fn ids_order_by_raw_value() {
        let mut ids = vec![InputId::from(3u32), InputId::from(1u64), InputId::from(2u32)];
        ids.sort();
        assert_eq!(
            ids.iter().map(|id| id.as_raw()).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}

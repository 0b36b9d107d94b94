pub type RequestId = u64;

/// What a network request is fetching on behalf of the suggestion engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Candidate list for a query (search or enumeration).
    Search,
    /// Flyout description text for an article id.
    Blurb,
    /// Flyout thumbnail fetch; only arrival matters, not the bytes.
    Thumbnail,
}

impl ResourceKind {
    /// Whether the response body is needed by the caller.
    ///
    /// Thumbnail fetches only need to know the request finished.
    pub fn wants_body(self) -> bool {
        !matches!(self, ResourceKind::Thumbnail)
    }
}

/// Keys the host forwards to a bound text field.
///
/// Printable input arrives as `Char`; everything else is named. Modifier-only
/// presses are forwarded as `Modifier` so they can be ignored explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Escape,
    Tab,
    Modifier,
}

impl Key {
    /// Returns `true` for keys that may change the field's text.
    pub fn edits_text(self) -> bool {
        matches!(self, Key::Char(_) | Key::Backspace | Key::Delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_editing_keys_edit_text() {
        assert!(Key::Char('a').edits_text());
        assert!(Key::Backspace.edits_text());
        assert!(Key::Delete.edits_text());
        for key in [
            Key::ArrowLeft,
            Key::ArrowUp,
            Key::Home,
            Key::Enter,
            Key::Escape,
            Key::Tab,
            Key::Modifier,
        ] {
            assert!(!key.edits_text(), "{key:?}");
        }
    }

    #[test]
    fn thumbnail_fetch_skips_body() {
        assert!(ResourceKind::Search.wants_body());
        assert!(ResourceKind::Blurb.wants_body());
        assert!(!ResourceKind::Thumbnail.wants_body());
    }
}

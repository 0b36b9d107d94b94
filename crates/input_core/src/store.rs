//! Text values and carets for the fields a suggestion engine is bound to.
//!
//! The store knows nothing about suggestions. It applies single-line edits and
//! reports whether the value actually changed, so callers can decide when a
//! keystroke counts as a text change.

use crate::id::InputId;
use crate::state::InputState;
use crate::text::{
    clamp_to_char_boundary, filter_single_line, next_cursor_boundary, prev_cursor_boundary,
};
use std::collections::HashMap;

/// Central store for single-line text fields.
///
/// ```
/// use input_core::{InputId, InputValueStore};
///
/// let mut store = InputValueStore::new();
/// let id = InputId::from_raw(1);
///
/// store.ensure_initial(id, " fi".to_string());
/// assert!(store.insert_text(id, "l"));
/// assert_eq!(store.get(id), Some(" fil"));
/// assert_eq!(store.trimmed(id), Some("fil"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InputValueStore {
    values: HashMap<InputId, InputState>,
}

impl InputValueStore {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Raw value, including surrounding whitespace.
    pub fn get(&self, id: InputId) -> Option<&str> {
        self.values.get(&id).map(|s| s.value.as_str())
    }

    /// Value with surrounding whitespace removed; this is what gets queried.
    pub fn trimmed(&self, id: InputId) -> Option<&str> {
        self.get(id).map(str::trim)
    }

    pub fn caret(&self, id: InputId) -> Option<usize> {
        self.values.get(&id).map(|s| s.caret)
    }

    /// Insert an entry with `initial` unless one exists already.
    pub fn ensure_initial(&mut self, id: InputId, initial: String) {
        self.values.entry(id).or_insert_with(|| {
            let caret = initial.len();
            InputState {
                value: initial,
                caret,
            }
        });
    }

    /// Overwrite the value and put the caret at the end.
    ///
    /// Returns `true` if the text differs from what was stored.
    pub fn set(&mut self, id: InputId, value: &str) -> bool {
        let value = filter_single_line(value);
        let st = self.values.entry(id).or_default();
        let changed = st.value != value;
        if changed {
            st.value = value.into_owned();
        }
        st.caret = st.value.len();
        changed
    }

    /// Forget a field entirely.
    pub fn remove(&mut self, id: InputId) {
        self.values.remove(&id);
    }

    /// Insert at the caret. Newlines are stripped.
    pub fn insert_text(&mut self, id: InputId, s: &str) -> bool {
        let s = filter_single_line(s);
        if s.is_empty() {
            return false;
        }
        let st = self.values.entry(id).or_default();
        let caret = clamp_to_char_boundary(&st.value, st.caret);
        st.value.insert_str(caret, &s);
        st.caret = caret + s.len();
        true
    }

    /// Delete the char before the caret.
    pub fn backspace(&mut self, id: InputId) -> bool {
        let Some(st) = self.values.get_mut(&id) else {
            return false;
        };
        let caret = clamp_to_char_boundary(&st.value, st.caret);
        if caret == 0 {
            st.caret = 0;
            return false;
        }
        let prev = prev_cursor_boundary(&st.value, caret);
        st.value.drain(prev..caret);
        st.caret = prev;
        true
    }

    /// Delete the char after the caret.
    pub fn delete(&mut self, id: InputId) -> bool {
        let Some(st) = self.values.get_mut(&id) else {
            return false;
        };
        let caret = clamp_to_char_boundary(&st.value, st.caret);
        if caret >= st.value.len() {
            return false;
        }
        let next = next_cursor_boundary(&st.value, caret);
        st.value.drain(caret..next);
        st.caret = caret;
        true
    }

    pub fn move_caret_left(&mut self, id: InputId) {
        if let Some(st) = self.values.get_mut(&id) {
            st.caret = prev_cursor_boundary(&st.value, st.caret);
        }
    }

    pub fn move_caret_right(&mut self, id: InputId) {
        if let Some(st) = self.values.get_mut(&id) {
            st.caret = next_cursor_boundary(&st.value, st.caret);
        }
    }

    pub fn move_caret_to_start(&mut self, id: InputId) {
        if let Some(st) = self.values.get_mut(&id) {
            st.caret = 0;
        }
    }

    pub fn move_caret_to_end(&mut self, id: InputId) {
        if let Some(st) = self.values.get_mut(&id) {
            st.caret = st.value.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_caret_on_char_boundary() {
        let mut store = InputValueStore::new();
        let id = InputId::from_raw(1);

        store.ensure_initial(id, String::new());
        assert!(store.insert_text(id, "€"));
        let v = store.get(id).unwrap();
        let caret = store.caret(id).unwrap();
        assert_eq!(caret, v.len());
        assert!(v.is_char_boundary(caret));
    }

    #[test]
    fn backspace_removes_whole_scalar_and_reports_change() {
        let mut store = InputValueStore::new();
        let id = InputId::from_raw(1);

        store.set(id, "a€");
        assert!(store.backspace(id));
        assert_eq!(store.get(id), Some("a"));
        assert!(store.backspace(id));
        assert!(!store.backspace(id));
        assert_eq!(store.get(id), Some(""));
    }

    #[test]
    fn delete_at_end_is_not_a_change() {
        let mut store = InputValueStore::new();
        let id = InputId::from_raw(1);

        store.set(id, "abc");
        assert!(!store.delete(id));
        assert_eq!(store.get(id), Some("abc"));

        store.move_caret_left(id);
        assert!(store.delete(id));
        assert_eq!(store.get(id), Some("ab"));
        assert_eq!(store.caret(id), Some(2));
    }

    #[test]
    fn caret_moves_leave_the_text_alone() {
        let mut store = InputValueStore::new();
        let id = InputId::from_raw(1);

        store.set(id, "hello");
        store.move_caret_to_start(id);
        store.move_caret_right(id);
        assert_eq!(store.caret(id), Some(1));
        store.move_caret_to_end(id);
        assert_eq!(store.get(id), Some("hello"));
        assert_eq!(store.caret(id), Some(5));
    }

    #[test]
    fn set_places_caret_at_end_and_detects_same_value() {
        let mut store = InputValueStore::new();
        let id = InputId::from_raw(1);

        assert!(store.set(id, "Film"));
        store.move_caret_to_start(id);
        assert!(!store.set(id, "Film"));
        assert_eq!(store.caret(id), Some(4));
    }

    #[test]
    fn insert_in_middle_and_strip_newlines() {
        let mut store = InputValueStore::new();
        let id = InputId::from_raw(1);

        store.set(id, "fm");
        store.move_caret_left(id);
        store.insert_text(id, "i\nl");
        assert_eq!(store.get(id), Some("film"));
        assert_eq!(store.caret(id), Some(3));
    }

    #[test]
    fn trimmed_ignores_surrounding_whitespace() {
        let mut store = InputValueStore::new();
        let id = InputId::from_raw(1);

        store.set(id, "  star wars ");
        assert_eq!(store.trimmed(id), Some("star wars"));
        assert_eq!(store.trimmed(InputId::from_raw(2)), None);
    }
}

//! UTF-8 helpers shared by the text store and the suggestion engine.
//!
//! All indices are byte offsets. Every function returns offsets that sit on a
//! char boundary of the string it was given.

use std::borrow::Cow;

/// Clamp `index` into `s` and walk it back onto a char boundary.
///
/// ```
/// use input_core::clamp_to_char_boundary;
///
/// let s = "né"; // 'é' is 2 bytes
/// assert_eq!(clamp_to_char_boundary(s, 2), 1);
/// assert_eq!(clamp_to_char_boundary(s, 9), 3);
/// ```
#[inline]
pub fn clamp_to_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Boundary of the char before `i`, or 0.
pub fn prev_cursor_boundary(s: &str, i: usize) -> usize {
    let i = clamp_to_char_boundary(s, i);
    s[..i].char_indices().next_back().map(|(idx, _)| idx).unwrap_or(0)
}

/// Boundary of the char after `i`, or `s.len()`.
pub fn next_cursor_boundary(s: &str, i: usize) -> usize {
    let i = clamp_to_char_boundary(s, i);
    match s[i..].chars().next() {
        Some(ch) => i + ch.len_utf8(),
        None => s.len(),
    }
}

/// Drop CR and LF so pasted text stays on one line.
///
/// ```
/// use input_core::filter_single_line;
///
/// assert_eq!(filter_single_line("Star\r\nWars"), "StarWars");
/// ```
pub fn filter_single_line(s: &str) -> Cow<'_, str> {
    if !s.contains(['\n', '\r']) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|c| *c != '\n' && *c != '\r').collect())
}

/// Number of chars in `s` once surrounding whitespace is removed.
///
/// Debounce timing is driven by this length, so it counts chars rather than
/// bytes.
pub fn trimmed_char_len(s: &str) -> usize {
    s.trim().chars().count()
}

/// Find the first case-insensitive occurrence of `needle` in `haystack`.
///
/// Returns the matching byte range in `haystack`. Comparison lowercases both
/// sides char by char, so the range stays valid even when lowercasing changes
/// byte lengths.
///
/// ```
/// use input_core::find_ignore_case;
///
/// assert_eq!(find_ignore_case("The Film", "fil"), Some((4, 7)));
/// assert_eq!(find_ignore_case("Film", "x"), None);
/// ```
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let wanted: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();

    for (start, _) in haystack.char_indices() {
        let mut matched = 0usize;
        for (offset, ch) in haystack[start..].char_indices() {
            for lower in ch.to_lowercase() {
                if wanted.get(matched) != Some(&lower) {
                    matched = usize::MAX;
                    break;
                }
                matched += 1;
            }
            if matched == usize::MAX {
                break;
            }
            if matched == wanted.len() {
                return Some((start, start + offset + ch.len_utf8()));
            }
        }
    }
    None
}

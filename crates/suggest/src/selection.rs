//! Highlight movement and viewport scrolling over overlay rows.
//!
//! `None` means no row is highlighted. In soft mode running off either end
//! clears the highlight; otherwise it wraps. Stepping back from "none" in soft
//! mode lands on the last row, stepping forward lands on the first.

/// Highlight after a step down. `None` with an empty list.
pub fn select_next(current: Option<usize>, len: usize, soft: bool) -> Option<usize> {
    let target = current.map_or(0, |i| i + 1);
    if target < len {
        Some(target)
    } else if soft || len == 0 {
        None
    } else {
        Some(0)
    }
}

/// Highlight after a step up.
pub fn select_prev(current: Option<usize>, len: usize, soft: bool) -> Option<usize> {
    match current {
        Some(i) if i > 0 && i - 1 < len => Some(i - 1),
        // from "none" there is no row above; soft mode wraps to the bottom
        None if len > 0 => Some(len - 1),
        _ if soft || len == 0 => None,
        _ => Some(len - 1),
    }
}

/// New first visible row so that `target` is inside a window of `visible`
/// rows. The window only moves when the target is outside it.
pub fn scroll_into_view(scroll_top: usize, visible: usize, target: usize) -> usize {
    let visible = visible.max(1);
    if target < scroll_top {
        target
    } else if target >= scroll_top + visible {
        target + 1 - visible
    } else {
        scroll_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_mode_wraps_both_ways() {
        assert_eq!(select_prev(Some(0), 3, false), Some(2));
        assert_eq!(select_next(Some(2), 3, false), Some(0));
        assert_eq!(select_next(None, 3, false), Some(0));
        assert_eq!(select_prev(None, 3, false), Some(2));
    }

    #[test]
    fn soft_mode_clears_at_the_edges() {
        assert_eq!(select_next(Some(2), 3, true), None);
        assert_eq!(select_prev(Some(0), 3, true), None);
        assert_eq!(select_next(None, 3, true), Some(0));
        // asymmetric: up from nothing still reaches the last row
        assert_eq!(select_prev(None, 3, true), Some(2));
    }

    #[test]
    fn empty_list_never_selects() {
        for soft in [false, true] {
            assert_eq!(select_next(None, 0, soft), None);
            assert_eq!(select_prev(None, 0, soft), None);
        }
    }

    #[test]
    fn middle_moves_are_plain_steps() {
        assert_eq!(select_next(Some(1), 5, true), Some(2));
        assert_eq!(select_prev(Some(3), 5, false), Some(2));
    }

    #[test]
    fn scroll_moves_only_when_needed() {
        assert_eq!(scroll_into_view(0, 10, 4), 0);
        assert_eq!(scroll_into_view(0, 10, 12), 3);
        assert_eq!(scroll_into_view(5, 10, 2), 2);
        assert_eq!(scroll_into_view(3, 10, 12), 3);
        // wrapping from the bottom back to row 0
        assert_eq!(scroll_into_view(10, 10, 0), 0);
    }
}

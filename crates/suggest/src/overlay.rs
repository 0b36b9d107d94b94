//! Render model read by the host after each engine call.

use crate::candidate::Candidate;
use crate::transform::Fragment;

#[derive(Clone, Debug, PartialEq)]
pub enum Row {
    Candidate(Candidate),
    /// Placeholder for an empty result; never activates, never flies out.
    NoMatches,
}

impl Row {
    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            Row::Candidate(c) => Some(c),
            Row::NoMatches => None,
        }
    }

    /// Has an id the flyout services can be asked about.
    pub fn is_enrichable(&self) -> bool {
        self.candidate().is_some_and(|c| c.id.is_some())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderedRow {
    pub row: Row,
    pub fragment: Fragment,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlyoutView {
    /// Row the flyout belongs to.
    pub row: usize,
    pub name: String,
    pub view_url: String,
    /// `None` when the candidate has no image.
    pub image_url: Option<String>,
    pub types: String,
    pub domains: String,
    /// Raw blurb markup; `&nbsp;` when there is no article.
    pub blurb: String,
    pub width: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayView {
    pub visible: bool,
    /// The "loading..." box; shown instead of the list.
    pub loading: bool,
    /// Transient error indicator.
    pub error: Option<String>,
    pub rows: Vec<RenderedRow>,
    pub selected: Option<usize>,
    /// First row inside the viewport.
    pub scroll_top: usize,
    pub visible_rows: usize,
    /// Label of the "create new" row, if shown.
    pub suggest_new: Option<String>,
    pub flyout: Option<FlyoutView>,
    pub width: u32,
    pub vertical_offset_px: i32,
}

impl OverlayView {
    pub(crate) fn new(width: u32, vertical_offset_px: i32, visible_rows: usize) -> Self {
        Self {
            width,
            vertical_offset_px,
            visible_rows,
            ..Self::default()
        }
    }

    pub fn selected_row(&self) -> Option<&RenderedRow> {
        self.selected.and_then(|i| self.rows.get(i))
    }

    /// Rows currently inside the viewport.
    pub fn window(&self) -> &[RenderedRow] {
        let start = self.scroll_top.min(self.rows.len());
        let end = (start + self.visible_rows).min(self.rows.len());
        &self.rows[start..end]
    }

    /// The list is on screen with at least one row.
    pub fn is_showing_rows(&self) -> bool {
        self.visible && !self.rows.is_empty()
    }
}

//! # input_core
//!
//! UI-agnostic text state for the fields a suggestion engine is attached to.
//!
//! - [`InputId`]: opaque identifier for a text control
//! - [`InputValueStore`]: value and caret per control
//! - UTF-8 helpers used for caret movement and match highlighting
//!
//! The crate depends only on `std`. Layout, painting and key routing live in
//! the layers above it.

mod id;
mod state;
mod store;
mod text;

pub use id::InputId;
pub use store::InputValueStore;

pub use text::{
    clamp_to_char_boundary, filter_single_line, find_ignore_case, next_cursor_boundary,
    prev_cursor_boundary, trimmed_char_len,
};

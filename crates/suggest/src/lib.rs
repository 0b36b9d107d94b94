//! # suggest
//!
//! Type-ahead for text fields: debounced lookups against a search service,
//! a per-field result cache, keyboard and pointer selection in an overlay,
//! and a two-part "flyout" preview for the highlighted candidate.
//!
//! The engine is headless. A host binds its text controls with
//! [`SuggestEngine::bind_suggest`] or [`SuggestEngine::bind_select`],
//! forwards keys, focus and pointer input, pumps [`SuggestEngine::tick`] and
//! the network runtime's `CoreEvent`s, and paints [`OverlayView`].

pub mod cache;
pub mod candidate;
pub mod debounce;
pub mod error;
pub mod events;
pub mod hooks;
pub mod options;
pub mod overlay;
pub mod response;
pub mod selection;
pub mod transform;
pub mod urls;

mod engine;
mod field;
mod flyout;
mod lifecycle;
mod machine;
mod timers;

pub use cache::FieldKey;
pub use candidate::{Candidate, NamedRef, ResourceRef};
pub use engine::{KeyDisposition, SuggestEngine};
pub use error::{Result, SuggestError};
pub use events::{FieldEvent, FieldEventKind};
pub use hooks::{ListHooks, LoadPlan, SelectHooks, SuggestHooks};
pub use lifecycle::FieldBinding;
pub use machine::MachineState;
pub use options::{Options, OptionsOverride, Timings, TimingsOverride};
pub use overlay::{FlyoutView, OverlayView, RenderedRow, Row};
pub use transform::{Fragment, LineClass, Span};

pub use core_types::Key;
pub use input_core::InputId;

use std::sync::Arc;

use core_types::RequestId;

use crate::cache::FieldKey;
use crate::hooks::ListHooks;
use crate::machine::MachineState;
use crate::options::Options;
use crate::overlay::OverlayView;

/// Everything the engine keeps for one bound field.
pub(crate) struct Field {
    pub key: FieldKey,
    /// Bumped on every (re)bind.
    pub epoch: u64,
    pub options: Options,
    pub hooks: Arc<dyn ListHooks>,
    /// Key handling is attached.
    pub managed: bool,
    pub state: MachineState,
    /// Token of the list lookup whose result may still be shown.
    pub pending: Option<RequestId>,
    pub overlay: OverlayView,
    pub flyout: Option<FlyoutJoin>,
}

impl Field {
    pub(crate) fn new(key: FieldKey, epoch: u64, options: Options, hooks: Arc<dyn ListHooks>) -> Self {
        let overlay = OverlayView::new(
            options.width,
            options.vertical_offset_px,
            options.visible_rows.max(1),
        );
        Self {
            key,
            epoch,
            options,
            hooks,
            managed: false,
            state: MachineState::Idle,
            pending: None,
            overlay,
            flyout: None,
        }
    }
}

/// A flyout waiting for its blurb and image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FlyoutJoin {
    pub ticket: u64,
    pub row: usize,
    pub candidate_id: String,
    pub blurb: Option<String>,
    pub image: Option<String>,
}

impl FlyoutJoin {
    pub(crate) fn new(ticket: u64, row: usize, candidate_id: String) -> Self {
        Self {
            ticket,
            row,
            candidate_id,
            blurb: None,
            image: None,
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.blurb.is_some() && self.image.is_some()
    }
}

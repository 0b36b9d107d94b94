use core_types::{RequestId, ResourceKind};
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    // Engine -> network
    Fetch {
        request_id: RequestId,
        kind: ResourceKind,
        url: String,
    },
    CancelRequest {
        request_id: RequestId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    // Network -> engine
    FetchDone {
        request_id: RequestId,
        kind: ResourceKind,
        url: String,
        status: u16,
        body: String,
    },
    FetchError {
        request_id: RequestId,
        kind: ResourceKind,
        url: String,
        error: String,
    },
}

impl CoreEvent {
    pub fn request_id(&self) -> RequestId {
        match self {
            CoreEvent::FetchDone { request_id, .. } | CoreEvent::FetchError { request_id, .. } => {
                *request_id
            }
        }
    }
}

pub struct Bus {
    pub cmd_tx: Sender<CoreCommand>,
    pub cmd_rx: Receiver<CoreCommand>,
    pub evt_tx: Sender<CoreEvent>, // shareable for runtimes
    pub evt_rx: Receiver<CoreEvent>,
}

impl Bus {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        Self {
            cmd_tx,
            cmd_rx,
            evt_tx,
            evt_rx,
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

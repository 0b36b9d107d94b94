use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use bus::{CoreCommand, CoreEvent};
use core_types::{Key, RequestId};
use input_core::{InputId, InputValueStore, trimmed_char_len};

use crate::cache::{FieldKey, RequestCache, ResourceCache};
use crate::error::{Result, SuggestError};
use crate::events::{FieldEvent, FieldEventKind};
use crate::field::Field;
use crate::machine::{MachineEvent, MachineState};
use crate::options::Options;
use crate::overlay::OverlayView;
use crate::timers::{TimerKind, TimerQueue, TimerSlot};

/// What the host should do with a key after the engine has seen it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Let the control apply its default action.
    Default,
    /// Suppress the default action (caret jump, form submit).
    Consumed,
}

/// Why a network request was sent, so its response can be routed back.
#[derive(Clone, Debug)]
pub(crate) enum Purpose {
    List { cache_key: String },
    Blurb { article_id: String, ticket: u64 },
    Thumbnail { image_id: String, url: String, ticket: u64 },
}

#[derive(Clone, Debug)]
pub(crate) struct InFlight {
    pub input: InputId,
    pub epoch: u64,
    pub purpose: Purpose,
}

/// Type-ahead engine for any number of bound text fields.
///
/// The engine never blocks and never spawns threads. The host feeds it user
/// input and a monotonic clock, forwards `CoreEvent`s from the network runtime
/// through [`on_core_event`](Self::on_core_event), calls [`tick`](Self::tick)
/// when [`next_deadline`](Self::next_deadline) passes, and repaints from
/// [`overlay`](Self::overlay).
pub struct SuggestEngine {
    cmd_tx: Sender<CoreCommand>,
    pub(crate) release_tx: Sender<(InputId, u64)>,
    release_rx: Receiver<(InputId, u64)>,

    pub(crate) fields: HashMap<InputId, Field>,
    pub(crate) keys: HashMap<InputId, FieldKey>,
    pub(crate) next_key: u64,
    pub(crate) next_epoch: u64,
    pub(crate) values: InputValueStore,

    pub(crate) timers: TimerQueue,
    pub(crate) in_flight: HashMap<RequestId, InFlight>,
    next_request_id: RequestId,
    next_ticket: u64,

    pub(crate) lists: RequestCache,
    pub(crate) resources: ResourceCache,

    // field whose overlay the pointer is pressed on (or scrolling)
    pub(crate) pointer_on_overlay: Option<InputId>,
    // field that blurred while the pointer was on its overlay
    pub(crate) overlay_owner: Option<InputId>,

    events: Vec<FieldEvent>,
}

impl SuggestEngine {
    pub fn new(cmd_tx: Sender<CoreCommand>) -> Self {
        let (release_tx, release_rx) = mpsc::channel();
        Self {
            cmd_tx,
            release_tx,
            release_rx,
            fields: HashMap::new(),
            keys: HashMap::new(),
            next_key: 1,
            next_epoch: 1,
            values: InputValueStore::new(),
            timers: TimerQueue::new(),
            in_flight: HashMap::new(),
            next_request_id: 1,
            next_ticket: 1,
            lists: RequestCache::new(),
            resources: ResourceCache::new(),
            pointer_on_overlay: None,
            overlay_owner: None,
            events: Vec::new(),
        }
    }

    // -- Clock ---

    /// Fire every timer due at or before `now`.
    pub fn tick(&mut self, now: Instant) {
        self.drain_released();
        while let Some((input, kind)) = self.timers.pop_due(now) {
            self.fire(input, kind, now);
        }
    }

    /// Earliest pending deadline; the host should `tick` no later than this.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn fire(&mut self, input: InputId, kind: TimerKind, now: Instant) {
        log::trace!(target: "suggest.timers", "{input}: {:?} fired", kind.slot());
        match kind {
            TimerKind::Settle => {
                if self.fields.get(&input).is_some_and(|f| f.managed) {
                    self.dispatch(input, MachineEvent::Settled, now);
                }
            }
            TimerKind::Manage => self.manage(input, now),
            TimerKind::Release => self.release_field(input, now),
            TimerKind::ShowLoading => self.show_loading(input),
            TimerKind::RequestTimeout { token } => self.on_request_timeout(input, token, now),
            TimerKind::Deliver { token, candidates } => {
                self.dispatch(input, MachineEvent::Delivered { token, candidates }, now)
            }
            TimerKind::Flyout { ticket } => self.flyout_resources(input, ticket),
            TimerKind::ClearError => {
                if let Some(field) = self.fields.get_mut(&input) {
                    field.overlay.error = None;
                }
            }
        }
    }

    // -- Network ---

    pub fn on_core_event(&mut self, evt: CoreEvent, now: Instant) {
        self.drain_released();

        let request_id = evt.request_id();
        let Some(flight) = self.in_flight.remove(&request_id) else {
            log::trace!(target: "suggest.net", "dropping response for unknown request #{request_id}");
            return;
        };

        match flight.purpose {
            Purpose::List { cache_key } => {
                self.on_list_response(flight.input, flight.epoch, request_id, cache_key, evt, now)
            }
            Purpose::Blurb { article_id, ticket } => {
                self.on_blurb_response(flight.input, ticket, article_id, evt)
            }
            Purpose::Thumbnail {
                image_id,
                url,
                ticket,
            } => self.on_thumbnail_response(flight.input, ticket, image_id, url),
        }
    }

    pub(crate) fn send(&self, cmd: CoreCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            log::warn!(target: "suggest.net", "network runtime is gone, command dropped");
        }
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub(crate) fn next_ticket(&mut self) -> u64 {
        let t = self.next_ticket;
        self.next_ticket += 1;
        t
    }

    // -- Keyboard ---

    /// Route a key press from `input`.
    ///
    /// Editing keys always change the field's text; the rest only act while
    /// the field is managed.
    pub fn key(&mut self, input: InputId, key: Key, now: Instant) -> Result<KeyDisposition> {
        self.drain_released();
        let field = self.require(input)?;
        let managed = field.managed;
        let enter_consumed = field.state == MachineState::Showing
            && field.overlay.visible
            && field.overlay.selected.is_some();

        match key {
            Key::Char(c) => {
                let mut buf = [0u8; 4];
                self.values.insert_text(input, c.encode_utf8(&mut buf));
                self.text_changed(input, now);
            }
            Key::Backspace => {
                self.values.backspace(input);
                self.text_changed(input, now);
            }
            Key::Delete => {
                self.values.delete(input);
                self.text_changed(input, now);
            }
            Key::ArrowLeft => self.values.move_caret_left(input),
            Key::ArrowRight => self.values.move_caret_right(input),
            Key::Home => self.values.move_caret_to_start(input),
            Key::End => self.values.move_caret_to_end(input),
            Key::ArrowUp | Key::ArrowDown if managed => {
                let evt = if key == Key::ArrowUp {
                    MachineEvent::ArrowUp
                } else {
                    MachineEvent::ArrowDown
                };
                self.dispatch(input, evt, now);
                return Ok(KeyDisposition::Consumed);
            }
            Key::Enter if managed => {
                self.dispatch(input, MachineEvent::Enter, now);
                if enter_consumed {
                    return Ok(KeyDisposition::Consumed);
                }
            }
            Key::Escape if managed => self.dispatch(input, MachineEvent::Escape, now),
            Key::ArrowUp
            | Key::ArrowDown
            | Key::Enter
            | Key::Escape
            | Key::Tab
            | Key::Modifier => {}
        }
        Ok(KeyDisposition::Default)
    }

    /// Insert `text` at the caret as one edit (a paste, an IME commit).
    pub fn type_text(&mut self, input: InputId, text: &str, now: Instant) -> Result<()> {
        self.drain_released();
        self.require(input)?;
        self.values.insert_text(input, text);
        self.text_changed(input, now);
        Ok(())
    }

    /// Replace the field's text without triggering a lookup.
    pub fn set_value(&mut self, input: InputId, text: &str) -> Result<bool> {
        self.drain_released();
        self.require(input)?;
        Ok(self.values.set(input, text))
    }

    pub fn value(&self, input: InputId) -> Result<&str> {
        self.require(input)?;
        Ok(self.values.get(input).unwrap_or_default())
    }

    pub fn caret(&self, input: InputId) -> Result<usize> {
        self.require(input)?;
        Ok(self.values.caret(input).unwrap_or_default())
    }

    fn text_changed(&mut self, input: InputId, now: Instant) {
        let Some(field) = self.fields.get(&input) else {
            return;
        };
        if !field.managed {
            return;
        }
        let len = trimmed_char_len(self.values.get(input).unwrap_or_default());
        let delay = field.hooks.settle_delay(len);
        self.timers.schedule(input, TimerKind::Settle, now + delay);
    }

    // -- Pointer ---

    pub fn row_hover(&mut self, input: InputId, row: usize, now: Instant) -> Result<()> {
        self.drain_released();
        let field = self.require(input)?;
        if field.state == MachineState::Showing && field.overlay.visible {
            self.list_select(input, Some(row), now);
        }
        Ok(())
    }

    pub fn row_click(&mut self, input: InputId, row: usize, now: Instant) -> Result<()> {
        self.drain_released();
        self.require(input)?;
        self.dispatch(input, MachineEvent::RowClick(row), now);
        Ok(())
    }

    /// Pointer over the "create new" row: nothing is highlighted.
    pub fn suggest_new_hover(&mut self, input: InputId) -> Result<()> {
        self.drain_released();
        let field = self.require_mut(input)?;
        if field.state == MachineState::Showing {
            field.overlay.selected = None;
            self.hide_flyout(input);
        }
        Ok(())
    }

    pub fn suggest_new_click(&mut self, input: InputId, now: Instant) -> Result<()> {
        self.drain_released();
        self.require(input)?;
        self.dispatch(input, MachineEvent::NewRowClick, now);
        Ok(())
    }

    /// The host took the list off screen (page scrolled or resized) while the
    /// field keeps its session.
    ///
    /// The state and highlight are kept: an arrow key shows the list again,
    /// and Enter submits the highlighted row instead of activating it.
    pub fn hide_overlay(&mut self, input: InputId) -> Result<()> {
        self.drain_released();
        self.require(input)?;
        self.hide_list(input);
        Ok(())
    }

    // -- Read side ---

    pub fn overlay(&self, input: InputId) -> Result<&OverlayView> {
        Ok(&self.require(input)?.overlay)
    }

    pub fn state(&self, input: InputId) -> Result<MachineState> {
        Ok(self.require(input)?.state)
    }

    pub fn is_managed(&self, input: InputId) -> Result<bool> {
        Ok(self.require(input)?.managed)
    }

    pub fn options(&self, input: InputId) -> Result<&Options> {
        Ok(&self.require(input)?.options)
    }

    /// Stable key of a field that is or was bound.
    pub fn field_key(&self, input: InputId) -> Option<FieldKey> {
        self.keys.get(&input).copied()
    }

    /// Number of cached lists in the field's namespace.
    pub fn cached_lists(&self, input: InputId) -> Result<usize> {
        Ok(self.lists.len(self.require(input)?.key))
    }

    /// Currently bound fields, in id order.
    pub fn inputs(&self) -> Vec<InputId> {
        let mut ids: Vec<_> = self.fields.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn take_events(&mut self) -> Vec<FieldEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, input: InputId, kind: FieldEventKind) {
        log::debug!(target: "suggest.events", "{input}: {kind:?}");
        self.events.push(FieldEvent { input, kind });
    }

    pub(crate) fn require(&self, input: InputId) -> Result<&Field> {
        self.fields
            .get(&input)
            .ok_or(SuggestError::UnknownField(input))
    }

    pub(crate) fn require_mut(&mut self, input: InputId) -> Result<&mut Field> {
        self.fields
            .get_mut(&input)
            .ok_or(SuggestError::UnknownField(input))
    }

    /// Apply releases queued by dropped [`FieldBinding`](crate::FieldBinding)s.
    pub(crate) fn drain_released(&mut self) {
        while let Ok((input, epoch)) = self.release_rx.try_recv() {
            self.drop_field(input, epoch);
        }
    }

    pub(crate) fn hide_flyout(&mut self, input: InputId) {
        if let Some(field) = self.fields.get_mut(&input) {
            field.flyout = None;
            field.overlay.flyout = None;
        }
        self.timers.cancel(input, TimerSlot::Flyout);
    }

    pub(crate) fn hide_list(&mut self, input: InputId) {
        if let Some(field) = self.fields.get_mut(&input) {
            field.overlay.visible = false;
        }
        self.hide_flyout(input);
    }
}

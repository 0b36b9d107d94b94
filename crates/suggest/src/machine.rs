//! Idle / Fetching / Showing, per field.
//!
//! A transition runs the old state's exit, the new state's entry, then
//! optionally re-dispatches an event in the new state. That is how a settle
//! while Showing ends up as a fresh fetch: Showing -> Idle, then Idle handles
//! the settle.

use std::sync::Arc;
use std::time::Instant;

use bus::{CoreCommand, CoreEvent};
use core_types::{RequestId, ResourceKind};
use input_core::{InputId, trimmed_char_len};

use crate::candidate::Candidate;
use crate::engine::{InFlight, Purpose, SuggestEngine};
use crate::error::SuggestError;
use crate::events::FieldEventKind;
use crate::overlay::{RenderedRow, Row};
use crate::selection::{scroll_into_view, select_next, select_prev};
use crate::timers::{TimerKind, TimerSlot};
use crate::transform::{self, LineClass};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineState {
    Idle,
    Fetching,
    Showing,
}

#[derive(Clone, Debug)]
pub(crate) enum MachineEvent {
    Settled,
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Delivered {
        token: RequestId,
        candidates: Arc<Vec<Candidate>>,
    },
    RowClick(usize),
    NewRowClick,
}

impl SuggestEngine {
    pub(crate) fn dispatch(&mut self, input: InputId, event: MachineEvent, now: Instant) {
        let Some(field) = self.fields.get(&input) else {
            return;
        };
        match field.state {
            MachineState::Idle => self.idle_handle(input, event, now),
            MachineState::Fetching => self.fetching_handle(input, event, now),
            MachineState::Showing => self.showing_handle(input, event, now),
        }
    }

    pub(crate) fn transition(
        &mut self,
        input: InputId,
        to: MachineState,
        delivered: Option<Arc<Vec<Candidate>>>,
        then: Option<MachineEvent>,
        now: Instant,
    ) {
        let Some(field) = self.fields.get(&input) else {
            return;
        };
        let from = field.state;
        self.exit_state(input, from);
        if let Some(field) = self.fields.get_mut(&input) {
            field.state = to;
        }
        log::debug!(target: "suggest.machine", "{input}: {from:?} -> {to:?}");
        self.enter_state(input, to, delivered, now);
        if let Some(event) = then {
            self.dispatch(input, event, now);
        }
    }

    fn exit_state(&mut self, input: InputId, from: MachineState) {
        match from {
            MachineState::Idle => {}
            MachineState::Fetching => {
                for slot in [TimerSlot::Loading, TimerSlot::Timeout, TimerSlot::Deliver] {
                    self.timers.cancel(input, slot);
                }
                if let Some(field) = self.fields.get_mut(&input) {
                    field.overlay.loading = false;
                    field.pending = None;
                }
            }
            MachineState::Showing => {
                self.hide_flyout(input);
                if let Some(field) = self.fields.get_mut(&input) {
                    field.overlay.selected = None;
                }
            }
        }
    }

    fn enter_state(
        &mut self,
        input: InputId,
        to: MachineState,
        delivered: Option<Arc<Vec<Candidate>>>,
        now: Instant,
    ) {
        match to {
            MachineState::Idle => self.hide_list(input),
            MachineState::Fetching => self.enter_fetching(input, now),
            MachineState::Showing => {
                let Some(list) = delivered else {
                    return;
                };
                self.list_show(input, &list);
                let soft = self
                    .fields
                    .get(&input)
                    .is_none_or(|f| f.options.soft_select);
                if !soft {
                    self.list_select(input, Some(0), now);
                }
            }
        }
    }

    // -- Handlers ---

    fn idle_handle(&mut self, input: InputId, event: MachineEvent, now: Instant) {
        match event {
            MachineEvent::Settled | MachineEvent::ArrowDown => {
                let Some(field) = self.fields.get(&input) else {
                    return;
                };
                let len = trimmed_char_len(self.values.get(input).unwrap_or_default());
                if len >= field.hooks.min_query_len() {
                    self.transition(input, MachineState::Fetching, None, None, now);
                } else {
                    self.hide_list(input);
                }
            }
            MachineEvent::Enter => self.submit_text(input),
            _ => {}
        }
    }

    fn fetching_handle(&mut self, input: InputId, event: MachineEvent, now: Instant) {
        match event {
            MachineEvent::Settled => {
                self.transition(
                    input,
                    MachineState::Idle,
                    None,
                    Some(MachineEvent::Settled),
                    now,
                );
            }
            MachineEvent::Delivered { token, candidates } => {
                let live = self
                    .fields
                    .get(&input)
                    .is_some_and(|f| f.pending == Some(token));
                if live {
                    self.transition(input, MachineState::Showing, Some(candidates), None, now);
                } else {
                    log::trace!(target: "suggest.machine", "{input}: stale delivery #{token}");
                }
            }
            MachineEvent::Enter => self.submit_text(input),
            MachineEvent::Escape => {
                self.hide_list(input);
                self.transition(input, MachineState::Idle, None, None, now);
            }
            _ => {}
        }
    }

    fn showing_handle(&mut self, input: InputId, event: MachineEvent, now: Instant) {
        match event {
            MachineEvent::Settled => {
                self.transition(
                    input,
                    MachineState::Idle,
                    None,
                    Some(MachineEvent::Settled),
                    now,
                );
            }
            MachineEvent::ArrowDown | MachineEvent::ArrowUp => {
                let Some(field) = self.fields.get_mut(&input) else {
                    return;
                };
                field.overlay.visible = true;
                let len = field.overlay.rows.len();
                let current = field.overlay.selected;
                let soft = field.options.soft_select;
                let target = if matches!(event, MachineEvent::ArrowDown) {
                    select_next(current, len, soft)
                } else {
                    select_prev(current, len, soft)
                };
                self.list_select(input, target, now);
            }
            MachineEvent::Enter => {
                let Some(field) = self.fields.get(&input) else {
                    return;
                };
                match field.overlay.selected {
                    None => self.transition(
                        input,
                        MachineState::Idle,
                        None,
                        Some(MachineEvent::Enter),
                        now,
                    ),
                    Some(row) if field.overlay.visible => self.activate(input, row, now),
                    Some(row) => self.submit_row(input, row),
                }
            }
            MachineEvent::RowClick(row) => self.activate(input, row, now),
            MachineEvent::NewRowClick => {
                let Some(field) = self.fields.get(&input) else {
                    return;
                };
                if field.overlay.suggest_new.is_none() {
                    return;
                }
                let name = self.values.trimmed(input).unwrap_or_default().to_string();
                self.emit(input, FieldEventKind::SelectedNew { name });
                self.hide_list(input);
                self.transition(input, MachineState::Idle, None, None, now);
            }
            MachineEvent::Escape => {
                self.hide_list(input);
                self.transition(input, MachineState::Idle, None, None, now);
            }
            MachineEvent::Delivered { .. } => {}
        }
    }

    // -- Fetching ---

    fn enter_fetching(&mut self, input: InputId, now: Instant) {
        let token = self.next_request_id();
        let Some(field) = self.fields.get_mut(&input) else {
            return;
        };
        field.overlay.error = None;
        field.pending = Some(token);
        let timings = field.options.timings;

        self.timers.cancel(input, TimerSlot::ClearError);
        self.timers
            .schedule(input, TimerKind::ShowLoading, now + timings.loading_delay);
        self.timers.schedule(
            input,
            TimerKind::RequestTimeout { token },
            now + timings.request_timeout,
        );
        self.list_load(input, token, now);
    }

    /// Serve the field's current query from cache, or ask the network.
    ///
    /// Cache hits are delivered through a zero-delay timer, never inline.
    fn list_load(&mut self, input: InputId, token: RequestId, now: Instant) {
        let Some(field) = self.fields.get(&input) else {
            return;
        };
        let query = self.values.trimmed(input).unwrap_or_default();
        let plan = match field.hooks.list_load(&field.options, query) {
            Ok(plan) => plan,
            Err(err) => {
                log::warn!(target: "suggest.machine", "{input}: cannot build list request: {err}");
                return;
            }
        };

        if let Some(hit) = self.lists.lookup(field.key, &plan.cache_key) {
            log::trace!(target: "suggest.cache", "{input}: hit for {:?}", plan.cache_key);
            self.timers.schedule(
                input,
                TimerKind::Deliver {
                    token,
                    candidates: hit,
                },
                now,
            );
            return;
        }

        let epoch = field.epoch;
        self.in_flight.insert(
            token,
            InFlight {
                input,
                epoch,
                purpose: Purpose::List {
                    cache_key: plan.cache_key,
                },
            },
        );
        self.send(CoreCommand::Fetch {
            request_id: token,
            kind: ResourceKind::Search,
            url: plan.url,
        });
    }

    pub(crate) fn on_list_response(
        &mut self,
        input: InputId,
        epoch: u64,
        request_id: RequestId,
        cache_key: String,
        evt: CoreEvent,
        now: Instant,
    ) {
        let Some(field) = self.fields.get(&input) else {
            log::trace!(target: "suggest.net", "{input}: list #{request_id} for an unbound field");
            return;
        };
        if field.epoch != epoch {
            log::trace!(target: "suggest.net", "{input}: list #{request_id} for a previous binding");
            return;
        }

        let parsed = match evt {
            CoreEvent::FetchDone { status, body, .. } if (200..300).contains(&status) => {
                field.hooks.parse_list(&body)
            }
            CoreEvent::FetchDone { status, url, .. } => Err(SuggestError::Transport(format!(
                "HTTP {status} from {url}"
            ))),
            CoreEvent::FetchError { error, .. } => Err(SuggestError::Transport(error)),
        };
        let live = field.state == MachineState::Fetching && field.pending == Some(request_id);
        let key = field.key;

        match parsed {
            Ok(list) => {
                let list = Arc::new(list);
                self.lists.store(key, cache_key, list.clone());
                if live {
                    self.dispatch(
                        input,
                        MachineEvent::Delivered {
                            token: request_id,
                            candidates: list,
                        },
                        now,
                    );
                } else {
                    log::trace!(target: "suggest.net", "{input}: list #{request_id} cached, not shown");
                }
            }
            Err(err) if live => {
                log::warn!(target: "suggest.net", "{input}: list request #{request_id} failed: {err}");
                // no indicator: only a timeout reports an error
                self.transition(input, MachineState::Idle, None, None, now);
            }
            Err(err) => {
                log::debug!(target: "suggest.net", "{input}: superseded list #{request_id} failed: {err}");
            }
        }
    }

    pub(crate) fn show_loading(&mut self, input: InputId) {
        let Some(field) = self.fields.get_mut(&input) else {
            return;
        };
        if field.state != MachineState::Fetching {
            return;
        }
        field.overlay.loading = true;
        self.hide_list(input);
    }

    pub(crate) fn on_request_timeout(&mut self, input: InputId, token: RequestId, now: Instant) {
        let live = self
            .fields
            .get(&input)
            .is_some_and(|f| f.state == MachineState::Fetching && f.pending == Some(token));
        if !live {
            return;
        }

        if self.in_flight.remove(&token).is_some() {
            self.send(CoreCommand::CancelRequest { request_id: token });
        }
        log::warn!(target: "suggest.machine", "{input}: request #{token} timed out");
        self.transition(input, MachineState::Idle, None, None, now);

        let Some(field) = self.fields.get_mut(&input) else {
            return;
        };
        field.overlay.error = Some(SuggestError::Timeout.to_string());
        let display = field.options.timings.error_display;
        self.timers
            .schedule(input, TimerKind::ClearError, now + display);
    }

    // -- Showing ---

    /// Build rows for `candidates` and make the list visible, nothing selected.
    fn list_show(&mut self, input: InputId, candidates: &[Candidate]) {
        let Some(field) = self.fields.get(&input) else {
            return;
        };
        let query = self.values.trimmed(input).unwrap_or_default();
        let options = &field.options;
        let hooks = &field.hooks;

        let kept: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| match &options.filter_fn {
                Some(f) => f(c, query),
                None => hooks.filter(c, query),
            })
            .collect();
        let kept = hooks.filter_fallback(kept, candidates);

        let mut rows = Vec::with_capacity(kept.len() + 1);
        if candidates.is_empty() {
            rows.push(RenderedRow {
                row: Row::NoMatches,
                fragment: transform::no_matches(),
            });
        }
        for c in kept {
            let fragment = match &options.transform_fn {
                Some(t) => t(c, query),
                None => hooks.transform(c, query),
            };
            rows.push(RenderedRow {
                row: Row::Candidate(c.clone()),
                fragment,
            });
        }
        let suggest_new = hooks.list_show(options);

        self.hide_flyout(input);
        if let Some(field) = self.fields.get_mut(&input) {
            let overlay = &mut field.overlay;
            overlay.rows = rows;
            overlay.selected = None;
            overlay.scroll_top = 0;
            overlay.suggest_new = suggest_new;
            overlay.loading = false;
            overlay.visible = true;
        }
    }

    /// Highlight `target` (or nothing), scroll it into view and maybe start
    /// its flyout.
    pub(crate) fn list_select(&mut self, input: InputId, target: Option<usize>, now: Instant) {
        let Some(field) = self.fields.get_mut(&input) else {
            return;
        };
        let target = target.filter(|&i| i < field.overlay.rows.len());

        if let Some(i) = target {
            let flyout_for_row = field.flyout.as_ref().is_some_and(|j| j.row == i)
                || field.overlay.flyout.as_ref().is_some_and(|f| f.row == i);
            if field.overlay.selected == Some(i) && flyout_for_row {
                return;
            }
            field.overlay.scroll_top =
                scroll_into_view(field.overlay.scroll_top, field.overlay.visible_rows, i);
        }
        field.overlay.selected = target;
        self.hide_flyout(input);

        let Some(i) = target else {
            return;
        };
        let Some(field) = self.fields.get(&input) else {
            return;
        };
        if field.hooks.list_select(&field.options, &field.overlay.rows[i].row) {
            self.request_flyout(input, i, now);
        }
    }

    /// Put the row's name into the field and report the selection.
    fn activate(&mut self, input: InputId, row: usize, now: Instant) {
        let Some(field) = self.fields.get(&input) else {
            return;
        };
        let Some(rendered) = field.overlay.rows.get(row) else {
            return;
        };
        let Row::Candidate(candidate) = &rendered.row else {
            return;
        };
        let name = rendered
            .fragment
            .text(LineClass::Name)
            .unwrap_or_else(|| candidate.display_name().to_string());
        let candidate = candidate.clone();

        self.values.set(input, &name);
        self.emit(input, FieldEventKind::Selected(candidate));
        self.hide_list(input);
        self.transition(input, MachineState::Idle, None, None, now);
    }

    fn submit_text(&mut self, input: InputId) {
        let name = self.values.trimmed(input).unwrap_or_default().to_string();
        self.emit(input, FieldEventKind::Submitted { name, id: None });
    }

    /// Enter on a highlighted row while the list is hidden.
    fn submit_row(&mut self, input: InputId, row: usize) {
        let Some(rendered) = self.fields.get(&input).and_then(|f| f.overlay.rows.get(row)) else {
            return;
        };
        match &rendered.row {
            Row::Candidate(c) => {
                let name = rendered
                    .fragment
                    .text(LineClass::Name)
                    .unwrap_or_else(|| c.display_name().to_string());
                let id = c.id.clone();
                self.emit(input, FieldEventKind::Submitted { name, id });
            }
            Row::NoMatches => self.submit_text(input),
        }
    }
}

//! Binding fields to the engine, and the focus/blur grace periods that attach
//! key handling to them.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Instant;

use input_core::InputId;

use crate::cache::FieldKey;
use crate::engine::SuggestEngine;
use crate::error::Result;
use crate::field::Field;
use crate::hooks::{ListHooks, SelectHooks, SuggestHooks};
use crate::machine::{MachineEvent, MachineState};
use crate::options::OptionsOverride;
use crate::timers::{TimerKind, TimerSlot};

/// Keeps a field bound for as long as it lives.
///
/// Dropping the binding queues a release that the engine applies before it
/// handles anything else. A binding replaced by a later `bind` of the same
/// input no longer owns the field and releases nothing.
#[must_use = "dropping a FieldBinding unbinds the field"]
#[derive(Debug)]
pub struct FieldBinding {
    input: InputId,
    epoch: u64,
    release_tx: Sender<(InputId, u64)>,
    armed: bool,
}

impl FieldBinding {
    pub fn input(&self) -> InputId {
        self.input
    }
}

impl Drop for FieldBinding {
    fn drop(&mut self) {
        if self.armed {
            // The engine may already be gone; nothing left to release then.
            let _ = self.release_tx.send((self.input, self.epoch));
        }
    }
}

impl SuggestEngine {
    // -- Binding ---

    /// Attach `input` to the engine with the behaviour of `hooks`.
    ///
    /// Binding an input again replaces its options, flushes its cached lists
    /// and resets it to `Idle`; its [`FieldKey`] stays the same.
    pub fn bind(
        &mut self,
        input: InputId,
        hooks: Arc<dyn ListHooks>,
        overrides: OptionsOverride,
    ) -> FieldBinding {
        self.drain_released();
        let options = hooks.default_options().merged(overrides);

        let next_key = &mut self.next_key;
        let key = *self
            .keys
            .entry(input)
            .or_insert_with(|| FieldKey::next(next_key));
        let epoch = self.next_epoch;
        self.next_epoch += 1;

        self.lists.flush(key);
        self.timers.cancel_all(input);
        self.values.ensure_initial(input, String::new());
        if self.overlay_owner == Some(input) {
            self.overlay_owner = None;
        }
        let rebound = self
            .fields
            .insert(input, Field::new(key, epoch, options, hooks))
            .is_some();
        log::debug!(target: "suggest.lifecycle", "{input}: bound as {key} (epoch {epoch}, rebound: {rebound})");

        FieldBinding {
            input,
            epoch,
            release_tx: self.release_tx.clone(),
            armed: true,
        }
    }

    pub fn bind_suggest(&mut self, input: InputId, overrides: OptionsOverride) -> FieldBinding {
        self.bind(input, Arc::new(SuggestHooks), overrides)
    }

    pub fn bind_select(&mut self, input: InputId, overrides: OptionsOverride) -> FieldBinding {
        self.bind(input, Arc::new(SelectHooks), overrides)
    }

    /// Unbind now instead of at the next engine call.
    pub fn unbind(&mut self, mut binding: FieldBinding) {
        binding.armed = false;
        self.drain_released();
        self.drop_field(binding.input, binding.epoch);
    }

    pub(crate) fn drop_field(&mut self, input: InputId, epoch: u64) {
        let Some(field) = self.fields.get(&input) else {
            return;
        };
        if field.epoch != epoch {
            log::trace!(target: "suggest.lifecycle", "{input}: release for old epoch {epoch} ignored");
            return;
        }
        let key = field.key;

        self.timers.cancel_all(input);
        self.fields.remove(&input);
        self.lists.flush(key);
        self.values.remove(input);
        self.in_flight.retain(|_, f| f.input != input);
        if self.overlay_owner == Some(input) {
            self.overlay_owner = None;
        }
        if self.pointer_on_overlay == Some(input) {
            self.pointer_on_overlay = None;
        }
        log::debug!(target: "suggest.lifecycle", "{input}: unbound");
    }

    // -- Focus ---

    /// The field gained focus; key handling attaches after the manage delay.
    ///
    /// Unbound inputs are ignored.
    pub fn focus(&mut self, input: InputId, now: Instant) {
        self.drain_released();
        let others: Vec<InputId> = self.fields.keys().copied().filter(|&i| i != input).collect();
        for other in others {
            self.timers.cancel(other, TimerSlot::Manage);
        }
        let Some(field) = self.fields.get(&input) else {
            return;
        };
        let delay = field.options.timings.manage_delay;
        self.timers.cancel(input, TimerSlot::Release);
        self.timers.schedule(input, TimerKind::Manage, now + delay);
    }

    /// The field lost focus; key handling detaches after the release delay,
    /// unless the pointer is on the overlay.
    pub fn blur(&mut self, input: InputId, now: Instant) -> Result<()> {
        self.drain_released();
        let field = self.require(input)?;
        let managed = field.managed;
        let delay = field.options.timings.release_delay;

        self.timers.cancel(input, TimerSlot::Manage);
        self.timers.cancel(input, TimerSlot::Release);
        if self.pointer_on_overlay == Some(input) {
            log::trace!(target: "suggest.lifecycle", "{input}: blur while on overlay");
            self.overlay_owner = Some(input);
        } else if managed {
            self.timers.schedule(input, TimerKind::Release, now + delay);
        }
        Ok(())
    }

    /// Pointer pressed inside `input`'s overlay.
    pub fn overlay_pointer_down(&mut self, input: InputId) -> Result<()> {
        self.drain_released();
        self.require(input)?;
        self.pointer_on_overlay = Some(input);
        Ok(())
    }

    /// The overlay is being scrolled; treated like a press.
    pub fn overlay_scroll(&mut self, input: InputId) -> Result<()> {
        self.overlay_pointer_down(input)
    }

    /// Pointer released over the overlay.
    ///
    /// Returns the field that blurred while the pointer was down. The host
    /// should give it focus back without calling [`focus`](Self::focus): the
    /// field is still managed. The press ends even when `input` is unknown.
    pub fn overlay_pointer_up(&mut self, input: InputId) -> Result<Option<InputId>> {
        self.drain_released();
        self.pointer_on_overlay = None;
        self.require(input)?;
        Ok(self.overlay_owner.take())
    }

    // -- Manage / release ---

    pub(crate) fn manage(&mut self, input: InputId, now: Instant) {
        if !self.fields.contains_key(&input) {
            return;
        }
        self.release_field(input, now);
        if let Some(field) = self.fields.get_mut(&input) {
            field.managed = true;
        }
        log::debug!(target: "suggest.lifecycle", "{input}: managed");
        self.dispatch(input, MachineEvent::Settled, now);
    }

    pub(crate) fn release_field(&mut self, input: InputId, now: Instant) {
        let Some(field) = self.fields.get_mut(&input) else {
            return;
        };
        field.managed = false;
        self.timers.cancel(input, TimerSlot::Settle);
        self.hide_list(input);
        self.transition(input, MachineState::Idle, None, None, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn engine() -> SuggestEngine {
        let (tx, _rx) = mpsc::channel();
        SuggestEngine::new(tx)
    }

    #[test]
    fn rebind_keeps_key_and_bumps_epoch() {
        let mut e = engine();
        let id = InputId::from_raw(7);
        let first = e.bind_suggest(id, OptionsOverride::default());
        let key = e.field_key(id).unwrap();
        let epoch = e.fields[&id].epoch;

        let second = e.bind_suggest(id, OptionsOverride::default());
        assert_eq!(e.field_key(id), Some(key));
        assert!(e.fields[&id].epoch > epoch);

        // the replaced binding releases nothing
        drop(first);
        assert!(e.is_managed(id).is_ok());
        e.unbind(second);
        assert!(e.is_managed(id).is_err());
        // the key survives unbinding
        assert_eq!(e.field_key(id), Some(key));
    }

    #[test]
    fn dropped_binding_applies_at_next_call() {
        let mut e = engine();
        let id = InputId::from_raw(1);
        let binding = e.bind_select(id, OptionsOverride::default());
        drop(binding);
        e.tick(Instant::now());
        assert!(e.inputs().is_empty());
    }

    #[test]
    fn focus_manages_after_delay() {
        let mut e = engine();
        let id = InputId::from_raw(1);
        let _b = e.bind_suggest(id, OptionsOverride::default());
        let t0 = Instant::now();

        e.focus(id, t0);
        e.tick(t0 + Duration::from_millis(199));
        assert!(!e.is_managed(id).unwrap());
        e.tick(t0 + Duration::from_millis(200));
        assert!(e.is_managed(id).unwrap());
    }

    #[test]
    fn focus_on_unbound_input_is_ignored() {
        let mut e = engine();
        e.focus(InputId::from_raw(99), Instant::now());
        assert_eq!(e.next_deadline(), None);
    }

    #[test]
    fn refocus_within_grace_keeps_session() {
        let mut e = engine();
        let id = InputId::from_raw(1);
        let _b = e.bind_suggest(id, OptionsOverride::default());
        let t0 = Instant::now();
        e.focus(id, t0);
        e.tick(t0 + Duration::from_millis(200));

        e.blur(id, t0 + Duration::from_millis(300)).unwrap();
        e.focus(id, t0 + Duration::from_millis(350));
        e.tick(t0 + Duration::from_millis(420));
        assert!(e.is_managed(id).unwrap());
    }

    #[test]
    fn blur_on_unbound_input_fails() {
        let mut e = engine();
        assert!(e.blur(InputId::from_raw(3), Instant::now()).is_err());
    }

    #[test]
    fn unbinding_ends_the_overlay_press() {
        let mut e = engine();
        let id = InputId::from_raw(1);
        let binding = e.bind_suggest(id, OptionsOverride::default());
        e.overlay_pointer_down(id).unwrap();
        assert_eq!(e.pointer_on_overlay, Some(id));

        e.unbind(binding);
        assert_eq!(e.pointer_on_overlay, None);
    }
}

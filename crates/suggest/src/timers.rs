//! Deadline queue driven by the host's clock.
//!
//! Each field has at most one pending timer per [`TimerSlot`]; scheduling into
//! an occupied slot replaces the old deadline. Timers fire in `(due, seq)`
//! order, so zero-delay timers scheduled while handling another one still run
//! after it, in scheduling order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use core_types::RequestId;
use input_core::InputId;

use crate::candidate::Candidate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TimerSlot {
    Settle,
    Manage,
    Release,
    Loading,
    Timeout,
    Deliver,
    Flyout,
    ClearError,
}

#[derive(Clone, Debug)]
pub(crate) enum TimerKind {
    /// Debounced text change.
    Settle,
    Manage,
    Release,
    ShowLoading,
    RequestTimeout { token: RequestId },
    /// Cache hit handed back asynchronously.
    Deliver {
        token: RequestId,
        candidates: Arc<Vec<Candidate>>,
    },
    Flyout { ticket: u64 },
    ClearError,
}

impl TimerKind {
    pub(crate) fn slot(&self) -> TimerSlot {
        match self {
            TimerKind::Settle => TimerSlot::Settle,
            TimerKind::Manage => TimerSlot::Manage,
            TimerKind::Release => TimerSlot::Release,
            TimerKind::ShowLoading => TimerSlot::Loading,
            TimerKind::RequestTimeout { .. } => TimerSlot::Timeout,
            TimerKind::Deliver { .. } => TimerSlot::Deliver,
            TimerKind::Flyout { .. } => TimerSlot::Flyout,
            TimerKind::ClearError => TimerSlot::ClearError,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    seq: u64,
    queue: BTreeMap<(Instant, u64), (InputId, TimerKind)>,
    slots: HashMap<(InputId, TimerSlot), (Instant, u64)>,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn schedule(&mut self, input: InputId, kind: TimerKind, due: Instant) {
        let slot = kind.slot();
        self.cancel(input, slot);

        let seq = self.seq;
        self.seq = self.seq.wrapping_add(1);
        self.queue.insert((due, seq), (input, kind));
        self.slots.insert((input, slot), (due, seq));
    }

    /// Returns `true` if a timer was pending in that slot.
    pub(crate) fn cancel(&mut self, input: InputId, slot: TimerSlot) -> bool {
        match self.slots.remove(&(input, slot)) {
            Some(key) => {
                self.queue.remove(&key);
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&mut self, input: InputId) {
        let keys: Vec<_> = self
            .slots
            .iter()
            .filter(|((id, _), _)| *id == input)
            .map(|(k, v)| (*k, *v))
            .collect();
        for (slot_key, queue_key) in keys {
            self.slots.remove(&slot_key);
            self.queue.remove(&queue_key);
        }
    }

    pub(crate) fn is_pending(&self, input: InputId, slot: TimerSlot) -> bool {
        self.slots.contains_key(&(input, slot))
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Option<(InputId, TimerKind)> {
        let (&(due, seq), _) = self.queue.first_key_value()?;
        if due > now {
            return None;
        }
        let (input, kind) = self.queue.remove(&(due, seq))?;
        self.slots.remove(&(input, kind.slot()));
        Some((input, kind))
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.queue.first_key_value().map(|(&(due, _), _)| due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn id(n: u64) -> InputId {
        InputId::from_raw(n)
    }

    fn drain(q: &mut TimerQueue, now: Instant) -> Vec<(InputId, TimerSlot)> {
        std::iter::from_fn(|| q.pop_due(now))
            .map(|(i, k)| (i, k.slot()))
            .collect()
    }

    #[test]
    fn rescheduling_replaces_the_pending_timer() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(id(1), TimerKind::Settle, t0 + Duration::from_millis(300));
        q.schedule(id(1), TimerKind::Settle, t0 + Duration::from_millis(500));

        assert!(q.pop_due(t0 + Duration::from_millis(400)).is_none());
        assert_eq!(
            drain(&mut q, t0 + Duration::from_millis(500)),
            vec![(id(1), TimerSlot::Settle)]
        );
        assert!(q.next_deadline().is_none());
    }

    #[test]
    fn same_deadline_fires_in_scheduling_order() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(id(2), TimerKind::ShowLoading, t0);
        q.schedule(id(1), TimerKind::Manage, t0);
        q.schedule(id(1), TimerKind::Flyout { ticket: 1 }, t0);

        assert_eq!(
            drain(&mut q, t0),
            vec![
                (id(2), TimerSlot::Loading),
                (id(1), TimerSlot::Manage),
                (id(1), TimerSlot::Flyout),
            ]
        );
    }

    #[test]
    fn slots_are_per_field() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(id(1), TimerKind::Settle, t0);
        q.schedule(id(2), TimerKind::Settle, t0);
        assert!(q.cancel(id(1), TimerSlot::Settle));
        assert!(!q.cancel(id(1), TimerSlot::Settle));
        assert!(q.is_pending(id(2), TimerSlot::Settle));
    }

    #[test]
    fn cancel_all_only_touches_one_field() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(id(1), TimerKind::Settle, t0);
        q.schedule(id(1), TimerKind::Release, t0);
        q.schedule(id(2), TimerKind::Manage, t0 + Duration::from_secs(1));
        q.cancel_all(id(1));

        assert!(q.pop_due(t0).is_none());
        assert_eq!(q.next_deadline(), Some(t0 + Duration::from_secs(1)));
    }
}

//! Cancellable chain of delayed transitions.
//!
//! Each view owns one `Timeline`. Transitions are stored as
//! `(due_ms, transition)` pairs on the owner's clock and handed back in
//! due order by [`Timeline::pop_due`]. Tearing a view down is a single
//! [`Timeline::cancel_all`].
//!
//! ```ignore
//! let mut timeline = Timeline::new();
//! timeline.schedule(now, 120, Transition::Relocate);
//! while let Some((due, t)) = timeline.pop_due(now) {
//!     // apply t; chain follow-ups from `due`, not from `now`
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Handle to a single scheduled transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending<T> {
    id: TimerId,
    due_ms: u64,
    transition: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline<T> {
    pending: Vec<Pending<T>>,
    next_id: u64,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `transition` to fire `delay_ms` after `from_ms`.
    pub fn schedule(&mut self, from_ms: u64, delay_ms: u64, transition: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due_ms: from_ms.saturating_add(delay_ms),
            transition,
        });
        id
    }

    /// Remove the earliest transition due at or before `now_ms`.
    ///
    /// Ties are broken by scheduling order. Returns the due time along
    /// with the transition so follow-ups can be chained off it.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, T)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= now_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.id.0))
            .map(|(i, _)| i)?;
        let p = self.pending.remove(idx);
        Some((p.due_ms, p.transition))
    }

    /// Cancel one transition. Returns `false` if it already fired.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending transition.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Due time of the next pending transition.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }
}

//! ## stochnet-core::time
//! **Simulated time and the pending-event queue**
//!
//! Simulated time is a plain integer. The [`TimeQueue`] holds the distinct
//! future timestamps at which at least one element has something to do; the
//! driver pops the minimum on every step.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Integer simulated time.
pub type SimTime = u64;

/// When the driver checks for an exhausted queue relative to processing a
/// popped timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOrder {
    /// Process every popped timestamp; stop once the queue is empty afterwards.
    #[default]
    ProcessThenCheck,
    /// Stop as soon as a pop leaves the queue empty. The last timestamp is
    /// never processed.
    CheckThenProcess,
}

/// Ordered, duplicate-free set of pending timestamps bounded by a horizon.
#[derive(Debug, Clone)]
pub struct TimeQueue {
    moments: BTreeSet<SimTime>,
    horizon: SimTime,
}

impl TimeQueue {
    /// Creates an empty queue that discards anything scheduled after `horizon`.
    pub fn new(horizon: SimTime) -> Self {
        Self {
            moments: BTreeSet::new(),
            horizon,
        }
    }

    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    /// Inserts every timestamp that is not already queued and does not exceed
    /// the horizon. Returns how many new entries were added.
    pub fn insert_many<I>(&mut self, times: I) -> usize
    where
        I: IntoIterator<Item = SimTime>,
    {
        let horizon = self.horizon;
        times
            .into_iter()
            .filter(|&t| t <= horizon)
            .filter(|&t| self.moments.insert(t))
            .count()
    }

    /// Removes and returns the earliest timestamp.
    #[inline]
    pub fn pop_min(&mut self) -> Option<SimTime> {
        self.moments.pop_first()
    }

    #[inline]
    pub fn peek_min(&self) -> Option<SimTime> {
        self.moments.first().copied()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moments.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moments.len()
    }

    /// Iterates the queued timestamps in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = SimTime> + '_ {
        self.moments.iter().copied()
    }
}

use std::fmt;

use super::{Arcs, Capacity, NetElement};

/// A capacity-bounded token buffer.
#[derive(Debug, Clone)]
pub struct Place {
    id: String,
    capacity: Capacity,
    load: u64,
    rejected: u64,
    arcs: Arcs,
}

impl Place {
    /// Creates a place pre-seeded with `initial_load` tokens. The builder
    /// checks that the initial load fits the capacity.
    pub fn new(id: impl Into<String>, capacity: Capacity, initial_load: u64) -> Self {
        Self {
            id: id.into(),
            capacity,
            load: initial_load,
            rejected: 0,
            arcs: Arcs::default(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.capacity.limit() == Some(self.load)
    }

    /// Tokens turned away because the place was full.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Adds `n` tokens if the resulting load fits the capacity.
    ///
    /// On rejection nothing is added, the tokens are counted in
    /// [`Place::rejected`] and `false` is returned.
    pub fn try_append(&mut self, n: u64) -> bool {
        match self.load.checked_add(n) {
            Some(next) if self.capacity.admits(next) => {
                self.load = next;
                true
            }
            _ => {
                self.rejected += n;
                false
            }
        }
    }

    /// Withdraws `n` tokens. Callers must not take more than the current load.
    pub fn exclude(&mut self, n: u64) {
        debug_assert!(
            n <= self.load,
            "place {} would go negative: load {}, exclude {}",
            self.id,
            self.load,
            n
        );
        self.load = self.load.saturating_sub(n);
    }
}

impl NetElement for Place {
    fn id(&self) -> &str {
        &self.id
    }

    fn capacity(&self) -> Capacity {
        self.capacity
    }

    fn load(&self) -> u64 {
        self.load
    }

    fn arcs(&self) -> &Arcs {
        &self.arcs
    }

    fn arcs_mut(&mut self) -> &mut Arcs {
        &mut self.arcs
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Place: {}, capacity={}, load={}",
            self.id, self.capacity, self.load
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_up_to_capacity() {
        let mut place = Place::new("buffer", Capacity::Bounded(5), 0);
        for _ in 0..5 {
            assert!(place.try_append(1));
        }
        assert!(place.is_full());
        assert!(!place.try_append(1));
        assert_eq!(place.load(), 5);
        assert_eq!(place.rejected(), 1);
    }

    #[test]
    fn test_batch_that_would_overflow_is_rejected_whole() {
        let mut place = Place::new("buffer", Capacity::Bounded(5), 3);
        assert!(!place.try_append(3));
        assert_eq!(place.load(), 3);
        assert_eq!(place.rejected(), 3);
        assert!(place.try_append(2));
        assert_eq!(place.load(), 5);
    }

    #[test]
    fn test_exclude() {
        let mut place = Place::new("buffer", Capacity::Unbounded, 4);
        place.exclude(3);
        assert_eq!(place.load(), 1);
        assert!(!place.is_full());
    }

    #[test]
    #[should_panic(expected = "would go negative")]
    #[cfg(debug_assertions)]
    fn test_exclude_below_zero_asserts() {
        let mut place = Place::new("buffer", Capacity::Unbounded, 1);
        place.exclude(2);
    }

    #[test]
    fn test_display() {
        let place = Place::new("q1", Capacity::Bounded(10), 2);
        assert_eq!(place.to_string(), "Place: q1, capacity=10, load=2");
    }
}

use std::fmt;

use super::{Arcs, Capacity, NetElement};

/// An unbounded sink. Its load counts every token ever absorbed.
#[derive(Debug, Clone)]
pub struct Terminator {
    id: String,
    load: u64,
    arcs: Arcs,
}

impl Terminator {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            load: 0,
            arcs: Arcs::default(),
        }
    }

    #[inline]
    pub fn absorb(&mut self, n: u64) {
        self.load += n;
    }
}

impl NetElement for Terminator {
    fn id(&self) -> &str {
        &self.id
    }

    fn capacity(&self) -> Capacity {
        Capacity::Unbounded
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

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Terminator: {}, load={}", self.id, self.load)
    }
}

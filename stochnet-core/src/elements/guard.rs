use std::fmt;
use std::sync::Arc;

/// Condition over the load of a monitored place.
#[derive(Clone)]
pub enum Predicate {
    Below(u64),
    AtMost(u64),
    Above(u64),
    AtLeast(u64),
    Equals(u64),
    NotEquals(u64),
    Custom(Arc<dyn Fn(u64) -> bool + Send + Sync>),
}

impl Predicate {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u64) -> bool + Send + Sync + 'static,
    {
        Predicate::Custom(Arc::new(f))
    }

    #[inline]
    pub fn holds(&self, load: u64) -> bool {
        match self {
            Predicate::Below(v) => load < *v,
            Predicate::AtMost(v) => load <= *v,
            Predicate::Above(v) => load > *v,
            Predicate::AtLeast(v) => load >= *v,
            Predicate::Equals(v) => load == *v,
            Predicate::NotEquals(v) => load != *v,
            Predicate::Custom(f) => f(load),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Below(v) => write!(f, "load < {v}"),
            Predicate::AtMost(v) => write!(f, "load <= {v}"),
            Predicate::Above(v) => write!(f, "load > {v}"),
            Predicate::AtLeast(v) => write!(f, "load >= {v}"),
            Predicate::Equals(v) => write!(f, "load == {v}"),
            Predicate::NotEquals(v) => write!(f, "load != {v}"),
            Predicate::Custom(_) => f.write_str("custom(load)"),
        }
    }
}

/// Resolved firing condition of a conditional transition.
#[derive(Debug, Clone)]
pub struct Guard {
    /// Index of the monitored place.
    pub place: usize,
    pub predicate: Predicate,
}

use thiserror::Error;

/// Configuration errors raised while assembling a network.
///
/// All of them are detected before a simulation starts; none can occur while
/// the event loop is running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Element {0} not found")]
    UnknownElement(String),

    #[error("Element {0} is defined more than once")]
    DuplicateElement(String),

    #[error("Identifier {0} is reserved for the default element")]
    ReservedName(String),

    #[error("Place {id} has initial load {initial_load} above its capacity {capacity}")]
    InitialLoadExceedsCapacity {
        id: String,
        initial_load: u64,
        capacity: u64,
    },

    #[error("Place {0} has zero capacity")]
    ZeroCapacity(String),

    #[error("Arc {from} -> {to} has zero multiplicity")]
    ZeroMultiplicity { from: String, to: String },

    #[error("Arc {from} -> {to} connects a {from_kind} to a {to_kind}")]
    InvalidArc {
        from: String,
        to: String,
        from_kind: &'static str,
        to_kind: &'static str,
    },

    #[error("Element {element} references {target}, which is not a place")]
    NotAPlace { element: String, target: String },

    #[error("Invalid distribution for {element}: {reason}")]
    InvalidDistribution { element: String, reason: String },

    #[error("Simulation horizon must be positive, got {0}")]
    InvalidHorizon(u64),

    #[error("Transition {0} has no input arc")]
    UnconnectedTransition(String),
}

//! Error types for generator construction.
//!
//! Every failure in this crate is raised when a generator is *built*,
//! never while it runs: a `Gen<T>` that was constructed successfully always
//! produces a value.

use thiserror::Error;

/// Broad category of a failure.
///
/// - `Configuration`: the caller supplied an unusable description (an empty
///   choice set, zero total weight, an unregistered type). Never retried.
/// - `NotImplementedCapability`: a capability such as function generation
///   was requested from a spec that does not provide it.
/// - `Precondition`: a programmer error such as an inverted range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unusable generator or type description.
    Configuration,
    /// Requested capability is not provided.
    NotImplementedCapability,
    /// Argument precondition violated.
    Precondition,
}

/// Error raised while building a generator from combinators.
///
/// # Examples
///
/// ```rust
/// use quickgen_core::{ErrorKind, GenError};
///
/// let err = GenError::NonPositiveWeight { total: 0 };
/// assert_eq!(err.kind(), ErrorKind::Configuration);
/// assert_eq!(err.to_string(), "Total weight must be positive, got 0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    /// A choice combinator received no candidates.
    #[error("{combinator} requires at least one candidate")]
    EmptyChoices {
        /// Name of the combinator that was called.
        combinator: &'static str,
    },

    /// The weights passed to `frequency` sum to zero.
    #[error("Total weight must be positive, got {total}")]
    NonPositiveWeight {
        /// Sum of all weights.
        total: u64,
    },

    /// A range was given with `lo > hi`.
    #[error("Invalid range: lower bound {lo} exceeds upper bound {hi}")]
    InvalidRange {
        /// Debug rendering of the lower bound.
        lo: String,
        /// Debug rendering of the upper bound.
        hi: String,
    },
}

impl GenError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenError::EmptyChoices { .. } | GenError::NonPositiveWeight { .. } => {
                ErrorKind::Configuration
            }
            GenError::InvalidRange { .. } => ErrorKind::Precondition,
        }
    }
}

//! Resolution error types.

use quickgen_core::{ErrorKind, GenError};
use thiserror::Error;

/// Errors raised while resolving or using an `ArbitrarySpec`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArbitraryError {
    /// The type has no registered spec and its shape cannot be synthesised.
    #[error("Unhandled type `{type_name}`: register a spec for it or describe its shape")]
    UnhandledType {
        /// Full type name.
        type_name: &'static str,
    },

    /// The spec does not provide a requested capability.
    #[error("Type `{type_name}` does not provide a {capability}")]
    NotImplementedCapability {
        /// Full type name.
        type_name: &'static str,
        /// Name of the missing capability.
        capability: &'static str,
    },

    /// A family factory was instantiated with the wrong number of arguments.
    #[error("Family `{family}` expects {expected} type argument(s), got {actual}")]
    FamilyArity {
        /// Family name.
        family: &'static str,
        /// Arguments the factory needs.
        expected: usize,
        /// Arguments supplied by the type key.
        actual: usize,
    },

    /// A combinator rejected its arguments.
    #[error(transparent)]
    Gen(#[from] GenError),
}

impl ArbitraryError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArbitraryError::UnhandledType { .. } | ArbitraryError::FamilyArity { .. } => {
                ErrorKind::Configuration
            }
            ArbitraryError::NotImplementedCapability { .. } => ErrorKind::NotImplementedCapability,
            ArbitraryError::Gen(err) => err.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unhandled() {
        let err = ArbitraryError::UnhandledType {
            type_name: "my::Socket",
        };
        assert_eq!(
            err.to_string(),
            "Unhandled type `my::Socket`: register a spec for it or describe its shape"
        );
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_error_display_capability() {
        let err = ArbitraryError::NotImplementedCapability {
            type_name: "u8",
            capability: "co-generator",
        };
        assert_eq!(err.to_string(), "Type `u8` does not provide a co-generator");
        assert_eq!(err.kind(), ErrorKind::NotImplementedCapability);
    }

    #[test]
    fn test_gen_error_passes_through() {
        let err: ArbitraryError = GenError::NonPositiveWeight { total: 0 }.into();
        assert_eq!(err.to_string(), "Total weight must be positive, got 0");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

//! Registry error types and result alias.
//!
//! Every lifecycle operation reports its failures synchronously through
//! [`RegistryError`]; nothing is retried and nothing is swallowed. Fixed
//! messages (validation, conflict, not-found, no-op) are stable; decode and
//! gateway failures wrap their underlying cause together with the step that
//! failed.

use formledger_ledger::GatewayError;
use thiserror::Error;

use crate::filter::TimeRangeError;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur during asset registry operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// A request payload could not be decoded.
    #[error("error decoding {context}: {source}")]
    Decode {
        /// What was being decoded when the failure occurred.
        context: &'static str,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A response payload could not be encoded.
    #[error("error encoding {context}: {source}")]
    Encode {
        /// What was being encoded when the failure occurred.
        context: &'static str,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A required creation field is missing or empty after normalization.
    #[error("some fields are not valid")]
    InvalidFields,

    /// The supplied asset id is empty after normalization.
    #[error("the id is not valid")]
    InvalidId,

    /// Page or size is not a whole number.
    #[error("page and size must be whole numbers: {source}")]
    PageSizeParse {
        /// The underlying integer parse error.
        #[source]
        source: std::num::ParseIntError,
    },

    /// Page is negative, or size is negative or zero.
    #[error("page and size are not consistent")]
    PageSizeInvalid,

    /// Create was called for an id that already exists as a ledger key.
    #[error("asset {id} already exists")]
    AlreadyExists {
        /// The conflicting id.
        id: String,
    },

    /// The addressed asset does not exist.
    #[error("asset {id} doesn't exist")]
    NotFound {
        /// The missing id.
        id: String,
    },

    /// A patch request resolved to no usable field.
    #[error("nothing to change in the request")]
    NothingToChange,

    /// The filter's time range is logically inconsistent.
    #[error(transparent)]
    TimeRange(#[from] TimeRangeError),

    /// A gateway call failed; `step` names the operation that was underway.
    #[error("{step}: {source}")]
    Gateway {
        /// The step that was talking to the ledger.
        step: &'static str,
        /// The underlying gateway error.
        #[source]
        source: GatewayError,
    },
}

impl RegistryError {
    /// Creates a `Decode` error for the given context.
    #[must_use]
    pub fn decode(context: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { context, source }
    }

    /// Creates an `Encode` error for the given context.
    #[must_use]
    pub fn encode(context: &'static str, source: serde_json::Error) -> Self {
        Self::Encode { context, source }
    }

    /// Creates an `AlreadyExists` error for the given id.
    #[must_use]
    pub fn already_exists(id: impl Into<String>) -> Self {
        Self::AlreadyExists { id: id.into() }
    }

    /// Creates a `NotFound` error for the given id.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Wraps a gateway failure with the step that was underway.
    #[must_use]
    pub fn gateway(step: &'static str, source: GatewayError) -> Self {
        Self::Gateway { step, source }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages_are_stable() {
        assert_eq!(RegistryError::InvalidFields.to_string(), "some fields are not valid");
        assert_eq!(RegistryError::InvalidId.to_string(), "the id is not valid");
        assert_eq!(RegistryError::PageSizeInvalid.to_string(), "page and size are not consistent");
        assert_eq!(
            RegistryError::NothingToChange.to_string(),
            "nothing to change in the request"
        );
        assert_eq!(
            RegistryError::already_exists("a-1").to_string(),
            "asset a-1 already exists"
        );
        assert_eq!(RegistryError::not_found("a-1").to_string(), "asset a-1 doesn't exist");
    }

    #[test]
    fn test_gateway_errors_carry_the_failing_step() {
        let err = RegistryError::gateway(
            "error querying the ledger",
            GatewayError::connection("refused"),
        );
        assert_eq!(err.to_string(), "error querying the ledger: connection error: refused");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_decode_errors_name_the_context() {
        let source = serde_json::from_str::<serde_json::Value>("").unwrap_err();
        let err = RegistryError::decode("filter", source);
        assert!(err.to_string().starts_with("error decoding filter:"));
    }
}

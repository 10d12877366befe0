//! Gateway error types and result alias.
//!
//! All gateway implementations map their internal failures to these
//! standardized error types so the business layer above can stay
//! backend-agnostic.
//!
//! # Error Types
//!
//! - [`GatewayError::Connection`] - Network or transport-level failures
//! - [`GatewayError::Query`] - The rich-query executor rejected a selector
//! - [`GatewayError::Internal`] - Backend-specific internal errors
//! - [`GatewayError::Timeout`] - Operation exceeded its time limit
//!
//! # Example
//!
//! ```
//! use formledger_ledger::{GatewayError, GatewayResult};
//!
//! fn refuse(selector: &str) -> GatewayResult<()> {
//!     Err(GatewayError::query(format!("unsupported selector: {selector}")))
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while talking to the ledger.
///
/// This enum is the canonical failure surface of [`LedgerGateway`]
/// implementations. Errors preserve their source chain via the `#[source]`
/// attribute, enabling debugging tools to display the full context.
///
/// [`LedgerGateway`]: crate::LedgerGateway
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// Failure to communicate with the ledger host.
    #[error("connection error: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
        /// The underlying error that caused this connection failure.
        #[source]
        source: Option<BoxError>,
    },

    /// The rich-query executor rejected the submitted selector.
    #[error("invalid query: {message}")]
    Query {
        /// Description of what the executor objected to.
        message: String,
    },

    /// Ledger-side internal error.
    #[error("internal ledger error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },

    /// Operation exceeded its time limit.
    #[error("operation timeout")]
    Timeout,
}

impl GatewayError {
    /// Creates a new `Connection` error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a new `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Query` error with the given message.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query { message: message.into() }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a new `Internal` error with a message and source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::connection("connection refused");
        assert_eq!(err.to_string(), "connection error: connection refused");

        let err = GatewayError::query("unknown operator $regex");
        assert_eq!(err.to_string(), "invalid query: unknown operator $regex");

        let err = GatewayError::internal("compaction in progress");
        assert_eq!(err.to_string(), "internal ledger error: compaction in progress");

        assert_eq!(GatewayError::timeout().to_string(), "operation timeout");
    }

    #[test]
    fn test_source_chain_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = GatewayError::connection_with_source("stream closed", io);

        let source = std::error::Error::source(&err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), "reset by peer");
    }
}

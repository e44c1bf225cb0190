//! Error types for the sequery policy query system.
//!
//! Errors are organized by subsystem: `QueryError` covers request
//! validation, raised before any database work is performed, and
//! `DatabaseError` covers faults signalled by a policy database.
//!
//! The root error type, `Error`, can wrap either subsystem error,
//! allowing for uniform error handling at the top level.

use thiserror::Error;

/// Root error type for the sequery system.
#[derive(Debug, Error)]
pub enum Error {
    /// Request validation errors
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Policy database faults
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating a search or lookup request.
///
/// Every variant is raised before the policy database is consulted; a
/// request that fails validation performs no partial work and can be
/// retried verbatim once corrected.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A rule-kind keyword outside the defined vocabulary
    #[error("Unrecognized rule kind '{0}' (expected allow, auditallow, neverallow, or dontaudit)")]
    InvalidRuleKind(String),

    /// A search request that selects no rule kinds at all
    #[error("Search request selects no rule kinds")]
    NoRuleKinds,

    /// An entity-kind keyword outside the defined vocabulary
    #[error("Unrecognized entity kind '{0}' (expected type, attribute, role, user, or port)")]
    InvalidEntityKind(String),

    /// A name constraint that does not compile as a regular expression
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern that failed to compile
        pattern: String,

        /// Why the pattern was rejected
        reason: String,
    },

    /// A port lookup name that is not a port number
    #[error("Invalid port number '{0}'")]
    InvalidPortNumber(String),
}

/// Errors signalled by a policy database.
///
/// These propagate to the caller unchanged; the query engine performs no
/// retries, since a loaded policy is not expected to fail transiently.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The policy data could not be understood
    #[error("Malformed policy: {0}")]
    MalformedPolicy(String),

    /// The database is not available for queries
    #[error("Policy database unavailable: {0}")]
    Unavailable(String),

    /// An internal database fault
    #[error("Internal database fault: {0}")]
    Internal(String),
}

/// Result type used throughout the sequery system.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        // Test conversion from QueryError to Error
        let query_err = QueryError::NoRuleKinds;
        let error: Error = query_err.into();
        assert!(matches!(error, Error::Query(_)));

        // Test conversion from DatabaseError to Error
        let db_err = DatabaseError::Unavailable("not loaded".to_string());
        let error: Error = db_err.into();
        assert!(matches!(error, Error::Database(_)));
    }

    #[test]
    fn test_error_display() {
        let error: Error = QueryError::InvalidRuleKind("alow".to_string()).into();
        let display = format!("{}", error);
        assert!(display.contains("alow"));
        assert!(display.contains("auditallow"));

        let error: Error = QueryError::InvalidEntityKind("socket".to_string()).into();
        let display = format!("{}", error);
        assert!(display.contains("socket"));
        assert!(display.contains("port"));
    }
}

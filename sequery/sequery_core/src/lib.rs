//! # Sequery Core
//!
//! `sequery_core` provides the error hierarchy shared by both sides of the
//! policy database boundary: the query engine that validates and filters
//! search requests, and the database implementations that answer them.
//!
//! The root error type, `Error`, wraps the subsystem-specific errors,
//! allowing for uniform error handling at the top level.

pub mod error;

// Re-export key types for convenience
pub use error::{DatabaseError, Error, QueryError, Result};

//! Policy database access.
//!
//! This module defines the read contract the query engine consumes and
//! provides the in-memory database implementation.

mod in_memory;

pub use in_memory::{InMemoryPolicyDatabase, PolicyDocument};

use crate::model::{EntityKind, PolicyEntity, RawSearchQuery, RuleRecord};
use sequery_core::error::Result;

/// Trait for read access to a loaded policy.
///
/// A policy database answers raw rule searches and named-entity lookups
/// over an already-loaded policy. Implementations must be safe for
/// concurrent readers; the query engine issues calls from any number of
/// threads without coordination of its own. Neither operation mutates the
/// policy.
pub trait PolicyDatabase: Send + Sync {
    /// Search the policy's access rules.
    ///
    /// The `permissions_any` constraint is coarse by contract: a rule
    /// matches if it grants at least one of the listed permissions.
    /// Callers needing all-of semantics must filter the result
    /// themselves.
    ///
    /// # Arguments
    ///
    /// * `query` - The normalized search query.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<RuleRecord>)` - Every rule of the requested kinds whose
    ///   constraints match, in the database's stable order. An empty
    ///   result means "no rules matched" and is not an error.
    /// * `Err` - If the database is faulted.
    fn raw_search(&self, query: &RawSearchQuery) -> Result<Vec<RuleRecord>>;

    /// Look up named policy entities.
    ///
    /// # Arguments
    ///
    /// * `kind` - The entity kind to retrieve.
    /// * `name` - The entity name, or `None` for every entity of the
    ///   kind. For ports the name is a port number, matched against each
    ///   context's range.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PolicyEntity>)` - The matching entities.
    /// * `Err` - If the database is faulted or the name is malformed.
    fn entity_lookup(&self, kind: EntityKind, name: Option<&str>) -> Result<Vec<PolicyEntity>>;
}

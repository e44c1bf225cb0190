//! # Sequery Policy
//!
//! `sequery_policy` provides rule search and entity lookup over a loaded
//! SELinux-style security policy: types, roles, attributes, users, port
//! contexts, and access-control rules.
//!
//! Key concepts:
//!
//! 1. **Rule Search**: Find access rules by kind, source, target, class,
//!    and a permission set that every matching rule must grant in full.
//!
//! 2. **Entity Lookup**: Retrieve named policy objects (types, roles,
//!    attributes, users, ports) independent of rule search.
//!
//! 3. **Policy Database**: The loaded policy behind the [`PolicyDatabase`]
//!    trait. Its raw matcher is deliberately coarse about permissions; the
//!    query engine applies the authoritative containment filter on top.
//!
//! 4. **Normalization**: A caller-facing request (a rule-kind selection
//!    plus [`SearchCriteria`]) is validated and reshaped into the
//!    [`RawSearchQuery`] form the database understands before delegation.

pub mod engine;
pub mod model;
pub mod store;

// Re-export key types and traits for convenience
pub use engine::QueryEngine;
pub use model::{
    AttributeRecord, EntityKind, PolicyEntity, PortRecord, Protocol, RawSearchQuery, RoleRecord,
    RuleKind, RuleKindSet, RuleRecord, SearchCriteria, TypeRecord, UserRecord,
};
pub use store::{InMemoryPolicyDatabase, PolicyDatabase, PolicyDocument};

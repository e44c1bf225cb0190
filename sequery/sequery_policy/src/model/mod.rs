//! Policy query models.
//!
//! This module defines the rule, entity, and search-criteria types.

pub mod criteria;
pub mod entity;
pub mod rule;

pub use criteria::{RawSearchQuery, SearchCriteria};
pub use entity::{
    AttributeRecord, EntityKind, PolicyEntity, PortRecord, Protocol, RoleRecord, TypeRecord,
    UserRecord,
};
pub use rule::{RuleKind, RuleKindSet, RuleRecord};

//! In-memory policy database.
//!
//! This module provides an in-memory implementation of [`PolicyDatabase`]
//! over policy data assembled through the `add_*` methods or loaded from
//! a [`PolicyDocument`].

use dashmap::DashMap;
use parking_lot::RwLock;
use regex::Regex;
use sequery_core::error::{DatabaseError, QueryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::PolicyDatabase;
use crate::model::{
    AttributeRecord, EntityKind, PolicyEntity, PortRecord, RawSearchQuery, RoleRecord,
    RuleRecord, TypeRecord, UserRecord,
};

/// Serialized form of a policy, shaped for JSON ingestion.
///
/// Stands in for "the already-loaded policy": a document is parsed once
/// and turned into an [`InMemoryPolicyDatabase`], after which the data is
/// only read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// The policy's types.
    #[serde(default)]
    pub types: Vec<TypeRecord>,

    /// The policy's type attributes.
    #[serde(default)]
    pub attributes: Vec<AttributeRecord>,

    /// The policy's roles.
    #[serde(default)]
    pub roles: Vec<RoleRecord>,

    /// The policy's users.
    #[serde(default)]
    pub users: Vec<UserRecord>,

    /// The policy's port contexts.
    #[serde(default)]
    pub ports: Vec<PortRecord>,

    /// The policy's access rules, in declaration order.
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

/// An in-memory policy database.
#[derive(Clone)]
pub struct InMemoryPolicyDatabase {
    /// Access rules, in declaration order.
    rules: Arc<RwLock<Vec<RuleRecord>>>,

    /// Types, indexed by name.
    types: Arc<DashMap<String, TypeRecord>>,

    /// Type attributes, indexed by name.
    attributes: Arc<DashMap<String, AttributeRecord>>,

    /// Roles, indexed by name.
    roles: Arc<DashMap<String, RoleRecord>>,

    /// Users, indexed by name.
    users: Arc<DashMap<String, UserRecord>>,

    /// Port contexts, in declaration order.
    ports: Arc<RwLock<Vec<PortRecord>>>,
}

impl InMemoryPolicyDatabase {
    /// Create a new, empty in-memory policy database.
    pub fn new() -> Self {
        Self {
            rules: Arc::new(RwLock::new(Vec::new())),
            types: Arc::new(DashMap::new()),
            attributes: Arc::new(DashMap::new()),
            roles: Arc::new(DashMap::new()),
            users: Arc::new(DashMap::new()),
            ports: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Build a database from a policy document.
    ///
    /// # Arguments
    ///
    /// * `document` - The policy document to load.
    ///
    /// # Returns
    ///
    /// * `Ok(InMemoryPolicyDatabase)` - The loaded database.
    /// * `Err` - If the document contains duplicate named entities.
    pub fn from_document(document: PolicyDocument) -> Result<Self> {
        let db = Self::new();

        for record in document.types {
            db.add_type(record)?;
        }
        for record in document.attributes {
            db.add_attribute(record)?;
        }
        for record in document.roles {
            db.add_role(record)?;
        }
        for record in document.users {
            db.add_user(record)?;
        }
        for record in document.ports {
            db.add_port(record);
        }
        for record in document.rules {
            db.add_rule(record);
        }

        debug!(
            "Loaded policy: {} rules, {} types, {} attributes",
            db.rules.read().len(),
            db.types.len(),
            db.attributes.len()
        );

        Ok(db)
    }

    /// Parse a JSON policy document and build a database from it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: PolicyDocument = serde_json::from_str(json)
            .map_err(|e| DatabaseError::MalformedPolicy(e.to_string()))?;

        Self::from_document(document)
    }

    /// Read a JSON policy document from disk and build a database from it.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Append an access rule. Rules keep declaration order.
    pub fn add_rule(&self, rule: RuleRecord) {
        self.rules.write().push(rule);
    }

    /// Add a type.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the type was added.
    /// * `Err` - If a type of the same name already exists.
    pub fn add_type(&self, record: TypeRecord) -> Result<()> {
        if self.types.contains_key(&record.name) {
            return Err(
                DatabaseError::MalformedPolicy(format!("duplicate type '{}'", record.name)).into(),
            );
        }

        self.types.insert(record.name.clone(), record);

        Ok(())
    }

    /// Add a type attribute.
    pub fn add_attribute(&self, record: AttributeRecord) -> Result<()> {
        if self.attributes.contains_key(&record.name) {
            return Err(DatabaseError::MalformedPolicy(format!(
                "duplicate attribute '{}'",
                record.name
            ))
            .into());
        }

        self.attributes.insert(record.name.clone(), record);

        Ok(())
    }

    /// Add a role.
    pub fn add_role(&self, record: RoleRecord) -> Result<()> {
        if self.roles.contains_key(&record.name) {
            return Err(
                DatabaseError::MalformedPolicy(format!("duplicate role '{}'", record.name)).into(),
            );
        }

        self.roles.insert(record.name.clone(), record);

        Ok(())
    }

    /// Add a user.
    pub fn add_user(&self, record: UserRecord) -> Result<()> {
        if self.users.contains_key(&record.name) {
            return Err(
                DatabaseError::MalformedPolicy(format!("duplicate user '{}'", record.name)).into(),
            );
        }

        self.users.insert(record.name.clone(), record);

        Ok(())
    }

    /// Append a port context. Contexts keep declaration order.
    pub fn add_port(&self, record: PortRecord) {
        self.ports.write().push(record);
    }

    /// The number of loaded access rules.
    pub fn rule_count(&self) -> usize {
        self.rules.read().len()
    }

    /// Compile one name constraint into a matcher.
    ///
    /// Exact constraints expand through attribute membership when
    /// `indirect` is set: a type name also accepts the attributes the
    /// type belongs to, and an attribute name also accepts its member
    /// types. Patterns are matched as-is, with no expansion.
    fn name_matcher(
        &self,
        constraint: Option<&str>,
        indirect: bool,
        use_regex: bool,
    ) -> Result<NameMatcher> {
        let name = match constraint {
            Some(name) => name,
            None => return Ok(NameMatcher::Unconstrained),
        };

        if use_regex {
            let pattern = Regex::new(name).map_err(|e| QueryError::InvalidPattern {
                pattern: name.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(NameMatcher::Pattern(pattern));
        }

        let mut accepted = vec![name.to_string()];
        if indirect {
            if let Some(record) = self.types.get(name) {
                accepted.extend(record.attributes.iter().cloned());
            }
            if let Some(record) = self.attributes.get(name) {
                accepted.extend(record.types.iter().cloned());
            }
        }

        Ok(NameMatcher::Exact(accepted))
    }

    fn port_lookup(&self, name: Option<&str>) -> Result<Vec<PolicyEntity>> {
        let ports = self.ports.read();

        match name {
            None => Ok(ports.iter().cloned().map(PolicyEntity::Port).collect()),
            Some(name) => {
                let number: u16 = name
                    .parse()
                    .map_err(|_| QueryError::InvalidPortNumber(name.to_string()))?;

                Ok(ports
                    .iter()
                    .filter(|p| p.contains(number))
                    .cloned()
                    .map(PolicyEntity::Port)
                    .collect())
            }
        }
    }
}

impl Default for InMemoryPolicyDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyDatabase for InMemoryPolicyDatabase {
    fn raw_search(&self, query: &RawSearchQuery) -> Result<Vec<RuleRecord>> {
        let source = self.name_matcher(query.source.as_deref(), query.source_indirect, query.regex)?;
        let target = self.name_matcher(query.target.as_deref(), query.target_indirect, query.regex)?;
        let class = self.name_matcher(query.class.as_deref(), false, query.regex)?;

        let rules = self.rules.read();
        let mut matched = Vec::new();

        for rule in rules.iter() {
            if !query.includes(rule.kind) {
                continue;
            }
            if !source.matches(&rule.source) {
                continue;
            }
            if !target.matches(&rule.target) {
                continue;
            }
            if !class.matches(&rule.class) {
                continue;
            }
            // Coarse by contract: at least one listed permission.
            if let Some(any) = &query.permissions_any {
                if !rule.grants_any(any.split(',')) {
                    continue;
                }
            }

            matched.push(rule.clone());
        }

        Ok(matched)
    }

    fn entity_lookup(&self, kind: EntityKind, name: Option<&str>) -> Result<Vec<PolicyEntity>> {
        match kind {
            EntityKind::Type => Ok(collect_named(&self.types, name, PolicyEntity::Type)),
            EntityKind::Attribute => {
                Ok(collect_named(&self.attributes, name, PolicyEntity::Attribute))
            }
            EntityKind::Role => Ok(collect_named(&self.roles, name, PolicyEntity::Role)),
            EntityKind::User => Ok(collect_named(&self.users, name, PolicyEntity::User)),
            EntityKind::Port => self.port_lookup(name),
        }
    }
}

/// A compiled name constraint for one raw search pass.
enum NameMatcher {
    /// No constraint on this dimension.
    Unconstrained,

    /// Any of these names, exactly.
    Exact(Vec<String>),

    /// Names matching this pattern.
    Pattern(Regex),
}

impl NameMatcher {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Exact(accepted) => accepted.iter().any(|a| a == name),
            Self::Pattern(pattern) => pattern.is_match(name),
        }
    }
}

fn collect_named<T: Clone>(
    table: &DashMap<String, T>,
    name: Option<&str>,
    wrap: impl Fn(T) -> PolicyEntity,
) -> Vec<PolicyEntity> {
    match name {
        Some(name) => table
            .get(name)
            .map(|entry| vec![wrap(entry.value().clone())])
            .unwrap_or_default(),
        None => table.iter().map(|entry| wrap(entry.value().clone())).collect(),
    }
}

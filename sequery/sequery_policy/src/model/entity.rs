//! Named policy entity model.
//!
//! This module defines the entity kinds a lookup may request and the
//! kind-specific records a lookup returns.

use sequery_core::error::{QueryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A category of named policy object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A security type.
    Type,

    /// A type attribute.
    Attribute,

    /// A role.
    Role,

    /// A user.
    User,

    /// A network port context.
    Port,
}

impl EntityKind {
    /// Every defined entity kind.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Type,
        EntityKind::Attribute,
        EntityKind::Role,
        EntityKind::User,
        EntityKind::Port,
    ];

    /// The keyword for this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Attribute => "attribute",
            Self::Role => "role",
            Self::User => "user",
            Self::Port => "port",
        }
    }

    /// Parse an entity-kind keyword.
    ///
    /// # Arguments
    ///
    /// * `value` - The keyword to parse.
    ///
    /// # Returns
    ///
    /// * `Ok(EntityKind)` - The parsed kind.
    /// * `Err` - `QueryError::InvalidEntityKind` naming the offending
    ///   value, for anything outside the five defined keywords.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "type" => Ok(Self::Type),
            "attribute" => Ok(Self::Attribute),
            "role" => Ok(Self::Role),
            "user" => Ok(Self::User),
            "port" => Ok(Self::Port),
            _ => Err(QueryError::InvalidEntityKind(value.to_string()).into()),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A named object from the loaded policy.
///
/// Immutable; owned by the caller once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyEntity {
    /// A security type.
    Type(TypeRecord),

    /// A type attribute.
    Attribute(AttributeRecord),

    /// A role.
    Role(RoleRecord),

    /// A user.
    User(UserRecord),

    /// A network port context.
    Port(PortRecord),
}

impl PolicyEntity {
    /// The kind of this entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Type(_) => EntityKind::Type,
            Self::Attribute(_) => EntityKind::Attribute,
            Self::Role(_) => EntityKind::Role,
            Self::User(_) => EntityKind::User,
            Self::Port(_) => EntityKind::Port,
        }
    }

    /// The entity's name. Port contexts are keyed by number range, not
    /// name, so they return `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Type(t) => Some(&t.name),
            Self::Attribute(a) => Some(&a.name),
            Self::Role(r) => Some(&r.name),
            Self::User(u) => Some(&u.name),
            Self::Port(_) => None,
        }
    }
}

impl fmt::Display for PolicyEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(t) => write!(f, "{}", t),
            Self::Attribute(a) => write!(f, "{}", a),
            Self::Role(r) => write!(f, "{}", r),
            Self::User(u) => write!(f, "{}", u),
            Self::Port(p) => write!(f, "{}", p),
        }
    }
}

/// A security type and its attribute memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRecord {
    /// The type name.
    pub name: String,

    /// Whether the type is marked permissive.
    #[serde(default)]
    pub permissive: bool,

    /// The attributes this type belongs to.
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl TypeRecord {
    /// Create a new type record with no attribute memberships.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissive: false,
            attributes: Vec::new(),
        }
    }

    /// Set the attribute memberships.
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the type permissive.
    pub fn permissive(mut self) -> Self {
        self.permissive = true;
        self
    }
}

impl fmt::Display for TypeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.permissive {
            write!(f, "Type '{}' (permissive)", self.name)
        } else {
            write!(f, "Type '{}'", self.name)
        }
    }
}

/// A type attribute and its member types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// The attribute name.
    pub name: String,

    /// The member types.
    #[serde(default)]
    pub types: Vec<String>,
}

impl AttributeRecord {
    /// Create a new attribute record.
    pub fn new<I, S>(name: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for AttributeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attribute '{}' ({} types)", self.name, self.types.len())
    }
}

/// A role, the roles it dominates, and its authorized types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// The role name.
    pub name: String,

    /// Roles dominated by this role.
    #[serde(default)]
    pub dominates: Vec<String>,

    /// Types this role is authorized for.
    #[serde(default)]
    pub types: Vec<String>,
}

impl RoleRecord {
    /// Create a new role record with no dominance or type authorizations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dominates: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Set the authorized types.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the dominated roles.
    pub fn with_dominates<I, S>(mut self, dominates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dominates = dominates.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for RoleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Role '{}'", self.name)
    }
}

/// A user, its authorized roles, and its MLS defaults.
///
/// The MLS level and range are carried as rendered strings and never
/// interpreted; policies without MLS leave them unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// The user name.
    pub name: String,

    /// Roles this user is authorized for.
    #[serde(default)]
    pub roles: Vec<String>,

    /// The default MLS level, if the policy defines MLS.
    #[serde(default)]
    pub level: Option<String>,

    /// The MLS range, if the policy defines MLS.
    #[serde(default)]
    pub range: Option<String>,
}

impl UserRecord {
    /// Create a new user record with no role authorizations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
            level: None,
            range: None,
        }
    }

    /// Set the authorized roles.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Set the MLS default level and range.
    pub fn with_mls(mut self, level: impl Into<String>, range: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self.range = Some(range.into());
        self
    }
}

impl fmt::Display for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User '{}'", self.name)?;

        if let Some(level) = &self.level {
            write!(f, " level {}", level)?;
        }

        Ok(())
    }
}

/// A transport protocol for a port context.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TCP.
    Tcp,

    /// UDP.
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

/// A network port context: a port number range labelled with a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    /// The low end of the port range, inclusive.
    pub low: u16,

    /// The high end of the port range, inclusive.
    pub high: u16,

    /// The transport protocol.
    pub protocol: Protocol,

    /// The context's type name.
    pub context_type: String,

    /// The MLS range, if the policy defines MLS.
    #[serde(default)]
    pub range: Option<String>,
}

impl PortRecord {
    /// Create a new port context.
    pub fn new(
        low: u16,
        high: u16,
        protocol: Protocol,
        context_type: impl Into<String>,
    ) -> Self {
        Self {
            low,
            high,
            protocol,
            context_type: context_type.into(),
            range: None,
        }
    }

    /// Check whether a port number falls inside this context's range.
    pub fn contains(&self, port: u16) -> bool {
        self.low <= port && port <= self.high
    }
}

impl fmt::Display for PortRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(
                f,
                "Port {}/{} with context type '{}'",
                self.low, self.protocol, self.context_type
            )
        } else {
            write!(
                f,
                "Ports {}-{}/{} with context type '{}'",
                self.low, self.high, self.protocol, self.context_type
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_parse() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.keyword()).unwrap(), kind);
        }
    }

    #[test]
    fn test_entity_kind_parse_rejects_unknown() {
        let err = EntityKind::parse("boolean").unwrap_err();
        let display = format!("{}", err);
        assert!(display.contains("boolean"));
    }

    #[test]
    fn test_entity_kind_and_name() {
        let entity = PolicyEntity::Type(
            TypeRecord::new("httpd_t").with_attributes(["domain"]),
        );
        assert_eq!(entity.kind(), EntityKind::Type);
        assert_eq!(entity.name(), Some("httpd_t"));

        let entity = PolicyEntity::Port(PortRecord::new(80, 80, Protocol::Tcp, "http_port_t"));
        assert_eq!(entity.kind(), EntityKind::Port);
        assert_eq!(entity.name(), None);
    }

    #[test]
    fn test_port_containment() {
        let port = PortRecord::new(8080, 8089, Protocol::Tcp, "http_port_t");
        assert!(port.contains(8080));
        assert!(port.contains(8085));
        assert!(port.contains(8089));
        assert!(!port.contains(8090));
        assert!(!port.contains(80));
    }

    #[test]
    fn test_port_display() {
        let single = PortRecord::new(80, 80, Protocol::Tcp, "http_port_t");
        assert_eq!(
            format!("{}", single),
            "Port 80/tcp with context type 'http_port_t'"
        );

        let span = PortRecord::new(5900, 5999, Protocol::Udp, "vnc_port_t");
        assert_eq!(
            format!("{}", span),
            "Ports 5900-5999/udp with context type 'vnc_port_t'"
        );
    }

    #[test]
    fn test_type_display() {
        let plain = TypeRecord::new("httpd_t");
        assert_eq!(format!("{}", plain), "Type 'httpd_t'");

        let permissive = TypeRecord::new("container_t").permissive();
        assert_eq!(format!("{}", permissive), "Type 'container_t' (permissive)");
    }
}

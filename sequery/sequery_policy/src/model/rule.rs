//! Access-rule model.
//!
//! This module defines the access-control rule categories, the rule-kind
//! selection used by search requests, and the rule records a search
//! returns.

use sequery_core::error::{QueryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A category of access-control rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Grants a permission set.
    Allow,

    /// Grants a permission set and audits its use.
    AuditAllow,

    /// Asserts that no rule may grant the permission set.
    NeverAllow,

    /// Suppresses the audit record for a denial.
    DontAudit,
}

impl RuleKind {
    /// Every defined rule kind, in keyword order.
    pub const ALL: [RuleKind; 4] = [
        RuleKind::Allow,
        RuleKind::AuditAllow,
        RuleKind::NeverAllow,
        RuleKind::DontAudit,
    ];

    /// The policy-language keyword for this kind.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::AuditAllow => "auditallow",
            Self::NeverAllow => "neverallow",
            Self::DontAudit => "dontaudit",
        }
    }

    /// Parse a policy-language keyword.
    ///
    /// # Arguments
    ///
    /// * `value` - The keyword to parse.
    ///
    /// # Returns
    ///
    /// * `Ok(RuleKind)` - The parsed kind.
    /// * `Err` - `QueryError::InvalidRuleKind` naming the offending value,
    ///   for anything outside the four defined keywords.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "allow" => Ok(Self::Allow),
            "auditallow" => Ok(Self::AuditAllow),
            "neverallow" => Ok(Self::NeverAllow),
            "dontaudit" => Ok(Self::DontAudit),
            _ => Err(QueryError::InvalidRuleKind(value.to_string()).into()),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// The rule kinds selected by a search request.
///
/// A search over an empty selection is malformed; the engine rejects it
/// before delegating. Kinds outside the defined vocabulary cannot be
/// represented here at all — the string-facing [`RuleKindSet::from_names`]
/// constructor performs that check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleKindSet {
    kinds: BTreeSet<RuleKind>,
}

impl RuleKindSet {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a selection covering all four rule kinds.
    pub fn all() -> Self {
        RuleKind::ALL.into_iter().collect()
    }

    /// Build a selection from policy-language keywords.
    ///
    /// Validation happens here, before any database involvement: an
    /// unrecognized keyword fails the whole construction.
    ///
    /// # Arguments
    ///
    /// * `names` - The keywords to include.
    ///
    /// # Returns
    ///
    /// * `Ok(RuleKindSet)` - The selection.
    /// * `Err` - `QueryError::InvalidRuleKind` for the first unrecognized
    ///   keyword.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.insert(RuleKind::parse(name.as_ref())?);
        }
        Ok(set)
    }

    /// Add a kind to the selection. Returns `false` if it was already
    /// present.
    pub fn insert(&mut self, kind: RuleKind) -> bool {
        self.kinds.insert(kind)
    }

    /// Check whether a kind is selected.
    pub fn contains(&self, kind: RuleKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Check whether the selection is empty.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// The number of selected kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Iterate over the selected kinds in keyword order.
    pub fn iter(&self) -> impl Iterator<Item = RuleKind> + '_ {
        self.kinds.iter().copied()
    }
}

impl From<RuleKind> for RuleKindSet {
    fn from(kind: RuleKind) -> Self {
        let mut set = Self::new();
        set.insert(kind);
        set
    }
}

impl FromIterator<RuleKind> for RuleKindSet {
    fn from_iter<I: IntoIterator<Item = RuleKind>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for RuleKindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", kind)?;
        }
        Ok(())
    }
}

/// A single rule returned by a search.
///
/// Immutable once produced; a record exists only within the result
/// sequence that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// The rule category.
    pub kind: RuleKind,

    /// The subject type or attribute.
    pub source: String,

    /// The object type or attribute.
    pub target: String,

    /// The security class the permissions apply to.
    pub class: String,

    /// Every permission this rule grants.
    pub permissions: BTreeSet<String>,
}

impl RuleRecord {
    /// Create a new rule record.
    ///
    /// # Arguments
    ///
    /// * `kind` - The rule category.
    /// * `source` - The subject type or attribute.
    /// * `target` - The object type or attribute.
    /// * `class` - The security class.
    /// * `permissions` - The permissions the rule grants.
    pub fn new<P>(
        kind: RuleKind,
        source: impl Into<String>,
        target: impl Into<String>,
        class: impl Into<String>,
        permissions: P,
    ) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            kind,
            source: source.into(),
            target: target.into(),
            class: class.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether this rule grants every permission in `perms`.
    pub fn grants_all<'a, I>(&self, perms: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        perms.into_iter().all(|p| self.permissions.contains(p))
    }

    /// Check whether this rule grants at least one permission in `perms`.
    pub fn grants_any<'a, I>(&self, perms: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        perms.into_iter().any(|p| self.permissions.contains(p))
    }
}

impl fmt::Display for RuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}:{} {{",
            self.kind, self.source, self.target, self.class
        )?;
        for permission in &self.permissions {
            write!(f, " {}", permission)?;
        }
        write!(f, " }};")
    }
}

//! Search criteria and their normalized delegation form.
//!
//! A search request arrives as a rule-kind selection plus a
//! [`SearchCriteria`]; the engine derives a [`RawSearchQuery`] from the
//! pair before handing the request to the policy database.

use serde::{Deserialize, Serialize};

use crate::model::rule::{RuleKind, RuleKindSet};

/// Caller-facing constraints for a rule search.
///
/// Every field is optional; an unset field leaves that dimension
/// unconstrained. The permission list requires a matching rule to grant
/// every named permission — an empty list is no permission constraint at
/// all, and duplicates are tolerated but redundant.
///
/// The indirect flags expand an exact source/target name through
/// attribute membership; the regex flag switches name comparison to
/// regular-expression matching instead. Attribute expansion applies only
/// to exact-name constraints, never to patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Constrain the rule's subject to this type or attribute name.
    #[serde(default)]
    pub source: Option<String>,

    /// Constrain the rule's object to this type or attribute name.
    #[serde(default)]
    pub target: Option<String>,

    /// Constrain the rule's security class.
    #[serde(default)]
    pub class: Option<String>,

    /// Permissions a matching rule must grant in full.
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Expand the source constraint through attribute membership.
    #[serde(default)]
    pub source_indirect: bool,

    /// Expand the target constraint through attribute membership.
    #[serde(default)]
    pub target_indirect: bool,

    /// Treat the source, target, and class constraints as regular
    /// expressions.
    #[serde(default)]
    pub regex: bool,
}

impl SearchCriteria {
    /// Create an unconstrained criteria set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain the rule's subject.
    pub fn with_source(mut self, name: impl Into<String>) -> Self {
        self.source = Some(name.into());
        self
    }

    /// Constrain the rule's object.
    pub fn with_target(mut self, name: impl Into<String>) -> Self {
        self.target = Some(name.into());
        self
    }

    /// Constrain the rule's security class.
    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        self.class = Some(name.into());
        self
    }

    /// Require every listed permission on a matching rule.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Enable attribute expansion for the source constraint.
    pub fn with_source_indirect(mut self, indirect: bool) -> Self {
        self.source_indirect = indirect;
        self
    }

    /// Enable attribute expansion for the target constraint.
    pub fn with_target_indirect(mut self, indirect: bool) -> Self {
        self.target_indirect = indirect;
        self
    }

    /// Switch name constraints to regular-expression matching.
    pub fn with_regex(mut self, regex: bool) -> Self {
        self.regex = regex;
        self
    }

    /// The permission list, possibly empty.
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Check whether a permission containment filter applies.
    pub fn has_permission_filter(&self) -> bool {
        !self.permissions.is_empty()
    }
}

/// The normalized form of a search request, as delegated to the policy
/// database.
///
/// The permission filter travels as `permissions_any`, a comma-joined
/// list the raw matcher treats as "grants at least one of these".
/// Containment of the full set is the engine's post-filter, never the
/// database's job, so the original permission list does not travel in
/// this object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSearchQuery {
    /// Include `allow` rules.
    pub allow: bool,

    /// Include `auditallow` rules.
    pub auditallow: bool,

    /// Include `neverallow` rules.
    pub neverallow: bool,

    /// Include `dontaudit` rules.
    pub dontaudit: bool,

    /// The source constraint, copied verbatim from the criteria.
    pub source: Option<String>,

    /// The target constraint, copied verbatim from the criteria.
    pub target: Option<String>,

    /// The class constraint, copied verbatim from the criteria.
    pub class: Option<String>,

    /// Comma-joined permission names for the coarse any-of match.
    pub permissions_any: Option<String>,

    /// Expand the source constraint through attribute membership.
    pub source_indirect: bool,

    /// Expand the target constraint through attribute membership.
    pub target_indirect: bool,

    /// Treat name constraints as regular expressions.
    pub regex: bool,
}

impl RawSearchQuery {
    /// Normalize a kind selection plus criteria into the delegation form.
    ///
    /// # Arguments
    ///
    /// * `kinds` - The requested rule kinds.
    /// * `criteria` - The caller-facing constraints.
    pub fn from_request(kinds: &RuleKindSet, criteria: &SearchCriteria) -> Self {
        let permissions_any = if criteria.permissions.is_empty() {
            None
        } else {
            Some(criteria.permissions.join(","))
        };

        Self {
            allow: kinds.contains(RuleKind::Allow),
            auditallow: kinds.contains(RuleKind::AuditAllow),
            neverallow: kinds.contains(RuleKind::NeverAllow),
            dontaudit: kinds.contains(RuleKind::DontAudit),
            source: criteria.source.clone(),
            target: criteria.target.clone(),
            class: criteria.class.clone(),
            permissions_any,
            source_indirect: criteria.source_indirect,
            target_indirect: criteria.target_indirect,
            regex: criteria.regex,
        }
    }

    /// Check whether rules of `kind` are requested.
    pub fn includes(&self, kind: RuleKind) -> bool {
        match kind {
            RuleKind::Allow => self.allow,
            RuleKind::AuditAllow => self.auditallow,
            RuleKind::NeverAllow => self.neverallow,
            RuleKind::DontAudit => self.dontaudit,
        }
    }
}

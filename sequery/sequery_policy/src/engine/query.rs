//! Rule search and entity lookup over a policy database.

use sequery_core::error::{QueryError, Result};
use tracing::debug;

use crate::model::{
    EntityKind, PolicyEntity, RawSearchQuery, RuleKindSet, RuleRecord, SearchCriteria,
};
use crate::store::PolicyDatabase;

/// Query engine over a loaded policy.
///
/// The engine owns no policy state of its own: every call validates the
/// request, delegates raw matching to the database, and projects the
/// result back to the caller. Identical calls against an unchanged
/// database return identical, order-stable results, and calls are safe to
/// issue concurrently whenever the database is.
pub struct QueryEngine<D> {
    /// The policy database.
    database: D,
}

impl<D> QueryEngine<D>
where
    D: PolicyDatabase,
{
    /// Create a new query engine.
    ///
    /// # Arguments
    ///
    /// * `database` - The policy database to query.
    pub fn new(database: D) -> Self {
        Self { database }
    }

    /// Access the underlying database.
    pub fn database(&self) -> &D {
        &self.database
    }

    /// Search the policy's access rules.
    ///
    /// The request is validated and normalized before delegation: one
    /// inclusion flag per requested kind, name constraints copied
    /// verbatim, and the permission list comma-joined into the coarse
    /// any-of form the raw matcher understands. The raw result then
    /// passes through the permission containment filter — every
    /// requested permission must be granted by a surviving rule.
    ///
    /// # Arguments
    ///
    /// * `kinds` - The rule kinds to search. Must be non-empty.
    /// * `criteria` - Constraints on the matched rules.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<RuleRecord>)` - Matching rules, in the database's order.
    ///   An empty result is a valid result.
    /// * `Err` - If the request is malformed or the database faults.
    pub fn search(
        &self,
        kinds: &RuleKindSet,
        criteria: &SearchCriteria,
    ) -> Result<Vec<RuleRecord>> {
        if kinds.is_empty() {
            return Err(QueryError::NoRuleKinds.into());
        }

        let raw = RawSearchQuery::from_request(kinds, criteria);
        debug!("Delegating raw rule search for kinds [{}]", kinds);

        let records = self.database.raw_search(&raw)?;

        // The raw matcher only guarantees "grants at least one" for the
        // forwarded permission list; containment of the full set is
        // decided here.
        let required = criteria.permissions();
        if required.is_empty() {
            return Ok(records);
        }

        let candidates = records.len();
        let records: Vec<RuleRecord> = records
            .into_iter()
            .filter(|rule| rule.grants_all(required.iter().map(String::as_str)))
            .collect();
        debug!(
            "Permission containment filter kept {} of {} rules",
            records.len(),
            candidates
        );

        Ok(records)
    }

    /// Look up named policy entities.
    ///
    /// Pure delegation: every entity of `kind` when `name` is `None`,
    /// otherwise the entities matching `name`.
    ///
    /// # Arguments
    ///
    /// * `kind` - The entity kind to retrieve.
    /// * `name` - The entity name, or `None` for all.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PolicyEntity>)` - The matching entities.
    /// * `Err` - If the database faults or the name is malformed.
    pub fn lookup(&self, kind: EntityKind, name: Option<&str>) -> Result<Vec<PolicyEntity>> {
        debug!("Entity lookup for {} '{}'", kind, name.unwrap_or("*"));

        self.database.entity_lookup(kind, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RuleKind, RuleRecord, TypeRecord};
    use crate::store::InMemoryPolicyDatabase;

    fn sample_engine() -> QueryEngine<InMemoryPolicyDatabase> {
        let db = InMemoryPolicyDatabase::new();

        db.add_type(TypeRecord::new("httpd_t")).unwrap();
        db.add_type(TypeRecord::new("httpd_log_t")).unwrap();

        db.add_rule(RuleRecord::new(
            RuleKind::Allow,
            "httpd_t",
            "httpd_log_t",
            "file",
            ["read", "write"],
        ));
        db.add_rule(RuleRecord::new(
            RuleKind::Allow,
            "httpd_t",
            "httpd_config_t",
            "file",
            ["read"],
        ));

        QueryEngine::new(db)
    }

    #[test]
    fn test_search_rejects_empty_kind_selection() {
        let engine = sample_engine();

        let result = engine.search(&RuleKindSet::new(), &SearchCriteria::new());

        assert!(result.is_err());
    }

    #[test]
    fn test_search_permission_containment() {
        let engine = sample_engine();
        let kinds = RuleKindSet::from(RuleKind::Allow);

        // Both rules grant "read"...
        let criteria = SearchCriteria::new().with_permissions(["read"]);
        let rules = engine.search(&kinds, &criteria).unwrap();
        assert_eq!(rules.len(), 2);

        // ...but only the first also grants "write".
        let criteria = SearchCriteria::new().with_permissions(["read", "write"]);
        let rules = engine.search(&kinds, &criteria).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].target, "httpd_log_t");
    }

    #[test]
    fn test_search_without_permission_filter_passes_through() {
        let engine = sample_engine();
        let kinds = RuleKindSet::from(RuleKind::Allow);

        let rules = engine.search(&kinds, &SearchCriteria::new()).unwrap();

        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_search_preserves_database_order() {
        let engine = sample_engine();
        let kinds = RuleKindSet::from(RuleKind::Allow);
        let criteria = SearchCriteria::new().with_permissions(["read"]);

        let rules = engine.search(&kinds, &criteria).unwrap();

        assert_eq!(rules[0].target, "httpd_log_t");
        assert_eq!(rules[1].target, "httpd_config_t");
    }

    #[test]
    fn test_lookup_delegates() {
        let engine = sample_engine();

        let all = engine.lookup(EntityKind::Type, None).unwrap();
        assert_eq!(all.len(), 2);

        let named = engine.lookup(EntityKind::Type, Some("httpd_t")).unwrap();
        assert_eq!(named.len(), 1);
    }
}

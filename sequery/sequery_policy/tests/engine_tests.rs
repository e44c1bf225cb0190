use sequery_core::error::{DatabaseError, Error, Result};
use sequery_policy::model::{
    EntityKind, PolicyEntity, RawSearchQuery, RuleKind, RuleKindSet, RuleRecord, SearchCriteria,
};
use sequery_policy::store::PolicyDatabase;
use sequery_policy::QueryEngine;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A stub database that counts delegations and answers every search with
/// a canned rule list.
struct CountingDatabase {
    canned: Vec<RuleRecord>,
    searches: AtomicUsize,
    lookups: AtomicUsize,
}

impl CountingDatabase {
    fn new(canned: Vec<RuleRecord>) -> Self {
        Self {
            canned,
            searches: AtomicUsize::new(0),
            lookups: AtomicUsize::new(0),
        }
    }

    fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl PolicyDatabase for CountingDatabase {
    fn raw_search(&self, _query: &RawSearchQuery) -> Result<Vec<RuleRecord>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(self.canned.clone())
    }

    fn entity_lookup(&self, _kind: EntityKind, _name: Option<&str>) -> Result<Vec<PolicyEntity>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

/// A database that fails every call.
struct FaultyDatabase;

impl PolicyDatabase for FaultyDatabase {
    fn raw_search(&self, _query: &RawSearchQuery) -> Result<Vec<RuleRecord>> {
        Err(DatabaseError::Unavailable("policy not loaded".to_string()).into())
    }

    fn entity_lookup(&self, _kind: EntityKind, _name: Option<&str>) -> Result<Vec<PolicyEntity>> {
        Err(DatabaseError::Unavailable("policy not loaded".to_string()).into())
    }
}

fn two_rule_fixture() -> Vec<RuleRecord> {
    vec![
        RuleRecord::new(
            RuleKind::Allow,
            "httpd_t",
            "httpd_log_t",
            "file",
            ["read", "write"],
        ),
        RuleRecord::new(
            RuleKind::Allow,
            "httpd_t",
            "httpd_config_t",
            "file",
            ["read"],
        ),
    ]
}

#[test]
fn every_nonempty_kind_subset_searches_without_error() {
    let engine = QueryEngine::new(CountingDatabase::new(Vec::new()));

    for mask in 1u32..16 {
        let kinds: RuleKindSet = RuleKind::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, kind)| kind)
            .collect();

        let result = engine.search(&kinds, &SearchCriteria::new());
        assert!(result.is_ok(), "subset {:04b} failed: {:?}", mask, result);
    }

    assert_eq!(engine.database().search_count(), 15);
}

#[test]
fn unknown_rule_kind_fails_before_any_delegation() {
    let engine = QueryEngine::new(CountingDatabase::new(Vec::new()));

    // The string-facing constructor is where out-of-vocabulary kinds are
    // caught; no engine call ever happens.
    let result = RuleKindSet::from_names(["allow", "allowaudit"]);
    assert!(result.is_err());
    let display = format!("{}", result.unwrap_err());
    assert!(display.contains("allowaudit"));

    assert_eq!(engine.database().search_count(), 0);
}

#[test]
fn empty_kind_selection_fails_without_delegation() {
    let engine = QueryEngine::new(CountingDatabase::new(two_rule_fixture()));

    let result = engine.search(&RuleKindSet::new(), &SearchCriteria::new());

    assert!(matches!(result, Err(Error::Query(_))));
    assert_eq!(engine.database().search_count(), 0);
}

#[test]
fn unknown_entity_kind_fails_before_any_delegation() {
    let engine = QueryEngine::new(CountingDatabase::new(Vec::new()));

    let result = EntityKind::parse("portcon");
    assert!(result.is_err());

    assert_eq!(engine.database().lookup_count(), 0);
}

#[test]
fn search_is_idempotent() {
    let engine = QueryEngine::new(CountingDatabase::new(two_rule_fixture()));
    let kinds = RuleKindSet::from(RuleKind::Allow);
    let criteria = SearchCriteria::new().with_permissions(["read"]);

    let first = engine.search(&kinds, &criteria).unwrap();
    let second = engine.search(&kinds, &criteria).unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.database().search_count(), 2);
}

#[test]
fn permission_filter_requires_every_permission() {
    let engine = QueryEngine::new(CountingDatabase::new(two_rule_fixture()));
    let kinds = RuleKindSet::from(RuleKind::Allow);

    // Both fixture rules grant "read".
    let criteria = SearchCriteria::new().with_permissions(["read"]);
    let rules = engine.search(&kinds, &criteria).unwrap();
    assert_eq!(rules.len(), 2);

    // Only the first grants both "read" and "write".
    let criteria = SearchCriteria::new().with_permissions(["read", "write"]);
    let rules = engine.search(&kinds, &criteria).unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].target, "httpd_log_t");

    // No rule grants "unlink".
    let criteria = SearchCriteria::new().with_permissions(["read", "unlink"]);
    let rules = engine.search(&kinds, &criteria).unwrap();
    assert!(rules.is_empty());
}

#[test]
fn empty_raw_result_passes_through() {
    let engine = QueryEngine::new(CountingDatabase::new(Vec::new()));
    let kinds = RuleKindSet::all();
    let criteria = SearchCriteria::new().with_permissions(["read", "write"]);

    let rules = engine.search(&kinds, &criteria).unwrap();

    assert!(rules.is_empty());
    assert_eq!(engine.database().search_count(), 1);
}

#[test]
fn database_faults_propagate_unchanged() {
    let engine = QueryEngine::new(FaultyDatabase);

    let result = engine.search(&RuleKindSet::all(), &SearchCriteria::new());
    assert!(matches!(
        result,
        Err(Error::Database(DatabaseError::Unavailable(_)))
    ));

    let result = engine.lookup(EntityKind::Role, None);
    assert!(matches!(
        result,
        Err(Error::Database(DatabaseError::Unavailable(_)))
    ));
}

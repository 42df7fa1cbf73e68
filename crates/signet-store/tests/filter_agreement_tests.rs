// The SQL rendering of a filter must select exactly the documents that
// DocumentFilter::matches accepts in memory.

mod common;

use chrono::{TimeZone, Utc};
use common::{doc_phid, Fixture};
use proptest::prelude::*;
use signet_core::pager::{PageRequest, SortOrder};
use signet_core::predicate::{DocumentFilter, Predicate};
use signet_core::storage::DocumentStorage;
use signet_store::SqliteStorage;
use std::collections::{BTreeMap, BTreeSet};

const USERS: [&str; 4] = ["PHID-USER-a", "PHID-USER-b", "PHID-USER-c", "PHID-USER-d"];

#[derive(Debug, Clone)]
struct DocSpec {
    creator: usize,
    created_at: i64,
    contributors: BTreeSet<usize>,
}

fn arb_docs() -> impl Strategy<Value = Vec<DocSpec>> {
    proptest::collection::vec(
        (
            0..USERS.len(),
            0_i64..10,
            proptest::collection::btree_set(0..USERS.len(), 0..3),
        )
            .prop_map(|(creator, created_at, contributors)| DocSpec {
                creator,
                created_at,
                contributors,
            }),
        0..12,
    )
}

fn users(indices: BTreeSet<usize>) -> BTreeSet<String> {
    indices.into_iter().map(|i| USERS[i].to_string()).collect()
}

fn arb_predicate() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        proptest::collection::btree_set(1_i64..14, 0..4).prop_map(Predicate::Ids),
        proptest::collection::btree_set(1_i64..14, 0..4)
            .prop_map(|ids| Predicate::Phids(ids.into_iter().map(doc_phid).collect())),
        proptest::collection::btree_set(0..USERS.len(), 0..3)
            .prop_map(|u| Predicate::CreatorPhids(users(u))),
        proptest::collection::btree_set(0..USERS.len(), 0..3)
            .prop_map(|u| Predicate::ContributorPhids(users(u))),
        (0_i64..10).prop_map(|t| Predicate::CreatedAfter(Utc.timestamp_opt(t, 0).unwrap())),
        (0_i64..10).prop_map(|t| Predicate::CreatedBefore(Utc.timestamp_opt(t, 0).unwrap())),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_sql_agrees_with_in_memory_filter(
        docs in arb_docs(),
        predicates in proptest::collection::vec(arb_predicate(), 0..4),
    ) {
        let fx = Fixture::new();
        let mut contributors_by_phid: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (i, spec) in docs.iter().enumerate() {
            let id = i as i64 + 1;
            let phid = fx.document(id, USERS[spec.creator], 1, spec.created_at);
            for (seq, user) in spec.contributors.iter().enumerate() {
                fx.contributor(&phid, USERS[*user], seq as i64);
            }
            contributors_by_phid.insert(phid, users(spec.contributors.clone()));
        }

        let mut filter = DocumentFilter::new();
        for predicate in predicates {
            filter.push(predicate);
        }

        let storage = SqliteStorage::new(&fx.conn);
        let all = storage
            .fetch_documents(&PageRequest {
                filter: DocumentFilter::new(),
                order: SortOrder::Ascending,
                after: None,
                limit: 100,
            })
            .unwrap();
        let expected: Vec<i64> = all
            .iter()
            .filter(|d| filter.matches(d, &contributors_by_phid[&d.phid]))
            .map(|d| d.id)
            .collect();

        let selected: Vec<i64> = storage
            .fetch_documents(&PageRequest {
                filter,
                order: SortOrder::Ascending,
                after: None,
                limit: 100,
            })
            .unwrap()
            .iter()
            .map(|d| d.id)
            .collect();

        prop_assert_eq!(selected, expected);
    }
}

//! Property-based tests for the diff engine

use std::collections::BTreeSet;

use indexer_core::{IndexDescriptor, IndexKey, diff_collection};
use proptest::prelude::*;

fn descriptor(name: String, order: i64) -> IndexDescriptor {
    IndexDescriptor::new(name.clone(), vec![IndexKey::new(name, order)])
}

fn index_list() -> impl Strategy<Value = Vec<IndexDescriptor>> {
    prop::collection::vec(("idx_[a-f]", prop_oneof![Just(1i64), Just(-1i64)]), 0..8)
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(name, order)| descriptor(name, order))
                .collect()
        })
}

fn names(indexes: &[IndexDescriptor]) -> BTreeSet<String> {
    indexes.iter().map(|index| index.name.clone()).collect()
}

proptest! {
    #[test]
    fn diff_is_deterministic(desired in index_list(), live in index_list()) {
        prop_assert_eq!(diff_collection(&desired, &live), diff_collection(&desired, &live));
    }

    #[test]
    fn diff_against_itself_is_empty(indexes in index_list()) {
        let diff = diff_collection(&indexes, &indexes);
        prop_assert!(diff.is_unchanged());
        prop_assert!(diff.drifted.is_empty());
    }

    #[test]
    fn additions_and_removals_follow_name_sets(desired in index_list(), live in index_list()) {
        let diff = diff_collection(&desired, &live);
        let desired_names = names(&desired);
        let live_names = names(&live);

        let added: BTreeSet<String> = diff.to_add.keys().cloned().collect();
        let removed: BTreeSet<String> = diff.to_remove.keys().cloned().collect();

        let expected_added: BTreeSet<String> =
            desired_names.difference(&live_names).cloned().collect();
        let expected_removed: BTreeSet<String> =
            live_names.difference(&desired_names).cloned().collect();

        prop_assert_eq!(&added, &expected_added);
        prop_assert_eq!(&removed, &expected_removed);
        prop_assert!(added.is_disjoint(&removed));
        prop_assert!(
            diff.drifted
                .iter()
                .all(|name| desired_names.contains(name) && live_names.contains(name))
        );
    }

    #[test]
    fn applying_the_diff_converges(desired in index_list(), live in index_list()) {
        let diff = diff_collection(&desired, &live);

        let mut converged: Vec<IndexDescriptor> = live
            .iter()
            .filter(|index| !diff.to_remove.contains_key(&index.name))
            .cloned()
            .collect();
        converged.extend(diff.to_add.values().cloned());

        let rediff = diff_collection(&desired, &converged);
        prop_assert!(rediff.is_unchanged());
    }
}

//! Diff engine
//!
//! Compares desired and live index sets per collection, keyed by index name.
//!
//! Matching is by name only. An index whose name exists on both sides is left
//! alone even when its definition differs: reruns without intervening changes
//! are no-ops and the plan shows the names operators expect, at the cost of
//! not catching a stale definition under an unchanged name. Such names are
//! reported in [`IndexDiff::drifted`] for display and never acted upon.
//!
//! Collections that exist live but have no config entry are unmanaged and
//! never appear in the diff. Collections that are configured but do not exist
//! live are listed in [`IndexDiff::missing_collections`] and skipped.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::Result;
use crate::catalog::IndexCatalog;
use crate::model::{CollectionConfig, IndexDescriptor};
use crate::snapshot::SnapshotReader;

/// Indexes keyed by name
pub type IndexSet = BTreeMap<String, IndexDescriptor>;

/// Difference for a single collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionDiff {
    /// Desired but not live
    pub to_add: IndexSet,
    /// Live but not desired
    pub to_remove: IndexSet,
    /// Present on both sides with differing definitions; left unchanged
    pub drifted: BTreeSet<String>,
}

impl CollectionDiff {
    /// True when nothing would be created or dropped.
    pub fn is_unchanged(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Difference between the desired config and the live database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexDiff {
    /// collection -> indexes to drop
    pub to_remove: BTreeMap<String, IndexSet>,
    /// collection -> indexes to create
    pub to_add: BTreeMap<String, IndexSet>,
    /// collection -> names whose definitions differ but are kept
    pub drifted: BTreeMap<String, BTreeSet<String>>,
    /// Configured collections that do not exist live
    pub missing_collections: BTreeSet<String>,
}

impl IndexDiff {
    /// True when no collection has anything to create or drop.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn has_changes(&self, collection: &str) -> bool {
        self.to_add.contains_key(collection) || self.to_remove.contains_key(collection)
    }

    pub fn removals(&self, collection: &str) -> impl Iterator<Item = &IndexDescriptor> {
        self.to_remove
            .get(collection)
            .into_iter()
            .flat_map(|set| set.values())
    }

    pub fn additions(&self, collection: &str) -> impl Iterator<Item = &IndexDescriptor> {
        self.to_add
            .get(collection)
            .into_iter()
            .flat_map(|set| set.values())
    }

    pub fn drifted_names(&self, collection: &str) -> impl Iterator<Item = &String> {
        self.drifted
            .get(collection)
            .into_iter()
            .flat_map(|names| names.iter())
    }

    fn insert(&mut self, collection: &str, diff: CollectionDiff) {
        if !diff.to_add.is_empty() {
            self.to_add.insert(collection.to_string(), diff.to_add);
        }
        if !diff.to_remove.is_empty() {
            self.to_remove.insert(collection.to_string(), diff.to_remove);
        }
        if !diff.drifted.is_empty() {
            self.drifted.insert(collection.to_string(), diff.drifted);
        }
    }
}

/// Name-keyed map of a descriptor list. Later duplicates replace earlier
/// ones; the identity index is dropped.
fn by_name(indexes: &[IndexDescriptor]) -> IndexSet {
    indexes
        .iter()
        .filter(|index| !index.is_identity())
        .map(|index| (index.name.clone(), index.clone()))
        .collect()
}

/// Compare one collection's desired and live index lists.
pub fn diff_collection(desired: &[IndexDescriptor], live: &[IndexDescriptor]) -> CollectionDiff {
    let desired = by_name(desired);
    let live = by_name(live);

    let mut diff = CollectionDiff::default();

    for (name, index) in &desired {
        match live.get(name) {
            None => {
                diff.to_add.insert(name.clone(), index.clone());
            }
            Some(current) if current != index => {
                diff.drifted.insert(name.clone());
            }
            Some(_) => {}
        }
    }

    for (name, index) in &live {
        if !desired.contains_key(name) {
            diff.to_remove.insert(name.clone(), index.clone());
        }
    }

    diff
}

/// Compute the diff of every configured collection against the catalog.
///
/// Listing or decoding failures abort the whole computation.
pub fn diff(desired: &[CollectionConfig], catalog: &dyn IndexCatalog) -> Result<IndexDiff> {
    let reader = SnapshotReader::new(catalog);
    let live_collections: HashSet<String> =
        reader.list_collection_names()?.into_iter().collect();

    // Later entries for the same collection replace earlier ones.
    let configured: BTreeMap<&str, &CollectionConfig> = desired
        .iter()
        .map(|config| (config.collection.as_str(), config))
        .collect();

    let mut result = IndexDiff::default();

    for (collection, config) in configured {
        if !live_collections.contains(collection) {
            warn!(collection, "Configured collection does not exist, skipping");
            result.missing_collections.insert(collection.to_string());
            continue;
        }

        let live = reader.collection_indexes(collection)?;
        let collection_diff = diff_collection(&config.indexes, &live);

        debug!(
            collection,
            add = collection_diff.to_add.len(),
            remove = collection_diff.to_remove.len(),
            drifted = collection_diff.drifted.len(),
            "Computed collection diff"
        );
        for name in &collection_diff.drifted {
            warn!(
                collection,
                index = %name,
                "Index definition differs from config, left unchanged"
            );
        }

        result.insert(collection, collection_diff);
    }

    Ok(result)
}

//! Fetch command
//!
//! Snapshots the live indexes into the config file.

use std::io::Write;

use colored::Colorize;
use indexer_core::{ConfigStore, IndexCatalog, SnapshotReader};

use crate::error::Result;

/// Overwrite the config file with the database's current indexes.
pub fn run_fetch(
    catalog: &dyn IndexCatalog,
    store: &ConfigStore,
    out: &mut impl Write,
) -> Result<()> {
    let snapshot = SnapshotReader::new(catalog).snapshot()?;
    store.save(&snapshot)?;

    let indexes: usize = snapshot.iter().map(|c| c.indexes.len()).sum();
    writeln!(
        out,
        "{} {} index(es) from {} collection(s) to {}",
        "Wrote".green().bold(),
        indexes,
        snapshot.len(),
        store.path().display()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexer_core::{CollectionConfig, IndexDescriptor, IndexKey};
    use indexer_test_utils::MemoryCatalog;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_fetch_writes_snapshot_without_views() {
        let email =
            IndexDescriptor::new("idx_email", vec![IndexKey::new("email", 1)]).with_unique();
        let catalog = MemoryCatalog::new("app")
            .with_collection("users", vec![email.clone()])
            .with_collection("orders", vec![])
            .with_view("recent_users");
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(temp.path().join("indexes.yaml"));

        let mut out = Vec::new();
        run_fetch(&catalog, &store, &mut out).unwrap();

        assert_eq!(
            store.load().unwrap(),
            vec![
                CollectionConfig::new("users", vec![email]),
                CollectionConfig::new("orders", vec![]),
            ]
        );
    }

    #[test]
    fn test_fetch_leaves_config_untouched_on_failure() {
        let catalog = MemoryCatalog::new("app");
        catalog.set_unreachable(true);
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(temp.path().join("indexes.json"));

        let mut out = Vec::new();
        assert!(run_fetch(&catalog, &store, &mut out).is_err());
        assert!(!store.path().exists());
    }
}

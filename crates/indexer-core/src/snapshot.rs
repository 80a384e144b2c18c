//! Snapshot reader
//!
//! Reads the current index definitions from a live catalog into the
//! canonical model. Read-only.

use tracing::debug;

use crate::catalog::IndexCatalog;
use crate::model::{CollectionConfig, IDENTITY_INDEX, IndexDescriptor};
use crate::{Error, Result};

/// Prefix of the server's reserved collections, which carry no user indexes.
const SYSTEM_PREFIX: &str = "system.";

/// Reads live index state through an [`IndexCatalog`]
pub struct SnapshotReader<'a> {
    catalog: &'a dyn IndexCatalog,
}

impl<'a> SnapshotReader<'a> {
    pub fn new(catalog: &'a dyn IndexCatalog) -> Self {
        Self { catalog }
    }

    /// Collection names in catalog order, without `system.*` collections.
    pub fn list_collection_names(&self) -> Result<Vec<String>> {
        let names = self.catalog.list_collection_names()?;
        Ok(names
            .into_iter()
            .filter(|name| !name.starts_with(SYSTEM_PREFIX))
            .collect())
    }

    /// Lazily decode the indexes of one collection, skipping the identity
    /// index.
    ///
    /// The native documents are fetched up front; each item is decoded when
    /// the iterator reaches it.
    pub fn indexes(
        &self,
        collection: &str,
    ) -> Result<impl Iterator<Item = Result<IndexDescriptor>> + use<>> {
        let documents = self.catalog.list_indexes(collection)?;
        debug!(collection, count = documents.len(), "Listed indexes");

        let collection = collection.to_string();
        Ok(documents
            .into_iter()
            .filter(|doc| !doc.get_str("name").is_ok_and(|name| name == IDENTITY_INDEX))
            .map(move |doc| {
                IndexDescriptor::from_document(&doc).map_err(|source| Error::Decode {
                    collection: collection.clone(),
                    source,
                })
            }))
    }

    /// All non-identity indexes of one collection.
    pub fn collection_indexes(&self, collection: &str) -> Result<Vec<IndexDescriptor>> {
        self.indexes(collection)?.collect()
    }

    /// Snapshot every collection into config form.
    pub fn snapshot(&self) -> Result<Vec<CollectionConfig>> {
        self.list_collection_names()?
            .into_iter()
            .map(|collection| {
                let indexes = self.collection_indexes(&collection)?;
                Ok(CollectionConfig::new(collection, indexes))
            })
            .collect()
    }
}

//! Database boundary
//!
//! Everything the engine needs from a live database goes through
//! [`IndexCatalog`]. The MongoDB driver implementation lives in
//! `indexer-mongo`; tests use the in-memory catalog from `indexer-test-utils`.

use bson::Document;

use crate::Result;
use crate::model::IndexDescriptor;

/// Index operations against one database.
///
/// Implementations hold the connection; callers pass the catalog explicitly
/// to every component instead of reaching for a global handle.
pub trait IndexCatalog {
    /// Name of the target database, used for display.
    fn database_name(&self) -> &str;

    /// Names of the collections in the database, in server order. Views are
    /// not collections and are never returned.
    ///
    /// Fails with [`Error::Connection`](crate::Error::Connection) when the
    /// database cannot be reached and with [`Error::Listing`](crate::Error::Listing)
    /// when it refuses the listing.
    fn list_collection_names(&self) -> Result<Vec<String>>;

    /// Native index documents of one collection, including the identity
    /// index. Filtering and decoding happen in
    /// [`SnapshotReader`](crate::SnapshotReader).
    ///
    /// A refusal (unknown namespace, a view, missing privileges) is an
    /// [`Error::Listing`](crate::Error::Listing) naming `<database>.<collection>`.
    fn list_indexes(&self, collection: &str) -> Result<Vec<Document>>;

    /// Create one index from its descriptor.
    ///
    /// Rejections are reported as [`Error::Operation`](crate::Error::Operation).
    fn create_index(&self, collection: &str, index: &IndexDescriptor) -> Result<()>;

    /// Drop one index by name.
    ///
    /// Rejections are reported as [`Error::Operation`](crate::Error::Operation).
    fn drop_index(&self, collection: &str, name: &str) -> Result<()>;
}

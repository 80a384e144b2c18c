//! Core engine for mongo-indexer
//!
//! Reconciles the indexes of a database against a declarative config:
//!
//! - **Model**: canonical [`IndexDescriptor`] built from native index
//!   documents or from the config artifact
//! - **Snapshot**: [`SnapshotReader`] reads live indexes through an [`IndexCatalog`]
//! - **Config**: [`ConfigStore`] loads and saves the desired state
//! - **Diff**: [`diff`] compares desired and live sets by index name
//! - **Apply**: [`ApplyExecutor`] drops and creates indexes per the diff
//!
//! # Architecture
//!
//! ```text
//!          indexer-cli
//!               |
//!          indexer-core  <-- IndexCatalog --  indexer-mongo
//! ```
//!
//! # Example
//!
//! ```ignore
//! use indexer_core::{ApplyExecutor, ConfigStore, SnapshotReader, diff};
//!
//! fn reconcile(catalog: &dyn indexer_core::IndexCatalog) -> indexer_core::Result<()> {
//!     let desired = ConfigStore::new("indexes.json").load()?;
//!     let plan = diff(&desired, catalog)?;
//!     let collections = SnapshotReader::new(catalog).list_collection_names()?;
//!     let report = ApplyExecutor::new(catalog).apply(&plan, &collections);
//!     assert!(report.is_success());
//!     Ok(())
//! }
//! ```

pub mod apply;
pub mod catalog;
pub mod config;
pub mod diff;
pub mod error;
mod io;
pub mod model;
pub mod snapshot;

pub use apply::{AppliedChange, ApplyExecutor, ApplyReport};
pub use catalog::IndexCatalog;
pub use config::{ConfigFormat, ConfigStore};
pub use diff::{CollectionDiff, IndexDiff, IndexSet, diff, diff_collection};
pub use error::{Error, OperationKind, Result};
pub use model::{
    CollationOptions, CollectionConfig, IDENTITY_INDEX, IndexDescriptor, IndexKey, KeyKind,
    ModelError,
};
pub use snapshot::SnapshotReader;

//! Apply executor
//!
//! Executes an [`IndexDiff`] against the catalog: for each live collection,
//! drop every index in `to_remove`, then create every index in `to_add`.
//!
//! Failure policy is the same for drops and creates: the error is logged with
//! collection and index context, collected into the [`ApplyReport`], and
//! processing continues with the next operation. Nothing is retried and
//! nothing is rolled back; a partial apply leaves the database in a mixed
//! state that the next diff will show.

use serde::Serialize;
use tracing::{error, info, warn};

use crate::catalog::IndexCatalog;
use crate::diff::IndexDiff;
use crate::error::OperationKind;
use crate::{Error, Result};

/// One index operation that succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChange {
    pub kind: OperationKind,
    pub collection: String,
    pub index: String,
}

/// Outcome of an apply pass
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Successful operations, in execution order
    pub applied: Vec<AppliedChange>,
    /// Failed operations, in execution order
    pub errors: Vec<Error>,
    /// Configured collections skipped because they do not exist live
    pub skipped: Vec<String>,
}

impl ApplyReport {
    /// True when every attempted operation succeeded.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Successful operations on one collection.
    pub fn applied_for<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = &'a AppliedChange> + 'a {
        self.applied
            .iter()
            .filter(move |change| change.collection == collection)
    }

    /// Failed operations on one collection.
    pub fn errors_for<'a>(&'a self, collection: &'a str) -> impl Iterator<Item = &'a Error> + 'a {
        self.errors.iter().filter(move |err| {
            matches!(err, Error::Operation { collection: c, .. } if c == collection)
        })
    }

    fn record(&mut self, kind: OperationKind, collection: &str, index: &str, outcome: Result<()>) {
        match outcome {
            Ok(()) => {
                info!(collection, index, %kind, "Index operation applied");
                self.applied.push(AppliedChange {
                    kind,
                    collection: collection.to_string(),
                    index: index.to_string(),
                });
            }
            Err(err) => {
                error!(collection, index, %kind, error = %err, "Index operation failed");
                self.errors.push(err);
            }
        }
    }
}

/// Issues create/drop operations for a diff
pub struct ApplyExecutor<'a> {
    catalog: &'a dyn IndexCatalog,
}

impl<'a> ApplyExecutor<'a> {
    pub fn new(catalog: &'a dyn IndexCatalog) -> Self {
        Self { catalog }
    }

    /// Apply the diff for the given live collections, in order.
    ///
    /// Only collections in `collections` are touched, so entries for
    /// collections that do not exist live are never executed. Those are
    /// reported in [`ApplyReport::skipped`].
    pub fn apply(&self, diff: &IndexDiff, collections: &[String]) -> ApplyReport {
        let mut report = ApplyReport::default();

        for collection in collections {
            if !diff.has_changes(collection) {
                continue;
            }

            for index in diff.removals(collection) {
                let outcome = self.catalog.drop_index(collection, &index.name);
                report.record(OperationKind::Drop, collection, &index.name, outcome);
            }

            for index in diff.additions(collection) {
                let outcome = self.catalog.create_index(collection, index);
                report.record(OperationKind::Create, collection, &index.name, outcome);
            }
        }

        for collection in &diff.missing_collections {
            warn!(collection = %collection, "Collection does not exist, not applied");
            report.skipped.push(collection.clone());
        }

        report
    }
}

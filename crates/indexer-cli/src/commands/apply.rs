//! Apply command
//!
//! Prints the plan, executes it and reports every operation.

use std::io::Write;

use indexer_core::{ApplyExecutor, CollectionConfig, IndexCatalog, SnapshotReader, diff};

use crate::error::{CliError, Result};
use crate::render;

/// Drop and create indexes so the database matches `desired`.
///
/// Fails after the whole pass when any single operation failed.
pub fn run_apply(
    catalog: &dyn IndexCatalog,
    desired: &[CollectionConfig],
    out: &mut impl Write,
) -> Result<()> {
    let collections = SnapshotReader::new(catalog).list_collection_names()?;
    let plan = diff(desired, catalog)?;

    render::render_plan(out, catalog.database_name(), &collections, &plan)?;

    let report = ApplyExecutor::new(catalog).apply(&plan, &collections);
    render::render_report(out, &report)?;

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} index operation(s) failed",
            report.errors.len()
        )))
    }
}

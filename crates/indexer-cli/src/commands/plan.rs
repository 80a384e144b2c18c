//! Dry-run command
//!
//! Computes the diff between config and database and prints it.

use std::io::Write;

use indexer_core::{CollectionConfig, IndexCatalog, SnapshotReader, diff};

use crate::error::Result;
use crate::render;

/// Print the plan without touching the database.
pub fn run_plan(
    catalog: &dyn IndexCatalog,
    desired: &[CollectionConfig],
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let collections = SnapshotReader::new(catalog).list_collection_names()?;
    let plan = diff(desired, catalog)?;

    if json {
        render::render_json(out, &plan)
    } else {
        render::render_plan(out, catalog.database_name(), &collections, &plan)
    }
}

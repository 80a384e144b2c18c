//! Plan and report rendering
//!
//! Everything here writes to the given output stream and nothing else.

use std::io::Write;

use colored::Colorize;
use indexer_core::{ApplyReport, IndexDescriptor, IndexDiff, OperationKind};
use serde_json::json;

use crate::error::Result;

/// Describe one index as `<name>: <key> <options>`.
fn describe(index: &IndexDescriptor) -> String {
    let options = index.option_labels();
    if options.is_empty() {
        format!("{}: {}", index.name, index.key_summary())
    } else {
        format!("{}: {} {}", index.name, index.key_summary(), options.join(", "))
    }
}

/// Render the human-readable plan.
///
/// `collections` are the live collection names in catalog order. Configured
/// collections missing from the database are reported after them.
pub fn render_plan(
    out: &mut impl Write,
    database: &str,
    collections: &[String],
    diff: &IndexDiff,
) -> Result<()> {
    for collection in collections {
        writeln!(out, "{}", format!("{database}.{collection}").bold())?;

        if !diff.has_changes(collection) {
            writeln!(out, "  {}", "No index changes".green())?;
        } else {
            for index in diff.removals(collection) {
                writeln!(out, "  {}", format!("- {}", describe(index)).red())?;
            }
            for index in diff.additions(collection) {
                writeln!(out, "  {}", format!("+ {}", describe(index)).green())?;
            }
        }

        for name in diff.drifted_names(collection) {
            let line = format!("~ {name}: definition differs from config, left unchanged");
            writeln!(out, "  {}", line.yellow())?;
        }
    }

    for collection in &diff.missing_collections {
        writeln!(
            out,
            "{} {database}.{collection}: collection does not exist, skipped",
            "warning:".yellow().bold()
        )?;
    }

    Ok(())
}

/// Render the plan as pretty JSON for scripting.
pub fn render_json(out: &mut impl Write, diff: &IndexDiff) -> Result<()> {
    let output = json!({
        "has_changes": !diff.is_empty(),
        "to_add": diff.to_add,
        "to_remove": diff.to_remove,
        "drifted": diff.drifted,
        "missing_collections": diff.missing_collections,
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

/// Render what an apply pass did.
pub fn render_report(out: &mut impl Write, report: &ApplyReport) -> Result<()> {
    if report.applied.is_empty() && report.errors.is_empty() {
        writeln!(out, "{} Nothing to apply", "OK".green().bold())?;
        return Ok(());
    }

    writeln!(out)?;
    for change in &report.applied {
        let verb = match change.kind {
            OperationKind::Create => "created".green(),
            OperationKind::Drop => "dropped".red(),
        };
        writeln!(out, "  {} {}.{}", verb, change.collection, change.index)?;
    }
    for error in &report.errors {
        writeln!(out, "  {} {}", "!".red().bold(), error)?;
    }

    writeln!(out)?;
    if report.is_success() {
        writeln!(
            out,
            "{} Applied {} change(s)",
            "OK".green().bold(),
            report.applied.len()
        )?;
    } else {
        writeln!(
            out,
            "{} Applied {} change(s), {} failed",
            "Errors".red().bold(),
            report.applied.len(),
            report.errors.len()
        )?;
    }
    Ok(())
}

//! Command implementations for indexer
//!
//! Each command works against any [`IndexCatalog`](indexer_core::IndexCatalog)
//! and writes its report to the given output stream.

pub mod apply;
pub mod fetch;
pub mod plan;

pub use apply::run_apply;
pub use fetch::run_fetch;
pub use plan::run_plan;

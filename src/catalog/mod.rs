// src/catalog/mod.rs
// =============================================================================
// This module holds the resource catalog.
//
// Submodules:
// - record: ResourceRecord and the normalizer that builds records from
//           raw repository entries
// - store:  CatalogStore, which keeps the latest complete catalog
// - filter: search + category filtering and the category selector
//
// Nothing in here does I/O. The library facade feeds it entries fetched by
// the github module and reads the results back out.
//
// Rust concepts:
// - Modules: one concern per file
// - pub use: callers write `catalog::Catalog`, not `catalog::store::Catalog`
// =============================================================================

pub mod filter;
pub mod record;
pub mod store;

pub use filter::{apply, CategoryList, CategoryOption, FilterCriteria, FilterOutcome};
pub use record::{normalize, ResourceRecord};
pub use store::{Catalog, CatalogStore};

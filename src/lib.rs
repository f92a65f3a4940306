// src/lib.rs
// =============================================================================
// repo-shelf: browse the files of a GitHub repository as a categorized,
// searchable resource library.
//
// Flow of a rebuild:
//   BranchResolver -> TreeEnumerator -> normalize -> CatalogStore -> filter
//
// The binary in src/main.rs is one possible front end; anything that can
// render a list of records with links can drive `ResourceLibrary`.
//
// Modules:
// - config:  where the repository settings come from
// - github:  API client, error classification, branch + tree enumeration
// - catalog: records, the catalog store and filtering
// - links:   view/download URLs for a record
// - library: the facade that ties all of the above together
// =============================================================================

pub mod catalog;
pub mod config;
pub mod github;
pub mod library;
pub mod links;

// The handful of types a front end needs
pub use catalog::{Catalog, CategoryList, CategoryOption, FilterCriteria, ResourceRecord};
pub use config::{ConfigError, RepoConfig};
pub use github::{ErrorKind, Strategy};
pub use library::{RebuildError, RebuildReport, ResourceLibrary, ViewState};
pub use links::{is_binary, LinkBuilder, ResourceLinks};

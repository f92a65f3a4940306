// src/github/tree.rs
// =============================================================================
// This module lists the paths stored in a repository.
//
// Two strategies produce the same kind of output (batches of path + type):
//
// 1. RecursiveTree: branch -> commit SHA -> one recursive tree request.
//    Sees every file no matter how deeply nested.
//
// 2. DirectoryWalk: list the root, treat each root directory as a category
//    and list it once more. Exactly two levels are visited: root files and
//    the files directly inside each root directory. Anything deeper is not
//    discovered. One request per category, issued one after another.
//
// A failing category listing is recorded and skipped. A failing root listing
// or SHA lookup aborts the whole enumeration.
//
// Rust concepts:
// - Traits + Box<dyn Trait>: the strategy is picked at runtime
// - async_trait: async methods in a trait object
// - Iterator chains: map/filter/collect over API items
// =============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::client::GitHubClient;
use super::error::{ErrorKind, FetchError};

// How the repository contents are enumerated
//
// Parsed from `--strategy` on the command line and from STRATEGY in the
// config file (both spelled in kebab-case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One recursive tree request keyed by the branch's commit SHA
    Recursive,
    /// Root listing plus one listing per top-level directory
    DirectoryWalk,
}

impl Strategy {
    // Builds the enumerator for this strategy
    //
    // Returns: Box<dyn TreeEnumerator> so callers don't care which one it is
    pub fn enumerator(self) -> Box<dyn TreeEnumerator> {
        match self {
            Strategy::Recursive => Box::new(RecursiveTree),
            Strategy::DirectoryWalk => Box::new(DirectoryWalk),
        }
    }
}

// What a listed path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file ("blob" in trees, "file" in contents listings)
    File,
    /// A directory ("tree" / "dir")
    Dir,
    /// Submodules, symlinks and anything else that is neither
    Other,
}

impl EntryKind {
    // Git tree API vocabulary
    fn from_tree_type(kind: &str) -> Self {
        match kind {
            "blob" => EntryKind::File,
            "tree" => EntryKind::Dir,
            _ => EntryKind::Other,
        }
    }

    // Contents API vocabulary
    fn from_contents_type(kind: &str) -> Self {
        match kind {
            "file" => EntryKind::File,
            "dir" => EntryKind::Dir,
            _ => EntryKind::Other,
        }
    }
}

// One path reported by GitHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    /// Repository-relative path, e.g. "Slides/week1.pptx"
    pub path: String,
    pub kind: EntryKind,
}

impl RepoEntry {
    pub fn new(path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

// Entries from one API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryBatch {
    /// Category the entries were listed under, when the strategy knows it
    pub category_hint: Option<String>,
    pub entries: Vec<RepoEntry>,
}

// A category whose listing failed; its files are missing from the catalog
#[derive(Debug, Clone)]
pub struct CategoryFailure {
    /// Top-level directory that could not be listed
    pub category: String,
    /// Why the listing failed
    pub error: FetchError,
}

impl CategoryFailure {
    // Always PartialCategoryFailure: the rest of the catalog is still usable
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::PartialCategoryFailure
    }
}

// Everything one enumeration produced
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    /// In API response order
    pub batches: Vec<EntryBatch>,
    /// Categories that were skipped (directory walk only)
    pub failures: Vec<CategoryFailure>,
}

// Common interface of the enumeration strategies
//
// Send + Sync so a Box<dyn TreeEnumerator> can be held across .await points
// inside a tokio task.
#[async_trait]
pub trait TreeEnumerator: Send + Sync {
    // Lists the repository at `branch`
    //
    // Returns: Result<Enumeration, FetchError>
    //   Error: the whole enumeration failed (nothing usable came back)
    async fn enumerate(&self, api: &GitHubClient, branch: &str) -> Result<Enumeration, FetchError>;

    // Short name used in logs
    fn name(&self) -> &'static str;
}

// Strategy 1: one recursive tree request
pub struct RecursiveTree;

impl RecursiveTree {
    // Resolves a branch name to the SHA of its head commit
    //
    // Parameters:
    //   api: client for the repository
    //   branch: branch name (already resolved)
    //
    // Returns: Result<String, FetchError>
    //   Success: the commit SHA
    //   Error: the branches lookup failed, or neither endpoint gave a SHA
    //
    // Example:
    //   commit_sha(api, "main") -> "abc123"
    //   (GET .../git/refs/heads/main, and only if that fails GET .../branches/main)
    pub async fn commit_sha(api: &GitHubClient, branch: &str) -> Result<String, FetchError> {
        // Step 1: the refs endpoint. Any failure here is only logged
        match api.ref_sha(branch).await {
            Ok(Some(sha)) => return Ok(sha),
            Ok(None) => warn!(branch, "refs/heads response had no SHA, trying /branches"),
            Err(e) => warn!(branch, "refs/heads failed, trying /branches: {}", e),
        }

        // Step 2: the branches endpoint. Its error is the one the user sees
        api.branch_sha(branch)
            .await?
            .ok_or_else(|| FetchError::Decode {
                url: api.branch_url(branch),
                reason: format!("unable to resolve branch '{}' to a commit SHA", branch),
            })
    }
}

#[async_trait]
impl TreeEnumerator for RecursiveTree {
    async fn enumerate(&self, api: &GitHubClient, branch: &str) -> Result<Enumeration, FetchError> {
        // Branch -> commit SHA
        let sha = Self::commit_sha(api, branch).await?;
        debug!(branch, sha = %sha, "resolved branch to commit");

        // Commit SHA -> every path in the repository
        let tree = api.tree_recursive(&sha).await?;
        if tree.truncated {
            // GitHub caps very large trees; keep what we got
            warn!(
                sha = %sha,
                entries = tree.tree.len(),
                "GitHub truncated the recursive tree; some files will be missing"
            );
        }

        // Translate the tree vocabulary into RepoEntry values
        let entries = tree
            .tree
            .into_iter()
            .map(|item| RepoEntry::new(item.path, EntryKind::from_tree_type(&item.kind)))
            .collect();

        // A single batch; categories are derived later from the paths
        Ok(Enumeration {
            batches: vec![EntryBatch {
                category_hint: None,
                entries,
            }],
            failures: Vec::new(),
        })
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}

// Strategy 2: root listing plus one listing per top-level directory
pub struct DirectoryWalk;

#[async_trait]
impl TreeEnumerator for DirectoryWalk {
    async fn enumerate(&self, api: &GitHubClient, branch: &str) -> Result<Enumeration, FetchError> {
        // Step 1: list the root. Failing here is fatal (`?`)
        let root: Vec<RepoEntry> = api
            .list_dir("", branch)
            .await?
            .into_iter()
            .map(|item| RepoEntry::new(item.path, EntryKind::from_contents_type(&item.kind)))
            .collect();

        // Step 2: every root directory is a category to list
        let categories: Vec<String> = root
            .iter()
            .filter(|e| e.kind == EntryKind::Dir)
            .map(|e| e.path.clone())
            .collect();

        // Root files go in the first batch, without a category hint
        let mut enumeration = Enumeration {
            batches: vec![EntryBatch {
                category_hint: None,
                entries: root,
            }],
            failures: Vec::new(),
        };

        // Step 3: list each category, one request at a time
        for category in categories {
            match api.list_dir(&category, branch).await {
                Ok(items) => {
                    let entries: Vec<RepoEntry> = items
                        .into_iter()
                        .map(|item| {
                            RepoEntry::new(item.path, EntryKind::from_contents_type(&item.kind))
                        })
                        .collect();

                    // Nested directories are reported but never listed
                    let nested = entries.iter().filter(|e| e.kind == EntryKind::Dir).count();
                    if nested > 0 {
                        debug!(
                            category = %category,
                            nested,
                            "directory walk does not descend into nested directories"
                        );
                    }

                    enumeration.batches.push(EntryBatch {
                        category_hint: Some(category),
                        entries,
                    });
                }
                Err(error) => {
                    // Record and move on to the next category
                    warn!(category = %category, "skipping category: {}", error);
                    enumeration.failures.push(CategoryFailure { category, error });
                }
            }
        }

        info!(
            categories = enumeration.batches.len() - 1,
            failed = enumeration.failures.len(),
            "directory walk finished"
        );
        Ok(enumeration)
    }

    fn name(&self) -> &'static str {
        "directory-walk"
    }
}

// src/library.rs
// =============================================================================
// This module holds the session object that ties everything together.
//
//   rebuild():  branch -> enumerate -> normalize -> replace catalog
//   view():     filtered records for the current criteria
//
// Failures while resolving the branch, the commit or the root listing abort
// the rebuild and come back as one RebuildError with a diagnostic message.
// Failures of individual category listings only drop that category and are
// listed in the RebuildReport.
//
// Everything runs sequentially; rebuild takes &mut self, so there is never
// more than one writer.
//
// Rust concepts:
// - Arc<dyn Transport>: HTTP in production, canned responses in tests
// - Box<dyn TreeEnumerator>: strategy chosen from the config at startup
// - #[source]: RebuildError keeps the underlying FetchError for `{:?}`
// =============================================================================

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::catalog::{self, Catalog, CatalogStore, CategoryList, FilterCriteria, FilterOutcome, ResourceRecord};
use crate::config::{ConfigError, RepoConfig};
use crate::github::{
    BranchResolver, BranchState, CategoryFailure, ErrorKind, FetchError, GitHubClient,
    HttpTransport, TreeEnumerator, Transport,
};
use crate::links::{LinkBuilder, ResourceLinks};

// Fatal rebuild failure
//
// Display prints the diagnostic, which already names the repository, the
// branch and whether a token was used.
#[derive(Debug, thiserror::Error)]
#[error("{diagnostic}")]
pub struct RebuildError {
    /// Machine-checkable failure kind
    pub kind: ErrorKind,
    /// Message meant for the user
    pub diagnostic: String,
    /// The request failure that stopped the rebuild
    #[source]
    pub source: FetchError,
}

// Outcome of a successful (possibly partial) rebuild
#[derive(Debug, Clone)]
pub struct RebuildReport {
    /// Branch the catalog was read from
    pub branch: String,
    /// Enumerator name ("recursive" or "directory-walk")
    pub strategy: &'static str,
    /// Number of records now in the catalog
    pub records: usize,
    /// Categories that were skipped
    pub category_failures: Vec<CategoryFailure>,
}

impl RebuildReport {
    pub fn is_partial(&self) -> bool {
        !self.category_failures.is_empty()
    }
}

// Outcome of the most recent rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadStatus {
    NotLoaded,
    Ready,
    Failed { kind: ErrorKind, message: String },
}

// What a renderer should show for the current filter
#[derive(Debug, PartialEq, Eq)]
pub enum ViewState<'a> {
    /// No rebuild has finished yet
    Loading,
    /// The last rebuild failed; show the diagnostic
    Failed { kind: ErrorKind, message: &'a str },
    /// Loaded, but nothing passes the filter
    NoMatches,
    /// Loaded, with the visible records in catalog order
    Resources(Vec<&'a ResourceRecord>),
}

// The resource library for one repository
pub struct ResourceLibrary {
    config: RepoConfig,
    api: GitHubClient,
    branch: BranchResolver,
    enumerator: Box<dyn TreeEnumerator>,
    store: CatalogStore,
    status: LoadStatus,
}

impl ResourceLibrary {
    // Library talking to GitHub over HTTPS
    //
    // Returns: Result<ResourceLibrary, ConfigError>
    //   Error: the config is invalid (bad base URL, unusable token, ...) or
    //          the HTTP client could not be built
    pub fn new(config: RepoConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = HttpTransport::new(config.token.as_deref())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    // Library using any Transport (tests pass a fake one)
    pub fn with_transport(config: RepoConfig, transport: Arc<dyn Transport>) -> Self {
        let api = GitHubClient::new(transport, &config.api_base, &config.owner, &config.repo);
        let enumerator = config.strategy.enumerator();

        Self {
            config,
            api,
            branch: BranchResolver::new(),
            enumerator,
            store: CatalogStore::new(),
            status: LoadStatus::NotLoaded,
        }
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn branch_state(&self) -> &BranchState {
        self.branch.state()
    }

    // Rebuilds the catalog from scratch
    //
    // Returns: Result<RebuildReport, RebuildError>
    //   Success: the new catalog is in place (possibly missing categories)
    //   Error: nothing was replaced; the previous catalog is still served
    //
    // Example:
    //   lib.rebuild().await?  -> RebuildReport { branch: "main", records: 42, .. }
    pub async fn rebuild(&mut self) -> Result<RebuildReport, RebuildError> {
        info!(
            owner = %self.config.owner,
            repo = %self.config.repo,
            strategy = self.enumerator.name(),
            "loading resources"
        );

        match self.build().await {
            Ok(report) => {
                self.status = LoadStatus::Ready;
                if report.is_partial() {
                    warn!(
                        failed = report.category_failures.len(),
                        records = report.records,
                        "catalog loaded with missing categories"
                    );
                } else {
                    info!(records = report.records, branch = %report.branch, "catalog loaded");
                }
                Ok(report)
            }
            Err(source) => {
                // Wrap the request error with a message for the user
                let failure = RebuildError {
                    kind: source.kind(),
                    diagnostic: diagnose(&source, &self.config, self.branch.branch()),
                    source,
                };
                error!(kind = ?failure.kind, "failed to load resources: {}", failure.source);
                self.status = LoadStatus::Failed {
                    kind: failure.kind,
                    message: failure.diagnostic.clone(),
                };
                Err(failure)
            }
        }
    }

    // The steps of a rebuild; any `?` here makes the whole rebuild fail
    async fn build(&mut self) -> Result<RebuildReport, FetchError> {
        // Step 1: settle the branch (no request when it is configured)
        let branch = self.branch.resolve(&self.api, &self.config.branch).await?;

        // Step 2: list the repository with the configured strategy
        let enumeration = self.enumerator.enumerate(&self.api, &branch).await?;

        // Step 3: keep the files and turn them into records. Each batch
        // carries the category it was listed under (directory walk) or none
        let records: Vec<ResourceRecord> = enumeration
            .batches
            .iter()
            .flat_map(|batch| catalog::normalize(&batch.entries, batch.category_hint.as_deref()))
            .collect();

        // Step 4: swap the new catalog in. Only reached when steps 1-3 worked
        let count = records.len();
        self.store.replace(records);

        Ok(RebuildReport {
            branch,
            strategy: self.enumerator.name(),
            records: count,
            category_failures: enumeration.failures,
        })
    }

    pub fn current_catalog(&self) -> &Catalog {
        self.store.current()
    }

    pub fn categories(&self) -> CategoryList {
        self.store.current().categories()
    }

    pub fn apply_filter(&self, criteria: &FilterCriteria) -> Vec<&ResourceRecord> {
        catalog::apply(self.store.current(), criteria)
    }

    pub fn filter_outcome(&self, criteria: &FilterCriteria) -> FilterOutcome<'_> {
        FilterOutcome::from_records(self.apply_filter(criteria))
    }

    // What to show for `criteria`
    //
    // A failed rebuild wins over the (older) catalog still in the store, so
    // the user sees the error rather than stale results.
    pub fn view(&self, criteria: &FilterCriteria) -> ViewState<'_> {
        match &self.status {
            LoadStatus::NotLoaded => ViewState::Loading,
            LoadStatus::Failed { kind, message } => ViewState::Failed {
                kind: *kind,
                message: message.as_str(),
            },
            LoadStatus::Ready => match self.filter_outcome(criteria) {
                FilterOutcome::Matches(records) => ViewState::Resources(records),
                FilterOutcome::NoMatches => ViewState::NoMatches,
            },
        }
    }

    // Link builder for the resolved branch
    //
    // Returns: None until a rebuild got as far as resolving the branch
    pub fn link_builder(&self) -> Option<LinkBuilder> {
        self.branch.branch().map(|branch| {
            LinkBuilder::new(
                &self.config.web_base,
                &self.config.raw_base,
                &self.config.owner,
                &self.config.repo,
                branch,
            )
        })
    }

    pub fn links_for(&self, record: &ResourceRecord) -> Option<ResourceLinks> {
        self.link_builder().map(|links| links.links_for(record))
    }
}

// Builds the user-facing explanation of a fatal failure
//
// Parameters:
//   error: the failure that stopped the rebuild
//   config: the configuration that was used
//   branch: the resolved branch, if resolution got that far
//
// Returns: one paragraph with the classified error, the remaining quota, the
//          repository/branch/token used, and a hint on what to check
//
// Example:
//   "Failed to load resources: HTTP 404: not found. ... Repository: octo/library,
//    branch: (auto-detect), token: not set. If this is a private repository, ..."
fn diagnose(error: &FetchError, config: &RepoConfig, branch: Option<&str>) -> String {
    // The classified error itself
    let mut message = format!("Failed to load resources: {}.", error);

    // Quota, when GitHub told us
    if let Some(quota) = error.rate_limit().and_then(|r| r.quota_summary()) {
        message.push_str(&format!(" Rate limit: {}.", quota));
    }

    // The configuration that was used (never the token value)
    let branch = match branch {
        Some(name) => name.to_string(),
        None if config.branch.is_empty() => "(auto-detect)".to_string(),
        None => config.branch.clone(),
    };
    message.push_str(&format!(
        " Repository: {}/{}, branch: {}, token: {}.",
        config.owner,
        config.repo,
        branch,
        if config.has_token() { "set" } else { "not set" }
    ));

    // Hint: without a token, private repos look exactly like missing ones
    if config.has_token() {
        message.push_str(
            " Check your internet connection, the repository and branch names, or the rate limit.",
        );
    } else {
        message.push_str(
            " If this is a private repository, supply an access token. Otherwise check the branch name.",
        );
    }

    message
}

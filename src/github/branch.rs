// src/github/branch.rs
// =============================================================================
// This module works out which branch to read.
//
// Strategy:
// - A configured branch wins and costs no network call. It is not checked
//   against GitHub; a wrong name shows up later as a 404/409 while listing.
// - Without one we ask the repository for its default branch.
// - If the metadata has no default_branch field we use "main".
//
// Network errors are NOT swallowed here: enumerating with an unknown branch
// would only produce confusing errors later.
//
// Once resolved, the branch name stays fixed for the rest of the session
// (BranchState only ever moves from Unresolved to Resolved).
//
// Rust concepts:
// - Enums with data: Resolved(String) carries the name
// - &mut self: resolving changes the resolver's state
// =============================================================================

use tracing::{debug, info};

use super::client::GitHubClient;
use super::error::FetchError;

// Used when the repository metadata carries no default_branch field
pub const FALLBACK_BRANCH: &str = "main";

// Where branch resolution stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BranchState {
    /// No branch known yet
    #[default]
    Unresolved,
    /// Branch name fixed for the rest of the session
    Resolved(String),
}

// Resolves the branch once and remembers the answer
#[derive(Debug, Default)]
pub struct BranchResolver {
    state: BranchState,
}

impl BranchResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &BranchState {
        &self.state
    }

    // The resolved branch name, or None before resolution
    pub fn branch(&self) -> Option<&str> {
        match &self.state {
            BranchState::Resolved(name) => Some(name),
            BranchState::Unresolved => None,
        }
    }

    // Returns the effective branch name, resolving it on first use
    //
    // Parameters:
    //   api: client for the repository (only used without an override)
    //   configured: branch from the config; "" means auto-detect
    //
    // Returns: Result<String, FetchError>
    //   Success: the branch name to use for every later request
    //   Error: the repository metadata lookup failed (state stays Unresolved)
    //
    // Example:
    //   resolve(api, "gh-pages") -> "gh-pages"   (no request sent)
    //   resolve(api, "")         -> "main"       (GET /repos/{owner}/{repo})
    pub async fn resolve(
        &mut self,
        api: &GitHubClient,
        configured: &str,
    ) -> Result<String, FetchError> {
        // Already resolved earlier in this session: reuse it
        if let BranchState::Resolved(name) = &self.state {
            return Ok(name.clone());
        }

        let name = if !configured.is_empty() {
            // Override: trust it as is
            debug!(branch = configured, "using configured branch");
            configured.to_string()
        } else {
            // Ask GitHub; `?` hands any failure straight back to the caller
            let info = api.repo_info().await?;
            let name = info
                .default_branch
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| FALLBACK_BRANCH.to_string());
            info!(branch = %name, "detected default branch");
            name
        };

        // Only reached on success, so a failed lookup can be retried
        self.state = BranchState::Resolved(name.clone());
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::client::testing::*;
    use crate::github::error::ErrorKind;
    use serde_json::json;

    const REPO: &str = "https://api.test/repos/octo/library";

    #[tokio::test]
    async fn test_empty_override_uses_default_branch() {
        let transport = FakeTransport::new();
        transport.ok(REPO, json!({"default_branch": "main"}));

        let mut resolver = BranchResolver::new();
        let branch = resolver.resolve(&client(&transport), "").await.unwrap();

        assert_eq!(branch, "main");
        assert_eq!(resolver.state(), &BranchState::Resolved("main".to_string()));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_override_makes_no_network_call() {
        let transport = FakeTransport::new();

        let mut resolver = BranchResolver::new();
        let branch = resolver
            .resolve(&client(&transport), "does-not-exist")
            .await
            .unwrap();

        assert_eq!(branch, "does-not-exist");
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_field_falls_back() {
        let transport = FakeTransport::new();
        transport.ok(REPO, json!({"name": "library"}));

        let mut resolver = BranchResolver::new();
        let branch = resolver.resolve(&client(&transport), "").await.unwrap();
        assert_eq!(branch, FALLBACK_BRANCH);
    }

    #[tokio::test]
    async fn test_network_error_propagates_and_stays_unresolved() {
        let transport = FakeTransport::new();
        transport.unreachable(REPO);

        let mut resolver = BranchResolver::new();
        let err = resolver.resolve(&client(&transport), "").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert_eq!(resolver.state(), &BranchState::Unresolved);
        assert_eq!(resolver.branch(), None);
    }

    #[tokio::test]
    async fn test_resolves_only_once() {
        let transport = FakeTransport::new();
        transport.ok(REPO, json!({"default_branch": "develop"}));

        let api = client(&transport);
        let mut resolver = BranchResolver::new();
        resolver.resolve(&api, "").await.unwrap();
        let again = resolver.resolve(&api, "other").await.unwrap();

        assert_eq!(again, "develop");
        assert_eq!(transport.calls().len(), 1);
    }
}

// src/github/client.rs
// =============================================================================
// This module talks to the GitHub REST API.
//
// Endpoints used:
//   GET /repos/{owner}/{repo}                         -> default branch
//   GET /repos/{owner}/{repo}/git/refs/heads/{branch} -> commit SHA
//   GET /repos/{owner}/{repo}/branches/{branch}       -> commit SHA (fallback)
//   GET /repos/{owner}/{repo}/git/trees/{sha}?recursive=1
//   GET /repos/{owner}/{repo}/contents/{path}?ref={branch}
//
// The actual HTTP round trip sits behind the `Transport` trait:
// - HttpTransport: the real thing, built on reqwest
// - FakeTransport (tests only): serves canned responses keyed by URL
//
// GitHubClient sits on top and turns responses into typed structs, or into
// a classified FetchError when GitHub says no.
//
// Rust concepts:
// - async_trait: lets a trait declare async methods
// - Arc<dyn Trait>: shared ownership of "some transport", chosen at runtime
// - Generics with DeserializeOwned: one helper decodes every payload type
// =============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};

use super::error::{classify, FetchError, RateLimitInfo};
use crate::config::{bearer_header, ConfigError};

// What came back from one GET request, before any interpretation
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Values of the x-ratelimit-* headers
    pub rate_limit: RateLimitInfo,
    /// Response body as text
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// Performs a single GET request
//
// Only connection-level problems are errors here. HTTP error statuses come
// back as a normal RawResponse and are classified by GitHubClient.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError>;
}

// reqwest-backed transport
//
// Every request carries the GitHub JSON media type, a User-Agent (GitHub
// rejects requests without one) and, when configured, the bearer token.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    // Creates the HTTP client
    //
    // Parameters:
    //   token: optional access token, attached to every request
    //
    // Returns: Result<HttpTransport, ConfigError>
    //   Error: the token is not a legal header value, or reqwest could not
    //          build a client. Both are setup problems, not network failures.
    pub fn new(token: Option<&str>) -> Result<Self, ConfigError> {
        // Headers sent with every request
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("repo-shelf/", env!("CARGO_PKG_VERSION"))),
        );

        // Authorization only when there is a (non-blank) token
        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            headers.insert(AUTHORIZATION, bearer_header(token)?);
        }

        // No explicit timeout: the transport default applies
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        // Any reqwest error at this level means we never got a usable answer
        let network = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        };

        // Send the request and keep status + rate-limit headers
        // before the body consumes the response
        let response = self.client.get(url).send().await.map_err(network)?;
        let status = response.status().as_u16();
        let rate_limit = RateLimitInfo::from_headers(response.headers());
        let body = response.text().await.map_err(network)?;

        Ok(RawResponse {
            status,
            rate_limit,
            body,
        })
    }
}

// ----------------------------------------------------------------------------
// API payloads. Only the fields we read are declared; serde ignores the rest.
// ----------------------------------------------------------------------------

// Repository metadata (GET /repos/{owner}/{repo})
#[derive(Debug, Deserialize)]
pub struct RepoInfo {
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: Option<GitObject>,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: Option<GitObject>,
}

// Result of the recursive tree request
#[derive(Debug, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeItem>,
    /// Set by GitHub when the tree was too large to return in full
    #[serde(default)]
    pub truncated: bool,
}

// One node of a git tree
#[derive(Debug, Deserialize)]
pub struct TreeItem {
    pub path: String,
    /// "blob", "tree" or "commit" (submodule)
    #[serde(rename = "type")]
    pub kind: String,
}

// One entry of a contents listing
#[derive(Debug, Deserialize)]
pub struct ContentItem {
    pub path: String,
    /// "file", "dir", "symlink" or "submodule"
    #[serde(rename = "type")]
    pub kind: String,
}

// GitHub API client bound to one repository
//
// Cheap to clone: the transport is shared through an Arc.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn Transport>,
    api_base: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    // Parameters:
    //   transport: how requests are sent (HttpTransport in production)
    //   api_base: REST API root, e.g. "https://api.github.com"
    //   owner, repo: the repository every call is about
    pub fn new(transport: Arc<dyn Transport>, api_base: &str, owner: &str, repo: &str) -> Self {
        Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    // https://api.github.com/repos/{owner}/{repo}
    fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_base,
            urlencoding::encode(&self.owner),
            urlencoding::encode(&self.repo)
        )
    }

    // URL of the refs endpoint for a branch
    pub fn ref_url(&self, branch: &str) -> String {
        format!("{}/git/refs/heads/{}", self.repo_url(), urlencoding::encode(branch))
    }

    // URL of the branches endpoint for a branch
    //
    // Exposed so callers can name the exact endpoint in error messages.
    pub fn branch_url(&self, branch: &str) -> String {
        format!("{}/branches/{}", self.repo_url(), urlencoding::encode(branch))
    }

    // Fetches `url` and decodes a successful body as `T`
    //
    // Parameters:
    //   url: full API URL
    //
    // Returns: Result<T, FetchError>
    //   Success: the decoded payload
    //   Error: Network (no response), Api (classified error status),
    //          Decode (2xx but the body is not what we expected)
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(url, "GitHub API request");
        let response = self.transport.get(url).await?;

        // Error status: classify it and log the rate-limit headers,
        // since those tell quota problems apart from misconfiguration
        if !response.is_success() {
            let failure = classify(response.status, &response.rate_limit, &response.body);
            error!(
                status = response.status,
                url,
                limit = ?response.rate_limit.limit,
                remaining = ?response.rate_limit.remaining,
                reset = ?response.rate_limit.reset,
                "GitHub API error: {}",
                failure
            );
            return Err(FetchError::Api {
                url: url.to_string(),
                failure,
                rate_limit: response.rate_limit,
            });
        }

        // Success: decode the JSON body
        serde_json::from_str(&response.body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    pub async fn repo_info(&self) -> Result<RepoInfo, FetchError> {
        self.get_json(&self.repo_url()).await
    }

    // Commit SHA from the refs endpoint, or None when the payload lacks one
    pub async fn ref_sha(&self, branch: &str) -> Result<Option<String>, FetchError> {
        let data: RefResponse = self.get_json(&self.ref_url(branch)).await?;
        Ok(data.object.and_then(|o| o.sha))
    }

    // Commit SHA from the branches endpoint, or None when the payload lacks one
    pub async fn branch_sha(&self, branch: &str) -> Result<Option<String>, FetchError> {
        let data: BranchResponse = self.get_json(&self.branch_url(branch)).await?;
        Ok(data.commit.and_then(|c| c.sha))
    }

    // Every file and directory reachable from commit `sha`, in one response
    pub async fn tree_recursive(&self, sha: &str) -> Result<TreeResponse, FetchError> {
        let url = format!(
            "{}/git/trees/{}?recursive=1",
            self.repo_url(),
            urlencoding::encode(sha)
        );
        self.get_json(&url).await
    }

    // Lists the immediate entries of one directory
    //
    // Parameters:
    //   path: directory path; "" lists the repository root
    //   branch: branch (or any ref) to read
    //
    // Example:
    //   list_dir("Slide Decks", "main")
    //     -> GET .../contents/Slide%20Decks?ref=main
    pub async fn list_dir(&self, path: &str, branch: &str) -> Result<Vec<ContentItem>, FetchError> {
        let url = if path.is_empty() {
            format!("{}/contents?ref={}", self.repo_url(), urlencoding::encode(branch))
        } else {
            format!(
                "{}/contents/{}?ref={}",
                self.repo_url(),
                crate::links::encode_path(path),
                urlencoding::encode(branch)
            )
        };
        self.get_json(&url).await
    }
}

// Canned-response transport for exercising API code without a server
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    pub const API: &str = "https://api.test";

    #[derive(Default)]
    pub struct FakeTransport {
        routes: Mutex<HashMap<String, Result<RawResponse, FetchError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn ok(&self, url: &str, body: serde_json::Value) {
            self.respond(url, 200, RateLimitInfo::default(), &body.to_string());
        }

        pub fn status(&self, url: &str, status: u16) {
            self.respond(url, status, RateLimitInfo::default(), "");
        }

        pub fn respond(&self, url: &str, status: u16, rate_limit: RateLimitInfo, body: &str) {
            self.routes.lock().unwrap().insert(
                url.to_string(),
                Ok(RawResponse {
                    status,
                    rate_limit,
                    body: body.to_string(),
                }),
            );
        }

        pub fn unreachable(&self, url: &str) {
            self.routes.lock().unwrap().insert(
                url.to_string(),
                Err(FetchError::Network {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                }),
            );
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.routes.lock().unwrap().get(url) {
                Some(canned) => canned.clone(),
                // Unknown URLs behave like GitHub's 404
                None => Ok(RawResponse {
                    status: 404,
                    rate_limit: RateLimitInfo::default(),
                    body: "{\"message\":\"Not Found\"}".to_string(),
                }),
            }
        }
    }

    pub fn client(transport: &Arc<FakeTransport>) -> GitHubClient {
        GitHubClient::new(transport.clone(), API, "octo", "library")
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::github::error::{ApiError, ErrorKind};
    use serde_json::json;

    #[tokio::test]
    async fn test_repo_info_default_branch() {
        let transport = FakeTransport::new();
        transport.ok(
            "https://api.test/repos/octo/library",
            json!({"default_branch": "trunk", "private": false}),
        );

        let info = client(&transport).repo_info().await.unwrap();
        assert_eq!(info.default_branch.as_deref(), Some("trunk"));
    }

    #[tokio::test]
    async fn test_error_status_is_classified() {
        let transport = FakeTransport::new();
        transport.respond(
            "https://api.test/repos/octo/library",
            403,
            RateLimitInfo {
                limit: Some(60),
                remaining: Some(0),
                reset: None,
            },
            "{\"message\":\"API rate limit exceeded\"}",
        );

        let err = client(&transport).repo_info().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.rate_limit().and_then(|r| r.remaining), Some(0));
    }

    #[tokio::test]
    async fn test_bad_json_is_decode_error() {
        let transport = FakeTransport::new();
        transport.respond(
            "https://api.test/repos/octo/library/git/trees/abc?recursive=1",
            200,
            RateLimitInfo::default(),
            "<html>",
        );

        let err = client(&transport).tree_recursive("abc").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_list_dir_urls_encode_path_and_ref() {
        let transport = FakeTransport::new();
        transport.ok("https://api.test/repos/octo/library/contents?ref=main", json!([]));
        transport.ok(
            "https://api.test/repos/octo/library/contents/Slide%20Decks?ref=feature%2Fdocs",
            json!([{"path": "Slide Decks/intro.pptx", "type": "file", "size": 10}]),
        );

        let api = client(&transport);
        assert!(api.list_dir("", "main").await.unwrap().is_empty());

        let items = api.list_dir("Slide Decks", "feature/docs").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].path, "Slide Decks/intro.pptx");
        assert_eq!(items[0].kind, "file");
    }

    #[tokio::test]
    async fn test_missing_route_is_not_found() {
        let transport = FakeTransport::new();
        let err = client(&transport).ref_sha("main").await.unwrap_err();
        match err {
            FetchError::Api { failure, .. } => assert_eq!(failure, ApiError::NotFound),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_urls() {
        let transport = FakeTransport::new();
        let api = client(&transport);
        assert_eq!(
            api.branch_url("release/v1"),
            "https://api.test/repos/octo/library/branches/release%2Fv1"
        );
        assert_eq!(
            api.ref_url("main"),
            "https://api.test/repos/octo/library/git/refs/heads/main"
        );
    }

    #[test]
    fn test_invalid_token_is_a_setup_error() {
        let err = HttpTransport::new(Some("abc\ndef")).err().unwrap();
        assert!(matches!(err, ConfigError::InvalidToken(_)));

        // Surrounding whitespace alone is fine
        assert!(HttpTransport::new(Some("abc123\n")).is_ok());
        assert!(HttpTransport::new(Some("")).is_ok());
    }
}

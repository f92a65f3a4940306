// src/config.rs
// =============================================================================
// This module builds the repository configuration.
//
// Values come from, lowest to highest precedence:
//   1. an optional JSON config file:
//        { "REPO_OWNER": "...", "REPO_NAME": "...", "BRANCH": "",
//          "GITHUB_TOKEN": "...", "STRATEGY": "directory-walk",
//          "API_BASE": "...", "WEB_BASE": "...", "RAW_BASE": "..." }
//   2. command-line flags (the token may also come from $GITHUB_TOKEN)
//
// An empty branch means "ask GitHub for the default branch".
// A blank value on the command line counts as "not given", so an empty
// $GITHUB_TOKEN never hides the token stored in the config file.
//
// For GitHub Enterprise, pointing the API base at https://HOST/api/v3 is
// enough: the web and raw bases are derived from it unless set explicitly.
//
// Rust concepts:
// - Option::or: later sources override earlier ones only when present
// - Builder methods (with_*): take `self` by value and return it
// - Custom Debug impl: keeps the access token out of logs
// =============================================================================

use std::fmt;
use std::path::Path;

use reqwest::header::HeaderValue;
use serde::Deserialize;
use url::Url;

use crate::github::Strategy;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_WEB_BASE: &str = "https://github.com";
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

// Everything that can be wrong with the configuration
//
// These are reported before any request is sent to GitHub.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read from disk
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    /// The config file is not valid JSON (or has wrongly typed keys)
    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    /// The repository argument is neither owner/repo nor a GitHub URL
    #[error("invalid repository '{0}': expected owner/repo or https://github.com/owner/repo")]
    InvalidRepo(String),

    /// Owner or repository name is missing
    #[error("repository {0} is not configured")]
    Missing(&'static str),

    /// One of the API/web/raw base URLs is unusable
    #[error("invalid {name} URL '{url}': {reason}")]
    InvalidBaseUrl {
        name: &'static str,
        url: String,
        reason: String,
    },

    /// The token contains characters that cannot go into an HTTP header
    #[error("access token is not usable in an Authorization header: {0}")]
    InvalidToken(String),

    /// reqwest refused to build a client
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

// The complete configuration for one repository
//
// Built with RepoConfig::new(owner, repo) and the with_* methods, or merged
// from a config file and flags with RepoConfig::resolve().
#[derive(Clone)]
pub struct RepoConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch to read; empty to auto-detect the default branch
    pub branch: String,
    /// Optional access token, sent as a bearer credential
    pub token: Option<String>,
    /// How the repository tree is enumerated
    pub strategy: Strategy,
    /// REST API root, e.g. https://api.github.com
    pub api_base: String,
    /// Where "view" links point, e.g. https://github.com
    pub web_base: String,
    /// Where raw downloads point, e.g. https://raw.githubusercontent.com
    pub raw_base: String,
}

// Debug is written by hand so the token never ends up in a log line
impl fmt::Debug for RepoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("strategy", &self.strategy)
            .field("api_base", &self.api_base)
            .field("web_base", &self.web_base)
            .field("raw_base", &self.raw_base)
            .finish()
    }
}

impl RepoConfig {
    // Creates a config for github.com with no branch override and no token
    //
    // Example:
    //   RepoConfig::new("octo", "library").with_branch("main")
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: String::new(),
            token: None,
            strategy: Strategy::Recursive,
            api_base: DEFAULT_API_BASE.to_string(),
            web_base: DEFAULT_WEB_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    // Sets the token, trimming surrounding whitespace
    //
    // A token read with $(cat token-file) usually ends in a newline, which
    // would otherwise make the Authorization header invalid.
    // Blank tokens are treated as "no token".
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_web_base(mut self, web_base: impl Into<String>) -> Self {
        self.web_base = web_base.into();
        self
    }

    pub fn with_raw_base(mut self, raw_base: impl Into<String>) -> Self {
        self.raw_base = raw_base.into();
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // Checks the config before anything touches the network
    //
    // Returns: Ok(()) when owner, repo, base URLs and token are usable
    //   Error: the first problem found, as a ConfigError
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Owner and repo are the only mandatory values
        if self.owner.trim().is_empty() {
            return Err(ConfigError::Missing("owner"));
        }
        if self.repo.trim().is_empty() {
            return Err(ConfigError::Missing("name"));
        }

        // Every base URL must be an absolute http(s) URL
        validate_base_url("API base", &self.api_base)?;
        validate_base_url("web base", &self.web_base)?;
        validate_base_url("raw base", &self.raw_base)?;

        // The token goes verbatim into a header, so it must be a legal
        // header value (no newlines or other control characters)
        if let Some(token) = &self.token {
            bearer_header(token)?;
        }

        Ok(())
    }

    // Merges the config file (if any) with command-line overrides
    //
    // Parameters:
    //   file: parsed JSON config file, or None when --config was not given
    //   overrides: values from command-line flags and $GITHUB_TOKEN
    //
    // Returns: Result<RepoConfig, ConfigError>
    //   Success: a validated config
    //   Error: missing owner/repo, bad repository spec, bad URL or token
    //
    // Example:
    //   file = { "REPO_OWNER": "octo", "REPO_NAME": "library", "GITHUB_TOKEN": "abc" }
    //   overrides = { token: Some("") }           (empty $GITHUB_TOKEN)
    //   result.token = Some("abc")                (blank override ignored)
    pub fn resolve(file: Option<ConfigFile>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        // No file is the same as an empty file
        let file = file.unwrap_or_default();

        // A repository given on the command line replaces both owner and name
        let (owner, repo) = match non_blank(overrides.repo).as_deref() {
            Some(spec) => parse_repo_spec(spec)?,
            None => (
                file.owner.unwrap_or_default(),
                file.name.unwrap_or_default(),
            ),
        };

        // The branch override keeps an explicit empty value:
        // --branch "" means "auto-detect" even if the file names a branch
        let branch = overrides.branch.or(file.branch).unwrap_or_default();

        // Blank command-line values fall through to the file
        let token = non_blank(overrides.token).or(file.token);
        let strategy = overrides
            .strategy
            .or(file.strategy)
            .unwrap_or(Strategy::Recursive);
        let api_base = non_blank(overrides.api_base)
            .or(file.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        // Web and raw bases: explicit value, else derived from the API base
        let (derived_web, derived_raw) = derive_web_bases(&api_base);
        let web_base = non_blank(overrides.web_base)
            .or(file.web_base)
            .unwrap_or(derived_web);
        let raw_base = non_blank(overrides.raw_base)
            .or(file.raw_base)
            .unwrap_or(derived_raw);

        let config = RepoConfig::new(owner, repo)
            .with_branch(branch.trim())
            .with_token(token)
            .with_strategy(strategy)
            .with_api_base(api_base)
            .with_web_base(web_base)
            .with_raw_base(raw_base);

        config.validate()?;
        Ok(config)
    }
}

// Builds the Authorization header value for a token
//
// Returns: the header value (marked sensitive so it is not logged)
//   Error: ConfigError::InvalidToken when the token has illegal characters
pub fn bearer_header(token: &str) -> Result<HeaderValue, ConfigError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ConfigError::InvalidToken(e.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

// Keeps a command-line value only if it has non-whitespace content
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_base_url(name: &'static str, raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        name,
        url: raw.to_string(),
        reason,
    };

    let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https".to_string()));
    }
    Ok(())
}

// Works out the web and raw bases that belong to an API base
//
// Parameters:
//   api_base: the configured REST API root
//
// Returns: (web_base, raw_base)
//
// Example:
//   "https://api.github.com"          -> ("https://github.com", "https://raw.githubusercontent.com")
//   "https://ghe.example.com/api/v3"  -> ("https://ghe.example.com", "https://ghe.example.com/raw")
fn derive_web_bases(api_base: &str) -> (String, String) {
    let defaults = (DEFAULT_WEB_BASE.to_string(), DEFAULT_RAW_BASE.to_string());

    // github.com itself: nothing to derive
    if api_base.trim_end_matches('/') == DEFAULT_API_BASE {
        return defaults;
    }

    // GitHub Enterprise serves the API under /api/v3 on the same host,
    // and raw files under /raw
    match Url::parse(api_base) {
        Ok(url) if url.path().trim_end_matches('/') == "/api/v3" => {
            let mut origin = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
            if let Some(port) = url.port() {
                origin.push_str(&format!(":{}", port));
            }
            let raw = format!("{}/raw", origin);
            (origin, raw)
        }
        // Anything else (a test server, a proxy) keeps the public defaults
        _ => defaults,
    }
}

// Settings read from a JSON config file
//
// Every key is optional; the key names match the CONFIG object of the
// browser front end this tool grew out of.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "REPO_OWNER")]
    pub owner: Option<String>,
    #[serde(rename = "REPO_NAME")]
    pub name: Option<String>,
    #[serde(rename = "BRANCH")]
    pub branch: Option<String>,
    #[serde(rename = "GITHUB_TOKEN")]
    pub token: Option<String>,
    #[serde(rename = "STRATEGY")]
    pub strategy: Option<Strategy>,
    #[serde(rename = "API_BASE")]
    pub api_base: Option<String>,
    #[serde(rename = "WEB_BASE")]
    pub web_base: Option<String>,
    #[serde(rename = "RAW_BASE")]
    pub raw_base: Option<String>,
}

impl ConfigFile {
    // Reads and parses a config file from disk
    //
    // Parameters:
    //   path: location of the JSON file
    //
    // Returns: the parsed file, or a Read/Parse error naming the path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&text).map_err(|reason| ConfigError::Parse {
            path: path.display().to_string(),
            reason,
        })
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }
}

// Values supplied on the command line; None means "not given"
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub token: Option<String>,
    pub strategy: Option<Strategy>,
    pub api_base: Option<String>,
    pub web_base: Option<String>,
    pub raw_base: Option<String>,
}

// Parses a repository reference into (owner, repo)
//
// Supported formats:
//   - owner/repo
//   - github.com/owner/repo
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - https://github.com/owner/repo/tree/main/docs (extra segments ignored)
//
// Returns: (owner, repo) tuple
//
// Example:
//   "https://github.com/rust-lang/rust" -> ("rust-lang", "rust")
pub fn parse_repo_spec(spec: &str) -> Result<(String, String), ConfigError> {
    let spec = spec.trim();
    let invalid = || ConfigError::InvalidRepo(spec.to_string());

    // Give scheme-less github.com references a scheme so `Url` can parse them
    let with_scheme = if spec.starts_with("http://") || spec.starts_with("https://") {
        Some(spec.to_string())
    } else if spec.starts_with("github.com/") || spec.starts_with("www.github.com/") {
        Some(format!("https://{}", spec))
    } else {
        None
    };

    let segments: Vec<String> = match with_scheme {
        // URL form: must be on github.com, take the non-empty path segments
        Some(raw) => {
            let url = Url::parse(&raw).map_err(|_| invalid())?;
            let host = url.host_str().unwrap_or_default();
            if host != "github.com" && host != "www.github.com" {
                return Err(invalid());
            }
            url.path_segments()
                .map(|s| s.filter(|p| !p.is_empty()).map(str::to_string).collect())
                .unwrap_or_default()
        }
        // Short form: exactly "owner/repo"
        None => {
            let parts: Vec<String> = spec.split('/').map(str::to_string).collect();
            if parts.len() != 2 {
                return Err(invalid());
            }
            parts
        }
    };

    if segments.len() < 2 {
        return Err(invalid());
    }

    // Remove .git suffix if present
    let owner = segments[0].clone();
    let repo = segments[1].trim_end_matches(".git").to_string();
    if owner.is_empty() || repo.is_empty() {
        return Err(invalid());
    }

    Ok((owner, repo))
}

// src/github/mod.rs
// =============================================================================
// This module contains everything that talks to the GitHub REST API.
//
// Submodules:
// - client: HTTP transport and typed endpoint calls
// - error:  failure classification (rate limit, 404, 409, ...)
// - branch: picks the branch to read
// - tree:   enumerates repository paths (recursive or directory walk)
//
// Nothing outside this module builds GitHub URLs or looks at status codes.
//
// Rust concepts:
// - pub use: re-export items so callers write `github::FetchError`
// =============================================================================

// Declare submodules
pub mod branch;
pub mod client;
pub mod error;
pub mod tree;

// Re-export the types the rest of the crate works with
pub use branch::{BranchResolver, BranchState};
pub use client::{GitHubClient, HttpTransport, RawResponse, Transport};
pub use error::{classify, ApiError, ErrorKind, FetchError, RateLimitInfo};
pub use tree::{CategoryFailure, Enumeration, EntryBatch, EntryKind, RepoEntry, Strategy, TreeEnumerator};

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Transport trait?
//    - GitHubClient only needs "GET this URL, give me status/headers/body"
//    - Production uses reqwest (HttpTransport); tests plug in canned answers
//    - No test ever touches the network
//
// 2. Why two enumeration strategies?
//    - The recursive tree costs two requests but can be truncated by GitHub
//      on very large repositories
//    - The directory walk costs one request per category but only sees two
//      levels of the repository
// -----------------------------------------------------------------------------

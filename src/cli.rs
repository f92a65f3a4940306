// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands share the same repository options:
//   repo-shelf list octo/library --query algebra --category Slides
//   repo-shelf categories https://github.com/octo/library
//
// The repository may also come from a JSON config file (--config), in which
// case the positional argument can be left out. Flags win over the file.
//
// Rust concepts:
// - Derive macros: clap generates the parser from these structs
// - #[command(flatten)]: share one group of options between subcommands
// - env = "...": a flag that falls back to an environment variable
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use repo_shelf::config::ConfigOverrides;
use repo_shelf::Strategy;

// The whole CLI: one subcommand plus global options
#[derive(Parser, Debug)]
#[command(
    name = "repo-shelf",
    version,
    about = "Browse a GitHub repository as a searchable resource library",
    long_about = "repo-shelf lists the files of a GitHub repository grouped by their top-level \
                  directory, with view and download links for each one."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level for diagnostics on stderr (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

// Subcommands (list, categories)
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List resources, optionally filtered by text and category
    ///
    /// Example: repo-shelf list octo/library --query week --category Slides
    List {
        #[command(flatten)]
        repo: RepoArgs,

        /// Case-insensitive text matched against file names and paths
        #[arg(long, short, default_value = "")]
        query: String,

        /// Only show this category (exact, case-sensitive); empty shows all
        #[arg(long, short, default_value = "")]
        category: String,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the category options derived from the repository layout
    Categories {
        #[command(flatten)]
        repo: RepoArgs,

        /// Output results in JSON format instead of a list
        #[arg(long)]
        json: bool,
    },
}

// Options naming the repository and how to reach it
//
// Every field is optional; whatever is missing comes from --config or the
// built-in defaults (see RepoConfig::resolve).
#[derive(Args, Debug)]
pub struct RepoArgs {
    /// Repository as owner/repo or a GitHub URL
    pub repo: Option<String>,

    /// JSON config file with REPO_OWNER, REPO_NAME, BRANCH, GITHUB_TOKEN, ...
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Branch to read; leave unset to use the repository's default branch
    #[arg(long, short)]
    pub branch: Option<String>,

    /// Access token sent as a bearer credential
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// How to enumerate the repository
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Base URL of the web UI used for view links
    ///
    /// Derived from --api-base for GitHub Enterprise when not given
    #[arg(long)]
    pub web_base: Option<String>,

    /// Base URL for raw file downloads
    ///
    /// Derived from --api-base for GitHub Enterprise when not given
    #[arg(long)]
    pub raw_base: Option<String>,
}

impl RepoArgs {
    // Converts the parsed flags into config overrides
    //
    // Blank values are passed through as given; RepoConfig::resolve decides
    // that they don't override anything.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            token: self.token.clone(),
            strategy: self.strategy,
            api_base: self.api_base.clone(),
            web_base: self.web_base.clone(),
            raw_base: self.raw_base.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_arguments() {
        let cli = Cli::try_parse_from([
            "repo-shelf",
            "list",
            "octo/library",
            "--query",
            "week",
            "--strategy",
            "directory-walk",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::List {
                repo,
                query,
                category,
                json,
            } => {
                assert_eq!(repo.repo.as_deref(), Some("octo/library"));
                assert_eq!(query, "week");
                assert_eq!(category, "");
                assert!(json);
                assert_eq!(repo.overrides().strategy, Some(Strategy::DirectoryWalk));
            }
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_base_url_flags() {
        let cli = Cli::try_parse_from([
            "repo-shelf",
            "categories",
            "octo/library",
            "--web-base",
            "https://ghe.example.com",
            "--raw-base",
            "https://ghe.example.com/raw",
        ])
        .unwrap();

        match cli.command {
            Commands::Categories { repo, .. } => {
                let overrides = repo.overrides();
                assert_eq!(overrides.web_base.as_deref(), Some("https://ghe.example.com"));
                assert_eq!(
                    overrides.raw_base.as_deref(),
                    Some("https://ghe.example.com/raw")
                );
                assert_eq!(overrides.api_base, None);
            }
            other => panic!("expected categories, got {:?}", other),
        }
    }
}

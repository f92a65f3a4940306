// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the repository config (config file + flags + $GITHUB_TOKEN)
// 3. Rebuild the catalog from the GitHub API
// 4. Print the filtered resources or the category list
// 5. Exit with proper code (0 = resources shown, 1 = nothing matched, 2 = error)
//
// Rust concepts used:
// - async/await: the GitHub requests run on the tokio runtime
// - anyhow::Result: any error can bubble up to main with `?`
// - match on ViewState: every possible screen is handled explicitly
// =============================================================================

// Module declarations - the CLI definition lives next to this file
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, RepoArgs};
use repo_shelf::config::ConfigFile;
use repo_shelf::{
    CategoryList, FilterCriteria, LinkBuilder, RebuildError, RebuildReport, RepoConfig,
    ResourceLibrary, ResourceRecord, ViewState,
};

// The #[tokio::main] attribute creates a tokio runtime and runs main on it
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    // Any error that escaped run() is an internal/setup error: exit 2
    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Sets up tracing
//
// Logs go to stderr so --json output on stdout stays parseable.
// RUST_LOG wins over --log-level when it is set.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("repo_shelf={}", level)))
        .unwrap_or_else(|_| EnvFilter::new("repo_shelf=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// This is the main application logic
// Returns:
//   Ok(0) = resources shown / categories listed
//   Ok(1) = nothing matched the filter
//   Ok(2) = the catalog could not be loaded
//   Err = configuration or setup error
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::List {
            repo,
            query,
            category,
            json,
        } => handle_list(&repo, FilterCriteria::new(query, category), json).await,
        Commands::Categories { repo, json } => handle_categories(&repo, json).await,
    }
}

// Reads --config (if given) and merges it with the flags
fn load_config(args: &RepoArgs) -> Result<RepoConfig> {
    let file = match &args.config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => None,
    };
    let config = RepoConfig::resolve(file, args.overrides()).context("invalid configuration")?;
    Ok(config)
}

// Builds the library and runs one rebuild
//
// Parameters:
//   args: repository options from the command line
//   quiet: suppress the progress lines (used with --json)
//
// Returns: the library plus the rebuild outcome. A failed rebuild is not an
//          Err here; the library remembers it and view() reports it.
async fn load_library(
    args: &RepoArgs,
    quiet: bool,
) -> Result<(ResourceLibrary, Result<RebuildReport, RebuildError>)> {
    let config = load_config(args)?;
    let mut library = ResourceLibrary::new(config).context("failed to set up GitHub client")?;

    if !quiet {
        println!(
            "📚 Loading resources from {}/{}…",
            library.config().owner,
            library.config().repo
        );
    }

    let outcome = library.rebuild().await;

    // Progress summary, only when the rebuild worked
    if let (false, Ok(report)) = (quiet, &outcome) {
        println!(
            "🌿 Branch {} ({} strategy): {} resource(s)",
            report.branch, report.strategy, report.records
        );
        for failure in &report.category_failures {
            println!("⚠️  Skipped category {}: {}", failure.category, failure.error);
        }
        println!();
    }

    Ok((library, outcome))
}

// Handles the 'list' subcommand
// Parameters:
//   args: repository options
//   criteria: query + category exactly as the user typed them
//   json: whether to output JSON format
async fn handle_list(args: &RepoArgs, criteria: FilterCriteria, json: bool) -> Result<i32> {
    // The rebuild outcome is not checked here: view() below covers failures
    let (library, _outcome) = load_library(args, json).await?;

    // Category names are exact; tell the user when theirs doesn't exist
    if let Some(warning) = unknown_category_warning(&library.categories(), &criteria.category) {
        eprintln!("⚠️  {}", warning);
    }

    let view = library.view(&criteria);
    match &view {
        ViewState::Resources(records) => {
            let links = library
                .link_builder()
                .context("branch was not resolved after loading")?;
            if json {
                let rows: Vec<serde_json::Value> = records
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "record": r,
                            "links": links.links_for(r),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_table(records, &links);
            }
        }
        ViewState::NoMatches => {
            if json {
                println!("[]");
            } else {
                println!("No matching resources.");
            }
        }
        ViewState::Loading => {
            eprintln!("Error: resources have not been loaded yet");
        }
        ViewState::Failed { message, .. } => {
            eprintln!("Error: {}", message);
        }
    }

    Ok(exit_code(&view))
}

// Handles the 'categories' subcommand
async fn handle_categories(args: &RepoArgs, json: bool) -> Result<i32> {
    let (library, outcome) = load_library(args, json).await?;

    // Without a catalog there are no categories to show
    outcome?;
    let options = library.categories().options();

    if json {
        println!("{}", serde_json::to_string_pretty(&options)?);
    } else {
        for option in &options {
            println!("{}", option.label());
        }
    }
    Ok(0)
}

// Maps what was shown to the process exit code
//
// Example:
//   Resources(..) -> 0, NoMatches -> 1, Loading / Failed -> 2
fn exit_code(view: &ViewState<'_>) -> i32 {
    match view {
        ViewState::Resources(_) => 0,
        ViewState::NoMatches => 1,
        ViewState::Loading | ViewState::Failed { .. } => 2,
    }
}

// Warning for a --category the repository doesn't have
//
// Returns: None for "" (all categories) or a known category
//
// Example:
//   categories ["Slides"], requested "slides"
//   -> Some("category 'slides' does not exist (available: Slides)")
fn unknown_category_warning(categories: &CategoryList, requested: &str) -> Option<String> {
    if requested.is_empty() || categories.contains(requested) {
        return None;
    }

    let available = if categories.names().is_empty() {
        "none".to_string()
    } else {
        categories.names().join(", ")
    };
    Some(format!(
        "category '{}' does not exist (available: {})",
        requested, available
    ))
}

// Prints resources as a human-readable list in the terminal
fn print_table(records: &[&ResourceRecord], links: &LinkBuilder) {
    println!("{:<40} {:<20} {:<10}", "NAME", "CATEGORY", "LINK");
    println!("{}", "=".repeat(72));

    for record in records {
        // Long names are cut so the columns stay aligned
        let name = if record.name().chars().count() > 37 {
            let cut: String = record.name().chars().take(37).collect();
            format!("{}...", cut)
        } else {
            record.name().to_string()
        };
        let resource_links = links.links_for(record);

        println!(
            "{:<40} {:<20} {:<10}",
            name,
            record.category_label(),
            resource_links.download_label
        );
        println!("   📄 {}", record.path());
        println!("   🔗 Open: {}", resource_links.view);
        println!("   ⬇️  {}: {}", resource_links.download_label, resource_links.download);
    }

    println!();
    println!("📊 {} resource(s) shown", records.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_shelf::{Catalog, ErrorKind};

    fn categories(paths: &[&str]) -> CategoryList {
        Catalog::new(
            paths
                .iter()
                .filter_map(|p| ResourceRecord::from_path(p, None))
                .collect(),
        )
        .categories()
    }

    #[test]
    fn test_unknown_category_is_reported() {
        let list = categories(&["Slides/a.pptx", "Worksheets/b.pdf"]);

        let warning = unknown_category_warning(&list, "slides").unwrap();
        assert!(warning.contains("'slides'"));
        assert!(warning.contains("Slides, Worksheets"));

        assert_eq!(unknown_category_warning(&list, "Slides"), None);
        assert_eq!(unknown_category_warning(&list, ""), None);
    }

    #[test]
    fn test_unknown_category_in_empty_catalog() {
        let warning = unknown_category_warning(&categories(&[]), "Slides").unwrap();
        assert!(warning.contains("available: none"));
    }

    #[test]
    fn test_exit_codes() {
        let record = ResourceRecord::from_path("Slides/a.pptx", None).unwrap();

        assert_eq!(exit_code(&ViewState::Resources(vec![&record])), 0);
        assert_eq!(exit_code(&ViewState::NoMatches), 1);
        assert_eq!(exit_code(&ViewState::Loading), 2);
        assert_eq!(
            exit_code(&ViewState::Failed {
                kind: ErrorKind::NotFound,
                message: "not found",
            }),
            2
        );
    }
}

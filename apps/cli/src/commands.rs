//! CLI command definitions, routing, and tracing setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use walkdir::WalkDir;

use bylines_committers::BuildSession;
use bylines_shared::{AppConfig, PageContext, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// bylines — per-page committers metadata for documentation sites.
#[derive(Parser)]
#[command(
    name = "bylines",
    version,
    about = "Annotate documentation pages with git committers and last commit dates.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Resolve committers for every page under the docs directory.
    Run {
        /// Project root holding the git repository and bylines.toml.
        #[arg(long, default_value = ".")]
        repo_root: PathBuf,

        /// Docs directory to walk, relative to the project root.
        #[arg(long)]
        docs_dir: Option<PathBuf>,

        /// Config file path (defaults to <repo-root>/bylines.toml).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the JSON contexts to a file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize bylines.toml with defaults.
    Init {
        /// Project root to place the config file in.
        #[arg(long, default_value = ".")]
        repo_root: PathBuf,
    },
    /// Show resolved configuration.
    Show {
        /// Project root to resolve the config file from.
        #[arg(long, default_value = ".")]
        repo_root: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "bylines=info",
        1 => "bylines=debug",
        _ => "bylines=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            repo_root,
            docs_dir,
            config,
            out,
        } => cmd_run(
            &repo_root,
            docs_dir.as_deref(),
            config.as_deref(),
            out.as_deref(),
        ),
        Command::Config { action } => match action {
            ConfigAction::Init { repo_root } => cmd_config_init(&repo_root),
            ConfigAction::Show { repo_root } => cmd_config_show(&repo_root),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_run(
    repo_root: &Path,
    docs_dir: Option<&Path>,
    config_path: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config(repo_root)?,
    };

    // Walk the same directory the docs_path prefix points at, unless
    // overridden.
    let docs_dir = match docs_dir {
        Some(dir) => repo_root.join(dir),
        None => repo_root.join(config.docs_path.trim_end_matches('/')),
    };
    if !docs_dir.is_dir() {
        return Err(eyre!("docs directory not found: {}", docs_dir.display()));
    }

    let pages = collect_pages(&docs_dir)?;
    info!(pages = pages.len(), docs_dir = %docs_dir.display(), "annotating pages");

    let mut session = BuildSession::new(config, repo_root)?;
    session.pre_build()?;

    let mut contexts: BTreeMap<String, PageContext> = BTreeMap::new();
    for src_path in pages {
        let context = session.page_context(&src_path);
        contexts.insert(src_path, context);
    }

    session.post_build()?;
    info!(
        elapsed_ms = session.total_time().as_millis(),
        "annotation complete"
    );

    let json = serde_json::to_string_pretty(&contexts)?;
    match out {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

fn cmd_config_init(repo_root: &Path) -> Result<()> {
    let path = bylines_shared::init_config(repo_root)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn cmd_config_show(repo_root: &Path) -> Result<()> {
    let config: AppConfig = load_config(repo_root)?;
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Page collection
// ---------------------------------------------------------------------------

/// Collect Markdown source paths under `docs_dir`, relative to it, sorted,
/// with forward-slash separators.
fn collect_pages(docs_dir: &Path) -> Result<Vec<String>> {
    let mut pages = Vec::new();

    for entry in WalkDir::new(docs_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(docs_dir)
            .expect("walked entries live under docs_dir");
        pages.push(rel.to_string_lossy().replace('\\', "/"));
    }

    pages.sort();
    Ok(pages)
}

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("md") | Some("markdown")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_only_markdown_sorted() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("guides")).unwrap();
        std::fs::write(dir.path().join("index.md"), "").unwrap();
        std::fs::write(dir.path().join("guides/setup.md"), "").unwrap();
        std::fs::write(dir.path().join("guides/notes.markdown"), "").unwrap();
        std::fs::write(dir.path().join("logo.png"), "").unwrap();

        let pages = collect_pages(dir.path()).unwrap();
        assert_eq!(
            pages,
            vec!["guides/notes.markdown", "guides/setup.md", "index.md"]
        );
    }
}

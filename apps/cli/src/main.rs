//! bylines CLI — annotates documentation pages with their git committers.
//!
//! Walks a docs tree, resolves each page's last commit date from local git
//! history and its contributors from the git host's web UI, and emits the
//! per-page context as JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}

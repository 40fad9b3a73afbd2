//! `shape` -- parametric shape calculator CLI.
//!
//! Thin driver over `shape_core`: parses arguments with clap, installs the
//! log subscriber and dispatches to the command handlers.

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("shape_core=debug,shape=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::List(args) => commands::list(args),
        Commands::Show(args) => commands::show(args),
        Commands::Calc(args) => commands::calc(args),
        Commands::Eval(args) => commands::eval(args),
        Commands::Check => commands::check(),
    }
}

//! Clap CLI definitions for the `shape` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// shape -- parametric shape calculator.
///
/// Browses the built-in shape catalog and prices shapes from JSON requests.
/// Results are printed as JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "shape", version, propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (otherwise RUST_LOG applies).
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List catalog shapes, optionally for one category group.
    List(ListArgs),

    /// Show one catalog shape with its parameters and formulas.
    Show(ShowArgs),

    /// Run a calculation request.
    Calc(CalcArgs),

    /// Evaluate a single expression.
    Eval(EvalArgs),

    /// Check every catalog shape for structural and formula problems.
    Check,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Category group: plates, tubes, nozzles, heads, cones or all.
    #[arg(short, long, default_value = "all")]
    pub group: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Catalog key, e.g. rectangular_plate.
    pub key: String,
}

#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Request file (JSON); "-" reads stdin.
    pub request: PathBuf,

    /// Engine settings file (JSON). Missing fields keep their defaults.
    #[arg(short, long)]
    pub settings: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EvalArgs {
    pub expression: String,

    /// Variable binding NAME=VALUE (repeatable).
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
    pub bindings: Vec<String>,
}

//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Galley - package-build recipes driven by a host package manager
#[derive(Parser)]
#[command(name = "galley")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in recipes
    List(ListArgs),

    /// Configure, build and install a package from a staged checkout
    Install(InstallArgs),

    /// Show what an install would run, without running it
    Plan(PlanArgs),

    /// Synthesize one Bazel external repository from an installed package
    External(ExternalArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Also show declared dependencies and variants
    #[arg(long)]
    pub deps: bool,
}

/// Inputs every recipe run needs.
#[derive(Args)]
pub struct StageArgs {
    /// Resolved specification written by the package manager
    #[arg(long, value_name = "FILE")]
    pub spec: PathBuf,

    /// Staged source checkout
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Recipe name (see `galley list`)
    pub recipe: String,

    #[command(flatten)]
    pub stage: StageArgs,

    /// Install prefix
    #[arg(long, value_name = "DIR")]
    pub prefix: PathBuf,

    /// Run only this phase (configure, build or install)
    #[arg(long)]
    pub phase: Option<String>,

    /// Number of parallel build jobs
    #[arg(short, long, env = "GALLEY_JOBS")]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Recipe name (see `galley list`)
    pub recipe: String,

    #[command(flatten)]
    pub stage: StageArgs,

    /// Install prefix
    #[arg(long, value_name = "DIR", default_value = "prefix")]
    pub prefix: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ExternalArgs {
    /// Package-manager name of the dependency
    pub package: String,

    /// Resolved specification containing the dependency
    #[arg(long, value_name = "FILE")]
    pub spec: PathBuf,

    /// Directory the repository is created under
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Bazel repository name (defaults to the package name)
    #[arg(long)]
    pub bazel_name: Option<String>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

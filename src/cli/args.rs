//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// orgflow - Declarative task and flow orchestration.
#[derive(Debug, Parser)]
#[command(name = "orgflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (replaces orgflow.yml discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Org whose attributes are exposed as `org` (defaults to default_org)
    #[arg(long, global = true, env = "ORGFLOW_ORG")]
    pub org: Option<String>,

    /// Show step outputs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the expanded steps of a flow without running it
    Plan(PlanArgs),

    /// Run a flow
    Run(RunArgs),

    /// Run a single task outside of any flow
    Task(TaskArgs),

    /// List available tasks and flows
    List(ListArgs),

    /// Validate tasks and flows
    Lint(LintArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PlanArgs {
    /// Flow to expand
    pub flow: String,

    /// Option override for a task in the flow
    #[arg(short = 'o', long = "option", value_name = "TASK__KEY=VALUE")]
    pub options: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Flow to run
    pub flow: String,

    /// Option override for a task in the flow
    #[arg(short = 'o', long = "option", value_name = "TASK__KEY=VALUE")]
    pub options: Vec<String>,

    /// Skip steps running these tasks (comma-separated or repeated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Output the run result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `task` command.
#[derive(Debug, Clone, clap::Args)]
pub struct TaskArgs {
    /// Task to run
    pub name: String,

    /// Option for the task
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Output the step record as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// List only tasks
    #[arg(long, conflicts_with = "flows_only")]
    pub tasks_only: bool,

    /// List only flows
    #[arg(long)]
    pub flows_only: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `lint` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LintArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::default_config_path;

use crate::types::{TaskStatus, VisualizationFormat};

/// Command-line arguments for `taskdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskdag",
    version,
    about = "Manage task lists as dependency graphs: readiness, analysis and gated status changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskdag.toml` in the current working directory. A missing
    /// file means built-in defaults.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an empty task list.
    Create {
        title: String,
        /// Explicit list id (default: random UUID).
        #[arg(long)]
        id: Option<String>,
    },

    /// Print the ids of every stored list.
    Lists,

    /// Print a whole list as JSON.
    Show { list: String },

    /// Add a task to a list.
    Add {
        list: String,
        title: String,
        #[arg(long)]
        id: Option<String>,
        /// Priority 1 (lowest) to 5 (highest).
        #[arg(long, default_value_t = 3)]
        priority: u8,
        /// Estimated duration in minutes.
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Remove a task; dependents drop it from their dependencies.
    Remove { list: String, task: String },

    /// Tasks whose dependencies are all completed, best first.
    Ready {
        list: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Tasks waiting on incomplete dependencies.
    Blocked { list: String },

    /// Structural analysis plus a rendered graph.
    Analyze {
        list: String,
        #[arg(long, value_parser = parse_format)]
        format: Option<VisualizationFormat>,
        /// Print only the rendered graph instead of the JSON report.
        #[arg(long)]
        graph_only: bool,
    },

    /// Replace a task's dependencies (no ids clears them).
    Deps {
        list: String,
        task: String,
        dependencies: Vec<String>,
    },

    /// Change a task's status.
    Status {
        list: String,
        task: String,
        #[arg(value_parser = parse_status)]
        status: TaskStatus,
    },

    /// Replace a task's exit criteria.
    Criteria {
        list: String,
        task: String,
        descriptions: Vec<String>,
    },

    /// Mark one exit criterion met (or unmet with `--unmet`).
    Meet {
        list: String,
        task: String,
        criterion: String,
        #[arg(long)]
        unmet: bool,
        #[arg(long)]
        notes: Option<String>,
    },
}

impl Command {
    /// Whether the command writes to the store.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Command::Lists
                | Command::Show { .. }
                | Command::Ready { .. }
                | Command::Blocked { .. }
                | Command::Analyze { .. }
        )
    }
}

fn parse_format(s: &str) -> Result<VisualizationFormat, String> {
    s.parse()
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    s.parse()
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

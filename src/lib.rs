// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod types;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cli::{CliArgs, Command};
use crate::config::loader::load_or_default;
use crate::lifecycle::CriterionUpdate;
use crate::model::{NewTask, Priority, TaskList};
use crate::service::TaskListService;
use crate::types::StorageMode;

pub use crate::errors::TaskDagError;
pub use crate::service::ListEvent;

/// High-level entry point used by `main.rs`.
///
/// Loads the config (defaults if the file is missing), opens the configured
/// store, runs one command and prints its result to stdout.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = &args.config;
    let cfg = load_or_default(config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    if cfg.storage.mode == StorageMode::Memory && args.command.is_mutation() {
        warn!("storage mode is \"memory\"; this change is discarded when the command exits");
    }

    let service = TaskListService::from_config(&cfg)?;
    execute(&service, args.command).await
}

async fn execute(service: &TaskListService, command: Command) -> Result<()> {
    debug!(?command, "executing command");
    match command {
        Command::Create { title, id } => {
            let list = match id {
                Some(id) => TaskList::with_id(id, title),
                None => TaskList::new(title),
            };
            print_json(&service.create_list(list).await?)
        }
        Command::Lists => print_json(&service.list_ids()?),
        Command::Show { list } => print_json(&ListSummary::new(service.get_list(&list).await?)),
        Command::Add {
            list,
            title,
            id,
            priority,
            duration,
            tags,
        } => {
            let mut new = NewTask::new(title).with_priority(Priority::new(priority)?);
            if let Some(id) = id {
                new = new.with_id(id);
            }
            if let Some(minutes) = duration {
                new = new.with_duration(minutes);
            }
            for tag in tags {
                new = new.with_tag(tag);
            }
            print_json(&service.add_task(&list, new).await?)
        }
        Command::Remove { list, task } => print_json(&service.remove_task(&list, &task).await?),
        Command::Ready { list, limit } => print_json(&service.get_ready_tasks(&list, limit).await?),
        Command::Blocked { list } => print_json(&service.get_blocked_tasks(&list).await?),
        Command::Analyze {
            list,
            format,
            graph_only,
        } => {
            let analysis = service.analyze_dependencies(&list, format).await?;
            if graph_only {
                println!("{}", analysis.visualization);
                Ok(())
            } else {
                print_json(&analysis)
            }
        }
        Command::Deps {
            list,
            task,
            dependencies,
        } => print_json(&service.set_dependencies(&list, &task, dependencies).await?),
        Command::Status { list, task, status } => {
            print_json(&service.set_task_status(&list, &task, status).await?)
        }
        Command::Criteria {
            list,
            task,
            descriptions,
        } => print_json(&service.set_exit_criteria(&list, &task, descriptions).await?),
        Command::Meet {
            list,
            task,
            criterion,
            unmet,
            notes,
        } => {
            let update = CriterionUpdate {
                is_met: Some(!unmet),
                notes,
            };
            print_json(
                &service
                    .update_exit_criterion(&list, &task, &criterion, update)
                    .await?,
            )
        }
    }
}

/// A list plus its derived aggregates, as printed by `show`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListSummary {
    #[serde(flatten)]
    list: TaskList,
    total_items: usize,
    completed_items: usize,
    progress: f64,
}

impl ListSummary {
    fn new(list: TaskList) -> Self {
        Self {
            total_items: list.total_items(),
            completed_items: list.completed_items(),
            progress: list.progress(),
            list,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

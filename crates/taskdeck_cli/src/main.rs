//! Command-line front end for the task store.
//!
//! Every command opens the database, runs one core call and prints the
//! result as pretty JSON on stdout.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use taskdeck_core::{
    checklist_progress, completion_over_time, open_db, summary, tasks_by_priority,
    tasks_by_project, tasks_by_status, time_by_project, CompletionRange, CreateTaskRequest,
    ProjectService, SqliteProjectRepository, SqliteTaskRepository, TaskService,
    UpdateTaskRequest,
};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "TASKDECK_DB", default_value = "taskdeck.db")]
    db: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "TASKDECK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "TASKDECK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Health check
    Ping,
    ProjectCreate {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    ProjectList,
    /// Delete a project with all of its tasks
    ProjectDelete { id: Uuid },
    /// Create a task from a JSON request body
    TaskCreate {
        #[arg(long)]
        json: String,
    },
    /// Patch a task from a JSON request body
    TaskUpdate {
        id: Uuid,
        #[arg(long)]
        json: String,
    },
    TaskGet { id: Uuid },
    TaskList {
        #[arg(long)]
        project: Option<Uuid>,
    },
    /// Record timer progress; lower values are ignored
    TaskTime { id: Uuid, seconds: i64 },
    /// Overwrite timer state
    #[command(group(ArgGroup::new("state").required(true).args(["active", "inactive"])))]
    TaskTimer {
        id: Uuid,
        seconds: i64,
        #[arg(long)]
        active: bool,
        #[arg(long)]
        inactive: bool,
    },
    TaskDelete { id: Uuid },
    Analytics {
        #[arg(value_enum)]
        report: Report,
        /// week|month|all, used by `completion`
        #[arg(long, default_value = "all")]
        range: CompletionRange,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Report {
    Status,
    Priority,
    Projects,
    Time,
    Checklist,
    Completion,
    Summary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| taskdeck_core::default_log_level());
        taskdeck_core::init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    if let Command::Ping = cli.command {
        return print_json(&json!({
            "ping": taskdeck_core::ping(),
            "version": taskdeck_core::core_version(),
        }));
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    info!(
        "event=cli_command module=cli status=start db={}",
        cli.db.display()
    );

    match cli.command {
        Command::Ping => Ok(()),
        Command::ProjectCreate { name, description } => {
            let service = ProjectService::new(SqliteProjectRepository::try_new(&conn)?);
            print_json(&service.create_project(&name, description)?)
        }
        Command::ProjectList => {
            let service = ProjectService::new(SqliteProjectRepository::try_new(&conn)?);
            print_json(&service.list_projects()?)
        }
        Command::ProjectDelete { id } => {
            let service = ProjectService::new(SqliteProjectRepository::try_new(&conn)?);
            let removed = service.delete_project(id)?;
            print_json(&json!({
                "deleted": id,
                "tasks": removed.tasks,
                "checklistItems": removed.checklist_items,
                "comments": removed.comments,
            }))
        }
        Command::TaskCreate { json } => {
            let request: CreateTaskRequest =
                serde_json::from_str(&json).context("invalid task create request")?;
            let service = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            print_json(&service.create_task(request)?)
        }
        Command::TaskUpdate { id, json } => {
            let request: UpdateTaskRequest =
                serde_json::from_str(&json).context("invalid task update request")?;
            let service = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            print_json(&service.update_task(id, request)?)
        }
        Command::TaskGet { id } => {
            let service = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            print_json(&service.get_task(id)?)
        }
        Command::TaskList { project } => {
            let service = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            print_json(&service.list_tasks_with_children(project)?)
        }
        Command::TaskTime { id, seconds } => {
            let service = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            service.update_time(id, seconds)?;
            print_json(&json!({ "updated": id }))
        }
        Command::TaskTimer {
            id,
            seconds,
            active,
            ..
        } => {
            let service = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            service.update_timer(id, seconds, active)?;
            print_json(&json!({ "updated": id }))
        }
        Command::TaskDelete { id } => {
            let service = TaskService::new(SqliteTaskRepository::try_new(&conn)?);
            service.delete_task(id)?;
            print_json(&json!({ "deleted": id }))
        }
        Command::Analytics { report, range } => match report {
            Report::Status => print_json(&tasks_by_status(&conn)?),
            Report::Priority => print_json(&tasks_by_priority(&conn)?),
            Report::Projects => print_json(&tasks_by_project(&conn)?),
            Report::Time => print_json(&time_by_project(&conn)?),
            Report::Checklist => print_json(&checklist_progress(&conn)?),
            Report::Completion => print_json(&completion_over_time(&conn, range)?),
            Report::Summary => print_json(&summary(&conn)?),
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::{io::Write, path::PathBuf, time::Duration};

use crate::api::TaskApi;
use crate::config::{Config, ConfigError, DEFAULT_API_URL, DEFAULT_LOG_FILE};
use crate::date_picker::{parse_iso, DateParseError};
use crate::task::{NewTask, Task, TaskId, TaskStatus, TaskUpdate};

#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Terminal client for a REST task list")]
pub struct Cli {
    /// Base URL of the task backend
    #[arg(long, env = "TASKBOARD_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Give up on a request after this many seconds (default: wait forever)
    #[arg(long, env = "TASKBOARD_TIMEOUT", value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Where the interactive board writes its log
    #[arg(long, env = "TASKBOARD_LOG_FILE", default_value = DEFAULT_LOG_FILE, global = true)]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Open the interactive board (default)
    Board {
        /// Run against a throwaway in-memory backend
        #[arg(long)]
        demo: bool,
    },
    /// Print every task
    List,
    /// Print one task
    Show { id: String },
    /// Create a task
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Due date as YYYY-MM-DD
        #[arg(long, value_parser = parse_due)]
        due: NaiveDate,
        #[arg(long, default_value = "Not Started")]
        status: TaskStatus,
    },
    /// Change the status of a task
    Status { id: String, status: TaskStatus },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn parse_due(value: &str) -> Result<NaiveDate, DateParseError> {
    let (y, m, d) = parse_iso(value)?;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| DateParseError::Invalid(value.to_string()))
}

impl Cli {
    pub fn config(&self) -> Result<Config, ConfigError> {
        Ok(Config::new(&self.api_url)?
            .with_timeout(self.timeout.map(Duration::from_secs))
            .with_log_file(&self.log_file))
    }
}

fn write_task(out: &mut impl Write, task: &Task) -> std::io::Result<()> {
    writeln!(
        out,
        "[#{}] {} | {} | Due: {} | {}",
        task.id,
        task.title,
        task.display_description(),
        task.due_date,
        task.status
    )
}

/// Runs a one-shot command. `confirm` is asked before a delete without
/// `--yes`; answering no sends nothing.
pub async fn run<W, C>(
    command: Command,
    api: &dyn TaskApi,
    out: &mut W,
    confirm: C,
) -> anyhow::Result<()>
where
    W: Write,
    C: FnOnce(&str) -> std::io::Result<bool>,
{
    match command {
        Command::Board { .. } => anyhow::bail!("the board is interactive; run it from main"),
        Command::List => {
            let tasks = api.list().await?;
            if tasks.is_empty() {
                writeln!(out, "No tasks")?;
            }
            for task in &tasks {
                write_task(out, task)?;
            }
        }
        Command::Show { id } => {
            let task = api.fetch(&TaskId::new(id)).await?;
            write_task(out, &task)?;
        }
        Command::Add {
            title,
            description,
            due,
            status,
        } => {
            let task = NewTask {
                title,
                description,
                due_date: due,
                status,
            };
            api.create(&task).await?;
            writeln!(out, "Task created")?;
        }
        Command::Status { id, status } => {
            api.update(&TaskId::new(id), &TaskUpdate::status(status))
                .await?;
            writeln!(out, "Task updated")?;
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm("Are you sure you want to delete this task?")? {
                writeln!(out, "Delete cancelled")?;
                return Ok(());
            }
            api.delete(&TaskId::new(id)).await?;
            writeln!(out, "Task deleted")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{InMemoryTaskApi, RecordedRequest};

    fn api() -> InMemoryTaskApi {
        InMemoryTaskApi::new(vec![Task {
            id: TaskId::from(4),
            title: "Renew passport".into(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
            status: TaskStatus::OnHold,
        }])
    }

    async fn run_to_string(command: Command, api: &InMemoryTaskApi, answer: bool) -> String {
        let mut out = Vec::new();
        run(command, api, &mut out, |_| Ok(answer)).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_add_arguments() {
        let cli = Cli::try_parse_from([
            "taskboard",
            "--api-url",
            "http://tasks.local:8080",
            "add",
            "--title",
            "A",
            "--due",
            "2025-03-01",
            "--status",
            "On Hold",
        ])
        .unwrap();
        assert_eq!(cli.config().unwrap().endpoint("/tasks"), "http://tasks.local:8080/tasks");
        let Some(Command::Add { title, due, status, description }) = cli.command else {
            panic!("expected add");
        };
        assert_eq!(title, "A");
        assert_eq!(description, "");
        assert_eq!(due.to_string(), "2025-03-01");
        assert_eq!(status, TaskStatus::OnHold);
    }

    #[test]
    fn rejects_impossible_due_date() {
        let parsed = Cli::try_parse_from(["taskboard", "add", "--title", "A", "--due", "2023-02-29"]);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn list_prints_rows() {
        let api = api();
        let out = run_to_string(Command::List, &api, true).await;
        assert_eq!(out, "[#4] Renew passport | No description | Due: 2027-06-30 | On Hold\n");
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let api = api();
        let out = run_to_string(
            Command::Delete {
                id: "4".into(),
                yes: false,
            },
            &api,
            false,
        )
        .await;
        assert_eq!(out, "Delete cancelled\n");
        assert!(api.requests().is_empty());
        assert_eq!(api.tasks().len(), 1);
    }

    #[tokio::test]
    async fn status_sends_status_only() {
        let api = api();
        run_to_string(
            Command::Status {
                id: "4".into(),
                status: TaskStatus::Completed,
            },
            &api,
            true,
        )
        .await;
        assert_eq!(
            api.requests(),
            vec![RecordedRequest::Update(
                TaskId::from(4),
                TaskUpdate::status(TaskStatus::Completed)
            )]
        );
    }

    #[tokio::test]
    async fn show_missing_task_fails() {
        let api = api();
        let mut out = Vec::new();
        let err = run(Command::Show { id: "99".into() }, &api, &mut out, |_| Ok(true))
            .await
            .unwrap_err();
        let api_err = err.downcast_ref::<crate::error::ApiError>().unwrap();
        assert!(api_err.is_not_found());
    }
}

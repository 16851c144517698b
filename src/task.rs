use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Server-assigned task identifier. The backend hands out integers, but
/// nothing here depends on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => TaskId(n.to_string()),
            Raw::Text(s) => TaskId(s),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    #[serde(rename = "On Hold")]
    OnHold,
}

impl TaskStatus {
    /// Selector order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::OnHold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::OnHold => "On Hold",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// Next option in the selector, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown task status `{0}` (expected one of: Not Started, In Progress, Completed, On Hold)")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
}

impl Task {
    pub fn display_description(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => "No description",
        }
    }
}

/// Body of `GET /tasks`.
#[derive(Debug, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

/// Body of `GET /tasks/{id}`.
#[derive(Debug, Deserialize)]
pub struct TaskEnvelope {
    pub task: Task,
}

/// Body of `POST /tasks`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
}

/// Body of `PUT /tasks/{id}`. Fields left as `None` are not sent, and the
/// backend leaves them untouched.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Full replace of the editable fields; status is not part of it.
    pub fn details(title: String, description: String, due_date: NaiveDate) -> Self {
        Self {
            title: Some(title),
            description: Some(description),
            due_date: Some(due_date),
            status: None,
        }
    }

    /// Applies the present fields to `task`, the way the backend does.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_task_list() {
        let body = json!({
            "tasks": [
                {"id": 1, "title": "Write report", "description": null,
                 "due_date": "2025-12-31", "status": "In Progress"},
                {"id": "abc", "title": "Call Bob", "description": "about lunch",
                 "due_date": "2024-02-29", "status": "On Hold"}
            ]
        });
        let list: TaskList = serde_json::from_value(body).unwrap();

        assert_eq!(list.tasks.len(), 2);
        assert_eq!(list.tasks[0].id, TaskId::from(1));
        assert_eq!(list.tasks[0].status, TaskStatus::InProgress);
        assert_eq!(list.tasks[0].display_description(), "No description");
        assert_eq!(list.tasks[1].id.as_str(), "abc");
        assert_eq!(
            list.tasks[1].due_date,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn string_ids_are_kept_verbatim() {
        let task: Task = serde_json::from_value(json!({
            "id": "007", "title": "x", "due_date": "2025-01-01", "status": "Completed"
        }))
        .unwrap();
        assert_eq!(task.id.to_string(), "007");
        assert_ne!(task.id, TaskId::from(7));
    }

    #[test]
    fn rejects_impossible_due_date_and_unknown_status() {
        let bad_date = json!({"id": 1, "title": "x", "due_date": "2023-02-29", "status": "Completed"});
        assert!(serde_json::from_value::<Task>(bad_date).is_err());

        let bad_status = json!({"id": 1, "title": "x", "due_date": "2023-02-28", "status": "Done"});
        assert!(serde_json::from_value::<Task>(bad_status).is_err());
    }

    #[test]
    fn status_update_only_carries_status() {
        let body = serde_json::to_value(TaskUpdate::status(TaskStatus::Completed)).unwrap();
        assert_eq!(body, json!({"status": "Completed"}));
    }

    #[test]
    fn details_update_leaves_status_out() {
        let due = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let body = serde_json::to_value(TaskUpdate::details("T".into(), "".into(), due)).unwrap();
        assert_eq!(body, json!({"title": "T", "description": "", "due_date": "2026-01-05"}));
    }

    #[test]
    fn status_cycles_through_all_values() {
        let mut status = TaskStatus::NotStarted;
        for _ in 0..TaskStatus::ALL.len() {
            status = status.next();
        }
        assert_eq!(status, TaskStatus::NotStarted);
        assert_eq!(TaskStatus::NotStarted.previous(), TaskStatus::OnHold);
        assert_eq!("in progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert!("later".parse::<TaskStatus>().is_err());
    }
}

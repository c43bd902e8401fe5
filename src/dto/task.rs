use crate::domain;
use crate::domain::todo::TaskStatus;
use serde::{Deserialize, Serialize};

/// DTO for a task returned by the backend. Older backends describe completion with a boolean
/// and call the assignee the owner, so both spellings are accepted.
#[derive(Debug, Deserialize)]
pub struct TaskResponse {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "owner_id")]
    pub assignee_id: i32,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "completed")]
    pub is_completed: Option<bool>,
}

fn status_from_wire(status: Option<&str>, is_completed: Option<bool>) -> TaskStatus {
    match status {
        Some("pending") => TaskStatus::Pending,
        Some("in_progress") => TaskStatus::InProgress,
        Some("completed") => TaskStatus::Completed,
        _ if is_completed == Some(true) => TaskStatus::Completed,
        _ => TaskStatus::Pending,
    }
}

impl From<TaskResponse> for domain::todo::Task {
    fn from(value: TaskResponse) -> Self {
        domain::todo::Task {
            id: value.id,
            status: status_from_wire(value.status.as_deref(), value.is_completed),
            title: value.title,
            description: value.description.filter(|desc| !desc.is_empty()),
            assignee_id: value.assignee_id,
        }
    }
}

/// DTO for creating a task
#[derive(Debug, Serialize)]
pub struct TaskCreateBody {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: i32,
    pub status: &'static str,
    pub is_completed: bool,
}

impl From<&domain::todo::NewTask> for TaskCreateBody {
    fn from(value: &domain::todo::NewTask) -> Self {
        TaskCreateBody {
            title: value.title.clone(),
            description: value.description.clone(),
            assignee_id: value.assignee_id,
            status: TaskStatus::Pending.as_str(),
            is_completed: false,
        }
    }
}

/// DTO for replacing a task's contents
#[derive(Debug, Serialize)]
pub struct TaskUpdateBody {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: i32,
    pub status: &'static str,
    pub is_completed: bool,
}

impl From<&domain::todo::TaskUpdate> for TaskUpdateBody {
    fn from(value: &domain::todo::TaskUpdate) -> Self {
        TaskUpdateBody {
            title: value.title.clone(),
            description: value.description.clone(),
            assignee_id: value.assignee_id,
            status: value.status.as_str(),
            is_completed: value.status.is_completed(),
        }
    }
}

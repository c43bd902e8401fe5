use crate::domain::DrivenPortError;
use crate::domain::session::Session;
use crate::external_connections::ExternalConnectivity;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Flips the completion state. Anything unfinished becomes completed, and completed
    /// work goes back to pending.
    pub fn toggled(&self) -> TaskStatus {
        match self {
            Self::Completed => Self::Pending,
            Self::Pending | Self::InProgress => Self::Completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: i32,
    pub status: TaskStatus,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewTask {
    #[validate(custom = "not_blank")]
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: i32,
}

/// The full replacement record sent when a task changes
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct TaskUpdate {
    #[validate(custom = "not_blank")]
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee_id: i32,
}

impl TaskUpdate {
    /// Starts an update from the task's current contents
    pub fn from_task(task: &Task) -> TaskUpdate {
        TaskUpdate {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            assignee_id: task.assignee_id,
        }
    }

    pub fn with_changes(mut self, changes: &TaskChanges) -> TaskUpdate {
        if let Some(ref title) = changes.title {
            self.title = title.clone();
        }
        if let Some(ref description) = changes.description {
            self.description = Some(description.clone()).filter(|desc| !desc.is_empty());
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(assignee_id) = changes.assignee_id {
            self.assignee_id = assignee_id;
        }

        self
    }
}

/// A partial edit of a task. Fields left as [None] keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    /// An empty string removes the description
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<i32>,
}

pub mod driven_ports {
    use super::*;

    pub trait TaskReader {
        /// Lists every task the backend lets the session see
        async fn visible_tasks(
            &self,
            session: &Session,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Vec<Task>, DrivenPortError>;
    }

    pub trait TaskWriter {
        async fn create_task(
            &self,
            session: &Session,
            new_task: &NewTask,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Task, DrivenPortError>;

        async fn update_task(
            &self,
            session: &Session,
            task_id: i32,
            update: &TaskUpdate,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<Task, DrivenPortError>;

        async fn delete_task(
            &self,
            session: &Session,
            task_id: i32,
            ext_cxn: &impl ExternalConnectivity,
        ) -> Result<(), DrivenPortError>;
    }
}

//! The task board: one view for every role, with the role's [Permissions] deciding which
//! operations are on offer. Every write is followed by a full re-list; nothing is updated
//! optimistically, so a failed write leaves the board exactly as it was.

use crate::domain::router::{Permissions, ViewVariant};
use crate::domain::session::Session;
use crate::domain::todo::driven_ports::{TaskReader, TaskWriter};
use crate::domain::todo::{NewTask, Task, TaskChanges, TaskStatus, TaskUpdate};
use crate::domain::user::driven_ports::UserReader;
use crate::domain::user::{Role, User};
use crate::domain::{DrivenPortError, Error};
use crate::external_connections::ExternalConnectivity;
use tracing::{debug, error, info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

/// Contents of the "new task" form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub assignee_id: Option<i32>,
}

/// Contents of the inline edit form for one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub task_id: i32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee_id: i32,
}

#[derive(Debug)]
pub struct TaskBoard {
    session: Session,
    viewer: User,
    variant: ViewVariant,
    permissions: Permissions,
    tasks: Vec<Task>,
    assignees: Vec<User>,
    draft: TaskDraft,
    editing: Option<EditForm>,
}

impl TaskBoard {
    pub fn new(session: Session, viewer: User, variant: ViewVariant) -> TaskBoard {
        TaskBoard {
            session,
            viewer,
            variant,
            permissions: variant.permissions(),
            tasks: Vec::new(),
            assignees: Vec::new(),
            draft: TaskDraft::default(),
            editing: None,
        }
    }

    pub fn viewer(&self) -> &User {
        &self.viewer
    }

    pub fn variant(&self) -> ViewVariant {
        self.variant
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Users a task can be assigned to. Only filled in for variants that can assign.
    pub fn assignees(&self) -> &[User] {
        &self.assignees
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TaskDraft {
        &mut self.draft
    }

    pub fn editing(&self) -> Option<&EditForm> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditForm> {
        self.editing.as_mut()
    }

    pub fn assignee_name(&self, user_id: i32) -> Option<&str> {
        self.assignees
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| user.display_name.as_str())
    }

    fn task(&self, task_id: i32) -> Result<&Task, Error> {
        self.tasks
            .iter()
            .find(|task| task.id == task_id)
            .ok_or_else(|| {
                warn!("Task {task_id} is not on the board");
                Error::DoesNotExist
            })
    }

    /// Initial fetch when the board opens. Tasks and (for assigning variants) users are
    /// fetched concurrently and applied independently of each other.
    pub async fn load(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        task_read: &impl TaskReader,
        u_reader: &impl UserReader,
    ) -> Result<(), Error> {
        if !self.permissions.can_assign {
            return self.list_tasks(ext_cxn, task_read).await;
        }

        let (tasks_result, users_result) = futures::join!(
            task_read.visible_tasks(&self.session, ext_cxn),
            u_reader.all_users(&self.session, ext_cxn)
        );

        let users_outcome = match users_result {
            Ok(users) => {
                self.set_assignees(users);
                Ok(())
            }
            Err(err) => Err(port_failure("list users", err)),
        };
        let tasks_outcome = match tasks_result {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(())
            }
            Err(err) => Err(port_failure("list tasks", err)),
        };

        match (tasks_outcome, users_outcome) {
            (Err(Error::Unauthorized), _) | (_, Err(Error::Unauthorized)) => Err(Error::Unauthorized),
            (tasks_outcome, users_outcome) => tasks_outcome.and(users_outcome),
        }
    }

    fn set_assignees(&mut self, users: Vec<User>) {
        self.assignees = users
            .into_iter()
            .filter(|user| matches!(user.role, Role::Staff | Role::Admin))
            .collect();

        let selection_still_valid = self
            .draft
            .assignee_id
            .is_some_and(|id| self.assignees.iter().any(|user| user.id == id));
        if !selection_still_valid {
            self.draft.assignee_id = self.assignees.first().map(|user| user.id);
        }
    }

    /// Replaces the board's tasks with whatever the backend currently shows the viewer
    pub async fn list_tasks(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<(), Error> {
        let tasks = task_read
            .visible_tasks(&self.session, ext_cxn)
            .await
            .map_err(|err| port_failure("list tasks", err))?;
        debug!("Board now shows {} tasks", tasks.len());
        self.tasks = tasks;

        Ok(())
    }

    /// Re-list after a successful write. A lost session is passed on; any other failure
    /// only means the board is stale.
    async fn refresh(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        task_read: &impl TaskReader,
    ) -> Result<(), Error> {
        match self.list_tasks(ext_cxn, task_read).await {
            Err(Error::Unauthorized) => Err(Error::Unauthorized),
            Err(_) => {
                warn!("Board may be out of date until the next successful listing");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// Submits the draft as a new task. On success the draft's text is cleared.
    pub async fn create_task(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<(), Error> {
        self.require(self.permissions.can_create, "create tasks")?;
        if self.draft.assignee_id.is_some() {
            self.require(self.permissions.can_assign, "assign tasks")?;
        }

        let assignee_id = if self.permissions.can_assign {
            self.draft.assignee_id.ok_or_else(|| {
                let mut errors = ValidationErrors::new();
                errors.add("assignee_id", ValidationError::new("required"));
                invalid(errors)
            })?
        } else {
            self.viewer.id
        };
        let new_task = NewTask {
            title: self.draft.title.clone(),
            description: Some(self.draft.description.clone()).filter(|desc| !desc.is_empty()),
            assignee_id,
        };
        new_task.validate().map_err(invalid)?;

        info!("Creating task \"{}\" for user {assignee_id}", new_task.title);
        let created = task_write
            .create_task(&self.session, &new_task, ext_cxn)
            .await
            .map_err(|err| port_failure("create a task", err))?;
        info!(task_id = created.id, "Task created");

        self.draft.title.clear();
        self.draft.description.clear();
        self.refresh(ext_cxn, task_read).await
    }

    /// Flips a task between completed and not completed
    pub async fn toggle_completion(
        &mut self,
        task_id: i32,
        ext_cxn: &impl ExternalConnectivity,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<(), Error> {
        self.require(self.permissions.can_toggle, "toggle tasks")?;

        let task = self.task(task_id)?;
        let update = TaskUpdate {
            status: task.status.toggled(),
            ..TaskUpdate::from_task(task)
        };

        info!("Marking task {task_id} as {}", update.status.as_str());
        self.send_update(task_id, &update, "toggle a task", ext_cxn, task_read, task_write)
            .await
    }

    /// Applies an edit to a task
    pub async fn update_task(
        &mut self,
        task_id: i32,
        changes: &TaskChanges,
        ext_cxn: &impl ExternalConnectivity,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<(), Error> {
        self.require(self.permissions.can_edit, "edit tasks")?;
        if changes.assignee_id.is_some() {
            self.require(self.permissions.can_assign, "assign tasks")?;
        }

        let update = TaskUpdate::from_task(self.task(task_id)?).with_changes(changes);
        update.validate().map_err(invalid)?;

        info!("Updating task {task_id}");
        self.send_update(task_id, &update, "update a task", ext_cxn, task_read, task_write)
            .await
    }

    async fn send_update(
        &mut self,
        task_id: i32,
        update: &TaskUpdate,
        action: &str,
        ext_cxn: &impl ExternalConnectivity,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<(), Error> {
        task_write
            .update_task(&self.session, task_id, update, ext_cxn)
            .await
            .map_err(|err| port_failure(action, err))?;

        self.refresh(ext_cxn, task_read).await
    }

    /// Opens the edit form with the task's current contents
    pub fn start_editing(&mut self, task_id: i32) -> Result<(), Error> {
        self.require(self.permissions.can_edit, "edit tasks")?;

        let task = self.task(task_id)?;
        self.editing = Some(EditForm {
            task_id,
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            assignee_id: task.assignee_id,
        });

        Ok(())
    }

    pub fn cancel_editing(&mut self) {
        self.editing = None;
    }

    /// Submits the edit form. The form closes only if the update went through.
    pub async fn save_edit(
        &mut self,
        ext_cxn: &impl ExternalConnectivity,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<(), Error> {
        let Some(form) = self.editing.clone() else {
            warn!("Tried to save an edit, but no task is being edited");
            return Err(Error::DoesNotExist);
        };

        let original_assignee = self.task(form.task_id)?.assignee_id;
        let changes = TaskChanges {
            title: Some(form.title),
            description: Some(form.description),
            status: Some(form.status),
            assignee_id: Some(form.assignee_id).filter(|id| *id != original_assignee),
        };
        self.update_task(form.task_id, &changes, ext_cxn, task_read, task_write)
            .await?;

        self.editing = None;
        Ok(())
    }

    pub async fn delete_task(
        &mut self,
        task_id: i32,
        ext_cxn: &impl ExternalConnectivity,
        task_read: &impl TaskReader,
        task_write: &impl TaskWriter,
    ) -> Result<(), Error> {
        self.require(self.permissions.can_delete, "delete tasks")?;

        info!("Deleting task {task_id}");
        task_write
            .delete_task(&self.session, task_id, ext_cxn)
            .await
            .map_err(|err| port_failure("delete a task", err))?;

        self.refresh(ext_cxn, task_read).await
    }

    fn require(&self, allowed: bool, action: &'static str) -> Result<(), Error> {
        if allowed {
            return Ok(());
        }

        warn!(
            variant = self.variant.heading(),
            "Viewer is not allowed to {action}"
        );
        Err(Error::Forbidden { action })
    }
}

#[cfg(test)]
impl TaskBoard {
    pub(crate) fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }
}

fn port_failure(action: &str, err: DrivenPortError) -> Error {
    let err = err.into_error_trying_to(action);
    error!("Failed to {action}: {err}");
    err
}

fn invalid(errors: ValidationErrors) -> Error {
    warn!("Task input was invalid: {errors}");
    Error::Invalid(errors)
}

use crate::domain;
use crate::domain::DrivenPortError;
use crate::domain::session::Session;
use crate::domain::todo::{NewTask, Task, TaskUpdate};
use crate::dto;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;

pub struct HttpTaskReader;

impl domain::todo::driven_ports::TaskReader for HttpTaskReader {
    #[tracing::instrument(skip_all)]
    async fn visible_tasks(
        &self,
        session: &Session,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Vec<Task>, DrivenPortError> {
        let request = ext_cxn
            .http_client()
            .get(ext_cxn.endpoint("/tasks/")?)
            .bearer_auth(session.bearer_token());

        let tasks: Vec<dto::task::TaskResponse> = super::send(request, "list tasks")
            .await?
            .json()
            .await
            .context("decoding the task list")?;

        Ok(tasks.into_iter().map(Task::from).collect())
    }
}

pub struct HttpTaskWriter;

impl domain::todo::driven_ports::TaskWriter for HttpTaskWriter {
    #[tracing::instrument(skip_all, fields(assignee_id = new_task.assignee_id))]
    async fn create_task(
        &self,
        session: &Session,
        new_task: &NewTask,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Task, DrivenPortError> {
        let request = ext_cxn
            .http_client()
            .post(ext_cxn.endpoint("/tasks/")?)
            .bearer_auth(session.bearer_token())
            .json(&dto::task::TaskCreateBody::from(new_task));

        let created: dto::task::TaskResponse = super::send(request, "create a task")
            .await?
            .json()
            .await
            .context("decoding the created task")?;

        Ok(created.into())
    }

    #[tracing::instrument(skip_all, fields(task_id = task_id))]
    async fn update_task(
        &self,
        session: &Session,
        task_id: i32,
        update: &TaskUpdate,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<Task, DrivenPortError> {
        let request = ext_cxn
            .http_client()
            .put(ext_cxn.endpoint(&format!("/tasks/{task_id}"))?)
            .bearer_auth(session.bearer_token())
            .json(&dto::task::TaskUpdateBody::from(update));

        let updated: dto::task::TaskResponse = super::send(request, "update a task")
            .await?
            .json()
            .await
            .context("decoding the updated task")?;

        Ok(updated.into())
    }

    #[tracing::instrument(skip_all, fields(task_id = task_id))]
    async fn delete_task(
        &self,
        session: &Session,
        task_id: i32,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<(), DrivenPortError> {
        let request = ext_cxn
            .http_client()
            .delete(ext_cxn.endpoint(&format!("/tasks/{task_id}"))?)
            .bearer_auth(session.bearer_token());

        super::send(request, "delete a task").await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_util::connectivity_for;
    use crate::domain::todo::TaskStatus;
    use crate::domain::todo::driven_ports::{TaskReader, TaskWriter};
    use mockito::Matcher;
    use serde_json::json;
    use speculoos::prelude::*;

    #[tokio::test]
    async fn lists_tasks_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let list_mock = server
            .mock("GET", "/api/v1/tasks/")
            .match_header("authorization", "Bearer abc123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {"id": 1, "title": "Buy milk", "description": null, "assignee_id": 3, "status": "pending"},
                    {"id": 2, "title": "Water plants", "owner_id": 4, "is_completed": true},
                ])
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let ext_cxn = connectivity_for(&server);

        let tasks = HttpTaskReader
            .visible_tasks(&Session::new("abc123"), &ext_cxn)
            .await
            .expect("listing should succeed");

        list_mock.assert_async().await;
        assert!(matches!(tasks.as_slice(), [
            Task { id: 1, assignee_id: 3, status: TaskStatus::Pending, description: None, .. },
            Task { id: 2, assignee_id: 4, status: TaskStatus::Completed, .. },
        ]));
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _list_mock = server
            .mock("GET", "/api/v1/tasks/")
            .with_status(401)
            .with_body(r#"{"detail": "Could not validate credentials"}"#)
            .create_async()
            .await;
        let ext_cxn = connectivity_for(&server);

        let list_result = HttpTaskReader
            .visible_tasks(&Session::new("expired"), &ext_cxn)
            .await;
        assert!(matches!(list_result, Err(DrivenPortError::Unauthorized)));
    }

    #[tokio::test]
    async fn garbage_listing_is_comms_failure() {
        let mut server = mockito::Server::new_async().await;
        let _list_mock = server
            .mock("GET", "/api/v1/tasks/")
            .with_status(200)
            .with_body("definitely not json")
            .create_async()
            .await;
        let ext_cxn = connectivity_for(&server);

        let list_result = HttpTaskReader
            .visible_tasks(&Session::new("abc123"), &ext_cxn)
            .await;
        assert!(matches!(list_result, Err(DrivenPortError::CommsFailure(_))));
    }

    #[tokio::test]
    async fn creates_task_for_assignee() {
        let mut server = mockito::Server::new_async().await;
        let create_mock = server
            .mock("POST", "/api/v1/tasks/")
            .match_header("authorization", "Bearer abc123")
            .match_body(Matcher::Json(json!({
                "title": "Buy milk",
                "description": null,
                "assignee_id": 3,
                "status": "pending",
                "is_completed": false,
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"id": 10, "title": "Buy milk", "assignee_id": 3, "status": "pending"})
                    .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let ext_cxn = connectivity_for(&server);
        let new_task = NewTask {
            title: "Buy milk".to_owned(),
            description: None,
            assignee_id: 3,
        };

        let created = HttpTaskWriter
            .create_task(&Session::new("abc123"), &new_task, &ext_cxn)
            .await;

        create_mock.assert_async().await;
        assert_that!(created).is_ok().matches(|task| task.id == 10);
    }

    #[tokio::test]
    async fn puts_full_record() {
        let mut server = mockito::Server::new_async().await;
        let update_mock = server
            .mock("PUT", "/api/v1/tasks/7")
            .match_body(Matcher::PartialJson(json!({
                "title": "File report",
                "status": "completed",
                "is_completed": true,
                "assignee_id": 2,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"id": 7, "title": "File report", "assignee_id": 2, "status": "completed"})
                    .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let ext_cxn = connectivity_for(&server);
        let update = TaskUpdate {
            title: "File report".to_owned(),
            description: Some("Q3".to_owned()),
            status: TaskStatus::Completed,
            assignee_id: 2,
        };

        let updated = HttpTaskWriter
            .update_task(&Session::new("abc123"), 7, &update, &ext_cxn)
            .await;

        update_mock.assert_async().await;
        assert_that!(updated)
            .is_ok()
            .matches(|task| task.status == TaskStatus::Completed);
    }

    #[tokio::test]
    async fn deleting_missing_task_does_not_exist() {
        let mut server = mockito::Server::new_async().await;
        let _delete_mock = server
            .mock("DELETE", "/api/v1/tasks/99")
            .with_status(404)
            .with_body(r#"{"detail": "Task not found"}"#)
            .create_async()
            .await;
        let ext_cxn = connectivity_for(&server);

        let delete_result = HttpTaskWriter
            .delete_task(&Session::new("abc123"), 99, &ext_cxn)
            .await;
        assert!(matches!(delete_result, Err(DrivenPortError::DoesNotExist)));
    }

    #[tokio::test]
    async fn deletes_task() {
        let mut server = mockito::Server::new_async().await;
        let delete_mock = server
            .mock("DELETE", "/api/v1/tasks/3")
            .match_header("authorization", "Bearer abc123")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;
        let ext_cxn = connectivity_for(&server);

        let delete_result = HttpTaskWriter
            .delete_task(&Session::new("abc123"), 3, &ext_cxn)
            .await;

        delete_mock.assert_async().await;
        assert_that!(delete_result).is_ok();
    }
}

//! Task CRUD against `/todo`.

use log::debug;
use session_auth::session::{Manager, RequestOptions};

use crate::api::{decode, ensure_success};
use crate::error::Error;
use crate::task::{StatusUpdate, Task, TaskPayload, TaskStatus};

const TODO_PATH: &str = "todo";

fn task_path(id: &str) -> String {
    format!("{}/{}", TODO_PATH, urlencoding::encode(id))
}

pub async fn list_tasks(manager: &Manager) -> Result<Vec<Task>, Error> {
    let response = manager
        .authenticated_request(&manager.endpoint(TODO_PATH), RequestOptions::get())
        .await?;

    let tasks: Vec<Task> = decode(response, "Failed to fetch tasks").await?;
    debug!("Fetched {} tasks", tasks.len());
    Ok(tasks)
}

pub async fn create_task(manager: &Manager, payload: &TaskPayload) -> Result<Task, Error> {
    let options = RequestOptions::post().json(payload)?;
    let response = manager
        .authenticated_request(&manager.endpoint(TODO_PATH), options)
        .await?;

    decode(response, "Operation failed").await
}

pub async fn update_task(manager: &Manager, id: &str, payload: &TaskPayload) -> Result<Task, Error> {
    let options = RequestOptions::patch().json(payload)?;
    let response = manager
        .authenticated_request(&manager.endpoint(&task_path(id)), options)
        .await?;

    decode(response, "Operation failed").await
}

pub async fn update_status(manager: &Manager, id: &str, status: TaskStatus) -> Result<(), Error> {
    let options = RequestOptions::patch().json(&StatusUpdate { status })?;
    let response = manager
        .authenticated_request(&manager.endpoint(&task_path(id)), options)
        .await?;

    ensure_success(response, "Failed to update task status").await?;
    Ok(())
}

pub async fn delete_task(manager: &Manager, id: &str) -> Result<(), Error> {
    let response = manager
        .authenticated_request(&manager.endpoint(&task_path(id)), RequestOptions::delete())
        .await?;

    ensure_success(response, "Failed to delete task").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use session_auth::store::{KeyValueStore, MemoryStore, ACCESS_TOKEN_KEY};
    use std::sync::Arc;

    async fn manager(base_url: &str) -> Manager {
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, "A1").await.unwrap();
        Manager::new(reqwest::Client::new(), base_url, store).unwrap()
    }

    fn payload() -> TaskPayload {
        TaskPayload {
            title: "Write report".to_string(),
            description: "Q3 numbers".to_string(),
            due_date: None,
            status: TaskStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_list_tasks() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/todo")
            .match_header("authorization", "Bearer A1")
            .with_status(200)
            .with_body(
                json!([
                    {"id": "1", "title": "Write report", "description": "Q3", "dueDate": "2025-03-01T09:30:00Z", "status": "COMPLETED"},
                    {"id": "2", "title": "Review PR", "description": null, "dueDate": null, "status": "IN_PROGRESS"}
                ])
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let manager = manager(&server.url()).await;

        let tasks = list_tasks(&manager).await.unwrap();

        mock.assert_async().await;
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].is_completed());
        assert!(tasks[0].due_date.is_some());
        assert_eq!(tasks[1].status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_list_tasks_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/todo")
            .with_status(500)
            .create_async()
            .await;
        let manager = manager(&server.url()).await;

        let err = list_tasks(&manager).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch tasks");
    }

    #[tokio::test]
    async fn test_create_task() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/todo")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "title": "Write report",
                "description": "Q3 numbers",
                "dueDate": null,
                "status": "PENDING"
            })))
            .with_status(201)
            .with_body(r#"{"id":"9","title":"Write report","description":"Q3 numbers","dueDate":null,"status":"PENDING"}"#)
            .expect(1)
            .create_async()
            .await;
        let manager = manager(&server.url()).await;

        let task = create_task(&manager, &payload()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(task.id, "9");
    }

    #[tokio::test]
    async fn test_create_task_surfaces_server_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/todo")
            .with_status(400)
            .with_body(r#"{"message":"\"title\" is required"}"#)
            .create_async()
            .await;
        let manager = manager(&server.url()).await;

        let err = create_task(&manager, &payload()).await.unwrap_err();
        assert_eq!(err.to_string(), "\"title\" is required");
    }

    #[tokio::test]
    async fn test_update_task_encodes_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/todo/a%2Fb")
            .with_status(200)
            .with_body(r#"{"id":"a/b","title":"Write report","status":"PENDING"}"#)
            .expect(1)
            .create_async()
            .await;
        let manager = manager(&server.url()).await;

        let task = update_task(&manager, "a/b", &payload()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(task.id, "a/b");
        assert_eq!(task.description, None);
    }

    #[tokio::test]
    async fn test_update_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/todo/7")
            .match_body(Matcher::Json(json!({"status": "COMPLETED"})))
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;
        let manager = manager(&server.url()).await;

        update_status(&manager, "7", TaskStatus::Completed).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_task() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/todo/7")
            .match_header("authorization", "Bearer A1")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;
        let manager = manager(&server.url()).await;

        delete_task(&manager, "7").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_missing_task() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", "/todo/404")
            .with_status(404)
            .with_body(r#"{"message":"Todo not found"}"#)
            .create_async()
            .await;
        let manager = manager(&server.url()).await;

        let err = delete_task(&manager, "404").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Todo not found");
    }
}

use super::TaskService;
use crate::error::AppError;
use crate::model::{Task, TaskDraft, TaskUpdate};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub struct HttpTaskService {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct CleanupBody {
    deleted_count: u64,
}

impl HttpTaskService {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::transport(err.to_string()))?;

        Ok(HttpTaskService {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tasks_url(&self) -> String {
        format!("{}/api/tasks", self.base_url)
    }

    fn task_url(&self, id: i64) -> String {
        format!("{}/api/tasks/{}", self.base_url, id)
    }

    fn checked(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The server reports failures as {"error": "..."}; fall back
        // to the status line when the body is something else.
        let message = response
            .json::<ErrorBody>()
            .map(|body| body.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(AppError::status(status.as_u16(), message))
    }

    fn task_from(response: Response) -> Result<Task, AppError> {
        Self::checked(response)?.json::<Task>().map_err(AppError::from)
    }
}

fn update_body(update: &TaskUpdate) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    if let Some(name) = update.name.as_deref() {
        body.insert("name".to_string(), name.into());
    }
    if let Some(priority) = update.priority {
        body.insert("priority".to_string(), priority.label().into());
    }
    if let Some(due_date) = update.due_date.as_ref() {
        let value = match due_date.as_deref() {
            Some(date) => date.into(),
            None => serde_json::Value::Null,
        };
        body.insert("due_date".to_string(), value);
    }
    serde_json::Value::Object(body)
}

impl TaskService for HttpTaskService {
    fn list(&self) -> Result<Vec<Task>, AppError> {
        debug!("GET {}", self.tasks_url());
        let response = self.client.get(self.tasks_url()).send()?;
        Self::checked(response)?
            .json::<Vec<Task>>()
            .map_err(AppError::from)
    }

    fn create(&self, draft: &TaskDraft) -> Result<Task, AppError> {
        debug!("POST {}", self.tasks_url());
        let response = self.client.post(self.tasks_url()).json(draft).send()?;
        Self::task_from(response)
    }

    fn toggle_done(&self, id: i64) -> Result<Task, AppError> {
        debug!("PATCH {}", self.task_url(id));
        let response = self.client.patch(self.task_url(id)).send()?;
        Self::task_from(response)
    }

    fn update(&self, id: i64, update: &TaskUpdate) -> Result<Task, AppError> {
        debug!("PUT {}", self.task_url(id));
        let response = self
            .client
            .put(self.task_url(id))
            .json(&update_body(update))
            .send()?;
        Self::task_from(response)
    }

    fn delete(&self, id: i64) -> Result<(), AppError> {
        debug!("DELETE {}", self.task_url(id));
        let response = self.client.delete(self.task_url(id)).send()?;
        Self::checked(response)?;
        Ok(())
    }

    fn clear_completed(&self) -> Result<u64, AppError> {
        let url = format!("{}/cleanup", self.tasks_url());
        debug!("DELETE {url}");
        let response = self.client.delete(url).send()?;
        Self::checked(response)?
            .json::<CleanupBody>()
            .map(|body| body.deleted_count)
            .map_err(AppError::from)
    }
}

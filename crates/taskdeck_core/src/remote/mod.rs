use crate::config::{self, Config};
use crate::error::AppError;
use crate::model::{Task, TaskDraft, TaskUpdate};

mod http;
pub use http::HttpTaskService;

/// The remote task-storage API. Every mutation returns the server's
/// authoritative copy of the affected task; the session applies local
/// changes only from these payloads.
pub trait TaskService {
    fn list(&self) -> Result<Vec<Task>, AppError>;
    fn create(&self, draft: &TaskDraft) -> Result<Task, AppError>;
    fn toggle_done(&self, id: i64) -> Result<Task, AppError>;
    fn update(&self, id: i64, update: &TaskUpdate) -> Result<Task, AppError>;
    fn delete(&self, id: i64) -> Result<(), AppError>;
    fn clear_completed(&self) -> Result<u64, AppError>;
}

pub fn service_from_config(config: &Config) -> Result<HttpTaskService, AppError> {
    HttpTaskService::new(&config::api_base_url(config), config.timeout_secs)
}

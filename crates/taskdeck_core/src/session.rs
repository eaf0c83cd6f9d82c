//! The task session: the in-memory task collection for one run of the
//! client, kept consistent with the remote service. Every mutation is
//! round-tripped; local state changes only from the server's response
//! payload. The client is synchronous, so remote calls are totally
//! ordered and overlapping writes to the same task cannot occur.

use crate::error::AppError;
use crate::model::{Task, TaskDraft, TaskUpdate};
use crate::remote::TaskService;
use crate::view::{self, Filter, TaskStats};
use tracing::warn;

/// At most one task is being renamed at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub task_id: i64,
    pub draft: String,
}

pub struct TaskSession<S: TaskService> {
    service: S,
    tasks: Vec<Task>,
    filter: Filter,
    search: String,
    edit: Option<EditSession>,
}

impl<S: TaskService> TaskSession<S> {
    pub fn new(service: S) -> Self {
        TaskSession {
            service,
            tasks: Vec::new(),
            filter: Filter::default(),
            search: String::new(),
            edit: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn set_search<T: Into<String>>(&mut self, term: T) {
        self.search = term.into();
    }

    /// Fetch the full collection and replace local state. On failure
    /// local state is untouched; there is no retry.
    pub fn load(&mut self) -> Result<(), AppError> {
        match self.service.list() {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(())
            }
            Err(err) => {
                warn!("failed to load tasks: {err}");
                Err(err)
            }
        }
    }

    /// Create a task from a draft. An empty or whitespace-only name is
    /// rejected before any request is issued.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<Task, AppError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("name is required"));
        }

        let draft = TaskDraft {
            name: name.to_string(),
            ..draft
        };
        match self.service.create(&draft) {
            Ok(task) => {
                self.tasks.push(task.clone());
                Ok(task)
            }
            Err(err) => {
                warn!("failed to add task: {err}");
                Err(err)
            }
        }
    }

    /// Toggle completion server-side. The request is issued even when
    /// `id` is not in local state; the local copy is replaced only if
    /// present.
    pub fn complete_task(&mut self, id: i64) -> Result<Task, AppError> {
        match self.service.toggle_done(id) {
            Ok(updated) => {
                self.replace_task(&updated);
                Ok(updated)
            }
            Err(err) => {
                warn!("failed to toggle task {id}: {err}");
                Err(err)
            }
        }
    }

    pub fn delete_task(&mut self, id: i64) -> Result<(), AppError> {
        match self.service.delete(id) {
            Ok(()) => {
                self.tasks.retain(|task| task.id != id);
                Ok(())
            }
            Err(err) => {
                warn!("failed to delete task {id}: {err}");
                Err(err)
            }
        }
    }

    /// Apply a partial update (priority, due date, name) and replace
    /// the local copy with the server's version.
    pub fn update_task(&mut self, id: i64, update: &TaskUpdate) -> Result<Task, AppError> {
        if update.is_empty() {
            return Err(AppError::invalid_input("nothing to update"));
        }

        match self.service.update(id, update) {
            Ok(updated) => {
                self.replace_task(&updated);
                Ok(updated)
            }
            Err(err) => {
                warn!("failed to update task {id}: {err}");
                Err(err)
            }
        }
    }

    /// Open an edit session seeded with the task's current name. Any
    /// prior unsaved draft is discarded.
    pub fn start_editing(&mut self, id: i64) -> Result<&EditSession, AppError> {
        let name = self
            .tasks
            .iter()
            .find(|task| task.id == id)
            .map(|task| task.name.clone())
            .ok_or_else(|| AppError::invalid_input("task not found"))?;

        Ok(self.edit.insert(EditSession {
            task_id: id,
            draft: name,
        }))
    }

    pub fn set_draft<T: Into<String>>(&mut self, text: T) -> Result<(), AppError> {
        match self.edit.as_mut() {
            Some(edit) => {
                edit.draft = text.into();
                Ok(())
            }
            None => Err(AppError::invalid_input("no edit in progress")),
        }
    }

    /// Save the open edit session. With no session, or an empty or
    /// whitespace-only draft, this returns `Ok(None)` without issuing
    /// a request and leaves everything unchanged. On a server failure
    /// the session stays open and the error propagates.
    pub fn save_edit(&mut self) -> Result<Option<Task>, AppError> {
        let (task_id, draft) = match self.edit.as_ref() {
            Some(edit) => (edit.task_id, edit.draft.trim().to_string()),
            None => return Ok(None),
        };
        if draft.is_empty() {
            return Ok(None);
        }

        match self.service.update(task_id, &TaskUpdate::rename(draft)) {
            Ok(updated) => {
                self.replace_task(&updated);
                self.edit = None;
                Ok(Some(updated))
            }
            Err(err) => {
                warn!("failed to save edit for task {task_id}: {err}");
                Err(err)
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Drop every completed task, server first, then locally. Returns
    /// the server's deleted count.
    pub fn clear_completed(&mut self) -> Result<u64, AppError> {
        match self.service.clear_completed() {
            Ok(deleted) => {
                self.tasks.retain(|task| !task.done);
                Ok(deleted)
            }
            Err(err) => {
                warn!("failed to clear completed tasks: {err}");
                Err(err)
            }
        }
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        view::derived_view(&self.tasks, self.filter, &self.search)
    }

    pub fn stats(&self) -> TaskStats {
        view::stats(&self.tasks)
    }

    fn replace_task(&mut self, updated: &Task) {
        if let Some(index) = self.tasks.iter().position(|task| task.id == updated.id) {
            self.tasks[index] = updated.clone();
        }
    }
}

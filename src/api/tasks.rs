//! Task operations on the mock remote source.

use super::{ApiResponse, ApiState};
use crate::error::{Error, Result};
use crate::types::{NewTask, Task, TaskPatch};
use chrono::Utc;
use std::sync::Arc;

pub struct TasksApi {
  state: Arc<ApiState>,
}

impl TasksApi {
  pub(crate) fn new(state: Arc<ApiState>) -> Self {
    Self { state }
  }

  fn require_project(&self, project_id: &str) -> Result<()> {
    let projects = self.state.projects.lock();
    if projects.iter().any(|p| p.id == project_id) {
      Ok(())
    } else {
      Err(Error::Validation(format!(
        "task references unknown project: {}",
        project_id
      )))
    }
  }

  pub async fn list(&self) -> Result<ApiResponse<Vec<Task>>> {
    self.state.delay().await;
    let tasks = self.state.tasks.lock();
    Ok(ApiResponse::ok(tasks.clone()))
  }

  pub async fn get(&self, id: &str) -> Result<ApiResponse<Task>> {
    self.state.delay().await;
    let tasks = self.state.tasks.lock();
    let task = tasks
      .iter()
      .find(|t| t.id == id)
      .cloned()
      .ok_or_else(|| Error::not_found("task", id))?;
    Ok(ApiResponse::ok(task))
  }

  pub async fn create(&self, new: NewTask) -> Result<ApiResponse<Task>> {
    self.state.delay().await;

    if new.title.trim().is_empty() {
      return Err(Error::Validation("task title must not be empty".to_string()));
    }
    self.require_project(&new.project_id)?;

    let now = Utc::now();
    let task = Task {
      id: self.state.next_id(),
      title: new.title,
      description: new.description,
      status: new.status,
      priority: new.priority,
      due_date: new.due_date,
      assignee_id: new.assignee_id,
      assignee: None,
      project_id: new.project_id,
      created_by: new.created_by,
      created_at: now,
      updated_at: now,
    };

    self.state.tasks.lock().push(task.clone());
    Ok(ApiResponse::ok(task))
  }

  pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<ApiResponse<Task>> {
    self.state.delay().await;

    if let Some(project_id) = &patch.project_id {
      self.require_project(project_id)?;
    }
    if let Some(title) = &patch.title {
      if title.trim().is_empty() {
        return Err(Error::Validation("task title must not be empty".to_string()));
      }
    }

    let mut tasks = self.state.tasks.lock();
    let task = tasks
      .iter_mut()
      .find(|t| t.id == id)
      .ok_or_else(|| Error::not_found("task", id))?;

    if let Some(title) = patch.title {
      task.title = title;
    }
    if let Some(description) = patch.description {
      task.description = description;
    }
    if let Some(status) = patch.status {
      task.status = status;
    }
    if let Some(priority) = patch.priority {
      task.priority = priority;
    }
    if let Some(due_date) = patch.due_date {
      task.due_date = Some(due_date);
    }
    if let Some(assignee_id) = patch.assignee_id {
      task.assignee_id = Some(assignee_id);
    }
    if let Some(project_id) = patch.project_id {
      task.project_id = project_id;
    }
    task.updated_at = Utc::now();

    Ok(ApiResponse::ok(task.clone()))
  }

  pub async fn delete(&self, id: &str) -> Result<ApiResponse<()>> {
    self.state.delay().await;

    let mut tasks = self.state.tasks.lock();
    let index = tasks
      .iter()
      .position(|t| t.id == id)
      .ok_or_else(|| Error::not_found("task", id))?;
    tasks.remove(index);

    Ok(ApiResponse::ok(()))
  }
}

//! Project operations on the mock remote source.

use super::{ApiResponse, ApiState};
use crate::error::{Error, Result};
use crate::pipeline;
use crate::types::{NewProject, Project, ProjectPatch, ProjectStats};
use chrono::Utc;
use std::sync::Arc;

pub struct ProjectsApi {
  state: Arc<ApiState>,
}

impl ProjectsApi {
  pub(crate) fn new(state: Arc<ApiState>) -> Self {
    Self { state }
  }

  pub async fn list(&self) -> Result<ApiResponse<Vec<Project>>> {
    self.state.delay().await;
    let projects = self.state.projects.lock();
    Ok(ApiResponse::ok(projects.clone()))
  }

  pub async fn get(&self, id: &str) -> Result<ApiResponse<Project>> {
    self.state.delay().await;
    let projects = self.state.projects.lock();
    let project = projects
      .iter()
      .find(|p| p.id == id)
      .cloned()
      .ok_or_else(|| Error::not_found("project", id))?;
    Ok(ApiResponse::ok(project))
  }

  pub async fn create(&self, new: NewProject) -> Result<ApiResponse<Project>> {
    self.state.delay().await;

    if new.title.trim().is_empty() {
      return Err(Error::Validation(
        "project title must not be empty".to_string(),
      ));
    }

    let now = Utc::now();
    let project = Project {
      id: self.state.next_id(),
      title: new.title,
      description: new.description,
      deadline: new.deadline,
      priority: new.priority,
      status: new.status,
      created_by: new.created_by,
      members: new.members,
      created_at: now,
      updated_at: now,
    };

    self.state.projects.lock().push(project.clone());
    Ok(ApiResponse::ok(project))
  }

  pub async fn update(&self, id: &str, patch: ProjectPatch) -> Result<ApiResponse<Project>> {
    self.state.delay().await;

    if let Some(title) = &patch.title {
      if title.trim().is_empty() {
        return Err(Error::Validation(
          "project title must not be empty".to_string(),
        ));
      }
    }

    let mut projects = self.state.projects.lock();
    let project = projects
      .iter_mut()
      .find(|p| p.id == id)
      .ok_or_else(|| Error::not_found("project", id))?;

    if let Some(title) = patch.title {
      project.title = title;
    }
    if let Some(description) = patch.description {
      project.description = description;
    }
    if let Some(deadline) = patch.deadline {
      project.deadline = Some(deadline);
    }
    if let Some(priority) = patch.priority {
      project.priority = priority;
    }
    if let Some(status) = patch.status {
      project.status = status;
    }
    if let Some(members) = patch.members {
      project.members = members;
    }
    project.updated_at = Utc::now();

    Ok(ApiResponse::ok(project.clone()))
  }

  pub async fn delete(&self, id: &str) -> Result<ApiResponse<()>> {
    self.state.delay().await;

    let mut projects = self.state.projects.lock();
    let index = projects
      .iter()
      .position(|p| p.id == id)
      .ok_or_else(|| Error::not_found("project", id))?;
    projects.remove(index);

    Ok(ApiResponse::ok(()))
  }

  /// Task breakdown for one project, derived from the live task set.
  pub async fn stats(&self, id: &str) -> Result<ApiResponse<ProjectStats>> {
    self.state.delay().await;

    {
      let projects = self.state.projects.lock();
      if !projects.iter().any(|p| p.id == id) {
        return Err(Error::not_found("project", id));
      }
    }

    let tasks = self.state.tasks.lock();
    Ok(ApiResponse::ok(pipeline::project_stats(&tasks, id)))
  }
}

//! Mock remote data source.
//!
//! Single source of truth for entity state: an in-memory seeded dataset
//! behind an async facade with artificial latency. Nothing else in the crate
//! originates entity data; the cache only caches what this module returns.

mod auth;
mod projects;
mod tasks;
mod users;

pub use auth::AuthApi;
pub use projects::ProjectsApi;
pub use tasks::TasksApi;
pub use users::UsersApi;

use crate::config::ApiConfig;
use crate::types::{Priority, Project, ProjectStatus, Role, Task, TaskStatus, User};
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Envelope every remote operation resolves with on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
  pub data: T,
  pub success: bool,
  pub message: Option<String>,
}

impl<T> ApiResponse<T> {
  fn ok(data: T) -> Self {
    Self {
      data,
      success: true,
      message: None,
    }
  }

  fn ok_with(data: T, message: &str) -> Self {
    Self {
      data,
      success: true,
      message: Some(message.to_string()),
    }
  }
}

/// Active session: an opaque token naming the signed-in user.
#[derive(Debug, Clone)]
pub(crate) struct Session {
  #[allow(dead_code)]
  pub token: String,
  pub user_id: String,
}

/// Shared mutable dataset behind the facade.
pub(crate) struct ApiState {
  pub tasks: Mutex<Vec<Task>>,
  pub projects: Mutex<Vec<Project>>,
  pub users: Mutex<Vec<User>>,
  /// email -> password, for login checks. Seeded admin plus registrations.
  pub passwords: Mutex<HashMap<String, String>>,
  pub session: Mutex<Option<Session>>,
  next_id: AtomicU64,
  latency: Duration,
}

impl ApiState {
  /// Simulated network round trip.
  pub async fn delay(&self) {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
  }

  /// Server-assigned entity id.
  pub fn next_id(&self) -> String {
    self.next_id.fetch_add(1, Ordering::Relaxed).to_string()
  }
}

/// Client handle to the mock remote source. Cheap to clone; handles share
/// one dataset.
#[derive(Clone)]
pub struct MockApi {
  state: Arc<ApiState>,
}

impl MockApi {
  /// Create a source seeded with the demo dataset.
  pub fn new(config: &ApiConfig) -> Self {
    Self {
      state: Arc::new(seed_state(config.latency())),
    }
  }

  pub fn tasks(&self) -> TasksApi {
    TasksApi::new(Arc::clone(&self.state))
  }

  pub fn projects(&self) -> ProjectsApi {
    ProjectsApi::new(Arc::clone(&self.state))
  }

  pub fn users(&self) -> UsersApi {
    UsersApi::new(Arc::clone(&self.state))
  }

  pub fn auth(&self) -> AuthApi {
    AuthApi::new(Arc::clone(&self.state))
  }
}

/// Build the seeded demo dataset: one admin, three active projects, four
/// tasks spread over the first two.
fn seed_state(latency: Duration) -> ApiState {
  let now = Utc::now();

  let admin = User {
    id: "1".to_string(),
    email: "admin@example.com".to_string(),
    name: "John Doe".to_string(),
    avatar: None,
    role: Role::Admin,
    created_at: now,
    updated_at: now,
  };

  let project = |id: &str, title: &str, description: &str, deadline_days: i64, priority| Project {
    id: id.to_string(),
    title: title.to_string(),
    description: description.to_string(),
    deadline: Some(now + ChronoDuration::days(deadline_days)),
    priority,
    status: ProjectStatus::Active,
    created_by: "1".to_string(),
    members: vec!["1".to_string()],
    created_at: now,
    updated_at: now,
  };

  let projects = vec![
    project(
      "1",
      "Task Manager App",
      "Build a comprehensive task management application",
      30,
      Priority::High,
    ),
    project(
      "2",
      "API Development",
      "Develop RESTful API endpoints for the task management system",
      21,
      Priority::Medium,
    ),
    project(
      "3",
      "Mobile App",
      "Create the mobile version of the task manager",
      60,
      Priority::Low,
    ),
  ];

  let task = |id: &str,
              title: &str,
              description: &str,
              status,
              priority,
              due_days: Option<i64>,
              project_id: &str| Task {
    id: id.to_string(),
    title: title.to_string(),
    description: description.to_string(),
    status,
    priority,
    due_date: due_days.map(|d| now + ChronoDuration::days(d)),
    assignee_id: Some("1".to_string()),
    assignee: None,
    project_id: project_id.to_string(),
    created_by: "1".to_string(),
    created_at: now,
    updated_at: now,
  };

  let tasks = vec![
    task(
      "1",
      "Design user interface",
      "Create mockups and wireframes for the new dashboard",
      TaskStatus::InProgress,
      Priority::High,
      Some(3),
      "1",
    ),
    task(
      "2",
      "Implement authentication",
      "Set up JWT-based authentication system",
      TaskStatus::Todo,
      Priority::Urgent,
      Some(1),
      "1",
    ),
    task(
      "3",
      "Write unit tests",
      "Create comprehensive test suite for the API endpoints",
      TaskStatus::Todo,
      Priority::Medium,
      Some(7),
      "2",
    ),
    task(
      "4",
      "Database migration",
      "Update database schema to support new features",
      TaskStatus::Done,
      Priority::Low,
      None,
      "2",
    ),
  ];

  let mut passwords = HashMap::new();
  passwords.insert("admin@example.com".to_string(), "password".to_string());

  ApiState {
    tasks: Mutex::new(tasks),
    projects: Mutex::new(projects),
    users: Mutex::new(vec![admin]),
    passwords: Mutex::new(passwords),
    session: Mutex::new(None),
    // Seed ids stop at 4; server-assigned ids start well clear of them.
    next_id: AtomicU64::new(100),
    latency,
  }
}

#[cfg(test)]
pub(crate) fn test_api() -> MockApi {
  MockApi::new(&ApiConfig { latency_ms: 0 })
}

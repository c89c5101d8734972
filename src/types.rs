//! Domain types for the task/project tracker.
//!
//! Field names serialize in camelCase to match the shape the remote source
//! speaks; enums use their lowercase (or kebab-case) wire forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Enums
// ============================================================================

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  User,
}

/// Shared priority scale for tasks and projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  Low,
  Medium,
  High,
  Urgent,
}

impl Priority {
  /// Fixed rank used for sorting: low=1 .. urgent=4. Not lexical.
  pub fn rank(self) -> u8 {
    match self {
      Priority::Low => 1,
      Priority::Medium => 2,
      Priority::High => 3,
      Priority::Urgent => 4,
    }
  }
}

/// Task workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
  Todo,
  InProgress,
  Done,
}

impl TaskStatus {
  /// Fixed rank used for sorting: todo=1, in-progress=2, done=3.
  pub fn rank(self) -> u8 {
    match self {
      TaskStatus::Todo => 1,
      TaskStatus::InProgress => 2,
      TaskStatus::Done => 3,
    }
  }
}

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
  Active,
  Completed,
  Archived,
}

/// UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  Light,
  Dark,
  #[default]
  System,
}

/// Task list sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
  Priority,
  DueDate,
  Status,
  Title,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  Desc,
}

// ============================================================================
// Entities
// ============================================================================

/// An account. Identity (`id`) is immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: String,
  pub email: String,
  pub name: String,
  pub avatar: Option<String>,
  pub role: Role,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A project grouping tasks. `members` is a set of user ids, order irrelevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub id: String,
  pub title: String,
  pub description: String,
  pub deadline: Option<DateTime<Utc>>,
  pub priority: Priority,
  pub status: ProjectStatus,
  pub created_by: String,
  pub members: Vec<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A task. Every task belongs to exactly one project.
///
/// `assignee` is a resolved snapshot filled in by presentation-side joins;
/// the remote source only ever populates `assignee_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub id: String,
  pub title: String,
  pub description: String,
  pub status: TaskStatus,
  pub priority: Priority,
  pub due_date: Option<DateTime<Utc>>,
  pub assignee_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assignee: Option<User>,
  pub project_id: String,
  pub created_by: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Create payloads and merge patches
// ============================================================================

/// Payload for creating a task. The remote source assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
  pub title: String,
  pub description: String,
  pub status: TaskStatus,
  pub priority: Priority,
  pub due_date: Option<DateTime<Utc>>,
  pub assignee_id: Option<String>,
  pub project_id: String,
  pub created_by: String,
}

/// Merge patch for a task. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub status: Option<TaskStatus>,
  pub priority: Option<Priority>,
  pub due_date: Option<DateTime<Utc>>,
  pub assignee_id: Option<String>,
  pub project_id: Option<String>,
}

/// Payload for creating a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
  pub title: String,
  pub description: String,
  pub deadline: Option<DateTime<Utc>>,
  pub priority: Priority,
  pub status: ProjectStatus,
  pub created_by: String,
  pub members: Vec<String>,
}

/// Merge patch for a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub deadline: Option<DateTime<Utc>>,
  pub priority: Option<Priority>,
  pub status: Option<ProjectStatus>,
  pub members: Option<Vec<String>>,
}

/// Payload for creating a user (team management).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
  pub email: String,
  pub name: String,
  pub avatar: Option<String>,
  pub role: Role,
}

/// Merge patch for a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
  pub email: Option<String>,
  pub name: Option<String>,
  pub avatar: Option<String>,
  pub role: Option<Role>,
}

// ============================================================================
// Filters and derived data
// ============================================================================

/// Inclusive due-date window for filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DueDateRange {
  pub from: Option<DateTime<Utc>>,
  pub to: Option<DateTime<Utc>>,
}

impl DueDateRange {
  /// True when at least one bound is set.
  pub fn is_bounded(&self) -> bool {
    self.from.is_some() || self.to.is_some()
  }
}

/// Transient predicate bundle for task list views. Unset fields impose
/// no constraint; set fields are combined conjunctively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
  pub status: Option<TaskStatus>,
  pub priority: Option<Priority>,
  pub assignee: Option<String>,
  pub project: Option<String>,
  pub search: Option<String>,
  pub due_date: Option<DueDateRange>,
}

/// Task count per priority level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityDistribution {
  pub urgent: usize,
  pub high: usize,
  pub medium: usize,
  pub low: usize,
}

/// Aggregate statistics over a task collection and its projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
  pub total_tasks: usize,
  pub completed_tasks: usize,
  pub in_progress_tasks: usize,
  pub todo_tasks: usize,
  /// 0–100; 0 for an empty task list (never NaN).
  pub completion_rate: f64,
  pub priority_distribution: PriorityDistribution,
  pub active_projects: usize,
}

/// Per-project task breakdown served by the remote source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
  pub total_tasks: usize,
  pub completed_tasks: usize,
  pub in_progress_tasks: usize,
  pub todo_tasks: usize,
  /// 0–100; 0 for a project with no tasks.
  pub completion_percentage: f64,
}

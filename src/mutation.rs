//! Mutation coordinator: applies create/update/delete against the remote
//! source and keeps the cache consistent.
//!
//! Ordering is strict: the remote call completes before any invalidation is
//! issued, so a failed call never clears cached data. List prefixes are
//! invalidated on every successful mutation; update and delete additionally
//! invalidate the entity's detail keys. No retries: a failure surfaces once
//! and retry policy belongs to the caller.

use crate::api::MockApi;
use crate::cache::{KeyPrefix, QueryCache};
use crate::error::Result;
use crate::types::{
  NewProject, NewTask, NewUser, Project, ProjectPatch, Task, TaskPatch, User, UserPatch,
};
use tracing::debug;

#[derive(Clone)]
pub struct MutationCoordinator {
  api: MockApi,
  cache: QueryCache,
}

impl MutationCoordinator {
  pub fn new(api: MockApi, cache: QueryCache) -> Self {
    Self { api, cache }
  }

  fn invalidate(&self, prefixes: &[KeyPrefix]) {
    for prefix in prefixes {
      debug!(?prefix, "invalidating after mutation");
      self.cache.invalidate(prefix);
    }
  }

  // Tasks

  pub async fn create_task(&self, new: NewTask) -> Result<Task> {
    let task = self.api.tasks().create(new).await?.data;
    self.invalidate(&[KeyPrefix::TaskLists]);
    Ok(task)
  }

  pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task> {
    let task = self.api.tasks().update(id, patch).await?.data;
    self.invalidate(&[KeyPrefix::TaskLists, KeyPrefix::TaskDetail(id.to_string())]);
    Ok(task)
  }

  pub async fn delete_task(&self, id: &str) -> Result<()> {
    self.api.tasks().delete(id).await?;
    self.invalidate(&[KeyPrefix::TaskLists, KeyPrefix::TaskDetail(id.to_string())]);
    Ok(())
  }

  // Projects

  pub async fn create_project(&self, new: NewProject) -> Result<Project> {
    let project = self.api.projects().create(new).await?.data;
    self.invalidate(&[KeyPrefix::ProjectLists]);
    Ok(project)
  }

  pub async fn update_project(&self, id: &str, patch: ProjectPatch) -> Result<Project> {
    let project = self.api.projects().update(id, patch).await?.data;
    self.invalidate(&[
      KeyPrefix::ProjectLists,
      KeyPrefix::ProjectDetail(id.to_string()),
    ]);
    Ok(project)
  }

  pub async fn delete_project(&self, id: &str) -> Result<()> {
    self.api.projects().delete(id).await?;
    self.invalidate(&[
      KeyPrefix::ProjectLists,
      KeyPrefix::ProjectDetail(id.to_string()),
    ]);
    Ok(())
  }

  // Users

  pub async fn create_user(&self, new: NewUser) -> Result<User> {
    let user = self.api.users().create(new).await?.data;
    self.invalidate(&[KeyPrefix::UserLists]);
    Ok(user)
  }

  pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User> {
    let user = self.api.users().update(id, patch).await?.data;
    self.invalidate(&[KeyPrefix::UserLists, KeyPrefix::UserDetail(id.to_string())]);
    Ok(user)
  }

  pub async fn delete_user(&self, id: &str) -> Result<()> {
    self.api.users().delete(id).await?;
    self.invalidate(&[KeyPrefix::UserLists, KeyPrefix::UserDetail(id.to_string())]);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::test_api;
  use crate::cache::QueryKey;
  use crate::error::Error;
  use crate::types::{Priority, TaskStatus};
  use std::sync::Arc;
  use std::time::Duration;

  fn coordinator() -> (MockApi, QueryCache, MutationCoordinator) {
    let api = test_api();
    let cache = QueryCache::new();
    let coordinator = MutationCoordinator::new(api.clone(), cache.clone());
    (api, cache, coordinator)
  }

  async fn prime_task_list(api: &MockApi, cache: &QueryCache) -> Arc<Vec<Task>> {
    let api = api.clone();
    cache
      .read(QueryKey::TaskList, Duration::from_secs(60), move || async move {
        Ok(api.tasks().list().await?.data)
      })
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn successful_create_invalidates_the_list() {
    let (api, cache, coordinator) = coordinator();
    let before = prime_task_list(&api, &cache).await;
    assert_eq!(before.len(), 4);

    coordinator
      .create_task(NewTask {
        title: "New work".to_string(),
        description: String::new(),
        status: TaskStatus::Todo,
        priority: Priority::Low,
        due_date: None,
        assignee_id: None,
        project_id: "1".to_string(),
        created_by: "1".to_string(),
      })
      .await
      .unwrap();

    // The list entry was invalidated, so the next read refetches.
    assert!(cache.peek::<Vec<Task>>(&QueryKey::TaskList).is_none());
    let after = prime_task_list(&api, &cache).await;
    assert_eq!(after.len(), 5);
  }

  #[tokio::test]
  async fn update_invalidates_list_and_detail() {
    let (api, cache, coordinator) = coordinator();
    prime_task_list(&api, &cache).await;

    let detail_api = api.clone();
    cache
      .read(
        QueryKey::TaskDetail("1".to_string()),
        Duration::from_secs(60),
        move || async move { Ok(detail_api.tasks().get("1").await?.data) },
      )
      .await
      .unwrap();

    coordinator
      .update_task(
        "1",
        TaskPatch {
          status: Some(TaskStatus::Done),
          ..TaskPatch::default()
        },
      )
      .await
      .unwrap();

    assert!(cache.peek::<Vec<Task>>(&QueryKey::TaskList).is_none());
    assert!(cache
      .peek::<Task>(&QueryKey::TaskDetail("1".to_string()))
      .is_none());
  }

  #[tokio::test]
  async fn failed_mutation_leaves_the_cache_untouched() {
    let (api, cache, coordinator) = coordinator();
    let before = prime_task_list(&api, &cache).await;

    let err = coordinator
      .update_task("999", TaskPatch::default())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));

    // No invalidation happened: the cached list is still served as-is.
    let peeked = cache.peek::<Vec<Task>>(&QueryKey::TaskList).unwrap();
    assert_eq!(*peeked, *before);
  }

  #[tokio::test]
  async fn project_mutations_cover_the_stats_key() {
    let (api, cache, coordinator) = coordinator();

    let stats_api = api.clone();
    cache
      .read(
        QueryKey::ProjectStats("1".to_string()),
        Duration::from_secs(60),
        move || async move { Ok(stats_api.projects().stats("1").await?.data) },
      )
      .await
      .unwrap();

    coordinator
      .update_project(
        "1",
        ProjectPatch {
          title: Some("Renamed".to_string()),
          ..ProjectPatch::default()
        },
      )
      .await
      .unwrap();

    assert!(cache
      .peek::<crate::types::ProjectStats>(&QueryKey::ProjectStats("1".to_string()))
      .is_none());
  }
}

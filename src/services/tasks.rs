use crate::api::MockApi;
use crate::cache::{QueryCache, QueryKey};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::mutation::MutationCoordinator;
use crate::pipeline;
use crate::types::{NewTask, SortBy, SortOrder, Task, TaskFilter, TaskPatch, TaskStatus};
use crate::worker::OffloadScheduler;
use std::sync::Arc;

/// Reads go through the cache, writes through the coordinator, and the
/// derived-state views prefer the offload scheduler with the inline pipeline
/// as fallback.
#[derive(Clone)]
pub struct TaskService {
  api: MockApi,
  cache: QueryCache,
  coordinator: Arc<MutationCoordinator>,
  scheduler: Arc<OffloadScheduler>,
  config: CacheConfig,
}

impl TaskService {
  pub fn new(
    api: MockApi,
    cache: QueryCache,
    coordinator: Arc<MutationCoordinator>,
    scheduler: Arc<OffloadScheduler>,
    config: CacheConfig,
  ) -> Self {
    Self {
      api,
      cache,
      coordinator,
      scheduler,
      config,
    }
  }

  pub async fn list(&self) -> Result<Arc<Vec<Task>>> {
    let api = self.api.tasks();
    self
      .cache
      .read(QueryKey::TaskList, self.config.tasks_stale(), move || {
        async move { Ok(api.list().await?.data) }
      })
      .await
  }

  pub async fn get(&self, id: &str) -> Result<Arc<Task>> {
    let api = self.api.tasks();
    let id = id.to_string();
    self
      .cache
      .read(
        QueryKey::TaskDetail(id.clone()),
        self.config.tasks_stale(),
        move || async move { Ok(api.get(&id).await?.data) },
      )
      .await
  }

  pub async fn create(&self, new: NewTask) -> Result<Task> {
    self.coordinator.create_task(new).await
  }

  pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task> {
    self.coordinator.update_task(id, patch).await
  }

  pub async fn delete(&self, id: &str) -> Result<()> {
    self.coordinator.delete_task(id).await
  }

  /// The cached task list narrowed by `filter`.
  pub async fn filtered(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
    let tasks = self.list().await?;
    match self
      .scheduler
      .filter_tasks((*tasks).clone(), filter.clone())
      .await?
    {
      Some(filtered) => Ok(filtered),
      None => Ok(pipeline::filter_tasks(&tasks, filter)),
    }
  }

  /// The cached task list in `sort_by`/`order` order.
  pub async fn sorted(&self, sort_by: SortBy, order: SortOrder) -> Result<Vec<Task>> {
    let tasks = self.list().await?;
    match self
      .scheduler
      .sort_tasks((*tasks).clone(), sort_by, order)
      .await?
    {
      Some(sorted) => Ok(sorted),
      None => Ok(pipeline::sort_tasks(&tasks, sort_by, order)),
    }
  }

  pub async fn by_project(&self, project_id: &str) -> Result<Vec<Task>> {
    self
      .filtered(&TaskFilter {
        project: Some(project_id.to_string()),
        ..TaskFilter::default()
      })
      .await
  }

  pub async fn by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
    self
      .filtered(&TaskFilter {
        status: Some(status),
        ..TaskFilter::default()
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::test_api;
  use crate::types::TaskPatch;

  fn service(scheduler: OffloadScheduler) -> TaskService {
    let api = test_api();
    let cache = QueryCache::new();
    let coordinator = Arc::new(MutationCoordinator::new(api.clone(), cache.clone()));
    TaskService::new(
      api,
      cache,
      coordinator,
      Arc::new(scheduler),
      CacheConfig::default(),
    )
  }

  #[tokio::test]
  async fn filtered_falls_back_inline_when_the_worker_is_unavailable() {
    let service = service(OffloadScheduler::disabled());
    let tasks = service.list().await.unwrap();

    let filter = TaskFilter {
      status: Some(TaskStatus::Done),
      ..TaskFilter::default()
    };
    let filtered = service.filtered(&filter).await.unwrap();
    assert_eq!(filtered, pipeline::filter_tasks(&tasks, &filter));
    assert!(filtered.iter().all(|t| t.status == TaskStatus::Done));
  }

  #[tokio::test]
  async fn sorted_uses_the_worker_when_available() {
    let service = service(OffloadScheduler::spawn());
    let tasks = service.list().await.unwrap();

    let sorted = service.sorted(SortBy::Title, SortOrder::Asc).await.unwrap();
    assert_eq!(sorted, pipeline::sort_tasks(&tasks, SortBy::Title, SortOrder::Asc));
  }

  #[tokio::test]
  async fn by_project_narrows_to_one_project() {
    let service = service(OffloadScheduler::disabled());
    let in_project = service.by_project("1").await.unwrap();
    assert!(!in_project.is_empty());
    assert!(in_project.iter().all(|t| t.project_id == "1"));
  }

  #[tokio::test]
  async fn updates_are_visible_on_the_next_read() {
    let service = service(OffloadScheduler::disabled());
    let first = service.get("1").await.unwrap();
    assert_ne!(first.status, TaskStatus::Done);

    service
      .update(
        "1",
        TaskPatch {
          status: Some(TaskStatus::Done),
          ..TaskPatch::default()
        },
      )
      .await
      .unwrap();

    let updated = service.get("1").await.unwrap();
    assert_eq!(updated.status, TaskStatus::Done);
  }
}

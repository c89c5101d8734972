use crate::api::MockApi;
use crate::cache::{QueryCache, QueryKey};
use crate::client_store::ClientStore;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::mutation::MutationCoordinator;
use crate::types::{NewProject, Project, ProjectPatch, ProjectStats};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProjectService {
  api: MockApi,
  cache: QueryCache,
  coordinator: Arc<MutationCoordinator>,
  store: Arc<ClientStore>,
  config: CacheConfig,
}

impl ProjectService {
  pub fn new(
    api: MockApi,
    cache: QueryCache,
    coordinator: Arc<MutationCoordinator>,
    store: Arc<ClientStore>,
    config: CacheConfig,
  ) -> Self {
    Self {
      api,
      cache,
      coordinator,
      store,
      config,
    }
  }

  pub async fn list(&self) -> Result<Arc<Vec<Project>>> {
    let api = self.api.projects();
    self
      .cache
      .read(
        QueryKey::ProjectList,
        self.config.projects_stale(),
        move || async move { Ok(api.list().await?.data) },
      )
      .await
  }

  pub async fn get(&self, id: &str) -> Result<Arc<Project>> {
    let api = self.api.projects();
    let id = id.to_string();
    self
      .cache
      .read(
        QueryKey::ProjectDetail(id.clone()),
        self.config.projects_stale(),
        move || async move { Ok(api.get(&id).await?.data) },
      )
      .await
  }

  /// Per-project rollup, cached on the shorter stats window since it is
  /// derived from task data.
  pub async fn stats(&self, id: &str) -> Result<Arc<ProjectStats>> {
    let api = self.api.projects();
    let id = id.to_string();
    self
      .cache
      .read(
        QueryKey::ProjectStats(id.clone()),
        self.config.stats_stale(),
        move || async move { Ok(api.stats(&id).await?.data) },
      )
      .await
  }

  pub async fn create(&self, new: NewProject) -> Result<Project> {
    self.coordinator.create_project(new).await
  }

  pub async fn update(&self, id: &str, patch: ProjectPatch) -> Result<Project> {
    self.coordinator.update_project(id, patch).await
  }

  pub async fn delete(&self, id: &str) -> Result<()> {
    self.coordinator.delete_project(id).await
  }

  /// The project the client is focused on, if any.
  pub fn current(&self) -> Option<Project> {
    self.store.get().current_project
  }

  pub fn set_current(&self, project: Option<Project>) -> Result<()> {
    self.store.set_current_project(project)
  }
}

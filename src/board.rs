//! Composition root. `TaskBoard` wires one remote source, one query cache,
//! one client store, one mutation coordinator and one pipeline worker into
//! the per-resource services.

use crate::api::MockApi;
use crate::cache::QueryCache;
use crate::client_store::{ClientStore, JsonFileStorage, MemoryStorage, PreferenceStorage};
use crate::config::Config;
use crate::error::Result;
use crate::mutation::MutationCoordinator;
use crate::pipeline;
use crate::services::{AuthService, ProjectService, TaskService, UserService};
use crate::types::{Task, TaskFilter, TaskStats};
use crate::worker::OffloadScheduler;
use std::sync::Arc;

pub struct TaskBoard {
  tasks: TaskService,
  projects: ProjectService,
  users: UserService,
  auth: AuthService,
  store: Arc<ClientStore>,
  cache: QueryCache,
  scheduler: Arc<OffloadScheduler>,
}

impl TaskBoard {
  /// Build the full stack from `config`, hydrating client preferences from
  /// disk and spawning the pipeline worker thread.
  pub fn new(config: Config) -> Result<Self> {
    let storage: Box<dyn PreferenceStorage> = match config.preferences_path() {
      Some(path) => Box::new(JsonFileStorage::new(path)),
      None => Box::new(MemoryStorage::default()),
    };
    Self::with_storage(config, storage)
  }

  /// Like [`TaskBoard::new`], with caller-supplied preference storage.
  pub fn with_storage(config: Config, storage: Box<dyn PreferenceStorage>) -> Result<Self> {
    let api = MockApi::new(&config.api);
    let cache = QueryCache::new();
    let store = Arc::new(ClientStore::new(storage)?);
    let coordinator = Arc::new(MutationCoordinator::new(api.clone(), cache.clone()));
    let scheduler = Arc::new(OffloadScheduler::spawn());

    Ok(Self {
      tasks: TaskService::new(
        api.clone(),
        cache.clone(),
        coordinator.clone(),
        scheduler.clone(),
        config.cache.clone(),
      ),
      projects: ProjectService::new(
        api.clone(),
        cache.clone(),
        coordinator.clone(),
        store.clone(),
        config.cache.clone(),
      ),
      users: UserService::new(
        api.clone(),
        cache.clone(),
        coordinator,
        config.cache.clone(),
      ),
      auth: AuthService::new(api, cache.clone(), store.clone(), config.cache),
      store,
      cache,
      scheduler,
    })
  }

  pub fn tasks(&self) -> &TaskService {
    &self.tasks
  }

  pub fn projects(&self) -> &ProjectService {
    &self.projects
  }

  pub fn users(&self) -> &UserService {
    &self.users
  }

  pub fn auth(&self) -> &AuthService {
    &self.auth
  }

  pub fn store(&self) -> &ClientStore {
    &self.store
  }

  pub fn cache(&self) -> &QueryCache {
    &self.cache
  }

  /// Rollup over every task and project, computed off the async runtime when
  /// the worker is available and inline otherwise.
  pub async fn dashboard_stats(&self) -> Result<TaskStats> {
    let tasks = self.tasks.list().await?;
    self.stats_over((*tasks).clone()).await
  }

  /// Rollup over the tasks matching `filter` only.
  pub async fn stats_for(&self, filter: &TaskFilter) -> Result<TaskStats> {
    let tasks = self.tasks.filtered(filter).await?;
    self.stats_over(tasks).await
  }

  async fn stats_over(&self, tasks: Vec<Task>) -> Result<TaskStats> {
    let projects = self.projects.list().await?;
    match self
      .scheduler
      .calculate_stats(tasks.clone(), (*projects).clone())
      .await?
    {
      Some(stats) => Ok(stats),
      None => Ok(pipeline::calculate_stats(&tasks, &projects)),
    }
  }
}

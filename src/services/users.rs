use crate::api::MockApi;
use crate::cache::{QueryCache, QueryKey};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::mutation::MutationCoordinator;
use crate::types::{NewUser, User, UserPatch};
use std::sync::Arc;

#[derive(Clone)]
pub struct UserService {
  api: MockApi,
  cache: QueryCache,
  coordinator: Arc<MutationCoordinator>,
  config: CacheConfig,
}

impl UserService {
  pub fn new(
    api: MockApi,
    cache: QueryCache,
    coordinator: Arc<MutationCoordinator>,
    config: CacheConfig,
  ) -> Self {
    Self {
      api,
      cache,
      coordinator,
      config,
    }
  }

  pub async fn list(&self) -> Result<Arc<Vec<User>>> {
    let api = self.api.users();
    self
      .cache
      .read(QueryKey::UserList, self.config.users_stale(), move || {
        async move { Ok(api.list().await?.data) }
      })
      .await
  }

  pub async fn get(&self, id: &str) -> Result<Arc<User>> {
    let api = self.api.users();
    let id = id.to_string();
    self
      .cache
      .read(
        QueryKey::UserDetail(id.clone()),
        self.config.users_stale(),
        move || async move { Ok(api.get(&id).await?.data) },
      )
      .await
  }

  pub async fn create(&self, new: NewUser) -> Result<User> {
    self.coordinator.create_user(new).await
  }

  pub async fn update(&self, id: &str, patch: UserPatch) -> Result<User> {
    self.coordinator.update_user(id, patch).await
  }

  pub async fn delete(&self, id: &str) -> Result<()> {
    self.coordinator.delete_user(id).await
  }
}

use crate::api::MockApi;
use crate::cache::{KeyPrefix, QueryCache, QueryKey};
use crate::client_store::ClientStore;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::types::User;
use std::sync::Arc;
use tracing::info;

/// Session lifecycle. Sign-in records the user in the client store and
/// invalidates the cached identity; sign-out completes the remote call first,
/// then drops local state and empties the whole cache.
#[derive(Clone)]
pub struct AuthService {
  api: MockApi,
  cache: QueryCache,
  store: Arc<ClientStore>,
  config: CacheConfig,
}

impl AuthService {
  pub fn new(api: MockApi, cache: QueryCache, store: Arc<ClientStore>, config: CacheConfig) -> Self {
    Self {
      api,
      cache,
      store,
      config,
    }
  }

  pub async fn login(&self, email: &str, password: &str) -> Result<User> {
    let user = self.api.auth().login(email, password).await?.data;
    info!(user = %user.email, "logged in");
    self.store.set_auth(user.clone())?;
    self.cache.invalidate(&KeyPrefix::Auth);
    Ok(user)
  }

  pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User> {
    let user = self.api.auth().register(email, password, name).await?.data;
    info!(user = %user.email, "registered");
    self.store.set_auth(user.clone())?;
    self.cache.invalidate(&KeyPrefix::Auth);
    Ok(user)
  }

  /// Remote logout, then local teardown. Nothing cached before the session
  /// ended may be served afterwards.
  pub async fn logout(&self) -> Result<()> {
    self.api.auth().logout().await?;
    self.store.clear_auth()?;
    self.cache.clear();
    info!("logged out");
    Ok(())
  }

  /// The authenticated user, cached on the auth window.
  pub async fn me(&self) -> Result<Arc<User>> {
    let api = self.api.auth();
    self
      .cache
      .read(QueryKey::CurrentUser, self.config.auth_stale(), move || {
        async move { Ok(api.me().await?.data) }
      })
      .await
  }

  pub fn is_authenticated(&self) -> bool {
    self.store.get().is_authenticated
  }
}

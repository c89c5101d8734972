//! User operations on the mock remote source (team management data).

use super::{ApiResponse, ApiState};
use crate::error::{Error, Result};
use crate::types::{NewUser, User, UserPatch};
use chrono::Utc;
use std::sync::Arc;

pub struct UsersApi {
  state: Arc<ApiState>,
}

impl UsersApi {
  pub(crate) fn new(state: Arc<ApiState>) -> Self {
    Self { state }
  }

  pub async fn list(&self) -> Result<ApiResponse<Vec<User>>> {
    self.state.delay().await;
    let users = self.state.users.lock();
    Ok(ApiResponse::ok(users.clone()))
  }

  pub async fn get(&self, id: &str) -> Result<ApiResponse<User>> {
    self.state.delay().await;
    let users = self.state.users.lock();
    let user = users
      .iter()
      .find(|u| u.id == id)
      .cloned()
      .ok_or_else(|| Error::not_found("user", id))?;
    Ok(ApiResponse::ok(user))
  }

  pub async fn create(&self, new: NewUser) -> Result<ApiResponse<User>> {
    self.state.delay().await;

    let mut users = self.state.users.lock();
    if users.iter().any(|u| u.email == new.email) {
      return Err(Error::Validation(format!(
        "email already registered: {}",
        new.email
      )));
    }

    let now = Utc::now();
    let user = User {
      id: self.state.next_id(),
      email: new.email,
      name: new.name,
      avatar: new.avatar,
      role: new.role,
      created_at: now,
      updated_at: now,
    };
    users.push(user.clone());

    Ok(ApiResponse::ok(user))
  }

  pub async fn update(&self, id: &str, patch: UserPatch) -> Result<ApiResponse<User>> {
    self.state.delay().await;

    let mut users = self.state.users.lock();
    if let Some(email) = &patch.email {
      if users.iter().any(|u| u.email == *email && u.id != id) {
        return Err(Error::Validation(format!(
          "email already registered: {}",
          email
        )));
      }
    }

    let user = users
      .iter_mut()
      .find(|u| u.id == id)
      .ok_or_else(|| Error::not_found("user", id))?;

    if let Some(email) = patch.email {
      user.email = email;
    }
    if let Some(name) = patch.name {
      user.name = name;
    }
    if let Some(avatar) = patch.avatar {
      user.avatar = Some(avatar);
    }
    if let Some(role) = patch.role {
      user.role = role;
    }
    user.updated_at = Utc::now();

    Ok(ApiResponse::ok(user.clone()))
  }

  pub async fn delete(&self, id: &str) -> Result<ApiResponse<()>> {
    self.state.delay().await;

    let mut users = self.state.users.lock();
    let index = users
      .iter()
      .position(|u| u.id == id)
      .ok_or_else(|| Error::not_found("user", id))?;
    users.remove(index);

    Ok(ApiResponse::ok(()))
  }
}

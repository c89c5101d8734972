//! Session operations on the mock remote source.
//!
//! The session is a single in-memory token; there is no multi-session or
//! expiry model, mirroring the one-tab scope of the data layer.

use super::{ApiResponse, ApiState, Session};
use crate::error::{Error, Result};
use crate::types::{Role, User};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(1);

fn mint_token() -> String {
  format!("mock-jwt-token-{}", TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed))
}

pub struct AuthApi {
  state: Arc<ApiState>,
}

impl AuthApi {
  pub(crate) fn new(state: Arc<ApiState>) -> Self {
    Self { state }
  }

  /// Authenticate and open a session.
  pub async fn login(&self, email: &str, password: &str) -> Result<ApiResponse<User>> {
    self.state.delay().await;

    let known = {
      let passwords = self.state.passwords.lock();
      passwords.get(email).map(|p| p == password)
    };
    if known != Some(true) {
      return Err(Error::InvalidCredentials);
    }

    let user = {
      let users = self.state.users.lock();
      users
        .iter()
        .find(|u| u.email == email)
        .cloned()
        .ok_or(Error::InvalidCredentials)?
    };

    *self.state.session.lock() = Some(Session {
      token: mint_token(),
      user_id: user.id.clone(),
    });

    Ok(ApiResponse::ok_with(user, "Login successful"))
  }

  /// Create an account with the `user` role and open a session for it.
  pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<ApiResponse<User>> {
    self.state.delay().await;

    let now = Utc::now();
    let user = {
      let mut users = self.state.users.lock();
      if users.iter().any(|u| u.email == email) {
        return Err(Error::Validation(format!("email already registered: {}", email)));
      }
      let user = User {
        id: self.state.next_id(),
        email: email.to_string(),
        name: name.to_string(),
        avatar: None,
        role: Role::User,
        created_at: now,
        updated_at: now,
      };
      users.push(user.clone());
      user
    };

    self
      .state
      .passwords
      .lock()
      .insert(email.to_string(), password.to_string());

    *self.state.session.lock() = Some(Session {
      token: mint_token(),
      user_id: user.id.clone(),
    });

    Ok(ApiResponse::ok_with(user, "Registration successful"))
  }

  /// Close the current session. Succeeds even without one.
  pub async fn logout(&self) -> Result<ApiResponse<()>> {
    self.state.delay().await;
    *self.state.session.lock() = None;
    Ok(ApiResponse::ok_with((), "Logout successful"))
  }

  /// The user behind the active session.
  pub async fn me(&self) -> Result<ApiResponse<User>> {
    self.state.delay().await;

    let user_id = {
      let session = self.state.session.lock();
      session
        .as_ref()
        .map(|s| s.user_id.clone())
        .ok_or(Error::NotAuthenticated)?
    };

    let users = self.state.users.lock();
    let user = users
      .iter()
      .find(|u| u.id == user_id)
      .cloned()
      .ok_or_else(|| Error::not_found("user", &user_id))?;

    Ok(ApiResponse::ok(user))
  }
}

//! Client preferences: auth snapshot, theme and view state, owned by one
//! explicitly-constructed container rather than an ambient global.
//!
//! `{user, is_authenticated, theme}` are persisted on every change and
//! hydrated at startup; `sidebar_open` and `current_project` live only for
//! the process. Consumers watch state snapshots through a channel; the
//! container never hands out a mutable reference to its state.

use crate::error::{Error, Result};
use crate::types::{Project, Theme, User};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::debug;

/// Full in-memory client state.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientState {
  pub user: Option<User>,
  pub is_authenticated: bool,
  pub sidebar_open: bool,
  pub theme: Theme,
  pub current_project: Option<Project>,
}

impl Default for ClientState {
  fn default() -> Self {
    Self {
      user: None,
      is_authenticated: false,
      sidebar_open: true,
      theme: Theme::System,
      current_project: None,
    }
  }
}

/// The persisted slice of the client state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
  pub user: Option<User>,
  pub is_authenticated: bool,
  pub theme: Theme,
}

/// Backend for preference persistence.
pub trait PreferenceStorage: Send + Sync {
  /// Previously saved preferences, or `None` on first run.
  fn load(&self) -> Result<Option<Preferences>>;

  fn save(&self, preferences: &Preferences) -> Result<()>;
}

/// Storage that keeps preferences only in memory. Used in tests and when no
/// writable location exists.
#[derive(Default)]
pub struct MemoryStorage {
  saved: Mutex<Option<Preferences>>,
}

impl PreferenceStorage for MemoryStorage {
  fn load(&self) -> Result<Option<Preferences>> {
    Ok(self.saved.lock().clone())
  }

  fn save(&self, preferences: &Preferences) -> Result<()> {
    *self.saved.lock() = Some(preferences.clone());
    Ok(())
  }
}

/// JSON-file-backed storage.
pub struct JsonFileStorage {
  path: PathBuf,
}

impl JsonFileStorage {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }
}

impl PreferenceStorage for JsonFileStorage {
  fn load(&self) -> Result<Option<Preferences>> {
    let contents = match std::fs::read_to_string(&self.path) {
      Ok(contents) => contents,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => {
        return Err(Error::Storage(format!(
          "failed to read {}: {}",
          self.path.display(),
          e
        )))
      }
    };

    let preferences = serde_json::from_str(&contents).map_err(|e| {
      Error::Storage(format!("failed to parse {}: {}", self.path.display(), e))
    })?;
    Ok(Some(preferences))
  }

  fn save(&self, preferences: &Preferences) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| {
        Error::Storage(format!("failed to create {}: {}", parent.display(), e))
      })?;
    }

    let contents = serde_json::to_string_pretty(preferences)
      .map_err(|e| Error::Storage(format!("failed to serialize preferences: {}", e)))?;
    std::fs::write(&self.path, contents).map_err(|e| {
      Error::Storage(format!("failed to write {}: {}", self.path.display(), e))
    })?;
    Ok(())
  }
}

/// Owned, injectable client-state container with subscribe/get/set.
pub struct ClientStore {
  state: Mutex<ClientState>,
  tx: watch::Sender<ClientState>,
  storage: Box<dyn PreferenceStorage>,
}

impl ClientStore {
  /// Create the store, hydrating the persisted fields from `storage`.
  pub fn new(storage: Box<dyn PreferenceStorage>) -> Result<Self> {
    let mut state = ClientState::default();
    if let Some(preferences) = storage.load()? {
      debug!("hydrated client preferences");
      state.user = preferences.user;
      state.is_authenticated = preferences.is_authenticated;
      state.theme = preferences.theme;
    }

    let (tx, _rx) = watch::channel(state.clone());
    Ok(Self {
      state: Mutex::new(state),
      tx,
      storage,
    })
  }

  /// Snapshot of the current state.
  pub fn get(&self) -> ClientState {
    self.state.lock().clone()
  }

  /// Watch state snapshots. The receiver starts at the current state.
  pub fn subscribe(&self) -> watch::Receiver<ClientState> {
    self.tx.subscribe()
  }

  /// Record a signed-in user.
  pub fn set_auth(&self, user: User) -> Result<()> {
    self.mutate(true, |state| {
      state.user = Some(user);
      state.is_authenticated = true;
    })
  }

  /// Forget the session. The theme survives; everything scoped to the user
  /// (including the current project) is reset.
  pub fn clear_auth(&self) -> Result<()> {
    self.mutate(true, |state| {
      state.user = None;
      state.is_authenticated = false;
      state.current_project = None;
    })
  }

  pub fn set_theme(&self, theme: Theme) -> Result<()> {
    self.mutate(true, |state| state.theme = theme)
  }

  pub fn set_sidebar_open(&self, open: bool) -> Result<()> {
    self.mutate(false, |state| state.sidebar_open = open)
  }

  pub fn set_current_project(&self, project: Option<Project>) -> Result<()> {
    self.mutate(false, |state| state.current_project = project)
  }

  /// Apply a mutation, persist the durable fields if they may have changed,
  /// and notify subscribers.
  fn mutate(&self, persist: bool, f: impl FnOnce(&mut ClientState)) -> Result<()> {
    let snapshot = {
      let mut state = self.state.lock();
      f(&mut state);
      state.clone()
    };

    if persist {
      self.storage.save(&Preferences {
        user: snapshot.user.clone(),
        is_authenticated: snapshot.is_authenticated,
        theme: snapshot.theme,
      })?;
    }

    // Subscribers may all be gone; that is fine.
    let _ = self.tx.send(snapshot);
    Ok(())
  }
}

//! Configuration for cache staleness windows, mock API latency and
//! preference storage.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub api: ApiConfig,
  /// Where client preferences are persisted. Defaults to
  /// `<data dir>/taskboard/preferences.json`.
  pub preferences_path: Option<PathBuf>,
}

/// Per-resource staleness windows, in seconds. Cached data older than its
/// window is still served but triggers a background refresh.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub tasks_stale_secs: u64,
  pub projects_stale_secs: u64,
  pub stats_stale_secs: u64,
  pub auth_stale_secs: u64,
  pub users_stale_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      tasks_stale_secs: 120,
      projects_stale_secs: 300,
      stats_stale_secs: 120,
      auth_stale_secs: 600,
      users_stale_secs: 300,
    }
  }
}

impl CacheConfig {
  pub fn tasks_stale(&self) -> Duration {
    Duration::from_secs(self.tasks_stale_secs)
  }

  pub fn projects_stale(&self) -> Duration {
    Duration::from_secs(self.projects_stale_secs)
  }

  pub fn stats_stale(&self) -> Duration {
    Duration::from_secs(self.stats_stale_secs)
  }

  pub fn auth_stale(&self) -> Duration {
    Duration::from_secs(self.auth_stale_secs)
  }

  pub fn users_stale(&self) -> Duration {
    Duration::from_secs(self.users_stale_secs)
  }
}

/// Mock remote source behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Artificial latency applied to every remote call, in milliseconds.
  pub latency_ms: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self { latency_ms: 100 }
  }
}

impl ApiConfig {
  pub fn latency(&self) -> Duration {
    Duration::from_millis(self.latency_ms)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (error if it does not exist)
  /// 2. ./taskboard.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/taskboard/config.yaml
  ///
  /// If no file is found, defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(Error::Validation(format!(
          "config file not found: {}",
          p.display()
        )));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("taskboard.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("taskboard").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
      Error::Validation(format!(
        "failed to read config file {}: {}",
        path.display(),
        e
      ))
    })?;

    let config: Config = serde_yaml::from_str(&contents).map_err(|e| {
      Error::Validation(format!(
        "failed to parse config file {}: {}",
        path.display(),
        e
      ))
    })?;

    Ok(config)
  }

  /// Resolve the preferences file path, falling back to the platform
  /// data directory.
  pub fn preferences_path(&self) -> Option<PathBuf> {
    if let Some(p) = &self.preferences_path {
      return Some(p.clone());
    }

    dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .map(|d| d.join("taskboard").join("preferences.json"))
  }
}

//! Cache keys and invalidation prefixes.
//!
//! Keys form a hierarchy per resource (all task keys, task list keys, one
//! task's detail keys, ...) so a mutation can invalidate a whole family of
//! queries with one prefix, the way the hook layer's nested query keys do.

use std::fmt;

/// Identity of a cached query: resource, operation and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
  TaskList,
  TaskDetail(String),
  ProjectList,
  ProjectDetail(String),
  /// Stats for one project. Lives under that project's detail prefix.
  ProjectStats(String),
  UserList,
  UserDetail(String),
  CurrentUser,
}

/// A family of cache keys targeted by one invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPrefix {
  TaskLists,
  TaskDetail(String),
  ProjectLists,
  ProjectDetail(String),
  UserLists,
  UserDetail(String),
  Auth,
  All,
}

impl QueryKey {
  /// Prefix-match relation used by `invalidate`.
  pub fn matches(&self, prefix: &KeyPrefix) -> bool {
    match prefix {
      KeyPrefix::All => true,
      KeyPrefix::TaskLists => matches!(self, QueryKey::TaskList),
      KeyPrefix::TaskDetail(id) => matches!(self, QueryKey::TaskDetail(k) if k == id),
      KeyPrefix::ProjectLists => matches!(self, QueryKey::ProjectList),
      KeyPrefix::ProjectDetail(id) => {
        matches!(self, QueryKey::ProjectDetail(k) if k == id)
          || matches!(self, QueryKey::ProjectStats(k) if k == id)
      }
      KeyPrefix::UserLists => matches!(self, QueryKey::UserList),
      KeyPrefix::UserDetail(id) => matches!(self, QueryKey::UserDetail(k) if k == id),
      KeyPrefix::Auth => matches!(self, QueryKey::CurrentUser),
    }
  }
}

impl fmt::Display for QueryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      QueryKey::TaskList => write!(f, "tasks:list"),
      QueryKey::TaskDetail(id) => write!(f, "tasks:detail:{}", id),
      QueryKey::ProjectList => write!(f, "projects:list"),
      QueryKey::ProjectDetail(id) => write!(f, "projects:detail:{}", id),
      QueryKey::ProjectStats(id) => write!(f, "projects:detail:{}:stats", id),
      QueryKey::UserList => write!(f, "users:list"),
      QueryKey::UserDetail(id) => write!(f, "users:detail:{}", id),
      QueryKey::CurrentUser => write!(f, "auth:me"),
    }
  }
}

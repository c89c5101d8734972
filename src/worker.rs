//! Offload scheduler: runs derived-state pipeline operations on a dedicated
//! background thread so the interactive thread never pays for them.
//!
//! Offloading is purely a performance strategy. Payloads and results are
//! owned values copied across the thread boundary, and the worker calls the
//! same pure functions in [`crate::pipeline`], so a worker result always
//! equals the inline computation for the same input.
//!
//! Every dispatch carries a unique request id; the reply (success or error)
//! carries it back and is matched exactly, so an error in one operation can
//! never be delivered to a caller awaiting another.

use crate::error::{Error, Result};
use crate::pipeline;
use crate::types::{Project, SortBy, SortOrder, Task, TaskFilter, TaskStats};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A pipeline operation with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineRequest {
  CalculateStats {
    tasks: Vec<Task>,
    projects: Vec<Project>,
  },
  FilterTasks {
    tasks: Vec<Task>,
    filter: TaskFilter,
  },
  SortTasks {
    tasks: Vec<Task>,
    sort_by: SortBy,
    order: SortOrder,
  },
  /// Test hooks: exercise the error and teardown paths, which the pure
  /// pipeline functions never hit on their own.
  #[cfg(test)]
  Panic,
  #[cfg(test)]
  Sleep(u64),
}

/// Result of a pipeline operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineResponse {
  Stats(TaskStats),
  Tasks(Vec<Task>),
}

struct Envelope {
  id: u64,
  request: PipelineRequest,
}

type Reply = std::result::Result<PipelineResponse, String>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Reply>>>>;

/// Handle to the background pipeline thread.
///
/// If the thread cannot be created the scheduler is disabled: `execute`
/// resolves `Ok(None)` immediately and the caller recomputes inline with the
/// pure pipeline functions.
pub struct OffloadScheduler {
  tx: Mutex<Option<mpsc::Sender<Envelope>>>,
  pending: Pending,
  next_id: AtomicU64,
}

impl OffloadScheduler {
  /// Start the background thread. Falls back to a disabled scheduler if the
  /// OS refuses a thread.
  pub fn spawn() -> Self {
    let (tx, rx) = mpsc::channel::<Envelope>();
    let pending: Pending = Arc::new(Mutex::new(HashMap::new()));

    let worker_pending = Arc::clone(&pending);
    let spawned = std::thread::Builder::new()
      .name("taskboard-pipeline".to_string())
      .spawn(move || {
        while let Ok(envelope) = rx.recv() {
          let reply = catch_unwind(AssertUnwindSafe(|| run_request(envelope.request)))
            .map_err(|panic| panic_message(panic.as_ref()));
          // Exact-match delivery: the entry is removed before the reply is
          // sent, so each dispatch resolves at most once.
          if let Some(sender) = worker_pending.lock().remove(&envelope.id) {
            let _ = sender.send(reply);
          }
        }
        debug!("pipeline worker thread stopped");
      });

    match spawned {
      Ok(_) => Self {
        tx: Mutex::new(Some(tx)),
        pending,
        next_id: AtomicU64::new(1),
      },
      Err(e) => {
        warn!(error = %e, "failed to spawn pipeline worker, falling back to inline execution");
        Self::disabled()
      }
    }
  }

  /// A scheduler with no background context. Every `execute` resolves
  /// `Ok(None)`.
  pub fn disabled() -> Self {
    Self {
      tx: Mutex::new(None),
      pending: Arc::new(Mutex::new(HashMap::new())),
      next_id: AtomicU64::new(1),
    }
  }

  /// Dispatch a pipeline operation to the background thread.
  ///
  /// `Ok(None)` means the scheduler is unavailable (disabled, torn down, or
  /// torn down mid-dispatch); the caller must recompute with the pure
  /// pipeline function, which yields an identical result. `Err` carries a
  /// failure of this specific computation only.
  pub async fn execute(&self, request: PipelineRequest) -> Result<Option<PipelineResponse>> {
    let Some(tx) = self.tx.lock().as_ref().cloned() else {
      return Ok(None);
    };

    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let (reply_tx, reply_rx) = oneshot::channel();
    self.pending.lock().insert(id, reply_tx);

    if tx.send(Envelope { id, request }).is_err() {
      // Worker thread is gone; clean up and fall back.
      self.pending.lock().remove(&id);
      return Ok(None);
    }

    match reply_rx.await {
      Ok(Ok(response)) => Ok(Some(response)),
      Ok(Err(message)) => Err(Error::Worker(message)),
      // Teardown cleared the pending entry without resolving it.
      Err(_) => Ok(None),
    }
  }

  /// Tear down the background context. Pending dispatches resolve as
  /// `Ok(None)` so their callers fall back inline; nothing hangs.
  pub fn shutdown(&self) {
    let had_worker = self.tx.lock().take().is_some();
    self.pending.lock().clear();
    if had_worker {
      debug!("pipeline worker shut down");
    }
  }

  // Typed wrappers around `execute`.

  pub async fn calculate_stats(
    &self,
    tasks: Vec<Task>,
    projects: Vec<Project>,
  ) -> Result<Option<TaskStats>> {
    match self
      .execute(PipelineRequest::CalculateStats { tasks, projects })
      .await?
    {
      Some(PipelineResponse::Stats(stats)) => Ok(Some(stats)),
      Some(_) => Err(Error::Worker("unexpected response kind".to_string())),
      None => Ok(None),
    }
  }

  pub async fn filter_tasks(
    &self,
    tasks: Vec<Task>,
    filter: TaskFilter,
  ) -> Result<Option<Vec<Task>>> {
    match self
      .execute(PipelineRequest::FilterTasks { tasks, filter })
      .await?
    {
      Some(PipelineResponse::Tasks(tasks)) => Ok(Some(tasks)),
      Some(_) => Err(Error::Worker("unexpected response kind".to_string())),
      None => Ok(None),
    }
  }

  pub async fn sort_tasks(
    &self,
    tasks: Vec<Task>,
    sort_by: SortBy,
    order: SortOrder,
  ) -> Result<Option<Vec<Task>>> {
    match self
      .execute(PipelineRequest::SortTasks {
        tasks,
        sort_by,
        order,
      })
      .await?
    {
      Some(PipelineResponse::Tasks(tasks)) => Ok(Some(tasks)),
      Some(_) => Err(Error::Worker("unexpected response kind".to_string())),
      None => Ok(None),
    }
  }
}

impl Drop for OffloadScheduler {
  fn drop(&mut self) {
    self.shutdown();
  }
}

fn run_request(request: PipelineRequest) -> PipelineResponse {
  match request {
    PipelineRequest::CalculateStats { tasks, projects } => {
      PipelineResponse::Stats(pipeline::calculate_stats(&tasks, &projects))
    }
    PipelineRequest::FilterTasks { tasks, filter } => {
      PipelineResponse::Tasks(pipeline::filter_tasks(&tasks, &filter))
    }
    PipelineRequest::SortTasks {
      tasks,
      sort_by,
      order,
    } => PipelineResponse::Tasks(pipeline::sort_tasks(&tasks, sort_by, order)),
    #[cfg(test)]
    PipelineRequest::Panic => panic!("requested panic"),
    #[cfg(test)]
    PipelineRequest::Sleep(ms) => {
      std::thread::sleep(std::time::Duration::from_millis(ms));
      PipelineResponse::Tasks(Vec::new())
    }
  }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
  if let Some(s) = panic.downcast_ref::<&str>() {
    (*s).to_string()
  } else if let Some(s) = panic.downcast_ref::<String>() {
    s.clone()
  } else {
    "pipeline computation panicked".to_string()
  }
}

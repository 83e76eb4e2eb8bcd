//! Background execution of extraction jobs.
//!
//! Jobs run on rayon's global pool through `rayon::spawn`, which also works on
//! wasm targets where rayon is backed by Web Workers. A job reports through
//! its own `bounded(1)` channel, so polling one handle never touches another
//! job's state.
//!
//! ```ignore
//! let executor = TaskExecutor::new();
//! let mut handle = executor.spawn(move || ExtractionJob::run(input));
//!
//! // Later frames
//! match handle.try_take() {
//!     JobPoll::Ready(staged) => publish(staged),
//!     JobPoll::Pending => {}
//!     JobPoll::Lost => retry(),
//! }
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{self as channel, Receiver, RecvTimeoutError, TryRecvError};

/// Process-wide sequence number of a spawned task, used in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

static NEXT_TASK: AtomicU64 = AtomicU64::new(0);

impl TaskId {
  fn next() -> Self {
    Self(NEXT_TASK.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Outcome of polling a [`JobHandle`].
#[derive(Debug, PartialEq, Eq)]
pub enum JobPoll<T> {
  /// Still queued or running.
  Pending,
  /// Finished; the result has been moved out of the handle.
  Ready(T),
  /// The task ended without a result (it panicked), or the result was
  /// already taken.
  Lost,
}

/// Receiving end of one spawned task.
#[derive(Debug)]
pub struct JobHandle<T> {
  id: TaskId,
  receiver: Option<Receiver<T>>,
  finished: Arc<AtomicBool>,
}

impl<T> JobHandle<T> {
  pub fn id(&self) -> TaskId {
    self.id
  }

  /// True once the task has either produced its result or died.
  pub fn is_finished(&self) -> bool {
    match &self.receiver {
      Some(receiver) => !receiver.is_empty() || self.finished.load(Ordering::Acquire),
      None => true,
    }
  }

  /// Take the result if it is available (non-blocking).
  pub fn try_take(&mut self) -> JobPoll<T> {
    let Some(receiver) = &self.receiver else {
      return JobPoll::Lost;
    };

    match receiver.try_recv() {
      Ok(result) => {
        self.receiver = None;
        JobPoll::Ready(result)
      }
      Err(TryRecvError::Empty) => JobPoll::Pending,
      Err(TryRecvError::Disconnected) => {
        self.receiver = None;
        JobPoll::Lost
      }
    }
  }

  /// Block up to `timeout` for the result.
  pub fn wait(&mut self, timeout: Duration) -> JobPoll<T> {
    let Some(receiver) = &self.receiver else {
      return JobPoll::Lost;
    };

    match receiver.recv_timeout(timeout) {
      Ok(result) => {
        self.receiver = None;
        JobPoll::Ready(result)
      }
      Err(RecvTimeoutError::Timeout) => JobPoll::Pending,
      Err(RecvTimeoutError::Disconnected) => {
        self.receiver = None;
        JobPoll::Lost
      }
    }
  }
}

/// Decrements the pending counter when dropped.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::AcqRel);
  }
}

/// Task executor on rayon's global pool.
///
/// Cloning shares the pending counter, so every clone reports the same
/// `pending_count`.
#[derive(Clone, Debug, Default)]
pub struct TaskExecutor {
  pending: Arc<AtomicUsize>,
}

impl TaskExecutor {
  /// Executor on the global pool. Size the pool with
  /// `rayon::ThreadPoolBuilder::build_global` before the first spawn.
  pub fn new() -> Self {
    Self::default()
  }

  /// Queue `work` and return immediately.
  pub fn spawn<F, T>(&self, work: F) -> JobHandle<T>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
  {
    let id = TaskId::next();
    let (sender, receiver) = channel::bounded(1);

    self.pending.fetch_add(1, Ordering::AcqRel);
    let guard = PendingGuard(Arc::clone(&self.pending));
    let finished = Arc::new(AtomicBool::new(false));
    let done = Arc::clone(&finished);

    rayon::spawn(move || {
      // A panic must not take down the pool; dropping the sender reports it.
      let outcome = panic::catch_unwind(AssertUnwindSafe(work));
      // No longer pending by the time the result is observable.
      drop(guard);
      match outcome {
        Ok(result) => {
          // Ignore send error (handle dropped = nobody wants the result)
          let _ = sender.send(result);
        }
        Err(_) => log::error!("background task {} panicked", id.raw()),
      }
      drop(sender);
      done.store(true, Ordering::Release);
    });

    JobHandle {
      id,
      receiver: Some(receiver),
      finished,
    }
  }

  /// Worker threads available to jobs.
  pub fn num_threads(&self) -> usize {
    rayon::current_num_threads()
  }

  /// Number of tasks currently queued or running.
  pub fn pending_count(&self) -> usize {
    self.pending.load(Ordering::Acquire)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn take<T>(handle: &mut JobHandle<T>) -> JobPoll<T> {
    handle.wait(Duration::from_secs(10))
  }

  #[test]
  fn test_result_is_handed_out_once() {
    let executor = TaskExecutor::new();

    let mut handle = executor.spawn(|| 42i32);

    assert_eq!(take(&mut handle), JobPoll::Ready(42));
    assert!(handle.is_finished());
    // A result is handed out once.
    assert_eq!(handle.try_take(), JobPoll::Lost);
  }

  #[test]
  fn test_handles_are_independent() {
    let executor = TaskExecutor::new();

    let mut handles: Vec<_> = (0..6u32).map(|i| executor.spawn(move || i * i)).collect();
    // Poll in reverse to show no handle depends on another.
    let squares: Vec<u32> = handles
      .iter_mut()
      .rev()
      .map(|h| match take(h) {
        JobPoll::Ready(r) => r,
        other => panic!("task did not finish: {other:?}"),
      })
      .collect();

    assert_eq!(squares, vec![25, 16, 9, 4, 1, 0]);
    let ids: std::collections::HashSet<_> = handles.iter().map(|h| h.id()).collect();
    assert_eq!(ids.len(), 6);
  }

  #[test]
  fn test_pending_until_released() {
    let executor = TaskExecutor::new();
    let (release, gate) = channel::bounded::<()>(0);

    let mut handle = executor.spawn(move || {
      let _ = gate.recv();
      7u8
    });

    assert_eq!(handle.try_take(), JobPoll::Pending);
    assert!(!handle.is_finished());
    assert_eq!(executor.pending_count(), 1);

    drop(release);
    assert_eq!(take(&mut handle), JobPoll::Ready(7));
  }

  #[test]
  fn test_panicking_task_is_lost() {
    let executor = TaskExecutor::new();

    let mut handle = executor.spawn(|| -> u32 { panic!("worker failure") });

    assert_eq!(take(&mut handle), JobPoll::Lost);
    assert!(handle.is_finished());
  }

  #[test]
  fn test_pending_count_drains() {
    let executor = TaskExecutor::new();
    let mut handles: Vec<_> = (0..4).map(|i| executor.spawn(move || i)).collect();
    for handle in &mut handles {
      assert!(matches!(take(handle), JobPoll::Ready(_)));
    }

    assert_eq!(executor.pending_count(), 0);
  }

  #[test]
  fn test_clones_share_pending_count() {
    let executor = TaskExecutor::default();
    let clone = executor.clone();
    let (release, gate) = channel::bounded::<()>(0);

    let mut handle = clone.spawn(move || gate.recv().is_err());
    assert_eq!(executor.pending_count(), 1);

    drop(release);
    assert_eq!(take(&mut handle), JobPoll::Ready(true));
    assert_eq!(executor.pending_count(), 0);
    assert!(executor.num_threads() >= 1);
  }
}

//! TerrainStreamer - per-frame orchestration of tree, job and snapshot.
//!
//! # Job cycle
//!
//! ```text
//!            active set differs from
//!            the last job's target
//!   ┌──────┐ ─────────────────────► ┌─────────┐
//!   │ Idle │                        │ Running │
//!   └──────┘ ◄──┐                   └────┬────┘
//!               │ publish                │ result received
//!               │                 ┌──────▼──────────┐
//!               └──────────────── │ AwaitingPublish │
//!                                 └─────────────────┘
//! ```
//!
//! All transitions happen inside [`TerrainStreamer::tick`] on the main
//! thread; a single tick can poll, publish and start the next job. Focal
//! point movement while a job is in flight is coalesced: the next job targets
//! whatever the tree holds when the cycle is back to `Idle`.

use std::sync::Arc;
use std::time::Duration;

use glam::{DAffine3, DVec3};
use web_time::Instant;

use crate::config::StreamingConfig;
use crate::error::{ConfigError, Result, StreamError};
use crate::extract::ChunkDescriptor;
use crate::field::VolumetricField;
use crate::gpu::VertexArena;
use crate::job::{ExtractionJob, JobInput};
use crate::metrics::StreamerMetrics;
use crate::quadtree::{ActiveSet, Diff, QuadNode, QuadTree};
use crate::snapshot::{ChunkGroup, SnapshotBroker, StagedGroups};
use crate::terrain::Terrain;
use crate::threading::{JobHandle, JobPoll, TaskExecutor};

/// Where the extraction cycle stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
  Idle,
  Running,
  AwaitingPublish,
}

/// What one [`TerrainStreamer::tick`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
  /// Change of the tree's active set caused by this tick's focal point.
  /// Every active node counts as added on the tick that starts a queued
  /// full update.
  pub diff: Diff,
  /// Generation published during this tick.
  pub published: Option<u64>,
  /// Generation started during this tick.
  pub started: Option<u64>,
  /// State at the end of the tick.
  pub state: JobState,
}

type JobResult = Result<StagedGroups>;

/// Drives LOD selection and background extraction for one terrain.
pub struct TerrainStreamer<F: VolumetricField + 'static> {
  tree: QuadTree,
  terrain: Arc<Terrain<F>>,
  arena: Arc<dyn VertexArena>,
  executor: TaskExecutor,
  broker: Arc<SnapshotBroker>,
  state: JobState,
  job: Option<JobHandle<JobResult>>,
  staged: Option<StagedGroups>,
  /// Active set targeted by the most recent job. `None` forces a job.
  extracted_leaves: Option<ActiveSet>,
  full_update_queued: bool,
  /// Whether the job in flight is a full rebuild; handed back to
  /// `full_update_queued` if it fails.
  job_full_rebuild: bool,
  next_generation: u64,
  metrics: StreamerMetrics,
}

impl<F: VolumetricField + 'static> TerrainStreamer<F> {
  pub fn new(
    config: StreamingConfig,
    terrain: Arc<Terrain<F>>,
    arena: Arc<dyn VertexArena>,
  ) -> std::result::Result<Self, ConfigError> {
    config.validate()?;
    if terrain.chunk_dim() != config.chunk_dim
      || terrain.vertical_cells() != config.vertical_cells
      || terrain.max_lod() != config.max_lod
      || terrain.cell_size() != config.cell_size
    {
      return Err(ConfigError::TerrainMismatch);
    }

    let tree = QuadTree::new(config.quadtree_config())?;
    let mut metrics = StreamerMetrics::new();
    metrics.record_active(tree.active(), tree.max_lod());

    Ok(Self {
      tree,
      terrain,
      arena,
      executor: TaskExecutor::new(),
      broker: Arc::new(SnapshotBroker::new()),
      state: JobState::Idle,
      job: None,
      staged: None,
      extracted_leaves: None,
      full_update_queued: false,
      job_full_rebuild: false,
      next_generation: 1,
      metrics,
    })
  }

  /// Advance one frame. Never blocks.
  ///
  /// Returns an error when the job that finished during this tick failed;
  /// the cycle is back to `Idle` and the next tick retries.
  pub fn tick(&mut self, camera_world: DVec3) -> Result<TickReport> {
    let focal = self.terrain.focal_point(camera_world);
    let diff = self.tree.set_focal_point(focal);
    if !diff.is_empty() {
      self.metrics.record_active(self.tree.active(), self.tree.max_lod());
    }

    let mut report = TickReport {
      diff,
      published: None,
      started: None,
      state: self.state,
    };

    if self.state == JobState::Running {
      let poll = match self.job.as_mut() {
        Some(job) => job.try_take(),
        None => JobPoll::Lost,
      };
      self.on_poll(poll)?;
    }
    if self.state == JobState::AwaitingPublish {
      report.published = self.publish();
    }
    if self.state == JobState::Idle {
      report.started = self.start_job_if_needed();
      if report.started.is_some() && self.job_full_rebuild {
        report.diff = Diff::everything_added(self.tree.active());
      }
    }

    report.state = self.state;
    Ok(report)
  }

  /// Treat the next cycle as "everything added": re-extract every active
  /// chunk, even if the active set has not changed.
  pub fn queue_full_update(&mut self) {
    self.full_update_queued = true;
  }

  /// Visit the groups of the live snapshot in draw order.
  pub fn for_each_active_chunk_group(&self, mut f: impl FnMut(&ChunkGroup)) {
    let snapshot = self.broker.current();
    for group in snapshot.iter() {
      f(group);
    }
  }

  pub fn job_state(&self) -> JobState {
    self.state
  }

  /// Broker holding the live snapshot; hand a clone to the render thread.
  pub fn broker(&self) -> Arc<SnapshotBroker> {
    Arc::clone(&self.broker)
  }

  pub fn tree(&self) -> &QuadTree {
    &self.tree
  }

  pub fn terrain(&self) -> &Arc<Terrain<F>> {
    &self.terrain
  }

  pub fn max_lod(&self) -> u8 {
    self.tree.max_lod()
  }

  /// Finest cells per cell at `level`: `2^(max_lod - level)`.
  pub fn lod_scale(&self, level: u8) -> f64 {
    self.terrain.cell_stride(level) as f64
  }

  /// Chunk-local unit cube to world for `node`.
  pub fn chunk_transform(&self, node: &QuadNode) -> DAffine3 {
    self.terrain.chunk_transform(node)
  }

  pub fn metrics(&self) -> &StreamerMetrics {
    &self.metrics
  }

  /// Block until the published snapshot matches the tree's current active
  /// set, or `timeout` elapses. Returns whether it settled.
  ///
  /// For headless tools and tests; [`tick`](Self::tick) never waits.
  pub fn wait_idle(&mut self, timeout: Duration) -> Result<bool> {
    let deadline = Instant::now() + timeout;
    loop {
      match self.state {
        JobState::Running => {
          let remaining = deadline.saturating_duration_since(Instant::now());
          let poll = match self.job.as_mut() {
            Some(job) => job.wait(remaining),
            None => JobPoll::Lost,
          };
          if matches!(poll, JobPoll::Pending) {
            return Ok(false);
          }
          self.on_poll(poll)?;
        }
        JobState::AwaitingPublish => {
          self.publish();
        }
        JobState::Idle => {
          if self.start_job_if_needed().is_none() {
            return Ok(true);
          }
        }
      }
    }
  }

  fn needs_job(&self) -> bool {
    self.full_update_queued || self.extracted_leaves.as_ref() != Some(self.tree.active())
  }

  /// Idle -> Running.
  fn start_job_if_needed(&mut self) -> Option<u64> {
    debug_assert_eq!(self.state, JobState::Idle);
    if !self.needs_job() {
      return None;
    }
    debug_assert!(
      self.job.is_none() && self.executor.pending_count() == 0,
      "extraction job dispatched while another is outstanding"
    );

    let active = self.tree.active();
    let descriptors: Vec<ChunkDescriptor> = self
      .tree
      .active_nodes()
      .into_iter()
      .map(|node| ChunkDescriptor::from_active(node, active))
      .collect();

    let generation = self.next_generation;
    self.next_generation += 1;
    let full_rebuild = std::mem::take(&mut self.full_update_queued);
    self.job_full_rebuild = full_rebuild;
    let input = JobInput {
      generation,
      descriptors,
      terrain: Arc::clone(&self.terrain),
      arena: Arc::clone(&self.arena),
      previous: self.broker.current(),
      full_rebuild,
    };

    self.extracted_leaves = Some(active.clone());
    self.job = Some(self.executor.spawn(move || ExtractionJob::run(input)));
    self.state = JobState::Running;
    self.metrics.record_job_started();
    log::debug!("streamer: Idle -> Running (job {generation})");
    Some(generation)
  }

  /// Running -> AwaitingPublish, or back to Idle when the job failed.
  fn on_poll(&mut self, poll: JobPoll<JobResult>) -> Result<()> {
    match poll {
      JobPoll::Pending => Ok(()),
      JobPoll::Ready(Ok(staged)) => {
        self.job = None;
        self.job_full_rebuild = false;
        self.metrics.record_job_completed(staged.extracted, staged.reused, staged.duration_us);
        self.staged = Some(staged);
        self.state = JobState::AwaitingPublish;
        log::debug!("streamer: Running -> AwaitingPublish");
        Ok(())
      }
      JobPoll::Ready(Err(err)) => {
        self.fail_job();
        Err(err)
      }
      JobPoll::Lost => {
        log::error!("extraction job ended without a result");
        self.metrics.record_job_lost();
        self.fail_job();
        Err(StreamError::JobLost)
      }
    }
  }

  fn fail_job(&mut self) {
    self.job = None;
    // Retry on the next cycle, with the same kind of rebuild.
    self.extracted_leaves = None;
    self.full_update_queued |= std::mem::take(&mut self.job_full_rebuild);
    self.state = JobState::Idle;
    log::debug!("streamer: Running -> Idle (job failed)");
  }

  /// AwaitingPublish -> Idle.
  fn publish(&mut self) -> Option<u64> {
    self.state = JobState::Idle;
    let staged = self.staged.take()?;
    let snapshot = self.broker.publish(staged);
    let (primary, transition) = snapshot.vertex_totals();
    self
      .metrics
      .record_publish(snapshot.generation(), snapshot.len(), primary, transition);
    log::debug!("streamer: AwaitingPublish -> Idle (snapshot {})", snapshot.generation());
    Some(snapshot.generation())
  }
}

#[cfg(test)]
#[path = "streamer_test.rs"]
mod streamer_test;

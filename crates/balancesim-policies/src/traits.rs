//! Dispatch policy trait definitions.
//!
//! All dispatch policies implement the [`DispatchPolicy`] trait. A policy owns
//! a [`WorkerPool`] holding the per-worker accumulated load, and its own
//! decision state (cursors, counters). `assign` validates the load, lets the
//! strategy pick a worker, then charges it to the pool.

use crate::metrics::LoadMetrics;
use crate::pool::WorkerPool;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// Malformed construction arguments. No policy instance is produced.
    #[error("Invalid policy configuration: {0}")]
    InvalidConfig(String),
    /// A negative or non-finite load was passed to `assign`.
    #[error("Invalid load value: {0} (loads must be finite and non-negative)")]
    InvalidLoad(f64),
}

/// One entry of the assignment history, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub worker: usize,
    pub load: f64,
}

/// Check that a load value is inside the domain `assign` accepts.
pub fn validate_load(load: f64) -> Result<(), PolicyError> {
    if load.is_finite() && load >= 0.0 {
        Ok(())
    } else {
        Err(PolicyError::InvalidLoad(load))
    }
}

/// The core dispatch policy trait.
///
/// The only operations that change state are [`assign`](DispatchPolicy::assign)
/// and [`reset`](DispatchPolicy::reset). Each strategy picks its worker in a
/// private helper, so cursors and counters cannot be advanced from outside;
/// the bookkeeping (load accounting, history, metrics) lives in the shared
/// [`WorkerPool`].
///
/// Instances are not meant to be shared between threads without external
/// serialization: every mutating call takes `&mut self`.
pub trait DispatchPolicy {
    /// Human-readable name for reports.
    fn name(&self) -> &str;

    /// Shared per-worker state.
    fn pool(&self) -> &WorkerPool;

    /// Assign one request. Returns the chosen worker index.
    ///
    /// On [`PolicyError::InvalidLoad`] no state is touched.
    fn assign(&mut self, load: f64) -> Result<usize, PolicyError>;

    /// Return all mutable state to its post-construction values, keeping
    /// the worker count and any weights.
    fn reset(&mut self);

    /// Snapshot of per-worker accumulated load, length N.
    fn current_loads(&self) -> &[f64] {
        self.pool().loads()
    }

    fn num_workers(&self) -> usize {
        self.pool().num_workers()
    }

    fn total_requests(&self) -> u64 {
        self.pool().total_requests()
    }

    fn history(&self) -> &[Assignment] {
        self.pool().history()
    }

    /// Metrics using wall-clock time elapsed since the last reset.
    fn metrics(&self) -> LoadMetrics {
        self.metrics_at(self.pool().elapsed())
    }

    /// Metrics using a caller-supplied elapsed duration.
    fn metrics_at(&self, elapsed: Duration) -> LoadMetrics {
        LoadMetrics::compute(self.current_loads(), self.total_requests(), elapsed)
    }
}

//! Per-worker accumulated state shared by every dispatch policy.

use crate::traits::{Assignment, PolicyError};
use std::time::{Duration, Instant};

/// Fixed-size pool of workers and the load charged to each of them.
///
/// The sum of `loads` always equals the sum of every load charged since the
/// last reset, and `request_counts` always sums to `total_requests`.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    loads: Vec<f64>,
    request_counts: Vec<u64>,
    total_requests: u64,
    history: Vec<Assignment>,
    /// Origin for [`elapsed`](WorkerPool::elapsed); moved forward on reset.
    started_at: Instant,
}

impl WorkerPool {
    /// Create a pool of `num_workers` idle workers.
    pub fn new(num_workers: usize) -> Result<Self, PolicyError> {
        if num_workers == 0 {
            return Err(PolicyError::InvalidConfig(
                "num_workers must be > 0".to_string(),
            ));
        }
        Ok(Self {
            loads: vec![0.0; num_workers],
            request_counts: vec![0; num_workers],
            total_requests: 0,
            history: Vec::new(),
            started_at: Instant::now(),
        })
    }

    pub fn num_workers(&self) -> usize {
        self.loads.len()
    }

    pub fn loads(&self) -> &[f64] {
        &self.loads
    }

    /// Number of assignments each worker has received.
    pub fn request_counts(&self) -> &[u64] {
        &self.request_counts
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    pub fn history(&self) -> &[Assignment] {
        &self.history
    }

    /// Wall-clock time since construction or the last reset.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Record `load` against `worker`.
    ///
    /// # Panics
    ///
    /// Panics if `worker` is out of range; strategies never produce one.
    pub(crate) fn charge(&mut self, worker: usize, load: f64) {
        self.loads[worker] += load;
        self.request_counts[worker] += 1;
        self.total_requests += 1;
        self.history.push(Assignment { worker, load });
    }

    pub(crate) fn reset(&mut self) {
        self.loads.iter_mut().for_each(|l| *l = 0.0);
        self.request_counts.iter_mut().for_each(|c| *c = 0);
        self.total_requests = 0;
        self.history.clear();
        self.started_at = Instant::now();
    }
}

//! Weighted round-robin dispatch policy.
//!
//! Each worker is given a positive weight. The cursor stays on a worker for
//! as many consecutive requests as its weight allows, then moves on to the
//! next one (wrapping). Over a long run worker `i` receives a share of
//! requests proportional to `weight_i / sum(weights)`. Because the cursor
//! only moves in whole-request steps, short windows carry quantization error;
//! proportionality is a long-run property only.

use crate::pool::WorkerPool;
use crate::traits::*;

/// Absorbs the rounding in `weight / max_weight * max_weight`, which can land
/// just above an integral weight (7.0 / 9.3 * 9.3 == 7.000000000000001) and
/// would otherwise cost that worker one extra request per visit. Weights
/// within 1e-9 above an integer are served as that integer.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Weighted round-robin dispatcher.
#[derive(Debug, Clone)]
pub struct WeightedRoundRobin {
    pool: WorkerPool,
    weights: Vec<f64>,
    max_weight: f64,
    /// `weights[i] / max_weight`, each in `(0, 1]`.
    ratios: Vec<f64>,
    cursor: usize,
    /// Requests served by `cursor` since it last advanced.
    service_count: u64,
}

impl WeightedRoundRobin {
    /// Create a dispatcher for `num_workers` workers.
    ///
    /// Fails if `weights.len() != num_workers`, any weight is non-positive or
    /// non-finite, or `num_workers` is zero.
    pub fn new(num_workers: usize, weights: &[f64]) -> Result<Self, PolicyError> {
        let pool = WorkerPool::new(num_workers)?;
        if weights.len() != num_workers {
            return Err(PolicyError::InvalidConfig(format!(
                "expected {} weights (one per worker), got {}",
                num_workers,
                weights.len()
            )));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(PolicyError::InvalidConfig(format!(
                "all weights must be positive and finite, got {}",
                bad
            )));
        }

        let max_weight = weights.iter().copied().fold(f64::MIN, f64::max);
        let ratios = weights.iter().map(|w| w / max_weight).collect();

        Ok(Self {
            pool,
            weights: weights.to_vec(),
            max_weight,
            ratios,
            cursor: 0,
            service_count: 0,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn ratios(&self) -> &[f64] {
        &self.ratios
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn service_count(&self) -> u64 {
        self.service_count
    }

    fn quota(&self, worker: usize) -> f64 {
        self.ratios[worker] * self.max_weight
    }

    fn next_worker(&mut self) -> usize {
        let worker = self.cursor;
        self.service_count += 1;

        if self.service_count as f64 >= self.quota(worker) - THRESHOLD_EPSILON {
            self.cursor = (self.cursor + 1) % self.pool.num_workers();
            self.service_count = 0;
        }
        worker
    }
}

impl DispatchPolicy for WeightedRoundRobin {
    fn name(&self) -> &str {
        "weighted_round_robin"
    }

    fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    fn assign(&mut self, load: f64) -> Result<usize, PolicyError> {
        validate_load(load)?;
        let worker = self.next_worker();
        self.pool.charge(worker, load);
        Ok(worker)
    }

    fn reset(&mut self) {
        self.pool.reset();
        self.cursor = 0;
        self.service_count = 0;
    }
}

//! Least-loaded dispatch policy.
//!
//! Sends each request to the worker with the smallest accumulated load. This
//! greedy rule keeps the running maximum load (makespan) as low as it can at
//! every step, but it only looks at the current request and is not optimal
//! over a whole sequence.

use crate::pool::WorkerPool;
use crate::traits::*;

/// Least-loaded dispatcher. Ties go to the lowest worker index.
#[derive(Debug, Clone)]
pub struct LeastLoaded {
    pool: WorkerPool,
}

impl LeastLoaded {
    pub fn new(num_workers: usize) -> Result<Self, PolicyError> {
        Ok(Self {
            pool: WorkerPool::new(num_workers)?,
        })
    }

    fn least_loaded_worker(&self) -> usize {
        // Strict `<` keeps the first (lowest-index) minimum.
        let loads = self.pool.loads();
        let mut best = 0;
        for (idx, &load) in loads.iter().enumerate().skip(1) {
            if load < loads[best] {
                best = idx;
            }
        }
        best
    }
}

impl DispatchPolicy for LeastLoaded {
    fn name(&self) -> &str {
        "least_loaded"
    }

    fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    fn assign(&mut self, load: f64) -> Result<usize, PolicyError> {
        validate_load(load)?;
        let worker = self.least_loaded_worker();
        self.pool.charge(worker, load);
        Ok(worker)
    }

    // No decision state beyond the pool itself.
    fn reset(&mut self) {
        self.pool.reset();
    }
}

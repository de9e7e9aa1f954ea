//! Round-robin dispatch policy.
//!
//! The simplest strategy: hands requests to workers in a circular order,
//! ignoring the load each request carries. Request counts are perfectly even
//! over any run whose length is a multiple of the pool size; how even the
//! accumulated load ends up depends entirely on the input sequence.

use crate::pool::WorkerPool;
use crate::traits::*;

/// Round-robin dispatcher.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    pool: WorkerPool,
    /// Worker that receives the next request. Always in `[0, N)`.
    cursor: usize,
}

impl RoundRobin {
    pub fn new(num_workers: usize) -> Result<Self, PolicyError> {
        Ok(Self {
            pool: WorkerPool::new(num_workers)?,
            cursor: 0,
        })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn next_worker(&mut self) -> usize {
        let worker = self.cursor;
        self.cursor = (self.cursor + 1) % self.pool.num_workers();
        worker
    }
}

impl DispatchPolicy for RoundRobin {
    fn name(&self) -> &str {
        "round_robin"
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
    }
}

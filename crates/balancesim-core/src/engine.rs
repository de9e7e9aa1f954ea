//! Simulation run engine.
//!
//! Replays an ordered sequence of load values through one dispatch policy,
//! one `assign` call at a time, and summarizes the result. The engine owns
//! its policy outright, so a policy instance is never shared between
//! concurrent runs; run independent engines to parallelize.

use crate::config::ConfigError;
use crate::generator::GeneratorError;
use balancesim_policies::{Assignment, DispatchPolicy, LoadMetrics, Policy, PolicyError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What to do when the input contains a negative or non-finite load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidLoadAction {
    /// Drop the value, count it and keep going.
    #[default]
    Skip,
    /// Stop the run and return the error.
    Abort,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub on_invalid_load: InvalidLoadAction,
    /// Copy the policy's assignment history into each report.
    pub record_history: bool,
    /// Checked between assignments; when set the run stops early.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Outcome of replaying one load sequence through one policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub policy: String,
    /// Label of the load sequence (usually the distribution name).
    pub distribution: String,
    pub run: u32,
    pub metrics: LoadMetrics,
    pub worker_loads: Vec<f64>,
    pub worker_requests: Vec<u64>,
    /// Invalid load values dropped under [`InvalidLoadAction::Skip`].
    pub skipped_loads: u64,
    pub execution_time_secs: f64,
    /// True if the run was cancelled before the sequence was exhausted.
    pub interrupted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Assignment>,
}

/// Drives a single policy instance.
pub struct SimulationEngine {
    policy: Policy,
    options: EngineOptions,
}

impl SimulationEngine {
    pub fn new(policy: Policy, options: EngineOptions) -> Self {
        Self { policy, options }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn into_policy(self) -> Policy {
        self.policy
    }

    fn cancelled(&self) -> bool {
        self.options
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Reset the policy and replay `loads` through it in order.
    pub fn run(
        &mut self,
        loads: &[f64],
        distribution: &str,
        run: u32,
    ) -> Result<RunReport, EngineError> {
        self.policy.reset();

        let mut skipped_loads = 0u64;
        let mut interrupted = false;
        let start = Instant::now();

        for &load in loads {
            if self.cancelled() {
                interrupted = true;
                break;
            }
            match self.policy.assign(load) {
                Ok(_) => {}
                Err(PolicyError::InvalidLoad(value))
                    if self.options.on_invalid_load == InvalidLoadAction::Skip =>
                {
                    skipped_loads += 1;
                    debug!(value, "skipping invalid load");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let elapsed = start.elapsed();
        if skipped_loads > 0 {
            warn!(
                policy = self.policy.name(),
                distribution,
                skipped_loads,
                "invalid load values were skipped"
            );
        }

        let metrics = self.policy.metrics_at(elapsed);
        debug!(
            policy = self.policy.name(),
            distribution,
            run,
            total_requests = metrics.total_requests,
            balance_score = metrics.balance_score,
            "run complete"
        );

        Ok(RunReport {
            policy: self.policy.name().to_string(),
            distribution: distribution.to_string(),
            run,
            metrics,
            worker_loads: self.policy.current_loads().to_vec(),
            worker_requests: self.policy.pool().request_counts().to_vec(),
            skipped_loads,
            execution_time_secs: elapsed.as_secs_f64(),
            interrupted,
            history: if self.options.record_history {
                self.policy.history().to_vec()
            } else {
                Vec::new()
            },
        })
    }
}

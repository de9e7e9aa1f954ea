//! Built-in dispatch policies for BalanceSim.
//!
//! This crate provides the [`DispatchPolicy`] trait, the three built-in
//! strategies and the [`LoadMetrics`] engine that scores a pool's load
//! distribution:
//!
//! | Policy | Strategy | Best For |
//! |--------|----------|----------|
//! | [`RoundRobin`] | Cycle through workers | Uniform request sizes |
//! | [`LeastLoaded`] | Smallest accumulated load | Variable request sizes |
//! | [`WeightedRoundRobin`] | Cycle with per-worker quotas | Heterogeneous workers |
//!
//! The set of strategies is closed, so drivers hold a [`Policy`] value and
//! dispatch through a `match` instead of a trait object.

pub mod least_loaded;
pub mod metrics;
pub mod pool;
pub mod round_robin;
pub mod traits;
pub mod weighted_round_robin;

pub use least_loaded::LeastLoaded;
pub use metrics::LoadMetrics;
pub use pool::WorkerPool;
pub use round_robin::RoundRobin;
pub use traits::*;
pub use weighted_round_robin::WeightedRoundRobin;

use serde::{Deserialize, Serialize};

/// Identifies one of the built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    RoundRobin,
    LeastLoaded,
    WeightedRoundRobin,
}

impl PolicyKind {
    /// Look up a policy by name. Accepts `least_connection` as an alias.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "round_robin" => Some(Self::RoundRobin),
            "least_loaded" | "least_connection" => Some(Self::LeastLoaded),
            "weighted_round_robin" => Some(Self::WeightedRoundRobin),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round_robin",
            Self::LeastLoaded => "least_loaded",
            Self::WeightedRoundRobin => "weighted_round_robin",
        }
    }

    /// Construct a fresh instance. `weights` is only read by
    /// [`PolicyKind::WeightedRoundRobin`], for which it is required.
    pub fn build(
        self,
        num_workers: usize,
        weights: Option<&[f64]>,
    ) -> Result<Policy, PolicyError> {
        match self {
            Self::RoundRobin => RoundRobin::new(num_workers).map(Policy::RoundRobin),
            Self::LeastLoaded => LeastLoaded::new(num_workers).map(Policy::LeastLoaded),
            Self::WeightedRoundRobin => {
                let weights = weights.ok_or_else(|| {
                    PolicyError::InvalidConfig(
                        "weighted_round_robin requires one weight per worker".to_string(),
                    )
                })?;
                WeightedRoundRobin::new(num_workers, weights).map(Policy::WeightedRoundRobin)
            }
        }
    }
}

/// List all available built-in policy names.
pub fn available_policies() -> Vec<&'static str> {
    vec!["round_robin", "least_loaded", "weighted_round_robin"]
}

/// Any built-in dispatch policy.
#[derive(Debug, Clone)]
pub enum Policy {
    RoundRobin(RoundRobin),
    LeastLoaded(LeastLoaded),
    WeightedRoundRobin(WeightedRoundRobin),
}

impl Policy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::RoundRobin(_) => PolicyKind::RoundRobin,
            Policy::LeastLoaded(_) => PolicyKind::LeastLoaded,
            Policy::WeightedRoundRobin(_) => PolicyKind::WeightedRoundRobin,
        }
    }
}

impl DispatchPolicy for Policy {
    fn name(&self) -> &str {
        match self {
            Policy::RoundRobin(p) => p.name(),
            Policy::LeastLoaded(p) => p.name(),
            Policy::WeightedRoundRobin(p) => p.name(),
        }
    }

    fn pool(&self) -> &WorkerPool {
        match self {
            Policy::RoundRobin(p) => p.pool(),
            Policy::LeastLoaded(p) => p.pool(),
            Policy::WeightedRoundRobin(p) => p.pool(),
        }
    }

    fn assign(&mut self, load: f64) -> Result<usize, PolicyError> {
        match self {
            Policy::RoundRobin(p) => p.assign(load),
            Policy::LeastLoaded(p) => p.assign(load),
            Policy::WeightedRoundRobin(p) => p.assign(load),
        }
    }

    fn reset(&mut self) {
        match self {
            Policy::RoundRobin(p) => p.reset(),
            Policy::LeastLoaded(p) => p.reset(),
            Policy::WeightedRoundRobin(p) => p.reset(),
        }
    }
}

impl From<RoundRobin> for Policy {
    fn from(p: RoundRobin) -> Self {
        Policy::RoundRobin(p)
    }
}

impl From<LeastLoaded> for Policy {
    fn from(p: LeastLoaded) -> Self {
        Policy::LeastLoaded(p)
    }
}

impl From<WeightedRoundRobin> for Policy {
    fn from(p: WeightedRoundRobin) -> Self {
        Policy::WeightedRoundRobin(p)
    }
}

//! BalanceSim: deterministic simulator for request dispatch policies.
//!
//! This crate provides the driver around the dispatch core in
//! `balancesim-policies`: it generates or loads an ordered sequence of load
//! values, feeds them one at a time into a policy, and reports how evenly the
//! load ended up spread across the worker pool.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐     ┌───────────┐     ┌──────────────┐
//! │Generator │────▶│  Engine   │────▶│   Compare    │
//! │ / Trace  │     │ (replay)  │     │  & Report    │
//! └──────────┘     └─────┬─────┘     └──────┬───────┘
//!                        │                  │
//!                ┌───────┴───────┐   ┌──────┴───────┐
//!                │    Policy     │   │    Export    │
//!                │  (dispatch)   │   │  JSON / CSV  │
//!                └───────┬───────┘   └──────────────┘
//!                        │
//!          ┌─────────────┼─────────────┐
//!          ▼             ▼             ▼
//!    ┌──────────┐  ┌──────────┐  ┌──────────┐
//!    │ Worker 0 │  │ Worker 1 │  │ Worker N │
//!    │   load   │  │   load   │  │   load   │
//!    └──────────┘  └──────────┘  └──────────┘
//! ```

pub mod compare;
pub mod config;
pub mod engine;
pub mod export;
pub mod generator;
pub mod report;
pub mod trace;

// Re-export key types for convenience.
pub use compare::{
    rank_policies, run_comparison, summarize, ComparisonReport, ComparisonRow, PolicyRanking,
};
pub use config::SimConfig;
pub use engine::{EngineError, EngineOptions, InvalidLoadAction, RunReport, SimulationEngine};
pub use generator::{generate_loads, seeded_rng, DistributionStats, LoadDistribution};
pub use trace::{load_sequence, write_sequence, SequenceFormat};

use balancesim_policies::Policy;

/// Replay `loads` through `policy` once and return the report.
pub fn run_simulation(
    policy: Policy,
    loads: &[f64],
    distribution: &str,
    options: EngineOptions,
) -> Result<RunReport, EngineError> {
    let mut engine = SimulationEngine::new(policy, options);
    engine.run(loads, distribution, 0)
}

/// Run the full comparison described by `config` and rank the policies.
pub fn compare_policies(config: &SimConfig) -> Result<ComparisonReport, EngineError> {
    let reports = run_comparison(config, None)?;
    let rows = summarize(&reports);
    let rankings = rank_policies(&rows);
    Ok(ComparisonReport {
        reports,
        rows,
        rankings,
    })
}

//! Multi-run policy comparison and ranking.
//!
//! Every enabled policy sees exactly the same load sequence for a given
//! (run, distribution) pair. Results are averaged per (policy, distribution)
//! and then folded into one overall score per policy.

use crate::config::SimConfig;
use crate::engine::{EngineError, EngineOptions, RunReport, SimulationEngine};
use crate::generator::{generate_loads, seeded_rng};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

const BALANCE_WEIGHT: f64 = 0.5;
const STD_WEIGHT: f64 = 0.3;
const THROUGHPUT_WEIGHT: f64 = 0.2;

/// Averages over all runs of one (policy, distribution) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub policy: String,
    pub distribution: String,
    pub runs: u32,
    pub mean_load: f64,
    pub std_load: f64,
    pub balance_score: f64,
    pub requests_per_second: f64,
    pub execution_time_secs: f64,
}

/// Overall standing of one policy across every distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRanking {
    pub policy: String,
    pub overall_score: f64,
    pub avg_balance_score: f64,
    pub avg_std_load: f64,
    pub avg_requests_per_second: f64,
    pub avg_execution_time_secs: f64,
}

/// Everything produced by one comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub reports: Vec<RunReport>,
    pub rows: Vec<ComparisonRow>,
    pub rankings: Vec<PolicyRanking>,
}

/// Run every enabled policy against every configured distribution,
/// `num_runs` times, from a single seeded random source.
pub fn run_comparison(
    config: &SimConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Vec<RunReport>, EngineError> {
    let options = EngineOptions {
        on_invalid_load: config.simulation.on_invalid_load,
        record_history: config.simulation.record_history,
        cancel,
    };
    let mut engines: Vec<SimulationEngine> = config
        .build_policies()?
        .into_iter()
        .map(|policy| SimulationEngine::new(policy, options.clone()))
        .collect();

    let labels = config.distribution_labels();
    let mut rng = seeded_rng(config.simulation.seed);
    let mut reports = Vec::new();

    info!(
        policies = engines.len(),
        distributions = config.distributions.len(),
        runs = config.simulation.num_runs,
        "starting comparison"
    );

    for run in 0..config.simulation.num_runs {
        info!(run = run + 1, total = config.simulation.num_runs, "run");
        for (distribution, label) in config.distributions.iter().zip(&labels) {
            let loads = generate_loads(distribution, config.simulation.num_requests, &mut rng)?;
            for engine in engines.iter_mut() {
                let report = engine.run(&loads, label, run)?;
                let interrupted = report.interrupted;
                reports.push(report);
                if interrupted {
                    warn!("comparison cancelled");
                    return Ok(reports);
                }
            }
        }
    }
    Ok(reports)
}

/// Average reports per (policy, distribution), in order of first appearance.
pub fn summarize(reports: &[RunReport]) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = Vec::new();

    for report in reports {
        let idx = match rows
            .iter()
            .position(|r| r.policy == report.policy && r.distribution == report.distribution)
        {
            Some(idx) => idx,
            None => {
                rows.push(ComparisonRow {
                    policy: report.policy.clone(),
                    distribution: report.distribution.clone(),
                    runs: 0,
                    mean_load: 0.0,
                    std_load: 0.0,
                    balance_score: 0.0,
                    requests_per_second: 0.0,
                    execution_time_secs: 0.0,
                });
                rows.len() - 1
            }
        };
        let row = &mut rows[idx];
        row.runs += 1;
        row.mean_load += report.metrics.mean_load;
        row.std_load += report.metrics.std_load;
        row.balance_score += report.metrics.balance_score;
        row.requests_per_second += report.metrics.requests_per_second;
        row.execution_time_secs += report.execution_time_secs;
    }

    for row in rows.iter_mut() {
        let n = row.runs as f64;
        row.mean_load /= n;
        row.std_load /= n;
        row.balance_score /= n;
        row.requests_per_second /= n;
        row.execution_time_secs /= n;
    }
    rows
}

/// Rank policies by a weighted blend of balance, spread and throughput.
///
/// `overall = 0.5 * balance + 0.3 * (1 - std / max_std) + 0.2 * (rps / max_rps)`,
/// where the maxima are taken over all rows. Sorted best first.
pub fn rank_policies(rows: &[ComparisonRow]) -> Vec<PolicyRanking> {
    let max_std = rows.iter().map(|r| r.std_load).fold(0.0, f64::max);
    let max_rps = rows.iter().map(|r| r.requests_per_second).fold(0.0, f64::max);
    if max_rps == 0.0 && !rows.is_empty() {
        warn!("all throughput figures are zero; throughput term contributes nothing");
    }

    let mut policies: Vec<&str> = Vec::new();
    for row in rows {
        if !policies.contains(&row.policy.as_str()) {
            policies.push(&row.policy);
        }
    }

    let mut rankings: Vec<PolicyRanking> = policies
        .into_iter()
        .map(|policy| {
            let own: Vec<&ComparisonRow> = rows.iter().filter(|r| r.policy == policy).collect();
            let n = own.len() as f64;
            let avg =
                |f: fn(&ComparisonRow) -> f64| own.iter().map(|&r| f(r)).sum::<f64>() / n;

            let avg_balance_score = avg(|r| r.balance_score);
            let avg_std_load = avg(|r| r.std_load);
            let avg_requests_per_second = avg(|r| r.requests_per_second);
            let avg_execution_time_secs = avg(|r| r.execution_time_secs);

            let normalized_std = if max_std > 0.0 {
                1.0 - avg_std_load / max_std
            } else {
                1.0
            };
            let normalized_rps = if max_rps > 0.0 {
                avg_requests_per_second / max_rps
            } else {
                0.0
            };

            PolicyRanking {
                policy: policy.to_string(),
                overall_score: BALANCE_WEIGHT * avg_balance_score
                    + STD_WEIGHT * normalized_std
                    + THROUGHPUT_WEIGHT * normalized_rps,
                avg_balance_score,
                avg_std_load,
                avg_requests_per_second,
                avg_execution_time_secs,
            }
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rankings
}

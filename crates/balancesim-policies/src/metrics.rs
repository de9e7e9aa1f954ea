//! Load distribution metrics.
//!
//! [`LoadMetrics::compute`] is a pure function of a per-worker load vector,
//! a request count and an elapsed duration. Identical inputs always produce
//! identical output.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Summary of how evenly load is spread across a worker pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadMetrics {
    /// Population mean of worker loads.
    pub mean_load: f64,
    /// Population standard deviation of worker loads (divisor N).
    pub std_load: f64,
    pub max_load: f64,
    pub min_load: f64,
    /// `1 - std_load / mean_load`, or exactly 1.0 when the mean is zero.
    ///
    /// Not clamped: it goes negative once the deviation exceeds the mean.
    pub balance_score: f64,
    /// Jain's fairness index over worker loads, 1.0 when all are zero.
    pub jains_fairness_index: f64,
    /// `total_requests / elapsed`, or 0 when no time has elapsed.
    pub requests_per_second: f64,
    pub total_requests: u64,
}

impl LoadMetrics {
    pub fn compute(loads: &[f64], total_requests: u64, elapsed: Duration) -> Self {
        let elapsed_secs = elapsed.as_secs_f64();
        let requests_per_second = if elapsed_secs > 0.0 {
            total_requests as f64 / elapsed_secs
        } else {
            0.0
        };

        if loads.is_empty() {
            return Self {
                mean_load: 0.0,
                std_load: 0.0,
                max_load: 0.0,
                min_load: 0.0,
                balance_score: 1.0,
                jains_fairness_index: 1.0,
                requests_per_second,
                total_requests,
            };
        }

        let n = loads.len() as f64;
        let mean_load = loads.iter().sum::<f64>() / n;
        let variance = loads.iter().map(|&l| (l - mean_load).powi(2)).sum::<f64>() / n;
        let std_load = variance.sqrt();
        let max_load = loads.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_load = loads.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            mean_load,
            std_load,
            max_load,
            min_load,
            balance_score: balance_score(mean_load, std_load),
            jains_fairness_index: jains_fairness_index(loads),
            requests_per_second,
            total_requests,
        }
    }
}

/// An idle pool (zero mean) is treated as perfectly balanced.
fn balance_score(mean: f64, std: f64) -> f64 {
    if mean > 0.0 {
        1.0 - std / mean
    } else {
        1.0
    }
}

/// Jain's fairness index: (sum(x_i))^2 / (n * sum(x_i^2)).
fn jains_fairness_index(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 1.0;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let sum_sq: f64 = values.iter().map(|v| v * v).sum();
    if sum_sq == 0.0 {
        return 1.0;
    }
    (sum * sum) / (n * sum_sq)
}

/// Integration tests for the simulation driver.
use balancesim_core::config::SimConfig;
use balancesim_core::engine::{EngineError, EngineOptions, InvalidLoadAction, SimulationEngine};
use balancesim_core::{compare_policies, export, run_comparison, run_simulation};
use balancesim_policies::{DispatchPolicy, PolicyError, PolicyKind};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn comparison_config() -> SimConfig {
    SimConfig::from_str(
        r#"
[simulation]
name = "integration-test"
seed = 42
num_runs = 2
num_requests = 300

[cluster]
num_workers = 5
weights = [1, 2, 3, 2, 1]

[[distributions]]
kind = "normal"
mean = 1.0
std = 0.5

[[distributions]]
kind = "exponential"
scale = 1.0

[[distributions]]
kind = "uniform"
low = 0.5
high = 1.5
"#,
    )
    .unwrap()
}

#[test]
fn test_full_comparison() {
    let config = comparison_config();
    let comparison = compare_policies(&config).unwrap();

    // 2 runs x 3 distributions x 3 policies
    assert_eq!(comparison.reports.len(), 18);
    assert_eq!(comparison.rows.len(), 9);
    assert_eq!(comparison.rankings.len(), 3);

    for report in &comparison.reports {
        assert!(!report.interrupted);
        assert_eq!(report.worker_loads.len(), 5);
        assert_eq!(
            report.metrics.total_requests + report.skipped_loads,
            300,
            "{} / {}",
            report.policy,
            report.distribution
        );
        if report.distribution != "Normal Distribution" {
            assert_eq!(report.skipped_loads, 0);
        }
    }
    for row in &comparison.rows {
        assert_eq!(row.runs, 2);
    }
    let scores: Vec<f64> = comparison
        .rankings
        .iter()
        .map(|r| r.overall_score)
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_every_policy_sees_the_same_sequence() {
    let config = comparison_config();
    let reports = run_comparison(&config, None).unwrap();

    // Same (run, distribution) means the same loads, so the same total.
    for chunk in reports.chunks(3) {
        let totals: Vec<f64> = chunk
            .iter()
            .map(|r| r.worker_loads.iter().sum::<f64>())
            .collect();
        assert!(chunk.iter().all(|r| r.distribution == chunk[0].distribution));
        assert!((totals[0] - totals[1]).abs() < 1e-9);
        assert!((totals[0] - totals[2]).abs() < 1e-9);
    }
}

#[test]
fn test_comparison_is_reproducible() {
    let config = comparison_config();
    let a = run_comparison(&config, None).unwrap();
    let b = run_comparison(&config, None).unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.worker_loads, y.worker_loads);
        assert_eq!(x.worker_requests, y.worker_requests);
        assert_eq!(x.metrics.balance_score, y.metrics.balance_score);
    }
}

#[test]
fn test_least_loaded_most_balanced_on_uniform() {
    let config = comparison_config();
    let comparison = compare_policies(&config).unwrap();
    let uniform: Vec<_> = comparison
        .rows
        .iter()
        .filter(|r| r.distribution == "Uniform Distribution")
        .collect();
    let best = uniform
        .iter()
        .max_by(|a, b| a.balance_score.partial_cmp(&b.balance_score).unwrap())
        .unwrap();
    assert_eq!(best.policy, "least_loaded");
}

#[test]
fn test_same_kind_distributions_get_separate_rows() {
    let config = SimConfig::from_str(
        r#"
[simulation]
num_runs = 2
num_requests = 200

[cluster]
num_workers = 4

[policies]
enabled = ["round_robin"]

[[distributions]]
kind = "uniform"
low = 0.5
high = 1.5

[[distributions]]
kind = "uniform"
low = 100.0
high = 200.0
"#,
    )
    .unwrap();
    let comparison = compare_policies(&config).unwrap();

    assert_eq!(comparison.reports.len(), 4);
    assert_eq!(comparison.rows.len(), 2);
    let narrow = &comparison.rows[0];
    let wide = &comparison.rows[1];
    assert_eq!(narrow.distribution, "Uniform Distribution (low=0.5, high=1.5)");
    assert_eq!(wide.distribution, "Uniform Distribution (low=100, high=200)");
    assert_eq!(narrow.runs, 2);
    assert_eq!(wide.runs, 2);
    // 200 loads over 4 workers: 50 per worker, each load inside its range.
    assert!(narrow.mean_load >= 25.0 && narrow.mean_load <= 75.0);
    assert!(wide.mean_load >= 5000.0 && wide.mean_load <= 10000.0);
}

#[test]
fn test_abort_surfaces_invalid_load() {
    let mut config = comparison_config();
    config.simulation.on_invalid_load = InvalidLoadAction::Abort;
    // N(1, 0.5) over 300 samples produces negatives with this seed.
    match run_comparison(&config, None) {
        Err(EngineError::Policy(PolicyError::InvalidLoad(v))) => assert!(v < 0.0),
        other => panic!("Expected InvalidLoad, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn test_cancelled_comparison_stops_early() {
    let config = comparison_config();
    let flag = Arc::new(AtomicBool::new(true));
    let reports = run_comparison(&config, Some(flag)).unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].interrupted);
    assert_eq!(reports[0].metrics.total_requests, 0);
}

#[test]
fn test_run_simulation_weighted() {
    let policy = PolicyKind::WeightedRoundRobin
        .build(3, Some(&[3.0, 1.0, 2.0][..]))
        .unwrap();
    let loads = vec![1.0; 600];
    let report = run_simulation(policy, &loads, "constant", EngineOptions::default()).unwrap();
    assert_eq!(report.worker_requests, vec![300, 100, 200]);
    assert_eq!(report.worker_loads, vec![300.0, 100.0, 200.0]);
}

#[test]
fn test_engine_keeps_policy_configuration() {
    let policy = PolicyKind::WeightedRoundRobin
        .build(2, Some(&[2.0, 1.0][..]))
        .unwrap();
    let mut engine = SimulationEngine::new(policy, EngineOptions::default());
    engine.run(&[1.0, 1.0, 1.0], "a", 0).unwrap();
    engine.run(&[1.0], "a", 1).unwrap();
    let policy = engine.into_policy();
    assert_eq!(policy.num_workers(), 2);
    assert_eq!(policy.current_loads(), &[1.0, 0.0]);
}

#[test]
fn test_export_round_trip_files() {
    let config = comparison_config();
    let comparison = compare_policies(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();

    export::write_all(&comparison.reports, dir.path()).unwrap();

    let json = std::fs::read_to_string(dir.path().join("results.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), comparison.reports.len());

    let analysis = std::fs::read_to_string(dir.path().join("analysis_results.csv")).unwrap();
    assert_eq!(analysis.lines().count(), comparison.reports.len() + 1);

    let workers = std::fs::read_to_string(dir.path().join("worker_loads.csv")).unwrap();
    assert_eq!(workers.lines().count(), comparison.reports.len() * 5 + 1);
}

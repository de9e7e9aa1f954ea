/// Integration tests for the dispatch policies and their load metrics.
use balancesim_core::generator::{generate_loads, seeded_rng, LoadDistribution};
use balancesim_policies::*;

fn mixed_loads(n: usize) -> Vec<f64> {
    let dist = LoadDistribution::Exponential { scale: 1.0 };
    generate_loads(&dist, n, &mut seeded_rng(42)).unwrap()
}

fn all_policies(num_workers: usize) -> Vec<Policy> {
    let weights: Vec<f64> = (1..=num_workers).map(|w| w as f64).collect();
    available_policies()
        .into_iter()
        .map(|name| {
            PolicyKind::from_name(name)
                .unwrap()
                .build(num_workers, Some(weights.as_slice()))
                .unwrap()
        })
        .collect()
}

#[test]
fn test_conservation_every_policy() {
    let loads = mixed_loads(2_000);
    let expected: f64 = loads.iter().sum();

    for mut policy in all_policies(5) {
        for (i, &load) in loads.iter().enumerate() {
            let worker = policy.assign(load).unwrap();
            assert!(worker < 5, "{} returned worker {}", policy.name(), worker);
            assert_eq!(policy.total_requests(), i as u64 + 1);
        }
        let total: f64 = policy.current_loads().iter().sum();
        assert!(
            (total - expected).abs() < 1e-6,
            "{}: {} != {}",
            policy.name(),
            total,
            expected
        );
        assert_eq!(
            policy.pool().request_counts().iter().sum::<u64>(),
            loads.len() as u64
        );
        assert_eq!(policy.history().len(), loads.len());
    }
}

#[test]
fn test_round_robin_fairness_multiple_of_n() {
    let mut rr = RoundRobin::new(4).unwrap();
    let loads = mixed_loads(4 * 25);
    for (i, &load) in loads.iter().enumerate() {
        assert_eq!(rr.assign(load).unwrap(), i % 4);
    }
    assert_eq!(rr.pool().request_counts(), &[25, 25, 25, 25]);
}

#[test]
fn test_round_robin_scenario() {
    let mut rr = RoundRobin::new(3).unwrap();
    for load in [1.0, 2.0, 3.0, 4.0] {
        rr.assign(load).unwrap();
    }
    assert_eq!(rr.current_loads(), &[5.0, 2.0, 3.0]);
    assert_eq!(rr.metrics().total_requests, 4);
    assert_eq!(rr.cursor(), 1);
}

#[test]
fn test_least_loaded_scenario() {
    let mut ll = LeastLoaded::new(3).unwrap();
    assert_eq!(ll.assign(5.0).unwrap(), 0);
    assert_eq!(ll.current_loads(), &[5.0, 0.0, 0.0]);
    assert_eq!(ll.assign(1.0).unwrap(), 1);
    assert_eq!(ll.current_loads(), &[5.0, 1.0, 0.0]);
    assert_eq!(ll.assign(1.0).unwrap(), 2);
    assert_eq!(ll.current_loads(), &[5.0, 1.0, 1.0]);
    assert_eq!(ll.assign(1.0).unwrap(), 1);
    assert_eq!(ll.current_loads(), &[5.0, 2.0, 1.0]);
}

#[test]
fn test_least_loaded_greedy_bound() {
    let mut ll = LeastLoaded::new(6).unwrap();
    for load in mixed_loads(500) {
        let before = ll.current_loads().to_vec();
        let worker = ll.assign(load).unwrap();
        let min = before.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(before[worker], min);
        assert_eq!(before.iter().position(|&l| l == min), Some(worker));
    }
}

#[test]
fn test_least_loaded_beats_round_robin_on_makespan() {
    let loads = mixed_loads(5_000);
    let mut rr = RoundRobin::new(5).unwrap();
    let mut ll = LeastLoaded::new(5).unwrap();
    for &load in &loads {
        rr.assign(load).unwrap();
        ll.assign(load).unwrap();
    }
    assert!(ll.metrics().max_load <= rr.metrics().max_load);
    assert!(ll.metrics().balance_score >= rr.metrics().balance_score);
}

#[test]
fn test_weighted_proportionality() {
    let mut wrr = WeightedRoundRobin::new(3, &[3.0, 1.0, 2.0]).unwrap();
    let n = 10_000;
    for _ in 0..n {
        wrr.assign(1.0).unwrap();
    }
    let counts = wrr.pool().request_counts();
    let expected = [3.0 / 6.0, 1.0 / 6.0, 2.0 / 6.0];
    for (count, share) in counts.iter().zip(expected) {
        let observed = *count as f64 / n as f64;
        assert!(
            (observed - share).abs() < 0.01,
            "observed {} expected {}",
            observed,
            share
        );
    }
}

#[test]
fn test_reset_idempotence() {
    for mut policy in all_policies(4) {
        for load in mixed_loads(37) {
            policy.assign(load).unwrap();
        }
        policy.reset();
        assert_eq!(policy.current_loads(), &[0.0; 4]);
        assert_eq!(policy.metrics().total_requests, 0);
        assert!(policy.history().is_empty());

        // A second reset leaves the same state.
        policy.reset();
        assert_eq!(policy.current_loads(), &[0.0; 4]);
        assert_eq!(policy.num_workers(), 4);
    }
}

#[test]
fn test_reset_replays_identically() {
    let loads = mixed_loads(100);
    for mut policy in all_policies(3) {
        let first: Vec<usize> = loads.iter().map(|&l| policy.assign(l).unwrap()).collect();
        policy.reset();
        let second: Vec<usize> = loads.iter().map(|&l| policy.assign(l).unwrap()).collect();
        assert_eq!(first, second, "{} is not deterministic", policy.name());
    }
}

#[test]
fn test_balance_score_zero_loads() {
    for policy in all_policies(3) {
        assert_eq!(policy.metrics().balance_score, 1.0);
    }
    let m = LoadMetrics::compute(&[0.0; 7], 0, std::time::Duration::ZERO);
    assert_eq!(m.balance_score, 1.0);
}

#[test]
fn test_zero_loads_still_counted() {
    for mut policy in all_policies(3) {
        policy.assign(0.0).unwrap();
        assert_eq!(policy.total_requests(), 1);
        assert_eq!(policy.metrics().balance_score, 1.0);
    }
}

#[test]
fn test_configuration_validation() {
    assert!(matches!(
        WeightedRoundRobin::new(3, &[1.0, -1.0, 2.0]),
        Err(PolicyError::InvalidConfig(_))
    ));
    assert!(matches!(
        WeightedRoundRobin::new(3, &[1.0, 2.0]),
        Err(PolicyError::InvalidConfig(_))
    ));
    for name in available_policies() {
        let kind = PolicyKind::from_name(name).unwrap();
        assert!(kind.build(0, Some(&[][..])).is_err(), "{} accepted N=0", name);
    }
}

#[test]
fn test_invalid_loads_rejected_without_side_effects() {
    for mut policy in all_policies(3) {
        policy.assign(1.0).unwrap();
        for bad in [-0.001, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(policy.assign(bad), Err(PolicyError::InvalidLoad(_))));
        }
        assert_eq!(policy.total_requests(), 1);
        assert_eq!(policy.current_loads().iter().sum::<f64>(), 1.0);
    }
}

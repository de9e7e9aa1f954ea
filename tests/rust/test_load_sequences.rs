/// Integration tests for load-sequence files.
use balancesim_core::engine::EngineOptions;
use balancesim_core::generator::{generate_loads, seeded_rng, LoadDistribution};
use balancesim_core::trace::{self, SequenceFormat};
use balancesim_policies::PolicyKind;

#[test]
fn test_write_and_read_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loads.txt");
    let loads = generate_loads(
        &LoadDistribution::LogNormal {
            mu: 0.0,
            sigma: 0.5,
        },
        250,
        &mut seeded_rng(9),
    )
    .unwrap();

    trace::write_sequence(&loads, &path, SequenceFormat::Text).unwrap();
    let loaded = trace::load_sequence(&path, "text").unwrap();

    // `{}` on f64 prints the shortest representation that parses back exactly.
    assert_eq!(loaded, loads);
}

#[test]
fn test_write_and_read_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loads.json");
    let loads = vec![0.0, 1.25, 3.5, 0.125];

    trace::write_sequence(&loads, &path, SequenceFormat::Json).unwrap();
    assert_eq!(trace::load_sequence(&path, "json").unwrap(), loads);
}

#[test]
fn test_replayed_file_matches_in_memory_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loads.txt");
    let loads = generate_loads(
        &LoadDistribution::Uniform {
            low: 0.5,
            high: 1.5,
        },
        120,
        &mut seeded_rng(1),
    )
    .unwrap();
    trace::write_sequence(&loads, &path, SequenceFormat::Text).unwrap();
    let replayed = trace::load_sequence(&path, "text").unwrap();

    let run = |seq: &[f64]| {
        let policy = PolicyKind::LeastLoaded.build(4, None).unwrap();
        balancesim_core::run_simulation(policy, seq, "file", EngineOptions::default()).unwrap()
    };
    assert_eq!(run(&loads).worker_loads, run(&replayed).worker_loads);
}

#[test]
fn test_missing_file() {
    let path = std::path::Path::new("does/not/exist.txt");
    assert!(matches!(
        trace::load_sequence(path, "text"),
        Err(trace::TraceError::Io(_))
    ));
}

#[test]
fn test_invalid_format() {
    let path = std::path::Path::new("loads.txt");
    assert!(matches!(
        trace::load_sequence(path, "parquet"),
        Err(trace::TraceError::UnsupportedFormat(_))
    ));
}

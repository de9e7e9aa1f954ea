//! JSON and CSV export of run results for downstream plotting.

use crate::engine::RunReport;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One line of the analysis CSV: a single run of one policy.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRow<'a> {
    pub policy: &'a str,
    pub distribution: &'a str,
    pub run: u32,
    pub mean_load: f64,
    pub std_load: f64,
    pub balance_score: f64,
    pub requests_per_second: f64,
    pub execution_time_secs: f64,
}

impl<'a> From<&'a RunReport> for AnalysisRow<'a> {
    fn from(r: &'a RunReport) -> Self {
        Self {
            policy: &r.policy,
            distribution: &r.distribution,
            run: r.run,
            mean_load: r.metrics.mean_load,
            std_load: r.metrics.std_load,
            balance_score: r.metrics.balance_score,
            requests_per_second: r.metrics.requests_per_second,
            execution_time_secs: r.execution_time_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct WorkerLoadRow<'a> {
    policy: &'a str,
    distribution: &'a str,
    run: u32,
    worker: usize,
    load: f64,
    requests: u64,
}

/// Write any serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write one CSV row per run.
pub fn write_analysis_csv<W: Write>(reports: &[RunReport], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for report in reports {
        csv_writer.serialize(AnalysisRow::from(report))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write one CSV row per (run, worker) with its final load and request count.
pub fn write_worker_loads_csv<W: Write>(
    reports: &[RunReport],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for report in reports {
        for (worker, (&load, &requests)) in report
            .worker_loads
            .iter()
            .zip(&report.worker_requests)
            .enumerate()
        {
            csv_writer.serialize(WorkerLoadRow {
                policy: &report.policy,
                distribution: &report.distribution,
                run: report.run,
                worker,
                load,
                requests,
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write `results.json`, `analysis_results.csv` and `worker_loads.csv` into `dir`.
pub fn write_all(reports: &[RunReport], dir: &Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(dir)?;
    write_json(reports, &dir.join("results.json"))?;
    write_analysis_csv(
        reports,
        std::fs::File::create(dir.join("analysis_results.csv"))?,
    )?;
    write_worker_loads_csv(reports, std::fs::File::create(dir.join("worker_loads.csv"))?)?;
    Ok(())
}

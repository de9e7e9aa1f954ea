//! Console report formatting.

use crate::compare::{ComparisonRow, PolicyRanking};
use crate::engine::RunReport;
use crate::generator::DistributionStats;

/// Format a single run as a pretty-printed table string.
pub fn format_table(report: &RunReport) -> String {
    let m = &report.metrics;
    let mut out = String::new();
    out.push_str(&format!(
        "\n{:=<70}\n",
        format!("  {} / {} Results  ", report.policy, report.distribution)
    ));
    out.push_str(&format!(
        "  Requests: {} ({} skipped){} | Time: {:.4}s\n",
        m.total_requests,
        report.skipped_loads,
        if report.interrupted { " [interrupted]" } else { "" },
        report.execution_time_secs,
    ));
    out.push_str(&format!("{:-<70}\n", "  Load  "));
    out.push_str(&format!(
        "  Mean={:>10.3}  Std={:>10.3}  Min={:>10.3}  Max={:>10.3}\n",
        m.mean_load, m.std_load, m.min_load, m.max_load
    ));
    out.push_str(&format!("{:-<70}\n", "  Fairness  "));
    out.push_str(&format!(
        "  Balance score: {:.4}  Jain's index: {:.4}\n",
        m.balance_score, m.jains_fairness_index
    ));
    out.push_str(&format!("{:-<70}\n", "  Throughput  "));
    out.push_str(&format!("  Requests/sec: {:.0}\n", m.requests_per_second));
    out.push_str(&format!("{:-<70}\n", "  Workers  "));
    for (idx, (load, requests)) in report
        .worker_loads
        .iter()
        .zip(&report.worker_requests)
        .enumerate()
    {
        out.push_str(&format!(
            "  Worker {:>3}: load={:>12.3}  requests={:>8}\n",
            idx, load, requests
        ));
    }
    out.push_str(&format!("{:=<70}\n", ""));
    out
}

/// Format averaged (policy, distribution) rows as a comparison table.
pub fn format_comparison_table(rows: &[ComparisonRow]) -> String {
    if rows.is_empty() {
        return String::from("No results to compare.\n");
    }

    let mut out = String::new();
    out.push_str(&format!("\n{:=<100}\n", "  Policy Comparison  "));
    out.push_str(&format!(
        "{:<22} {:<26} {:>9} {:>9} {:>9} {:>12} {:>10}\n",
        "Policy", "Distribution", "Mean", "Std", "Balance", "Req/s", "Time (s)"
    ));
    out.push_str(&format!("{:-<100}\n", ""));

    for r in rows {
        out.push_str(&format!(
            "{:<22} {:<26} {:>9.3} {:>9.3} {:>9.4} {:>12.0} {:>10.4}\n",
            r.policy,
            r.distribution,
            r.mean_load,
            r.std_load,
            r.balance_score,
            r.requests_per_second,
            r.execution_time_secs,
        ));
    }
    out.push_str(&format!("{:=<100}\n", ""));
    out
}

/// Format the overall ranking followed by per-policy detail.
pub fn format_ranking(rankings: &[PolicyRanking]) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{:=<80}\n", ""));
    out.push_str("DISPATCH POLICY PERFORMANCE SUMMARY\n");
    out.push_str(&format!("{:=<80}\n", ""));

    out.push_str("\nOVERALL RANKING:\n");
    out.push_str(&format!("{:-<50}\n", ""));
    for (i, r) in rankings.iter().enumerate() {
        out.push_str(&format!("{}. {}: {:.3}\n", i + 1, r.policy, r.overall_score));
    }

    out.push_str("\nDETAILED METRICS BY POLICY:\n");
    out.push_str(&format!("{:-<50}\n", ""));
    for r in rankings {
        out.push_str(&format!("\n{}:\n", r.policy));
        out.push_str(&format!(
            "  - Average Balance Score: {:.3}\n",
            r.avg_balance_score
        ));
        out.push_str(&format!("  - Average Load Std Dev: {:.3}\n", r.avg_std_load));
        out.push_str(&format!(
            "  - Average Throughput: {:.0} req/s\n",
            r.avg_requests_per_second
        ));
        out.push_str(&format!(
            "  - Average Execution Time: {:.4}s\n",
            r.avg_execution_time_secs
        ));
    }
    out.push_str(&format!("\n{:=<80}\n", ""));
    out
}

/// Format statistics of a generated load sequence.
pub fn format_distribution_stats(label: &str, stats: &DistributionStats) -> String {
    format!(
        "{} - Mean: {:.3}, Std: {:.3}, Min: {:.3}, Max: {:.3}, Negative values: {} of {}\n",
        label, stats.mean, stats.std, stats.min, stats.max, stats.negative_count, stats.count
    )
}

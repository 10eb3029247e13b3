//! Run summary formatting.

use chrono::Utc;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::metrics::RequestTotals;

/// Final summary of one workload run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub timestamp: String,
    pub workload: String,
    pub actors: u32,
    #[serde(flatten)]
    pub totals: RequestTotals,
}

impl RunSummary {
    pub fn new(workload: &str, actors: u32, totals: RequestTotals) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            workload: workload.to_string(),
            actors,
            totals,
        }
    }

    fn success_rate(&self) -> f64 {
        if self.totals.total == 0 {
            return 0.0;
        }
        (self.totals.successes as f64 / self.totals.total as f64) * 100.0
    }
}

/// Formats run summaries for output.
pub struct RunReport;

impl RunReport {
    /// Format a summary as a console table.
    pub fn format_table(summary: &RunSummary) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![format!("Workload Results: {}", summary.workload)]);

        table.add_row(vec![
            "Duration:",
            &format!("{:.1}s", summary.totals.duration_secs),
        ]);
        table.add_row(vec!["Actors:", &format!("{}", summary.actors)]);
        table.add_row(vec![
            "Total Requests:",
            &format!("{}", summary.totals.total),
        ]);
        table.add_row(vec![
            "Failed Requests:",
            &format!("{}", summary.totals.failures),
        ]);
        table.add_row(vec![
            "Success Rate:",
            &format!("{:.1}%", summary.success_rate()),
        ]);
        table.add_row(vec![
            "Requests/sec:",
            &format!("{:.1}", summary.totals.requests_per_second),
        ]);

        table.add_row(vec!["", ""]);
        table.add_row(vec!["Latency (ms)", "p50 / p90 / p95 / p99 / max"]);
        table.add_row(vec![
            "",
            &format!(
                "{:.1} / {:.1} / {:.1} / {:.1} / {:.1}",
                summary.totals.latency_p50_ms,
                summary.totals.latency_p90_ms,
                summary.totals.latency_p95_ms,
                summary.totals.latency_p99_ms,
                summary.totals.latency_max_ms
            ),
        ]);

        table.to_string()
    }

    /// Format a summary as JSON.
    pub fn format_json(summary: &RunSummary) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(summary)?)
    }

    /// Format a summary as a CSV row.
    pub fn format_csv(summary: &RunSummary) -> String {
        format!(
            "{},{},{},{},{},{},{:.1},{:.1},{:.1},{:.1}",
            summary.timestamp,
            summary.workload,
            summary.actors,
            summary.totals.total,
            summary.totals.successes,
            summary.totals.failures,
            summary.totals.requests_per_second,
            summary.totals.latency_p50_ms,
            summary.totals.latency_p90_ms,
            summary.totals.latency_p99_ms
        )
    }

    /// CSV header row.
    pub fn csv_header() -> &'static str {
        "timestamp,workload,actors,total,successes,failures,rps,p50,p90,p99"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RequestCounters;

    fn summary() -> RunSummary {
        let counters = RequestCounters::new();
        counters.start().success();
        counters.start().failure();
        RunSummary::new("smoke", 2, counters.snapshot())
    }

    #[test]
    fn csv_row_matches_header_arity() {
        let row = RunReport::format_csv(&summary());
        assert_eq!(
            row.split(',').count(),
            RunReport::csv_header().split(',').count()
        );
    }

    #[test]
    fn json_is_parseable_and_flat() {
        let json = RunReport::format_json(&summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["workload"], "smoke");
        assert_eq!(value["actors"], 2);
        assert_eq!(value["total"], 2);
        assert_eq!(value["successes"], 1);
    }

    #[test]
    fn table_names_the_workload() {
        let table = RunReport::format_table(&summary());
        assert!(table.contains("smoke"));
        assert!(table.contains("Success Rate"));
    }

    #[test]
    fn success_rate_of_empty_run_is_zero() {
        let empty = RunSummary::new("empty", 1, RequestCounters::new().snapshot());
        assert_eq!(empty.success_rate(), 0.0);
    }
}

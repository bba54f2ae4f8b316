//! Batch validation of imported rows.
//!
//! Runs a [`RowValidator`] over every row of an import, partitions the
//! rows into accepted and rejected sets without halting on the first
//! failure, and decides whether the import as a whole should go ahead.
//! An import aborts when it has no rows or when the share of rejected
//! rows exceeds the configured threshold.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::{RawRow, VulnerabilityRecord};
use crate::progress::{ValidationProgressEvent, ValidationProgressReporter, PROGRESS_INTERVAL};
use crate::row::RowValidator;

#[derive(Debug, Clone, Serialize)]
pub struct AcceptedRow {
    /// 1-based position in the input.
    pub row: usize,
    pub record: VulnerabilityRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    /// 1-based position in the input.
    pub row: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub total_rows: usize,
    pub accepted: Vec<AcceptedRow>,
    pub rejected: Vec<RejectedRow>,
    /// Why the import as a whole should not proceed, if it should not.
    pub aborted: Option<String>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.aborted.is_none()
    }

    pub fn invalid_pct(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.rejected.len() as f64 / self.total_rows as f64) * 100.0
        }
    }

    /// One user-facing line per field error, tagged with its row number.
    pub fn error_messages(&self) -> Vec<String> {
        self.rejected
            .iter()
            .flat_map(|r| {
                r.errors
                    .iter()
                    .map(move |e| format!("Invalid data in row {}: {}", r.row, e))
            })
            .collect()
    }
}

/// Validate every row. `threshold_pct` is the largest rejected share
/// (0..=100) that still lets the import proceed.
pub fn validate_batch(
    validator: &RowValidator,
    rows: &[RawRow],
    threshold_pct: f64,
    source: &str,
    progress: &dyn ValidationProgressReporter,
) -> BatchReport {
    let total = rows.len();
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (i, raw) in rows.iter().enumerate() {
        let row = i + 1;
        let check = validator.check(raw);
        match check.record {
            Some(record) if check.result.is_valid() => accepted.push(AcceptedRow { row, record }),
            _ => {
                debug!(row, errors = ?check.result.errors(), "row rejected");
                rejected.push(RejectedRow {
                    row,
                    errors: check.result.errors().to_vec(),
                });
            }
        }

        if row % PROGRESS_INTERVAL == 0 || row == total {
            progress.report(ValidationProgressEvent::Validating {
                source: source.to_string(),
                n: row as u64,
                total: total as u64,
            });
        }
    }

    let mut report = BatchReport {
        total_rows: total,
        accepted,
        rejected,
        aborted: None,
    };

    if total == 0 {
        report.aborted = Some("No rows provided".to_string());
    } else if report.invalid_pct() > threshold_pct {
        report.aborted = Some(format!(
            "Too many invalid rows ({:.1}%). Import aborted.",
            report.invalid_pct()
        ));
    }

    if let Some(reason) = &report.aborted {
        warn!(source, reason = %reason, "batch aborted");
    }
    info!(
        source,
        total,
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        "batch validated"
    );

    progress.report(ValidationProgressEvent::Finished {
        source: source.to_string(),
        accepted: report.accepted.len() as u64,
        rejected: report.rejected.len() as u64,
    });

    report
}

/// Read rows from a JSON array of objects or from newline-delimited JSON.
///
/// `.ndjson`/`.jsonl` files, and any file whose first non-blank character
/// is not `[`, are read line by line; blank lines are skipped.
pub fn load_rows(path: &Path) -> Result<Vec<RawRow>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rows file: {}", path.display()))?;

    let line_delimited = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ndjson") | Some("jsonl")
    ) || !content.trim_start().starts_with('[');

    if line_delimited {
        parse_ndjson(&content).with_context(|| format!("Failed to parse {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {} as a JSON array of rows", path.display()))
    }
}

fn parse_ndjson(content: &str) -> Result<Vec<RawRow>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<RawRow>(line)
                .with_context(|| format!("line {}: expected a JSON object", i + 1))
        })
        .collect()
}

/// Print a human-readable summary of a report to stdout.
pub fn print_summary(report: &BatchReport, source: &str) {
    println!("HexTrackr Batch Report");
    println!("======================");
    println!();
    println!("  Source:      {}", source);
    println!("  Rows:        {}", report.total_rows);
    println!("  Accepted:    {}", report.accepted.len());
    println!(
        "  Rejected:    {} ({:.1}%)",
        report.rejected.len(),
        report.invalid_pct()
    );

    if !report.rejected.is_empty() {
        println!();
        println!("  {:>6}   {}", "ROW", "ERRORS");
        println!("  {}", "-".repeat(60));
        for r in &report.rejected {
            println!("  {:>6}   {}", r.row, r.errors.join("; "));
        }
    }

    println!();
    match &report.aborted {
        Some(reason) => println!("  Status:      ABORTED ({})", reason),
        None => println!("  Status:      ok"),
    }
}

/// Serialize a report as pretty JSON to `output`, or stdout when `None`.
pub fn write_json(report: &BatchReport, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            eprintln!(
                "Wrote report for {} rows ({} rejected) to {}",
                report.total_rows,
                report.rejected.len(),
                path.display()
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

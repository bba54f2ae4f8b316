//! # HexTrackr Validate CLI (`hexval`)
//!
//! Runs the validation core over import files and single values.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hexval check <rows>` | Validate a JSON / NDJSON export and print a batch report |
//! | `hexval row '<json>'` | Validate one row and print the result as JSON |
//! | `hexval field <kind> <value>` | Check one value with one field validator |
//! | `hexval names [values]` | Normalize `LAST,FIRST` supervisor/tech names |
//! | `hexval date [values]` | Normalize dates to `YYYY-MM-DD` |
//! | `hexval hostname [values]` | Normalize hostnames to their short form |
//!
//! `names`, `date` and `hostname` read one value per stdin line when no
//! values are given, so they can sit in a pipeline.
//!
//! Set `HEXVAL_LOG=debug` to see per-row rejection logs on stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::BufRead;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use hextrackr_validate::batch;
use hextrackr_validate::config;
use hextrackr_validate::date::DateNormalizer;
use hextrackr_validate::models::{FieldValue, RawRow};
use hextrackr_validate::names::normalize_person_name;
use hextrackr_validate::progress::ProgressMode;
use hextrackr_validate::row::RowValidator;
use hextrackr_validate::validate;

/// HexTrackr Validate: checks and normalizes vulnerability import data.
#[derive(Parser)]
#[command(
    name = "hexval",
    about = "Validate and normalize HexTrackr vulnerability import data",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/hexval.toml` when that file exists; built-in
    /// defaults are used otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every row of an import file.
    ///
    /// Accepts a JSON array of objects or newline-delimited JSON objects.
    /// Rejected rows never stop the batch; the import is reported as
    /// aborted when too many rows fail.
    Check {
        /// Rows file (`.json`, `.ndjson`, `.jsonl`).
        path: PathBuf,

        /// Report format.
        #[arg(long, value_enum, default_value = "human")]
        format: ReportFormat,

        /// Write the JSON report to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit non-zero when any row is rejected, not only on abort.
        #[arg(long)]
        strict: bool,

        /// Progress on stderr.
        #[arg(long, value_enum, default_value = "auto")]
        progress: ProgressArg,
    },

    /// Validate a single row given as a JSON object.
    Row {
        /// Row as JSON, e.g. `{"cve": "CVE-2024-0001", "vpr": 9.8}`.
        json: String,
    },

    /// Check one value with one field validator.
    Field {
        #[arg(value_enum)]
        kind: FieldKind,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Normalize supervisor/tech names (`LAST,FIRST; ...` to `First Last; ...`).
    Names { values: Vec<String> },

    /// Normalize dates to `YYYY-MM-DD`.
    Date { values: Vec<String> },

    /// Normalize hostnames (lowercase, domain stripped, IPv4 kept whole).
    Hostname { values: Vec<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Human,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProgressArg {
    Auto,
    Off,
    Human,
    Json,
}

impl ProgressArg {
    fn mode(self) -> ProgressMode {
        match self {
            ProgressArg::Auto => ProgressMode::default_for_tty(),
            ProgressArg::Off => ProgressMode::Off,
            ProgressArg::Human => ProgressMode::Human,
            ProgressArg::Json => ProgressMode::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldKind {
    Cve,
    Ip,
    Hostname,
    Severity,
    Vpr,
    Cvss,
    State,
}

impl FieldKind {
    fn check(self, value: &str) -> bool {
        match self {
            FieldKind::Cve => validate::is_valid_cve(value),
            FieldKind::Ip => validate::is_valid_ip(value),
            FieldKind::Hostname => validate::is_valid_hostname(value),
            FieldKind::Severity => validate::is_valid_severity(value),
            FieldKind::Vpr => validate::is_valid_vpr(&FieldValue::from(value)),
            FieldKind::Cvss => validate::is_valid_cvss(&FieldValue::from(value)),
            FieldKind::State => validate::is_valid_state(value),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("HEXVAL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Arguments if any were given, otherwise non-blank stdin lines.
fn values_or_stdin(values: Vec<String>) -> Result<Vec<String>> {
    if !values.is_empty() {
        return Ok(values);
    }
    let stdin = std::io::stdin();
    let mut out = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if !line.trim().is_empty() {
            out.push(line);
        }
    }
    Ok(out)
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let cfg = config::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Check {
            path,
            format,
            output,
            strict,
            progress,
        } => {
            let validator = RowValidator::from_config(&cfg)?;
            let rows = batch::load_rows(&path)?;
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());

            let reporter = progress.mode().reporter();
            let report = batch::validate_batch(
                &validator,
                &rows,
                cfg.import.abort_threshold_pct,
                &source,
                reporter.as_ref(),
            );

            match (format, output.as_deref()) {
                (ReportFormat::Human, None) => batch::print_summary(&report, &source),
                (_, out) => batch::write_json(&report, out)?,
            }

            if let Some(reason) = &report.aborted {
                bail!("{}", reason);
            }
            if strict && !report.rejected.is_empty() {
                bail!("{} row(s) rejected", report.rejected.len());
            }
        }
        Commands::Row { json } => {
            let row: RawRow =
                serde_json::from_str(&json).context("Row must be a JSON object")?;
            let validator = RowValidator::from_config(&cfg)?;
            let check = validator.check(&row);
            let out = serde_json::json!({
                "valid": check.result.is_valid(),
                "errors": check.result.errors(),
                "record": check.record,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            if !check.result.is_valid() {
                bail!("row is invalid");
            }
        }
        Commands::Field { kind, value } => {
            if kind.check(&value) {
                println!("valid");
            } else {
                println!("invalid");
                bail!("invalid value: '{}'", value);
            }
        }
        Commands::Names { values } => {
            for v in values_or_stdin(values)? {
                println!("{}", normalize_person_name(&v));
            }
        }
        Commands::Date { values } => {
            let dates = DateNormalizer::new(cfg.dates.day_first);
            let mut failed = 0usize;
            for v in values_or_stdin(values)? {
                match dates.normalize(&v) {
                    Ok(d) => println!("{}", d),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                bail!("{} date(s) could not be parsed", failed);
            }
        }
        Commands::Hostname { values } => {
            for v in values_or_stdin(values)? {
                println!("{}", validate::normalize_hostname(&v));
            }
        }
    }

    Ok(())
}

//! Batch validation progress reporting.
//!
//! Reports observable progress during `hexval check` so users see how far a
//! large export has got and what the final split was. Progress is emitted on
//! **stderr** so stdout remains parseable for scripts.

use std::io::Write;

/// How often (in rows) a `Validating` event is emitted.
pub const PROGRESS_INTERVAL: usize = 500;

/// A single progress event for a batch check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationProgressEvent {
    /// n rows validated out of total.
    Validating { source: String, n: u64, total: u64 },
    /// Batch done.
    Finished {
        source: String,
        accepted: u64,
        rejected: u64,
    },
}

/// Receives batch progress. Implementations write to stderr (human or JSON).
pub trait ValidationProgressReporter: Send + Sync {
    fn report(&self, event: ValidationProgressEvent);
}

/// Human-friendly progress on stderr: "check rows.json  validating  1,000 / 5,000 rows".
pub struct StderrProgress;

impl ValidationProgressReporter for StderrProgress {
    fn report(&self, event: ValidationProgressEvent) {
        let line = match &event {
            ValidationProgressEvent::Validating { source, n, total } => format!(
                "check {}  validating  {} / {} rows\n",
                source,
                format_number(*n),
                format_number(*total)
            ),
            ValidationProgressEvent::Finished {
                source,
                accepted,
                rejected,
            } => format!(
                "check {}  done  {} accepted, {} rejected\n",
                source,
                format_number(*accepted),
                format_number(*rejected)
            ),
        };
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(line.as_bytes());
        let _ = err.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ValidationProgressReporter for JsonProgress {
    fn report(&self, event: ValidationProgressEvent) {
        let obj = match &event {
            ValidationProgressEvent::Validating { source, n, total } => serde_json::json!({
                "event": "progress",
                "source": source,
                "phase": "validating",
                "n": n,
                "total": total
            }),
            ValidationProgressEvent::Finished {
                source,
                accepted,
                rejected,
            } => serde_json::json!({
                "event": "progress",
                "source": source,
                "phase": "finished",
                "accepted": accepted,
                "rejected": rejected
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ValidationProgressReporter for NoProgress {
    fn report(&self, _event: ValidationProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ValidationProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

//! Core data models used throughout the validation core.
//!
//! These types represent the raw rows handed in by an importer, the
//! per-row [`ValidationResult`], and the normalized [`VulnerabilityRecord`]
//! produced for accepted rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single raw cell value as parsed from an import file or API body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric content. Text cells holding a number (`"9.8"`) count.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Null or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// One imported record: column header to raw cell value.
pub type RawRow = BTreeMap<String, FieldValue>;

/// Vulnerability severity as stored by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity: '{0}'")]
pub struct ParseSeverityError(pub String);

/// Case-sensitive: only the four canonical spellings parse.
impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str() == s)
            .ok_or_else(|| ParseSeverityError(s.to_string()))
    }
}

/// Lifecycle state of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VulnState {
    #[default]
    Active,
    Fixed,
    Resurfaced,
    New,
    Open,
    Closed,
}

impl VulnState {
    pub const ALL: [VulnState; 6] = [
        VulnState::Active,
        VulnState::Fixed,
        VulnState::Resurfaced,
        VulnState::New,
        VulnState::Open,
        VulnState::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VulnState::Active => "ACTIVE",
            VulnState::Fixed => "FIXED",
            VulnState::Resurfaced => "RESURFACED",
            VulnState::New => "NEW",
            VulnState::Open => "OPEN",
            VulnState::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for VulnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vulnerability state: '{0}'")]
pub struct ParseStateError(pub String);

impl FromStr for VulnState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VulnState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseStateError(s.to_string()))
    }
}

/// Outcome of validating one value or one row.
///
/// `valid` is true exactly when `errors` is empty; the constructor
/// enforces that and the fields are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Normalized form of an accepted row. Built by the row validator;
/// the core never persists it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VulnerabilityRecord {
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    pub cve: Option<String>,
    pub plugin_name: Option<String>,
    pub severity: Option<Severity>,
    pub vpr_score: Option<f64>,
    pub cvss_score: Option<f64>,
    pub first_detected: Option<NaiveDate>,
    pub last_seen: Option<NaiveDate>,
    pub state: VulnState,
}

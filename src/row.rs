//! Row validation.
//!
//! A [`RowValidator`] takes one imported record (column header to raw
//! value), resolves the headers it knows about, runs the field validators
//! over every value present and collects one message per failing field.
//! It never stops at the first failure and never fails itself: callers
//! always get a [`ValidationResult`] back and decide what to do with the row.
//!
//! Scanner exports name the same column many ways (`hostname`, `Host`,
//! `asset.name`, ...). Each logical [`Field`] carries an ordered alias
//! list; headers match case-insensitively after trimming and the first
//! alias holding a non-blank value wins.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::date::DateNormalizer;
use crate::models::{FieldValue, RawRow, Severity, ValidationResult, VulnState, VulnerabilityRecord};
use crate::validate;

/// Logical fields of a vulnerability row, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Hostname,
    IpAddress,
    Cve,
    PluginName,
    Severity,
    Vpr,
    Cvss,
    FirstDetected,
    LastSeen,
    State,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Hostname,
        Field::IpAddress,
        Field::Cve,
        Field::PluginName,
        Field::Severity,
        Field::Vpr,
        Field::Cvss,
        Field::FirstDetected,
        Field::LastSeen,
        Field::State,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Field::Hostname => "hostname",
            Field::IpAddress => "ip_address",
            Field::Cve => "cve",
            Field::PluginName => "plugin_name",
            Field::Severity => "severity",
            Field::Vpr => "vpr",
            Field::Cvss => "cvss",
            Field::FirstDetected => "first_detected",
            Field::LastSeen => "last_seen",
            Field::State => "state",
        }
    }

    /// Built-in header aliases, lowercase, most specific first.
    pub fn default_aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Hostname => &["hostname", "host", "asset.name"],
            Field::IpAddress => &[
                "ip_address",
                "ip address",
                "ip",
                "asset.display_ipv4_address",
                "asset.ipv4_addresses",
            ],
            Field::Cve => &["cve", "definition.cve"],
            Field::PluginName => &["plugin_name", "plugin name", "definition.name", "description"],
            Field::Severity => &["severity"],
            Field::Vpr => &[
                "vpr",
                "vpr_score",
                "vpr score",
                "definition.vpr.score",
                "definition.vpr_v2.score",
            ],
            Field::Cvss => &["cvss", "cvss_score", "cvss score"],
            Field::FirstDetected => &["first_detected", "first_seen", "first seen"],
            Field::LastSeen => &["last_seen", "last seen"],
            Field::State => &["state"],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field: '{0}'")]
pub struct ParseFieldError(pub String);

impl FromStr for Field {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| ParseFieldError(s.to_string()))
    }
}

/// Result of [`RowValidator::check`]: the verdict plus, for valid rows,
/// the normalized record ready to persist.
#[derive(Debug, Clone)]
pub struct RowCheck {
    pub result: ValidationResult,
    pub record: Option<VulnerabilityRecord>,
}

/// Validates rows against a fixed policy. Cheap to share across threads.
#[derive(Debug, Clone)]
pub struct RowValidator {
    aliases: HashMap<Field, Vec<String>>,
    required: Vec<Field>,
    require_host_or_ip: bool,
    allow_vendor_advisories: bool,
    normalize_hostnames: bool,
    dates: DateNormalizer,
}

impl Default for RowValidator {
    fn default() -> Self {
        let aliases = Field::ALL
            .into_iter()
            .map(|f| {
                let list = f.default_aliases().iter().map(|a| a.to_string()).collect();
                (f, list)
            })
            .collect();
        Self {
            aliases,
            required: Vec::new(),
            require_host_or_ip: false,
            allow_vendor_advisories: false,
            normalize_hostnames: true,
            dates: DateNormalizer::default(),
        }
    }
}

impl RowValidator {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut validator = Self::default();
        for (name, extra) in &config.columns {
            let field: Field = name
                .parse()
                .with_context(|| format!("Unknown field in [columns]: '{}'", name))?;
            let list = validator.aliases.entry(field).or_default();
            list.extend(extra.iter().map(|a| a.trim().to_lowercase()));
        }
        validator.required = config.import.required_fields.clone();
        validator.require_host_or_ip = config.import.require_host_or_ip;
        validator.allow_vendor_advisories = config.import.allow_vendor_advisories;
        validator.normalize_hostnames = config.import.normalize_hostnames;
        validator.dates = DateNormalizer::new(config.dates.day_first);
        Ok(validator)
    }

    /// Validate one row. Never fails; problems are reported in the result.
    pub fn validate(&self, row: &RawRow) -> ValidationResult {
        self.check(row).result
    }

    /// Validate one row and build its normalized record when valid.
    pub fn check(&self, row: &RawRow) -> RowCheck {
        let cells = self.resolve(row);
        let mut errors = Vec::new();
        let mut record = VulnerabilityRecord::default();

        for field in &self.required {
            if !cells.contains_key(field) {
                errors.push(format!("Missing required field: {}", field));
            }
        }
        if self.require_host_or_ip
            && !cells.contains_key(&Field::Hostname)
            && !cells.contains_key(&Field::IpAddress)
        {
            errors.push("Either hostname or IP address is required".to_string());
        }

        for field in Field::ALL {
            let Some(value) = cells.get(&field) else {
                continue;
            };
            if let Err(msg) = self.apply(field, value, &mut record) {
                errors.push(msg);
            }
        }

        if record.cve.is_none() {
            record.cve = record
                .plugin_name
                .as_deref()
                .and_then(validate::extract_cve)
                .map(str::to_string);
        }

        let result = ValidationResult::from_errors(errors);
        let record = result.is_valid().then_some(record);
        RowCheck { result, record }
    }

    /// First non-blank cell per field, by alias order.
    fn resolve<'a>(&self, row: &'a RawRow) -> HashMap<Field, &'a FieldValue> {
        let mut by_header: HashMap<String, &FieldValue> = HashMap::with_capacity(row.len());
        for (header, value) in row {
            if value.is_blank() {
                continue;
            }
            by_header
                .entry(header.trim().to_lowercase())
                .or_insert(value);
        }

        let mut cells = HashMap::new();
        for field in Field::ALL {
            let Some(aliases) = self.aliases.get(&field) else {
                continue;
            };
            let hit = aliases
                .iter()
                .find_map(|alias| by_header.get(alias.as_str()));
            if let Some(value) = hit {
                cells.insert(field, *value);
            }
        }
        cells
    }

    fn apply(
        &self,
        field: Field,
        value: &FieldValue,
        record: &mut VulnerabilityRecord,
    ) -> std::result::Result<(), String> {
        match field {
            Field::Hostname => {
                let host = text(value).ok_or("Invalid hostname")?;
                if !validate::is_valid_hostname(host) && !validate::is_valid_ip(host) {
                    return Err("Invalid hostname".into());
                }
                record.hostname = Some(if self.normalize_hostnames {
                    validate::normalize_hostname(host)
                } else {
                    host.to_string()
                });
            }
            Field::IpAddress => {
                let raw = text(value).ok_or("Invalid IP address")?;
                // Multi-homed assets list several addresses; the first is primary.
                let first = raw.split(',').next().unwrap_or_default().trim();
                if !validate::is_valid_ip(first) {
                    return Err("Invalid IP address".into());
                }
                record.ip_address = Some(first.to_string());
            }
            Field::Cve => {
                let id = text(value).ok_or("Invalid CVE format")?;
                let upper = id.to_uppercase();
                if validate::is_valid_cve(id) || validate::is_valid_cve(&upper) {
                    record.cve = Some(upper);
                } else if self.allow_vendor_advisories && validate::is_valid_vendor_advisory(id) {
                    record.cve = Some(id.to_lowercase());
                } else {
                    return Err("Invalid CVE format".into());
                }
            }
            Field::PluginName => {
                record.plugin_name = Some(value.to_string().trim().to_string());
            }
            Field::Severity => {
                let sev = text(value)
                    .and_then(|s| s.parse::<Severity>().ok())
                    .ok_or("Invalid severity level")?;
                record.severity = Some(sev);
            }
            Field::Vpr => {
                let score = score(value).ok_or("VPR score must be between 0.0 and 10.0")?;
                record.vpr_score = Some(score);
            }
            Field::Cvss => {
                let score = score(value).ok_or("CVSS score must be between 0.0 and 10.0")?;
                record.cvss_score = Some(score);
            }
            Field::FirstDetected => {
                record.first_detected = Some(self.date(field, value)?);
            }
            Field::LastSeen => {
                record.last_seen = Some(self.date(field, value)?);
            }
            Field::State => {
                let state = text(value)
                    .and_then(|s| s.parse::<VulnState>().ok())
                    .ok_or("Invalid vulnerability state")?;
                record.state = state;
            }
        }
        Ok(())
    }

    fn date(&self, field: Field, value: &FieldValue) -> std::result::Result<chrono::NaiveDate, String> {
        let raw = text(value).ok_or_else(|| format!("Invalid date for {}: not a string", field))?;
        self.dates
            .parse(raw)
            .map_err(|e| format!("Invalid date for {}: {}", field, e))
    }
}

fn text(value: &FieldValue) -> Option<&str> {
    value.as_text().map(str::trim)
}

fn score(value: &FieldValue) -> Option<f64> {
    value
        .as_number()
        .filter(|s| validate::is_valid_vpr_score(*s))
}

/// Validate with the built-in policy: known aliases, nothing required.
pub fn validate_row(row: &RawRow) -> ValidationResult {
    RowValidator::default().validate(row)
}

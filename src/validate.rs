//! Field validators.
//!
//! Pure predicates over single scalar values. None of them panic or
//! allocate beyond the lazily compiled patterns; invalid input simply
//! returns `false`.

use regex::Regex;
use std::net::IpAddr;
use std::sync::OnceLock;

use crate::models::{FieldValue, Severity, VulnState};

/// Longest hostname accepted, excluding one trailing root dot.
pub const MAX_HOSTNAME_LEN: usize = 253;

/// Longest single DNS label.
pub const MAX_LABEL_LEN: usize = 63;

/// Inclusive bounds shared by VPR and CVSS scores.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

fn cve_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^CVE-[0-9]{4}-[0-9]{4,}$").expect("static CVE pattern"))
}

fn cve_search_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"CVE-[0-9]{4}-[0-9]{4,}").expect("static CVE pattern"))
}

fn vendor_advisory_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^cisco-sa-[a-z0-9_-]+$").expect("static advisory pattern")
    })
}

/// `CVE-YYYY-NNNN` with four or more sequence digits. Case-sensitive, no trimming.
pub fn is_valid_cve(cve: &str) -> bool {
    cve_pattern().is_match(cve)
}

/// Vendor advisory identifiers that stand in for a CVE (`cisco-sa-...`).
pub fn is_valid_vendor_advisory(id: &str) -> bool {
    vendor_advisory_pattern().is_match(id)
}

/// First CVE identifier embedded in free text such as a plugin name.
pub fn extract_cve(text: &str) -> Option<&str> {
    cve_search_pattern().find(text).map(|m| m.as_str())
}

/// One of `Critical`, `High`, `Medium`, `Low`, exact case.
pub fn is_valid_severity(severity: &str) -> bool {
    severity.parse::<Severity>().is_ok()
}

/// Numeric and within `[0.0, 10.0]`. Numeric text counts as numeric.
pub fn is_valid_vpr(value: &FieldValue) -> bool {
    value.as_number().is_some_and(is_valid_vpr_score)
}

pub fn is_valid_vpr_score(score: f64) -> bool {
    (SCORE_MIN..=SCORE_MAX).contains(&score)
}

/// CVSS base scores share the VPR range.
pub fn is_valid_cvss(value: &FieldValue) -> bool {
    is_valid_vpr(value)
}

/// IPv4 dotted-quad or IPv6 text form.
pub fn is_valid_ip(ip: &str) -> bool {
    ip.parse::<IpAddr>().is_ok()
}

/// RFC 1123 hostname grammar. Dotted-decimal forms are addresses, not names.
pub fn is_valid_hostname(hostname: &str) -> bool {
    let name = hostname.strip_suffix('.').unwrap_or(hostname);
    if name.is_empty() || name.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    // The top-level label is never all-numeric, so `#.#.#.#` is not a name.
    let top = name.rsplit('.').next().unwrap_or_default();
    if top.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    name.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

pub fn is_valid_state(state: &str) -> bool {
    state.parse::<VulnState>().is_ok()
}

/// Reduce a hostname to the short, lowercase form the tracker keys on.
///
/// IP addresses are kept whole; anything else loses everything from
/// the first `.` on, so `NWAN10.MMPLP.NET` and `nwan10` collapse together.
pub fn normalize_hostname(hostname: &str) -> String {
    let clean = hostname.trim();
    if clean.parse::<IpAddr>().is_ok() {
        return clean.to_lowercase();
    }
    clean
        .split('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

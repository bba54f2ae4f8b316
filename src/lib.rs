//! # HexTrackr Validate
//!
//! Validation and normalization for vulnerability data entering HexTrackr.
//!
//! CSV imports and API writes hand over loosely formatted records: CVE ids in
//! mixed case, scanner-specific column names, hostnames with and without
//! domains, dates in half a dozen shapes, and `LAST,FIRST` names from EAM
//! exports. This crate checks each field, reports every problem in a row at
//! once, and produces the normalized record the tracker stores.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │  batch   │──▶│ RowValidator │──▶│ validate / date /    │
//! │ (import) │   │   (row)      │   │ names                │
//! └──────────┘   └──────────────┘   └──────────────────────┘
//!      ▲                ▲
//!      │                │
//! ┌──────────┐   ┌──────────┐
//! │  hexval  │──▶│  config  │
//! │  (CLI)   │   │  (TOML)  │
//! └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! hexval check export.json                 # batch report
//! hexval row '{"cve": "CVE-2024-0001", "severity": "Critical", "vpr": 9.8}'
//! hexval field cve CVE-2024-0001
//! hexval names "SMITH,JOHN; DOE,JANE"      # John Smith; Jane Doe
//! hexval date "03/15/2024"                 # 2024-03-15
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`validate`] | Field validators (CVE, IP, hostname, severity, VPR, ...) |
//! | [`row`] | Row validator and column alias resolution |
//! | [`date`] | Date normalizer |
//! | [`names`] | Supervisor/tech name normalizer |
//! | [`batch`] | Batch validation, reports, row loading |
//! | [`progress`] | Progress reporting on stderr |
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |

pub mod batch;
pub mod config;
pub mod date;
pub mod models;
pub mod names;
pub mod progress;
pub mod row;
pub mod validate;

pub use models::{FieldValue, RawRow, ValidationResult, VulnerabilityRecord};
pub use row::{validate_row, RowValidator};

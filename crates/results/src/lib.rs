#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`models`]: Result tree (`VulnerabilityResults`, `PackageVulns`, `GroupInfo`, `License`)
//! - [`builder`]: Tree assembly from per-package results (`ResultsBuilder`)
//! - [`grouping`]: Alias grouping (`group_vulnerabilities`)
//! - [`severity`]: CVSS decoding and group scores (`SeverityType`, `max_severity`)
//! - [`license`]: License enrichment and policy (`LicenseClient`, `DepsDevClient`, `LicenseEnricher`, `LicensePolicy`)
//! - [`report`]: Output formats (`Reporter`, `OutputFormat`)
//! - [`config`]: Enricher configuration (`EnricherConfig`, builder)
//! - [`error`]: Domain error types (`ResultsError`)
//!
//! # Architecture
//!
//! ```text
//! matching client --> ResultsBuilder --> VulnerabilityResults
//!                                               |
//!                                   LicenseEnricher (optional, deps.dev)
//!                                               |
//!                                   LicensePolicy (optional, allowlist)
//!                                               |
//!                                           Reporter --> table | json | sarif | markdown
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod grouping;
pub mod license;
pub mod models;
pub mod report;
pub mod severity;

// --- Public API Re-exports ---

// Model
pub use builder::ResultsBuilder;
pub use models::{
    ExperimentalConfig, GroupInfo, License, LicenseConfig, PackageInfo, PackageSource,
    PackageVulns, SourceInfo, Vulnerability, VulnerabilityFlattened, VulnerabilityResults,
};

// Grouping / severity
pub use grouping::group_vulnerabilities;
pub use severity::{CvssError, SeverityType, format_score, max_severity};

// License
pub use license::{
    DepsDevClient, EnrichmentOutcome, LicenseBatch, LicenseClient, LicenseEnricher, LicenseError,
    LicensePolicy, System, VersionQuery, fetch_licenses, license_counts,
};

// Report
pub use report::{OutputFormat, Reporter};

// Configuration
pub use config::{EnricherConfig, EnricherConfigBuilder};

// Error
pub use error::ResultsError;

//! CLI-specific error types and exit code mapping

use depsight_core::error::DepsightError;
use depsight_results::ResultsError;

/// Message printed when no input produced a package source.
pub const NO_PACKAGE_SOURCES: &str = "No package sources found, --help for usage information.";

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to the process exit codes scripts
/// and CI jobs depend on.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The report contains vulnerabilities or license violations.
    #[error("found {vulnerabilities} vulnerabilities and {violations} license violations")]
    Findings {
        vulnerabilities: usize,
        violations: usize,
    },

    /// None of the inputs contained a package source.
    #[error("{}", NO_PACKAGE_SOURCES)]
    NoPackageSources,

    /// Errors were already printed through the reporter.
    #[error("errors were reported")]
    Reported,

    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// A results file could not be read or decoded.
    #[error("failed to load {path}: {reason}")]
    Input { path: String, reason: String },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from depsight-core.
    #[error("{0}")]
    Core(#[from] DepsightError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                        |
    /// |------|------------------------------------------------|
    /// | 0    | Success, nothing to report                     |
    /// | 1    | Vulnerabilities or license violations found    |
    /// | 127  | Any other error (enrichment, IO, config, ...)  |
    /// | 128  | No package sources in the inputs               |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Findings { .. } => 1,
            Self::NoPackageSources => 128,
            Self::Reported
            | Self::Config(_)
            | Self::Command(_)
            | Self::Input { .. }
            | Self::JsonSerialize(_)
            | Self::Io(_)
            | Self::Core(_) => 127,
        }
    }

    /// Whether `main` should print this error before exiting.
    ///
    /// Findings are already visible in the report and `Reported` errors were
    /// printed when they happened.
    pub fn should_print(&self) -> bool {
        !matches!(self, Self::Findings { .. } | Self::Reported)
    }
}

impl From<ResultsError> for CliError {
    fn from(e: ResultsError) -> Self {
        Self::Core(e.into())
    }
}

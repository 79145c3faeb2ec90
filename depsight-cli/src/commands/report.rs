//! `depsight report` command handler

use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{info, warn};

use depsight_core::config::DepsightConfig;
use depsight_results::{
    EnricherConfig, ExperimentalConfig, LicenseEnricher, LicensePolicy, OutputFormat, Reporter,
    ResultsBuilder, VulnerabilityResults,
};

use crate::cli::ReportArgs;
use crate::error::CliError;
use crate::output::ReportTarget;

/// Execute the `report` command.
///
/// Findings and printed errors are returned as [`CliError`] variants so
/// `main` can map them to exit codes after the report is written.
pub async fn execute(args: ReportArgs, mut config: DepsightConfig) -> Result<(), CliError> {
    apply_overrides(&mut config, &args);
    config.validate()?;

    let format = match args.format {
        Some(format) => format,
        None => config
            .output
            .format
            .parse::<OutputFormat>()
            .map_err(CliError::Config)?,
    };
    let enricher_config = EnricherConfig::from_core(&config);

    let target = ReportTarget::open(args.output.as_deref())?;
    // Notices stay out of files and piped table output.
    let notices = target.terminal_width > 0 || format.is_machine_readable();
    let mut reporter = Reporter::new(format, target.writer, io::stderr(), target.terminal_width);

    let mut results = load_results(&args.inputs, enricher_config.experimental_config()).await?;
    if results.results.is_empty() {
        return Err(CliError::NoPackageSources);
    }

    let violations = if enricher_config.is_enabled() {
        annotate_licenses(&mut results, &enricher_config, &mut reporter, notices).await?
    } else {
        0
    };

    reporter.print_result(&results)?;

    if reporter.has_printed_error() {
        return Err(CliError::Reported);
    }

    let vulnerabilities = results.vulnerability_count();
    if vulnerabilities > 0 || violations > 0 {
        return Err(CliError::Findings {
            vulnerabilities,
            violations,
        });
    }

    Ok(())
}

/// Fold command-line flags into the configuration (flags win).
fn apply_overrides(config: &mut DepsightConfig, args: &ReportArgs) {
    if let Some(format) = args.format {
        config.output.format = format.as_str().to_owned();
    }
    if args.licenses {
        config.licenses.enabled = true;
    }
    if !args.license_allowlist.is_empty() {
        config.licenses.allowlist = args
            .license_allowlist
            .iter()
            .map(|l| l.trim().to_owned())
            .collect();
    }
}

/// Read and merge every results file in argument order.
async fn load_results(
    inputs: &[PathBuf],
    experimental_config: ExperimentalConfig,
) -> Result<VulnerabilityResults, CliError> {
    let mut builder = ResultsBuilder::new();

    for path in inputs {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CliError::Input {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let loaded: VulnerabilityResults =
            serde_json::from_str(&content).map_err(|e| CliError::Input {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let sources = loaded.results.len();
        let packages = loaded.packages().count();
        info!(path = %path.display(), sources, packages, "loaded results");

        builder.merge(loaded);
    }

    Ok(builder.build(experimental_config))
}

/// Enrich licenses and apply the allow-list. Returns the number of
/// violating packages.
///
/// A client that cannot be built or a failed lookup batch is printed
/// through the reporter and leaves the results without licenses; the
/// report is still rendered. With `notices`, versions unknown to the
/// license service are announced through [`Reporter::print_text`].
async fn annotate_licenses<O: Write, E: Write>(
    results: &mut VulnerabilityResults,
    config: &EnricherConfig,
    reporter: &mut Reporter<O, E>,
    notices: bool,
) -> Result<usize, CliError> {
    let enriched = match LicenseEnricher::from_config(config) {
        Ok(enricher) => enricher.enrich(results).await,
        Err(e) => Err(e),
    };

    match enriched {
        Ok(outcome) => {
            if let Some(not_found) = outcome.not_found {
                warn!(
                    error = %not_found,
                    "some package versions are unknown to the license service, reported as UNKNOWN"
                );
                if notices {
                    reporter.print_text(&format!(
                        "Licenses listed as UNKNOWN for unknown versions ({not_found})"
                    ))?;
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "license enrichment failed");
            reporter.print_error(&format!("failed to get licenses: {e}"))?;
        }
    }

    if config.allowlist.is_empty() {
        return Ok(0);
    }
    let policy = LicensePolicy::new(config.allowlist.iter().map(String::as_str));
    Ok(policy.apply(results))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(inputs: &[&str]) -> ReportArgs {
        ReportArgs {
            inputs: inputs.iter().map(PathBuf::from).collect(),
            format: None,
            output: None,
            licenses: false,
            license_allowlist: Vec::new(),
        }
    }

    const LOCKFILE_RESULTS: &str = r#"{
  "results": [
    {
      "source": { "path": "/app/package-lock.json", "type": "lockfile" },
      "packages": [
        {
          "package": { "name": "lodash", "version": "4.17.20", "ecosystem": "npm" },
          "vulnerabilities": [ { "id": "GHSA-35jh-r3h4-6jhm" } ]
        }
      ]
    }
  ]
}"#;

    #[test]
    fn test_flags_override_config() {
        let mut config = DepsightConfig::default();
        let mut report_args = args(&[]);
        report_args.format = Some(OutputFormat::Sarif);
        report_args.licenses = true;
        report_args.license_allowlist = vec![" MIT".to_owned(), "Apache-2.0".to_owned()];

        apply_overrides(&mut config, &report_args);

        assert_eq!(config.output.format, "sarif");
        assert!(config.licenses.enabled);
        assert_eq!(config.licenses.allowlist, vec!["MIT", "Apache-2.0"]);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = DepsightConfig::default();
        config.licenses.allowlist = vec!["ISC".to_owned()];

        apply_overrides(&mut config, &args(&[]));

        assert_eq!(config.output.format, "table");
        assert!(!config.licenses.enabled);
        assert_eq!(config.licenses.allowlist, vec!["ISC"]);
    }

    #[tokio::test]
    async fn test_load_results_merges_inputs() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        std::fs::write(&first, LOCKFILE_RESULTS).expect("write first");
        std::fs::write(&second, LOCKFILE_RESULTS).expect("write second");

        let results = load_results(&[first, second], ExperimentalConfig::default())
            .await
            .expect("inputs should load");

        // 같은 소스는 하나로 합쳐지고 패키지는 이어 붙습니다
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].packages.len(), 2);
        assert_eq!(results.results[0].packages[0].groups.len(), 1);
    }

    #[tokio::test]
    async fn test_load_results_without_inputs_is_empty() {
        let results = load_results(&[], ExperimentalConfig::default())
            .await
            .expect("no inputs is not an error");
        assert!(results.results.is_empty());
    }

    #[tokio::test]
    async fn test_load_results_rejects_bad_json() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ \"results\": [").expect("write");

        let err = load_results(&[path], ExperimentalConfig::default())
            .await
            .expect_err("broken json should fail");
        assert!(matches!(err, CliError::Input { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[tokio::test]
    async fn test_load_results_missing_file() {
        let err = load_results(
            &[PathBuf::from("/nonexistent/results.json")],
            ExperimentalConfig::default(),
        )
        .await
        .expect_err("missing file should fail");
        assert_eq!(err.exit_code(), 127);
    }

    #[tokio::test]
    async fn test_unusable_enrichment_settings_are_reported_not_fatal() {
        let mut config = DepsightConfig::default();
        config.licenses.allowlist = vec!["MIT".to_owned()];
        config.enrichment.timeout_secs = 0;
        let enricher_config = EnricherConfig::from_core(&config);

        let mut results: VulnerabilityResults =
            serde_json::from_str(LOCKFILE_RESULTS).expect("fixture should parse");
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut reporter = Reporter::new(OutputFormat::Json, &mut stdout, &mut stderr, 0);

        annotate_licenses(&mut results, &enricher_config, &mut reporter, true)
            .await
            .expect("client errors go through the reporter");

        assert!(reporter.has_printed_error());
        reporter.print_result(&results).expect("report still renders");
        drop(reporter);
        let stderr = String::from_utf8(stderr).expect("utf8");
        assert!(stderr.contains("failed to get licenses"));
        assert!(!stdout.is_empty());
    }

    async fn annotate_against_empty_service(
        format: OutputFormat,
        notices: bool,
    ) -> (Vec<u8>, Vec<u8>, bool) {
        // No mocks mounted: every lookup gets a 404.
        let server = wiremock::MockServer::start().await;
        let mut config = DepsightConfig::default();
        config.licenses.enabled = true;
        config.enrichment.endpoint = server.uri();
        let enricher_config = EnricherConfig::from_core(&config);

        let mut results: VulnerabilityResults =
            serde_json::from_str(LOCKFILE_RESULTS).expect("fixture should parse");
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut reporter = Reporter::new(format, &mut stdout, &mut stderr, 0);
        annotate_licenses(&mut results, &enricher_config, &mut reporter, notices)
            .await
            .expect("unknown versions are not an error");
        let printed_error = reporter.has_printed_error();
        drop(reporter);
        (stdout, stderr, printed_error)
    }

    #[tokio::test]
    async fn test_unknown_versions_are_announced_on_stderr_for_json() {
        let (stdout, stderr, printed_error) =
            annotate_against_empty_service(OutputFormat::Json, true).await;

        assert!(stdout.is_empty());
        let stderr = String::from_utf8(stderr).expect("utf8");
        assert!(stderr.contains("Licenses listed as UNKNOWN"), "stderr: {stderr}");
        assert!(!printed_error);
    }

    #[tokio::test]
    async fn test_unknown_versions_stay_quiet_without_notices() {
        let (stdout, stderr, _) = annotate_against_empty_service(OutputFormat::Table, false).await;

        assert!(stdout.is_empty());
        assert!(stderr.is_empty());
    }
}

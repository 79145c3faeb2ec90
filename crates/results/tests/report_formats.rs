//! Report rendering integration tests over a realistic result tree

use std::path::PathBuf;

use depsight_results::{
    License, OutputFormat, PackageInfo, PackageVulns, Reporter, ResultsBuilder, SourceInfo,
    VulnerabilityResults,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture() -> VulnerabilityResults {
    let content = std::fs::read_to_string(fixture_path("results.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn render(format: OutputFormat, results: &VulnerabilityResults) -> String {
    let mut reporter = Reporter::new(format, Vec::new(), Vec::new(), 0);
    reporter.print_result(results).unwrap();
    let (stdout, stderr) = reporter.into_inner();
    assert!(stderr.is_empty());
    String::from_utf8(stdout).unwrap()
}

#[test]
fn test_flatten_covers_every_vulnerability() {
    let results = load_fixture();
    let rows = results.flatten();
    assert_eq!(rows.len(), results.vulnerability_count());
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].vulnerability.id, "GHSA-whgm-jr23-g3j9");
    assert_eq!(rows[3].source.path, "/fixtures/service/go.mod");
}

#[test]
fn test_table_orders_called_then_uncalled() {
    let output = render(OutputFormat::Table, &load_fixture());

    let ansi = output.find("GHSA-whgm-jr23-g3j9").unwrap();
    let xvch = output.find("GHSA-xvch-5gv4-984h").unwrap();
    let go = output.find("GO-2021-0113").unwrap();
    let label = output.find("Uncalled vulnerabilities").unwrap();
    let vh95 = output.find("GHSA-vh95-rmgr-6w4m").unwrap();
    assert!(ansi < xvch && xvch < go && go < label && label < vh95);

    assert!(output.contains("| 7.5  |"));
    assert!(output.contains("| 9.8  |"));
    assert!(output.contains("| 5.6  |"));
    assert!(output.starts_with("+-"));
    assert!(!output.contains("No issues found"));
}

#[test]
fn test_markdown_matches_table_content() {
    let output = render(OutputFormat::Markdown, &load_fixture());
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(
        lines[0],
        "| OSV URL | CVSS | ECOSYSTEM | PACKAGE | VERSION | SOURCE |"
    );
    assert_eq!(lines[1], "| --- | --- | --- | --- | --- | --- |");
    assert_eq!(
        lines[2],
        "| https://osv.dev/GHSA-whgm-jr23-g3j9 | 7.5 | npm | ansi-html | 0.0.1 | /fixtures/webapp/package-lock.json |"
    );
    assert_eq!(lines[5], "| Uncalled vulnerabilities |  |  |  |  |  |");
    assert_eq!(lines.len(), 7);
}

#[test]
fn test_json_round_trips() {
    let results = load_fixture();
    let output = render(OutputFormat::Json, &results);
    assert!(output.ends_with("}\n"));
    let parsed: VulnerabilityResults = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed, results);
}

#[test]
fn test_empty_scan_json_is_bare_results() {
    let output = render(OutputFormat::Json, &VulnerabilityResults::default());
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value, serde_json::json!({ "results": [] }));
}

#[test]
fn test_sarif_document_shape() {
    let output = render(OutputFormat::Sarif, &load_fixture());
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["version"], "2.1.0");
    assert_eq!(
        value["$schema"],
        "https://json.schemastore.org/sarif-2.1.0.json"
    );

    let run = &value["runs"][0];
    assert_eq!(
        run["tool"]["driver"]["rules"][0]["shortDescription"]["text"],
        "This manifest file contains one or more vulnerable packages."
    );
    assert_eq!(run["artifacts"].as_array().unwrap().len(), 2);

    let results = run["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    let webapp = results[0]["message"]["text"].as_str().unwrap();
    assert!(webapp.contains("ansi-html"));
    assert!(webapp.contains("0.0.8"));
    assert!(webapp.contains("minimist"));
    // 호출되지 않은 그룹은 메시지에 포함되지 않음
    assert!(!webapp.contains("GHSA-vh95-rmgr-6w4m"));
    assert!(webapp.contains("--"));
    assert!(!webapp.contains("  "));

    let service = results[1]["message"]["text"].as_str().unwrap();
    assert!(service.contains("0.3.7"));
}

#[test]
fn test_builder_stream_renders_like_a_loaded_tree() {
    let loaded = load_fixture();

    let mut builder = ResultsBuilder::new();
    for source in &loaded.results {
        for package in &source.packages {
            builder.add_package(source.source.clone(), package.clone());
        }
    }
    let built = builder.build(loaded.experimental_config.clone());

    assert_eq!(
        render(OutputFormat::Table, &built),
        render(OutputFormat::Table, &loaded)
    );
}

#[test]
fn test_license_violation_table_after_vulnerabilities() {
    let mut builder = ResultsBuilder::new();
    let mut package = PackageVulns::new(PackageInfo::new("readline", "1.3.0", "npm"));
    package.licenses = vec![License::new("GPL-3.0")];
    package.license_violations = vec![License::new("GPL-3.0")];
    builder.add_package(SourceInfo::new("lockfile", "/x/package-lock.json"), package);

    let mut results = builder.build(Default::default());
    results.experimental_config.licenses.allowlist = vec![License::new("MIT")];

    let output = render(OutputFormat::Table, &results);
    assert!(output.starts_with("No issues found\n"));
    assert!(output.contains("| LICENSE VIOLATION | ECOSYSTEM | PACKAGE  | VERSION | SOURCE               |"));
    assert!(output.contains("| GPL-3.0           | npm       | readline | 1.3.0   | /x/package-lock.json |"));
}

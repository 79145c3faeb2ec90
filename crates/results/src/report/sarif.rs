//! SARIF 2.1.0 출력
//!
//! 실행(run) 하나, 규칙 `vulnerable-packages` 하나를 가집니다. 소스마다 아티팩트를
//! 하나씩 만들고, 호출된 그룹이 있는 소스마다 결과를 하나씩 만듭니다.
//! 결과 메시지는 해당 소스의 ASCII 테이블입니다.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::grid::{Grid, Row};
use super::rows::{self, GroupEntry, osv_link, simplify_path_in};
use crate::error::ResultsError;
use crate::models::{PackageKey, SourceInfo, VulnerabilityResults};
use crate::severity::{format_score, max_severity};

/// 도구 이름
pub const TOOL_NAME: &str = "depsight";

/// 도구 안내 주소
pub const TOOL_INFORMATION_URI: &str = "https://osv.dev";

/// 규칙 ID
pub const RULE_ID: &str = "vulnerable-packages";

const RULE_DESCRIPTION: &str = "This manifest file contains one or more vulnerable packages.";
const SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";
const MESSAGE_HEADERS: [&str; 5] = [
    "Package",
    "Vulnerability ID",
    "CVSS",
    "Current Version",
    "Fixed Version",
];

#[derive(Serialize)]
struct SarifLog {
    version: &'static str,
    #[serde(rename = "$schema")]
    schema: &'static str,
    runs: Vec<Run>,
}

#[derive(Serialize)]
struct Run {
    tool: Tool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    artifacts: Vec<Artifact>,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct Tool {
    driver: Driver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Driver {
    information_uri: &'static str,
    name: &'static str,
    rules: Vec<Rule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Rule {
    id: &'static str,
    short_description: Message,
}

#[derive(Serialize)]
struct Message {
    text: String,
}

#[derive(Serialize)]
struct Artifact {
    location: ArtifactLocation,
    length: i64,
}

#[derive(Serialize, Clone)]
struct ArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: &'static str,
    rule_index: usize,
    level: &'static str,
    message: Message,
    locations: Vec<Location>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    physical_location: PhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhysicalLocation {
    artifact_location: ArtifactLocation,
}

/// 결과 트리를 SARIF 문서로 씁니다.
pub fn write_sarif(out: &mut dyn Write, results: &VulnerabilityResults) -> Result<(), ResultsError> {
    let cwd = std::env::current_dir().ok();
    let log = build_log(results, cwd.as_deref());
    serde_json::to_writer_pretty(&mut *out, &log)?;
    writeln!(out)?;
    Ok(())
}

fn build_log(results: &VulnerabilityResults, cwd: Option<&Path>) -> SarifLog {
    let artifacts = results
        .results
        .iter()
        .map(|source| Artifact {
            location: ArtifactLocation {
                uri: simplify_path_in(&source.source.path, cwd),
            },
            length: -1,
        })
        .collect();

    // 호출된 그룹을 소스별로 모으되 소스 등장 순서 유지
    let mut order: Vec<&SourceInfo> = Vec::new();
    let mut by_source: BTreeMap<usize, Vec<GroupEntry<'_>>> = BTreeMap::new();
    for entry in rows::groups(results, true) {
        let position = match order.iter().position(|s| *s == entry.source) {
            Some(position) => position,
            None => {
                order.push(entry.source);
                order.len() - 1
            }
        };
        by_source.entry(position).or_default().push(entry);
    }

    let sarif_results = by_source
        .into_iter()
        .map(|(position, entries)| {
            let uri = simplify_path_in(&order[position].path, cwd);
            SarifResult {
                rule_id: RULE_ID,
                rule_index: 0,
                level: "warning",
                message: Message {
                    text: message_table(&entries),
                },
                locations: vec![Location {
                    physical_location: PhysicalLocation {
                        artifact_location: ArtifactLocation { uri },
                    },
                }],
            }
        })
        .collect();

    SarifLog {
        version: "2.1.0",
        schema: SCHEMA,
        runs: vec![Run {
            tool: Tool {
                driver: Driver {
                    information_uri: TOOL_INFORMATION_URI,
                    name: TOOL_NAME,
                    rules: vec![Rule {
                        id: RULE_ID,
                        short_description: Message {
                            text: RULE_DESCRIPTION.to_owned(),
                        },
                    }],
                },
            },
            artifacts,
            results: sarif_results,
        }],
    }
}

/// 소스 하나의 메시지 테이블. 마지막 줄바꿈은 제거하고 두 칸 공백은 ` &nbsp;`로 바꿉니다.
fn message_table(entries: &[GroupEntry<'_>]) -> String {
    let mut grid = Grid::new(MESSAGE_HEADERS);
    for entry in entries {
        let package = &entry.package.package;
        let ids = entry
            .group
            .ids
            .iter()
            .map(|id| osv_link(id, false))
            .collect::<Vec<_>>()
            .join("\n");
        grid.push(Row::cells([
            package.name.clone(),
            ids,
            format_score(max_severity(entry.group, entry.package)),
            package.version.clone(),
            fixed_versions(entry),
        ]));
    }
    grid.render().trim_end_matches('\n').replace("  ", " &nbsp;")
}

/// 그룹의 모든 ID에서 패키지의 수정 버전을 모아 중복 없이 `, `로 잇습니다.
fn fixed_versions(entry: &GroupEntry<'_>) -> String {
    let package = &entry.package.package;
    let key = PackageKey::new(package.ecosystem.clone(), package.name.clone());

    let mut versions: Vec<String> = Vec::new();
    for id in &entry.group.ids {
        let Some(vulnerability) = entry.package.vulnerability(id) else {
            continue;
        };
        if let Some(fixed) = vulnerability.fixed_versions().remove(&key) {
            for version in fixed {
                if !versions.contains(&version) {
                    versions.push(version);
                }
            }
        }
    }

    if versions.is_empty() {
        "--".to_owned()
    } else {
        versions.join(", ")
    }
}

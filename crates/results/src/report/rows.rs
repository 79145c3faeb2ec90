//! 모든 출력 형식이 공유하는 결과 순회와 행 구성
//!
//! 순회 순서는 소스 → 패키지 → 그룹(저장된 순서)이며 재정렬하지 않습니다.
//! 호출된 그룹을 먼저, 호출되지 않은 그룹을 나중에 내보냅니다.

use std::path::Path;

use colored::Colorize;

use super::grid::Row;
use crate::license::license_counts;
use crate::models::{GroupInfo, PackageVulns, SourceInfo, VulnerabilityResults};
use crate::severity::{format_score, max_severity};

/// 취약점 상세 페이지 주소 접두어
pub const OSV_URL_PREFIX: &str = "https://osv.dev/";

/// 취약점 테이블 헤더
pub const VULNERABILITY_HEADERS: [&str; 6] =
    ["OSV URL", "CVSS", "Ecosystem", "Package", "Version", "Source"];

/// 라이선스 요약 테이블 헤더
pub const LICENSE_SUMMARY_HEADERS: [&str; 2] = ["License", "No. of package versions"];

/// 라이선스 위반 테이블 헤더
pub const LICENSE_VIOLATION_HEADERS: [&str; 5] =
    ["License Violation", "Ecosystem", "Package", "Version", "Source"];

/// 호출되지 않은 그룹 앞에 붙는 구분 행 레이블
pub const UNCALLED_LABEL: &str = "Uncalled vulnerabilities";

/// 결과 없음 메시지
pub const NO_ISSUES: &str = "No issues found";

/// 순회 중 그룹 하나
#[derive(Debug, Clone, Copy)]
pub struct GroupEntry<'a> {
    pub source: &'a SourceInfo,
    pub package: &'a PackageVulns,
    pub group: &'a GroupInfo,
}

/// `called` 여부가 일치하는 그룹을 순회 순서대로 모읍니다.
pub fn groups(results: &VulnerabilityResults, called: bool) -> Vec<GroupEntry<'_>> {
    results
        .results
        .iter()
        .flat_map(|source| {
            source.packages.iter().flat_map(move |package| {
                package
                    .groups
                    .iter()
                    .filter(move |group| group.is_called() == called)
                    .map(move |group| GroupEntry {
                        source: &source.source,
                        package,
                        group,
                    })
            })
        })
        .collect()
}

/// 취약점 테이블 행
///
/// 호출되지 않은 그룹이 있으면 구분선, 레이블 행, 구분선 뒤에 이어 붙입니다.
pub fn vulnerability_rows(results: &VulnerabilityResults, styled: bool) -> Vec<Row> {
    let cwd = std::env::current_dir().ok();
    let cwd = cwd.as_deref();

    let mut rows: Vec<Row> = groups(results, true)
        .into_iter()
        .map(|entry| group_row(entry, styled, cwd))
        .collect();

    let uncalled = groups(results, false);
    if !uncalled.is_empty() {
        rows.push(Row::Separator);
        rows.push(Row::cells([UNCALLED_LABEL]));
        rows.push(Row::Separator);
        rows.extend(
            uncalled
                .into_iter()
                .map(|entry| group_row(entry, styled, cwd)),
        );
    }
    rows
}

fn group_row(entry: GroupEntry<'_>, styled: bool, cwd: Option<&Path>) -> Row {
    let links = entry
        .group
        .ids
        .iter()
        .map(|id| osv_link(id, styled))
        .collect::<Vec<_>>()
        .join("\n");
    let score = format_score(max_severity(entry.group, entry.package));
    let package = &entry.package.package;
    let path = simplify_path_in(&entry.source.path, cwd);

    if package.ecosystem == "GIT" {
        Row::merged([
            links,
            score,
            "GIT".to_owned(),
            package.version.clone(),
            package.version.clone(),
            path,
        ])
    } else {
        Row::cells([
            links,
            score,
            package.ecosystem.clone(),
            package.name.clone(),
            package.version.clone(),
            path,
        ])
    }
}

/// `https://osv.dev/<ID>` 링크. 스타일을 켜면 ID를 굵게 표시합니다.
pub fn osv_link(id: &str, styled: bool) -> String {
    if styled {
        format!("{OSV_URL_PREFIX}{}", id.bold())
    } else {
        format!("{OSV_URL_PREFIX}{id}")
    }
}

/// 라이선스 테이블 (헤더와 행)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseRows {
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

/// 라이선스 테이블 행
///
/// 허용 목록이 있으면 위반 행, 없고 요약이 켜져 있으면 라이선스별 개수 행을
/// 만듭니다. 행이 하나도 없으면 `None`입니다.
pub fn license_rows(results: &VulnerabilityResults) -> Option<LicenseRows> {
    let config = &results.experimental_config.licenses;
    let table = if !config.allowlist.is_empty() {
        let cwd = std::env::current_dir().ok();
        let rows = results
            .results
            .iter()
            .flat_map(|source| source.packages.iter().map(move |p| (source, p)))
            .filter(|(_, package)| !package.license_violations.is_empty())
            .map(|(source, package)| {
                vec![
                    package
                        .license_violations
                        .iter()
                        .map(|l| l.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    package.package.ecosystem.clone(),
                    package.package.name.clone(),
                    package.package.version.clone(),
                    simplify_path_in(&source.source.path, cwd.as_deref()),
                ]
            })
            .collect();
        LicenseRows {
            headers: &LICENSE_VIOLATION_HEADERS,
            rows,
        }
    } else if config.summary {
        LicenseRows {
            headers: &LICENSE_SUMMARY_HEADERS,
            rows: license_counts(results)
                .into_iter()
                .map(|(license, count)| vec![license.to_string(), count.to_string()])
                .collect(),
        }
    } else {
        return None;
    };

    (!table.rows.is_empty()).then_some(table)
}

/// `cwd` 기준 상대 경로. `cwd`가 없거나 그 아래가 아니면 원래 경로를 돌려줍니다.
pub(crate) fn simplify_path_in(path: &str, cwd: Option<&Path>) -> String {
    let Some(cwd) = cwd else {
        return path.to_owned();
    };
    match Path::new(path).strip_prefix(cwd) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_owned(),
        Ok(relative) => relative.display().to_string(),
        Err(_) => path.to_owned(),
    }
}

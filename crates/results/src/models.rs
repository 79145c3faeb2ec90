//! 결과 데이터 모델
//!
//! 매칭 클라이언트가 만든 결과 트리를 표현합니다.
//!
//! ```text
//! VulnerabilityResults
//!   └─ PackageSource (lockfile / SBOM 하나)
//!        └─ PackageVulns (패키지 버전 하나)
//!             ├─ Vulnerability (OSV 레코드)
//!             └─ GroupInfo (별칭 관계로 묶인 ID 집합)
//! ```
//!
//! 트리는 추가만 가능하며, 보강 단계는 `&mut`로 주석(라이선스, 위반)만 덧붙이고
//! `results`, `packages`, 취약점 목록의 순서는 바꾸지 않습니다.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::severity::SeverityType;

/// 스캔 결과 전체
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityResults {
    /// 소스별 결과 (수집 순서 유지)
    pub results: Vec<PackageSource>,
    /// 라이선스 검사 설정. 비활성 상태면 직렬화하지 않음
    #[serde(default, skip_serializing_if = "ExperimentalConfig::is_disabled")]
    pub experimental_config: ExperimentalConfig,
}

impl VulnerabilityResults {
    /// 트리 전체를 (소스, 패키지, 취약점, 그룹) 행으로 펼칩니다.
    ///
    /// 소스 → 패키지 → 취약점 순서를 그대로 유지합니다.
    ///
    /// # Panics
    ///
    /// 어떤 그룹에도 속하지 않은 취약점 ID가 있으면 패닉합니다.
    /// 모든 ID가 정확히 하나의 그룹에 속한다는 모델 불변식 위반입니다.
    pub fn flatten(&self) -> Vec<VulnerabilityFlattened<'_>> {
        let mut rows = Vec::with_capacity(self.vulnerability_count());
        for source in &self.results {
            for package in &source.packages {
                for vulnerability in &package.vulnerabilities {
                    let Some(group_info) = package.group_for(&vulnerability.id) else {
                        panic!(
                            "vulnerability {} of {}@{} is not in any group",
                            vulnerability.id, package.package.name, package.package.version
                        );
                    };
                    rows.push(VulnerabilityFlattened {
                        source: &source.source,
                        package: &package.package,
                        vulnerability,
                        group_info,
                    });
                }
            }
        }
        rows
    }

    /// 전체 취약점 레코드 수
    pub fn vulnerability_count(&self) -> usize {
        self.packages().map(|p| p.vulnerabilities.len()).sum()
    }

    /// 전체 그룹 수
    pub fn group_count(&self) -> usize {
        self.packages().map(|p| p.groups.len()).sum()
    }

    /// 모든 소스의 패키지를 순서대로 순회합니다.
    pub fn packages(&self) -> impl Iterator<Item = &PackageVulns> {
        self.results.iter().flat_map(|s| s.packages.iter())
    }

    /// 모든 소스의 패키지를 순서대로 가변 순회합니다.
    pub fn packages_mut(&mut self) -> impl Iterator<Item = &mut PackageVulns> {
        self.results.iter_mut().flat_map(|s| s.packages.iter_mut())
    }
}

/// 라이선스 검사 관련 실행 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalConfig {
    /// 라이선스 설정
    #[serde(default)]
    pub licenses: LicenseConfig,
}

impl ExperimentalConfig {
    /// 라이선스 검사가 꺼져 있는지 여부
    pub fn is_disabled(&self) -> bool {
        !self.licenses.summary && self.licenses.allowlist.is_empty()
    }
}

/// 라이선스 요약 / 허용 목록 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseConfig {
    /// 요약 테이블 출력 여부
    #[serde(default)]
    pub summary: bool,
    /// 허용 라이선스 목록
    #[serde(default)]
    pub allowlist: Vec<License>,
}

/// 스캔된 파일 하나
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceInfo {
    /// 파일 경로
    pub path: String,
    /// 소스 종류 (lockfile, sbom, git 등)
    #[serde(rename = "type")]
    pub source_type: String,
}

impl SourceInfo {
    /// 새 소스 정보를 생성합니다.
    pub fn new(source_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source_type: source_type.into(),
        }
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_type, self.path)
    }
}

/// 소스 하나와 그 안의 취약 패키지 목록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSource {
    /// 소스 정보
    pub source: SourceInfo,
    /// 패키지 목록
    #[serde(default)]
    pub packages: Vec<PackageVulns>,
}

/// 패키지 식별 정보
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageInfo {
    /// 패키지 이름
    pub name: String,
    /// 버전
    pub version: String,
    /// 생태계 (`npm`, `Go:gomod`처럼 콜론 한정자를 가질 수 있음)
    pub ecosystem: String,
}

impl PackageInfo {
    /// 새 패키지 정보를 생성합니다.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        ecosystem: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ecosystem: ecosystem.into(),
        }
    }

    /// 첫 번째 `:` 앞부분만 남긴 생태계 이름
    pub fn base_ecosystem(&self) -> &str {
        base_ecosystem(&self.ecosystem)
    }
}

/// 패키지 버전 하나에 대한 취약점, 그룹, 라이선스
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageVulns {
    /// 패키지 정보
    pub package: PackageInfo,
    /// 매칭된 OSV 레코드
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    /// 별칭 그룹
    #[serde(default)]
    pub groups: Vec<GroupInfo>,
    /// 보강된 라이선스 (SPDX)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<License>,
    /// 허용 목록 위반 라이선스
    #[serde(
        default,
        rename = "licenseViolations",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub license_violations: Vec<License>,
}

impl PackageVulns {
    /// 취약점 없는 패키지 항목을 생성합니다.
    pub fn new(package: PackageInfo) -> Self {
        Self {
            package,
            vulnerabilities: Vec::new(),
            groups: Vec::new(),
            licenses: Vec::new(),
            license_violations: Vec::new(),
        }
    }

    /// `id`를 포함하는 첫 번째 그룹
    pub fn group_for(&self, id: &str) -> Option<&GroupInfo> {
        self.groups.iter().find(|g| g.ids.iter().any(|gid| gid == id))
    }

    /// ID가 일치하는 취약점 레코드 (선형 탐색)
    pub fn vulnerability(&self, id: &str) -> Option<&Vulnerability> {
        self.vulnerabilities.iter().find(|v| v.id == id)
    }
}

/// 별칭 관계로 묶인 취약점 ID 집합
///
/// `ids`는 오름차순 정렬 상태를 유지하며, 쉼표로 이은 문자열이 그룹의 식별 키입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    /// 그룹에 속한 취약점 ID (정렬됨)
    pub ids: Vec<String>,
    /// 분석기 이름 → 호출 분석 결과
    #[serde(
        default,
        rename = "experimentalAnalysis",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub experimental_analysis: BTreeMap<String, AnalysisInfo>,
}

impl GroupInfo {
    /// ID 목록으로 그룹을 생성합니다. ID는 정렬됩니다.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        ids.sort();
        Self {
            ids,
            experimental_analysis: BTreeMap::new(),
        }
    }

    /// 분석 결과를 추가합니다.
    pub fn with_analysis(mut self, analyzer: impl Into<String>, called: bool) -> Self {
        self.experimental_analysis
            .insert(analyzer.into(), AnalysisInfo { called });
        self
    }

    /// 그룹의 취약 코드가 실제로 호출되는지 여부
    ///
    /// 분석 결과가 없으면 호출된 것으로 간주합니다. 분석 결과가 있으면
    /// 하나라도 `called`일 때 참입니다.
    pub fn is_called(&self) -> bool {
        self.experimental_analysis.is_empty()
            || self.experimental_analysis.values().any(|a| a.called)
    }

    /// 그룹 식별 키 (`ids`를 쉼표로 연결, 정렬하지 않음)
    pub fn index_string(&self) -> String {
        self.ids.join(",")
    }
}

/// 호출 분석 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInfo {
    /// 취약 코드 호출 여부
    pub called: bool,
}

/// SPDX 라이선스 식별자
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct License(String);

impl License {
    /// 라이선스를 알 수 없을 때 사용하는 값
    pub const UNKNOWN: &'static str = "UNKNOWN";

    /// 새 라이선스 식별자를 생성합니다.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `UNKNOWN` 라이선스
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_owned())
    }

    /// 식별자 문자열
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `UNKNOWN` 여부
    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for License {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for License {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// OSV 취약점 레코드
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// OSV ID (`GHSA-...`, `CVE-...` 등)
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawn: Option<String>,
    /// 같은 취약점을 가리키는 다른 ID
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// 영향받는 패키지와 버전 범위
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected: Vec<Affected>,
    /// 심각도 벡터 목록
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub severity: Vec<Severity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_specific: Option<serde_json::Value>,
}

impl Vulnerability {
    /// 패키지별 수정 버전 목록
    ///
    /// `fixed` 이벤트마다 현재 키에 한 번 추가한 뒤, 키의 생태계에 `:` 한정자가
    /// 있으면 첫 `:` 앞까지 잘라 키를 바꾸고 다시 한 번 추가합니다. 잘린 키는
    /// 같은 `affected` 항목의 이후 이벤트에도 그대로 쓰입니다.
    ///
    /// `Go:gomod`에 수정 버전 `1.0`, `2.0`이 있으면 `Go:gomod → [1.0]`,
    /// `Go → [1.0, 2.0, 2.0]`입니다. 한정자가 없는 생태계는 이벤트마다 같은
    /// 버전이 두 번 들어갑니다. 수정 이벤트가 없는 패키지는 맵에 없습니다.
    pub fn fixed_versions(&self) -> BTreeMap<PackageKey, Vec<String>> {
        let mut fixed: BTreeMap<PackageKey, Vec<String>> = BTreeMap::new();
        for affected in &self.affected {
            let mut key = PackageKey::from(&affected.package);
            for event in affected.ranges.iter().flat_map(|r| r.events.iter()) {
                let Some(version) = event.fixed.as_deref().filter(|v| !v.is_empty()) else {
                    continue;
                };
                fixed.entry(key.clone()).or_default().push(version.to_owned());
                if key.ecosystem.contains(':') {
                    key = key.with_base_ecosystem();
                }
                fixed.entry(key.clone()).or_default().push(version.to_owned());
            }
        }
        fixed
    }
}

/// 영향받는 패키지 항목
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Affected {
    pub package: AffectedPackage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<Range>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem_specific: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_specific: Option<serde_json::Value>,
}

/// 영향받는 패키지 식별자
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffectedPackage {
    pub ecosystem: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub purl: String,
}

/// 버전 범위
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    /// 범위 종류 (SEMVER, ECOSYSTEM, GIT)
    #[serde(rename = "type")]
    pub range_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// 범위 이벤트
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_affected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

/// 심각도 항목 (종류 + 벡터 문자열)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Severity {
    #[serde(rename = "type")]
    pub severity_type: SeverityType,
    pub score: String,
}

/// 참조 링크
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type")]
    pub reference_type: String,
    pub url: String,
}

/// 수정 버전 맵의 키 (purl을 제외한 영향 패키지)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageKey {
    pub ecosystem: String,
    pub name: String,
}

impl PackageKey {
    /// 새 키를 생성합니다.
    pub fn new(ecosystem: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ecosystem: ecosystem.into(),
            name: name.into(),
        }
    }

    fn with_base_ecosystem(&self) -> Self {
        Self {
            ecosystem: base_ecosystem(&self.ecosystem).to_owned(),
            name: self.name.clone(),
        }
    }
}

impl From<&AffectedPackage> for PackageKey {
    fn from(package: &AffectedPackage) -> Self {
        Self::new(package.ecosystem.clone(), package.name.clone())
    }
}

/// 결과 트리에서 펼친 행 하나 (읽기 전용 뷰)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VulnerabilityFlattened<'a> {
    pub source: &'a SourceInfo,
    pub package: &'a PackageInfo,
    pub vulnerability: &'a Vulnerability,
    pub group_info: &'a GroupInfo,
}

/// `Go:gomod` → `Go`
pub(crate) fn base_ecosystem(ecosystem: &str) -> &str {
    ecosystem.split(':').next().unwrap_or(ecosystem)
}

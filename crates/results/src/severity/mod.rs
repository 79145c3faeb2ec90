//! 심각도 해석
//!
//! OSV 심각도 항목은 (종류, 벡터 문자열) 쌍입니다. 종류마다 디코더가 하나씩
//! 대응하며, [`max_severity`]는 그룹에 속한 모든 ID의 심각도 중 최댓값을 구합니다.
//!
//! 새 점수 체계를 추가하려면 [`SeverityType`]에 변형 하나와 `decode` 분기
//! 하나를 추가하면 됩니다.

pub mod cvss_v2;
pub mod cvss_v3;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{GroupInfo, PackageVulns};

/// 심각도 벡터 종류
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SeverityType {
    /// `CVSS_V2`
    CvssV2,
    /// `CVSS_V3` (3.0, 3.1)
    CvssV3,
    /// 그 외 종류. 원문을 보존하며 점수를 만들지 않습니다.
    Other(String),
}

impl SeverityType {
    /// OSV 스키마의 종류 문자열
    pub fn as_str(&self) -> &str {
        match self {
            Self::CvssV2 => "CVSS_V2",
            Self::CvssV3 => "CVSS_V3",
            Self::Other(raw) => raw,
        }
    }

    /// 벡터 문자열을 기본 점수(0.0-10.0)로 디코딩합니다.
    pub fn decode(&self, vector: &str) -> Result<f64, CvssError> {
        match self {
            Self::CvssV2 => cvss_v2::base_score(vector),
            Self::CvssV3 => cvss_v3::base_score(vector),
            Self::Other(raw) => Err(CvssError::UnsupportedType(raw.clone())),
        }
    }
}

impl From<String> for SeverityType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CVSS_V2" => Self::CvssV2,
            "CVSS_V3" => Self::CvssV3,
            _ => Self::Other(value),
        }
    }
}

impl From<SeverityType> for String {
    fn from(value: SeverityType) -> Self {
        match value {
            SeverityType::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for SeverityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CVSS 벡터 디코딩 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CvssError {
    /// `CVSS:3.x/` 접두어 없음
    #[error("missing CVSS version prefix")]
    MissingPrefix,

    /// 지원하지 않는 CVSS 버전
    #[error("unsupported CVSS version: {0}")]
    UnsupportedVersion(String),

    /// `KEY:VALUE` 형식이 아닌 구성 요소
    #[error("malformed metric: '{0}'")]
    MalformedMetric(String),

    /// 알 수 없는 메트릭 이름
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// 메트릭 값이 허용 범위 밖
    #[error("invalid value '{value}' for metric {metric}")]
    InvalidValue { metric: String, value: String },

    /// 같은 메트릭이 두 번 등장
    #[error("duplicate metric: {0}")]
    DuplicateMetric(String),

    /// 필수 기본 메트릭 누락
    #[error("missing base metric: {0}")]
    MissingMetric(&'static str),

    /// 디코더가 없는 심각도 종류
    #[error("unsupported severity type: {0}")]
    UnsupportedType(String),
}

/// 그룹의 최대 심각도 점수
///
/// 그룹의 각 ID에 대해 패키지의 취약점 목록을 선형 탐색하고, 모든 심각도 항목을
/// 디코딩하여 최댓값을 구합니다. 디코딩에 실패한 항목은 건너뜁니다.
/// 점수를 하나도 얻지 못하면 `None`을 반환합니다. `Some(0.0)`은 실제 점수입니다.
pub fn max_severity(group: &GroupInfo, package: &PackageVulns) -> Option<f64> {
    let mut max: Option<f64> = None;
    for id in &group.ids {
        let Some(vulnerability) = package.vulnerability(id) else {
            continue;
        };
        for severity in &vulnerability.severity {
            match severity.severity_type.decode(&severity.score) {
                Ok(score) => max = Some(max.map_or(score, |m| m.max(score))),
                Err(e) => debug!(
                    id = %id,
                    severity_type = %severity.severity_type,
                    error = %e,
                    "skipping undecodable severity"
                ),
            }
        }
    }
    max
}

/// 점수를 표시용 문자열로 변환합니다. `None`은 빈 문자열입니다.
///
/// 가장 짧은 십진 표현을 사용합니다 (`7.5`, `6`, `0`).
pub fn format_score(score: Option<f64>) -> String {
    score.map(|s| s.to_string()).unwrap_or_default()
}

/// `KEY:VALUE/KEY:VALUE` 본문을 쌍 목록으로 나누고 중복을 검사합니다.
pub(crate) fn split_metrics(body: &str) -> Result<Vec<(&str, &str)>, CvssError> {
    let mut metrics: Vec<(&str, &str)> = Vec::new();
    for part in body.split('/') {
        let Some((key, value)) = part.split_once(':') else {
            return Err(CvssError::MalformedMetric(part.to_owned()));
        };
        if key.is_empty() || value.is_empty() {
            return Err(CvssError::MalformedMetric(part.to_owned()));
        }
        if metrics.iter().any(|(k, _)| *k == key) {
            return Err(CvssError::DuplicateMetric(key.to_owned()));
        }
        metrics.push((key, value));
    }
    Ok(metrics)
}

/// 필수 메트릭 값을 찾습니다.
pub(crate) fn required<'a>(
    metrics: &[(&str, &'a str)],
    key: &'static str,
) -> Result<&'a str, CvssError> {
    metrics
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .ok_or(CvssError::MissingMetric(key))
}

pub(crate) fn invalid(metric: &str, value: &str) -> CvssError {
    CvssError::InvalidValue {
        metric: metric.to_owned(),
        value: value.to_owned(),
    }
}

//! 라이선스 보강과 정책 검사
//!
//! - [`LicenseClient`]: 패키지 버전 하나의 라이선스를 조회하는 trait
//! - [`DepsDevClient`]: deps.dev v3 REST API 구현
//! - [`fetch_licenses`]: 질의 목록을 동시에 조회하고 입력 순서대로 결과를 돌려줌
//! - [`LicenseEnricher`]: 결과 트리의 모든 패키지에 라이선스를 기록
//! - [`LicensePolicy`]: 허용 목록 위반 검사

pub mod depsdev;
pub mod enrich;
pub mod policy;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::models::{License, PackageInfo};

pub use depsdev::DepsDevClient;
pub use enrich::{EnrichmentOutcome, LicenseBatch, LicenseEnricher, fetch_licenses};
pub use policy::{LicensePolicy, license_counts};

/// 패키지 인사이트 서비스의 패키지 시스템
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum System {
    Npm,
    NuGet,
    Cargo,
    Go,
    Maven,
    PyPI,
}

impl System {
    /// 결과 모델의 생태계 이름으로부터 시스템을 찾습니다.
    ///
    /// 지원하지 않는 생태계(비공개 레지스트리 등)는 `None`입니다.
    pub fn from_ecosystem(ecosystem: &str) -> Option<Self> {
        match ecosystem {
            "npm" => Some(Self::Npm),
            "NuGet" => Some(Self::NuGet),
            "crates.io" => Some(Self::Cargo),
            "Go" => Some(Self::Go),
            "Maven" => Some(Self::Maven),
            "PyPI" => Some(Self::PyPI),
            _ => None,
        }
    }

    /// 서비스가 사용하는 시스템 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "NPM",
            Self::NuGet => "NUGET",
            Self::Cargo => "CARGO",
            Self::Go => "GO",
            Self::Maven => "MAVEN",
            Self::PyPI => "PYPI",
        }
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 패키지 버전 조회 키
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionQuery {
    pub system: System,
    pub name: String,
    pub version: String,
}

impl VersionQuery {
    /// 조회 키를 생성합니다. Go 모듈 버전에는 `v` 접두어를 붙입니다.
    pub fn new(system: System, name: impl Into<String>, version: impl Into<String>) -> Self {
        let version = version.into();
        let version = match system {
            System::Go => format!("v{version}"),
            _ => version,
        };
        Self {
            system,
            name: name.into(),
            version,
        }
    }

    /// 결과 모델의 패키지로부터 조회 키를 만듭니다.
    ///
    /// 생태계 한정자(`Go:gomod`의 `gomod`)는 무시합니다.
    pub fn for_package(package: &PackageInfo) -> Option<Self> {
        let system = System::from_ecosystem(package.base_ecosystem())?;
        Some(Self::new(system, &package.name, &package.version))
    }
}

impl fmt::Display for VersionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.system, self.name, self.version)
    }
}

/// 라이선스 조회 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LicenseError {
    /// 서비스에 해당 패키지 버전이 없음
    #[error("{system} package {name}@{version} not found")]
    NotFound {
        system: System,
        name: String,
        version: String,
    },

    /// 성공이 아닌 HTTP 상태 코드
    #[error("license service returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// 연결, TLS, 전송 실패
    #[error("license request failed: {0}")]
    Transport(String),

    /// 응답 본문 디코딩 실패
    #[error("invalid license response: {0}")]
    Decode(String),

    /// 배치 기한 초과
    #[error("license batch deadline of {0:?} exceeded")]
    Deadline(Duration),

    /// 조회 태스크 비정상 종료
    #[error("license lookup task failed: {0}")]
    TaskJoin(String),

    /// 서비스 주소가 올바르지 않음
    #[error("invalid license service endpoint: {0}")]
    InvalidEndpoint(String),
}

impl LicenseError {
    /// 조회 대상 없음 에러인지 여부
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// 조회 키로부터 `NotFound` 에러를 만듭니다.
    pub fn not_found(query: &VersionQuery) -> Self {
        Self::NotFound {
            system: query.system,
            name: query.name.clone(),
            version: query.version.clone(),
        }
    }
}

/// 라이선스 조회 클라이언트
///
/// 구현체는 여러 태스크에서 `Arc`로 공유됩니다.
/// 패키지 버전이 없으면 [`LicenseError::NotFound`]를 반환해야 합니다.
pub trait LicenseClient: Send + Sync + 'static {
    /// 패키지 버전 하나의 라이선스 목록을 조회합니다.
    fn get_version(
        &self,
        query: &VersionQuery,
    ) -> impl Future<Output = Result<Vec<License>, LicenseError>> + Send;
}

//! 라이선스 보강 설정
//!
//! [`EnricherConfig`]는 core의 [`EnrichmentConfig`](depsight_core::config::EnrichmentConfig)와
//! [`LicensesConfig`](depsight_core::config::LicensesConfig)에서 파생됩니다.
//!
//! # 사용 예시
//!
//! ```
//! use depsight_results::EnricherConfigBuilder;
//!
//! let config = EnricherConfigBuilder::new()
//!     .endpoint("https://api.deps.dev")
//!     .timeout_secs(30)
//!     .allowlist(vec!["MIT".to_owned(), "Apache-2.0".to_owned()])
//!     .build()
//!     .unwrap();
//! assert_eq!(config.deadline().as_secs(), 30);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ResultsError;
use crate::models::{ExperimentalConfig, License, LicenseConfig};

/// 배치 기한 상한 (초)
const MAX_TIMEOUT_SECS: u64 = 600;

/// 라이선스 보강 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnricherConfig {
    /// 패키지 인사이트 서비스 주소
    pub endpoint: String,
    /// 배치 전체 기한 (초)
    pub timeout_secs: u64,
    /// 요청 User-Agent
    pub user_agent: String,
    /// 라이선스 요약 출력 여부
    pub summary: bool,
    /// 허용 라이선스 목록
    pub allowlist: Vec<String>,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        let core = depsight_core::config::EnrichmentConfig::default();
        Self {
            endpoint: core.endpoint,
            timeout_secs: core.timeout_secs,
            user_agent: core.user_agent,
            summary: false,
            allowlist: Vec::new(),
        }
    }
}

impl EnricherConfig {
    /// core 설정에서 보강 설정을 생성합니다.
    pub fn from_core(config: &depsight_core::config::DepsightConfig) -> Self {
        Self {
            endpoint: config.enrichment.endpoint.clone(),
            timeout_secs: config.enrichment.timeout_secs,
            user_agent: config.enrichment.user_agent.clone(),
            summary: config.licenses.enabled,
            allowlist: config.licenses.allowlist.clone(),
        }
    }

    /// 배치 전체 기한
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 라이선스 보강이 필요한지 여부
    pub fn is_enabled(&self) -> bool {
        self.summary || !self.allowlist.is_empty()
    }

    /// 결과 트리에 기록할 실험 설정
    pub fn experimental_config(&self) -> ExperimentalConfig {
        ExperimentalConfig {
            licenses: LicenseConfig {
                summary: self.summary,
                allowlist: self.allowlist.iter().map(License::new).collect(),
            },
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `endpoint`: `http://` 또는 `https://` URL
    /// - `timeout_secs`: 1-600
    /// - `user_agent`: 비어있으면 안 됨
    /// - `allowlist`: 빈 식별자 불가
    pub fn validate(&self) -> Result<(), ResultsError> {
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(ResultsError::Config {
                field: "endpoint".to_owned(),
                reason: "must be an http:// or https:// URL".to_owned(),
            });
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ResultsError::Config {
                field: "timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_TIMEOUT_SECS}"),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(ResultsError::Config {
                field: "user_agent".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.allowlist.iter().any(|l| l.trim().is_empty()) {
            return Err(ResultsError::Config {
                field: "allowlist".to_owned(),
                reason: "license identifiers must not be empty".to_owned(),
            });
        }

        Ok(())
    }
}

/// [`EnricherConfig`] 빌더
#[derive(Default)]
pub struct EnricherConfigBuilder {
    config: EnricherConfig,
}

impl EnricherConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 서비스 주소를 설정합니다.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// 배치 기한(초)을 설정합니다.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// User-Agent를 설정합니다.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// 라이선스 요약 여부를 설정합니다.
    pub fn summary(mut self, summary: bool) -> Self {
        self.config.summary = summary;
        self
    }

    /// 허용 라이선스 목록을 설정합니다.
    pub fn allowlist(mut self, allowlist: Vec<String>) -> Self {
        self.config.allowlist = allowlist;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ResultsError::Config` 반환
    pub fn build(self) -> Result<EnricherConfig, ResultsError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

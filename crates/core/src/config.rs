//! 설정 관리 - depsight.toml 파싱 및 런타임 설정
//!
//! [`DepsightConfig`]는 모든 단계(라이선스 보강, 정책 검사, 리포트 출력)의
//! 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`DEPSIGHT_OUTPUT_FORMAT=sarif` 형식)
//! 3. 설정 파일 (`depsight.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), depsight_core::error::DepsightError> {
//! use depsight_core::config::DepsightConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = DepsightConfig::load("depsight.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = DepsightConfig::parse("[output]\nformat = \"sarif\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, DepsightError};

/// 지원하는 리포트 형식 이름
pub const OUTPUT_FORMATS: [&str; 4] = ["table", "json", "sarif", "markdown"];

/// 라이선스 조회 배치 기한 상한 (초)
const MAX_TIMEOUT_SECS: u64 = 600;

/// depsight 통합 설정
///
/// `depsight.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepsightConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 라이선스 요약 / 허용 목록
    #[serde(default)]
    pub licenses: LicensesConfig,
    /// 라이선스 보강 서비스 설정
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    /// 리포트 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
}

impl DepsightConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DepsightError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DepsightError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DepsightError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                DepsightError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, DepsightError> {
        toml::from_str(toml_str).map_err(|e| {
            DepsightError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `DEPSIGHT_{SECTION}_{FIELD}`
    /// 예: `DEPSIGHT_LICENSES_ALLOWLIST=MIT,Apache-2.0`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "DEPSIGHT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "DEPSIGHT_GENERAL_LOG_FORMAT");

        // Licenses
        override_bool(&mut self.licenses.enabled, "DEPSIGHT_LICENSES_ENABLED");
        override_csv(&mut self.licenses.allowlist, "DEPSIGHT_LICENSES_ALLOWLIST");

        // Enrichment
        override_string(
            &mut self.enrichment.endpoint,
            "DEPSIGHT_ENRICHMENT_ENDPOINT",
        );
        override_u64(
            &mut self.enrichment.timeout_secs,
            "DEPSIGHT_ENRICHMENT_TIMEOUT_SECS",
        );
        override_string(
            &mut self.enrichment.user_agent,
            "DEPSIGHT_ENRICHMENT_USER_AGENT",
        );

        // Output
        override_string(&mut self.output.format, "DEPSIGHT_OUTPUT_FORMAT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DepsightError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if !OUTPUT_FORMATS.contains(&self.output.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "output.format".to_owned(),
                reason: format!("must be one of: {}", OUTPUT_FORMATS.join(", ")),
            }
            .into());
        }

        if self.licenses.allowlist.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "licenses.allowlist".to_owned(),
                reason: "license identifiers must not be empty".to_owned(),
            }
            .into());
        }

        // 보강 설정은 라이선스 요약이나 허용 목록이 있을 때만 검증
        if self.licenses_requested() {
            if self.enrichment.timeout_secs == 0 || self.enrichment.timeout_secs > MAX_TIMEOUT_SECS
            {
                return Err(ConfigError::InvalidValue {
                    field: "enrichment.timeout_secs".to_owned(),
                    reason: format!("must be 1-{MAX_TIMEOUT_SECS}"),
                }
                .into());
            }

            let endpoint = self.enrichment.endpoint.as_str();
            if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
                return Err(ConfigError::InvalidValue {
                    field: "enrichment.endpoint".to_owned(),
                    reason: "must be an http:// or https:// URL".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// 라이선스 보강이 필요한지 여부
    ///
    /// 허용 목록이 지정되면 `enabled` 값과 무관하게 보강이 필요합니다.
    pub fn licenses_requested(&self) -> bool {
        self.licenses.enabled || !self.licenses.allowlist.is_empty()
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 라이선스 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LicensesConfig {
    /// 라이선스 요약 활성화 여부
    pub enabled: bool,
    /// 허용 라이선스 목록 (SPDX). 비어있지 않으면 위반 검사 모드
    pub allowlist: Vec<String>,
}

/// 라이선스 보강 서비스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// 패키지 인사이트 서비스 주소
    pub endpoint: String,
    /// 배치 전체 기한 (초)
    pub timeout_secs: u64,
    /// 요청 User-Agent
    pub user_agent: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deps.dev".to_owned(),
            timeout_secs: 60,
            user_agent: concat!("depsight/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// 리포트 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 리포트 형식 (table, json, sarif, markdown)
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "table".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = DepsightConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.log_format, "pretty");
        assert!(!config.licenses.enabled);
        assert!(config.licenses.allowlist.is_empty());
        assert_eq!(config.enrichment.endpoint, "https://api.deps.dev");
        assert_eq!(config.output.format, "table");
    }

    #[test]
    fn default_config_passes_validation() {
        let config = DepsightConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = DepsightConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.enrichment.timeout_secs, 60);
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[licenses]
enabled = true
allowlist = ["MIT", "Apache-2.0"]
"#;
        let config = DepsightConfig::parse(toml).unwrap();
        assert!(config.licenses.enabled);
        assert_eq!(config.licenses.allowlist, vec!["MIT", "Apache-2.0"]);
        // 다른 섹션은 기본값 유지
        assert_eq!(config.output.format, "table");
        assert_eq!(config.general.log_format, "pretty");
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = DepsightConfig::parse("invalid = [[[toml");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            DepsightError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = DepsightConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_unknown_output_format() {
        let mut config = DepsightConfig::default();
        config.output.format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }

    #[test]
    fn validate_rejects_zero_timeout_when_enabled() {
        let mut config = DepsightConfig::default();
        config.licenses.enabled = true;
        config.enrichment.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn validate_rejects_zero_timeout_with_allowlist_only() {
        let mut config = DepsightConfig::default();
        config.licenses.allowlist = vec!["MIT".to_owned()];
        config.enrichment.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn validate_accepts_zero_timeout_when_disabled() {
        let mut config = DepsightConfig::default();
        config.enrichment.timeout_secs = 0;
        // 라이선스 검사가 꺼져 있으면 보강 설정 검증을 건너뜀
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_non_http_endpoint() {
        let mut config = DepsightConfig::default();
        config.licenses.enabled = true;
        config.enrichment.endpoint = "api.deps.dev:443".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn validate_rejects_blank_allowlist_entry() {
        let mut config = DepsightConfig::default();
        config.licenses.allowlist = vec!["MIT".to_owned(), " ".to_owned()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn allowlist_implies_license_request() {
        let mut config = DepsightConfig::default();
        assert!(!config.licenses_requested());
        config.licenses.allowlist = vec!["MIT".to_owned()];
        assert!(config.licenses_requested());
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_DEPSIGHT_STR", "overridden") };
        override_string(&mut val, "TEST_DEPSIGHT_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_DEPSIGHT_STR") };
    }

    #[test]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_DEPSIGHT_BOOL_BAD", "yes please") };
        override_bool(&mut val, "TEST_DEPSIGHT_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_DEPSIGHT_BOOL_BAD") };
    }

    #[test]
    fn env_override_u64_valid() {
        let mut val = 60;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_DEPSIGHT_U64", "15") };
        override_u64(&mut val, "TEST_DEPSIGHT_U64");
        assert_eq!(val, 15);
        unsafe { std::env::remove_var("TEST_DEPSIGHT_U64") };
    }

    #[test]
    fn env_override_csv_skips_empty_items() {
        let mut val = Vec::new();
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_DEPSIGHT_CSV", "MIT, ,Apache-2.0,") };
        override_csv(&mut val, "TEST_DEPSIGHT_CSV");
        assert_eq!(val, vec!["MIT", "Apache-2.0"]);
        unsafe { std::env::remove_var("TEST_DEPSIGHT_CSV") };
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = DepsightConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = DepsightConfig::parse(&toml_str).unwrap();
        assert_eq!(config.enrichment.endpoint, parsed.enrichment.endpoint);
        assert_eq!(config.output.format, parsed.output.format);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = DepsightConfig::from_file("/nonexistent/path/depsight.toml").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            DepsightError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}

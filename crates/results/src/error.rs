//! 결과 처리 에러 타입
//!
//! [`ResultsError`]는 보강, 직렬화, 출력 중 발생하는 에러를 나타냅니다.
//! `From<ResultsError> for DepsightError` 구현으로 `?` 연산자를 통해
//! 상위 에러 타입으로 전파됩니다.

use depsight_core::error::{DepsightError, EnrichmentError, ReportError};

use crate::license::LicenseError;

/// 결과 처리 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ResultsError {
    /// 라이선스 보강 실패
    #[error("license enrichment failed: {0}")]
    License(#[from] LicenseError),

    /// JSON / SARIF 직렬화 실패
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// 출력 쓰기 실패
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<ResultsError> for DepsightError {
    fn from(err: ResultsError) -> Self {
        match err {
            ResultsError::License(e @ LicenseError::NotFound { .. }) => {
                DepsightError::Enrichment(EnrichmentError::NotFound(e.to_string()))
            }
            ResultsError::License(e @ LicenseError::Deadline(_)) => {
                DepsightError::Enrichment(EnrichmentError::Deadline(e.to_string()))
            }
            ResultsError::License(e) => {
                DepsightError::Enrichment(EnrichmentError::RequestFailed(e.to_string()))
            }
            ResultsError::Serialize(e) => DepsightError::Report(ReportError::Serialize(e.to_string())),
            ResultsError::Io(e) => DepsightError::Report(ReportError::Write(e.to_string())),
            ResultsError::Config { field, reason } => DepsightError::Config(
                depsight_core::error::ConfigError::InvalidValue { field, reason },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::license::System;

    #[test]
    fn config_error_display() {
        let err = ResultsError::Config {
            field: "timeout_secs".to_owned(),
            reason: "must be 1-600".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("timeout_secs"));
        assert!(msg.contains("must be 1-600"));
    }

    #[test]
    fn not_found_maps_to_enrichment_not_found() {
        let err: DepsightError = ResultsError::License(LicenseError::NotFound {
            system: System::Npm,
            name: "left-pad".to_owned(),
            version: "1.3.0".to_owned(),
        })
        .into();
        assert!(matches!(
            err,
            DepsightError::Enrichment(EnrichmentError::NotFound(_))
        ));
    }

    #[test]
    fn deadline_maps_to_enrichment_deadline() {
        let err: DepsightError =
            ResultsError::License(LicenseError::Deadline(Duration::from_secs(60))).into();
        assert!(matches!(
            err,
            DepsightError::Enrichment(EnrichmentError::Deadline(_))
        ));
    }

    #[test]
    fn transport_maps_to_request_failed() {
        let err: DepsightError =
            ResultsError::License(LicenseError::Transport("connection reset".to_owned())).into();
        assert!(matches!(
            err,
            DepsightError::Enrichment(EnrichmentError::RequestFailed(_))
        ));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn io_maps_to_report_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: DepsightError = ResultsError::Io(io_err).into();
        assert!(matches!(err, DepsightError::Report(ReportError::Write(_))));
    }

    #[test]
    fn config_maps_to_invalid_value() {
        let err: DepsightError = ResultsError::Config {
            field: "endpoint".to_owned(),
            reason: "must be an http:// or https:// URL".to_owned(),
        }
        .into();
        assert!(matches!(err, DepsightError::Config(_)));
    }
}

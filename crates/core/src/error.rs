//! 에러 타입 - 도메인별 에러 정의

/// depsight 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum DepsightError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 라이선스 보강 에러
    #[error("enrichment error: {0}")]
    Enrichment(#[from] EnrichmentError),

    /// 리포트 출력 에러
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 라이선스 보강 에러
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    /// 조회 대상 패키지 버전이 서비스에 없음
    #[error("package version not found: {0}")]
    NotFound(String),

    /// 요청 실패 (전송, 상태 코드, 응답 디코딩)
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// 배치 기한 초과
    #[error("deadline exceeded: {0}")]
    Deadline(String),
}

/// 리포트 출력 에러
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// 직렬화 실패
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// 출력 쓰기 실패
    #[error("write failed: {0}")]
    Write(String),
}

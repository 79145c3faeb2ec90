//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `depsight_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(depsight_core::metrics::REPORTS_RENDERED_TOTAL, "format" => "sarif").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, not_found, failure, skipped)
pub const LABEL_RESULT: &str = "result";

/// 리포트 형식 레이블 키 (table, json, sarif, markdown)
pub const LABEL_FORMAT: &str = "format";

// ─── 레이블 값 상수 ────────────────────────────────────────────────

/// 조회 성공
pub const RESULT_SUCCESS: &str = "success";

/// 조회 대상 없음 (UNKNOWN 처리)
pub const RESULT_NOT_FOUND: &str = "not_found";

/// 전송 실패, 기한 초과 등
pub const RESULT_FAILURE: &str = "failure";

/// 지원하지 않는 생태계라 조회하지 않음
pub const RESULT_SKIPPED: &str = "skipped";

// ─── License Enricher 메트릭 ────────────────────────────────────────

/// License: 패키지 버전별 라이선스 조회 수 (counter, label: result)
pub const LICENSE_QUERIES_TOTAL: &str = "depsight_license_queries_total";

/// License: 배치 전체 소요 시간 (histogram, 초)
pub const LICENSE_BATCH_DURATION_SECONDS: &str = "depsight_license_batch_duration_seconds";

/// License: 허용 목록 위반 패키지 수 (counter)
pub const LICENSE_VIOLATIONS_TOTAL: &str = "depsight_license_violations_total";

// ─── Reporter 메트릭 ───────────────────────────────────────────────

/// Report: 출력된 리포트 수 (counter, label: format)
pub const REPORTS_RENDERED_TOTAL: &str = "depsight_reports_rendered_total";

/// Report: 출력된 취약점 그룹 수 (counter)
pub const VULNERABILITY_GROUPS_REPORTED_TOTAL: &str =
    "depsight_vulnerability_groups_reported_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 라이선스 배치 소요 시간 히스토그램 버킷 (초)
///
/// 50ms ~ 120s 범위 (네트워크 왕복 포함)
pub const LICENSE_BATCH_DURATION_BUCKETS: [f64; 9] =
    [0.05, 0.1, 0.25, 0.5, 1.0, 5.0, 15.0, 60.0, 120.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더가 설치되어 있지 않으면 아무 효과가 없습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        LICENSE_QUERIES_TOTAL,
        "License lookups per package version, by result"
    );
    describe_histogram!(
        LICENSE_BATCH_DURATION_SECONDS,
        "Wall time of one license enrichment batch in seconds"
    );
    describe_counter!(
        LICENSE_VIOLATIONS_TOTAL,
        "Packages carrying at least one license outside the allowlist"
    );
    describe_counter!(REPORTS_RENDERED_TOTAL, "Reports rendered, by output format");
    describe_counter!(
        VULNERABILITY_GROUPS_REPORTED_TOTAL,
        "Vulnerability groups written to a report"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        LICENSE_QUERIES_TOTAL,
        LICENSE_BATCH_DURATION_SECONDS,
        LICENSE_VIOLATIONS_TOTAL,
        REPORTS_RENDERED_TOTAL,
        VULNERABILITY_GROUPS_REPORTED_TOTAL,
    ];

    #[test]
    fn all_metrics_start_with_depsight_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("depsight_"),
                "Metric '{}' does not start with 'depsight_' prefix",
                name
            );
        }
    }

    #[test]
    fn counters_end_with_total() {
        for name in [
            LICENSE_QUERIES_TOTAL,
            LICENSE_VIOLATIONS_TOTAL,
            REPORTS_RENDERED_TOTAL,
            VULNERABILITY_GROUPS_REPORTED_TOTAL,
        ] {
            assert!(name.ends_with("_total"), "{name} should end with _total");
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [LABEL_RESULT, LABEL_FORMAT] {
            assert_eq!(label.to_lowercase(), label);
        }
    }

    #[test]
    fn batch_duration_buckets_are_sorted() {
        let buckets = LICENSE_BATCH_DURATION_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }
}

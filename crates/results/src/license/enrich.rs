//! 라이선스 동시 조회와 결과 트리 보강
//!
//! 질의마다 태스크 하나를 띄우고, 모든 태스크가 하나의 절대 기한을 공유합니다.
//! 결과는 완료 순서와 무관하게 입력 인덱스 자리에 기록됩니다.
//!
//! # 에러 분류
//!
//! - `NotFound`: 해당 자리를 `UNKNOWN`으로 채우고 배치를 계속 진행 (지연 에러)
//! - 그 외: 배치 전체 실패. 남은 태스크는 모두 끝까지 기다린 뒤 처음 관찰된 에러 반환

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use depsight_core::metrics as m;

use super::{DepsDevClient, LicenseClient, LicenseError, VersionQuery};
use crate::config::EnricherConfig;
use crate::error::ResultsError;
use crate::models::{License, VulnerabilityResults};

/// 배치 조회 결과
#[derive(Debug, Clone, PartialEq)]
pub struct LicenseBatch {
    /// 입력 순서와 같은 길이의 라이선스 목록. 질의가 없던 자리는 빈 목록
    pub licenses: Vec<Vec<License>>,
    /// 처음 관찰된 `NotFound` 에러
    pub deferred: Option<LicenseError>,
}

impl LicenseBatch {
    /// 지연 에러가 있으면 에러로, 없으면 라이선스 목록으로 변환합니다.
    pub fn into_result(self) -> Result<Vec<Vec<License>>, LicenseError> {
        match self.deferred {
            Some(error) => Err(error),
            None => Ok(self.licenses),
        }
    }
}

/// 질의 목록의 라이선스를 동시에 조회합니다.
///
/// `None` 질의는 조회하지 않고 빈 목록을 남깁니다. 서비스가 빈 라이선스
/// 목록을 돌려주거나 패키지가 없으면 `[UNKNOWN]`을 기록합니다.
///
/// # Errors
///
/// `NotFound`가 아닌 조회 실패나 기한 초과가 하나라도 있으면, 모든 태스크가
/// 끝난 뒤 처음 관찰된 에러를 반환합니다.
pub async fn fetch_licenses<C: LicenseClient>(
    client: Arc<C>,
    queries: &[Option<VersionQuery>],
    deadline: Duration,
) -> Result<LicenseBatch, LicenseError> {
    let started = Instant::now();
    let deadline_at = tokio::time::Instant::now() + deadline;

    let mut licenses: Vec<Vec<License>> = vec![Vec::new(); queries.len()];
    let mut tasks = JoinSet::new();

    for (index, query) in queries.iter().enumerate() {
        let Some(query) = query.clone() else {
            counter!(m::LICENSE_QUERIES_TOTAL, m::LABEL_RESULT => m::RESULT_SKIPPED).increment(1);
            continue;
        };
        let client = Arc::clone(&client);
        tasks.spawn(async move {
            let outcome =
                match tokio::time::timeout_at(deadline_at, client.get_version(&query)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(LicenseError::Deadline(deadline)),
                };
            (index, query, outcome)
        });
    }

    debug!(tasks = tasks.len(), "license lookups started");

    let mut hard_error: Option<LicenseError> = None;
    let mut deferred: Option<LicenseError> = None;

    while let Some(joined) = tasks.join_next().await {
        let (index, query, outcome) = match joined {
            Ok(completed) => completed,
            Err(e) => {
                warn!(error = %e, "license lookup task failed");
                counter!(m::LICENSE_QUERIES_TOTAL, m::LABEL_RESULT => m::RESULT_FAILURE)
                    .increment(1);
                hard_error.get_or_insert(LicenseError::TaskJoin(e.to_string()));
                continue;
            }
        };

        match outcome {
            Ok(found) => {
                counter!(m::LICENSE_QUERIES_TOTAL, m::LABEL_RESULT => m::RESULT_SUCCESS)
                    .increment(1);
                licenses[index] = if found.is_empty() {
                    vec![License::unknown()]
                } else {
                    found
                };
            }
            Err(e) if e.is_not_found() => {
                debug!(query = %query, "package version not found");
                counter!(m::LICENSE_QUERIES_TOTAL, m::LABEL_RESULT => m::RESULT_NOT_FOUND)
                    .increment(1);
                licenses[index] = vec![License::unknown()];
                deferred.get_or_insert(e);
            }
            Err(e) => {
                warn!(query = %query, error = %e, "license lookup failed");
                counter!(m::LICENSE_QUERIES_TOTAL, m::LABEL_RESULT => m::RESULT_FAILURE)
                    .increment(1);
                hard_error.get_or_insert(e);
            }
        }
    }

    histogram!(m::LICENSE_BATCH_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

    match hard_error {
        Some(error) => Err(error),
        None => Ok(LicenseBatch { licenses, deferred }),
    }
}

/// 보강 결과 요약
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentOutcome {
    /// 조회한 패키지 수
    pub queried: usize,
    /// 지원하지 않는 생태계라 건너뛴 패키지 수
    pub skipped: usize,
    /// 처음 관찰된 `NotFound` 에러 (해당 패키지는 `UNKNOWN`)
    pub not_found: Option<LicenseError>,
}

/// 결과 트리 라이선스 보강기
pub struct LicenseEnricher<C> {
    client: Arc<C>,
    deadline: Duration,
}

impl<C: LicenseClient> LicenseEnricher<C> {
    /// 클라이언트와 배치 기한으로 보강기를 생성합니다.
    pub fn new(client: C, deadline: Duration) -> Self {
        Self::with_shared(Arc::new(client), deadline)
    }

    /// 이미 공유 중인 클라이언트를 사용합니다.
    pub fn with_shared(client: Arc<C>, deadline: Duration) -> Self {
        Self { client, deadline }
    }

    /// 배치 기한
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// 모든 패키지의 `licenses`를 채웁니다.
    ///
    /// 패키지 순회 순서(소스 → 패키지)대로 질의를 만들고, 결과를 같은 순서로
    /// 되돌려 씁니다. 배치가 실패하면 트리를 건드리지 않습니다.
    pub async fn enrich(
        &self,
        results: &mut VulnerabilityResults,
    ) -> Result<EnrichmentOutcome, ResultsError> {
        let queries: Vec<Option<VersionQuery>> = results
            .packages()
            .map(|p| VersionQuery::for_package(&p.package))
            .collect();
        let skipped = queries.iter().filter(|q| q.is_none()).count();
        let queried = queries.len() - skipped;

        let LicenseBatch { licenses, deferred } =
            fetch_licenses(Arc::clone(&self.client), &queries, self.deadline).await?;

        for (package, found) in results.packages_mut().zip(licenses) {
            package.licenses = found;
        }

        info!(queried, skipped, "license enrichment completed");
        Ok(EnrichmentOutcome {
            queried,
            skipped,
            not_found: deferred,
        })
    }
}

impl LicenseEnricher<DepsDevClient> {
    /// 설정으로 deps.dev 보강기를 생성합니다.
    pub fn from_config(config: &EnricherConfig) -> Result<Self, ResultsError> {
        config.validate()?;
        let client = DepsDevClient::new(config)?;
        Ok(Self::new(client, config.deadline()))
    }
}

//! deps.dev v3 REST 클라이언트
//!
//! `GET {endpoint}/v3/systems/{system}/packages/{name}/versions/{version}`
//! 응답의 `licenses` 배열을 읽습니다. 하나의 `reqwest::Client`(연결 풀, HTTP/2)를
//! 모든 조회가 공유합니다.

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use super::{LicenseClient, LicenseError, VersionQuery};
use crate::config::EnricherConfig;
use crate::models::License;

/// deps.dev 라이선스 클라이언트
#[derive(Debug, Clone)]
pub struct DepsDevClient {
    http: reqwest::Client,
    base: Url,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    #[serde(default)]
    licenses: Vec<String>,
}

impl DepsDevClient {
    /// 보강 설정으로 클라이언트를 생성합니다.
    pub fn new(config: &EnricherConfig) -> Result<Self, LicenseError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LicenseError::Transport(e.to_string()))?;
        Self::with_http_client(http, &config.endpoint)
    }

    /// 기본 설정과 지정한 서비스 주소로 클라이언트를 생성합니다.
    pub fn with_base_url(base_url: impl AsRef<str>) -> Result<Self, LicenseError> {
        let config = EnricherConfig {
            endpoint: base_url.as_ref().to_owned(),
            ..EnricherConfig::default()
        };
        Self::new(&config)
    }

    /// 이미 구성된 `reqwest::Client`를 사용합니다.
    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Result<Self, LicenseError> {
        let base = Url::parse(base_url)
            .map_err(|e| LicenseError::InvalidEndpoint(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(LicenseError::InvalidEndpoint(format!(
                "{base_url}: cannot be used as a base URL"
            )));
        }
        Ok(Self { http, base })
    }

    /// 조회 키에 해당하는 요청 URL. 이름과 버전은 경로 세그먼트로 인코딩됩니다.
    pub fn version_url(&self, query: &VersionQuery) -> Result<Url, LicenseError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| LicenseError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend([
                "v3",
                "systems",
                query.system.as_str(),
                "packages",
                query.name.as_str(),
                "versions",
                query.version.as_str(),
            ]);
        Ok(url)
    }
}

impl LicenseClient for DepsDevClient {
    async fn get_version(&self, query: &VersionQuery) -> Result<Vec<License>, LicenseError> {
        let url = self.version_url(query)?;
        debug!(url = %url, "querying package version");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LicenseError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LicenseError::not_found(query));
        }
        if !status.is_success() {
            return Err(LicenseError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body: VersionResponse = response
            .json()
            .await
            .map_err(|e| LicenseError::Decode(e.to_string()))?;
        Ok(body.licenses.into_iter().map(License::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::System;

    #[test]
    fn version_url_encodes_segments() {
        let client = DepsDevClient::with_base_url("https://api.deps.dev").unwrap();
        let query = VersionQuery::new(System::Go, "golang.org/x/net", "0.7.0");
        let url = client.version_url(&query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.deps.dev/v3/systems/GO/packages/golang.org%2Fx%2Fnet/versions/v0.7.0"
        );
    }

    #[test]
    fn version_url_keeps_base_path_prefix() {
        let client = DepsDevClient::with_base_url("http://proxy.internal/depsdev/").unwrap();
        let query = VersionQuery::new(System::Npm, "ansi-html", "0.0.1");
        let url = client.version_url(&query).unwrap();
        assert_eq!(
            url.as_str(),
            "http://proxy.internal/depsdev/v3/systems/NPM/packages/ansi-html/versions/0.0.1"
        );
    }

    #[test]
    fn rejects_unusable_endpoint() {
        assert!(matches!(
            DepsDevClient::with_base_url("not a url"),
            Err(LicenseError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            DepsDevClient::with_base_url("mailto:security@example.com"),
            Err(LicenseError::InvalidEndpoint(_))
        ));
    }
}

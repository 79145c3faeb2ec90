//! 결과 트리 조립
//!
//! 매칭 클라이언트가 (소스, 패키지) 단위로 흘려보내는 결과나, 이미 완성된
//! 트리 여러 개를 하나의 [`VulnerabilityResults`]로 합칩니다.

use std::collections::HashMap;

use crate::grouping::group_vulnerabilities;
use crate::models::{
    ExperimentalConfig, PackageSource, PackageVulns, SourceInfo, VulnerabilityResults,
};

/// [`VulnerabilityResults`] 빌더
///
/// 소스는 처음 등장한 순서대로, 패키지는 추가된 순서대로 유지합니다.
#[derive(Debug, Default)]
pub struct ResultsBuilder {
    sources: Vec<PackageSource>,
    positions: HashMap<SourceInfo, usize>,
}

impl ResultsBuilder {
    /// 빈 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 소스에 패키지 결과 하나를 추가합니다.
    ///
    /// 그룹이 비어 있고 취약점이 있으면 별칭 관계로 그룹을 계산합니다.
    pub fn add_package(&mut self, source: SourceInfo, mut package: PackageVulns) -> &mut Self {
        if package.groups.is_empty() && !package.vulnerabilities.is_empty() {
            package.groups = group_vulnerabilities(&package.vulnerabilities);
        }
        self.source_entry(source).packages.push(package);
        self
    }

    /// 패키지가 없는 소스를 등록합니다 (스캔했지만 취약점이 없는 파일).
    pub fn add_source(&mut self, source: SourceInfo) -> &mut Self {
        self.source_entry(source);
        self
    }

    /// 완성된 트리의 모든 소스와 패키지를 이어 붙입니다.
    pub fn merge(&mut self, results: VulnerabilityResults) -> &mut Self {
        for package_source in results.results {
            let PackageSource { source, packages } = package_source;
            self.add_source(source.clone());
            for package in packages {
                self.add_package(source.clone(), package);
            }
        }
        self
    }

    /// 등록된 소스 수
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// 트리를 완성합니다.
    pub fn build(self, experimental_config: ExperimentalConfig) -> VulnerabilityResults {
        VulnerabilityResults {
            results: self.sources,
            experimental_config,
        }
    }

    fn source_entry(&mut self, source: SourceInfo) -> &mut PackageSource {
        let position = match self.positions.get(&source) {
            Some(&position) => position,
            None => {
                self.sources.push(PackageSource {
                    source: source.clone(),
                    packages: Vec::new(),
                });
                let position = self.sources.len() - 1;
                self.positions.insert(source, position);
                position
            }
        };
        &mut self.sources[position]
    }
}

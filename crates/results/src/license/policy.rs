//! 라이선스 허용 목록 검사와 요약 집계

use std::collections::HashMap;

use metrics::counter;
use tracing::debug;

use depsight_core::metrics::LICENSE_VIOLATIONS_TOTAL;

use crate::models::{License, VulnerabilityResults};

/// 허용 목록 정책
///
/// 식별자 비교는 ASCII 대소문자를 구분하지 않습니다. 허용 목록이 비어 있으면
/// 어떤 라이선스도 위반이 아닙니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicensePolicy {
    allowlist: Vec<License>,
}

impl LicensePolicy {
    /// 허용 목록으로 정책을 생성합니다.
    pub fn new<I, L>(allowlist: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<License>,
    {
        Self {
            allowlist: allowlist.into_iter().map(Into::into).collect(),
        }
    }

    /// 허용 목록이 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.allowlist.is_empty()
    }

    /// 허용 목록
    pub fn allowlist(&self) -> &[License] {
        &self.allowlist
    }

    /// 라이선스가 허용되는지 여부
    pub fn allows(&self, license: &License) -> bool {
        self.allowlist
            .iter()
            .any(|allowed| allowed.as_str().eq_ignore_ascii_case(license.as_str()))
    }

    /// 허용 목록에 없는 라이선스를 입력 순서대로 돌려줍니다. `UNKNOWN`도 대상입니다.
    pub fn check(&self, licenses: &[License]) -> Vec<License> {
        if self.is_empty() {
            return Vec::new();
        }
        licenses
            .iter()
            .filter(|license| !self.allows(license))
            .cloned()
            .collect()
    }

    /// 모든 패키지의 `license_violations`를 채우고 위반 패키지 수를 돌려줍니다.
    pub fn apply(&self, results: &mut VulnerabilityResults) -> usize {
        let mut violating = 0;
        for package in results.packages_mut() {
            package.license_violations = self.check(&package.licenses);
            if !package.license_violations.is_empty() {
                debug!(
                    package = %package.package.name,
                    version = %package.package.version,
                    violations = package.license_violations.len(),
                    "license violation"
                );
                violating += 1;
            }
        }
        counter!(LICENSE_VIOLATIONS_TOTAL).increment(violating as u64);
        violating
    }
}

/// 라이선스별 패키지 버전 수
///
/// 개수 내림차순, 같은 개수는 식별자 오름차순이며 `UNKNOWN`은 항상 마지막입니다.
/// 한 패키지가 여러 라이선스를 가지면 각각 한 번씩 셉니다.
pub fn license_counts(results: &VulnerabilityResults) -> Vec<(License, usize)> {
    let mut counts: HashMap<&License, usize> = HashMap::new();
    for package in results.packages() {
        for license in &package.licenses {
            *counts.entry(license).or_default() += 1;
        }
    }

    let mut counts: Vec<(License, usize)> = counts
        .into_iter()
        .map(|(license, count)| (license.clone(), count))
        .collect();
    counts.sort_by(|(a, a_count), (b, b_count)| {
        a.is_unknown()
            .cmp(&b.is_unknown())
            .then_with(|| b_count.cmp(a_count))
            .then_with(|| a.cmp(b))
    });
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PackageInfo, PackageSource, PackageVulns, SourceInfo};

    fn licensed(name: &str, licenses: &[&str]) -> PackageVulns {
        PackageVulns {
            licenses: licenses.iter().map(|l| License::new(*l)).collect(),
            ..PackageVulns::new(PackageInfo::new(name, "1.0.0", "npm"))
        }
    }

    fn results(packages: Vec<PackageVulns>) -> VulnerabilityResults {
        VulnerabilityResults {
            results: vec![PackageSource {
                source: SourceInfo::new("lockfile", "package-lock.json"),
                packages,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn empty_allowlist_never_violates() {
        let policy = LicensePolicy::default();
        assert!(policy.check(&[License::new("GPL-3.0")]).is_empty());
    }

    #[test]
    fn check_returns_disallowed_in_order() {
        let policy = LicensePolicy::new(["MIT", "Apache-2.0"]);
        let violations = policy.check(&[
            License::new("GPL-3.0"),
            License::new("MIT"),
            License::unknown(),
        ]);
        assert_eq!(violations, vec![License::new("GPL-3.0"), License::unknown()]);
    }

    #[test]
    fn comparison_ignores_ascii_case() {
        let policy = LicensePolicy::new(["mit"]);
        assert!(policy.check(&[License::new("MIT")]).is_empty());
    }

    #[test]
    fn violations_keep_package_spelling() {
        let policy = LicensePolicy::new(["mit"]);
        let violations = policy.check(&[License::new("Mit"), License::new("gpl-2.0")]);
        assert_eq!(violations, vec![License::new("gpl-2.0")]);
    }

    #[test]
    fn apply_annotates_packages() {
        let mut tree = results(vec![
            licensed("lodash", &["MIT"]),
            licensed("readline", &["GPL-2.0"]),
            licensed("ghost", &[]),
        ]);
        let violating = LicensePolicy::new(["MIT"]).apply(&mut tree);

        assert_eq!(violating, 1);
        let packages = &tree.results[0].packages;
        assert!(packages[0].license_violations.is_empty());
        assert_eq!(packages[1].license_violations, vec![License::new("GPL-2.0")]);
        assert!(packages[2].license_violations.is_empty());
    }

    #[test]
    fn counts_sort_descending_with_unknown_last() {
        let tree = results(vec![
            licensed("a", &["UNKNOWN"]),
            licensed("b", &["UNKNOWN"]),
            licensed("c", &["UNKNOWN"]),
            licensed("d", &["MIT"]),
            licensed("e", &["ISC"]),
            licensed("f", &["MIT", "Apache-2.0"]),
        ]);
        let counts = license_counts(&tree);
        assert_eq!(
            counts,
            vec![
                (License::new("MIT"), 2),
                (License::new("Apache-2.0"), 1),
                (License::new("ISC"), 1),
                (License::unknown(), 3),
            ]
        );
    }

    #[test]
    fn counts_of_empty_tree_are_empty() {
        assert!(license_counts(&VulnerabilityResults::default()).is_empty());
    }
}

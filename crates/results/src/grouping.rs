//! 별칭 그룹 계산
//!
//! 한 패키지의 취약점 목록에서 서로 별칭 관계인 ID를 하나의 그룹으로 묶습니다.
//! A의 `aliases`에 B의 ID가 있거나 그 반대이면 같은 그룹이며, 관계는 전이됩니다.

use std::collections::HashMap;

use crate::models::{GroupInfo, Vulnerability};

/// 취약점 목록을 별칭 그룹으로 나눕니다.
///
/// 그룹에는 입력에 있는 ID만 들어가며 각 그룹의 `ids`는 정렬됩니다.
/// 그룹 순서는 그룹의 첫 구성원이 입력에 처음 나타난 위치를 따릅니다.
pub fn group_vulnerabilities(vulnerabilities: &[Vulnerability]) -> Vec<GroupInfo> {
    let index: HashMap<&str, usize> = vulnerabilities
        .iter()
        .enumerate()
        .map(|(i, v)| (v.id.as_str(), i))
        .collect();

    let mut sets = DisjointSet::new(vulnerabilities.len());
    for (i, vulnerability) in vulnerabilities.iter().enumerate() {
        for alias in &vulnerability.aliases {
            if let Some(&j) = index.get(alias.as_str()) {
                sets.union(i, j);
            }
        }
    }

    // 루트 → 그룹 순번 (첫 등장 순)
    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut members: Vec<Vec<String>> = Vec::new();
    for (i, vulnerability) in vulnerabilities.iter().enumerate() {
        let root = sets.find(i);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            members.push(Vec::new());
            members.len() - 1
        });
        if !members[slot].contains(&vulnerability.id) {
            members[slot].push(vulnerability.id.clone());
        }
    }

    members.into_iter().map(GroupInfo::new).collect()
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // 작은 인덱스를 루트로 유지
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

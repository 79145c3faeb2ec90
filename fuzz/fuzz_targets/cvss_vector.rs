#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use depsight_results::SeverityType;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    v3: bool,
    vector: String,
}

fuzz_target!(|input: FuzzInput| {
    let kind = if input.v3 {
        SeverityType::CvssV3
    } else {
        SeverityType::CvssV2
    };

    // 성공한 디코딩은 항상 0.0-10.0 범위의 소수 첫째 자리 값
    if let Ok(score) = kind.decode(&input.vector) {
        assert!((0.0..=10.0).contains(&score), "score out of range: {score}");
        assert_eq!((score * 10.0).round() / 10.0, score);
    }
});

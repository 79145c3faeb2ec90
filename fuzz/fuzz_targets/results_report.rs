#![no_main]

use libfuzzer_sys::fuzz_target;

use depsight_results::{OutputFormat, Reporter, ResultsBuilder, VulnerabilityResults};

fuzz_target!(|data: &[u8]| {
    let Ok(parsed) = serde_json::from_slice::<VulnerabilityResults>(data) else {
        return;
    };

    // 그룹을 비우고 빌더로 다시 계산해 모든 취약점이 그룹에 속하도록 함
    let mut builder = ResultsBuilder::new();
    for mut source in parsed.results {
        for package in &mut source.packages {
            package.groups.clear();
        }
        builder.merge(VulnerabilityResults {
            results: vec![source],
            ..Default::default()
        });
    }
    let results = builder.build(parsed.experimental_config);

    for format in OutputFormat::ALL {
        for width in [0, 40] {
            let mut reporter = Reporter::new(format, Vec::new(), Vec::new(), width);
            let _ = reporter.print_result(&results);
        }
    }
});

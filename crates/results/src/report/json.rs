//! JSON 출력

use std::io::Write;

use crate::error::ResultsError;
use crate::models::VulnerabilityResults;

/// 결과 트리를 2칸 들여쓰기 JSON으로 쓰고 줄바꿈을 붙입니다.
pub fn write_json(out: &mut dyn Write, results: &VulnerabilityResults) -> Result<(), ResultsError> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}

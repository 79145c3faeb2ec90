//! CVSS v3.0 / v3.1 기본 점수 계산
//!
//! `CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H` 형식의 벡터를 받아
//! 기본 점수를 계산합니다. 시간/환경 메트릭은 허용하되 점수에 반영하지 않습니다.

use super::{CvssError, invalid, required, split_metrics};

const BASE_METRICS: [&str; 8] = ["AV", "AC", "PR", "UI", "S", "C", "I", "A"];

const TEMPORAL_ENVIRONMENTAL: [&str; 14] = [
    "E", "RL", "RC", "CR", "IR", "AR", "MAV", "MAC", "MPR", "MUI", "MS", "MC", "MI", "MA",
];

/// 벡터 문자열의 기본 점수를 계산합니다.
pub fn base_score(vector: &str) -> Result<f64, CvssError> {
    let Some(rest) = vector.strip_prefix("CVSS:") else {
        return Err(CvssError::MissingPrefix);
    };
    let Some((version, body)) = rest.split_once('/') else {
        return Err(CvssError::MalformedMetric(rest.to_owned()));
    };
    if version != "3.0" && version != "3.1" {
        return Err(CvssError::UnsupportedVersion(version.to_owned()));
    }

    let metrics = split_metrics(body)?;
    if let Some((key, _)) = metrics
        .iter()
        .find(|(k, _)| !BASE_METRICS.contains(k) && !TEMPORAL_ENVIRONMENTAL.contains(k))
    {
        return Err(CvssError::UnknownMetric((*key).to_owned()));
    }

    let scope_changed = match required(&metrics, "S")? {
        "U" => false,
        "C" => true,
        other => return Err(invalid("S", other)),
    };

    let av = match required(&metrics, "AV")? {
        "N" => 0.85,
        "A" => 0.62,
        "L" => 0.55,
        "P" => 0.2,
        other => return Err(invalid("AV", other)),
    };
    let ac = match required(&metrics, "AC")? {
        "L" => 0.77,
        "H" => 0.44,
        other => return Err(invalid("AC", other)),
    };
    let pr = match (required(&metrics, "PR")?, scope_changed) {
        ("N", _) => 0.85,
        ("L", false) => 0.62,
        ("L", true) => 0.68,
        ("H", false) => 0.27,
        ("H", true) => 0.5,
        (other, _) => return Err(invalid("PR", other)),
    };
    let ui = match required(&metrics, "UI")? {
        "N" => 0.85,
        "R" => 0.62,
        other => return Err(invalid("UI", other)),
    };
    let c = impact_weight("C", required(&metrics, "C")?)?;
    let i = impact_weight("I", required(&metrics, "I")?)?;
    let a = impact_weight("A", required(&metrics, "A")?)?;

    let iss = 1.0 - (1.0 - c) * (1.0 - i) * (1.0 - a);
    let impact = if scope_changed {
        7.52 * (iss - 0.029) - 3.25 * (iss - 0.02).powi(15)
    } else {
        6.42 * iss
    };
    let exploitability = 8.22 * av * ac * pr * ui;

    if impact <= 0.0 {
        return Ok(0.0);
    }
    let raw = if scope_changed {
        (1.08 * (impact + exploitability)).min(10.0)
    } else {
        (impact + exploitability).min(10.0)
    };
    Ok(roundup(raw))
}

fn impact_weight(metric: &str, value: &str) -> Result<f64, CvssError> {
    match value {
        "H" => Ok(0.56),
        "L" => Ok(0.22),
        "N" => Ok(0.0),
        other => Err(invalid(metric, other)),
    }
}

/// 소수 첫째 자리 올림 (v3.1 부록 A의 부동소수점 보정 포함)
fn roundup(value: f64) -> f64 {
    let int_input = (value * 100_000.0).round() as i64;
    if int_input % 10_000 == 0 {
        int_input as f64 / 100_000.0
    } else {
        ((int_input / 10_000) + 1) as f64 / 10.0
    }
}

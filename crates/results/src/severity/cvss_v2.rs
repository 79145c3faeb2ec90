//! CVSS v2 기본 점수 계산
//!
//! `AV:N/AC:L/Au:N/C:P/I:P/A:P` 형식의 벡터를 받습니다. 전체를 감싼 괄호는
//! 허용하며, 시간/환경 메트릭은 점수에 반영하지 않습니다.

use super::{CvssError, invalid, required, split_metrics};

const BASE_METRICS: [&str; 6] = ["AV", "AC", "Au", "C", "I", "A"];

const TEMPORAL_ENVIRONMENTAL: [&str; 8] = ["E", "RL", "RC", "CDP", "TD", "CR", "IR", "AR"];

/// 벡터 문자열의 기본 점수를 계산합니다.
pub fn base_score(vector: &str) -> Result<f64, CvssError> {
    let body = vector
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(vector);

    let metrics = split_metrics(body)?;
    if let Some((key, _)) = metrics
        .iter()
        .find(|(k, _)| !BASE_METRICS.contains(k) && !TEMPORAL_ENVIRONMENTAL.contains(k))
    {
        return Err(CvssError::UnknownMetric((*key).to_owned()));
    }

    let av = match required(&metrics, "AV")? {
        "L" => 0.395,
        "A" => 0.646,
        "N" => 1.0,
        other => return Err(invalid("AV", other)),
    };
    let ac = match required(&metrics, "AC")? {
        "H" => 0.35,
        "M" => 0.61,
        "L" => 0.71,
        other => return Err(invalid("AC", other)),
    };
    let au = match required(&metrics, "Au")? {
        "M" => 0.45,
        "S" => 0.56,
        "N" => 0.704,
        other => return Err(invalid("Au", other)),
    };
    let c = impact_weight("C", required(&metrics, "C")?)?;
    let i = impact_weight("I", required(&metrics, "I")?)?;
    let a = impact_weight("A", required(&metrics, "A")?)?;

    let impact = 10.41 * (1.0 - (1.0 - c) * (1.0 - i) * (1.0 - a));
    let exploitability = 20.0 * av * ac * au;
    let f_impact = if impact == 0.0 { 0.0 } else { 1.176 };

    let raw = (0.6 * impact + 0.4 * exploitability - 1.5) * f_impact;
    Ok((raw * 10.0).round() / 10.0)
}

fn impact_weight(metric: &str, value: &str) -> Result<f64, CvssError> {
    match value {
        "N" => Ok(0.0),
        "P" => Ok(0.275),
        "C" => Ok(0.660),
        other => Err(invalid(metric, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_impact_network_vector() {
        assert_eq!(base_score("AV:N/AC:L/Au:N/C:P/I:P/A:P"), Ok(7.5));
    }

    #[test]
    fn complete_impact_scores_ten() {
        assert_eq!(base_score("AV:N/AC:L/Au:N/C:C/I:C/A:C"), Ok(10.0));
    }

    #[test]
    fn medium_complexity_integrity_only() {
        assert_eq!(base_score("AV:N/AC:M/Au:N/C:N/I:P/A:N"), Ok(4.3));
    }

    #[test]
    fn no_impact_scores_zero() {
        assert_eq!(base_score("AV:N/AC:L/Au:N/C:N/I:N/A:N"), Ok(0.0));
    }

    #[test]
    fn accepts_parenthesized_vector() {
        assert_eq!(base_score("(AV:N/AC:L/Au:N/C:P/I:P/A:P)"), Ok(7.5));
    }

    #[test]
    fn temporal_metrics_are_ignored() {
        assert_eq!(
            base_score("AV:N/AC:L/Au:N/C:P/I:P/A:P/E:F/RL:OF/RC:C"),
            Ok(7.5)
        );
    }

    #[test]
    fn rejects_v3_vector() {
        assert!(base_score("CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H").is_err());
    }

    #[test]
    fn rejects_missing_and_invalid_metrics() {
        assert_eq!(
            base_score("AV:N/AC:L/C:P/I:P/A:P"),
            Err(CvssError::MissingMetric("Au"))
        );
        assert!(matches!(
            base_score("AV:N/AC:L/Au:N/C:X/I:P/A:P"),
            Err(CvssError::InvalidValue { .. })
        ));
    }
}

//! GitHub Markdown 출력
//!
//! 테이블 출력과 같은 행을 사용하며 스타일은 적용하지 않습니다.

use std::io::{self, Write};

use super::grid::{Grid, Row};
use super::rows::{self, NO_ISSUES, VULNERABILITY_HEADERS};
use crate::models::VulnerabilityResults;

/// 취약점 테이블과 라이선스 테이블을 Markdown으로 씁니다.
pub fn write_markdown(out: &mut dyn Write, results: &VulnerabilityResults) -> io::Result<()> {
    let mut vulnerabilities = Grid::new(VULNERABILITY_HEADERS);
    vulnerabilities.extend(rows::vulnerability_rows(results, false));
    if vulnerabilities.is_empty() {
        writeln!(out, "{NO_ISSUES}")?;
    } else {
        out.write_all(vulnerabilities.render_markdown().as_bytes())?;
    }

    if let Some(licenses) = rows::license_rows(results) {
        let mut grid = Grid::new(licenses.headers.iter());
        grid.extend(licenses.rows.into_iter().map(Row::cells));
        writeln!(out)?;
        out.write_all(grid.render_markdown().as_bytes())?;
    }
    Ok(())
}

//! 사람이 읽는 테이블 출력

use std::io::{self, Write};

use super::grid::{Border, Grid, Row};
use super::rows::{self, NO_ISSUES, VULNERABILITY_HEADERS};
use crate::models::VulnerabilityResults;

/// 취약점 테이블과 라이선스 테이블을 씁니다.
///
/// `terminal_width`가 0보다 크면 둥근 테두리, 굵은 ID, 줄 폭 제한을 적용합니다.
pub fn write_table(
    out: &mut dyn Write,
    results: &VulnerabilityResults,
    terminal_width: usize,
) -> io::Result<()> {
    let styled = terminal_width > 0;

    let mut vulnerabilities = new_grid(VULNERABILITY_HEADERS, terminal_width);
    vulnerabilities.extend(rows::vulnerability_rows(results, styled));
    if vulnerabilities.is_empty() {
        writeln!(out, "{NO_ISSUES}")?;
    } else {
        out.write_all(vulnerabilities.render().as_bytes())?;
    }

    if let Some(licenses) = rows::license_rows(results) {
        let mut grid = new_grid(licenses.headers.iter(), terminal_width);
        grid.extend(licenses.rows.into_iter().map(Row::cells));
        out.write_all(grid.render().as_bytes())?;
    }
    Ok(())
}

fn new_grid<I, S>(headers: I, terminal_width: usize) -> Grid
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let grid = Grid::new(headers);
    if terminal_width > 0 {
        grid.with_border(Border::Rounded)
            .with_max_line_width(terminal_width)
    } else {
        grid
    }
}

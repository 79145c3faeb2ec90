//! 리포트 출력
//!
//! 모든 형식은 [`rows`]의 같은 순회 결과에서 만들어지며 배치만 다릅니다.
//!
//! | 형식 | 모듈 | 텍스트 메시지 |
//! |------|------|---------------|
//! | `table` | [`table`] | stdout |
//! | `markdown` | [`markdown`] | stdout |
//! | `json` | [`json`] | stderr |
//! | `sarif` | [`sarif`] | stderr |

pub mod grid;
pub mod json;
pub mod markdown;
pub mod rows;
pub mod sarif;
pub mod table;

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use metrics::counter;
use tracing::debug;

use depsight_core::metrics as m;

use crate::error::ResultsError;
use crate::models::VulnerabilityResults;

/// 리포트 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Sarif,
    Markdown,
}

impl OutputFormat {
    /// 지원하는 모든 형식
    pub const ALL: [OutputFormat; 4] = [Self::Table, Self::Json, Self::Sarif, Self::Markdown];

    /// 형식 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Sarif => "sarif",
            Self::Markdown => "markdown",
        }
    }

    /// 기계가 읽는 형식인지 여부 (텍스트 메시지를 stderr로 보냄)
    pub fn is_machine_readable(&self) -> bool {
        matches!(self, Self::Json | Self::Sarif)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "sarif" => Ok(Self::Sarif),
            "markdown" => Ok(Self::Markdown),
            other => Err(format!(
                "unsupported output format \"{other}\" - must be one of: {}",
                Self::ALL.map(|f| f.as_str()).join(", ")
            )),
        }
    }
}

/// 리포터
///
/// 결과 출력과 진행 메시지, 에러 메시지를 형식에 맞는 스트림으로 보냅니다.
pub struct Reporter<O, E> {
    format: OutputFormat,
    stdout: O,
    stderr: E,
    terminal_width: usize,
    has_printed_error: bool,
}

impl<O: Write, E: Write> Reporter<O, E> {
    /// 리포터를 생성합니다. `terminal_width`가 0이면 스타일 없이 출력합니다.
    pub fn new(format: OutputFormat, stdout: O, stderr: E, terminal_width: usize) -> Self {
        Self {
            format,
            stdout,
            stderr,
            terminal_width,
            has_printed_error: false,
        }
    }

    /// 출력 형식
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// 결과 트리를 출력합니다.
    pub fn print_result(&mut self, results: &VulnerabilityResults) -> Result<(), ResultsError> {
        debug!(
            format = %self.format,
            sources = results.results.len(),
            groups = results.group_count(),
            "rendering report"
        );

        match self.format {
            OutputFormat::Table => {
                table::write_table(&mut self.stdout, results, self.terminal_width)?;
            }
            OutputFormat::Markdown => markdown::write_markdown(&mut self.stdout, results)?,
            OutputFormat::Json => json::write_json(&mut self.stdout, results)?,
            OutputFormat::Sarif => sarif::write_sarif(&mut self.stdout, results)?,
        }
        self.stdout.flush()?;

        counter!(m::REPORTS_RENDERED_TOTAL, m::LABEL_FORMAT => self.format.as_str()).increment(1);
        counter!(m::VULNERABILITY_GROUPS_REPORTED_TOTAL).increment(results.group_count() as u64);
        Ok(())
    }

    /// 진행 메시지를 한 줄 출력합니다. 기계 형식에서는 stderr로 보냅니다.
    pub fn print_text(&mut self, message: &str) -> io::Result<()> {
        if self.format.is_machine_readable() {
            writeln!(self.stderr, "{message}")
        } else {
            writeln!(self.stdout, "{message}")
        }
    }

    /// 에러 메시지를 stderr에 한 줄 출력하고 기록합니다.
    pub fn print_error(&mut self, message: &str) -> io::Result<()> {
        self.has_printed_error = true;
        writeln!(self.stderr, "{message}")
    }

    /// 에러 메시지를 출력한 적이 있는지 여부
    pub fn has_printed_error(&self) -> bool {
        self.has_printed_error
    }

    /// 출력 스트림을 돌려받습니다.
    pub fn into_inner(self) -> (O, E) {
        (self.stdout, self.stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter(format: OutputFormat) -> Reporter<Vec<u8>, Vec<u8>> {
        Reporter::new(format, Vec::new(), Vec::new(), 0)
    }

    #[test]
    fn format_round_trips_through_strings() {
        for format in OutputFormat::ALL {
            assert_eq!(format.as_str().parse::<OutputFormat>(), Ok(format));
        }
    }

    #[test]
    fn unknown_format_lists_choices() {
        let err = "xml".parse::<OutputFormat>().unwrap_err();
        assert_eq!(
            err,
            "unsupported output format \"xml\" - must be one of: table, json, sarif, markdown"
        );
    }

    #[test]
    fn text_goes_to_stdout_for_human_formats() {
        let mut r = reporter(OutputFormat::Table);
        r.print_text("Scanning...").unwrap();
        let (out, err) = r.into_inner();
        assert_eq!(out, b"Scanning...\n");
        assert!(err.is_empty());
    }

    #[test]
    fn text_goes_to_stderr_for_machine_formats() {
        for format in [OutputFormat::Json, OutputFormat::Sarif] {
            let mut r = reporter(format);
            r.print_text("Scanning...").unwrap();
            let (out, err) = r.into_inner();
            assert!(out.is_empty());
            assert_eq!(err, b"Scanning...\n");
        }
    }

    #[test]
    fn errors_are_tracked() {
        let mut r = reporter(OutputFormat::Markdown);
        assert!(!r.has_printed_error());
        r.print_error("boom").unwrap();
        assert!(r.has_printed_error());
        let (out, err) = r.into_inner();
        assert!(out.is_empty());
        assert_eq!(err, b"boom\n");
    }

    #[test]
    fn print_result_dispatches_on_format() {
        let results = VulnerabilityResults::default();

        let mut r = reporter(OutputFormat::Json);
        r.print_result(&results).unwrap();
        assert_eq!(r.into_inner().0, b"{\n  \"results\": []\n}\n");

        let mut r = reporter(OutputFormat::Table);
        r.print_result(&results).unwrap();
        assert_eq!(r.into_inner().0, b"No issues found\n");
    }
}

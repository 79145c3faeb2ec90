//! 텍스트 테이블 렌더러
//!
//! 헤더는 대문자로 출력하고, 셀 안의 `\n`은 여러 줄로 나눕니다.
//! 폭 계산은 ANSI 이스케이프 시퀀스를 제외한 터미널 표시 칸 수 기준입니다.
//!
//! ```text
//! +---------+------+
//! | OSV URL | CVSS |
//! +---------+------+
//! | ...     | 7.5  |
//! +---------+------+
//! ```

use unicode_width::UnicodeWidthChar;

/// 테두리 스타일
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Border {
    /// `+-|` 문자 (파일, 파이프 출력)
    #[default]
    Ascii,
    /// 둥근 모서리 박스 문자 (터미널 출력)
    Rounded,
}

struct BorderChars {
    horizontal: char,
    vertical: char,
    top: [char; 3],
    middle: [char; 3],
    bottom: [char; 3],
}

impl Border {
    fn chars(self) -> BorderChars {
        match self {
            Self::Ascii => BorderChars {
                horizontal: '-',
                vertical: '|',
                top: ['+', '+', '+'],
                middle: ['+', '+', '+'],
                bottom: ['+', '+', '+'],
            },
            Self::Rounded => BorderChars {
                horizontal: '─',
                vertical: '│',
                top: ['╭', '┬', '╮'],
                middle: ['├', '┼', '┤'],
                bottom: ['╰', '┴', '╯'],
            },
        }
    }
}

/// 테이블 행
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// 데이터 행. `auto_merge`이면 인접한 같은 셀을 하나로 합쳐 그립니다.
    Cells { cells: Vec<String>, auto_merge: bool },
    /// 구분선
    Separator,
}

impl Row {
    /// 일반 데이터 행
    pub fn cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Cells {
            cells: cells.into_iter().map(Into::into).collect(),
            auto_merge: false,
        }
    }

    /// 셀 병합 대상 행
    pub fn merged<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Cells {
            cells: cells.into_iter().map(Into::into).collect(),
            auto_merge: true,
        }
    }
}

/// 텍스트 테이블
#[derive(Debug, Clone, Default)]
pub struct Grid {
    headers: Vec<String>,
    rows: Vec<Row>,
    border: Border,
    max_line_width: usize,
}

impl Grid {
    /// 헤더로 테이블을 생성합니다. 헤더는 대문자로 바뀝니다.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|h| h.as_ref().to_uppercase())
                .collect(),
            ..Self::default()
        }
    }

    /// 테두리 스타일을 지정합니다.
    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    /// 출력 줄의 최대 폭을 지정합니다. 0이면 제한 없음.
    /// 넘치는 줄은 잘리고 마지막 문자가 `~`가 됩니다.
    pub fn with_max_line_width(mut self, width: usize) -> Self {
        self.max_line_width = width;
        self
    }

    /// 행을 추가합니다.
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// 여러 행을 추가합니다.
    pub fn extend(&mut self, rows: impl IntoIterator<Item = Row>) {
        self.rows.extend(rows);
    }

    /// 데이터 행 수 (구분선 제외)
    pub fn len(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, Row::Cells { .. }))
            .count()
    }

    /// 데이터 행이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn column_count(&self) -> usize {
        self.rows
            .iter()
            .filter_map(|r| match r {
                Row::Cells { cells, .. } => Some(cells.len()),
                Row::Separator => None,
            })
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    fn column_widths(&self, columns: usize) -> Vec<usize> {
        let mut widths = vec![0; columns];
        let all_cells = std::iter::once(self.headers.as_slice()).chain(self.rows.iter().filter_map(
            |r| match r {
                Row::Cells { cells, .. } => Some(cells.as_slice()),
                Row::Separator => None,
            },
        ));
        for cells in all_cells {
            for (column, cell) in cells.iter().enumerate() {
                let width = cell.split('\n').map(visible_width).max().unwrap_or(0);
                widths[column] = widths[column].max(width);
            }
        }
        widths
    }

    /// 테두리 테이블로 렌더링합니다. 모든 줄은 `\n`으로 끝납니다.
    pub fn render(&self) -> String {
        let columns = self.column_count();
        if columns == 0 {
            return String::new();
        }
        let widths = self.column_widths(columns);
        let chars = self.border.chars();

        let mut lines = Vec::new();
        lines.push(rule(&widths, &chars, chars.top));
        if !self.headers.is_empty() {
            lines.extend(row_lines(&self.headers, false, &widths, &chars));
            lines.push(rule(&widths, &chars, chars.middle));
        }
        for row in &self.rows {
            match row {
                Row::Cells { cells, auto_merge } => {
                    lines.extend(row_lines(cells, *auto_merge, &widths, &chars));
                }
                Row::Separator => lines.push(rule(&widths, &chars, chars.middle)),
            }
        }
        lines.push(rule(&widths, &chars, chars.bottom));

        let mut out = String::new();
        for line in lines {
            if self.max_line_width > 0 {
                out.push_str(&truncate_visible(&line, self.max_line_width));
            } else {
                out.push_str(&line);
            }
            out.push('\n');
        }
        out
    }

    /// GitHub Markdown 테이블로 렌더링합니다. 구분선 행은 생략합니다.
    pub fn render_markdown(&self) -> String {
        let columns = self.column_count();
        if columns == 0 {
            return String::new();
        }

        let mut out = String::new();
        out.push_str(&markdown_line(&self.headers, columns));
        out.push_str(&markdown_line(&vec!["---".to_owned(); columns], columns));
        for row in &self.rows {
            if let Row::Cells { cells, .. } = row {
                out.push_str(&markdown_line(cells, columns));
            }
        }
        out
    }
}

fn rule(widths: &[usize], chars: &BorderChars, [left, join, right]: [char; 3]) -> String {
    let mut line = String::new();
    line.push(left);
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            line.push(join);
        }
        line.extend(std::iter::repeat_n(chars.horizontal, width + 2));
    }
    line.push(right);
    line
}

/// 셀 병합 구간 (시작 열, 끝 열(제외))
fn spans(cells: &[String], columns: usize, auto_merge: bool) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    while start < columns {
        let mut end = start + 1;
        if auto_merge {
            let current = cells.get(start).map(String::as_str).unwrap_or("");
            while end < columns
                && !current.is_empty()
                && cells.get(end).map(String::as_str) == Some(current)
            {
                end += 1;
            }
        }
        spans.push((start, end));
        start = end;
    }
    spans
}

fn row_lines(
    cells: &[String],
    auto_merge: bool,
    widths: &[usize],
    chars: &BorderChars,
) -> Vec<String> {
    let spans = spans(cells, widths.len(), auto_merge);
    let split: Vec<Vec<&str>> = spans
        .iter()
        .map(|(start, _)| {
            cells
                .get(*start)
                .map(|c| c.split('\n').collect())
                .unwrap_or_default()
        })
        .collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(0).max(1);

    (0..height)
        .map(|line_index| {
            let mut line = String::new();
            line.push(chars.vertical);
            for ((start, end), cell_lines) in spans.iter().zip(&split) {
                let width: usize = widths[*start..*end].iter().sum::<usize>() + 3 * (end - start - 1);
                let text = cell_lines.get(line_index).copied().unwrap_or("");
                line.push(' ');
                line.push_str(text);
                line.extend(std::iter::repeat_n(' ', width - visible_width(text)));
                line.push(' ');
                line.push(chars.vertical);
            }
            line
        })
        .collect()
}

fn markdown_line(cells: &[String], columns: usize) -> String {
    let mut line = String::from("|");
    for column in 0..columns {
        let cell = cells.get(column).map(String::as_str).unwrap_or("");
        line.push(' ');
        line.push_str(&cell.replace('|', "\\|").replace('\n', "<br/>"));
        line.push_str(" |");
    }
    line.push('\n');
    line
}

/// ANSI 이스케이프 시퀀스를 제외한 터미널 표시 폭
///
/// CJK 문자와 이모지는 2칸, 결합 문자는 0칸으로 셉니다.
pub fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            skip_escape(&mut chars);
        } else {
            width += char_width(c);
        }
    }
    width
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

fn skip_escape(chars: &mut std::str::Chars<'_>) -> String {
    let mut sequence = String::new();
    if let Some(next) = chars.next() {
        sequence.push(next);
        if next == '[' {
            for c in chars.by_ref() {
                sequence.push(c);
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        }
    }
    sequence
}

/// 보이는 폭이 `width`를 넘으면 `width - 1`칸만 남기고 `~`를 붙입니다.
/// 넓은 문자가 경계에 걸리면 공백으로 채워 결과 폭을 `width`에 맞춥니다.
/// 이스케이프 시퀀스는 보존하며, 잘린 줄에 시퀀스가 있었으면 리셋 코드를 덧붙입니다.
pub fn truncate_visible(line: &str, width: usize) -> String {
    if visible_width(line) <= width {
        return line.to_owned();
    }

    let keep = width.saturating_sub(1);
    let mut out = String::new();
    let mut kept = 0;
    let mut styled = false;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            out.push(c);
            out.push_str(&skip_escape(&mut chars));
            styled = true;
            continue;
        }
        let w = char_width(c);
        if kept + w > keep {
            break;
        }
        out.push(c);
        kept += w;
    }
    if width > 0 {
        out.extend(std::iter::repeat_n(' ', keep - kept));
        out.push('~');
    }
    if styled {
        out.push_str("\x1b[0m");
    }
    out
}

//! Output destinations and text rendering
//!
//! Reports go to stdout or an `--output` file. Command payloads that are not
//! reports (config validation, effective config) implement [`Render`].

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;

use terminal_size::Width;

/// Width assumed for a terminal whose size is unknown.
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Trait for human-readable text rendering.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> io::Result<()>;
}

/// Render a payload to stdout.
pub fn render_stdout<T: Render>(payload: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    payload.render_text(&mut handle)?;
    handle.flush()
}

/// Where the report is written and how wide it may be.
pub struct ReportTarget {
    pub writer: Box<dyn Write>,
    /// 0 disables styling and line truncation.
    pub terminal_width: usize,
}

impl ReportTarget {
    /// Open the report destination.
    ///
    /// A file target is created (or truncated) up front so a bad path fails
    /// before any work is done. Only an interactive stdout gets a width.
    pub fn open(output: Option<&Path>) -> io::Result<Self> {
        match output {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    io::Error::new(
                        e.kind(),
                        format!("failed to create output file {}: {e}", path.display()),
                    )
                })?;
                Ok(Self {
                    writer: Box::new(BufWriter::new(file)),
                    terminal_width: 0,
                })
            }
            None => {
                let stdout = io::stdout();
                let terminal_width = select_terminal_width(
                    stdout.is_terminal(),
                    terminal_size::terminal_size().map(|(Width(w), _)| w),
                    std::env::var("COLUMNS").ok().as_deref(),
                );
                Ok(Self {
                    writer: Box::new(stdout),
                    terminal_width,
                })
            }
        }
    }
}

/// Pick the report width for stdout.
///
/// Not a terminal: 0. Otherwise the size reported by the terminal, then
/// `COLUMNS`, then [`DEFAULT_TERMINAL_WIDTH`].
pub fn select_terminal_width(
    is_terminal: bool,
    queried: Option<u16>,
    columns: Option<&str>,
) -> usize {
    if !is_terminal {
        return 0;
    }
    queried
        .map(usize::from)
        .filter(|&width| width > 0)
        .or_else(|| {
            columns
                .and_then(|c| c.trim().parse::<usize>().ok())
                .filter(|&width| width > 0)
        })
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

//! Shared CLI argument structs for consistent flag definitions across commands.
//!
//! Use `#[command(flatten)]` to include them in command-specific Args structs.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use clap::Args;
use clap::builder::RangedU64ValueParser;

use crate::buffer::{LineBuffer, Position, TextBuffer, utf16_len};
use crate::config::env_string;
use crate::output::OutputFormat;

// ============================================================================
// FormatArgs - Output format flags
// ============================================================================

/// Common output format flags.
///
/// Provides consistent --format/-f and --json flags across commands.
/// Use `resolve()` to get the effective format with TTY auto-detection.
#[derive(Args, Clone, Debug, Default)]
pub struct FormatArgs {
    /// Output format (auto-detects TTY for pretty vs plain)
    #[arg(short = 'f', long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Output as JSON (shorthand for --format=json)
    #[arg(long, conflicts_with = "format", global = true)]
    pub json: bool,
}

impl FormatArgs {
    /// Resolve the effective output format.
    ///
    /// Handles --json shorthand and applies TTY auto-detection for pretty mode.
    pub fn resolve(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format.resolve()
        }
    }
}

// ============================================================================
// DocumentArgs - The markdown file a command works on
// ============================================================================

#[derive(Args, Clone, Debug)]
pub struct DocumentArgs {
    /// Markdown document
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

// ============================================================================
// CursorArgs - Cursor placement flags
// ============================================================================

/// Cursor position flags. Both are 1-based, like editor status bars.
#[derive(Args, Clone, Debug, Default)]
pub struct CursorArgs {
    /// Cursor line (1-based; default: last line)
    #[arg(short = 'l', long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub line: Option<usize>,

    /// Cursor column in UTF-16 units (1-based; default: end of line)
    #[arg(short = 'c', long, value_parser = RangedU64ValueParser::<usize>::new().range(1..), requires = "line")]
    pub column: Option<usize>,
}

impl CursorArgs {
    /// Convert to a 0-based buffer position, defaulting to the end of the
    /// line (or of the document).
    pub fn resolve(&self, buf: &TextBuffer) -> Result<Position, String> {
        let Some(line) = self.line else {
            return Ok(buf.end());
        };
        let Some(text) = buf.line(line - 1) else {
            return Err(format!(
                "line {} is past the end of the document ({} lines)",
                line,
                buf.line_count()
            ));
        };
        let end = utf16_len(text);
        let column = match self.column {
            Some(c) if c - 1 > end => {
                return Err(format!(
                    "column {} is past the end of line {} ({} columns)",
                    c,
                    line,
                    end + 1
                ));
            }
            Some(c) => c - 1,
            None => end,
        };
        Ok(Position::new(line - 1, column))
    }
}

// ============================================================================
// Clock
// ============================================================================

/// The current time, or `DAYLOG_NOW` when set.
pub fn now() -> Result<DateTime<Local>, String> {
    match env_string("DAYLOG_NOW") {
        Some(text) => parse_now(&text),
        None => Ok(Local::now()),
    }
}

/// Parse a `YYYY-MM-DD HH:MM[:SS]` override as local time.
pub fn parse_now(text: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M"))
        .map_err(|_| format!("DAYLOG_NOW {:?} is not YYYY-MM-DD HH:MM[:SS]", text))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("DAYLOG_NOW {:?} does not exist in the local time zone", text))
}

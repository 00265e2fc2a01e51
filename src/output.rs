//! Output formatting utilities with TTY auto-detection and semantic styling.

use std::io::IsTerminal;

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::buffer::Position;
use crate::detect::Verdict;

/// Output format for commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-optimized: colors, one-line summaries
    #[default]
    Pretty,
    /// Script-friendly: no colors, pipe-delimited
    Plain,
    /// Machine-readable JSON
    Json,
    /// Machine-readable YAML
    Yaml,
}

impl OutputFormat {
    /// Resolve the output format, applying TTY auto-detection.
    ///
    /// If format is Pretty but stdout is not a TTY, returns Plain.
    pub fn resolve(self) -> Self {
        match self {
            OutputFormat::Pretty if !std::io::stdout().is_terminal() => OutputFormat::Plain,
            other => other,
        }
    }
}

/// Print `value` as JSON or YAML. Pretty and Plain are handled by the caller.
pub fn print_structured<T: Serialize>(format: OutputFormat, value: &T) -> Result<(), String> {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(value).map_err(|e| format!("JSON error: {}", e))?
        ),
        OutputFormat::Yaml => print!(
            "{}",
            serde_yaml::to_string(value).map_err(|e| format!("YAML error: {}", e))?
        ),
        OutputFormat::Pretty | OutputFormat::Plain => {}
    }
    Ok(())
}

// ============================================================================
// Semantic Styling - Centralized color/style decisions
// ============================================================================

/// Verdict colors.
/// - Green: prefix inserted
/// - Yellow: rate limited (will pass later)
/// - Dimmed: declined for a structural reason
pub fn style_verdict(verdict: &Verdict) -> ColoredString {
    let text = verdict.to_string();
    match verdict {
        Verdict::Insert { .. } => text.green(),
        Verdict::RateLimited { .. } => text.yellow(),
        _ => text.dimmed(),
    }
}

/// Positions are shown 1-based, the way editors number lines and columns.
pub fn format_position(pos: Position) -> String {
    format!("{}:{}", pos.line + 1, pos.column + 1)
}

pub fn style_position(pos: Position) -> ColoredString {
    format_position(pos).cyan()
}

/// Style for paths - always dimmed.
pub fn style_path(path: &str) -> ColoredString {
    path.dimmed()
}

/// Inserted text is bold so it stands out in the summary line.
pub fn style_inserted(text: &str) -> ColoredString {
    text.bold()
}

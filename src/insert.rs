//! Timestamp prefix text and placement.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::warn;

use crate::buffer::{LineBuffer, Position, utf16_column, utf16_len};
use crate::pattern::{self, DEFAULT_LOG_FORMAT};

/// Where and what to insert on the cursor line. Columns are UTF-16 offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insertion {
    pub line: usize,
    pub insert_at: usize,
    pub new_cursor_column: usize,
    pub text: String,
}

/// Bold-wrapped prefix for a formatted timestamp.
pub fn prefix_text(timestamp: &str) -> String {
    format!("**{}**: ", timestamp)
}

/// Format `at` with the configured pattern, falling back to `HH:mm`.
pub fn format_log_prefix(log_format: &str, at: &NaiveDateTime) -> String {
    match pattern::format(log_format, at) {
        Ok(text) => text,
        Err(e) => {
            warn!(target: "insert", format = log_format, error = %e, "log_format_fallback");
            pattern::format(DEFAULT_LOG_FORMAT, at)
                .unwrap_or_else(|_| at.format("%H:%M").to_string())
        }
    }
}

/// Compute the insertion for `line_text`.
///
/// With an emphasis marker on the line the prefix goes two columns past the
/// first `*` (after a `**` opener); otherwise at column 0. The cursor keeps
/// its position relative to the text the user typed.
pub fn compute_insertion(
    line: usize,
    line_text: &str,
    cursor_column: usize,
    timestamp: &str,
) -> Insertion {
    let insert_at = match line_text.find('*') {
        Some(byte) => utf16_column(line_text, byte) + 2,
        None => 0,
    };
    let text = prefix_text(timestamp);
    Insertion {
        line,
        insert_at,
        new_cursor_column: cursor_column + utf16_len(&text),
        text,
    }
}

/// Apply an insertion to the buffer and move the cursor.
pub fn apply(buf: &mut dyn LineBuffer, insertion: &Insertion) {
    buf.replace_range(
        &insertion.text,
        Position::new(insertion.line, insertion.insert_at),
        None,
    );
    buf.set_cursor(Position::new(insertion.line, insertion.new_cursor_column));
}

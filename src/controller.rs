//! Glue between host events and the detection/insertion logic.
//!
//! The controller owns the only mutable state: the settings snapshot and the
//! instant of the last automatic insertion. Every call receives the current
//! time explicitly.

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info};

use crate::buffer::{LineBuffer, Position};
use crate::config::LogConfig;
use crate::detect::{LogContextDetector, Verdict};
use crate::header::HeaderClassifier;
use crate::insert::{self, Insertion};
use crate::navigate;
use crate::pattern::{self, DEFAULT_HEADER_FORMAT};

/// Notice shown when a jump finds nothing.
pub const NO_DATED_HEADERS: &str = "no dated headers found";

/// Result of handling one edit notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub insertion: Option<Insertion>,
}

/// Result of a jump to the latest dated header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Jump {
    pub header_line: usize,
    pub date: String,
    pub landing: Position,
    /// A blank line had to be appended below the header
    pub appended_line: bool,
}

/// What the status bar shows for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSurface {
    pub visible: bool,
    pub label: String,
    pub interval_secs: u64,
    /// None when the header pattern does not compile
    pub header_pattern: Option<String>,
}

pub struct LogController {
    settings: LogConfig,
    headers: HeaderClassifier,
    header_format: String,
    last_insertion: Option<DateTime<Local>>,
}

impl LogController {
    pub fn new(settings: LogConfig, header_format: &str) -> Self {
        Self {
            settings,
            headers: HeaderClassifier::new(header_format),
            header_format: header_format.to_string(),
            last_insertion: None,
        }
    }

    /// Resume with a previously recorded insertion instant.
    pub fn with_last_insertion(mut self, last: Option<DateTime<Local>>) -> Self {
        self.last_insertion = last;
        self
    }

    /// Swap in a new settings snapshot.
    #[cfg(test)]
    pub fn update_settings(&mut self, settings: LogConfig) {
        self.settings = settings;
    }

    pub fn last_insertion(&self) -> Option<DateTime<Local>> {
        self.last_insertion
    }

    /// Handle one settled edit: detect, and insert the prefix if the cursor
    /// line qualifies.
    pub fn on_edit(&mut self, buf: &mut dyn LineBuffer, now: DateTime<Local>) -> EditOutcome {
        let cursor = buf.cursor();
        let verdict = {
            let lines = buf.snapshot();
            LogContextDetector::new(&self.settings, &self.headers).evaluate(
                cursor.line,
                &lines,
                self.last_insertion,
                now,
            )
        };
        debug!(target: "detect", line = cursor.line, column = cursor.column, %verdict, "evaluated");

        if !verdict.is_insert() {
            return EditOutcome {
                verdict,
                insertion: None,
            };
        }

        let line_text = buf.line(cursor.line).unwrap_or_default().to_string();
        let stamp = insert::format_log_prefix(&self.settings.log_format, &now.naive_local());
        let insertion = insert::compute_insertion(cursor.line, &line_text, cursor.column, &stamp);
        insert::apply(buf, &insertion);
        self.last_insertion = Some(now);

        info!(
            target: "insert",
            line = insertion.line,
            at = insertion.insert_at,
            text = %insertion.text,
            "prefix_inserted"
        );

        EditOutcome {
            verdict,
            insertion: Some(insertion),
        }
    }

    /// Insert a new dated header for `now` at the cursor; returns where the cursor ends up.
    pub fn start_log_entry(&self, buf: &mut dyn LineBuffer, now: DateTime<Local>) -> Position {
        let today = now.naive_local();
        let date = pattern::format(&self.header_format, &today).unwrap_or_else(|_| {
            pattern::format(DEFAULT_HEADER_FORMAT, &today)
                .unwrap_or_else(|_| today.format("%Y-%m-%d").to_string())
        });
        let text = format!("## [[{}]]\n\n", date);

        let at = buf.cursor();
        buf.replace_range(&text, at, None);
        let after = at.after_insert(&text);
        buf.set_cursor(after);
        debug!(target: "controller", line = at.line, %date, "log_entry_started");
        after
    }

    /// Move the cursor below the latest dated header.
    pub fn jump_to_latest(&self, buf: &mut dyn LineBuffer) -> Result<Jump, String> {
        let header = {
            let lines = buf.snapshot();
            navigate::find_latest_dated_header(&lines, &self.headers)
        };
        let Some(header) = header else {
            debug!(target: "navigate", "no_dated_headers");
            return Err(NO_DATED_HEADERS.to_string());
        };

        let before = buf.line_count();
        let landing = navigate::land_below(buf, &header);
        debug!(target: "navigate", header = header.line, date = %header.date, "jumped");

        Ok(Jump {
            header_line: header.line,
            date: header.date.date().to_string(),
            landing,
            appended_line: buf.line_count() > before,
        })
    }

    /// Status bar state for a document.
    pub fn status<S: AsRef<str>>(&self, lines: &[S]) -> StatusSurface {
        let interval = self.settings.replacement_interval;
        StatusSurface {
            visible: navigate::has_dated_header(lines, &self.headers),
            label: format!("Log interval: {}s", interval),
            interval_secs: interval,
            header_pattern: self.headers.pattern().map(str::to_string),
        }
    }
}

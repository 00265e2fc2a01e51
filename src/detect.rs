//! Decides whether the cursor line should receive a timestamp prefix.
//!
//! The checks run in a fixed order and stop at the first refusal:
//! rate limit, already-logged line, list-mode gating, then an upward scan
//! for the nearest heading. A dated heading above the cursor enables the
//! prefix; a closer generic heading vetoes it.

use std::fmt;

use chrono::{DateTime, Local, TimeDelta};
use serde::Serialize;

use crate::config::LogConfig;
use crate::header::{HeaderClassifier, is_normal_header};
use crate::logged::LineStateClassifier;

/// Outcome of a detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Inside a dated section; insert a prefix.
    Insert { header_line: usize },
    /// The previous insertion is too recent.
    RateLimited { remaining_secs: i64 },
    /// The line already starts with a timestamp.
    AlreadyLogged,
    /// List mode and the line is not a list item.
    NotListItem,
    /// List mode and the item is nested.
    Nested,
    /// List mode and the line opens with an emphasis span.
    EmphasisPending,
    /// A generic heading sits between the cursor and any dated heading.
    GenericHeader { header_line: usize },
    /// No heading above the cursor.
    NoHeader,
    /// The cursor line does not exist.
    OutOfRange,
}

impl Verdict {
    pub fn is_insert(&self) -> bool {
        matches!(self, Verdict::Insert { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Insert { header_line } => {
                write!(f, "inside dated section (header on line {})", header_line + 1)
            }
            Verdict::RateLimited { remaining_secs } => {
                write!(f, "rate limited ({}s remaining)", remaining_secs)
            }
            Verdict::AlreadyLogged => write!(f, "line already has a timestamp"),
            Verdict::NotListItem => write!(f, "not a list item"),
            Verdict::Nested => write!(f, "nested list item"),
            Verdict::EmphasisPending => write!(f, "line opens with emphasis"),
            Verdict::GenericHeader { header_line } => {
                write!(f, "under undated header (line {})", header_line + 1)
            }
            Verdict::NoHeader => write!(f, "no header above cursor"),
            Verdict::OutOfRange => write!(f, "cursor outside document"),
        }
    }
}

/// Detection over one document snapshot, with settings fixed for the call.
pub struct LogContextDetector<'a> {
    settings: &'a LogConfig,
    headers: &'a HeaderClassifier,
    logged: LineStateClassifier,
}

impl<'a> LogContextDetector<'a> {
    pub fn new(settings: &'a LogConfig, headers: &'a HeaderClassifier) -> Self {
        Self {
            settings,
            headers,
            logged: LineStateClassifier::new(&settings.log_format),
        }
    }

    /// True iff [`evaluate`](Self::evaluate) says insert.
    #[cfg(test)]
    pub fn should_insert_prefix<S: AsRef<str>>(
        &self,
        cursor_line: usize,
        lines: &[S],
        last_insertion: Option<DateTime<Local>>,
        now: DateTime<Local>,
    ) -> bool {
        self.evaluate(cursor_line, lines, last_insertion, now)
            .is_insert()
    }

    pub fn evaluate<S: AsRef<str>>(
        &self,
        cursor_line: usize,
        lines: &[S],
        last_insertion: Option<DateTime<Local>>,
        now: DateTime<Local>,
    ) -> Verdict {
        let Some(current) = lines.get(cursor_line) else {
            return Verdict::OutOfRange;
        };
        let current: &str = current.as_ref();

        if let Some(last) = last_insertion
            && let Some(remaining_secs) = self.remaining_interval(now.signed_duration_since(last))
        {
            return Verdict::RateLimited { remaining_secs };
        }

        if self.logged.is_logged_line(current) {
            return Verdict::AlreadyLogged;
        }

        if self.settings.use_list {
            let trimmed = current.trim();
            if !(trimmed.starts_with('*') || trimmed.starts_with('-')) {
                return Verdict::NotListItem;
            }
            if current.starts_with(char::is_whitespace) {
                return Verdict::Nested;
            }
            if current.starts_with("**") {
                return Verdict::EmphasisPending;
            }
        }

        for index in (0..cursor_line).rev() {
            let line: &str = lines[index].as_ref();
            if self.headers.extract_header_date(line).is_some() {
                return Verdict::Insert { header_line: index };
            }
            if is_normal_header(line) {
                return Verdict::GenericHeader { header_line: index };
            }
        }

        Verdict::NoHeader
    }

    /// Whole seconds left in the rate-limit window, or None once it has passed.
    ///
    /// An interval too large for `TimeDelta` never elapses.
    fn remaining_interval(&self, elapsed: TimeDelta) -> Option<i64> {
        let interval = i64::try_from(self.settings.replacement_interval)
            .ok()
            .and_then(TimeDelta::try_seconds);
        let Some(interval) = interval else {
            return Some(i64::MAX);
        };
        if elapsed >= interval {
            return None;
        }
        let remaining_ms = interval
            .checked_sub(&elapsed)
            .map_or(i64::MAX, |d| d.num_milliseconds());
        Some(remaining_ms.saturating_add(999) / 1000)
    }
}

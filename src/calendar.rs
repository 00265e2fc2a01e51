//! Daily-note header pattern lookup.
//!
//! The header pattern belongs to whatever tool creates the daily notes. An
//! explicit `header.format` wins; otherwise the Obsidian daily-notes settings
//! (`.obsidian/daily-notes.json`) nearest to the document are consulted, and
//! failing that the ISO date pattern is used.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::pattern::DEFAULT_HEADER_FORMAT;

/// Location of the daily-notes settings inside a vault.
const DAILY_NOTES_SETTINGS: &[&str] = &[".obsidian", "daily-notes.json"];

#[derive(Debug, Default, Deserialize)]
struct DailyNotesSettings {
    #[serde(default)]
    format: Option<String>,
}

/// Where the header pattern came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderFormatSource {
    Config,
    DailyNotes(PathBuf),
    Default,
}

impl std::fmt::Display for HeaderFormatSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderFormatSource::Config => write!(f, "config"),
            HeaderFormatSource::DailyNotes(path) => write!(f, "{}", path.display()),
            HeaderFormatSource::Default => write!(f, "default"),
        }
    }
}

/// Resolve the header pattern for a document in `dir`.
pub fn header_format(config: &Config, dir: &Path) -> (String, HeaderFormatSource) {
    if let Some(format) = config.header.format.as_deref().filter(|f| !f.is_empty()) {
        return (format.to_string(), HeaderFormatSource::Config);
    }

    if let Some((format, path)) = find_daily_notes_format(dir) {
        debug!(target: "calendar", path = %path.display(), format, "daily_notes_format");
        return (format, HeaderFormatSource::DailyNotes(path));
    }

    (DEFAULT_HEADER_FORMAT.to_string(), HeaderFormatSource::Default)
}

/// Walk up from `dir` to the first daily-notes settings file with a non-empty format.
fn find_daily_notes_format(dir: &Path) -> Option<(String, PathBuf)> {
    // Relative paths like "." have no useful ancestors
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    dir.ancestors().find_map(|ancestor| {
        let path = DAILY_NOTES_SETTINGS
            .iter()
            .fold(ancestor.to_path_buf(), |p, part| p.join(part));
        let content = fs::read_to_string(&path).ok()?;
        let settings: DailyNotesSettings = serde_json::from_str(&content).ok()?;
        settings
            .format
            .filter(|f| !f.trim().is_empty())
            .map(|f| (f, path))
    })
}

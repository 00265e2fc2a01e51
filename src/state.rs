//! Last-insertion instant persisted between one-shot `stamp` runs.
//!
//! State lives in `<cache dir>/daylog/state.json`. A missing or unreadable
//! file is treated as "never inserted".

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

const STATE_DIR: &str = "daylog";
const STATE_FILE: &str = "state.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertionState {
    /// Instant of the last automatic insertion, in any document
    pub last_insertion: Option<DateTime<Local>>,
}

impl InsertionState {
    /// Default location under the user cache directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join(STATE_DIR).join(STATE_FILE))
    }

    /// Load state from `path`, or an empty state if not found/invalid.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                debug!(target: "state", path = %path.display(), error = %e, "state_discarded");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| format!("failed to serialize state: {}", e))?;

        fs::write(path, contents).map_err(|e| format!("failed to write state: {}", e))
    }
}

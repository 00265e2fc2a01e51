pub mod config_cmd;
pub mod jump;
pub mod session;
pub mod stamp;
pub mod start;
pub mod status;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::buffer::TextBuffer;
use crate::calendar::{self, HeaderFormatSource};
use crate::config::Config;
use crate::controller::LogController;

/// A document loaded for one command, with the header pattern that applies to it.
pub struct Document {
    pub path: PathBuf,
    pub buffer: TextBuffer,
    pub header_format: String,
    pub header_source: HeaderFormatSource,
}

impl Document {
    /// Load an existing document.
    pub fn open(path: &Path, config: &Config) -> Result<Self, String> {
        let buffer = TextBuffer::load(path)?;
        Ok(Self::with_buffer(path, buffer, config))
    }

    /// Load a document, starting from an empty one if the file does not exist yet.
    pub fn open_or_create(path: &Path, config: &Config) -> Result<Self, String> {
        if path.exists() {
            Self::open(path, config)
        } else {
            debug!(target: "cmd", path = %path.display(), "new_document");
            Ok(Self::with_buffer(path, TextBuffer::from_text(""), config))
        }
    }

    fn with_buffer(path: &Path, buffer: TextBuffer, config: &Config) -> Self {
        let (header_format, header_source) = calendar::header_format(config, &document_dir(path));
        Document {
            path: path.to_path_buf(),
            buffer,
            header_format,
            header_source,
        }
    }

    pub fn controller(&self, config: &Config) -> LogController {
        LogController::new(config.log.clone(), &self.header_format)
    }

    pub fn save(&self) -> Result<(), String> {
        self.buffer.save(&self.path)
    }

    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// Directory whose config and daily-notes settings apply to `path`.
pub fn document_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

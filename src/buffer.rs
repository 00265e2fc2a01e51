//! Line buffer abstraction and the in-memory buffer used by the CLI.
//!
//! Columns are UTF-16 code-unit offsets, the unit editors report cursors in.

use std::fs;
use std::path::Path;

use serde::Serialize;

/// A cursor or range endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position just past `text` when it is inserted at `self`.
    pub fn after_insert(self, text: &str) -> Position {
        match text.rsplit_once('\n') {
            Some((head, tail)) => Position {
                line: self.line + head.matches('\n').count() + 1,
                column: utf16_len(tail),
            },
            None => Position {
                line: self.line,
                column: self.column + utf16_len(text),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub from: Position,
    pub to: Position,
}

/// The editing surface the core logic talks to.
pub trait LineBuffer {
    fn line_count(&self) -> usize;

    fn line(&self, index: usize) -> Option<&str>;

    fn cursor(&self) -> Position;

    fn set_cursor(&mut self, pos: Position);

    /// Replace `from..to` with `text`; a missing `to` means a plain insertion at `from`.
    fn replace_range(&mut self, text: &str, from: Position, to: Option<Position>);

    fn scroll_into_view(&mut self, range: Range, center: bool);

    /// All lines, in order.
    fn snapshot(&self) -> Vec<&str> {
        (0..self.line_count()).filter_map(|i| self.line(i)).collect()
    }
}

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// UTF-16 column of byte offset `byte` in `s`.
pub fn utf16_column(s: &str, byte: usize) -> usize {
    utf16_len(&s[..byte.min(s.len())])
}

/// Byte offset of UTF-16 column `column` in `s`, clamped to the end.
///
/// A column that falls inside a surrogate pair rounds down to the char start.
pub fn byte_offset(s: &str, column: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in s.char_indices() {
        let next = units + ch.len_utf16();
        if next > column {
            return idx;
        }
        units = next;
    }
    s.len()
}

/// In-memory document backed by a vector of lines.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<String>,
    cursor: Position,
    trailing_newline: bool,
    viewport: Option<(Range, bool)>,
    modified: bool,
}

impl TextBuffer {
    pub fn from_text(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines = body
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();

        TextBuffer {
            lines,
            cursor: Position::default(),
            trailing_newline,
            viewport: None,
            modified: false,
        }
    }

    /// Read a document from disk.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("reading {}: {}", path.display(), e))?;
        Ok(Self::from_text(&content))
    }

    /// Write the document back, keeping the original trailing newline convention.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        fs::write(path, self.text()).map_err(|e| format!("writing {}: {}", path.display(), e))
    }

    pub fn text(&self) -> String {
        let mut out = self.lines.join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }

    /// True once any replacement has been applied.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Last range passed to `scroll_into_view`, with its centering flag.
    pub fn viewport(&self) -> Option<(Range, bool)> {
        self.viewport
    }

    /// Position of the very end of the document.
    pub fn end(&self) -> Position {
        let line = self.lines.len() - 1;
        Position::new(line, utf16_len(&self.lines[line]))
    }

    /// Clamp a position into the document.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.lines.len() - 1);
        let column = pos.column.min(utf16_len(&self.lines[line]));
        Position::new(line, column)
    }

    /// Replace a whole line, appending it when `index` is one past the end.
    pub fn set_line(&mut self, index: usize, text: &str) -> Result<(), String> {
        if index < self.lines.len() {
            let end = utf16_len(&self.lines[index]);
            self.replace_range(text, Position::new(index, 0), Some(Position::new(index, end)));
            Ok(())
        } else if index == self.lines.len() {
            let end = self.end();
            self.replace_range(&format!("\n{}", text), end, None);
            Ok(())
        } else {
            Err(format!(
                "line {} is past the end of the document ({} lines)",
                index,
                self.lines.len()
            ))
        }
    }
}

impl LineBuffer for TextBuffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, pos: Position) {
        self.cursor = self.clamp(pos);
    }

    fn replace_range(&mut self, text: &str, from: Position, to: Option<Position>) {
        let from = self.clamp(from);
        let to = self.clamp(to.unwrap_or(from));
        let (from, to) = if to < from { (to, from) } else { (from, to) };

        let head = &self.lines[from.line][..byte_offset(&self.lines[from.line], from.column)];
        let tail = &self.lines[to.line][byte_offset(&self.lines[to.line], to.column)..];
        let combined = format!("{}{}{}", head, text, tail);

        let replacement: Vec<String> = combined.split('\n').map(str::to_string).collect();
        self.lines.splice(from.line..=to.line, replacement);
        self.cursor = self.clamp(self.cursor);
        self.modified = true;
    }

    fn scroll_into_view(&mut self, range: Range, center: bool) {
        self.viewport = Some((range, center));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_helpers() {
        let s = "a😀b";
        assert_eq!(utf16_len(s), 4);
        assert_eq!(byte_offset(s, 0), 0);
        assert_eq!(byte_offset(s, 1), 1);
        // inside the surrogate pair rounds down
        assert_eq!(byte_offset(s, 2), 1);
        assert_eq!(byte_offset(s, 3), 5);
        assert_eq!(byte_offset(s, 99), s.len());
        assert_eq!(utf16_column(s, 5), 3);
    }

    #[test]
    fn test_from_text_and_back() {
        let cases = vec!["", "one", "one\n", "one\ntwo\n", "one\n\n"];
        for text in cases {
            let buf = TextBuffer::from_text(text);
            assert_eq!(buf.text(), text, "round trip of {:?}", text);
        }
        assert_eq!(TextBuffer::from_text("").line_count(), 1);
        assert_eq!(TextBuffer::from_text("a\r\nb\r\n").snapshot(), vec!["a", "b"]);
    }

    #[test]
    fn test_insert_within_line() {
        let mut buf = TextBuffer::from_text("- é note");
        buf.replace_range("**09:15**: ", Position::new(0, 2), None);
        assert_eq!(buf.line(0), Some("- **09:15**: é note"));
        assert!(buf.is_modified());
    }

    #[test]
    fn test_insert_multiline_text() {
        let mut buf = TextBuffer::from_text("first\nlast");
        buf.replace_range("## [[2024-05-11]]\n\n", Position::new(1, 0), None);
        assert_eq!(buf.snapshot(), vec!["first", "## [[2024-05-11]]", "", "last"]);
    }

    #[test]
    fn test_replace_across_lines() {
        let mut buf = TextBuffer::from_text("abc\ndef\nghi");
        buf.replace_range("X", Position::new(0, 1), Some(Position::new(2, 1)));
        assert_eq!(buf.snapshot(), vec!["aXhi"]);
    }

    #[test]
    fn test_positions_are_clamped() {
        let mut buf = TextBuffer::from_text("ab");
        buf.replace_range("!", Position::new(5, 9), None);
        assert_eq!(buf.line(0), Some("ab!"));
        buf.set_cursor(Position::new(3, 3));
        assert_eq!(buf.cursor(), Position::new(0, 3));
    }

    #[test]
    fn test_after_insert() {
        let at = Position::new(3, 4);
        assert_eq!(at.after_insert("abc"), Position::new(3, 7));
        assert_eq!(at.after_insert("## x\n\n"), Position::new(5, 0));
        assert_eq!(at.after_insert("a\nbc"), Position::new(4, 2));
    }

    #[test]
    fn test_set_line() {
        let mut buf = TextBuffer::from_text("## [[2024-05-11]]\n");
        buf.set_line(1, "- first").unwrap();
        assert_eq!(buf.snapshot(), vec!["## [[2024-05-11]]", "- first"]);
        buf.set_line(1, "- edited").unwrap();
        assert_eq!(buf.line(1), Some("- edited"));
        assert!(buf.set_line(5, "x").is_err());
    }

    #[test]
    fn test_load_save_preserves_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.md");
        fs::write(&path, "## [[2024-05-11]]\n- item\n").unwrap();

        let mut buf = TextBuffer::load(&path).unwrap();
        buf.replace_range("**09:00**: ", Position::new(1, 2), None);
        buf.save(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "## [[2024-05-11]]\n- **09:00**: item\n"
        );
    }
}

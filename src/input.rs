//! Stdin input: newline-delimited JSON edit events for `daylog session`.

use std::io::{self, BufRead, IsTerminal};

use serde::Deserialize;

/// One edit reported by the host editor.
///
/// `line` and `column` are 0-based buffer coordinates (columns in UTF-16
/// units). When `text` is present it replaces the whole line, or appends a
/// new one when `line` is one past the end.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditEvent {
    /// Milliseconds since the session started
    pub at_ms: u64,
    pub line: usize,
    /// Cursor column after the edit (default: end of line)
    #[serde(default)]
    pub column: Option<usize>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Parse events, one JSON object per line. Blank lines are skipped.
pub fn parse_events<R: BufRead>(reader: R) -> Result<Vec<EditEvent>, String> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("reading events: {}", e))?;
        if line.trim().is_empty() {
            continue;
        }
        let event: EditEvent = serde_json::from_str(&line)
            .map_err(|e| format!("event on input line {}: {}", index + 1, e))?;
        events.push(event);
    }
    Ok(events)
}

/// Read events from stdin if piped (not a terminal).
pub fn read_stdin_events() -> Result<Vec<EditEvent>, String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err("expected newline-delimited JSON edit events on stdin".to_string());
    }
    parse_events(stdin.lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events() {
        let input = r#"{"at_ms": 0, "line": 1, "text": "- fixed"}

{"at_ms": 120, "line": 1, "column": 3}
"#;
        let events = parse_events(input.as_bytes()).unwrap();
        assert_eq!(
            events,
            vec![
                EditEvent {
                    at_ms: 0,
                    line: 1,
                    column: None,
                    text: Some("- fixed".to_string()),
                },
                EditEvent {
                    at_ms: 120,
                    line: 1,
                    column: Some(3),
                    text: None,
                },
            ]
        );
    }

    #[test]
    fn test_parse_error_names_input_line() {
        let input = "{\"at_ms\": 0, \"line\": 0}\n{\"line\": 2}\n";
        let err = parse_events(input.as_bytes()).unwrap_err();
        assert!(err.starts_with("event on input line 2"), "{}", err);
    }
}

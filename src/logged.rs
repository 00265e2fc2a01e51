//! Detection of lines that already carry a timestamp prefix.

use std::sync::LazyLock;

use regex::Regex;

use crate::pattern::Pattern;

static LIST_REMNANT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-\s]+").unwrap());

/// Decides whether a line is already logged under the configured timestamp pattern.
///
/// The check looks exactly where an earlier insertion would have put its
/// timestamp: after the list marker, with emphasis markers removed, over as
/// many characters as the pattern string has. Patterns whose formatted output
/// is longer or shorter than the pattern itself (`MMMM`, `H`) are not handled.
#[derive(Debug, Clone)]
pub struct LineStateClassifier {
    pattern: Option<Pattern>,
}

impl LineStateClassifier {
    pub fn new(log_format: &str) -> Self {
        Self {
            pattern: Pattern::compile(log_format).ok(),
        }
    }

    pub fn is_logged_line(&self, line: &str) -> bool {
        let Some(pattern) = &self.pattern else {
            return false;
        };

        let stripped = LIST_REMNANT_RE.replace(line, "");
        let stripped = stripped.replace('*', "");
        let prefix: String = stripped.chars().take(pattern.char_len()).collect();

        pattern.parse_strict(&prefix).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern;
    use chrono::NaiveDate;

    #[test]
    fn test_is_logged_line() {
        let c = LineStateClassifier::new("HH:mm");
        let cases = vec![
            ("- **09:15**: standup", true),
            ("**09:15**: standup", true),
            ("  - **23:59**: late", true),
            ("09:15 plain", true),
            // star bullets leave a space in front once the stars are gone
            ("* **09:15**: star bullet", false),
            ("- plain bullet", false),
            ("- ", false),
            ("", false),
            ("- **9:15**: unpadded", false),
            ("- **25:00**: out of range", false),
            ("- note at 09:15", false),
        ];

        for (line, want) in cases {
            assert_eq!(c.is_logged_line(line), want, "is_logged_line({:?})", line);
        }
    }

    #[test]
    fn test_round_trip_with_formatted_prefix() {
        let t = NaiveDate::from_ymd_opt(2024, 5, 11)
            .unwrap()
            .and_hms_opt(7, 3, 0)
            .unwrap();
        for fmt in ["HH:mm", "HH:mm:ss", "YYYY-MM-DD HH:mm"] {
            let c = LineStateClassifier::new(fmt);
            let stamp = pattern::format(fmt, &t).unwrap();
            let line = format!("- **{}**: rest", stamp);
            assert!(c.is_logged_line(&line), "{:?} not logged under {:?}", line, fmt);
        }
    }

    #[test]
    fn test_unusable_pattern_is_never_logged() {
        let c = LineStateClassifier::new("");
        assert!(!c.is_logged_line("- **09:15**: standup"));
    }
}

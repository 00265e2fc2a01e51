//! Heading classification: dated section headers vs. generic headers.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::pattern::{ParsedDate, Pattern};

// Cached regex for wiki links: [[target]] or [[target|alias]]
static WIKI_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[(.*?)\]\]").unwrap());

/// A heading line whose content parsed as a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatedHeader {
    /// Zero-based line index in the document
    pub line: usize,
    /// Parsed header date
    pub date: ParsedDate,
}

/// Classifies heading lines against the Daily-Note header pattern.
///
/// A pattern that fails to compile never matches; every line is then at most
/// a generic header.
#[derive(Debug, Clone)]
pub struct HeaderClassifier {
    pattern: Option<Pattern>,
}

impl HeaderClassifier {
    pub fn new(header_format: &str) -> Self {
        let pattern = match Pattern::compile(header_format) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(target: "header", format = header_format, error = %e, "header_pattern_unusable");
                None
            }
        };
        Self { pattern }
    }

    /// The header pattern string, if it compiled.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::source)
    }

    /// Parse the date out of a heading line, or None if the line is not a dated header.
    pub fn extract_header_date(&self, line: &str) -> Option<ParsedDate> {
        let pattern = self.pattern.as_ref()?;
        pattern.parse_strict(header_date_text(line)?)
    }

    /// Like [`extract_header_date`](Self::extract_header_date), carrying the line index.
    pub fn dated_header(&self, index: usize, line: &str) -> Option<DatedHeader> {
        self.extract_header_date(line)
            .map(|date| DatedHeader { line: index, date })
    }
}

/// True iff the line starts with a heading marker, regardless of content.
pub fn is_normal_header(line: &str) -> bool {
    line.trim().starts_with('#')
}

/// The text of a heading that should be parsed as a date.
///
/// Strips heading markers, unwraps the first `[[...]]` link and drops a
/// `|alias` suffix.
fn header_date_text(line: &str) -> Option<&str> {
    let content = line.trim().strip_prefix('#')?;
    let content = content.trim_start_matches('#').trim_start();

    let inner = match WIKI_LINK_RE.captures(content) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => content,
    };

    Some(match inner.split_once('|') {
        Some((target, _alias)) => target,
        None => inner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn iso() -> HeaderClassifier {
        HeaderClassifier::new("YYYY-MM-DD")
    }

    #[test]
    fn test_non_headers() {
        let h = iso();
        for line in ["", "2024-05-11", "- ## 2024-05-11", "text # 2024-05-11", "[[2024-05-11]]"] {
            assert!(!is_normal_header(line), "is_normal_header({:?})", line);
            assert!(h.extract_header_date(line).is_none(), "extract({:?})", line);
        }
    }

    #[test]
    fn test_extract_header_date() {
        let h = iso();
        let may11 = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();
        let cases = vec![
            ("## 2024-05-11", Some(may11)),
            ("# 2024-05-11", Some(may11)),
            ("###2024-05-11", Some(may11)),
            ("  ## 2024-05-11  ", Some(may11)),
            ("## [[2024-05-11]]", Some(may11)),
            ("## [[2024-05-11|Notes]]", Some(may11)),
            ("## 2024-5-11", None),
            ("## [[2024-5-11]]", None),
            ("## Notes", None),
            ("## 2024-05-11 standup", None),
            ("## [[Notes]]", None),
        ];

        for (line, want) in cases {
            let got = h.extract_header_date(line).map(|d| d.date());
            assert_eq!(got, want, "extract_header_date({:?}) = {:?}, want {:?}", line, got, want);
        }
    }

    #[test]
    fn test_link_unwrapping_matches_plain() {
        let h = iso();
        assert_eq!(
            h.extract_header_date("## [[2024-05-11|Notes]]"),
            h.extract_header_date("## 2024-05-11")
        );
    }

    #[test]
    fn test_dated_header_is_normal_header() {
        let h = iso();
        for line in ["## 2024-05-11", "  # [[2024-05-11]]"] {
            assert!(h.extract_header_date(line).is_some());
            assert!(is_normal_header(line));
        }
    }

    #[test]
    fn test_custom_pattern() {
        let h = HeaderClassifier::new("dddd, MMMM D YYYY");
        assert!(h.extract_header_date("## [[Saturday, May 11 2024]]").is_some());
        assert!(h.extract_header_date("## 2024-05-11").is_none());
    }

    #[test]
    fn test_unusable_pattern_never_matches() {
        let h = HeaderClassifier::new("");
        assert!(h.pattern().is_none());
        assert!(h.extract_header_date("## 2024-05-11").is_none());
        assert!(is_normal_header("## 2024-05-11"));
    }

    #[test]
    fn test_dated_header_carries_index() {
        let h = iso();
        let got = h.dated_header(7, "## 2024-05-11").unwrap();
        assert_eq!(got.line, 7);
        assert!(h.dated_header(7, "## nope").is_none());
    }
}

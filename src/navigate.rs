//! Locating the latest dated section in a document.

use crate::buffer::{LineBuffer, Position, Range, utf16_len};
use crate::header::{DatedHeader, HeaderClassifier};

/// Find the dated header with the greatest date.
///
/// Ties keep the earliest line: a later header only replaces the current
/// best when its date is strictly after it.
pub fn find_latest_dated_header<S: AsRef<str>>(
    lines: &[S],
    headers: &HeaderClassifier,
) -> Option<DatedHeader> {
    let mut best: Option<DatedHeader> = None;
    for (index, line) in lines.iter().enumerate() {
        let Some(found) = headers.dated_header(index, line.as_ref()) else {
            continue;
        };
        match best {
            Some(current) if !found.date.is_after(&current.date) => {}
            _ => best = Some(found),
        }
    }
    best
}

/// True if the document has at least one dated header.
pub fn has_dated_header<S: AsRef<str>>(lines: &[S], headers: &HeaderClassifier) -> bool {
    lines
        .iter()
        .any(|line| headers.extract_header_date(line.as_ref()).is_some())
}

/// Where a jump to `header` lands, after making sure a line exists below it.
///
/// Appends an empty line when the header is the last line of the buffer,
/// then moves the cursor to the start of the line below and scrolls it into
/// view. Returns the landing position.
pub fn land_below(buf: &mut dyn LineBuffer, header: &DatedHeader) -> Position {
    if header.line + 1 >= buf.line_count() {
        let last = buf.line_count() - 1;
        let end = Position::new(last, buf.line(last).map_or(0, utf16_len));
        buf.replace_range("\n", end, None);
    }

    let target = Position::new(header.line + 1, 0);
    buf.set_cursor(target);
    buf.scroll_into_view(
        Range {
            from: target,
            to: target,
        },
        true,
    );
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;

    fn iso() -> HeaderClassifier {
        HeaderClassifier::new("YYYY-MM-DD")
    }

    #[test]
    fn test_latest_is_chronological_not_positional() {
        let lines = [
            "## [[2024-05-10]]",
            "- a",
            "## [[2024-05-12]]",
            "- b",
            "## [[2024-05-11]]",
            "- c",
        ];
        assert_eq!(find_latest_dated_header(&lines, &iso()).map(|h| h.line), Some(2));

        let reversed = ["## 2024-05-12", "## 2024-05-11", "## 2024-05-10"];
        assert_eq!(find_latest_dated_header(&reversed, &iso()).map(|h| h.line), Some(0));
    }

    #[test]
    fn test_ties_keep_first() {
        let lines = ["# Title", "## 2024-05-11", "text", "## [[2024-05-11|again]]"];
        assert_eq!(find_latest_dated_header(&lines, &iso()).map(|h| h.line), Some(1));
    }

    #[test]
    fn test_no_dated_header() {
        let lines = ["# Title", "## Notes", "- item"];
        assert!(find_latest_dated_header(&lines, &iso()).is_none());
        assert!(!has_dated_header(&lines, &iso()));
        let empty: [&str; 0] = [];
        assert!(find_latest_dated_header(&empty, &iso()).is_none());
    }

    #[test]
    fn test_land_below_existing_line() {
        let mut buf = TextBuffer::from_text("## 2024-05-11\n- item\n");
        let header = find_latest_dated_header(&buf.snapshot(), &iso()).unwrap();
        let pos = land_below(&mut buf, &header);

        assert_eq!(pos, Position::new(1, 0));
        assert_eq!(buf.cursor(), pos);
        assert!(!buf.is_modified());
        assert_eq!(buf.viewport().map(|(r, center)| (r.from, center)), Some((pos, true)));
    }

    #[test]
    fn test_land_below_last_line_appends() {
        let mut buf = TextBuffer::from_text("- old\n## 2024-05-11");
        let header = find_latest_dated_header(&buf.snapshot(), &iso()).unwrap();
        let pos = land_below(&mut buf, &header);

        assert_eq!(pos, Position::new(2, 0));
        assert_eq!(buf.snapshot(), vec!["- old", "## 2024-05-11", ""]);
        assert_eq!(buf.cursor(), pos);
    }
}

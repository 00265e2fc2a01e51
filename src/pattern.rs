//! Moment-style date patterns.
//!
//! Compiles pattern strings such as `YYYY-MM-DD` or `HH:mm` into a token list
//! that can format a timestamp and strictly parse text back into a date.
//!
//! Supported tokens: `YYYY YY MMMM MMM MM M DD D dddd ddd HH H hh h mm m ss s A a`.
//! Text inside `[...]` is literal; any other character is a literal as well.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;

/// Fallback pattern for log timestamps when the configured one is unusable.
pub const DEFAULT_LOG_FORMAT: &str = "HH:mm";

/// Default Daily-Note header pattern.
pub const DEFAULT_HEADER_FORMAT: &str = "YYYY-MM-DD";

/// Year used when a pattern has no year field. A leap year, so `MM-DD` accepts Feb 29.
const DEFAULT_YEAR: i32 = 2000;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year4,
    Year2,
    MonthName,
    MonthShort,
    Month2,
    Month,
    Day2,
    Day,
    WeekdayName,
    WeekdayShort,
    Hour2,
    Hour,
    Hour12Padded,
    Hour12,
    Minute2,
    Minute,
    Second2,
    Second,
    MeridiemUpper,
    MeridiemLower,
}

// Longest token first so `MMMM` wins over `MM`.
const FIELD_TOKENS: &[(&str, Field)] = &[
    ("YYYY", Field::Year4),
    ("YY", Field::Year2),
    ("MMMM", Field::MonthName),
    ("MMM", Field::MonthShort),
    ("MM", Field::Month2),
    ("M", Field::Month),
    ("DD", Field::Day2),
    ("D", Field::Day),
    ("dddd", Field::WeekdayName),
    ("ddd", Field::WeekdayShort),
    ("HH", Field::Hour2),
    ("H", Field::Hour),
    ("hh", Field::Hour12Padded),
    ("h", Field::Hour12),
    ("mm", Field::Minute2),
    ("m", Field::Minute),
    ("ss", Field::Second2),
    ("s", Field::Second),
    ("A", Field::MeridiemUpper),
    ("a", Field::MeridiemLower),
];

impl Field {
    /// Regex fragment (one capture group) accepted for this field in strict mode.
    fn matcher(self) -> String {
        match self {
            Field::Year4 => r"(\d{4})".to_string(),
            Field::Year2
            | Field::Month2
            | Field::Day2
            | Field::Hour2
            | Field::Hour12Padded
            | Field::Minute2
            | Field::Second2 => r"(\d{2})".to_string(),
            Field::Month | Field::Day | Field::Hour | Field::Hour12 | Field::Minute | Field::Second => {
                r"(\d{1,2})".to_string()
            }
            Field::MonthName => format!("((?i:{}))", MONTH_NAMES.join("|")),
            Field::MonthShort => {
                let short: Vec<&str> = MONTH_NAMES.iter().map(|m| &m[..3]).collect();
                format!("((?i:{}))", short.join("|"))
            }
            Field::WeekdayName => format!("((?i:{}))", WEEKDAY_NAMES.join("|")),
            Field::WeekdayShort => {
                let short: Vec<&str> = WEEKDAY_NAMES.iter().map(|d| &d[..3]).collect();
                format!("((?i:{}))", short.join("|"))
            }
            Field::MeridiemUpper | Field::MeridiemLower => "((?i:am|pm))".to_string(),
        }
    }

    /// chrono strftime equivalent used for formatting.
    fn strftime(self) -> &'static str {
        match self {
            Field::Year4 => "%Y",
            Field::Year2 => "%y",
            Field::MonthName => "%B",
            Field::MonthShort => "%b",
            Field::Month2 => "%m",
            Field::Month => "%-m",
            Field::Day2 => "%d",
            Field::Day => "%-d",
            Field::WeekdayName => "%A",
            Field::WeekdayShort => "%a",
            Field::Hour2 => "%H",
            Field::Hour => "%-H",
            Field::Hour12Padded => "%I",
            Field::Hour12 => "%-I",
            Field::Minute2 => "%M",
            Field::Minute => "%-M",
            Field::Second2 => "%S",
            Field::Second => "%-S",
            Field::MeridiemUpper => "%p",
            Field::MeridiemLower => "%P",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Field(Field),
    Literal(String),
}

/// A parsed date/time value. Ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParsedDate(NaiveDateTime);

impl ParsedDate {
    #[cfg(test)]
    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// True if `self` is strictly later than `other`.
    pub fn is_after(&self, other: &ParsedDate) -> bool {
        self.0 > other.0
    }
}

impl fmt::Display for ParsedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// A compiled date pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    tokens: Vec<Token>,
    matcher: Regex,
}

impl Pattern {
    /// Compile a pattern string. Fails on an empty pattern or an unterminated `[`.
    pub fn compile(source: &str) -> Result<Self, String> {
        let tokens = tokenize(source)?;

        let mut re = String::from("^");
        for token in &tokens {
            match token {
                Token::Field(field) => re.push_str(&field.matcher()),
                Token::Literal(text) => re.push_str(&regex::escape(text)),
            }
        }
        re.push('$');

        let matcher =
            Regex::new(&re).map_err(|e| format!("invalid pattern {:?}: {}", source, e))?;

        Ok(Pattern {
            source: source.to_string(),
            tokens,
            matcher,
        })
    }

    /// The pattern string as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Character length of the pattern string itself (not of formatted output).
    pub fn char_len(&self) -> usize {
        self.source.chars().count()
    }

    /// Render a timestamp with this pattern.
    pub fn format(&self, at: &NaiveDateTime) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Field(field) => out.push_str(&at.format(field.strftime()).to_string()),
                Token::Literal(text) => out.push_str(text),
            }
        }
        out
    }

    /// Parse `text` strictly: the whole text must match and every field must be in range.
    pub fn parse_strict(&self, text: &str) -> Option<ParsedDate> {
        let caps = self.matcher.captures(text)?;
        let fields = self.tokens.iter().filter_map(|t| match t {
            Token::Field(f) => Some(*f),
            Token::Literal(_) => None,
        });

        let mut parts = Parts::default();
        for (idx, field) in fields.enumerate() {
            let raw = caps.get(idx + 1)?.as_str();
            parts.assign(field, raw)?;
        }
        parts.build()
    }
}

/// Compile and format in one step.
pub fn format(pattern: &str, at: &NaiveDateTime) -> Result<String, String> {
    Ok(Pattern::compile(pattern)?.format(at))
}

/// Compile and strictly parse in one step. An uncompilable pattern never matches.
#[cfg(test)]
pub fn parse_strict(text: &str, pattern: &str) -> Option<ParsedDate> {
    Pattern::compile(pattern).ok()?.parse_strict(text)
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    if source.is_empty() {
        return Err("empty pattern".to_string());
    }

    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while !rest.is_empty() {
        if let Some(escaped) = rest.strip_prefix('[') {
            let end = escaped
                .find(']')
                .ok_or_else(|| format!("unterminated '[' in pattern {:?}", source))?;
            literal.push_str(&escaped[..end]);
            rest = &escaped[end + 1..];
            continue;
        }

        if let Some((tok, field)) = FIELD_TOKENS.iter().find(|(tok, _)| rest.starts_with(tok)) {
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Field(*field));
            rest = &rest[tok.len()..];
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            literal.push(c);
        }
        rest = chars.as_str();
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

/// Field values collected during a parse.
#[derive(Debug, Default)]
struct Parts {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    weekday: Option<Weekday>,
    hour: Option<u32>,
    hour12: Option<u32>,
    pm: Option<bool>,
    minute: Option<u32>,
    second: Option<u32>,
}

impl Parts {
    fn assign(&mut self, field: Field, raw: &str) -> Option<()> {
        match field {
            Field::Year4 => self.year = Some(raw.parse().ok()?),
            Field::Year2 => {
                let yy: i32 = raw.parse().ok()?;
                self.year = Some(if yy > 68 { 1900 + yy } else { 2000 + yy });
            }
            Field::MonthName => self.month = Some(name_index(&MONTH_NAMES, raw, false)? + 1),
            Field::MonthShort => self.month = Some(name_index(&MONTH_NAMES, raw, true)? + 1),
            Field::Month2 | Field::Month => self.month = Some(raw.parse().ok()?),
            Field::Day2 | Field::Day => self.day = Some(raw.parse().ok()?),
            Field::WeekdayName | Field::WeekdayShort => {
                let idx = name_index(&WEEKDAY_NAMES, raw, field == Field::WeekdayShort)?;
                self.weekday = Some(Weekday::try_from(idx as u8).ok()?);
            }
            Field::Hour2 | Field::Hour => self.hour = Some(raw.parse().ok()?),
            Field::Hour12Padded | Field::Hour12 => self.hour12 = Some(raw.parse().ok()?),
            Field::Minute2 | Field::Minute => self.minute = Some(raw.parse().ok()?),
            Field::Second2 | Field::Second => self.second = Some(raw.parse().ok()?),
            Field::MeridiemUpper | Field::MeridiemLower => {
                self.pm = Some(raw.eq_ignore_ascii_case("pm"))
            }
        }
        Some(())
    }

    fn build(self) -> Option<ParsedDate> {
        let date = NaiveDate::from_ymd_opt(
            self.year.unwrap_or(DEFAULT_YEAR),
            self.month.unwrap_or(1),
            self.day.unwrap_or(1),
        )?;
        if let Some(weekday) = self.weekday
            && date.weekday() != weekday
        {
            return None;
        }

        let hour = match (self.hour12, self.hour) {
            (Some(h12), _) => {
                if !(1..=12).contains(&h12) {
                    return None;
                }
                match self.pm {
                    Some(true) if h12 < 12 => h12 + 12,
                    Some(true) => 12,
                    _ if h12 == 12 => 0,
                    _ => h12,
                }
            }
            (None, Some(h)) => h,
            (None, None) => 0,
        };
        let time = NaiveTime::from_hms_opt(hour, self.minute.unwrap_or(0), self.second.unwrap_or(0))?;

        Some(ParsedDate(NaiveDateTime::new(date, time)))
    }
}

fn name_index(names: &[&str], raw: &str, short: bool) -> Option<u32> {
    names
        .iter()
        .position(|name| {
            let candidate = if short { &name[..3] } else { name };
            candidate.eq_ignore_ascii_case(raw)
        })
        .map(|i| i as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_compile_rejects_bad_patterns() {
        assert!(Pattern::compile("").is_err());
        assert!(Pattern::compile("YYYY-[MM").is_err());
        assert!(Pattern::compile("HH:mm").is_ok());
    }

    #[test]
    fn test_format() {
        let t = at(2024, 5, 11, 9, 5, 7);
        let cases = vec![
            ("YYYY-MM-DD", "2024-05-11"),
            ("HH:mm", "09:05"),
            ("H:m:s", "9:5:7"),
            ("D MMMM YYYY", "11 May 2024"),
            ("ddd, MMM D", "Sat, May 11"),
            ("dddd", "Saturday"),
            ("hh:mm A", "09:05 AM"),
            ("h a", "9 am"),
            ("[Week of] YYYY", "Week of 2024"),
            ("YY.MM", "24.05"),
        ];

        for (pattern, want) in cases {
            let got = format(pattern, &t).unwrap();
            assert_eq!(got, want, "format({:?}) = {:?}, want {:?}", pattern, got, want);
        }
    }

    #[test]
    fn test_parse_strict_requires_padding() {
        assert!(parse_strict("2024-5-11", "YYYY-MM-DD").is_none());
        let parsed = parse_strict("2024-05-11", "YYYY-MM-DD").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 5, 11).unwrap());
    }

    #[test]
    fn test_parse_strict_rejects_partial_and_trailing() {
        let cases = vec![
            ("2024-05-11 extra", "YYYY-MM-DD"),
            ("x2024-05-11", "YYYY-MM-DD"),
            ("2024-05", "YYYY-MM-DD"),
            ("09:5", "HH:mm"),
            ("", "HH:mm"),
        ];
        for (text, pattern) in cases {
            assert!(
                parse_strict(text, pattern).is_none(),
                "parse_strict({:?}, {:?}) should fail",
                text,
                pattern
            );
        }
    }

    #[test]
    fn test_parse_strict_range_checks() {
        let cases = vec![
            ("2024-13-01", "YYYY-MM-DD"),
            ("2023-02-29", "YYYY-MM-DD"),
            ("2024-04-31", "YYYY-MM-DD"),
            ("24:00", "HH:mm"),
            ("12:60", "HH:mm"),
            ("13:00 PM", "hh:mm A"),
            ("00:10 AM", "hh:mm A"),
        ];
        for (text, pattern) in cases {
            assert!(
                parse_strict(text, pattern).is_none(),
                "parse_strict({:?}, {:?}) should fail",
                text,
                pattern
            );
        }
        assert!(parse_strict("2024-02-29", "YYYY-MM-DD").is_some());
        assert!(parse_strict("02-29", "MM-DD").is_some());
    }

    #[test]
    fn test_parse_names_and_meridiem() {
        let parsed = parse_strict("Saturday, May 11 2024", "dddd, MMMM D YYYY").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 5, 11).unwrap());

        // Weekday must agree with the date
        assert!(parse_strict("Friday, May 11 2024", "dddd, MMMM D YYYY").is_none());

        let pm = parse_strict("12:30 PM", "hh:mm A").unwrap();
        assert_eq!(pm.datetime().time(), NaiveTime::from_hms_opt(12, 30, 0).unwrap());
        let am = parse_strict("12:30 am", "hh:mm a").unwrap();
        assert_eq!(am.datetime().time(), NaiveTime::from_hms_opt(0, 30, 0).unwrap());
    }

    #[test]
    fn test_format_parse_agree() {
        let t = at(2025, 1, 3, 17, 45, 0);
        for pattern in ["YYYY-MM-DD", "HH:mm", "DD.MM.YYYY HH:mm", "MMM D, YYYY"] {
            let p = Pattern::compile(pattern).unwrap();
            assert!(
                p.parse_strict(&p.format(&t)).is_some(),
                "pattern {:?} did not parse its own output",
                pattern
            );
        }
    }

    #[test]
    fn test_is_after_and_ordering() {
        let a = parse_strict("2024-05-11", "YYYY-MM-DD").unwrap();
        let b = parse_strict("2024-05-12", "YYYY-MM-DD").unwrap();
        assert!(b.is_after(&a));
        assert!(!a.is_after(&b));
        assert!(!a.is_after(&a));
    }

    #[test]
    fn test_char_len_counts_pattern_not_output() {
        let p = Pattern::compile("MMMM").unwrap();
        assert_eq!(p.char_len(), 4);
        assert_eq!(p.format(&at(2024, 9, 1, 0, 0, 0)), "September");
    }
}

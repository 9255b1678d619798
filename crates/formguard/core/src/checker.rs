// File: src/checker.rs
// Purpose: Field checks - pure predicates over a field value and its rule

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::rule::RuleToken;

// Quoted or dot-separated local part; bracketed IPv4 literal or labels with a 2+ letter TLD
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .unwrap()
});

// YYYY-M-D, or D.M.YYYY / D M YYYY
static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(([0-9]{4}(-[0-9]{1,2}){2})|(([0-9]{1,2}(\s|\.)){2}[0-9]{4}))$").unwrap()
});

// YYYY or YYYY-MM
static PARTIAL_DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})(?:-([0-9]{2}))?$").unwrap());

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y %m %d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m %d %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%a %b %d %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// ISO date-times with a numeric offset but no seconds
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z"];

/// How the three date heuristics are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    /// Valid when any heuristic accepts the value
    #[default]
    Lenient,
    /// Valid only when every heuristic accepts the value
    Strict,
}

/// The value a field contributes to its check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Trimmed text of an input or select
    Text(String),
    /// Whether any checkbox/radio sharing the field's name is checked
    Checked(bool),
}

impl FieldValue {
    /// Build a text value, trimming surrounding whitespace
    pub fn text(raw: &str) -> Self {
        FieldValue::Text(raw.trim().to_string())
    }
}

/// Checks values against rules
///
/// Returns `true` when the value is INVALID, matching the "has error"
/// polarity the orchestrator aggregates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldChecker {
    pub date_mode: DateMode,
}

impl FieldChecker {
    pub fn new(date_mode: DateMode) -> Self {
        Self { date_mode }
    }

    pub fn check(&self, value: &FieldValue, rule: &RuleToken) -> bool {
        let invalid = match (value, rule) {
            (FieldValue::Checked(any_checked), RuleToken::Checked) => !any_checked,
            // Checkbox/radio groups only understand `checked`
            (FieldValue::Checked(_), _) => false,
            (FieldValue::Text(_), RuleToken::Checked) => false,
            (FieldValue::Text(val), rule) => self.check_text(val, rule),
        };
        tracing::trace!(rule = %rule, invalid, "field checked");
        invalid
    }

    fn check_text(&self, val: &str, rule: &RuleToken) -> bool {
        let len = val.chars().count();
        match rule {
            RuleToken::Required => len == 0,
            RuleToken::Email => !is_valid_email(val),
            RuleToken::Date => !is_valid_date(val, self.date_mode),
            RuleToken::MinLength(min) => len < *min,
            RuleToken::MaxLength(max) => len > *max || len == 0,
            RuleToken::Regex(re) => !re.is_match(val),
            RuleToken::Checked => false,
        }
    }
}

/// Check a value with the default (lenient) checker
pub fn check(value: &FieldValue, rule: &RuleToken) -> bool {
    FieldChecker::default().check(value, rule)
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Date check built from three heuristics: the structural pattern, a generic
/// parse of the value, and a generic parse with the first `.` turned into a space.
///
/// Lenient mode is loose on purpose: `2020-13-45` passes on the pattern alone.
pub fn is_valid_date(val: &str, mode: DateMode) -> bool {
    let structural = DATE_REGEX.is_match(val);
    let parsed = parses_as_date(val);
    let parsed_dotted = parses_as_date(&val.replacen('.', " ", 1));

    match mode {
        DateMode::Lenient => structural || parsed || parsed_dotted,
        DateMode::Strict => structural && parsed && parsed_dotted,
    }
}

/// Generic date parsing over common textual formats
fn parses_as_date(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() {
        return false;
    }

    if DateTime::parse_from_rfc3339(s).is_ok() || DateTime::parse_from_rfc2822(s).is_ok() {
        return true;
    }
    if parses_as_partial_date(s) {
        return true;
    }
    if OFFSET_DATETIME_FORMATS
        .iter()
        .any(|fmt| DateTime::parse_from_str(s, fmt).is_ok())
    {
        return true;
    }

    // A trailing `Z` is UTC; the naive formats cover the rest
    let local = s.strip_suffix(['Z', 'z']).unwrap_or(s);
    DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(local, fmt).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|fmt| NaiveDate::parse_from_str(s, fmt).is_ok())
}

/// `YYYY` or `YYYY-MM`, read as the first day of that year or month
fn parses_as_partial_date(s: &str) -> bool {
    let Some(caps) = PARTIAL_DATE_REGEX.captures(s) else {
        return false;
    };
    let year = caps[1].parse::<i32>().ok();
    let month = caps.get(2).map_or(Some(1), |m| m.as_str().parse::<u32>().ok());
    matches!((year, month), (Some(y), Some(m)) if NaiveDate::from_ymd_opt(y, m, 1).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(v: &str) -> FieldValue {
        FieldValue::text(v)
    }

    #[test]
    fn test_required() {
        assert!(check(&text(""), &RuleToken::Required));
        assert!(check(&text("   \t"), &RuleToken::Required));
        assert!(!check(&text(" x "), &RuleToken::Required));
    }

    #[rstest]
    #[case("a@b.com", false)]
    #[case("user.name@example.co.uk", false)]
    #[case("\"quoted user\"@example.com", false)]
    #[case("admin@[192.168.0.1]", false)]
    #[case("not-an-email", true)]
    #[case("user@example", true)]
    #[case("user@@example.com", true)]
    #[case("us er@example.com", true)]
    #[case("user@example.c", true)]
    #[case("", true)]
    fn test_email(#[case] value: &str, #[case] invalid: bool) {
        assert_eq!(check(&text(value), &RuleToken::Email), invalid, "{value}");
    }

    #[test]
    fn test_email_is_single_line() {
        assert!(!is_valid_email("junk\na@b.com"));
    }

    #[rstest]
    #[case("2020-01-15")]
    #[case("2020-1-5")]
    #[case("31.12.2020")]
    #[case("31 12 2020")]
    #[case("12/25/2020")]
    #[case("March 15 2021")]
    #[case("2021-03-15T10:30:00Z")]
    #[case("2020")]
    #[case("2020-06")]
    #[case("2020-06-15T10:30Z")]
    #[case("2020-06-15T10:30+02:00")]
    #[case("2020-06-15T10:30:45.250-05:00")]
    fn test_lenient_date_accepts(#[case] value: &str) {
        assert!(!check(&text(value), &RuleToken::Date), "{value}");
    }

    #[rstest]
    #[case("")]
    #[case("not a date")]
    #[case("2020/13")]
    #[case("15-01")]
    #[case("2020-13")]
    #[case("20201")]
    #[case("2020-06-15T25:00Z")]
    fn test_lenient_date_rejects(#[case] value: &str) {
        assert!(check(&text(value), &RuleToken::Date), "{value}");
    }

    #[test]
    fn test_lenient_date_is_loose() {
        // Passes the structural pattern even though no such day exists
        assert!(!check(&text("2020-13-45"), &RuleToken::Date));
    }

    #[test]
    fn test_strict_date_requires_all_heuristics() {
        let strict = FieldChecker::new(DateMode::Strict);
        assert!(!strict.check(&text("2020-01-15"), &RuleToken::Date));
        assert!(strict.check(&text("2020-13-45"), &RuleToken::Date));
        // Parses, but not in the structural shape
        assert!(strict.check(&text("12/25/2020"), &RuleToken::Date));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(3)]
    #[case(7)]
    fn test_min_length_law(#[case] n: usize) {
        for value in ["", "a", "ab ", "abc", "  abcd  ", "abcdefgh"] {
            let len = value.trim().chars().count();
            assert_eq!(check(&text(value), &RuleToken::MinLength(n)), len < n);
        }
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(5)]
    fn test_max_length_law(#[case] n: usize) {
        for value in ["", "a", "ab ", "12345", "123456", " 1 "] {
            let len = value.trim().chars().count();
            assert_eq!(
                check(&text(value), &RuleToken::MaxLength(n)),
                len > n || len == 0
            );
        }
    }

    #[test]
    fn test_max_length_scenario() {
        let rule = RuleToken::MaxLength(5);
        assert!(check(&text(""), &rule));
        assert!(!check(&text("12345"), &rule));
        assert!(check(&text("123456"), &rule));
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(!check(&text("héllo"), &RuleToken::MaxLength(5)));
    }

    #[test]
    fn test_regex_unanchored_match() {
        let rule = RuleToken::parse("regex:[0-9]{3}").unwrap();
        assert!(!check(&text("abc123"), &rule));
        assert!(check(&text("ab12"), &rule));

        let anchored = RuleToken::parse("regex:^[a-z]+$").unwrap();
        assert!(check(&text("abc1"), &anchored));
    }

    #[test]
    fn test_checked_group() {
        assert!(check(&FieldValue::Checked(false), &RuleToken::Checked));
        assert!(!check(&FieldValue::Checked(true), &RuleToken::Checked));
    }

    #[test]
    fn test_mismatched_kinds_never_fail() {
        assert!(!check(&FieldValue::Checked(false), &RuleToken::Required));
        assert!(!check(&text(""), &RuleToken::Checked));
    }
}

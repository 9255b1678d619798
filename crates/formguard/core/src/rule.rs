// File: src/rule.rs
// Purpose: Parse rule type tokens ("required", "minLength:3", "regex:^a") into typed rules

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{FormError, Result};

const MIN_LENGTH_PREFIX: &str = "minLength:";
const MAX_LENGTH_PREFIX: &str = "maxLength:";
const REGEX_PREFIX: &str = "regex:";

/// A parsed validation rule
///
/// Each field carries exactly one rule. The token is parsed once when the
/// session is built, so checks never re-inspect the raw string.
#[derive(Debug, Clone)]
pub enum RuleToken {
    /// Trimmed value must not be empty
    Required,
    /// Value must look like an email address
    Email,
    /// Value must look like a date
    Date,
    /// Trimmed value must have at least `n` characters
    MinLength(usize),
    /// Trimmed value must have between 1 and `n` characters
    MaxLength(usize),
    /// Value must contain a match of the pattern
    Regex(Regex),
    /// At least one checkbox/radio with the field's name must be checked
    Checked,
}

impl RuleToken {
    /// Parse a rule type token
    ///
    /// # Examples
    /// ```
    /// use formguard_core::RuleToken;
    /// assert_eq!(RuleToken::parse("minLength:3").unwrap(), RuleToken::MinLength(3));
    /// assert_eq!(RuleToken::parse("checked").unwrap(), RuleToken::Checked);
    /// assert!(RuleToken::parse("minLength:").is_err());
    /// assert!(RuleToken::parse("phone").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "required" => return Ok(RuleToken::Required),
            "email" => return Ok(RuleToken::Email),
            "date" => return Ok(RuleToken::Date),
            "checked" => return Ok(RuleToken::Checked),
            _ => {}
        }

        if let Some(n) = raw.strip_prefix(MIN_LENGTH_PREFIX) {
            return parse_length(raw, n).map(RuleToken::MinLength);
        }

        if let Some(n) = raw.strip_prefix(MAX_LENGTH_PREFIX) {
            return parse_length(raw, n).map(RuleToken::MaxLength);
        }

        if let Some(pattern) = raw.strip_prefix(REGEX_PREFIX) {
            return Regex::new(pattern)
                .map(RuleToken::Regex)
                .map_err(|e| FormError::parameter(raw, e.to_string()));
        }

        Err(FormError::UnrecognizedRule(raw.to_string()))
    }

    /// Short name used in log output
    pub fn kind(&self) -> &'static str {
        match self {
            RuleToken::Required => "required",
            RuleToken::Email => "email",
            RuleToken::Date => "date",
            RuleToken::MinLength(_) => "minLength",
            RuleToken::MaxLength(_) => "maxLength",
            RuleToken::Regex(_) => "regex",
            RuleToken::Checked => "checked",
        }
    }

    /// Whether the rule applies to checkbox/radio groups rather than text values
    pub fn is_group_rule(&self) -> bool {
        matches!(self, RuleToken::Checked)
    }
}

/// Length suffixes must be plain decimal digits.
fn parse_length(raw: &str, digits: &str) -> Result<usize> {
    if digits.is_empty() {
        return Err(FormError::parameter(raw, "missing length"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormError::parameter(
            raw,
            format!("`{}` is not a non-negative integer", digits),
        ));
    }
    digits
        .parse::<usize>()
        .map_err(|e| FormError::parameter(raw, e.to_string()))
}

impl PartialEq for RuleToken {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuleToken::Required, RuleToken::Required)
            | (RuleToken::Email, RuleToken::Email)
            | (RuleToken::Date, RuleToken::Date)
            | (RuleToken::Checked, RuleToken::Checked) => true,
            (RuleToken::MinLength(a), RuleToken::MinLength(b)) => a == b,
            (RuleToken::MaxLength(a), RuleToken::MaxLength(b)) => a == b,
            (RuleToken::Regex(a), RuleToken::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl Eq for RuleToken {}

impl fmt::Display for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleToken::MinLength(n) => write!(f, "{}{}", MIN_LENGTH_PREFIX, n),
            RuleToken::MaxLength(n) => write!(f, "{}{}", MAX_LENGTH_PREFIX, n),
            RuleToken::Regex(re) => write!(f, "{}{}", REGEX_PREFIX, re.as_str()),
            other => f.write_str(other.kind()),
        }
    }
}

impl FromStr for RuleToken {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        RuleToken::parse(s)
    }
}

impl Serialize for RuleToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RuleToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RuleToken::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal_tokens() {
        assert_eq!(RuleToken::parse("required").unwrap(), RuleToken::Required);
        assert_eq!(RuleToken::parse("email").unwrap(), RuleToken::Email);
        assert_eq!(RuleToken::parse("date").unwrap(), RuleToken::Date);
        assert_eq!(RuleToken::parse("checked").unwrap(), RuleToken::Checked);
    }

    #[test]
    fn test_literals_are_exact() {
        assert!(matches!(
            RuleToken::parse("Required"),
            Err(FormError::UnrecognizedRule(_))
        ));
        assert!(matches!(
            RuleToken::parse(" email"),
            Err(FormError::UnrecognizedRule(_))
        ));
    }

    #[test]
    fn test_length_tokens() {
        assert_eq!(RuleToken::parse("minLength:3").unwrap(), RuleToken::MinLength(3));
        assert_eq!(RuleToken::parse("maxLength:0").unwrap(), RuleToken::MaxLength(0));
        assert_eq!(RuleToken::parse("maxLength:120").unwrap(), RuleToken::MaxLength(120));
    }

    #[test]
    fn test_malformed_length_fails_fast() {
        for raw in ["minLength:", "minLength:abc", "maxLength:-1", "maxLength:3 "] {
            assert!(
                matches!(RuleToken::parse(raw), Err(FormError::InvalidRuleParameter { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_regex_token() {
        let rule = RuleToken::parse("regex:^[a-z]+$").unwrap();
        match &rule {
            RuleToken::Regex(re) => assert_eq!(re.as_str(), "^[a-z]+$"),
            other => panic!("expected regex, got {other:?}"),
        }
        // Everything after the prefix belongs to the pattern, colons included
        let rule = RuleToken::parse("regex:^a:b$").unwrap();
        assert_eq!(rule.to_string(), "regex:^a:b$");
    }

    #[test]
    fn test_bad_regex_is_parameter_error() {
        let err = RuleToken::parse("regex:([a-z").unwrap_err();
        assert!(matches!(err, FormError::InvalidRuleParameter { ref rule, .. } if rule == "regex:([a-z"));
    }

    #[test]
    fn test_unknown_rule() {
        assert_eq!(
            RuleToken::parse("phone").unwrap_err(),
            FormError::UnrecognizedRule("phone".to_string())
        );
    }

    #[test]
    fn test_serde_uses_text_form() {
        let rule: RuleToken = serde_json::from_str("\"maxLength:5\"").unwrap();
        assert_eq!(rule, RuleToken::MaxLength(5));
        assert_eq!(serde_json::to_string(&rule).unwrap(), "\"maxLength:5\"");
        assert!(serde_json::from_str::<RuleToken>("\"nope\"").is_err());
    }
}

//! Verification code matching for mail bodies.
//!
//! This module provides the [`Matcher`] trait and the two extraction patterns
//! used on mail text: a contiguous six-digit code and a space-separated one.
//!
//! # Example
//!
//! ```
//! use tempmail_verify::matcher::{Matcher, VerificationCodeMatcher};
//!
//! let matcher = VerificationCodeMatcher::new();
//! assert_eq!(matcher.find_match("Your code is 123456.").as_deref(), Some("123456"));
//! assert_eq!(matcher.find_match("Code: 9 7 7 1 8 2").as_deref(), Some("977182"));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Six digits delimited by word boundaries.
static SIX_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{6}\b").expect("valid six digit regex"));

/// Six digits each followed by a single whitespace character, except the last.
static SPACED_SIX_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\d\s){5}\d").expect("valid spaced digit regex"));

/// Trait for extracting a code from a mail body.
///
/// # Example
///
/// ```
/// use tempmail_verify::matcher::Matcher;
/// use std::borrow::Cow;
///
/// struct Fixed;
///
/// impl Matcher for Fixed {
///     fn find_match<'a>(&self, _text: &'a str) -> Option<Cow<'a, str>> {
///         Some(Cow::Borrowed("000000"))
///     }
///
///     fn description(&self) -> &str {
///         "fixed code"
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Attempts to find and extract matching content from the text.
    ///
    /// Returns `Some(matched_value)` if found, `None` otherwise.
    /// Uses `Cow<str>` to avoid allocations when the match can be borrowed
    /// directly from the input text.
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>>;

    /// Returns a human-readable description of what this matcher looks for.
    ///
    /// Used in logging and error messages.
    fn description(&self) -> &str;
}

/// Regex-based matcher.
///
/// Extracts the first capture group, or the whole match when the pattern has
/// no capture groups.
///
/// # Example
///
/// ```
/// use tempmail_verify::matcher::{RegexMatcher, Matcher};
///
/// let matcher = RegexMatcher::new(r"code:\s*(\d+)").unwrap();
/// assert_eq!(matcher.find_match("Your code: 42"), Some("42".into()));
/// ```
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
    description: String,
}

impl RegexMatcher {
    /// Creates a new regex matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Self::with_description(pattern, format!("regex pattern: {pattern}"))
    }

    /// Creates a new regex matcher with a custom description.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn with_description(
        pattern: &str,
        description: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        Ok(Self {
            description: description.into(),
            regex,
        })
    }
}

impl Matcher for RegexMatcher {
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        let caps = self.regex.captures(text)?;
        caps.get(1)
            .or_else(|| caps.get(0))
            .map(|m| Cow::Borrowed(m.as_str()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Matcher for contiguous six-digit codes.
///
/// A candidate must stand on word boundaries and must not directly follow a
/// letter, `@` or `.`, so digits inside addresses, host names and decimals
/// are skipped.
///
/// # Example
///
/// ```
/// use tempmail_verify::matcher::{OtpMatcher, Matcher};
///
/// let otp = OtpMatcher::six_digit();
/// assert_eq!(otp.find_match("Your code is 123456."), Some("123456".into()));
/// assert_eq!(otp.find_match("Code: 12345"), None); // Only 5 digits
/// assert_eq!(otp.find_match("Mail 111111@example.com or 222222"), Some("111111".into()));
/// assert_eq!(otp.find_match("Version 1.123456"), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OtpMatcher;

impl OtpMatcher {
    /// Creates a matcher for six-digit codes.
    #[must_use]
    pub fn six_digit() -> Self {
        Self
    }
}

/// Returns `true` when `c` may not directly precede a code.
fn is_code_blocker(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '@' || c == '.'
}

impl Matcher for OtpMatcher {
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        SIX_DIGITS
            .find_iter(text)
            .find(|m| {
                !text[..m.start()]
                    .chars()
                    .next_back()
                    .is_some_and(is_code_blocker)
            })
            .map(|m| Cow::Borrowed(m.as_str()))
    }

    fn description(&self) -> &str {
        "6-digit code"
    }
}

/// Matcher for six-digit codes written with single whitespace separators,
/// such as `9 7 7 1 8 2`.
///
/// The separators are removed from the result.
///
/// # Example
///
/// ```
/// use tempmail_verify::matcher::{SpacedDigitsMatcher, Matcher};
///
/// let spaced = SpacedDigitsMatcher::six_digit();
/// assert_eq!(spaced.find_match("Code: 9 7 7 1 8 2").as_deref(), Some("977182"));
/// assert_eq!(spaced.find_match("Code: 9 7 7"), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedDigitsMatcher;

impl SpacedDigitsMatcher {
    /// Creates a matcher for space-separated six-digit codes.
    #[must_use]
    pub fn six_digit() -> Self {
        Self
    }
}

impl Matcher for SpacedDigitsMatcher {
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        SPACED_SIX_DIGITS.find(text).map(|m| {
            Cow::Owned(
                m.as_str()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect(),
            )
        })
    }

    fn description(&self) -> &str {
        "space-separated 6-digit code"
    }
}

/// Default verification code matcher.
///
/// Tries [`OtpMatcher`] first and falls back to [`SpacedDigitsMatcher`] only
/// when the text holds no contiguous code.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerificationCodeMatcher {
    contiguous: OtpMatcher,
    spaced: SpacedDigitsMatcher,
}

impl VerificationCodeMatcher {
    /// Creates the default matcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Matcher for VerificationCodeMatcher {
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        self.contiguous
            .find_match(text)
            .or_else(|| self.spaced.find_match(text))
    }

    fn description(&self) -> &str {
        "6-digit verification code"
    }
}

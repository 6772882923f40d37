//! # External Date Parser
//!
//! The general-purpose parser tried before the fallback grammar. Its result
//! is trusted as-is. Any type implementing [`ExternalParser`] can be plugged
//! into the extractor; [`FormatListParser`] is the built-in one.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ExternalParseError;

/// A whole-string date parser.
pub trait ExternalParser: Send + Sync {
    /// Parse all of `input` into a wall-clock date-time.
    ///
    /// Offsets in the input are dropped: the local reading is returned.
    fn parse(&self, input: &str) -> Result<NaiveDateTime, ExternalParseError>;
}

impl<F> ExternalParser for F
where
    F: Fn(&str) -> Result<NaiveDateTime, ExternalParseError> + Send + Sync,
{
    fn parse(&self, input: &str) -> Result<NaiveDateTime, ExternalParseError> {
        self(input)
    }
}

/// Layouts carrying a UTC offset; the offset is parsed and discarded.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Full date-time layouts. `%b` also accepts full month names.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%b %d, %Y, %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%b %d %Y %I:%M %p",
    "%a, %b %d, %Y, %I:%M %p",
    "%a %b %d %H:%M:%S %Y",
];

/// Date-only layouts, resolved to midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%b %d, %Y", "%b %d %Y", "%a, %b %d, %Y"];

/// Tries a fixed list of unambiguous layouts against the whole input.
///
/// Only layouts with a four-digit year or a month name are included, so
/// numeric listings like "12/02/10" are left to the fallback grammar.
#[derive(Debug, Clone)]
pub struct FormatListParser {
    offset_formats: Vec<String>,
    datetime_formats: Vec<String>,
    date_formats: Vec<String>,
}

impl Default for FormatListParser {
    fn default() -> Self {
        Self {
            offset_formats: to_owned(OFFSET_FORMATS),
            datetime_formats: to_owned(DATETIME_FORMATS),
            date_formats: to_owned(DATE_FORMATS),
        }
    }
}

impl FormatListParser {
    /// Create a parser with the built-in layouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a date-time layout, tried after the built-in ones.
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_formats.push(format.into());
        self
    }

    /// Add a date-only layout, tried after the built-in ones.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_formats.push(format.into());
        self
    }
}

impl ExternalParser for FormatListParser {
    fn parse(&self, input: &str) -> Result<NaiveDateTime, ExternalParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ExternalParseError {
                input: input.to_string(),
                reason: "empty input".into(),
            });
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt.naive_local());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
            return Ok(dt.naive_local());
        }

        let offset = self
            .offset_formats
            .iter()
            .find_map(|f| DateTime::parse_from_str(trimmed, f).ok())
            .map(|dt| dt.naive_local());
        let naive = || {
            self.datetime_formats
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
        };
        let date_only = || {
            self.date_formats
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(trimmed, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        };

        offset
            .or_else(naive)
            .or_else(date_only)
            .ok_or_else(|| ExternalParseError {
                input: input.to_string(),
                reason: "no known layout matches".into(),
            })
    }
}

fn to_owned(formats: &[&str]) -> Vec<String> {
    formats.iter().map(|f| (*f).to_string()).collect()
}

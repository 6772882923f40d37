use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::fragment::{Field, TimezoneLabel};
use super::mode::{ExtractionSource, OutputMode};
use crate::error::NormalizationError;

/// ISO-8601 layout used for string output, without offset or fraction.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A fully specified calendar date-time with whole-second precision.
///
/// No timezone offset is attached; the value is a wall-clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "NaiveDateTime", into = "NaiveDateTime")]
pub struct ResolvedDateTime(NaiveDateTime);

impl ResolvedDateTime {
    /// Builds a date-time from its six fields.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizationError::OutOfRange`] for a clock field outside
    /// its range and [`NormalizationError::InvalidDate`] when the date does
    /// not exist (e.g. February 31).
    pub fn from_fields(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, NormalizationError> {
        check_range(Field::Hour, hour, 0, 23)?;
        check_range(Field::Minute, minute, 0, 59)?;
        check_range(Field::Second, second, 0, 59)?;

        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(NormalizationError::InvalidDate { year, month, day })?;
        date.and_hms_opt(hour, minute, second)
            .map(Self)
            .ok_or(NormalizationError::OutOfRange {
                field: Field::Second,
                value: second,
                min: 0,
                max: 59,
            })
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    #[must_use]
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    #[must_use]
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    #[must_use]
    pub fn second(&self) -> u32 {
        self.0.second()
    }

    /// The underlying chrono value.
    #[must_use]
    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Canonical string form, e.g. `2010-12-02T20:00:00`.
    #[must_use]
    pub fn to_iso_string(&self) -> String {
        self.0.format(ISO_FORMAT).to_string()
    }
}

impl From<NaiveDateTime> for ResolvedDateTime {
    /// Drops any sub-second part.
    fn from(dt: NaiveDateTime) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }
}

impl From<ResolvedDateTime> for NaiveDateTime {
    fn from(dt: ResolvedDateTime) -> Self {
        dt.0
    }
}

impl fmt::Display for ResolvedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

pub(crate) fn check_range(
    field: Field,
    value: u32,
    min: u32,
    max: u32,
) -> Result<u32, NormalizationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(NormalizationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// The extracted value in the shape selected by [`OutputMode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractedValue {
    Iso(String),
    DateTime(ResolvedDateTime),
}

impl ExtractedValue {
    /// Renders `datetime` in the requested shape.
    #[must_use]
    pub fn render(datetime: ResolvedDateTime, mode: OutputMode) -> Self {
        match mode {
            OutputMode::Iso => Self::Iso(datetime.to_iso_string()),
            OutputMode::Structured => Self::DateTime(datetime),
        }
    }

    /// Returns the ISO string, if this is string output.
    #[must_use]
    pub fn as_iso(&self) -> Option<&str> {
        match self {
            Self::Iso(s) => Some(s),
            Self::DateTime(_) => None,
        }
    }

    /// Returns the structured value, if this is structured output.
    #[must_use]
    pub fn as_datetime(&self) -> Option<ResolvedDateTime> {
        match self {
            Self::Iso(_) => None,
            Self::DateTime(dt) => Some(*dt),
        }
    }
}

impl fmt::Display for ExtractedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iso(s) => f.write_str(s),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// The primary output of the extraction engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Original input string.
    pub input: String,

    /// The resolved date-time, shaped by the configured output mode.
    pub value: ExtractedValue,

    /// Timezone label found by the grammar, if any. Never applied to `value`.
    pub timezone: Option<TimezoneLabel>,

    /// Which stage produced `value`.
    pub source: ExtractionSource,
}

impl Extraction {
    /// Creates an extraction result.
    #[must_use]
    pub fn new(
        input: impl Into<String>,
        datetime: ResolvedDateTime,
        mode: OutputMode,
        source: ExtractionSource,
    ) -> Self {
        Self {
            input: input.into(),
            value: ExtractedValue::render(datetime, mode),
            timezone: None,
            source,
        }
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: Option<TimezoneLabel>) -> Self {
        self.timezone = timezone;
        self
    }
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extraction({}", self.value)?;
        if let Some(tz) = self.timezone {
            write!(f, ", tz={tz}")?;
        }
        write!(f, ", source={})", self.source)
    }
}

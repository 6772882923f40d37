//! # Fragment Normalizer
//!
//! Turns raw grammar captures into range-checked calendar and clock fields.
//! The grammar only constrains digit counts, so every range is checked here.

use regex::Captures;
use tracing::debug;

use crate::error::NormalizationError;
use crate::parser::grammar::Token;
use crate::types::result::check_range;
use crate::types::{DateFragment, Field, Fragment, Meridiem, TimeFragment, TimezoneLabel};

/// Two-digit (in fact any sub-1000) years are read as 2000 + year.
const YEAR_CORRECTION_THRESHOLD: u32 = 1000;
const YEAR_CORRECTION: u32 = 2000;

/// A range-checked clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

/// Range-checked date fields. Missing fields are completed later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizedDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

/// At most one normalized fragment of each type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizedFragments {
    pub date: Option<NormalizedDate>,
    pub time: Option<NormalizedTime>,
    pub timezone: Option<TimezoneLabel>,
}

impl NormalizedFragments {
    /// Returns `true` if neither a date nor a time was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.time.is_none()
    }

    /// Builds the fragment set from regex named groups.
    ///
    /// Recognised groups: `year`, `month`, `day`, `hour`, `minute`, `second`,
    /// `ampm` and `tz`. A time needs at least `hour`; minutes and seconds
    /// default to zero as they do for grammar fragments.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizationError::InvalidCapture`] for a non-numeric
    /// capture, [`NormalizationError::OutOfRange`] for an out-of-range value
    /// and [`NormalizationError::NoFragments`] if no date or time field was
    /// captured.
    pub fn from_captures(caps: &Captures<'_>) -> Result<Self, NormalizationError> {
        let year = capture_number(caps, "year", Field::Year)?;
        let month = capture_number(caps, "month", Field::Month)?;
        let day = capture_number(caps, "day", Field::Day)?;

        let date = if year.is_some() || month.is_some() || day.is_some() {
            Some(NormalizedDate {
                year: year.map(correct_year).transpose()?,
                month: month.map(|m| check_range(Field::Month, m, 1, 12)).transpose()?,
                day: day.map(|d| check_range(Field::Day, d, 1, 31)).transpose()?,
            })
        } else {
            None
        };

        let time = match capture_number(caps, "hour", Field::Hour)? {
            Some(hour) => {
                let ampm = match caps.name("ampm") {
                    Some(m) => Some(Meridiem::from_label(m.as_str().trim()).ok_or_else(|| {
                        NormalizationError::InvalidCapture {
                            field: Field::Hour,
                            text: m.as_str().to_string(),
                        }
                    })?),
                    None => None,
                };
                let fragment = TimeFragment::clock(
                    hour,
                    capture_number(caps, "minute", Field::Minute)?,
                    capture_number(caps, "second", Field::Second)?,
                    ampm,
                );
                Some(normalize_time(&fragment)?)
            }
            None => None,
        };

        let timezone = caps
            .name("tz")
            .and_then(|m| TimezoneLabel::from_label(m.as_str().trim()));

        let fragments = Self {
            date,
            time,
            timezone,
        };
        if fragments.is_empty() {
            return Err(NormalizationError::NoFragments);
        }
        Ok(fragments)
    }
}

/// Selects the first valid fragment of each type from `tokens`.
///
/// Later duplicates are ignored. An invalid fragment is skipped in favour of
/// a later valid one of the same type; if none of a type is valid, the first
/// violation is returned.
///
/// # Errors
///
/// Returns [`NormalizationError::OutOfRange`] as described above, or
/// [`NormalizationError::NoFragments`] if the tokens hold no date or time.
pub fn normalize(tokens: &[Token]) -> Result<NormalizedFragments, NormalizationError> {
    let time = first_valid(
        tokens.iter().filter_map(|t| match &t.fragment {
            Fragment::Time(time) => Some(time),
            _ => None,
        }),
        normalize_time,
    )
    .transpose()?;

    let date = first_valid(
        tokens.iter().filter_map(|t| match &t.fragment {
            Fragment::Date(date) => Some(date),
            _ => None,
        }),
        normalize_date,
    )
    .transpose()?;

    let timezone = tokens.iter().find_map(|t| match t.fragment {
        Fragment::Timezone(tz) => Some(tz),
        _ => None,
    });

    let fragments = NormalizedFragments {
        date,
        time,
        timezone,
    };
    if fragments.is_empty() {
        return Err(NormalizationError::NoFragments);
    }
    Ok(fragments)
}

/// Applies the am/pm adjustment and defaults minutes and seconds to zero.
///
/// `pm` moves hours below 13 forward by twelve, modulo 24; `am`, military
/// times and bare hours are taken as written.
///
/// # Errors
///
/// Returns [`NormalizationError::OutOfRange`] for an hour above 23 or a
/// minute or second above 59.
pub fn normalize_time(time: &TimeFragment) -> Result<NormalizedTime, NormalizationError> {
    let mut hour = time.hour;
    if !time.is_military && time.ampm == Some(Meridiem::Pm) && hour < 13 {
        hour = (hour + 12) % 24;
    }

    Ok(NormalizedTime {
        hour: check_range(Field::Hour, hour, 0, 23)?,
        minute: check_range(Field::Minute, time.minutes.unwrap_or(0), 0, 59)?,
        second: check_range(Field::Second, time.seconds.unwrap_or(0), 0, 59)?,
    })
}

/// Corrects two-digit years and checks month and day ranges.
///
/// # Errors
///
/// Returns [`NormalizationError::OutOfRange`] for a month outside 1-12, a day
/// outside 1-31 or a year past 9999.
pub fn normalize_date(date: &DateFragment) -> Result<NormalizedDate, NormalizationError> {
    Ok(NormalizedDate {
        year: date.year.map(correct_year).transpose()?,
        month: Some(check_range(Field::Month, date.month, 1, 12)?),
        day: Some(check_range(Field::Day, date.day, 1, 31)?),
    })
}

fn correct_year(year: u32) -> Result<i32, NormalizationError> {
    let year = if year < YEAR_CORRECTION_THRESHOLD {
        year + YEAR_CORRECTION
    } else {
        year
    };
    let year = check_range(Field::Year, year, YEAR_CORRECTION_THRESHOLD, 9999)?;
    // Bounded by 9999 above.
    Ok(year as i32)
}

fn first_valid<'a, F, T>(
    candidates: impl Iterator<Item = &'a F>,
    convert: impl Fn(&F) -> Result<T, NormalizationError>,
) -> Option<Result<T, NormalizationError>>
where
    F: std::fmt::Debug + 'a,
{
    let mut first_error = None;
    for candidate in candidates {
        match convert(candidate) {
            Ok(value) => return Some(Ok(value)),
            Err(err) => {
                debug!(fragment = ?candidate, error = %err, "skipping invalid fragment");
                first_error.get_or_insert(err);
            }
        }
    }
    first_error.map(Err)
}

fn capture_number(
    caps: &Captures<'_>,
    name: &str,
    field: Field,
) -> Result<Option<u32>, NormalizationError> {
    let Some(m) = caps.name(name) else {
        return Ok(None);
    };
    let text = m.as_str().trim();
    text.parse()
        .map(Some)
        .map_err(|_| NormalizationError::InvalidCapture {
            field,
            text: text.to_string(),
        })
}

use chrono::{Datelike, Timelike};

use crate::error::NormalizationError;
use crate::parser::normalizer::NormalizedFragments;
use crate::types::{CompletionContext, ResolvedDateTime};

/// Field completion heuristic.
///
/// Each of the six fields is taken, in order of precedence, from the matched
/// fragment, from the caller's defaults, or from `context.now`. A time
/// fragment always supplies hour, minute and second together (minutes and
/// seconds were defaulted to zero during normalization).
///
/// The function is pure: the same fragments and context always produce the
/// same result.
///
/// # Errors
///
/// Returns [`NormalizationError::InvalidDate`] when the merged fields do not
/// form a real date (e.g. a "2/31" fragment), or
/// [`NormalizationError::OutOfRange`] when a caller default is outside its
/// clock range.
pub fn complete(
    fragments: &NormalizedFragments,
    context: &CompletionContext,
) -> Result<ResolvedDateTime, NormalizationError> {
    let date = fragments.date.unwrap_or_default();
    let defaults = &context.defaults;
    let now = context.now;

    let year = date.year.or(defaults.year).unwrap_or_else(|| now.year());
    let month = date.month.or(defaults.month).unwrap_or_else(|| now.month());
    let day = date.day.or(defaults.day).unwrap_or_else(|| now.day());

    let (hour, minute, second) = match fragments.time {
        Some(time) => (time.hour, time.minute, time.second),
        None => (
            defaults.hour.unwrap_or_else(|| now.hour()),
            defaults.minute.unwrap_or_else(|| now.minute()),
            defaults.second.unwrap_or_else(|| now.second()),
        ),
    };

    ResolvedDateTime::from_fields(year, month, day, hour, minute, second)
}

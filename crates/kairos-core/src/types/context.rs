use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Caller-supplied values for fields the input does not mention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefaults {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
}

impl FieldDefaults {
    /// Creates an empty set of defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn with_hour(mut self, hour: u32) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn with_minute(mut self, minute: u32) -> Self {
        self.minute = Some(minute);
        self
    }

    pub fn with_second(mut self, second: u32) -> Self {
        self.second = Some(second);
        self
    }

    /// Returns `true` if no default is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything the completion heuristic may fall back on: caller defaults
/// first, then a snapshot of the current moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionContext {
    pub defaults: FieldDefaults,
    /// The moment the extraction call started; read once per call.
    pub now: NaiveDateTime,
}

impl CompletionContext {
    /// A context with no caller defaults.
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            defaults: FieldDefaults::default(),
            now,
        }
    }

    /// Replaces the caller defaults.
    #[must_use]
    pub fn with_defaults(mut self, defaults: FieldDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn defaults_builder() {
        let defaults = FieldDefaults::new().with_year(1999).with_hour(20);
        assert_eq!(defaults.year, Some(1999));
        assert_eq!(defaults.hour, Some(20));
        assert_eq!(defaults.month, None);
        assert!(!defaults.is_empty());
        assert!(FieldDefaults::new().is_empty());
    }

    #[test]
    fn context_keeps_now() {
        let now = NaiveDate::from_ymd_opt(2010, 10, 19)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        let ctx = CompletionContext::new(now).with_defaults(FieldDefaults::new().with_day(3));
        assert_eq!(ctx.now, now);
        assert_eq!(ctx.defaults.day, Some(3));
    }
}

use std::fmt;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// A typed piece of an input string recognised by the fallback grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    /// A time of day: "8:00 PM", "11pm", "2130".
    Time(TimeFragment),
    /// A numeric calendar date: "12/02/10", "10.21".
    Date(DateFragment),
    /// A timezone abbreviation: "PST".
    Timezone(TimezoneLabel),
    /// Any other word; consumed and discarded.
    Noise,
}

impl Fragment {
    /// Returns the kind of this fragment.
    #[must_use]
    pub fn kind(&self) -> FragmentKind {
        match self {
            Self::Time(_) => FragmentKind::Time,
            Self::Date(_) => FragmentKind::Date,
            Self::Timezone(_) => FragmentKind::Timezone,
            Self::Noise => FragmentKind::Noise,
        }
    }
}

/// Discriminant of [`Fragment`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FragmentKind {
    Time,
    Date,
    Timezone,
    Noise,
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time => write!(f, "time"),
            Self::Date => write!(f, "date"),
            Self::Timezone => write!(f, "timezone"),
            Self::Noise => write!(f, "noise"),
        }
    }
}

/// Raw captures of a time fragment, before range checks and am/pm adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFragment {
    /// Hour as written (0-23, or 1-12 when followed by am/pm).
    pub hour: u32,
    /// Minutes, if written.
    pub minutes: Option<u32>,
    /// Seconds, if written.
    pub seconds: Option<u32>,
    /// Trailing am/pm marker.
    pub ampm: Option<Meridiem>,
    /// Set when the fragment came from a bare HHMM run.
    pub is_military: bool,
}

impl TimeFragment {
    /// A time written as `hour[:minutes[:seconds]] [am|pm]`.
    #[must_use]
    pub fn clock(
        hour: u32,
        minutes: Option<u32>,
        seconds: Option<u32>,
        ampm: Option<Meridiem>,
    ) -> Self {
        Self {
            hour,
            minutes,
            seconds,
            ampm,
            is_military: false,
        }
    }

    /// A time written as four digits, e.g. "2130".
    #[must_use]
    pub fn military(hour: u32, minutes: u32) -> Self {
        Self {
            hour,
            minutes: Some(minutes),
            seconds: None,
            ampm: None,
            is_military: true,
        }
    }
}

/// Raw captures of a date fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFragment {
    pub month: u32,
    pub day: u32,
    /// Year as written; two-digit years are corrected during normalization.
    pub year: Option<u32>,
}

/// am/pm marker following a clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Case-insensitive lookup of "am" / "pm".
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("am") {
            Some(Self::Am)
        } else if label.eq_ignore_ascii_case("pm") {
            Some(Self::Pm)
        } else {
            None
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Am => write!(f, "am"),
            Self::Pm => write!(f, "pm"),
        }
    }
}

/// Timezone abbreviations the grammar recognises.
///
/// The label is carried through extraction untouched; no offset is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimezoneLabel {
    PDT,
    PST,
    EDT,
    CDT,
}

impl TimezoneLabel {
    /// Every recognised label, in grammar order.
    pub const ALL: [Self; 4] = [Self::PDT, Self::PST, Self::EDT, Self::CDT];

    /// Case-sensitive lookup of an abbreviation.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tz| tz.as_str() == label)
    }

    /// The abbreviation as written in listings.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PDT => "PDT",
            Self::PST => "PST",
            Self::EDT => "EDT",
            Self::CDT => "CDT",
        }
    }

    /// Fixed UTC offset the abbreviation stands for.
    #[must_use]
    pub fn utc_offset(self) -> FixedOffset {
        let hours = match self {
            Self::PDT => -7,
            Self::PST => -8,
            Self::EDT => -4,
            Self::CDT => -5,
        };
        FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

impl fmt::Display for TimezoneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar or clock field, used to name range violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Year => write!(f, "year"),
            Self::Month => write!(f, "month"),
            Self::Day => write!(f, "day"),
            Self::Hour => write!(f, "hour"),
            Self::Minute => write!(f, "minute"),
            Self::Second => write!(f, "second"),
        }
    }
}

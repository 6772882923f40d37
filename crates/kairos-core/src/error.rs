use thiserror::Error;

use crate::types::{Field, FragmentKind};

/// Errors surfaced to callers of the extraction API.
///
/// Grammar and normalization failures never appear here directly: the
/// orchestrator logs them and reports [`KairosError::ExtractionFailed`].
#[derive(Debug, Error)]
pub enum KairosError {
    /// No extraction stage produced a date-time for the input.
    #[error("could not extract datetime from input: {input:?}")]
    ExtractionFailed {
        /// The input that could not be resolved.
        input: String,
    },

    /// The caller-supplied format override did not match the input.
    #[error("input {input:?} does not match format {format:?}: {source}")]
    Format {
        /// The input that was parsed.
        input: String,
        /// The strftime-style format that was applied.
        format: String,
        /// Underlying chrono parse failure.
        #[source]
        source: chrono::ParseError,
    },

    /// The caller-supplied pattern override failed to compile.
    #[error("regex compilation error: {0}")]
    Regex(#[from] regex::Error),
}

/// The fallback grammar could not tokenize the whole input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The input is empty or contains only whitespace.
    #[error("input is empty or whitespace-only")]
    EmptyInput,

    /// No alternative matches at `position`.
    #[error("no fragment matches at byte {position}: {remainder:?}")]
    NoMatch {
        /// Byte offset of the failing position.
        position: usize,
        /// Unconsumed text starting at `position`.
        remainder: String,
    },

    /// Two typed fragments claim the same longest span.
    #[error("ambiguous span {span:?} at byte {position}: both {first} and {second} match")]
    Ambiguous {
        /// Byte offset of the span.
        position: usize,
        /// The contested text.
        span: String,
        /// First matching fragment type.
        first: FragmentKind,
        /// Second matching fragment type.
        second: FragmentKind,
    },
}

/// Captured fragment fields that cannot form a calendar date-time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    /// A captured field lies outside its valid range.
    #[error("{field} value {value} is out of range {min}..={max}")]
    OutOfRange {
        /// Which field was rejected.
        field: Field,
        /// The offending value (after year/meridiem adjustment).
        value: u32,
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },

    /// A pattern capture for a numeric field is not a number.
    #[error("{field} capture {text:?} is not a number")]
    InvalidCapture {
        /// Which field the capture group names.
        field: Field,
        /// The captured text.
        text: String,
    },

    /// Neither a date nor a time fragment was found.
    #[error("no date or time fragment found")]
    NoFragments,

    /// Fields are individually valid but do not form a real date.
    #[error("invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate {
        /// Resolved year.
        year: i32,
        /// Resolved month.
        month: u32,
        /// Resolved day.
        day: u32,
    },
}

/// The external date parser rejected the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("external parser rejected input {input:?}: {reason}")]
pub struct ExternalParseError {
    /// The rejected input.
    pub input: String,
    /// Parser-specific explanation.
    pub reason: String,
}

/// Why the grammar fallback produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FallbackError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
}

impl FallbackError {
    /// Name of the failing stage, for logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Grammar(_) => "grammar",
            Self::Normalization(_) => "normalization",
        }
    }
}

/// Result type alias for kairos operations.
pub type Result<T> = std::result::Result<T, KairosError>;

//! # Kairos Core
//!
//! The heart of the Kairos extraction engine. Pulls a single calendar
//! date-time out of noisy event-listing text such as
//! `"Thu, 12/02/10 8:00 PM PST"`, completing any field the text leaves out
//! from caller defaults or the current time.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use kairos_core::{Extractor, ExtractorConfig, FieldDefaults};
//!
//! let now = NaiveDate::from_ymd_opt(2026, 10, 19)
//!     .unwrap()
//!     .and_hms_opt(12, 0, 0)
//!     .unwrap();
//!
//! let extractor = Extractor::default();
//! let result = extractor.extract_at("Doors 9:30 Show 11pm", now).unwrap();
//! assert_eq!(result.value.as_iso(), Some("2026-10-19T09:30:00"));
//!
//! let config = ExtractorConfig::new().with_defaults(FieldDefaults::new().with_year(1999));
//! let extractor = Extractor::new(config).unwrap();
//! let result = extractor.extract_at("10.21 Show 11:00 PM", now).unwrap();
//! assert_eq!(result.value.as_iso(), Some("1999-10-21T23:00:00"));
//! ```
pub mod error;
pub mod parser;
pub mod types;

// Re-export primary API
pub use error::{
    ExternalParseError, FallbackError, GrammarError, KairosError, NormalizationError, Result,
};
pub use parser::{
    ExternalParser, Extractor, ExtractorConfig, FormatListParser, Grammar, extract, extract_with,
};
pub use types::{
    CompletionContext, ExtractedValue, Extraction, ExtractionSource, FieldDefaults, OutputMode,
    ResolvedDateTime, TimezoneLabel,
};

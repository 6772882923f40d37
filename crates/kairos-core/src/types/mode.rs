use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape of the value handed back by the extractor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputMode {
    /// ISO-8601 string without offset, e.g. `2010-12-02T20:00:00`.
    #[default]
    Iso,
    /// Structured [`ResolvedDateTime`](super::ResolvedDateTime).
    Structured,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iso => write!(f, "iso"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

/// Which extraction stage produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractionSource {
    /// Caller-supplied strftime format.
    Format,
    /// Caller-supplied regex with named captures.
    Pattern,
    /// The general-purpose external parser.
    External,
    /// Fallback grammar plus field completion.
    Grammar,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format => write!(f, "format"),
            Self::Pattern => write!(f, "pattern"),
            Self::External => write!(f, "external"),
            Self::Grammar => write!(f, "grammar"),
        }
    }
}

pub mod context;
pub mod fragment;
pub mod mode;
pub mod result;

pub use context::{CompletionContext, FieldDefaults};
pub use fragment::{
    DateFragment, Field, Fragment, FragmentKind, Meridiem, TimeFragment, TimezoneLabel,
};
pub use mode::{ExtractionSource, OutputMode};
pub use result::{ExtractedValue, Extraction, ISO_FORMAT, ResolvedDateTime};

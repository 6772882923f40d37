//! # Kairos
//!
//! Pull concrete date-times out of noisy event listings.
//!
//! This crate re-exports [`kairos_core`]; see its documentation for the
//! extraction pipeline.
//!
//! ```rust
//! let result = kairos::extract("10/24/2010 21:30").unwrap();
//! assert_eq!(result.value.as_iso(), Some("2010-10-24T21:30:00"));
//! ```
pub use kairos_core::*;

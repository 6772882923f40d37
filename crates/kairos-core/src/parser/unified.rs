//! # Unified Extraction Interface
//!
//! Provides a single entry point for pulling a date-time out of a listing,
//! trying each configured stage in turn and reporting one terminal failure.

use chrono::format::{ParseErrorKind, Parsed, StrftimeItems};
use chrono::{Local, NaiveDateTime};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{FallbackError, KairosError, Result};
use crate::parser::external::{ExternalParser, FormatListParser};
use crate::parser::grammar::Grammar;
use crate::parser::heuristic::complete;
use crate::parser::normalizer::{NormalizedDate, NormalizedFragments, NormalizedTime, normalize};
use crate::types::{
    CompletionContext, Extraction, ExtractionSource, FieldDefaults, OutputMode, ResolvedDateTime,
};

/// Configuration for the extractor.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Shape of the returned value
    pub output: OutputMode,
    /// Values for fields the input does not mention
    pub defaults: FieldDefaults,
    /// strftime-style format that replaces every other stage
    pub format: Option<String>,
    /// Regex with named captures that replaces the external parser and grammar
    pub pattern: Option<String>,
    /// Whether to try the external parser before the grammar
    pub enable_external: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            output: OutputMode::Iso,
            defaults: FieldDefaults::default(),
            format: None,
            pattern: None,
            enable_external: true,
        }
    }
}

impl ExtractorConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output mode.
    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Set the caller defaults used during field completion.
    pub fn with_defaults(mut self, defaults: FieldDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Parse with this exact format instead of any heuristics.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Match this regex instead of the external parser and grammar.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Enable or disable the external parser.
    pub fn with_external(mut self, enabled: bool) -> Self {
        self.enable_external = enabled;
        self
    }
}

/// Extracts date-times from noisy listings.
///
/// Stages, in order:
/// 1. a format override, when configured (failure is returned as-is);
/// 2. a pattern override, when configured (no match means no result);
/// 3. the external parser, trusted on success;
/// 4. the fallback grammar with field completion.
///
/// The extractor holds no per-call state and can be shared between threads.
pub struct Extractor {
    config: ExtractorConfig,
    grammar: Grammar,
    pattern: Option<Regex>,
    external: Option<Box<dyn ExternalParser>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            config: ExtractorConfig::default(),
            grammar: Grammar::new(),
            pattern: None,
            external: Some(Box::new(FormatListParser::new())),
        }
    }
}

impl Extractor {
    /// Create a new extractor with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`KairosError::Regex`] if the pattern override does not compile.
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let pattern = config.pattern.as_deref().map(Regex::new).transpose()?;
        let external: Option<Box<dyn ExternalParser>> = if config.enable_external {
            Some(Box::new(FormatListParser::new()))
        } else {
            None
        };

        Ok(Self {
            config,
            grammar: Grammar::new(),
            pattern,
            external,
        })
    }

    /// Replace the external parser. Ignored when the configuration disables
    /// the external stage.
    pub fn with_external_parser(mut self, parser: impl ExternalParser + 'static) -> Self {
        if self.config.enable_external {
            self.external = Some(Box::new(parser));
        }
        self
    }

    /// Extract a date-time from `input`, completing missing fields from the
    /// current local time.
    ///
    /// # Examples
    /// ```
    /// use kairos_core::parser::Extractor;
    ///
    /// let extractor = Extractor::default();
    /// let result = extractor.extract("Thu, 12/02/10 8:00 PM PST").unwrap();
    ///
    /// assert_eq!(result.value.as_iso(), Some("2010-12-02T20:00:00"));
    /// ```
    pub fn extract(&self, input: &str) -> Result<Extraction> {
        self.extract_at(input, Local::now().naive_local())
    }

    /// Extract a date-time from `input`, completing missing fields from `now`.
    ///
    /// # Errors
    ///
    /// Returns [`KairosError::Format`] if a format override is configured and
    /// does not match, and [`KairosError::ExtractionFailed`] if no stage
    /// produced a date-time.
    pub fn extract_at(&self, input: &str, now: NaiveDateTime) -> Result<Extraction> {
        let context = CompletionContext::new(now).with_defaults(self.config.defaults);

        if let Some(ref format) = self.config.format {
            return self.extract_format(input, format, &context);
        }

        if let Some(ref pattern) = self.pattern {
            return self.extract_pattern(input, pattern, &context);
        }

        if let Some(ref external) = self.external {
            match external.parse(input) {
                Ok(dt) => {
                    debug!(input, "external parser resolved input");
                    return Ok(self.finish(input, dt.into(), ExtractionSource::External));
                }
                Err(err) => {
                    debug!(input, error = %err, "external parser failed, trying grammar");
                }
            }
        }

        match self.fallback(input, &context) {
            Ok((datetime, fragments)) => Ok(self
                .finish(input, datetime, ExtractionSource::Grammar)
                .with_timezone(fragments.timezone)),
            Err(err) => {
                warn!(input, stage = err.stage(), error = %err, "could not derive datetime");
                Err(failed(input))
            }
        }
    }

    /// Run the fallback grammar, normalizer and completion heuristic.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure.
    pub fn fallback(
        &self,
        input: &str,
        context: &CompletionContext,
    ) -> std::result::Result<(ResolvedDateTime, NormalizedFragments), FallbackError> {
        let tokens = self.grammar.tokenize(input)?;
        for token in &tokens {
            debug!(kind = %token.fragment.kind(), text = token.text(input), "grammar token");
        }
        let fragments = normalize(&tokens)?;
        let datetime = complete(&fragments, context)?;
        Ok((datetime, fragments))
    }

    /// Check if an external parser is configured.
    pub fn has_external(&self) -> bool {
        self.external.is_some()
    }

    /// Get the extractor configuration.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn extract_format(
        &self,
        input: &str,
        format: &str,
        context: &CompletionContext,
    ) -> Result<Extraction> {
        let mut parsed = Parsed::new();
        chrono::format::parse(&mut parsed, input, StrftimeItems::new(format))
            .map_err(|source| format_error(input, format, source))?;

        let datetime = match parsed.to_naive_datetime_with_offset(0) {
            Ok(dt) => ResolvedDateTime::from(dt),
            Err(err) if err.kind() == ParseErrorKind::NotEnough => {
                let fragments = format_fragments(&parsed, &context.defaults);
                complete(&fragments, context).map_err(|err| {
                    warn!(input, stage = "format", error = %err, "could not derive datetime");
                    failed(input)
                })?
            }
            Err(source) => return Err(format_error(input, format, source)),
        };

        Ok(self.finish(input, datetime, ExtractionSource::Format))
    }

    fn extract_pattern(
        &self,
        input: &str,
        pattern: &Regex,
        context: &CompletionContext,
    ) -> Result<Extraction> {
        let Some(caps) = pattern.captures(input) else {
            warn!(input, pattern = pattern.as_str(), "pattern did not match");
            return Err(failed(input));
        };

        let resolved = NormalizedFragments::from_captures(&caps)
            .and_then(|fragments| Ok((complete(&fragments, context)?, fragments)));
        match resolved {
            Ok((datetime, fragments)) => Ok(self
                .finish(input, datetime, ExtractionSource::Pattern)
                .with_timezone(fragments.timezone)),
            Err(err) => {
                warn!(input, stage = "pattern", error = %err, "could not derive datetime");
                Err(failed(input))
            }
        }
    }

    fn finish(
        &self,
        input: &str,
        datetime: ResolvedDateTime,
        source: ExtractionSource,
    ) -> Extraction {
        Extraction::new(input, datetime, self.config.output, source)
    }
}

/// Fields a partial format left out are completed like grammar fragments:
/// date fields from defaults then `now`, clock fields from defaults then zero.
fn format_fragments(parsed: &Parsed, defaults: &FieldDefaults) -> NormalizedFragments {
    let year = parsed.year().or_else(|| {
        parsed.year_mod_100().map(|y| {
            let y = y as i32;
            if y < 69 { 2000 + y } else { 1900 + y }
        })
    });
    let (month, day) = (parsed.month(), parsed.day());
    let date = (year.is_some() || month.is_some() || day.is_some())
        .then_some(NormalizedDate { year, month, day });

    let hour = match (parsed.hour_div_12(), parsed.hour_mod_12()) {
        (Some(div), Some(rem)) => Some(div * 12 + rem),
        (None, Some(rem)) => Some(rem),
        (_, None) => None,
    };
    let time = match hour {
        Some(hour) => NormalizedTime {
            hour,
            minute: parsed.minute().unwrap_or(0),
            second: parsed.second().unwrap_or(0),
        },
        None => NormalizedTime {
            hour: defaults.hour.unwrap_or(0),
            minute: defaults.minute.unwrap_or(0),
            second: defaults.second.unwrap_or(0),
        },
    };

    NormalizedFragments {
        date,
        time: Some(time),
        timezone: None,
    }
}

fn format_error(input: &str, format: &str, source: chrono::ParseError) -> KairosError {
    KairosError::Format {
        input: input.to_string(),
        format: format.to_string(),
        source,
    }
}

fn failed(input: &str) -> KairosError {
    KairosError::ExtractionFailed {
        input: input.to_string(),
    }
}

/// Convenience function to extract a date-time with default settings.
pub fn extract(input: &str) -> Result<Extraction> {
    Extractor::default().extract(input)
}

/// Extract with a specific configuration.
pub fn extract_with(input: &str, config: ExtractorConfig) -> Result<Extraction> {
    Extractor::new(config)?.extract(input)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate};

    use super::*;
    use crate::error::ExternalParseError;
    use crate::types::TimezoneLabel;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap()
    }

    fn iso(extractor: &Extractor, input: &str) -> String {
        extractor
            .extract_at(input, now())
            .unwrap()
            .value
            .to_string()
    }

    #[test]
    fn test_extractor_config() {
        let config = ExtractorConfig::new()
            .with_output(OutputMode::Structured)
            .with_defaults(FieldDefaults::new().with_year(1999))
            .with_external(false);

        assert_eq!(config.output, OutputMode::Structured);
        assert_eq!(config.defaults.year, Some(1999));
        assert!(!config.enable_external);
        assert!(config.format.is_none());
    }

    #[test]
    fn test_grammar_fallback() {
        let extractor = Extractor::default();
        let result = extractor
            .extract_at("Thu, 12/02/10 8:00 PM PST", now())
            .unwrap();

        assert_eq!(result.value.as_iso(), Some("2010-12-02T20:00:00"));
        assert_eq!(result.timezone, Some(TimezoneLabel::PST));
        assert_eq!(result.source, ExtractionSource::Grammar);
    }

    #[test]
    fn test_external_first() {
        let extractor = Extractor::default();
        let result = extractor.extract_at("Oct 29, 2010, 9:00 PM", now()).unwrap();
        assert_eq!(result.value.as_iso(), Some("2010-10-29T21:00:00"));
        assert_eq!(result.source, ExtractionSource::External);
    }

    #[test]
    fn test_external_result_is_trusted() {
        let fixed = |_: &str| -> std::result::Result<NaiveDateTime, ExternalParseError> {
            Ok(NaiveDate::from_ymd_opt(1985, 3, 15)
                .unwrap()
                .and_hms_milli_opt(10, 0, 0, 500)
                .unwrap())
        };
        let extractor = Extractor::default().with_external_parser(fixed);
        assert_eq!(iso(&extractor, "Thu, 12/02/10 8:00 PM"), "1985-03-15T10:00:00");
    }

    #[test]
    fn test_external_disabled() {
        let extractor = Extractor::new(ExtractorConfig::new().with_external(false)).unwrap();
        assert!(!extractor.has_external());

        // Without the external parser the month name is noise and "2010," too.
        let result = extractor.extract_at("Oct 29, 2010, 9:00 PM", now()).unwrap();
        assert_eq!(result.value.as_iso(), Some("2026-10-19T21:00:00"));
        assert_eq!(result.source, ExtractionSource::Grammar);
    }

    #[test]
    fn test_structured_output() {
        let config = ExtractorConfig::new().with_output(OutputMode::Structured);
        let extractor = Extractor::new(config).unwrap();
        let result = extractor.extract_at("10/24/2010 21:30", now()).unwrap();

        let dt = result.value.as_datetime().unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2010, 10, 24));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (21, 30, 0));
        assert_eq!(dt.naive().year(), 2010);
    }

    #[test]
    fn test_defaults_feed_completion() {
        let config = ExtractorConfig::new().with_defaults(FieldDefaults::new().with_year(1999));
        let extractor = Extractor::new(config).unwrap();
        assert_eq!(iso(&extractor, "10.21 Show 11:00 PM"), "1999-10-21T23:00:00");
        assert_eq!(iso(&extractor, "10.21.2010 Show 11:00 PM"), "2010-10-21T23:00:00");
    }

    #[test]
    fn test_noise_fails() {
        let extractor = Extractor::default();
        let err = extractor.extract_at("Doors open early", now()).unwrap_err();
        assert!(matches!(
            err,
            KairosError::ExtractionFailed { ref input } if input == "Doors open early"
        ));
    }

    #[test]
    fn test_grammar_failure_is_extraction_failure() {
        let extractor = Extractor::default();
        assert!(matches!(
            extractor.extract_at("Doors @ 8pm!", now()),
            Err(KairosError::ExtractionFailed { .. })
        ));
        assert!(matches!(
            extractor.extract_at("", now()),
            Err(KairosError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_impossible_date_is_extraction_failure() {
        let extractor = Extractor::default();
        assert!(matches!(
            extractor.extract_at("2/31/11 8pm", now()),
            Err(KairosError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_format_override() {
        let config = ExtractorConfig::new().with_format("%d.%m.%Y %H:%M");
        let extractor = Extractor::new(config).unwrap();
        let result = extractor.extract_at("24.10.2010 21:30", now()).unwrap();
        assert_eq!(result.value.as_iso(), Some("2010-10-24T21:30:00"));
        assert_eq!(result.source, ExtractionSource::Format);
    }

    #[test]
    fn test_format_override_date_only() {
        let config = ExtractorConfig::new().with_format("%d.%m.%Y");
        let extractor = Extractor::new(config).unwrap();
        assert_eq!(iso(&extractor, "24.10.2010"), "2010-10-24T00:00:00");
    }

    #[test]
    fn test_format_override_without_year() {
        let config = ExtractorConfig::new().with_format("%d.%m %H:%M");
        let extractor = Extractor::new(config).unwrap();
        let result = extractor.extract_at("24.10 21:30", now()).unwrap();
        assert_eq!(result.value.as_iso(), Some("2026-10-24T21:30:00"));
        assert_eq!(result.source, ExtractionSource::Format);

        let config = ExtractorConfig::new()
            .with_format("%d.%m %I:%M %p")
            .with_defaults(FieldDefaults::new().with_year(1999));
        let extractor = Extractor::new(config).unwrap();
        assert_eq!(iso(&extractor, "24.10 9:30 PM"), "1999-10-24T21:30:00");
    }

    #[test]
    fn test_format_override_time_only() {
        let config = ExtractorConfig::new().with_format("%H:%M");
        let extractor = Extractor::new(config).unwrap();
        assert_eq!(iso(&extractor, "21:30"), "2026-10-19T21:30:00");
        assert!(matches!(
            extractor.extract_at("9pm", now()),
            Err(KairosError::Format { .. })
        ));
    }

    #[test]
    fn test_format_override_date_only_uses_clock_defaults() {
        let config = ExtractorConfig::new()
            .with_format("%d.%m.%Y")
            .with_defaults(FieldDefaults::new().with_hour(19));
        let extractor = Extractor::new(config).unwrap();
        assert_eq!(iso(&extractor, "24.10.2010"), "2010-10-24T19:00:00");
    }

    #[test]
    fn test_format_override_failure_is_fatal() {
        let config = ExtractorConfig::new().with_format("%d.%m.%Y %H:%M");
        let extractor = Extractor::new(config).unwrap();
        let err = extractor
            .extract_at("Thu, 12/02/10 8:00 PM", now())
            .unwrap_err();
        assert!(matches!(err, KairosError::Format { ref format, .. } if format == "%d.%m.%Y %H:%M"));
    }

    #[test]
    fn test_pattern_override() {
        let config = ExtractorConfig::new()
            .with_pattern(r"(?P<day>\d{1,2})-(?P<month>\d{1,2}) at (?P<hour>\d{1,2})h(?P<minute>\d{2})");
        let extractor = Extractor::new(config).unwrap();
        let result = extractor.extract_at("Concert 24-10 at 21h30", now()).unwrap();
        assert_eq!(result.value.as_iso(), Some("2026-10-24T21:30:00"));
        assert_eq!(result.source, ExtractionSource::Pattern);
    }

    #[test]
    fn test_pattern_no_match_does_not_fall_back() {
        let config = ExtractorConfig::new().with_pattern(r"(?P<hour>\d{1,2})h");
        let extractor = Extractor::new(config).unwrap();
        // The grammar alone would resolve this input.
        assert!(matches!(
            extractor.extract_at("Thu, 12/02/10 8:00 PM", now()),
            Err(KairosError::ExtractionFailed { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = ExtractorConfig::new().with_pattern("(?P<hour>");
        assert!(matches!(Extractor::new(config), Err(KairosError::Regex(_))));
    }

    #[test]
    fn test_fallback_reports_stage() {
        let extractor = Extractor::default();
        let ctx = CompletionContext::new(now());

        let err = extractor.fallback("Doors @ 8pm", &ctx).unwrap_err();
        assert_eq!(err.stage(), "grammar");

        let err = extractor.fallback("Show 25:00", &ctx).unwrap_err();
        assert_eq!(err.stage(), "normalization");
    }

    #[test]
    fn test_extractor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Extractor>();
    }

    #[test]
    fn test_extract_convenience_function() {
        let result = extract("10/24/2010 21:30").unwrap();
        assert_eq!(result.value.as_iso(), Some("2010-10-24T21:30:00"));

        let result = extract_with(
            "10/24/2010 21:30",
            ExtractorConfig::new().with_output(OutputMode::Structured),
        )
        .unwrap();
        assert!(result.value.as_datetime().is_some());
    }
}

//! Kairos Command-Line Extractor
//!
//! Reads event listings from arguments or stdin and prints one JSON object
//! per listing with the extracted date-time.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use kairos_core::types::ISO_FORMAT;
use kairos_core::{
    ExtractedValue, Extraction, Extractor, ExtractorConfig, FieldDefaults, OutputMode,
};
use serde::Serialize;
use tracing::{Level, debug, info};

/// CLI arguments
#[derive(Parser)]
#[command(name = "kairos-parse")]
#[command(about = "Extract date-times from noisy event listings")]
#[command(version)]
struct Cli {
    /// Listings to parse; read one per line from stdin when omitted
    inputs: Vec<String>,

    /// Exact strftime format to parse with, bypassing all heuristics
    #[arg(short, long, env = "KAIROS_FORMAT")]
    format: Option<String>,

    /// Regex with named groups (year, month, day, hour, minute, second, ampm, tz)
    #[arg(short, long, env = "KAIROS_PATTERN", conflicts_with = "format")]
    pattern: Option<String>,

    /// Print date-time fields instead of an ISO string
    #[arg(short, long, env = "KAIROS_STRUCTURED", value_parser = FalseyValueParser::new())]
    structured: bool,

    /// Skip the general-purpose parser and go straight to the listing grammar
    #[arg(long, env = "KAIROS_NO_EXTERNAL", value_parser = FalseyValueParser::new())]
    no_external: bool,

    /// Reference time for missing fields, e.g. 2010-10-01T12:00:00
    #[arg(long, env = "KAIROS_NOW", value_parser = parse_now)]
    now: Option<NaiveDateTime>,

    /// Default year
    #[arg(long, env = "KAIROS_YEAR")]
    year: Option<i32>,

    /// Default month
    #[arg(long, env = "KAIROS_MONTH")]
    month: Option<u32>,

    /// Default day of month
    #[arg(long, env = "KAIROS_DAY")]
    day: Option<u32>,

    /// Default hour
    #[arg(long, env = "KAIROS_HOUR")]
    hour: Option<u32>,

    /// Default minute
    #[arg(long, env = "KAIROS_MINUTE")]
    minute: Option<u32>,

    /// Default second
    #[arg(long, env = "KAIROS_SECOND")]
    second: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn defaults(&self) -> FieldDefaults {
        FieldDefaults {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
        }
    }

    fn config(&self) -> ExtractorConfig {
        let mut config = ExtractorConfig::new()
            .with_defaults(self.defaults())
            .with_external(!self.no_external);
        if self.structured {
            config = config.with_output(OutputMode::Structured);
        }
        if let Some(ref format) = self.format {
            config = config.with_format(format.clone());
        }
        if let Some(ref pattern) = self.pattern {
            config = config.with_pattern(pattern.clone());
        }
        config
    }
}

fn parse_now(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, ISO_FORMAT)
}

/// Date-time as printed in the JSON output.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum DateTimeOutput {
    Iso(String),
    Fields {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    },
}

impl From<&ExtractedValue> for DateTimeOutput {
    fn from(value: &ExtractedValue) -> Self {
        match value {
            ExtractedValue::Iso(s) => Self::Iso(s.clone()),
            ExtractedValue::DateTime(dt) => Self::Fields {
                year: dt.year(),
                month: dt.month(),
                day: dt.day(),
                hour: dt.hour(),
                minute: dt.minute(),
                second: dt.second(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ExtractOutput {
    input: String,
    datetime: Option<DateTimeOutput>,
    timezone: Option<String>,
    utc_offset: Option<String>,
    source: Option<String>,
    error: Option<String>,
}

impl From<Extraction> for ExtractOutput {
    fn from(extraction: Extraction) -> Self {
        Self {
            datetime: Some(DateTimeOutput::from(&extraction.value)),
            timezone: extraction.timezone.map(|tz| tz.to_string()),
            utc_offset: extraction.timezone.map(|tz| tz.utc_offset().to_string()),
            source: Some(extraction.source.to_string()),
            error: None,
            input: extraction.input,
        }
    }
}

impl ExtractOutput {
    fn failed(input: &str, error: &kairos_core::KairosError) -> Self {
        Self {
            input: input.to_string(),
            datetime: None,
            timezone: None,
            utc_offset: None,
            source: None,
            error: Some(error.to_string()),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run_line(
    extractor: &Extractor,
    now: Option<NaiveDateTime>,
    line: &str,
    out: &mut impl Write,
) -> Result<()> {
    let result = match now {
        Some(now) => extractor.extract_at(line, now),
        None => extractor.extract(line),
    };
    let output = match result {
        Ok(extraction) => {
            debug!(input = line, source = %extraction.source, "extracted");
            ExtractOutput::from(extraction)
        }
        Err(err) => ExtractOutput::failed(line, &err),
    };

    serde_json::to_writer(&mut *out, &output).context("failed to serialize output")?;
    writeln!(out)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let extractor = Extractor::new(cli.config()).context("invalid extractor configuration")?;
    info!(
        external = extractor.has_external(),
        format = ?extractor.config().format,
        "extractor ready"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !cli.inputs.is_empty() {
        for input in &cli.inputs {
            run_line(&extractor, cli.now, input, &mut out)?;
        }
        return Ok(());
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        run_line(&extractor, cli.now, line, &mut out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use serde_json::Value;

    use super::*;

    /// Serializes argument parsing, which reads `KAIROS_*` variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn try_parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("kairos-parse").chain(args.iter().copied()))
    }

    fn parse(args: &[&str]) -> Cli {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        try_parse(args).unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap()
    }

    fn run(extractor: &Extractor, line: &str) -> Value {
        let mut out = Vec::new();
        run_line(extractor, Some(now()), line, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        serde_json::from_str(text.trim_end()).unwrap()
    }

    #[test]
    fn test_cli_builds_config() {
        let cli = parse(&[
            "--year",
            "1999",
            "--hour",
            "19",
            "--structured",
            "--no-external",
            "--pattern",
            r"(?P<hour>\d+)h",
        ]);
        let config = cli.config();

        assert_eq!(config.defaults, FieldDefaults::new().with_year(1999).with_hour(19));
        assert_eq!(config.output, OutputMode::Structured);
        assert!(!config.enable_external);
        assert_eq!(config.pattern.as_deref(), Some(r"(?P<hour>\d+)h"));
        assert!(config.format.is_none());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&["8pm", "10/24/2010 21:30"]);
        let config = cli.config();

        assert_eq!(cli.inputs, ["8pm", "10/24/2010 21:30"]);
        assert_eq!(config.output, OutputMode::Iso);
        assert!(config.enable_external);
        assert!(config.defaults.is_empty());
        assert_eq!(cli.now, None);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_now_and_verbosity() {
        let cli = parse(&["--now", "2026-10-19T14:05:09", "-vv", "-f", "%H:%M"]);
        assert_eq!(cli.now, Some(now()));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config().format.as_deref(), Some("%H:%M"));
    }

    #[test]
    fn test_cli_rejects_bad_arguments() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(try_parse(&["--now", "2026-10-19"]).is_err());
        assert!(try_parse(&["--format", "%H", "--pattern", "h"]).is_err());
        assert!(try_parse(&["--month", "ten"]).is_err());
    }

    #[test]
    fn test_boolean_env_accepts_numbers() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: every test that reads the environment holds ENV_LOCK.
        unsafe {
            std::env::set_var("KAIROS_STRUCTURED", "1");
            std::env::set_var("KAIROS_NO_EXTERNAL", "0");
        }
        let cli = try_parse(&[]);
        unsafe {
            std::env::remove_var("KAIROS_STRUCTURED");
            std::env::remove_var("KAIROS_NO_EXTERNAL");
        }

        let cli = cli.unwrap();
        assert!(cli.structured);
        assert!(!cli.no_external);
    }

    #[test]
    fn test_run_line_grammar_output() {
        let json = run(&Extractor::default(), "Thu, 12/02/10 8:00 PM PST");

        assert_eq!(json["input"], "Thu, 12/02/10 8:00 PM PST");
        assert_eq!(json["datetime"], "2010-12-02T20:00:00");
        assert_eq!(json["timezone"], "PST");
        assert_eq!(json["utc_offset"], "-08:00");
        assert_eq!(json["source"], "grammar");
        assert!(json["error"].is_null());
    }

    #[test]
    fn test_run_line_completes_from_now() {
        let json = run(&Extractor::default(), "8pm");
        assert_eq!(json["datetime"], "2026-10-19T20:00:00");
        assert!(json["timezone"].is_null());
        assert!(json["utc_offset"].is_null());
    }

    #[test]
    fn test_run_line_structured_output() {
        let config = ExtractorConfig::new().with_output(OutputMode::Structured);
        let json = run(&Extractor::new(config).unwrap(), "10/24/2010 21:30");

        let datetime = &json["datetime"];
        assert_eq!(datetime["year"], 2010);
        assert_eq!(datetime["month"], 10);
        assert_eq!(datetime["day"], 24);
        assert_eq!(datetime["hour"], 21);
        assert_eq!(datetime["minute"], 30);
        assert_eq!(datetime["second"], 0);
    }

    #[test]
    fn test_run_line_failure() {
        let json = run(&Extractor::default(), "Doors open early");

        assert_eq!(json["input"], "Doors open early");
        assert!(json["datetime"].is_null());
        assert!(json["source"].is_null());
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .starts_with("could not extract datetime")
        );
    }
}

/// Output formatting: JSON, compact, and table modes. Console sink and progress.
use std::fmt;
use std::io::{self, IsTerminal, Write};

use comfy_table::{Table, presets::UTF8_BORDERS_ONLY};
use crossterm::style::{Attribute, Color, Stylize};
use serde::Serialize;
use serde_json::Value;

use super::args::OutputFormat;
use crate::credentials::{Configuration, mask_api_key};
use crate::types::{BatchResult, BulkResponse, EmailResult, ErrorOutput, JobDescriptor};
use crate::validation::CommandError;

/// Largest invalid set that is itemized under a bulk summary.
pub const MAX_LISTED_INVALID: usize = 10;

const RULE_WIDTH: usize = 40;

/// Conditional ANSI styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// Colors on only when stdout is a terminal and `NO_COLOR` is unset.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            enabled: io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// A palette that never emits escape codes.
    #[must_use]
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    #[must_use]
    pub fn paint(self, text: &str, color: Color) -> String {
        if self.enabled {
            text.with(color).to_string()
        } else {
            text.to_owned()
        }
    }

    #[must_use]
    pub fn bold(self, text: &str) -> String {
        if self.enabled {
            text.attribute(Attribute::Bold).to_string()
        } else {
            text.to_owned()
        }
    }
}

/// Where command output goes: `out` for results, `err` for diagnostics.
///
/// Also drives the in-progress indicator on `err`, which stays silent when
/// quiet is set.
pub struct Console<O: Write, E: Write> {
    pub out: O,
    pub err: E,
    pub palette: Palette,
    /// Redraw the indicator in place (stderr is interactive).
    live: bool,
    quiet: bool,
    pending: bool,
}

impl Console<io::Stdout, io::Stderr> {
    /// Console over the process streams.
    #[must_use]
    pub fn stdio() -> Self {
        let live = io::stderr().is_terminal();
        let mut console = Console::new(io::stdout(), io::stderr(), Palette::detect());
        console.live = live;
        console
    }
}

impl<O: Write, E: Write> Console<O, E> {
    #[must_use]
    pub fn new(out: O, err: E, palette: Palette) -> Self {
        Self {
            out,
            err,
            palette,
            live: false,
            quiet: false,
            pending: false,
        }
    }

    /// Silence the indicator. Handlers set this from their settings before
    /// reporting anything.
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    /// Show an in-progress line. Only drawn on an interactive stderr.
    pub fn start(&mut self, message: &str) {
        if self.quiet {
            return;
        }
        self.pending = true;
        if self.live {
            let mark = self.palette.paint("⠋", Color::Cyan);
            self.status(format_args!("{mark} {message}"));
        }
    }

    /// Finish the indicator with a success mark.
    pub fn succeed(&mut self, message: &str) {
        self.settle("✔", Color::Green, message);
    }

    /// Finish the indicator with a failure mark.
    pub fn fail(&mut self, message: &str) {
        self.settle("✖", Color::Red, message);
    }

    /// Print a warning through the indicator.
    pub fn warn(&mut self, message: &str) {
        self.settle("⚠", Color::Yellow, message);
    }

    fn settle(&mut self, symbol: &str, color: Color, message: &str) {
        if self.quiet {
            return;
        }
        if self.live && self.pending {
            self.status(format_args!("\r\x1b[2K"));
        }
        self.pending = false;
        let mark = self.palette.paint(symbol, color);
        self.status(format_args!("{mark} {message}\n"));
    }

    /// Progress output is cosmetic; a closed or full stderr must not fail
    /// the command, so write errors stop here.
    fn status(&mut self, text: fmt::Arguments<'_>) {
        let _ = self.err.write_fmt(text);
        let _ = self.err.flush();
    }
}

// --- Single result ---

/// Write a single-address result.
///
/// `json` prints the full result regardless of `quiet`; `compact` or
/// `quiet` print just `valid`/`invalid`; `table` prints the full report.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_email_result<W: Write>(
    out: &mut W,
    palette: Palette,
    result: &EmailResult,
    format: OutputFormat,
    quiet: bool,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, result);
    }
    if format == OutputFormat::Compact || quiet {
        let token = if result.is_valid() { "valid" } else { "invalid" };
        return writeln!(out, "{token}");
    }

    writeln!(out)?;
    writeln!(out, "{}", palette.bold("Email Validation Result"))?;
    writeln!(out, "{}", palette.paint(&"─".repeat(RULE_WIDTH), Color::Grey))?;
    writeln!(
        out,
        "Email: {}",
        palette.paint(result.email().unwrap_or("-"), Color::Cyan)
    )?;
    let valid = if result.is_valid() {
        palette.paint("✓ Yes", Color::Green)
    } else {
        palette.paint("✗ No", Color::Red)
    };
    writeln!(out, "Valid: {valid}")?;
    writeln!(out, "Risk: {}", format_risk(palette, result.risk()))?;

    if let Some(checks) = result.checks().filter(|c| !c.is_empty()) {
        writeln!(out)?;
        writeln!(out, "{}", palette.bold("Validation Checks:"))?;
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(["CHECK", "RESULT"]);
        for (key, value) in checks {
            table.add_row([humanize_key(key), display_value(value)]);
        }
        writeln!(out, "{table}")?;
    }

    if let Some(debug) = result.debug() {
        writeln!(out)?;
        writeln!(out, "{}", palette.bold("Debug Information:"))?;
        let pretty = serde_json::to_string_pretty(debug).map_err(io::Error::other)?;
        writeln!(out, "{}", palette.paint(&pretty, Color::Grey))?;
    }

    Ok(())
}

// --- Bulk result ---

/// Write a bulk response: job descriptor or synchronous summary.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_bulk_result<W: Write>(
    out: &mut W,
    palette: Palette,
    result: &BulkResponse,
    format: OutputFormat,
    quiet: bool,
) -> io::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, result);
    }

    match result {
        BulkResponse::Job(job) => write_job(out, palette, job),
        BulkResponse::Batch(batch) => {
            if !quiet {
                write_batch_summary(out, palette, batch)?;
            }
            write_invalid_list(out, palette, batch.results(), quiet)
        }
        BulkResponse::Listing(_) | BulkResponse::Bare(_) => {
            write_invalid_list(out, palette, result.results(), quiet)
        }
    }
}

fn write_job<W: Write>(out: &mut W, palette: Palette, job: &JobDescriptor) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", palette.bold("Async Batch Job Created"))?;
    writeln!(out, "Job ID: {}", palette.paint(job.job_id(), Color::Cyan))?;
    let status = job.status().unwrap_or("unknown");
    writeln!(out, "Status: {}", palette.paint(status, Color::Yellow))?;
    if let Some(webhook) = job.webhook_url() {
        writeln!(out, "Webhook: {}", palette.paint(webhook, Color::Grey))?;
    }
    Ok(())
}

fn write_batch_summary<W: Write>(out: &mut W, palette: Palette, batch: &BatchResult) -> io::Result<()> {
    let count = |key: &str| batch.summary(key).map_or_else(|| "0".to_owned(), display_value);
    writeln!(out)?;
    writeln!(out, "{}", palette.bold("Bulk Validation Summary"))?;
    writeln!(out, "{}", palette.paint(&"─".repeat(RULE_WIDTH), Color::Grey))?;
    writeln!(out, "Total: {}", count("total"))?;
    writeln!(out, "Valid: {}", palette.paint(&count("valid"), Color::Green))?;
    writeln!(out, "Invalid: {}", palette.paint(&count("invalid"), Color::Red))?;
    let elapsed = batch
        .field("processing_time_ms")
        .map_or_else(|| "0".to_owned(), display_value);
    writeln!(out, "Processing Time: {}", palette.paint(&format!("{elapsed}ms"), Color::Grey))?;

    if let Some(from_pool) = batch.field("from_pool") {
        let contributed = batch
            .field("contributed")
            .map_or_else(|| "0".to_owned(), display_value);
        let confidence = batch
            .field("pool_confidence")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        writeln!(out)?;
        writeln!(out, "{}", palette.bold("Agent Signal Pool Stats"))?;
        writeln!(
            out,
            "Used from pool: {}",
            palette.paint(&display_value(from_pool), Color::Cyan)
        )?;
        writeln!(out, "Contributed: {}", palette.paint(&contributed, Color::Cyan))?;
        writeln!(
            out,
            "Pool confidence: {}",
            palette.paint(&format_percent(confidence), Color::Cyan)
        )?;
    }
    Ok(())
}

/// Itemize invalid addresses when there are 1..=[`MAX_LISTED_INVALID`] of them.
fn write_invalid_list<W: Write>(
    out: &mut W,
    palette: Palette,
    results: &[EmailResult],
    quiet: bool,
) -> io::Result<()> {
    let invalid: Vec<&EmailResult> = results.iter().filter(|r| !r.is_valid()).collect();
    if quiet || invalid.is_empty() || invalid.len() > MAX_LISTED_INVALID {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "{}", palette.bold("Invalid Emails:"))?;
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(["", "EMAIL", "RISK"]);
    for r in invalid {
        table.add_row(["✗", r.email().unwrap_or("-"), r.risk().unwrap_or("unknown")]);
    }
    writeln!(out, "{table}")
}

// --- Config ---

/// Write the `config` report: guidance when empty, masked key otherwise.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_config_report<W: Write>(
    out: &mut W,
    palette: Palette,
    config: &Configuration,
) -> io::Result<()> {
    match &config.api_key {
        None => {
            writeln!(out, "{}", palette.paint("No configuration found", Color::Yellow))?;
            writeln!(
                out,
                "Set your API key with: {}",
                palette.paint("validkit config --set-key YOUR_KEY", Color::Cyan)
            )?;
            writeln!(
                out,
                "Get an API key at: {}",
                palette.paint("https://validkit.com", Color::Cyan)
            )
        }
        Some(key) => {
            writeln!(out, "{}", palette.bold("ValidKit Configuration:"))?;
            writeln!(out, "API Key: {}", palette.paint(&mask_api_key(key), Color::Grey))?;
            writeln!(
                out,
                "Config file: {}",
                palette.paint(&config.source.to_string(), Color::Grey)
            )
        }
    }
}

// --- Error output ---

/// Write a command error to `err`.
///
/// JSON format gets the structured envelope; other formats a labelled
/// line followed by remediation hints.
pub fn write_error<E: Write>(err: &mut E, palette: Palette, error: &CommandError, format: OutputFormat) {
    if format == OutputFormat::Json {
        let envelope = ErrorOutput::from_command_error(error);
        let s = serde_json::to_string_pretty(&envelope).unwrap_or_default();
        let _ = writeln!(err, "{s}");
        return;
    }
    let _ = writeln!(err, "{} {error}", palette.paint(&format!("{}:", error.label()), Color::Red));
    for hint in error.hints() {
        let _ = writeln!(err, "{hint}");
    }
}

// --- Helpers ---

/// Severity bucket of a risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Invalid,
    Unknown,
}

impl RiskLevel {
    #[must_use]
    pub fn parse(risk: &str) -> Self {
        match risk {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            "invalid" => Self::Invalid,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Self::Low => Color::Green,
            Self::Medium => Color::Yellow,
            Self::High | Self::Invalid => Color::Red,
            Self::Unknown => Color::Grey,
        }
    }
}

fn format_risk(palette: Palette, risk: Option<&str>) -> String {
    let label = risk.unwrap_or("unknown");
    palette.paint(label, RiskLevel::parse(label).color())
}

/// `mx_record_found` → `Mx Record Found`.
#[must_use]
pub fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}

/// Format a `[0, 1]` fraction as a percentage.
#[must_use]
pub fn format_percent(fraction: f64) -> String {
    let pct = fraction * 100.0;
    if (pct - pct.round()).abs() < 1e-9 {
        format!("{pct:.0}%")
    } else {
        format!("{pct:.1}%")
    }
}

/// Write `value` as pretty-printed JSON followed by a newline.
///
/// # Errors
///
/// Returns any serialization or writer error.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    let s = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(out, "{s}")
}

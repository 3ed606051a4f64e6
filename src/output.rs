//! Human readable rendering of already-fetched cluster data.
//!
//! Everything writes to an [`io::Write`] so that a closed stdout surfaces as a
//! `BrokenPipe` error instead of a panic.

use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;
use std::io::{self, Write};
use tabled::builder::Builder;
use tabled::settings::Style;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes rows under a header line.
///
/// # Errors
/// Propagates write failures.
pub fn write_table<W: Write>(out: &mut W, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut builder = Builder::default();
    builder.push_record(headers.iter().copied());
    for row in rows {
        builder.push_record(row.iter().cloned());
    }
    let mut table = builder.build();
    table.with(Style::psql());
    writeln!(out, "{table}")
}

/// Writes `key: value` pairs in the given order, keys aligned.
///
/// # Errors
/// Propagates write failures.
pub fn write_dict<W: Write>(out: &mut W, pairs: &[(String, String)]) -> io::Result<()> {
    let width = pairs.iter().map(|(key, _)| key.chars().count()).max().unwrap_or(0);
    for (key, value) in pairs {
        writeln!(out, "{key:<width$}  {value}")?;
    }
    Ok(())
}

/// Prints a table to stdout.
///
/// # Errors
/// Propagates write failures, including a closed pipe.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    write_table(&mut io::stdout().lock(), headers, rows)
}

/// Prints a key/value dump to stdout.
///
/// # Errors
/// Propagates write failures, including a closed pipe.
pub fn print_dict(pairs: &[(String, String)]) -> io::Result<()> {
    write_dict(&mut io::stdout().lock(), pairs)
}

/// Prints plain lines to stdout.
///
/// # Errors
/// Propagates write failures, including a closed pipe.
pub fn print_lines<I, S>(lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: std::fmt::Display,
{
    let mut out = io::stdout().lock();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Formats epoch milliseconds in the given timezone.
pub fn format_epoch_millis_in<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(tz).format(DATE_FORMAT).to_string())
}

/// Renders a JSON timestamp (epoch milliseconds) in local time; anything
/// else renders as an empty string.
#[must_use]
pub fn to_date(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_i64)
        .and_then(|millis| format_epoch_millis_in(millis, &Local))
        .unwrap_or_default()
}

/// Renders a JSON scalar without quotes; `null` and absent values are empty.
#[must_use]
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

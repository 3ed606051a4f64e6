//! Error display formatting for the CLI.

use crate::constants;
use crate::error::Error;
use std::io::{self, Write};

/// Writes the one-line report for `error`. Transport failures carry a
/// connection hint on the same line.
///
/// # Errors
/// Propagates write failures.
pub fn write_error<W: Write>(out: &mut W, error: &Error) -> io::Result<()> {
    if error.as_drove().is_some_and(|e| e.is_transport()) {
        writeln!(out, "error: {error} ({})", constants::ERR_CONNECTION)
    } else {
        writeln!(out, "error: {error}")
    }
}

/// Prints the report for `error` to stderr.
pub fn print_error(error: &Error) {
    // stderr is the last resort; nothing useful can be done if it is gone
    let _ = write_error(&mut io::stderr().lock(), error);
}

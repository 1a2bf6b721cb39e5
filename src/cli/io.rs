//! Output handling for CLI
//!
//! - text mode: one line per result
//! - JSON mode: one JSON object per line
//! - UTF-8 only

use std::io::Write;

use serde::Serialize;

use super::errors::CliResult;

/// Write one JSON document followed by a newline
pub fn write_json_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_text_line<W: Write>(out: &mut W, line: &str) -> CliResult<()> {
    writeln!(out, "{}", line)?;
    Ok(())
}

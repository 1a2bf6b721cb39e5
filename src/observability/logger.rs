//! Structured JSON error logging
//!
//! - One log line = one event
//! - `event` first, `severity` second, remaining keys alphabetical
//! - Synchronous, no buffering

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

/// Every record is an error: only recovered failures are logged.
const SEVERITY: &str = "ERROR";

/// Sink for recovered errors (failed default probes).
///
/// Implementations must not panic and must not fail the caller.
pub trait ErrorLogger: Send + Sync {
    fn error(&self, event: &str, fields: &[(&str, &str)]);
}

/// Renders one JSON log line, newline terminated.
pub fn format_record(event: &str, fields: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(256);

    output.push('{');

    output.push_str("\"event\":\"");
    escape_json_string(&mut output, event);
    output.push('"');

    output.push_str(",\"severity\":\"");
    output.push_str(SEVERITY);
    output.push('"');

    let mut sorted_fields: Vec<_> = fields.iter().collect();
    sorted_fields.sort_by_key(|(k, _)| *k);

    for (key, value) in sorted_fields {
        output.push_str(",\"");
        escape_json_string(&mut output, key);
        output.push_str("\":\"");
        escape_json_string(&mut output, value);
        output.push('"');
    }

    output.push('}');
    output.push('\n');
    output
}

fn escape_json_string(output: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c.is_control() => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
}

/// Writes JSON lines to a writer (stderr by default).
pub struct JsonLogger {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonLogger {
    pub fn stderr() -> Self {
        Self::to_writer(io::stderr())
    }

    pub fn to_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

impl Default for JsonLogger {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for JsonLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLogger").finish_non_exhaustive()
    }
}

impl ErrorLogger for JsonLogger {
    fn error(&self, event: &str, fields: &[(&str, &str)]) {
        let output = format_record(event, fields);

        // A poisoned writer still gets the line; logging never fails the caller
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = writer.write_all(output.as_bytes());
        let _ = writer.flush();
    }
}

/// Keeps formatted records in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured lines, without trailing newlines
    pub fn records(&self) -> Vec<String> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorLogger for MemoryLogger {
    fn error(&self, event: &str, fields: &[(&str, &str)]) {
        let line = format_record(event, fields).trim_end().to_string();
        match self.records.lock() {
            Ok(mut records) => records.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl ErrorLogger for NullLogger {
    fn error(&self, _event: &str, _fields: &[(&str, &str)]) {}
}

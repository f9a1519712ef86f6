//! JSON Lines (JSONL) output writer.
//!
//! One enriched message per line, in export order. JSONL is convenient for
//! line-oriented tools and for appending several groups into one file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::identity::Identity;
use crate::message::Export;

/// Writes the export's messages to JSONL format.
///
/// # Format
/// ```text
/// {"serialNumber":1,"datetime":"...","messageId":"...","sender":{...},"body":"Hello",...}
/// {"serialNumber":2,"datetime":"...","messageId":"...","sender":"Unknown Member",...}
/// ```
pub fn write_jsonl(export: &Export, output_path: impl AsRef<Path>) -> Result<()> {
    write_lines(&export.messages, output_path.as_ref())
}

/// Converts the export's messages to a JSONL string.
pub fn to_jsonl(export: &Export) -> Result<String> {
    lines_to_string(&export.messages)
}

/// Writes the identity set, one identity per line.
pub fn write_participants_jsonl(
    participants: &[Identity],
    output_path: impl AsRef<Path>,
) -> Result<()> {
    write_lines(participants, output_path.as_ref())
}

/// Converts the identity set to a JSONL string.
pub fn to_participants_jsonl(participants: &[Identity]) -> Result<String> {
    lines_to_string(participants)
}

fn write_lines<T: Serialize>(items: &[T], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

fn lines_to_string<T: Serialize>(items: &[T]) -> Result<String> {
    let mut output = String::new();
    for item in items {
        output.push_str(&serde_json::to_string(item)?);
        output.push('\n');
    }
    Ok(output)
}

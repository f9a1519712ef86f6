//! JSON output writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::identity::Identity;
use crate::message::Export;

/// Writes the export object as pretty-printed JSON (two-space indent).
///
/// # Format
/// ```json
/// {
///   "messages": [ { "serialNumber": 1, ... } ],
///   "participants": [ { "phone": "972555123456", "lid": null, "name": "Dana" } ]
/// }
/// ```
pub fn write_json(export: &Export, output_path: impl AsRef<Path>) -> Result<()> {
    write_pretty(export, output_path.as_ref())
}

/// Converts the export object to a pretty-printed JSON string.
pub fn to_json(export: &Export) -> Result<String> {
    Ok(serde_json::to_string_pretty(export)?)
}

/// Writes only the identity set as a pretty-printed JSON array.
pub fn write_participants_json(
    participants: &[Identity],
    output_path: impl AsRef<Path>,
) -> Result<()> {
    write_pretty(participants, output_path.as_ref())
}

/// Converts the identity set to a pretty-printed JSON array.
pub fn to_participants_json(participants: &[Identity]) -> Result<String> {
    Ok(serde_json::to_string_pretty(participants)?)
}

fn write_pretty<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

//! CSV output writer.
//!
//! Flattens enriched messages into one row each, semicolon-delimited.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::identity::Identity;
use crate::message::{EnrichedMessage, Export};

const MESSAGE_HEADER: [&str; 9] = [
    "Serial",
    "Datetime",
    "MessageId",
    "Sender",
    "SenderPhone",
    "Body",
    "ReplyRef",
    "ReplyAuthor",
    "Reactions",
];

const PARTICIPANT_HEADER: [&str; 6] = ["Phone", "Lid", "Name", "AltPhone", "AltName", "AltId"];

/// Writes the export's messages to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: `Serial`, `Datetime`, `MessageId`, `Sender`, `SenderPhone`,
///   `Body`, `ReplyRef`, `ReplyAuthor`, `Reactions`
/// - Reactions are rendered as `emoji:count` pairs separated by spaces
/// - Encoding: UTF-8
pub fn write_csv(export: &Export, output_path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(output_path)?;
    write_messages(&export.messages, file)
}

/// Converts the export's messages to a CSV string.
pub fn to_csv(export: &Export) -> Result<String> {
    let mut buffer = Vec::new();
    write_messages(&export.messages, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Writes the identity set to CSV.
pub fn write_participants_csv(participants: &[Identity], output_path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(output_path)?;
    write_participants(participants, file)
}

/// Converts the identity set to a CSV string.
pub fn to_participants_csv(participants: &[Identity]) -> Result<String> {
    let mut buffer = Vec::new();
    write_participants(participants, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn writer<W: Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b';').from_writer(inner)
}

fn write_messages<W: Write>(messages: &[EnrichedMessage], inner: W) -> Result<()> {
    let mut writer = writer(inner);
    writer.write_record(MESSAGE_HEADER)?;

    for msg in messages {
        writer.write_record(build_record(msg))?;
    }

    writer.flush()?;
    Ok(())
}

fn write_participants<W: Write>(participants: &[Identity], inner: W) -> Result<()> {
    let mut writer = writer(inner);
    writer.write_record(PARTICIPANT_HEADER)?;

    for identity in participants {
        writer.write_record([
            identity.phone().unwrap_or_default(),
            identity.lid().unwrap_or_default(),
            identity.name().unwrap_or_default(),
            identity.alt_phone().unwrap_or_default(),
            identity.alt_name().unwrap_or_default(),
            identity.alt_id().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Build CSV record for a single message.
fn build_record(msg: &EnrichedMessage) -> [String; 9] {
    let sender_phone = msg
        .sender
        .identity()
        .and_then(Identity::phone)
        .unwrap_or_default();

    let (reply_ref, reply_author) = msg
        .reply_to
        .as_ref()
        .map(|reply| (reply.reference.clone(), reply.author.label().to_string()))
        .unwrap_or_default();

    let reactions = msg
        .reactions
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{}:{}", r.emoji, r.count))
        .collect::<Vec<_>>()
        .join(" ");

    [
        msg.serial_number.to_string(),
        msg.datetime.clone(),
        msg.message_id.clone(),
        msg.sender.label().to_string(),
        sender_phone.to_string(),
        msg.body.clone(),
        reply_ref,
        reply_author,
        reactions,
    ]
}

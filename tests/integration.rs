//! End-to-end tests: raw platform JSON in, export JSON out.

use groupex::prelude::*;
use groupex::source::{DumpGroup, DumpSnapshot};
use serde_json::{Value, json};
use std::time::Duration;

fn raw_messages(value: Value) -> Vec<RawMessage> {
    serde_json::from_value(value).unwrap()
}

fn raw_participants(value: Value) -> Vec<RawParticipant> {
    serde_json::from_value(value).unwrap()
}

fn export_json(messages: Value, participants: Value) -> Value {
    let export = enrich(raw_messages(messages), &raw_participants(participants));
    serde_json::to_value(&export).unwrap()
}

// =========================================================================
// Scenario A: phone from a formatted name
// =========================================================================

#[test]
fn test_formatted_name_phone_differs_from_sender() {
    let out = export_json(
        json!([{
            "id": "false_123_abc_9725551234@c.us",
            "timestamp": 1000,
            "body": "hi",
            "sender": "9725551234@c.us"
        }]),
        json!([{ "formattedName": "+972-55-512-3457" }]),
    );

    let participants = out["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 2);
    let phones: Vec<&str> = participants
        .iter()
        .map(|p| p["phone"].as_str().unwrap())
        .collect();
    assert!(phones.contains(&"9725551234"));
    assert!(phones.contains(&"972555123457"));

    let msg = &out["messages"][0];
    assert_eq!(msg["messageId"], "abc");
    assert_eq!(msg["sender"]["phone"], "9725551234");
}

#[test]
fn test_formatted_name_phone_matches_sender() {
    let out = export_json(
        json!([{
            "id": "false_123_abc_972555123456@c.us",
            "timestamp": 1000,
            "body": "hi",
            "sender": "972555123456@c.us"
        }]),
        json!([{ "id": "xyz@lid", "formattedName": "+972-55-512-3456", "pushname": "Dana" }]),
    );

    let participants = out["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["phone"], "972555123456");
    assert_eq!(participants[0]["lid"], "xyz");
    assert_eq!(participants[0]["name"], "Dana");

    assert_eq!(out["messages"][0]["sender"]["name"], "Dana");
}

// =========================================================================
// Scenario B: unresolved reply author
// =========================================================================

#[test]
fn test_reply_author_falls_back_to_raw_id() {
    let out = export_json(
        json!([{
            "id": "false_1@g.us_H1_972555123456@c.us",
            "timestamp": 1000,
            "body": "answer",
            "sender": "972555123456@c.us",
            "quotedMsg": { "body": "original" },
            "quotedParticipant": "abc123@lid"
        }]),
        json!([]),
    );

    let reply = &out["messages"][0]["replyTo"];
    assert_eq!(reply["author"], "abc123@lid");
    assert_eq!(reply["body"], "original");
    assert_eq!(reply["ref"], "unresolved reference");

    // The quoted participant is not a registry source.
    assert_eq!(out["participants"].as_array().unwrap().len(), 1);
}

#[test]
fn test_reply_author_resolved_by_lid() {
    let out = export_json(
        json!([{
            "id": "false_1@g.us_H1_972555123456@c.us",
            "timestamp": 1000,
            "body": "answer",
            "sender": "972555123456@c.us",
            "quotedMsg": { "body": "original" },
            "quotedParticipant": "abc123@lid",
            "quotedStanzaID": "H0"
        }]),
        json!([{ "id": "abc123@lid", "pushname": "Noa" }]),
    );

    let reply = &out["messages"][0]["replyTo"];
    assert_eq!(reply["ref"], "H0");
    assert_eq!(reply["author"]["lid"], "abc123");
    assert_eq!(reply["author"]["name"], "Noa");
}

// =========================================================================
// Scenario C: media placeholder
// =========================================================================

#[test]
fn test_media_with_empty_body() {
    let out = export_json(
        json!([{
            "id": "false_1@g.us_M1_972555123456@c.us",
            "timestamp": 1000,
            "isMedia": true,
            "body": "",
            "sender": "972555123456@c.us"
        }]),
        json!([]),
    );

    assert_eq!(out["messages"][0]["body"], "<Media Message (Truncated)>");
}

#[test]
fn test_missing_text_placeholder() {
    let out = export_json(
        json!([{
            "id": "false_1@g.us_M1_972555123456@c.us",
            "timestamp": 1000,
            "sender": "972555123456@c.us"
        }]),
        json!([]),
    );

    assert_eq!(out["messages"][0]["body"], "[No text]");
}

// =========================================================================
// Scenario D: reaction groups
// =========================================================================

#[test]
fn test_reaction_groups_preserved() {
    let out = export_json(
        json!([{
            "id": "false_1@g.us_R1_972555123456@c.us",
            "timestamp": 1000,
            "body": "party",
            "sender": "972555123456@c.us",
            "reactions": [
                { "aggregateEmoji": "👍", "senders": [{ "senderUserJid": "111@c.us" }] },
                { "aggregateEmoji": "❤️", "senders": [
                    { "senderUserJid": "222@c.us" },
                    { "senderUserJid": "333@c.us" }
                ]}
            ]
        }]),
        json!([]),
    );

    assert_eq!(
        out["messages"][0]["reactions"],
        json!([
            { "emoji": "👍", "count": 1, "reactedBy": ["111"] },
            { "emoji": "❤️", "count": 2, "reactedBy": ["222", "333"] }
        ])
    );
}

#[test]
fn test_no_reactions_is_null() {
    let out = export_json(
        json!([{
            "id": "false_1@g.us_R1_972555123456@c.us",
            "timestamp": 1000,
            "sender": "972555123456@c.us"
        }]),
        json!([]),
    );

    assert_eq!(out["messages"][0]["reactions"], Value::Null);
    assert_eq!(out["messages"][0]["replyTo"], Value::Null);
}

#[test]
fn test_empty_reaction_list_is_null() {
    let out = export_json(
        json!([{
            "id": "false_1_A_972500000001@c.us",
            "timestamp": 10,
            "body": "x",
            "reactions": []
        }]),
        json!([]),
    );

    assert!(out["messages"][0]["reactions"].is_null());
}

// =========================================================================
// Whole pipeline
// =========================================================================

#[test]
fn test_ordering_filtering_and_serials() {
    let out = export_json(
        json!([
            { "id": "false_g_C_972500000001@c.us", "timestamp": 3000, "body": "third", "sender": "972500000001@c.us" },
            { "id": "false_g_X_972500000001@c.us", "timestamp": 0, "body": "zero", "sender": "972500000001@c.us" },
            { "id": "false_g_A_972500000002@c.us", "timestamp": 1000, "body": "first", "sender": "972500000002@c.us" },
            { "id": "false_g_Y_972500000002@c.us", "timestamp": "abc", "body": "text", "sender": "972500000002@c.us" },
            { "id": "false_g_Z_972500000002@c.us", "timestamp": null, "body": "null", "sender": "972500000002@c.us" },
            { "id": "false_g_B_972500000002@c.us", "timestamp": 2000, "body": "second", "sender": "972500000002@c.us" }
        ]),
        json!([]),
    );

    let messages = out["messages"].as_array().unwrap();
    let bodies: Vec<&str> = messages.iter().map(|m| m["body"].as_str().unwrap()).collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);

    let serials: Vec<u64> = messages
        .iter()
        .map(|m| m["serialNumber"].as_u64().unwrap())
        .collect();
    assert_eq!(serials, vec![1, 2, 3]);

    assert_eq!(messages[0]["datetime"], "1970-01-01T00:16:40.000Z");
}

#[test]
fn test_unknown_sender_sentinel() {
    let out = export_json(
        json!([{
            "id": "false_g_A_972500000001@c.us",
            "timestamp": 1000,
            "body": "from nowhere",
            "sender": { "id": "0@g.us" }
        }]),
        json!([]),
    );

    assert_eq!(out["messages"][0]["sender"], "Unknown Member");
}

#[test]
fn test_malformed_id_kept_verbatim() {
    let out = export_json(
        json!([{ "id": "not-a-composite-id", "timestamp": 1000, "body": "x", "sender": "972500000001@c.us" }]),
        json!([]),
    );

    assert_eq!(out["messages"][0]["messageId"], "not-a-composite-id");
}

#[test]
fn test_membership_name_meets_message_phone() {
    // Membership knows the name only, messages know the lid and phone only.
    let out = export_json(
        json!([{
            "id": "false_g_A_972500000009@c.us",
            "timestamp": 1000,
            "body": "hello",
            "author": "972500000009@c.us",
            "sender": { "id": "555@lid", "pushname": "Eli" }
        }]),
        json!([{ "id": "Eli", "pushname": "Eli" }]),
    );

    let participants = out["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["phone"], "972500000009");
    assert_eq!(participants[0]["lid"], "555");
    assert_eq!(participants[0]["name"], "Eli");
}

#[test]
fn test_conflicting_phones_kept_as_alt() {
    // Two phones reach the same lid: neither is dropped.
    let out = export_json(
        json!([
            { "id": "false_g_A_972500000001@c.us", "timestamp": 1000, "body": "a",
              "author": "972500000001@c.us", "sender": { "id": "777@lid" } },
            { "id": "false_g_B_972500000002@c.us", "timestamp": 2000, "body": "b",
              "author": "972500000002@c.us", "sender": { "id": "777@lid" } }
        ]),
        json!([]),
    );

    let participants = out["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["phone"], "972500000001");
    assert_eq!(participants[0]["altPhone"], "972500000002");
    assert_eq!(participants[0]["lid"], "777");
}

#[test]
fn test_report_counts() {
    let messages = raw_messages(json!([
        { "id": "false_g_A_972500000001@c.us", "timestamp": 1000, "body": "a", "sender": "972500000001@c.us" },
        { "id": "false_g_B_x@lid", "timestamp": 2000, "body": "b", "sender": "x@lid" },
        { "id": "bad", "timestamp": 3000, "body": "c" },
        { "id": "false_g_D_972500000001@c.us", "timestamp": -5, "body": "d", "sender": "972500000001@c.us" }
    ]));

    let (export, report) = Enricher::new().run(messages, &[]);

    assert_eq!(export.messages.len(), 3);
    assert_eq!(report.input_count, 4);
    assert_eq!(report.output_count, 3);
    assert_eq!(report.invalid_timestamps, 1);
    assert_eq!(report.phone_matches, 2);
    assert_eq!(report.lid_matches, 1);
    assert_eq!(report.unknown_senders, 1);
    assert_eq!(report.malformed_ids, 1);
    assert_eq!(report.identities, 2);
}

#[test]
fn test_date_window() {
    let messages = raw_messages(json!([
        { "id": "false_g_A_972500000001@c.us", "timestamp": 1704067200, "body": "jan 1" },
        { "id": "false_g_B_972500000001@c.us", "timestamp": 1706745600, "body": "feb 1" },
        { "id": "false_g_C_972500000001@c.us", "timestamp": 1709251200, "body": "mar 1" }
    ]));
    let filter = FilterConfig::new()
        .with_date_from("2024-01-15")
        .unwrap()
        .with_date_to("2024-02-15")
        .unwrap();

    let (export, report) = Enricher::new().with_filter(filter).run(messages, &[]);

    assert_eq!(export.messages.len(), 1);
    assert_eq!(export.messages[0].body, "feb 1");
    assert_eq!(export.messages[0].serial_number, 1);
    assert_eq!(report.outside_window, 2);
}

// =========================================================================
// Source + pipeline
// =========================================================================

#[test]
fn test_snapshot_to_export() {
    let page = |hashes: &[&str], base: i64| -> Vec<RawMessage> {
        hashes
            .iter()
            .enumerate()
            .map(|(i, h)| {
                RawMessage::new(format!("false_1@g.us_{h}_972500000001@c.us"))
                    .with_timestamp(base + i as i64)
                    .with_sender("972500000001@c.us")
                    .with_body(*h)
            })
            .collect()
    };

    let mut source = DumpSource::new(DumpSnapshot {
        groups: vec![DumpGroup {
            id: "1@g.us".into(),
            name: Some("ספר Book Club".into()),
            participants: vec![RawParticipant::new("972500000001@c.us").with_pushname("Dana")],
            // Newest page first; the second page repeats one message.
            pages: vec![page(&["C", "D"], 300), page(&["A", "B", "C"], 100)],
            messages: None,
        }],
    });

    let group = find_group(&source, "Book").unwrap();
    let participants = source.group_members(&group.id).unwrap();
    let messages =
        load_all_messages(&mut source, &group.id, 100, Duration::ZERO, None).unwrap();
    assert_eq!(messages.len(), 4);

    let export = enrich(messages, &participants);
    let bodies: Vec<&str> = export.messages.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["A", "B", "C", "D"]);
    assert_eq!(export.participants.len(), 1);
    assert!(export.messages.iter().all(|m| m.sender.label() == "Dana"));
}

#[test]
fn test_group_not_found() {
    let source = DumpSource::from_json(r#"{"groups":[{"id":"1@g.us","name":"Family"}]}"#).unwrap();
    let err = find_group(&source, "Book").unwrap_err();
    assert!(err.is_group_not_found());
}

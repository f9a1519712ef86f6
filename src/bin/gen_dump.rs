//! Noisy snapshot generator for stress testing groupex.
//!
//! Usage: cargo run --features gen-test --bin gen_dump -- [messages] [output] [people]
//! Example: cargo run --features gen-test --bin gen_dump -- 50000 heavy_dump.json 300

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use serde_json::Value;

use groupex::parsing::{RawMessage, RawParticipant, RawReactionGroup, SenderRef};
use groupex::source::{DumpGroup, DumpSnapshot};

const GROUP_ID: &str = "120363000000000001@g.us";
const PAGE_SIZE: usize = 50;
const PAGE_OVERLAP: usize = 5;

const EMOJIS: &[&str] = &["👍", "❤️", "😂", "😮", "😢", "🙏", "🔥", "👨‍👩‍👧‍👦", "🏳️‍🌈"];

const NAMES: &[&str] = &[
    "Dana",
    "Avi",
    "Noa",
    "Yossi",
    "דנה",
    "אבי",
    "נועה כהן",
    "יוסי",
    "Moshe 🎸",
    "\u{200F}רונית\u{200F}",
    "\u{202B}Shira\u{202C}",
    "~Eli~",
    "",
    "   ",
];

const BODIES: &[&str] = &[
    "בוקר טוב",
    "Good morning!",
    "מישהו יודע מתי הפגישה?",
    "ok",
    "👍",
    "see you at 8",
    "תודה רבה!!",
    "Line one\nLine two",
    "semi;colons;everywhere",
    "\"quoted\" text",
];

struct Person {
    phone: String,
    lid: String,
    name: &'static str,
}

impl Person {
    fn random(rng: &mut ThreadRng) -> Self {
        Self {
            phone: format!("9725{:08}", rng.gen_range(0..100_000_000u32)),
            lid: format!("{:015}", rng.gen_range(0..1_000_000_000_000_000u64)),
            name: NAMES.choose(rng).copied().unwrap_or("Dana"),
        }
    }

    /// The phone as a human would type it into an address book.
    fn formatted_phone(&self, rng: &mut ThreadRng) -> String {
        let local = &self.phone[3..];
        match rng.gen_range(0..4) {
            0 => format!("+972 {}-{}-{}", &local[..2], &local[2..5], &local[5..]),
            1 => format!("0{}-{}", &local[..2], &local[2..]),
            2 => format!("\u{202A}+{}\u{202C}", self.phone),
            _ => self.phone.clone(),
        }
    }

    fn phone_id(&self) -> String {
        format!("{}@c.us", self.phone)
    }

    fn lid_id(&self) -> String {
        format!("{}@lid", self.lid)
    }

    fn any_id(&self, rng: &mut ThreadRng) -> String {
        if rng.gen_bool(0.3) {
            self.lid_id()
        } else {
            self.phone_id()
        }
    }

    fn membership(&self, rng: &mut ThreadRng) -> RawParticipant {
        match rng.gen_range(0..3) {
            0 => RawParticipant::new(self.phone_id()).with_pushname(self.name),
            1 => RawParticipant::new(self.lid_id())
                .with_formatted_name(self.formatted_phone(rng))
                .with_pushname(self.name),
            _ => RawParticipant::new(self.lid_id()).with_name(self.name),
        }
    }

    fn sender(&self, rng: &mut ThreadRng) -> SenderRef {
        if rng.gen_bool(0.5) {
            SenderRef::Id(self.any_id(rng))
        } else {
            SenderRef::Contact(
                RawParticipant::new(self.any_id(rng))
                    .with_formatted_name(self.formatted_phone(rng))
                    .with_pushname(self.name),
            )
        }
    }
}

fn random_hash(rng: &mut ThreadRng) -> String {
    format!("{:016X}{:04X}", rng.r#gen::<u64>(), rng.gen_range(0..0xFFFFu32))
}

fn generate_message(rng: &mut ThreadRng, people: &[Person], earlier: &[RawMessage], ts: i64) -> RawMessage {
    let author = &people[rng.gen_range(0..people.len())];
    let author_id = author.any_id(rng);
    let id = format!("false_{}_{}_{}", GROUP_ID, random_hash(rng), author_id);

    let mut msg = RawMessage::new(id).with_sender(author.sender(rng)).with_author(author_id);

    msg = match rng.gen_range(0..100) {
        0 => msg.with_raw_timestamp(Value::from("yesterday")),
        1 => msg.with_raw_timestamp(Value::from(0)),
        _ => msg.with_timestamp(ts),
    };

    if rng.gen_bool(0.05) {
        msg = msg.with_media().with_body("/9j/4AAQSkZJRgABAQAAAQABAAD".repeat(20));
    } else if rng.gen_bool(0.1) {
        msg = msg.with_content(*BODIES.choose(rng).unwrap_or(&"ok"));
    } else if rng.gen_bool(0.95) {
        msg = msg.with_body(*BODIES.choose(rng).unwrap_or(&"ok"));
    }

    if !earlier.is_empty() && rng.gen_bool(0.15) {
        let quoted = &earlier[rng.gen_range(0..earlier.len())];
        let quoted_author = &people[rng.gen_range(0..people.len())];
        let participant = if rng.gen_bool(0.05) {
            "0@s.whatsapp.net".to_string()
        } else {
            quoted_author.any_id(rng)
        };
        let inner = RawMessage {
            body: quoted.body.clone(),
            is_media: quoted.is_media,
            ..RawMessage::default()
        };
        msg = msg.with_quote(inner, participant);
        if let Some(stanza) = quoted.id_str().and_then(|id| id.split('_').nth(2)) {
            msg = msg.with_quoted_stanza_id(stanza);
        }
    }

    if rng.gen_bool(0.2) {
        let mut groups = Vec::new();
        for _ in 0..rng.gen_range(1..4) {
            let amount = rng.gen_range(1..5);
            let chosen: Vec<&Person> = people.choose_multiple(rng, amount).collect();
            let reactors: Vec<String> = chosen.iter().map(|p| p.any_id(rng)).collect();
            groups.push(RawReactionGroup::new(*EMOJIS.choose(rng).unwrap_or(&"👍"), reactors));
        }
        msg = msg.with_reactions(groups);
    }

    msg
}

/// Splits messages (oldest first) into newest-first pages with some overlap
/// between neighbours, the way repeated "load earlier" calls return them.
fn paginate(messages: &[RawMessage]) -> Vec<Vec<RawMessage>> {
    let mut pages = Vec::new();
    let mut end = messages.len();
    while end > 0 {
        let start = end.saturating_sub(PAGE_SIZE);
        let overlap_end = (end + PAGE_OVERLAP).min(messages.len());
        pages.push(messages[start..overlap_end].to_vec());
        end = start;
    }
    pages
}

fn main() -> groupex::Result<()> {
    let args: Vec<String> = env::args().collect();

    let count: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10_000);
    let output = args.get(2).map(|s| s.as_str()).unwrap_or("heavy_dump.json");
    let people_count: usize = args
        .get(3)
        .and_then(|s| s.parse().ok())
        .unwrap_or(100)
        .max(1);

    println!("🧪 Snapshot Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Messages: {}", count);
    println!("   People:   {}", people_count);
    println!("   Output:   {}", output);
    println!();

    let start = Instant::now();
    let mut rng = rand::thread_rng();

    let people: Vec<Person> = (0..people_count).map(|_| Person::random(&mut rng)).collect();
    let participants = people.iter().map(|p| p.membership(&mut rng)).collect();

    let mut messages: Vec<RawMessage> = Vec::with_capacity(count);
    let mut ts: i64 = 1_700_000_000;
    for i in 0..count {
        ts += rng.gen_range(1..600);
        let msg = generate_message(&mut rng, &people, &messages, ts);
        messages.push(msg);

        if (i + 1) % 10_000 == 0 {
            eprint!("\r   Generated {}/{}", i + 1, count);
        }
    }
    if count >= 10_000 {
        eprintln!();
    }

    let snapshot = DumpSnapshot {
        groups: vec![
            DumpGroup {
                id: GROUP_ID.to_string(),
                name: Some("קבוצת בדיקה Stress Test".to_string()),
                participants,
                pages: paginate(&messages),
                messages: None,
            },
            DumpGroup {
                id: "120363000000000002@g.us".to_string(),
                name: Some("Empty Side Group".to_string()),
                ..DumpGroup::default()
            },
        ],
    };

    let file = File::create(output)?;
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);
    serde_json::to_writer(&mut writer, &snapshot)?;
    writer.flush()?;

    let size = std::fs::metadata(output)?.len();
    println!("✅ Done!");
    println!("   Pages:  {}", snapshot.groups[0].pages.len());
    println!("   Size:   {:.2} MB", size as f64 / 1_000_000.0);
    println!("   Time:   {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}

//! # groupex CLI
//!
//! Command-line interface for the groupex library.

use std::fs;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use env_logger::Env;

use groupex::GroupexError;
use groupex::cli::Args;
use groupex::config::sanitize_filename;
use groupex::core::{EnrichmentReport, Enricher, ExportStats};
use groupex::format::{write_participants, write_to_format};
use groupex::parsing::hebrewify;
use groupex::progress::stderr_progress;
use groupex::source::{DumpSource, MessageSource, find_group, load_all_messages};

const PROGRESS_EVERY: usize = 1000;

fn main() {
    let args = <Args as ClapParser>::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(&args) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), GroupexError> {
    let total_start = Instant::now();

    let export_config = args.export_config();
    export_config.validate()?;
    let filter_config = args.filter_config()?;
    let enrich_config = args.enrich_config();

    // Print header
    println!("📦 groupex v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.input.display());
    println!("🔍 Group:   {}", hebrewify(&export_config.target_group));
    println!("💾 Output:  {}", export_config.export_dir.display());
    println!("📄 Format:  {}", export_config.format);
    println!("🔗 Names:   {}", enrich_config.name_merge);
    if let Some(ref after) = args.after {
        println!("📅 After:   {}", after);
    }
    if let Some(ref before) = args.before {
        println!("📅 Before:  {}", before);
    }
    println!();

    // Step 1: Locate the group
    let mut source = DumpSource::from_path(&args.input)?;
    let group = find_group(&source, &export_config.target_group)?;
    let group_name = group.display_name().to_string();

    let participants = source.group_members(&group.id)?;
    println!(
        "👥 Found {} participants in group \"{}\"",
        participants.len(),
        hebrewify(&group_name)
    );

    // Progress goes to stderr, only when asked for
    let progress = args.verbose.then(|| stderr_progress(PROGRESS_EVERY));

    // Step 2: Load messages
    println!("📥 Loading messages...");
    let load_start = Instant::now();
    let messages = load_all_messages(
        &mut source,
        &group.id,
        export_config.max_messages,
        export_config.throttle(),
        progress.as_ref(),
    )?;
    println!(
        "   Loaded {} unique messages ({:.2}s)",
        messages.len(),
        load_start.elapsed().as_secs_f64()
    );

    // Step 3: Enrich
    println!("🧩 Resolving identities...");
    let enrich_start = Instant::now();
    let mut enricher = Enricher::new()
        .with_config(enrich_config)
        .with_filter(filter_config);
    if let Some(callback) = progress {
        enricher = enricher.with_progress(callback);
    }
    let (export, report) = enricher.run(messages, &participants);
    println!(
        "   {} identities, {} messages enriched ({:.2}s)",
        report.identities,
        report.output_count,
        enrich_start.elapsed().as_secs_f64()
    );

    // Step 4: Write
    fs::create_dir_all(&export_config.export_dir)?;
    let output_path = if args.participants_only {
        let path = export_config.export_dir.join(format!(
            "{}_participants.{}",
            sanitize_filename(&group_name),
            export_config.format.extension()
        ));
        write_participants(&export.participants, &path, export_config.format)?;
        println!(
            "✅ Exported {} participants to {}",
            export.participants.len(),
            path.display()
        );
        path
    } else {
        let path = export_config.output_path(&group_name);
        write_to_format(&export, &path, export_config.format)?;
        println!(
            "✅ Exported {} messages to {}",
            export.messages.len(),
            path.display()
        );
        path
    };
    log::debug!("wrote {}", output_path.display());

    print_summary(&report);

    if args.stats {
        print_stats(&ExportStats::from_export(&export));
    }

    println!();
    println!("⚡ Total time: {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(())
}

fn print_summary(report: &EnrichmentReport) {
    println!();
    println!("📊 Summary:");
    println!("   Loaded:    {} messages", report.input_count);
    println!("   Exported:  {} messages", report.output_count);
    if report.invalid_timestamps > 0 {
        println!("   Invalid:   {} (bad timestamp)", report.invalid_timestamps);
    }
    if report.outside_window > 0 {
        println!("   Filtered:  {} (outside date range)", report.outside_window);
    }
    println!(
        "   Senders:   📞 {} by phone, 📜 {} by lid, ❓ {} unknown",
        report.phone_matches, report.lid_matches, report.unknown_senders
    );
    if report.replies > 0 {
        println!(
            "   Replies:   {} ({} with unresolved author)",
            report.replies, report.unresolved_reply_authors
        );
    }
}

fn print_stats(stats: &ExportStats) {
    println!();
    println!("📈 Statistics:");
    println!("   Messages:      {}", stats.total_messages);
    println!(
        "   Replies:       {} ({:.0}%)",
        stats.replies,
        stats.reply_ratio()
    );
    println!("   Media:         {}", stats.media_messages);
    println!("   Reactions:     {}", stats.total_reactions);
    println!("   Participants:  {}", stats.participants);

    if !stats.reactions_by_emoji.is_empty() {
        let emoji: Vec<String> = stats
            .reactions_by_emoji
            .iter()
            .map(|(emoji, count)| format!("{} {}", emoji, count))
            .collect();
        println!("   By emoji:      {}", emoji.join("  "));
    }

    println!("   Top senders:");
    for (label, count) in stats.top_senders(5) {
        println!("     {:>5}  {}", count, hebrewify(label));
    }
}

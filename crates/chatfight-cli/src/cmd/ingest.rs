use crate::output::{OutputMode, print_json};
use anyhow::{Context, Result};
use chatfight_core::{ChatType, Engine, InboundActivity};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// JSONL file of activity events, or `-` for stdin.
    pub file: PathBuf,
}

/// One activity event on the wire. Only `actor_id` and `chat_id`
/// are required; the rest default to "a plain user message in a
/// supergroup, right now".
#[derive(Debug, Deserialize)]
struct EventRecord {
    actor_id: i64,
    chat_id: i64,
    #[serde(default)]
    actor_is_bot: bool,
    #[serde(default = "default_chat_type")]
    chat_type: ChatType,
    #[serde(default)]
    sender_is_chat: bool,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    occurred_at: Option<DateTime<Utc>>,
}

const fn default_chat_type() -> ChatType {
    ChatType::Supergroup
}

#[derive(Debug, Serialize)]
struct IngestSummary {
    counted: u64,
    skipped: u64,
    malformed: u64,
}

/// Execute `cf ingest`. Feeds each event through the engine's
/// inbound filter; malformed lines are logged and skipped, matching
/// the engine's best-effort counting policy.
///
/// # Errors
///
/// Returns an error if the input file cannot be opened or read.
pub fn run_ingest(args: &IngestArgs, engine: &Engine, mode: OutputMode) -> Result<()> {
    let reader: Box<dyn BufRead> = if args.file.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.file)
            .with_context(|| format!("open events file {}", args.file.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut summary = IngestSummary {
        counted: 0,
        skipped: 0,
        malformed: 0,
    };

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("read events input")?;
        if line.trim().is_empty() {
            continue;
        }

        let record: EventRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(error) => {
                warn!(line = line_no + 1, %error, "skipping malformed event line");
                summary.malformed += 1;
                continue;
            }
        };

        if let Some(name) = record.display_name.as_deref() {
            engine.on_display_name_seen(record.actor_id, name);
        }

        let inbound = InboundActivity {
            actor_id: record.actor_id,
            actor_is_bot: record.actor_is_bot,
            chat_id: record.chat_id,
            chat_type: record.chat_type,
            sender_is_chat: record.sender_is_chat,
        };
        let counted = match record.occurred_at {
            Some(at) => engine.on_activity_at(&inbound, at),
            None => engine.on_activity(&inbound),
        };

        if counted {
            summary.counted += 1;
        } else {
            summary.skipped += 1;
        }
    }

    if mode.is_json() {
        print_json(&summary)?;
    } else {
        println!(
            "Ingested {} events ({} skipped, {} malformed)",
            summary.counted, summary.skipped, summary.malformed
        );
    }
    Ok(())
}

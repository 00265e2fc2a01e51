//! Replays an editing session from stdin.
//!
//! Events are applied to the buffer as they arrive; the controller runs once
//! per burst, at the trailing edge of the debounce window.

use std::path::Path;

use chrono::{DateTime, Local, TimeDelta};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::args::{self, DocumentArgs, FormatArgs};
use crate::buffer::{LineBuffer, Position, TextBuffer, utf16_len};
use crate::cmd::Document;
use crate::config::Config;
use crate::controller::{EditOutcome, LogController};
use crate::debounce::Debouncer;
use crate::input::{self, EditEvent};
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct SessionArgs {
    #[command(flatten)]
    doc: DocumentArgs,

    /// Override the debounce window in milliseconds
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Replay without writing the file
    #[arg(short = 'n', long)]
    dry_run: bool,

    #[command(flatten)]
    format: FormatArgs,
}

impl SessionArgs {
    pub fn file(&self) -> &Path {
        &self.doc.file
    }
}

/// One controller run at the end of a burst.
#[derive(Debug, Serialize)]
pub struct Evaluation {
    /// Milliseconds since the session started
    pub at_ms: i64,
    pub coalesced: usize,
    #[serde(flatten)]
    pub outcome: EditOutcome,
}

#[derive(Serialize)]
struct SessionOutput<'a> {
    path: String,
    events: usize,
    evaluations: &'a [Evaluation],
    insertions: usize,
    written: bool,
}

pub fn run(args: SessionArgs, config: &Config) -> Result<(), String> {
    let format = args.format.resolve();
    let mut doc = Document::open_or_create(&args.doc.file, config)?;
    let events = input::read_stdin_events()?;

    let debounce_ms = args.debounce_ms.unwrap_or(config.log.debounce_ms);
    let started = args::now()?;
    let mut controller = doc.controller(config);

    let evaluations = replay(
        &mut controller,
        &mut doc.buffer,
        &events,
        started,
        debounce_ms,
    )?;
    let insertions = evaluations
        .iter()
        .filter(|e| e.outcome.insertion.is_some())
        .count();

    let written = doc.buffer.is_modified() && !args.dry_run;
    if written {
        doc.save()?;
    }

    let out = SessionOutput {
        path: doc.display_path(),
        events: events.len(),
        evaluations: &evaluations,
        insertions,
        written,
    };

    match format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_structured(format, &out)?,
        OutputFormat::Plain => {
            for e in &evaluations {
                let inserted = e.outcome.insertion.as_ref().map_or("", |i| i.text.as_str());
                println!("{} | {} | {}", e.at_ms, e.outcome.verdict, inserted.trim_end());
            }
        }
        OutputFormat::Pretty => {
            for e in evaluations.iter().filter(|e| e.outcome.insertion.is_some()) {
                if let Some(insertion) = &e.outcome.insertion {
                    println!(
                        "{:>7}ms  {} on line {}",
                        e.at_ms,
                        output::style_inserted(insertion.text.trim_end()),
                        insertion.line + 1
                    );
                }
            }
            println!(
                "{} events, {} evaluations, {} {}",
                out.events,
                evaluations.len(),
                insertions.to_string().green(),
                if insertions == 1 { "insertion" } else { "insertions" }
            );
        }
    }

    Ok(())
}

/// Apply `events` to `buf`, running the controller at each trailing edge.
pub fn replay(
    controller: &mut LogController,
    buf: &mut TextBuffer,
    events: &[EditEvent],
    started: DateTime<Local>,
    debounce_ms: u64,
) -> Result<Vec<Evaluation>, String> {
    let mut debouncer = Debouncer::new(debounce_ms);
    let mut evaluations = Vec::new();

    let mut evaluate = |controller: &mut LogController,
                        buf: &mut TextBuffer,
                        fired: crate::debounce::Fired<Position>| {
        buf.set_cursor(fired.value);
        let outcome = controller.on_edit(buf, fired.at);
        debug!(target: "session", coalesced = fired.coalesced, verdict = %outcome.verdict, "burst_settled");
        evaluations.push(Evaluation {
            at_ms: (fired.at - started).num_milliseconds(),
            coalesced: fired.coalesced,
            outcome,
        });
    };

    for (index, event) in events.iter().enumerate() {
        let at = i64::try_from(event.at_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|offset| started.checked_add_signed(offset))
            .ok_or_else(|| {
                format!(
                    "event {}: at_ms {} is out of range",
                    index + 1,
                    event.at_ms
                )
            })?;
        if let Some(fired) = debouncer.poll(at) {
            evaluate(controller, buf, fired);
        }

        if let Some(text) = &event.text {
            buf.set_line(event.line, text)?;
        }
        let line_len = buf.line(event.line).map_or(0, utf16_len);
        let cursor = Position::new(event.line, event.column.unwrap_or(line_len));
        buf.set_cursor(cursor);

        debouncer.push(buf.cursor(), at);
    }

    if let Some(fired) = debouncer.flush() {
        evaluate(controller, buf, fired);
    }

    Ok(evaluations)
}

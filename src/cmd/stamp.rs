use std::path::{Path, PathBuf};

use clap::Args;
use clap::builder::RangedU64ValueParser;
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::args::{self, CursorArgs, DocumentArgs, FormatArgs};
use crate::buffer::LineBuffer;
use crate::cmd::Document;
use crate::config::Config;
use crate::controller::EditOutcome;
use crate::output::{self, OutputFormat};
use crate::state::InsertionState;

#[derive(Args)]
pub struct StampArgs {
    #[command(flatten)]
    doc: DocumentArgs,

    /// Line that was just edited (1-based)
    #[arg(short = 'l', long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    line: usize,

    /// Cursor column in UTF-16 units (1-based; default: end of line)
    #[arg(short = 'c', long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    column: Option<usize>,

    /// Report what would happen without writing the file or the rate-limit state
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Rate-limit state file (default: user cache directory)
    #[arg(long, value_name = "PATH")]
    state: Option<PathBuf>,

    #[command(flatten)]
    format: FormatArgs,
}

impl StampArgs {
    pub fn file(&self) -> &Path {
        &self.doc.file
    }
}

#[derive(Serialize)]
struct StampOutput {
    path: String,
    #[serde(flatten)]
    outcome: EditOutcome,
    written: bool,
}

pub fn run(args: StampArgs, config: &Config) -> Result<(), String> {
    let format = args.format.resolve();
    let mut doc = Document::open(&args.doc.file, config)?;

    let cursor = CursorArgs {
        line: Some(args.line),
        column: args.column,
    }
    .resolve(&doc.buffer)?;
    doc.buffer.set_cursor(cursor);

    let state_path = args.state.clone().or_else(InsertionState::default_path);
    let state = state_path
        .as_deref()
        .map(InsertionState::load)
        .unwrap_or_default();

    let now = args::now()?;
    let mut controller = doc
        .controller(config)
        .with_last_insertion(state.last_insertion);
    let outcome = controller.on_edit(&mut doc.buffer, now);

    let written = outcome.insertion.is_some() && !args.dry_run;
    if written {
        doc.save()?;
        match &state_path {
            Some(path) => InsertionState {
                last_insertion: controller.last_insertion(),
            }
            .save(path)?,
            None => debug!(target: "state", "no_cache_dir"),
        }
    }

    let out = StampOutput {
        path: doc.display_path(),
        outcome,
        written,
    };

    match format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_structured(format, &out)?,
        OutputFormat::Plain => {
            let inserted = out.outcome.insertion.as_ref().map_or("", |i| i.text.as_str());
            println!("{} | {} | {}", out.path, out.outcome.verdict, inserted.trim_end());
        }
        OutputFormat::Pretty => {
            println!("{}", output::style_verdict(&out.outcome.verdict));
            if let Some(insertion) = &out.outcome.insertion {
                let line = doc.buffer.line(insertion.line).unwrap_or_default();
                let verb = if out.written { "Inserted" } else { "Would insert" };
                println!(
                    "{} {} at {}",
                    verb.green(),
                    output::style_inserted(insertion.text.trim_end()),
                    output::style_position(doc.buffer.cursor())
                );
                println!("  {}", line);
            }
        }
    }

    Ok(())
}

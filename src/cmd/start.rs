use std::path::Path;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::args::{self, CursorArgs, DocumentArgs, FormatArgs};
use crate::buffer::{LineBuffer, Position};
use crate::cmd::Document;
use crate::config::{Config, is_quiet};
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct StartArgs {
    #[command(flatten)]
    doc: DocumentArgs,

    #[command(flatten)]
    cursor: CursorArgs,

    #[command(flatten)]
    format: FormatArgs,
}

impl StartArgs {
    pub fn file(&self) -> &Path {
        &self.doc.file
    }
}

#[derive(Serialize)]
struct StartOutput {
    path: String,
    header_format: String,
    cursor: Position,
}

pub fn run(args: StartArgs, config: &Config) -> Result<(), String> {
    let format = args.format.resolve();
    let mut doc = Document::open_or_create(&args.doc.file, config)?;

    let at = if args.cursor.line.is_some() {
        args.cursor.resolve(&doc.buffer)?
    } else {
        // Default: a fresh line at the end of the document
        let last = doc.buffer.line_count() - 1;
        if doc.buffer.line(last).is_some_and(|l| !l.is_empty()) {
            doc.buffer.set_line(last + 1, "")?;
        }
        doc.buffer.end()
    };
    doc.buffer.set_cursor(at);

    let now = args::now()?;
    let cursor = doc.controller(config).start_log_entry(&mut doc.buffer, now);
    doc.save()?;

    let out = StartOutput {
        path: doc.display_path(),
        header_format: doc.header_format.clone(),
        cursor,
    };

    match format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_structured(format, &out)?,
        OutputFormat::Plain => {
            println!("{} | {}", out.path, output::format_position(out.cursor));
        }
        OutputFormat::Pretty => {
            println!(
                "{} log entry in {}, cursor at {}",
                "Started".green(),
                output::style_path(&out.path),
                output::style_position(out.cursor)
            );
            if !is_quiet(config) {
                println!(
                    "{}",
                    "Hint: lines typed below get timestamps from `daylog stamp` or `daylog session`"
                        .dimmed()
                );
            }
        }
    }

    Ok(())
}

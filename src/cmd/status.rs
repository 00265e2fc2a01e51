use std::path::Path;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::args::{DocumentArgs, FormatArgs};
use crate::buffer::LineBuffer;
use crate::cmd::Document;
use crate::config::Config;
use crate::controller::StatusSurface;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    doc: DocumentArgs,

    #[command(flatten)]
    format: FormatArgs,
}

impl StatusArgs {
    pub fn file(&self) -> &Path {
        &self.doc.file
    }
}

#[derive(Serialize)]
struct StatusOutput {
    path: String,
    #[serde(flatten)]
    surface: StatusSurface,
    header_format: String,
    header_source: String,
    use_list: bool,
    log_format: String,
}

pub fn run(args: StatusArgs, config: &Config) -> Result<(), String> {
    let format = args.format.resolve();
    let doc = Document::open(&args.doc.file, config)?;

    let surface = doc.controller(config).status(&doc.buffer.snapshot());

    let out = StatusOutput {
        path: doc.display_path(),
        surface,
        header_format: doc.header_format.clone(),
        header_source: doc.header_source.to_string(),
        use_list: config.log.use_list,
        log_format: config.log.log_format.clone(),
    };

    match format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_structured(format, &out)?,
        OutputFormat::Plain => {
            let shown = if out.surface.visible { out.surface.label.as_str() } else { "" };
            println!("{} | {} | {}", out.path, out.surface.visible, shown);
        }
        OutputFormat::Pretty => {
            if out.surface.visible {
                println!("{}", out.surface.label.green());
            } else {
                println!("{}", "no dated headers (status hidden)".dimmed());
            }
            println!(
                "  header {} ({})",
                out.header_format,
                output::style_path(&out.header_source)
            );
            if out.surface.header_pattern.is_none() {
                println!(
                    "  {} header pattern does not compile; no heading counts as dated",
                    "warning:".yellow()
                );
            }
            let mode = if out.use_list { "list items" } else { "paragraphs" };
            println!("  stamps {} as **{}**: ", mode, out.log_format);
        }
    }

    Ok(())
}

use std::path::Path;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::args::{DocumentArgs, FormatArgs};
use crate::cmd::Document;
use crate::config::Config;
use crate::controller::Jump;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct JumpArgs {
    #[command(flatten)]
    doc: DocumentArgs,

    #[command(flatten)]
    format: FormatArgs,
}

impl JumpArgs {
    pub fn file(&self) -> &Path {
        &self.doc.file
    }
}

#[derive(Serialize)]
struct JumpOutput {
    path: String,
    #[serde(flatten)]
    jump: Jump,
    written: bool,
}

pub fn run(args: JumpArgs, config: &Config) -> Result<(), String> {
    let format = args.format.resolve();
    let mut doc = Document::open(&args.doc.file, config)?;

    let jump = doc.controller(config).jump_to_latest(&mut doc.buffer)?;

    let written = doc.buffer.is_modified();
    if written {
        doc.save()?;
    }

    let out = JumpOutput {
        path: doc.display_path(),
        jump,
        written,
    };

    match format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_structured(format, &out)?,
        OutputFormat::Plain => {
            println!(
                "{} | {} | {}",
                out.path,
                out.jump.date,
                output::format_position(out.jump.landing)
            );
        }
        OutputFormat::Pretty => {
            println!(
                "Latest log {} (line {}), cursor at {}",
                out.jump.date,
                out.jump.header_line + 1,
                output::style_position(out.jump.landing)
            );
            if out.jump.appended_line {
                println!("{}", "appended an empty line below the header".dimmed());
            }
        }
    }

    Ok(())
}

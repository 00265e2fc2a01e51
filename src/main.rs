use std::io;
use std::path::Path;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::env::CompleteEnv;
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

mod args;
mod buffer;
mod calendar;
mod cmd;
mod config;
mod controller;
mod debounce;
mod detect;
mod header;
mod input;
mod insert;
mod logged;
mod navigate;
mod output;
mod pattern;
mod state;

#[derive(Parser)]
#[command(name = "daylog")]
#[command(version = env!("DAYLOG_VERSION"))]
#[command(about = "Automatic timestamps for dated log sections in markdown notes")]
#[command(
    long_about = "daylog - Timestamp prefixes for daily logs.\n\nA document is organized into sections headed by a date (\"## [[2024-05-11]]\").\nLines written inside the most recent kind of section get a \"**09:15**: \" prefix,\nat most once per interval, and only where no undated heading intervenes."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert a header for today and place the cursor below it
    Start(cmd::start::StartArgs),

    /// Move to the section with the latest date
    Jump(cmd::jump::JumpArgs),

    /// Evaluate one edit and insert a timestamp prefix if it qualifies
    Stamp(cmd::stamp::StampArgs),

    /// Replay edit events from stdin with debouncing
    Session(cmd::session::SessionArgs),

    /// Show the status surface for a document
    Status(cmd::status::StatusArgs),

    /// Generate shell completion script
    Completion(CompletionArgs),

    /// Configuration introspection
    Config(cmd::config_cmd::ConfigArgs),
}

impl Commands {
    /// The document a command works on, if any.
    fn document(&self) -> Option<&Path> {
        match self {
            Commands::Start(a) => Some(a.file()),
            Commands::Jump(a) => Some(a.file()),
            Commands::Stamp(a) => Some(a.file()),
            Commands::Session(a) => Some(a.file()),
            Commands::Status(a) => Some(a.file()),
            Commands::Completion(_) | Commands::Config(_) => None,
        }
    }
}

#[derive(clap::Args)]
struct CompletionArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Clone, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DAYLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (tests, embedding) keeps the existing subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn main() {
    // Handle dynamic shell completions
    CompleteEnv::with_factory(Cli::command).complete();

    // Use try_parse to catch errors and normalize exit code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Exit with 0 for help/version, 1 for actual errors
            let exit_code = if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                0
            } else {
                1
            };
            process::exit(exit_code);
        }
    };

    init_tracing();

    if let Commands::Completion(args) = &cli.command {
        let shell = match args.shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
        };
        generate(shell, &mut Cli::command(), "daylog", &mut io::stdout());
        return;
    }

    // Config applies per document directory
    let dir = match cli.command.document() {
        Some(file) => cmd::document_dir(file),
        None => Path::new(".").to_path_buf(),
    };
    let loaded_config = config::load_config(&dir);
    tracing::debug!(target: "config", sources = loaded_config.sources.len(), "loaded");
    // `config show` prints these itself
    if !matches!(cli.command, Commands::Config(_)) {
        for warning in config::validate(&loaded_config.config) {
            tracing::warn!(target: "config", "{}", warning);
        }
    }

    let result = match cli.command {
        Commands::Start(args) => cmd::start::run(args, &loaded_config.config),
        Commands::Jump(args) => cmd::jump::run(args, &loaded_config.config),
        Commands::Stamp(args) => cmd::stamp::run(args, &loaded_config.config),
        Commands::Session(args) => cmd::session::run(args, &loaded_config.config),
        Commands::Status(args) => cmd::status::run(args, &loaded_config.config),
        Commands::Config(args) => cmd::config_cmd::run(args),
        Commands::Completion(_) => unreachable!(), // Handled above
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

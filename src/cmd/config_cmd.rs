//! `daylog config` subcommands.
//!
//! - show: settings as a document would see them, with the header pattern
//! - env: environment overrides and their current values
//! - schema: JSON schema for manifests
//! - init: write a commented `.daylog/config.yaml`

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;

use crate::args::FormatArgs;
use crate::calendar;
use crate::cmd::document_dir;
use crate::config::{
    self, CONFIG_DIR, Config, ENV_VARS, MANIFEST_FILE, load_config, template_manifest,
    user_config_path,
};
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the settings that apply to a document
    Show(ShowArgs),

    /// List environment overrides and their current values
    Env(EnvArgs),

    /// Output JSON schema for manifest validation
    Schema,

    /// Create a commented manifest
    Init(InitArgs),
}

#[derive(Args)]
struct ShowArgs {
    /// Resolve as seen by this document (default: current directory)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Prefix the YAML with its sources and the header pattern
    #[arg(long)]
    effective: bool,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args)]
struct EnvArgs {
    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args)]
struct InitArgs {
    /// Directory that holds the documents (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Overwrite an existing manifest
    #[arg(long)]
    force: bool,
}

/// Everything `config show` knows about one directory.
#[derive(Debug, Serialize)]
struct ShowReport {
    sources: Vec<String>,
    header_format: String,
    header_source: String,
    warnings: Vec<String>,
    config: Config,
}

impl ShowReport {
    fn resolve(dir: &Path) -> Self {
        let loaded = load_config(dir);
        let (header_format, header_source) = calendar::header_format(&loaded.config, dir);
        ShowReport {
            sources: loaded.sources.iter().map(ToString::to_string).collect(),
            header_format,
            header_source: header_source.to_string(),
            warnings: config::validate(&loaded.config),
            config: loaded.config,
        }
    }
}

#[derive(Debug, Serialize)]
struct EnvEntry {
    name: &'static str,
    config_path: &'static str,
    default: &'static str,
    /// Current value, if set
    value: Option<String>,
}

fn env_entries() -> Vec<EnvEntry> {
    ENV_VARS
        .iter()
        .map(|var| EnvEntry {
            name: var.name,
            config_path: var.config_path,
            default: var.default,
            value: std::env::var(var.name).ok().filter(|v| !v.is_empty()),
        })
        .collect()
}

pub fn run(args: ConfigArgs) -> Result<(), String> {
    let cwd = std::env::current_dir().map_err(|e| format!("cannot get cwd: {}", e))?;

    match args.command {
        ConfigCommand::Show(show_args) => {
            let dir = match &show_args.file {
                Some(file) => cwd.join(document_dir(file)),
                None => cwd,
            };
            run_show(&dir, show_args.effective, show_args.format.resolve())
        }
        ConfigCommand::Env(env_args) => run_env(env_args.format.resolve()),
        ConfigCommand::Schema => {
            println!("{}", config::json_schema());
            Ok(())
        }
        ConfigCommand::Init(init_args) => {
            let target = cwd.join(&init_args.path);
            let manifest = write_manifest(&target, init_args.force)?;
            println!("Created: {}", output::style_path(&manifest.display().to_string()));

            let (header_format, header_source) =
                calendar::header_format(&Config::default(), &target);
            println!("Header pattern: {} (from {})", header_format, header_source);

            if let Some(user_path) = user_config_path()
                && !user_path.exists()
            {
                println!(
                    "Hint: User global config can be placed at: {}",
                    user_path.display()
                );
            }
            Ok(())
        }
    }
}

fn run_show(dir: &Path, effective: bool, format: OutputFormat) -> Result<(), String> {
    let report = ShowReport::resolve(dir);

    match format {
        OutputFormat::Json | OutputFormat::Yaml => return output::print_structured(format, &report),
        OutputFormat::Pretty | OutputFormat::Plain => {}
    }

    if effective {
        println!("# Sources, lowest precedence first:");
        for source in &report.sources {
            println!("#   - {}", source);
        }
        println!(
            "# Header pattern: {} (from {})",
            report.header_format, report.header_source
        );
        println!();
    }
    let yaml = serde_yaml::to_string(&report.config)
        .map_err(|e| format!("failed to serialize config: {}", e))?;
    print!("{}", yaml);

    for warning in &report.warnings {
        eprintln!("{} {}", "warning:".yellow(), warning);
    }
    Ok(())
}

fn run_env(format: OutputFormat) -> Result<(), String> {
    let entries = env_entries();

    match format {
        OutputFormat::Json | OutputFormat::Yaml => output::print_structured(format, &entries)?,
        OutputFormat::Plain => {
            for e in &entries {
                println!("{} | {} | {}", e.name, e.config_path, e.value.as_deref().unwrap_or(""));
            }
        }
        OutputFormat::Pretty => {
            for (entry, var) in entries.iter().zip(ENV_VARS) {
                let current = match &entry.value {
                    Some(v) => v.green(),
                    None => "unset".dimmed(),
                };
                println!("  {} = {}", entry.name.bold(), current);
                println!("    {}", var.description);
                if let Some(values) = var.values {
                    println!("    Values: {}", values);
                }
                println!("    Default: {}  ({})", var.default, var.config_path);
                println!();
            }
        }
    }
    Ok(())
}

/// Write the template manifest under `target`; returns its path.
fn write_manifest(target: &Path, force: bool) -> Result<PathBuf, String> {
    let config_dir = target.join(CONFIG_DIR);
    let manifest_path = config_dir.join(MANIFEST_FILE);

    if manifest_path.exists() && !force {
        return Err(format!(
            "manifest already exists: {}\nUse --force to overwrite",
            manifest_path.display()
        ));
    }

    fs::create_dir_all(&config_dir)
        .map_err(|e| format!("failed to create {}: {}", config_dir.display(), e))?;
    fs::write(&manifest_path, template_manifest())
        .map_err(|e| format!("failed to write {}: {}", manifest_path.display(), e))?;

    Ok(manifest_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_manifest_refuses_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_manifest(tmp.path(), false).unwrap();
        assert!(path.ends_with(Path::new(CONFIG_DIR).join(MANIFEST_FILE)));
        assert!(config::load_manifest(&path).is_some());

        let err = write_manifest(tmp.path(), false).unwrap_err();
        assert!(err.contains("--force"));
        assert!(write_manifest(tmp.path(), true).is_ok());
    }

    #[test]
    fn test_show_report_picks_up_manifest_and_vault() {
        let tmp = tempfile::tempdir().unwrap();
        let obsidian = tmp.path().join(".obsidian");
        fs::create_dir_all(&obsidian).unwrap();
        fs::write(obsidian.join("daily-notes.json"), r#"{"format": "DD.MM.YYYY"}"#).unwrap();

        let manifest_dir = tmp.path().join(CONFIG_DIR);
        fs::create_dir_all(&manifest_dir).unwrap();
        fs::write(
            manifest_dir.join(MANIFEST_FILE),
            "log:\n  replacementInterval: 0\n",
        )
        .unwrap();

        let report = {
            let _guard = config::tests::ENV_MUTEX
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            ShowReport::resolve(tmp.path())
        };
        assert_eq!(report.header_format, "DD.MM.YYYY");
        assert!(report.header_source.ends_with("daily-notes.json"));
        assert!(report.sources.iter().any(|s| s.ends_with(MANIFEST_FILE)));
        assert_eq!(report.config.log.replacement_interval, 0);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_env_entries_cover_registry() {
        let entries = env_entries();
        assert_eq!(entries.len(), ENV_VARS.len());
        assert!(entries.iter().any(|e| e.name == "DAYLOG_INTERVAL"));
    }
}

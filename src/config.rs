//! Configuration system for daylog.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (DAYLOG_*) (highest priority)
//! 2. Project manifests (.daylog/config.yaml, nearest directory wins)
//! 3. User global (~/.config/daylog/config.yaml)
//! 4. Built-in defaults (lowest priority)
//!
//! This module provides:
//! - `Config` struct with all settings
//! - `EnvVar` registry for documentation
//! - Helper functions for env var parsing
//! - Config loading and merging

use std::fs;
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::pattern::{DEFAULT_LOG_FORMAT, Pattern};

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration for daylog.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Automatic timestamp settings
    pub log: LogConfig,
    /// Daily-note header settings
    pub header: HeaderConfig,
    /// Behavior settings
    pub behavior: BehaviorConfig,
}

/// Settings that drive prefix detection and insertion.
///
/// Detection receives a clone of this as an immutable snapshot per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    /// Minimum seconds between two automatic insertions
    pub replacement_interval: u64,
    /// Only stamp top-level list items
    pub use_list: bool,
    /// Timestamp pattern for inserted prefixes
    pub log_format: String,
    /// Quiet period in milliseconds before an edit is evaluated
    pub debounce_ms: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            replacement_interval: 30,
            use_list: false,
            log_format: DEFAULT_LOG_FORMAT.to_string(),
            debounce_ms: 500,
        }
    }
}

/// Daily-note header settings.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HeaderConfig {
    /// Header date pattern (null = read daily-notes settings, then YYYY-MM-DD)
    pub format: Option<String>,
}

/// Behavior defaults.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Suppress hints
    pub quiet: bool,
}

// ============================================================================
// Config Source Tracking
// ============================================================================

/// Source of a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in default
    Default,
    /// User global config (~/.config/daylog/config.yaml)
    UserGlobal,
    /// Project manifest (.daylog/config.yaml)
    ProjectManifest(String),
    /// Environment variable
    EnvVar(String),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::UserGlobal => write!(f, "~/.config/daylog/config.yaml"),
            ConfigSource::ProjectManifest(path) => write!(f, "{}", path),
            ConfigSource::EnvVar(name) => write!(f, "${}", name),
        }
    }
}

// ============================================================================
// Environment Variable Registry
// ============================================================================

/// Environment variable definition for documentation.
pub struct EnvVar {
    /// Variable name (e.g., "DAYLOG_INTERVAL")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Default value or behavior
    pub default: &'static str,
    /// Config path this maps to (e.g., "log.replacementInterval")
    pub config_path: &'static str,
    /// Valid values (if enumerable)
    pub values: Option<&'static str>,
}

/// Registry of all supported environment variables.
pub const ENV_VARS: &[EnvVar] = &[
    EnvVar {
        name: "NO_COLOR",
        description: "Disable colored output (standard)",
        default: "unset",
        config_path: "-",
        values: Some("any non-empty value"),
    },
    EnvVar {
        name: "DAYLOG_INTERVAL",
        description: "Minimum seconds between automatic insertions",
        default: "30",
        config_path: "log.replacementInterval",
        values: Some("positive integer"),
    },
    EnvVar {
        name: "DAYLOG_USE_LIST",
        description: "Only stamp top-level list items",
        default: "false",
        config_path: "log.useList",
        values: Some("1, true, yes"),
    },
    EnvVar {
        name: "DAYLOG_LOG_FORMAT",
        description: "Timestamp pattern for inserted prefixes",
        default: "HH:mm",
        config_path: "log.logFormat",
        values: Some("moment-style pattern"),
    },
    EnvVar {
        name: "DAYLOG_DEBOUNCE_MS",
        description: "Quiet period before an edit is evaluated (session mode)",
        default: "500",
        config_path: "log.debounceMs",
        values: Some("non-negative integer"),
    },
    EnvVar {
        name: "DAYLOG_HEADER_FORMAT",
        description: "Daily-note header date pattern",
        default: "daily-notes settings, then YYYY-MM-DD",
        config_path: "header.format",
        values: Some("moment-style pattern"),
    },
    EnvVar {
        name: "DAYLOG_QUIET",
        description: "Suppress hint messages",
        default: "false",
        config_path: "behavior.quiet",
        values: Some("1, true, yes"),
    },
    EnvVar {
        name: "DAYLOG_NOW",
        description: "Override the current time",
        default: "system clock",
        config_path: "-",
        values: Some("YYYY-MM-DD HH:MM[:SS]"),
    },
    EnvVar {
        name: "DAYLOG_LOG",
        description: "Diagnostic log filter (tracing EnvFilter syntax)",
        default: "warn",
        config_path: "-",
        values: Some("error, warn, info, debug, trace, or target=level"),
    },
];

// ============================================================================
// Environment Variable Helpers
// ============================================================================

/// Parse a boolean environment variable.
///
/// Returns `Some(true)` if the variable is set to a truthy value (1, true, yes),
/// `Some(false)` if set to a falsy value (0, false, no),
/// and `None` if unset or empty.
pub fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| {
        if v.is_empty() {
            return None;
        }
        let lower = v.to_lowercase();
        match lower.as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    })
}

/// Parse a string environment variable.
///
/// Returns `Some(value)` if set and non-empty, `None` otherwise.
pub fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Parse a u64 environment variable.
///
/// Returns `Some(value)` if set and parseable, `None` otherwise.
pub fn env_u64(name: &str) -> Option<u64> {
    env_string(name).and_then(|v| v.parse().ok())
}

// ============================================================================
// Config Loading
// ============================================================================

/// Manifest file name within .daylog/
pub const MANIFEST_FILE: &str = "config.yaml";

/// Config directory name
pub const CONFIG_DIR: &str = ".daylog";

/// Load configuration from all sources.
///
/// Resolution order (later overrides earlier):
/// 1. Built-in defaults
/// 2. User global (~/.config/daylog/config.yaml)
/// 3. Project manifests (walk from filesystem root down to `dir`)
/// 4. Environment variables
pub fn load_config(dir: &Path) -> LoadedConfig {
    let mut config = Config::default();
    let mut sources = vec![ConfigSource::Default];

    // 1. User global config
    if let Some(user_config_path) = user_config_path()
        && let Some(user_config) = load_manifest(&user_config_path)
    {
        merge(&mut config, &user_config);
        sources.push(ConfigSource::UserGlobal);
    }

    // 2. Walk from the root down to dir, loading manifests at each level
    for path in collect_manifest_paths(dir) {
        if let Some(manifest_config) = load_manifest(&path) {
            merge(&mut config, &manifest_config);
            sources.push(ConfigSource::ProjectManifest(
                path.to_string_lossy().to_string(),
            ));
        }
    }

    // 3. Environment overrides
    for name in apply_env(&mut config) {
        sources.push(ConfigSource::EnvVar(name.to_string()));
    }

    LoadedConfig { config, sources }
}

/// Result of loading configuration with source tracking.
#[derive(Debug)]
pub struct LoadedConfig {
    /// The merged configuration
    pub config: Config,
    /// Sources that contributed to this config (in order of application)
    pub sources: Vec<ConfigSource>,
}

/// Get the user config file path (~/.config/daylog/config.yaml).
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("daylog").join("config.yaml"))
}

/// Load a manifest file, returning None if it doesn't exist or can't be parsed.
pub fn load_manifest(path: &Path) -> Option<Config> {
    let content = fs::read_to_string(path).ok()?;
    match serde_yaml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(target: "config", path = %path.display(), error = %e, "manifest_unparseable");
            None
        }
    }
}

/// Collect manifest paths from the filesystem root down to `dir` (inclusive).
///
/// Returns paths in order from root to `dir` (so later ones override earlier).
fn collect_manifest_paths(dir: &Path) -> Vec<PathBuf> {
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());

    let mut paths: Vec<PathBuf> = dir
        .ancestors()
        .map(|ancestor| ancestor.join(CONFIG_DIR).join(MANIFEST_FILE))
        .filter(|manifest| manifest.is_file())
        .collect();
    paths.reverse();
    paths
}

/// Apply DAYLOG_* overrides. Returns the names of the variables that took effect.
fn apply_env(config: &mut Config) -> Vec<&'static str> {
    let mut applied = Vec::new();

    if let Some(v) = env_u64("DAYLOG_INTERVAL") {
        config.log.replacement_interval = v;
        applied.push("DAYLOG_INTERVAL");
    }
    if let Some(v) = env_bool("DAYLOG_USE_LIST") {
        config.log.use_list = v;
        applied.push("DAYLOG_USE_LIST");
    }
    if let Some(v) = env_string("DAYLOG_LOG_FORMAT") {
        config.log.log_format = v;
        applied.push("DAYLOG_LOG_FORMAT");
    }
    if let Some(v) = env_u64("DAYLOG_DEBOUNCE_MS") {
        config.log.debounce_ms = v;
        applied.push("DAYLOG_DEBOUNCE_MS");
    }
    if let Some(v) = env_string("DAYLOG_HEADER_FORMAT") {
        config.header.format = Some(v);
        applied.push("DAYLOG_HEADER_FORMAT");
    }
    if let Some(v) = env_bool("DAYLOG_QUIET") {
        config.behavior.quiet = v;
        applied.push("DAYLOG_QUIET");
    }

    applied
}

/// Merge overlay config into base config.
///
/// Non-default values in overlay override values in base.
pub fn merge(base: &mut Config, overlay: &Config) {
    // Log: replace if overlay has non-default values
    let default_log = LogConfig::default();
    if overlay.log.replacement_interval != default_log.replacement_interval {
        base.log.replacement_interval = overlay.log.replacement_interval;
    }
    if overlay.log.use_list != default_log.use_list {
        base.log.use_list = overlay.log.use_list;
    }
    if overlay.log.log_format != default_log.log_format {
        base.log.log_format = overlay.log.log_format.clone();
    }
    if overlay.log.debounce_ms != default_log.debounce_ms {
        base.log.debounce_ms = overlay.log.debounce_ms;
    }

    // Header: merge Option fields
    if overlay.header.format.is_some() {
        base.header.format = overlay.header.format.clone();
    }

    // Behavior: merge non-default values
    let default_behavior = BehaviorConfig::default();
    if overlay.behavior.quiet != default_behavior.quiet {
        base.behavior.quiet = overlay.behavior.quiet;
    }
}

/// Report settings that will not behave as intended.
///
/// Nothing here is fatal: detection falls back or never matches instead.
pub fn validate(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.log.replacement_interval == 0 {
        warnings.push("log.replacementInterval is 0: rate limiting is disabled".to_string());
    }
    let interval = i64::try_from(config.log.replacement_interval)
        .ok()
        .and_then(TimeDelta::try_seconds);
    if interval.is_none() {
        warnings.push(format!(
            "log.replacementInterval {} is out of range: no further timestamps after the first",
            config.log.replacement_interval
        ));
    }
    let debounce = i64::try_from(config.log.debounce_ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds);
    if debounce.is_none() {
        warnings.push(format!(
            "log.debounceMs {} is out of range: edits settle only at end of input",
            config.log.debounce_ms
        ));
    }
    if let Err(e) = Pattern::compile(&config.log.log_format) {
        warnings.push(format!(
            "log.logFormat {:?} is unusable ({}): timestamps fall back to {}",
            config.log.log_format, e, DEFAULT_LOG_FORMAT
        ));
    }
    if let Some(format) = &config.header.format
        && let Err(e) = Pattern::compile(format)
    {
        warnings.push(format!(
            "header.format {:?} is unusable ({}): no header will count as dated",
            format, e
        ));
    }

    warnings
}

/// Generate JSON schema for the config.
pub fn json_schema() -> String {
    let schema = schemars::schema_for!(Config);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

/// Check if quiet mode is enabled (suppress hints).
pub fn is_quiet(config: &Config) -> bool {
    config.behavior.quiet
}

/// Generate a template manifest with comments.
pub fn template_manifest() -> String {
    r#"# daylog configuration manifest
# Place in .daylog/config.yaml (applies to documents in this directory and below)

# Automatic timestamps
# log:
#   replacementInterval: 30   # seconds between automatic insertions
#   useList: false            # only stamp top-level "- " / "* " items
#   logFormat: "HH:mm"        # timestamp pattern (moment-style)
#   debounceMs: 500           # quiet period before an edit is evaluated

# Daily-note headers
# header:
#   format: null              # null = .obsidian/daily-notes.json, then YYYY-MM-DD

# Behavior settings
# behavior:
#   quiet: false
"#
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to serialize env var tests
    pub(crate) static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_MUTEX.lock().unwrap();

        let originals: Vec<_> = vars
            .iter()
            .map(|(k, _)| (*k, std::env::var(*k).ok()))
            .collect();

        // SAFETY: env access in these tests is serialized by ENV_MUTEX
        for (k, v) in vars {
            match v {
                Some(val) => unsafe { std::env::set_var(k, val) },
                None => unsafe { std::env::remove_var(k) },
            }
        }

        let result = f();

        for (k, original) in originals {
            match original {
                Some(val) => unsafe { std::env::set_var(k, val) },
                None => unsafe { std::env::remove_var(k) },
            }
        }

        result
    }

    #[test]
    fn test_env_bool() {
        let cases = vec![
            (Some("1"), Some(true)),
            (Some("true"), Some(true)),
            (Some("YES"), Some(true)),
            (Some("0"), Some(false)),
            (Some("no"), Some(false)),
            (Some(""), None),
            (Some("maybe"), None),
            (None, None),
        ];
        for (value, want) in cases {
            with_env(&[("DAYLOG_TEST_BOOL", value)], || {
                assert_eq!(env_bool("DAYLOG_TEST_BOOL"), want, "value {:?}", value);
            });
        }
    }

    #[test]
    fn test_env_u64() {
        with_env(&[("DAYLOG_TEST_NUM", Some("42"))], || {
            assert_eq!(env_u64("DAYLOG_TEST_NUM"), Some(42));
        });
        with_env(&[("DAYLOG_TEST_NUM", Some("-1"))], || {
            assert_eq!(env_u64("DAYLOG_TEST_NUM"), None);
        });
        with_env(&[("DAYLOG_TEST_NUM", None)], || {
            assert_eq!(env_u64("DAYLOG_TEST_NUM"), None);
        });
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.log.replacement_interval, 30);
        assert!(!config.log.use_list);
        assert_eq!(config.log.log_format, "HH:mm");
        assert_eq!(config.log.debounce_ms, 500);
        assert_eq!(config.header.format, None);
    }

    #[test]
    fn test_persisted_field_names() {
        let yaml = "log:\n  replacementInterval: 90\n  useList: true\n  logFormat: HH:mm:ss\n  debounceMs: 0\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.log.replacement_interval, 90);
        assert!(config.log.use_list);
        assert_eq!(config.log.log_format, "HH:mm:ss");
        assert_eq!(config.log.debounce_ms, 0);
    }

    #[test]
    fn test_apply_env_overrides() {
        with_env(
            &[
                ("DAYLOG_INTERVAL", Some("5")),
                ("DAYLOG_USE_LIST", Some("yes")),
                ("DAYLOG_LOG_FORMAT", None),
                ("DAYLOG_DEBOUNCE_MS", None),
                ("DAYLOG_HEADER_FORMAT", Some("DD.MM.YYYY")),
                ("DAYLOG_QUIET", None),
            ],
            || {
                let mut config = Config::default();
                let applied = apply_env(&mut config);
                assert_eq!(
                    applied,
                    vec!["DAYLOG_INTERVAL", "DAYLOG_USE_LIST", "DAYLOG_HEADER_FORMAT"]
                );
                assert_eq!(config.log.replacement_interval, 5);
                assert!(config.log.use_list);
                assert_eq!(config.header.format.as_deref(), Some("DD.MM.YYYY"));
            },
        );
    }

    #[test]
    fn test_merge_overlay_wins() {
        let mut base = Config::default();
        let mut overlay = Config::default();
        overlay.log.log_format = "HH:mm:ss".to_string();
        overlay.header.format = Some("DD.MM.YYYY".to_string());

        merge(&mut base, &overlay);

        assert_eq!(base.log.log_format, "HH:mm:ss");
        assert_eq!(base.header.format.as_deref(), Some("DD.MM.YYYY"));
        // Other defaults unchanged
        assert_eq!(base.log.replacement_interval, 30);
    }

    #[test]
    fn test_merge_defaults_preserved() {
        let mut base = Config::default();
        base.log.replacement_interval = 120;
        merge(&mut base, &Config::default());
        assert_eq!(base.log.replacement_interval, 120);
    }

    #[test]
    fn test_collect_manifest_paths_root_first() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("notes").join("2024");
        fs::create_dir_all(nested.join(CONFIG_DIR)).unwrap();
        fs::create_dir_all(tmp.path().join(CONFIG_DIR)).unwrap();
        fs::write(tmp.path().join(CONFIG_DIR).join(MANIFEST_FILE), "log:\n  useList: true\n").unwrap();
        fs::write(nested.join(CONFIG_DIR).join(MANIFEST_FILE), "log:\n  logFormat: HH:mm:ss\n").unwrap();

        let paths = collect_manifest_paths(&nested);
        assert_eq!(paths.len(), 2);
        assert!(paths[0].starts_with(tmp.path().canonicalize().unwrap()));
        assert!(paths[1].to_string_lossy().contains("2024"));

        let mut config = Config::default();
        for path in &paths {
            merge(&mut config, &load_manifest(path).unwrap());
        }
        assert!(config.log.use_list);
        assert_eq!(config.log.log_format, "HH:mm:ss");
    }

    #[test]
    fn test_validate() {
        assert!(validate(&Config::default()).is_empty());

        let mut config = Config::default();
        config.log.replacement_interval = 0;
        config.log.log_format = String::new();
        config.header.format = Some("[oops".to_string());
        assert_eq!(validate(&config).len(), 3);
    }

    #[test]
    fn test_validate_flags_out_of_range_durations() {
        let mut config = Config::default();
        config.log.replacement_interval = 10_000_000_000_000_000;
        config.log.debounce_ms = u64::MAX;
        let warnings = validate(&config);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("log.replacementInterval"));
        assert!(warnings[1].starts_with("log.debounceMs"));

        config.log.replacement_interval = 86_400;
        config.log.debounce_ms = 60_000;
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn test_json_schema_generates() {
        let schema = json_schema();
        assert!(schema.contains("Config"));
        assert!(schema.contains("replacementInterval"));
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Default.to_string(), "default");
        assert_eq!(
            ConfigSource::EnvVar("DAYLOG_INTERVAL".to_string()).to_string(),
            "$DAYLOG_INTERVAL"
        );
    }

    #[test]
    fn test_template_manifest_parses() {
        let template = template_manifest();
        assert!(template.contains("# daylog configuration manifest"));
        // Everything is commented out, so it parses to defaults
        let parsed: Option<Config> = serde_yaml::from_str(&template).ok();
        assert!(parsed.is_none_or(|c| c == Config::default()));
    }
}

//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.filechat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FileChatConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub default_row_count: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ROW_COUNT: usize = 10;
pub const DEFAULT_LOG_FILE: &str = "filechat.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub default_row_count: usize,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.filechat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".filechat").join("config.toml"))
}

/// Load config from `~/.filechat/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `FileChatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<FileChatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(FileChatConfig::default());
        }
    };
    load_config_from(&path)
}

/// Load config from an explicit path (same missing/malformed rules as [`load_config`]).
pub fn load_config_from(path: &Path) -> Result<FileChatConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(FileChatConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: FileChatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# File Chat Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://localhost:8000"   # Or set FILECHAT_BASE_URL env var

# [display]
# default_row_count = 10               # Rows per file in the active files view

# [logging]
# file = "filechat.log"
# level = "debug"                      # "error", "warn", "info", "debug", "trace", "off"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` is from the `--base-url` flag (None = not specified).
pub fn resolve(config: &FileChatConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("FILECHAT_BASE_URL").ok())
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // A zero row count would render empty tables, so it falls back to the default
    let default_row_count = config
        .display
        .default_row_count
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_ROW_COUNT);

    let log_file = config
        .logging
        .file
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    let log_level = config
        .logging
        .level
        .as_deref()
        .and_then(parse_level)
        .unwrap_or(DEFAULT_LOG_LEVEL);

    ResolvedConfig {
        base_url,
        default_row_count,
        log_file,
        log_level,
    }
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        other => {
            warn!("Unknown log level '{}', using default", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = FileChatConfig::default();
        assert!(config.server.base_url.is_none());
        assert!(config.display.default_row_count.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = FileChatConfig::default();
        let resolved = resolve(&config, Some(DEFAULT_BASE_URL));
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.default_row_count, DEFAULT_ROW_COUNT);
        assert_eq!(resolved.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(resolved.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_resolve_cli_base_url_wins() {
        let config = FileChatConfig {
            server: ServerConfig {
                base_url: Some("http://config-host:9000".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("http://cli-host:7000"));
        assert_eq!(resolved.base_url, "http://cli-host:7000");
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = FileChatConfig {
            display: DisplayConfig {
                default_row_count: Some(25),
            },
            logging: LoggingConfig {
                file: Some("/tmp/fc.log".to_string()),
                level: Some("WARN".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, None);
        assert_eq!(resolved.default_row_count, 25);
        assert_eq!(resolved.log_file, PathBuf::from("/tmp/fc.log"));
        assert_eq!(resolved.log_level, LevelFilter::Warn);
    }

    #[test]
    fn test_zero_row_count_falls_back_to_default() {
        let config = FileChatConfig {
            display: DisplayConfig {
                default_row_count: Some(0),
            },
            ..Default::default()
        };
        assert_eq!(resolve(&config, None).default_row_count, DEFAULT_ROW_COUNT);
    }

    #[test]
    fn test_unknown_log_level_uses_default() {
        assert_eq!(parse_level("loud"), None);
        assert_eq!(parse_level("trace"), Some(LevelFilter::Trace));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let toml_str = r#"
[server]
base_url = "http://10.0.0.5:8000"
"#;
        let config: FileChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.server.base_url.as_deref(),
            Some("http://10.0.0.5:8000")
        );
        assert!(config.display.default_row_count.is_none());
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_missing_file_generates_default_and_returns_empty() {
        let dir = std::env::temp_dir().join(format!("filechat-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_dir_all(&dir);

        let config = load_config_from(&path).unwrap();
        assert!(config.server.base_url.is_none());
        assert!(path.exists(), "default config should be generated");

        // The generated file is fully commented out, so it parses to defaults too
        let reloaded = load_config_from(&path).unwrap();
        assert!(reloaded.server.base_url.is_none());

        fs::remove_dir_all(&dir).unwrap();
    }
}

//! Configuration loading and resolution
//!
//! Every setting resolves with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`JOURNALLM_*`; a `.env` file is loaded first)
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::format::MAX_INPUT_BYTES;
use crate::generation::anthropic::{DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::generation::GenerationSettings;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_JOB_RETENTION_SECS: u64 = 3600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// API key environment variables, in priority order (`API_KEY` is the
/// historical name and still honored)
const API_KEY_ENV_VARS: &[&str] = &["JOURNALLM_API_KEY", "API_KEY"];

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub bind_address: Option<String>,
    pub max_upload_bytes: Option<u64>,
    pub job_retention_secs: Option<u64>,
    pub logging: LoggingConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved runtime settings
#[derive(Clone)]
pub struct Settings {
    /// Server-side credential; `None` means callers must supply their own
    pub api_key: Option<String>,
    pub generation: GenerationSettings,
    pub bind_address: String,
    pub max_upload_bytes: u64,
    pub job_retention: Duration,
    pub log_level: String,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("generation", &self.generation)
            .field("bind_address", &self.bind_address)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("job_retention", &self.job_retention)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Settings {
    /// Resolve every setting from CLI → environment → TOML → default
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Result<Self> {
        let generation = GenerationSettings {
            base_url: resolve_string(None, "JOURNALLM_API_BASE_URL", toml.api_base_url.as_deref(), DEFAULT_BASE_URL),
            model: resolve_string(cli.model.as_deref(), "JOURNALLM_MODEL", toml.model.as_deref(), DEFAULT_MODEL),
            max_tokens: resolve_parsed("JOURNALLM_MAX_TOKENS", toml.max_tokens, DEFAULT_MAX_TOKENS)?,
            timeout: Duration::from_secs(resolve_parsed(
                "JOURNALLM_REQUEST_TIMEOUT_SECS",
                toml.request_timeout_secs,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
        };

        Ok(Self {
            api_key: resolve_api_key(cli.api_key.as_deref(), toml),
            generation,
            bind_address: resolve_string(
                cli.bind_address.as_deref(),
                "JOURNALLM_BIND_ADDRESS",
                toml.bind_address.as_deref(),
                DEFAULT_BIND_ADDRESS,
            ),
            max_upload_bytes: resolve_parsed("JOURNALLM_MAX_UPLOAD_BYTES", toml.max_upload_bytes, MAX_INPUT_BYTES)?,
            job_retention: Duration::from_secs(resolve_parsed(
                "JOURNALLM_JOB_RETENTION_SECS",
                toml.job_retention_secs,
                DEFAULT_JOB_RETENTION_SECS,
            )?),
            log_level: resolve_string(
                cli.log_level.as_deref(),
                "JOURNALLM_LOG_LEVEL",
                Some(toml.logging.level.as_str()),
                "info",
            ),
        })
    }
}

/// Load `.env` from the working directory if present
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }
}

/// Platform config file location (`~/.config/journallm/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("journallm").join("config.toml"))
}

/// Load the TOML config
///
/// An explicit path must exist. Without one the platform default is used
/// when present, otherwise compiled defaults apply.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => path,
            None => {
                debug!("No config file found, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve the generation API key
///
/// **Priority:** CLI → `JOURNALLM_API_KEY` → `API_KEY` → TOML.
/// Blank values are ignored at every tier.
pub fn resolve_api_key(cli_arg: Option<&str>, toml: &TomlConfig) -> Option<String> {
    let mut candidates: Vec<(&str, String)> = Vec::new();

    if let Some(key) = cli_arg.filter(|k| is_valid_key(k)) {
        candidates.push(("command line", key.to_string()));
    }
    for name in API_KEY_ENV_VARS {
        if let Some(key) = std::env::var(name).ok().filter(|k| is_valid_key(k)) {
            candidates.push(("environment", key));
        }
    }
    if let Some(key) = toml.api_key.as_deref().filter(|k| is_valid_key(k)) {
        candidates.push(("TOML", key.to_string()));
    }

    if candidates.len() > 1 {
        let sources: Vec<_> = candidates.iter().map(|(s, _)| *s).collect();
        debug!(
            "API key found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    candidates.into_iter().next().map(|(source, key)| {
        info!("API key loaded from {}", source);
        key.trim().to_string()
    })
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn resolve_string(cli: Option<&str>, env_name: &str, toml: Option<&str>, default: &str) -> String {
    cli.map(str::to_string)
        .or_else(|| std::env::var(env_name).ok().filter(|v| !v.trim().is_empty()))
        .or_else(|| toml.map(str::to_string))
        .unwrap_or_else(|| default.to_string())
}

fn resolve_parsed<T>(env_name: &str, toml: Option<T>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(env_name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{env_name}='{raw}' is invalid: {e}"))),
        _ => Ok(toml.unwrap_or(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "JOURNALLM_API_KEY",
            "API_KEY",
            "JOURNALLM_MODEL",
            "JOURNALLM_BIND_ADDRESS",
            "JOURNALLM_MAX_UPLOAD_BYTES",
            "JOURNALLM_MAX_TOKENS",
            "JOURNALLM_JOB_RETENTION_SECS",
            "JOURNALLM_REQUEST_TIMEOUT_SECS",
            "JOURNALLM_LOG_LEVEL",
            "JOURNALLM_API_BASE_URL",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let settings = Settings::resolve(&CliOverrides::default(), &TomlConfig::default()).unwrap();
        assert!(settings.api_key.is_none());
        assert_eq!(settings.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(settings.max_upload_bytes, MAX_INPUT_BYTES);
        assert_eq!(settings.generation.model, DEFAULT_MODEL);
        assert_eq!(settings.job_retention, Duration::from_secs(3600));
        assert_eq!(settings.generation.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.generation.timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_partial_logging_table_parses() {
        let config: TomlConfig = toml::from_str("model = \"m\"\n[logging]\n").unwrap();
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.model.as_deref(), Some("m"));
    }

    #[test]
    #[serial]
    fn test_api_key_priority() {
        clear_env();
        let toml = TomlConfig {
            api_key: Some("toml-key".to_string()),
            ..TomlConfig::default()
        };
        assert_eq!(resolve_api_key(None, &toml).as_deref(), Some("toml-key"));

        std::env::set_var("API_KEY", "legacy-env-key");
        assert_eq!(resolve_api_key(None, &toml).as_deref(), Some("legacy-env-key"));

        std::env::set_var("JOURNALLM_API_KEY", "env-key");
        assert_eq!(resolve_api_key(None, &toml).as_deref(), Some("env-key"));

        assert_eq!(resolve_api_key(Some("cli-key"), &toml).as_deref(), Some("cli-key"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_blank_keys_ignored() {
        clear_env();
        std::env::set_var("JOURNALLM_API_KEY", "   ");
        let toml = TomlConfig {
            api_key: Some(String::new()),
            ..TomlConfig::default()
        };
        assert!(resolve_api_key(Some(""), &toml).is_none());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_numeric_env_is_config_error() {
        clear_env();
        std::env::set_var("JOURNALLM_MAX_UPLOAD_BYTES", "lots");
        let err = Settings::resolve(&CliOverrides::default(), &TomlConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_beats_env_beats_toml() {
        clear_env();
        let toml = TomlConfig {
            bind_address: Some("0.0.0.0:8000".to_string()),
            model: Some("toml-model".to_string()),
            ..TomlConfig::default()
        };
        std::env::set_var("JOURNALLM_BIND_ADDRESS", "127.0.0.1:9000");

        let cli = CliOverrides {
            model: Some("cli-model".to_string()),
            ..CliOverrides::default()
        };
        let settings = Settings::resolve(&cli, &toml).unwrap();
        assert_eq!(settings.bind_address, "127.0.0.1:9000");
        assert_eq!(settings.generation.model, "cli-model");
        clear_env();
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let settings = Settings {
            api_key: Some("sk-123".to_string()),
            generation: GenerationSettings::default(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_upload_bytes: MAX_INPUT_BYTES,
            job_retention: Duration::from_secs(1),
            log_level: "info".to_string(),
        };
        assert!(!format!("{settings:?}").contains("sk-123"));
    }
}

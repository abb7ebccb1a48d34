//! Configuration loader
//!
//! Loads [`AppConfig`] from defaults, a TOML file and environment
//! variables using Figment.

use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use zonewatch_domain::error::{Error, Result};

use crate::config::AppConfig;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_loaded, parse_log_level};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    #[must_use]
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (explicit path, or the first default location found)
    /// 3. Environment variables with prefix, `__` between nested keys
    ///    (e.g., `ZONEWATCH_EVENT_BUS__NATS_URL`)
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(path) = self.resolved_path() {
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
                log_config_loaded(&path, true);
            } else {
                log_config_loaded(&path, false);
            }
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR),
        );

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;

        Ok(app_config)
    }

    /// Reload configuration (used by the file watcher)
    pub fn reload(&self) -> Result<AppConfig> {
        self.load()
    }

    /// Write `config` as TOML to `path`
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let content = render_toml(config)?;
        std::fs::write(path.as_ref(), content).io_context(format!(
            "Failed to write configuration to {}",
            path.as_ref().display()
        ))
    }

    /// File that `load` reads, if any
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.config_path
            .clone()
            .or_else(Self::find_default_config_path)
    }

    /// Get the explicitly configured file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Find default configuration file paths to try
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(
                current_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            ),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `config` as pretty TOML
pub fn render_toml(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).config_context("Failed to serialize configuration")
}

/// Validate application configuration
fn validate_app_config(config: &AppConfig) -> Result<()> {
    parse_log_level(&config.logging.level)?;
    validate_resilience_config(config)?;
    validate_event_bus_config(config)?;
    validate_frames_config(config)?;
    validate_options(config)?;
    Ok(())
}

fn validate_resilience_config(config: &AppConfig) -> Result<()> {
    let resilience = &config.resilience;
    if resilience.failure_threshold == 0 {
        return Err(Error::configuration(
            "resilience.failure_threshold must be at least 1",
        ));
    }
    if resilience.base_cooldown_secs == 0 {
        return Err(Error::configuration(
            "resilience.base_cooldown_secs must be at least 1",
        ));
    }
    if resilience.max_cooldown_secs < resilience.base_cooldown_secs {
        return Err(Error::configuration(
            "resilience.max_cooldown_secs cannot be lower than base_cooldown_secs",
        ));
    }
    Ok(())
}

fn validate_event_bus_config(config: &AppConfig) -> Result<()> {
    let bus = &config.event_bus;
    if bus.topic_prefix.trim_matches('/').is_empty() {
        return Err(Error::configuration("event_bus.topic_prefix cannot be empty"));
    }
    if bus.reconnect_base_delay_ms == 0 || bus.reconnect_max_delay_ms < bus.reconnect_base_delay_ms
    {
        return Err(Error::configuration(
            "event_bus reconnect delays must satisfy 0 < base <= max",
        ));
    }
    Ok(())
}

fn validate_frames_config(config: &AppConfig) -> Result<()> {
    use crate::config::FrameSourceKind;

    match config.frames.source {
        FrameSourceKind::Http if config.frames.base_url.is_none() => Err(Error::configuration(
            "frames.base_url is required for the http frame source",
        )),
        FrameSourceKind::File if config.frames.directory.is_none() => Err(Error::configuration(
            "frames.directory is required for the file frame source",
        )),
        _ => Ok(()),
    }
}

fn validate_options(config: &AppConfig) -> Result<()> {
    if config.options.is_object() {
        Ok(())
    } else {
        Err(Error::configuration("options must be a table"))
    }
}

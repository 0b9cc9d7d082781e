//! TOML-based configuration for the `keyhook` binary.
//!
//! Reads and writes [`HookConfig`] from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\keyhook\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/keyhook/config.toml` or `~/.config/keyhook/config.toml`
//! - macOS:    `~/Library/Application Support/keyhook/config.toml`
//!
//! Example:
//!
//! ```toml
//! [hooks]
//! keyboard = true
//! mouse = false
//!
//! [logging]
//! level = "debug"
//!
//! [[bindings]]
//! trigger = "A"
//! held = ["Lcontrol"]
//! message = "Ctrl + A was pressed"
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section or a
//! missing key all fall back to the demonstration bindings and both hooks
//! enabled.

use std::path::{Path, PathBuf};

use keyhook_core::{KeyId, MouseButtonId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::bindings::{Binding, Trigger};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HookConfig {
    #[serde(default)]
    pub hooks: HooksConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_bindings")]
    pub bindings: Vec<Binding>,
}

/// Which low-level hooks to install.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HooksConfig {
    #[serde(default = "default_true")]
    pub keyboard: bool,
    #[serde(default = "default_true")]
    pub mouse: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"keyhook=debug"`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_bindings() -> Vec<Binding> {
    vec![
        Binding::new(
            Trigger::Key(KeyId::A),
            vec![KeyId::Lcontrol],
            "Ctrl + A was pressed",
        ),
        Binding::new(Trigger::Key(KeyId::K), Vec::new(), "Lwin was pressed"),
        Binding::new(
            Trigger::Mouse(MouseButtonId::RButton),
            Vec::new(),
            "Right button pressed",
        ),
    ]
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            hooks: HooksConfig::default(),
            logging: LoggingConfig::default(),
            bindings: default_bindings(),
        }
    }
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            keyboard: default_true(),
            mouse: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the config from the default location.
pub fn load_config() -> Result<HookConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads [`HookConfig`] from `path`, returning [`HookConfig::default()`] if
/// the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<HookConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HookConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &HookConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("keyhook"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("keyhook"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("keyhook")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

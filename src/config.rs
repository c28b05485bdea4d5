//! Configuration loading and types for keyclack
//!
//! Configuration is loaded in layers:
//! 1. Built-in defaults
//! 2. Config file (~/.config/keyclack/config.toml)
//! 3. Environment variables (KEYCLACK_*)
//! 4. CLI arguments (highest priority)

use crate::error::KeyclackError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = r#"# Keyclack Configuration
#
# Location: ~/.config/keyclack/config.toml
# All settings can be overridden via CLI flags

# State file for external integrations (Waybar, polybar, etc.)
# Use "auto" for default location ($XDG_RUNTIME_DIR/keyclack/state),
# a custom path, or "disabled" to turn off. The daemon writes
# "active" or "paused" to this file whenever feedback is toggled.
state_file = "auto"

# Start with feedback paused; resume with Ctrl+Shift+F12 or SIGUSR1
# start_paused = false

[hook]
# Enable the kernel-level keyboard hook (default: true)
# Requires the user to be in the 'input' group:
#   sudo usermod -aG input $USER
# enabled = true

[sound]
# Sound theme: "default" (generated clicks) or a path to a directory
# of per-cue .wav files (type.wav, hold.wav, shift.wav, ...)
theme = "default"

# Volume level (0.0 to 1.0)
volume = 0.7

# Maximum number of concurrently playing voices
max_voices = 5
"#;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub hook: HookConfig,

    #[serde(default)]
    pub sound: SoundConfig,

    /// Start with feedback paused instead of active
    #[serde(default)]
    pub start_paused: bool,

    /// Optional path to state file for external integrations.
    /// When set, the daemon writes "active"/"paused" to this file
    /// whenever feedback is toggled.
    /// Use "auto" for the default location, or "disabled" to turn off.
    #[serde(default)]
    pub state_file: Option<String>,
}

/// Keyboard hook configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HookConfig {
    /// Enable the kernel-level keyboard hook (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Sound playback configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SoundConfig {
    /// Sound theme: "default" or a path to a theme directory
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Volume level (0.0 to 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Maximum number of concurrently playing voices
    #[serde(default = "default_max_voices")]
    pub max_voices: usize,
}

fn default_true() -> bool {
    true
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_volume() -> f32 {
    0.7
}

fn default_max_voices() -> usize {
    crate::sound::pool::DEFAULT_MAX_VOICES
}

impl Default for HookConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            volume: default_volume(),
            max_voices: default_max_voices(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hook: HookConfig::default(),
            sound: SoundConfig::default(),
            start_paused: false,
            state_file: Some("auto".to_string()),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "keyclack")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the runtime directory for ephemeral files (state)
    pub fn runtime_dir() -> PathBuf {
        std::env::var("XDG_RUNTIME_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
            .join("keyclack")
    }

    /// Resolve the state file path from config.
    /// Returns None if not configured or explicitly disabled.
    pub fn resolve_state_file(&self) -> Option<PathBuf> {
        self.state_file
            .as_ref()
            .and_then(|path| match path.to_lowercase().as_str() {
                "disabled" | "none" | "off" | "false" => None,
                "auto" => Some(Self::runtime_dir().join("state")),
                _ => Some(PathBuf::from(path)),
            })
    }
}

/// Load configuration from file, with defaults for missing values
pub fn load_config(path: Option<&Path>) -> Result<Config, KeyclackError> {
    let mut config = Config::default();

    let config_path = path.map(PathBuf::from).or_else(Config::default_path);

    if let Some(ref path) = config_path {
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            let contents = std::fs::read_to_string(path)
                .map_err(|e| KeyclackError::Config(format!("Failed to read config: {}", e)))?;

            config = toml::from_str(&contents)
                .map_err(|e| KeyclackError::Config(format!("Invalid config: {}", e)))?;
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
        }
    }

    // Override from environment variables
    if let Ok(theme) = std::env::var("KEYCLACK_THEME") {
        config.sound.theme = theme;
    }
    if let Ok(volume) = std::env::var("KEYCLACK_VOLUME") {
        match volume.parse::<f32>() {
            Ok(v) if (0.0..=1.0).contains(&v) => config.sound.volume = v,
            _ => {
                return Err(KeyclackError::Config(format!(
                    "KEYCLACK_VOLUME must be a number between 0.0 and 1.0, got '{}'",
                    volume
                )))
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.hook.enabled);
        assert_eq!(config.sound.theme, "default");
        assert_eq!(config.sound.max_voices, 5);
        assert!(!config.start_paused);
        assert_eq!(config.state_file.as_deref(), Some("auto"));
    }

    #[test]
    fn test_default_config_string_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.sound.volume, 0.7);
        assert_eq!(config.sound.max_voices, 5);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
            start_paused = true

            [hook]
            enabled = false

            [sound]
            theme = "/home/me/.local/share/keyclack/thock"
            volume = 0.4
            max_voices = 8
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(!config.hook.enabled);
        assert!(config.start_paused);
        assert_eq!(config.sound.theme, "/home/me/.local/share/keyclack/thock");
        assert_eq!(config.sound.volume, 0.4);
        assert_eq!(config.sound.max_voices, 8);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("state_file = \"disabled\"").unwrap();
        assert!(config.hook.enabled);
        assert_eq!(config.sound.max_voices, 5);
        assert_eq!(config.resolve_state_file(), None);
    }

    #[test]
    fn test_resolve_state_file() {
        let mut config = Config::default();
        assert!(config
            .resolve_state_file()
            .unwrap()
            .ends_with("keyclack/state"));

        config.state_file = Some("/run/me/keystate".to_string());
        assert_eq!(
            config.resolve_state_file(),
            Some(PathBuf::from("/run/me/keystate"))
        );

        config.state_file = None;
        assert_eq!(config.resolve_state_file(), None);
    }
}

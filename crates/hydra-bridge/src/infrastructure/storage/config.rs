//! TOML-based configuration persistence for the bridge.
//!
//! Reads and writes [`AppConfig`] at the platform-appropriate path:
//! - Windows:  `%APPDATA%\Hydra\config.toml`
//! - Linux:    `~/.config/hydra/config.toml`
//! - macOS:    `~/Library/Application Support/Hydra/config.toml`
//!
//! ```toml
//! [bridge]
//! mouse_sensitivity = 1.5
//! char_delay_ms = 10
//!
//! [serial]
//! device = "/dev/ttyACM0"
//!
//! [peer_names]
//! "F0:CD:31:B0:4F:75" = "phone"
//! ```
//!
//! Every field has a default, so an empty or partial file is valid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hydra_core::BdAddr;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::application::forward_input::ForwardSettings;
use crate::application::type_text::TypingDelays;
use crate::infrastructure::serial::LinkTimings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level bridge configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub bridge: BridgeSettings,
    #[serde(default)]
    pub serial: SerialSettings,
    /// Operator nicknames keyed by canonical central address.
    #[serde(default)]
    pub peer_names: BTreeMap<String, String>,
}

/// Input translation and logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeSettings {
    /// Schema version string.
    #[serde(default = "default_version")]
    pub version: String,
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Multiplier applied to captured mouse motion.
    #[serde(default = "default_sensitivity")]
    pub mouse_sensitivity: f32,
    /// How long a typed key stays down.
    #[serde(default = "default_key_press_delay_ms")]
    pub key_press_delay_ms: u64,
    /// Pause after each typed character.
    #[serde(default = "default_char_delay_ms")]
    pub char_delay_ms: u64,
    /// Upper bound on mouse reports per second.
    #[serde(default = "default_mouse_rate_hz")]
    pub mouse_rate_hz: u32,
}

/// Serial link settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialSettings {
    /// Port path.  When absent the port is found by USB product string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default = "default_product_name")]
    pub product_name: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_purge_window_ms")]
    pub purge_window_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_version() -> String {
    "1.0".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_sensitivity() -> f32 {
    1.0
}
fn default_key_press_delay_ms() -> u64 {
    5
}
fn default_char_delay_ms() -> u64 {
    10
}
fn default_mouse_rate_hz() -> u32 {
    crate::application::coalesce::DEFAULT_RATE_HZ
}
fn default_product_name() -> String {
    "Board CDC".to_string()
}
fn default_baud_rate() -> u32 {
    115_200
}
fn default_response_timeout_ms() -> u64 {
    1000
}
fn default_settle_ms() -> u64 {
    100
}
fn default_purge_window_ms() -> u64 {
    10
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: default_log_level(),
            mouse_sensitivity: default_sensitivity(),
            key_press_delay_ms: default_key_press_delay_ms(),
            char_delay_ms: default_char_delay_ms(),
            mouse_rate_hz: default_mouse_rate_hz(),
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            device: None,
            product_name: default_product_name(),
            baud_rate: default_baud_rate(),
            response_timeout_ms: default_response_timeout_ms(),
            settle_ms: default_settle_ms(),
            purge_window_ms: default_purge_window_ms(),
        }
    }
}

// ── Conversions into application settings ─────────────────────────────────────

impl BridgeSettings {
    pub fn forward_settings(&self) -> ForwardSettings {
        ForwardSettings {
            mouse_sensitivity: self.mouse_sensitivity,
            mouse_rate_hz: self.mouse_rate_hz,
        }
    }

    pub fn typing_delays(&self) -> TypingDelays {
        TypingDelays {
            key_press: Duration::from_millis(self.key_press_delay_ms),
            between_chars: Duration::from_millis(self.char_delay_ms),
        }
    }
}

impl SerialSettings {
    pub fn link_timings(&self) -> LinkTimings {
        LinkTimings {
            response_timeout: Duration::from_millis(self.response_timeout_ms),
            settle: Duration::from_millis(self.settle_ms),
            purge_window: Duration::from_millis(self.purge_window_ms),
        }
    }
}

impl AppConfig {
    /// Nicknames keyed by parsed address.  Entries whose key is not a valid
    /// address are skipped with a warning.
    pub fn peer_name_map(&self) -> BTreeMap<BdAddr, String> {
        self.peer_names
            .iter()
            .filter_map(|(key, name)| match key.parse::<BdAddr>() {
                Ok(addr) => Some((addr, name.clone())),
                Err(e) => {
                    warn!(key = %key, error = %e, "ignoring peer name with invalid address");
                    None
                }
            })
            .collect()
    }

    /// Replaces the stored nicknames.
    pub fn set_peer_names(&mut self, names: &BTreeMap<BdAddr, String>) {
        self.peer_names = names
            .iter()
            .map(|(addr, name)| (addr.to_string(), name.clone()))
            .collect();
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

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating the parent directory if needed.
pub fn save_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
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
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Hydra"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("hydra"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Hydra")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_config_path() -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("hydra_test_{}", Uuid::new_v4()));
        let path = dir.join("nested").join("config.toml");
        (dir, path)
    }

    #[test]
    fn test_app_config_default_matches_documented_values() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.bridge.log_level, "info");
        assert_eq!(cfg.bridge.mouse_sensitivity, 1.0);
        assert_eq!(cfg.bridge.key_press_delay_ms, 5);
        assert_eq!(cfg.bridge.char_delay_ms, 10);
        assert_eq!(cfg.bridge.mouse_rate_hz, 60);
        assert_eq!(cfg.serial.device, None);
        assert_eq!(cfg.serial.product_name, "Board CDC");
        assert_eq!(cfg.serial.baud_rate, 115_200);
        assert!(cfg.peer_names.is_empty());
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        // Arrange
        let toml_str = r#"
[bridge]
mouse_sensitivity = 2.5

[serial]
device = "COM7"
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.bridge.mouse_sensitivity, 2.5);
        assert_eq!(cfg.bridge.char_delay_ms, 10);
        assert_eq!(cfg.serial.device.as_deref(), Some("COM7"));
        assert_eq!(cfg.serial.response_timeout_ms, 1000);
    }

    #[test]
    fn test_absent_device_is_omitted_from_toml() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(!toml_str.contains("device"));
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        // Arrange
        let (dir, path) = temp_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let result = load_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_missing_file_returns_default() {
        let (_dir, path) = temp_config_path();
        assert_eq!(load_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_to_then_load_from_keeps_peer_names() {
        // Arrange
        let (dir, path) = temp_config_path();
        let phone: BdAddr = "F0:CD:31:B0:4F:75".parse().unwrap();
        let mut names = BTreeMap::new();
        names.insert(phone, "phone".to_string());
        let mut cfg = AppConfig::default();
        cfg.set_peer_names(&names);
        cfg.bridge.log_level = "debug".to_string();

        // Act
        save_to(&cfg, &path).unwrap();
        let loaded = load_from(&path).unwrap();

        // Assert
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.peer_name_map(), names);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_peer_name_map_skips_invalid_addresses() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.peer_names
            .insert("not-an-address".to_string(), "ghost".to_string());
        cfg.peer_names
            .insert("C0:FF:EE:00:00:01".to_string(), "laptop".to_string());

        // Act
        let map = cfg.peer_name_map();

        // Assert
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get(&BdAddr::new([0xC0, 0xFF, 0xEE, 0, 0, 1])).map(String::as_str),
            Some("laptop")
        );
    }

    #[test]
    fn test_settings_convert_to_application_types() {
        // Arrange
        let cfg = AppConfig::default();

        // Act
        let delays = cfg.bridge.typing_delays();
        let timings = cfg.serial.link_timings();
        let forward = cfg.bridge.forward_settings();

        // Assert
        assert_eq!(delays.key_press, Duration::from_millis(5));
        assert_eq!(delays.between_chars, Duration::from_millis(10));
        assert_eq!(timings, LinkTimings::default());
        assert_eq!(forward.mouse_rate_hz, 60);
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
    }
}

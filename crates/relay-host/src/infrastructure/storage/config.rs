//! TOML-based configuration persistence for the controlling host.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\InputRelay\config.toml`
//! - Linux:    `~/.config/inputrelay/config.toml`
//! - macOS:    `~/Library/Application Support/InputRelay/config.toml`
//!
//! Example:
//!
//! ```toml
//! selected_target = 0
//!
//! [host]
//! log_level = "info"
//!
//! [capture]
//! forward_queue_capacity = 1024
//! suppress_while_forwarding = true
//!
//! [[targets]]
//! kind = "socket"
//! host = "192.168.1.20"
//! port = 4020
//!
//! [[targets]]
//! kind = "wireless"
//! device_name = "Living room tablet"
//! service_class = "computer"
//! hardware_address = "A4:C1:38:00:11:22"
//! service_id = "00001101-0000-1000-8000-00805f9b34fb"
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.  This allows
//! the app to work on first run (before a config file exists) and when
//! upgrading from an older config file that is missing newer fields.

use std::path::{Path, PathBuf};

use relay_core::DeviceEndpoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

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

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Index into `targets` of the target selected at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_target: Option<usize>,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Saved remote targets, in the order the user arranged them.
    #[serde(default)]
    pub targets: Vec<DeviceEndpoint>,
}

/// General host behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostConfig {
    /// Schema version string – bump when breaking changes are introduced.
    #[serde(default = "default_version")]
    pub version: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Input capture settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// Capacity of the channel between the hook thread and the relay task.
    /// Events are dropped (not blocked on) when it is full.
    #[serde(default = "default_queue_capacity")]
    pub forward_queue_capacity: usize,
    /// Suppress captured events locally while they are being forwarded.
    #[serde(default = "default_true")]
    pub suppress_while_forwarding: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_version() -> String {
    "1.0".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_queue_capacity() -> usize {
    1024
}
fn default_true() -> bool {
    true
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: default_log_level(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            forward_queue_capacity: default_queue_capacity(),
            suppress_while_forwarding: default_true(),
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
fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(&config_file_path()?, config)
}

/// Persists `config` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
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
    })?;
    Ok(())
}

/// Resolves the platform config base directory including the `InputRelay` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("InputRelay"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("inputrelay"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("InputRelay")
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
    use relay_core::{
        HardwareAddress, ServiceClass, SocketAddress, SocketEndpoint, WirelessEndpoint,
        SERIAL_PORT_SERVICE,
    };
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("relay_test_{}", Uuid::new_v4()))
    }

    // ── AppConfig defaults ────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_capture_settings() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.capture.forward_queue_capacity, 1024);
        assert!(cfg.capture.suppress_while_forwarding);
        assert_eq!(cfg.host.log_level, "info");
    }

    #[test]
    fn test_app_config_default_has_no_targets() {
        let cfg = AppConfig::default();
        assert!(cfg.targets.is_empty());
        assert_eq!(cfg.selected_target, None);
    }

    // ── TOML round-trip ───────────────────────────────────────────────────────

    #[test]
    fn test_app_config_with_targets_round_trips() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.selected_target = Some(1);
        cfg.capture.forward_queue_capacity = 64;
        cfg.targets.push(DeviceEndpoint::Socket(SocketEndpoint::bound(
            SocketAddress::new("192.168.1.20", 4020),
        )));
        cfg.targets.push(DeviceEndpoint::Wireless(WirelessEndpoint::new(
            "tablet",
            ServiceClass::Computer,
            HardwareAddress::new([0xA4, 0xC1, 0x38, 0x00, 0x11, 0x22]),
            SERIAL_PORT_SERVICE,
        )));

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
        assert_eq!(restored.targets[1].display_name(), "tablet");
    }

    #[test]
    fn test_unselected_target_is_omitted_from_toml() {
        let cfg = AppConfig::default();

        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");

        assert!(!toml_str.contains("selected_target"));
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_capture_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[capture]
forward_queue_capacity = 16
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.capture.forward_queue_capacity, 16);
        // Unspecified fields keep their defaults
        assert!(cfg.capture.suppress_while_forwarding);
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── load / save via temp directory ────────────────────────────────────────

    #[test]
    fn test_load_config_returns_default_when_file_absent() {
        let path = temp_dir().join("config.toml");

        let result = load_config_from(&path);

        assert_eq!(result.unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_and_load_config_round_trip_via_temp_dir() {
        // Arrange: the parent directory does not exist yet
        let dir = temp_dir();
        let path = dir.join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.host.log_level = "debug".to_string();
        cfg.targets
            .push(DeviceEndpoint::Socket(SocketEndpoint::unbound()));

        // Act
        save_config_to(&path, &cfg).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── config_dir path formation ─────────────────────────────────────────────

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
        // NoPlatformConfigDir (e.g. in a stripped CI env) is also acceptable.
    }
}

//! Configuration file support for ob6
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/ob6/config.toml`
//! - macOS: `~/Library/Application Support/ob6/config.toml`
//! - Windows: `%APPDATA%\ob6\config.toml`

use crate::error::{Error, Result};
use directories::ProjectDirs;
use ob6_sysex::tuning::DEVICE_ID_BROADCAST;
use ob6_sysex::MidiChannel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# ob6 configuration file

[device]
# MIDI channel the OB-6 listens on (1-16, 0 = omni)
channel = 1

# Device id for MIDI Tuning Standard messages (127 = all devices)
tuning_device_id = 127

[output]
# How built messages are written: "hex" prints them, "syx" writes files
format = "hex"

# With format = "syx", write one file per message instead of one file
file_per_message = false
"#;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceSettings,
    pub output: OutputSettings,
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!("Config file not found at {:?}", path)));
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::debug!("Using default configuration: {}", e);
            Self::default()
        })
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "ob6") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(Error::Config("Could not determine config directory".to_string()))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        Self::write_default_config(&path)?;
        Ok(path)
    }

    pub fn write_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG)?;
        Ok(())
    }
}

/// Device settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// MIDI channel (1-16, 0 = omni)
    pub channel: u8,
    /// MTS device id
    pub tuning_device_id: u8,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            channel: 1,
            tuning_device_id: DEVICE_ID_BROADCAST,
        }
    }
}

impl DeviceSettings {
    pub fn midi_channel(&self) -> Result<MidiChannel> {
        MidiChannel::from_setting_byte(self.channel).ok_or_else(|| {
            Error::Config(format!(
                "channel must be 0 (omni) or 1-16, got {}",
                self.channel
            ))
        })
    }
}

/// How built messages are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Space separated hex on stdout
    #[default]
    Hex,
    /// Raw `.syx` files
    Syx,
}

/// Output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub file_per_message: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.device.channel, 1);
        assert_eq!(config.device.tuning_device_id, 0x7f);
        assert_eq!(config.output.format, OutputFormat::Hex);
        assert!(!config.output.file_per_message);
    }

    #[test]
    fn test_default_file_matches_default_config() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.device.channel = 0;
        config.output.format = OutputFormat::Syx;
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.device.midi_channel().unwrap(), MidiChannel::Omni);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output]\nformat = \"syx\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.output.format, OutputFormat::Syx);
        assert_eq!(loaded.device, DeviceSettings::default());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let result = Config::load_from(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_channel() {
        let settings = DeviceSettings {
            channel: 17,
            ..DeviceSettings::default()
        };
        assert!(settings.midi_channel().is_err());
    }
}

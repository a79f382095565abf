//! Engine configuration.
//!
//! ```toml
//! sample_rate = 44100
//! block_size = 256
//! channels = 2
//! flavor = "vocal"
//! log_filter = "dynamix=debug"
//! preset_dirs = ["/srv/presets"]
//! ```

use std::path::{Path, PathBuf};

use dynamix_dynamics::{Flavor, MAX_CHANNELS};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Lowest accepted sample rate (Hz).
pub const MIN_SAMPLE_RATE: f32 = 8000.0;
/// Highest accepted sample rate (Hz).
pub const MAX_SAMPLE_RATE: f32 = 384_000.0;
/// Largest accepted block size.
pub const MAX_BLOCK_SIZE: usize = 65536;

/// Runtime settings for a processing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Frames per processing block.
    pub block_size: usize,
    /// Channel count.
    pub channels: usize,
    /// Flavour to instantiate.
    pub flavor: Flavor,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
    /// Extra preset directories, searched before the user and system ones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preset_dirs: Vec<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            block_size: 512,
            channels: 2,
            flavor: Flavor::Modern,
            log_filter: "info".to_string(),
            preset_dirs: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Check every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite()
            || !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate)
        {
            return Err(ConfigError::invalid_config(
                "sample_rate",
                format!(
                    "{} Hz is outside {MIN_SAMPLE_RATE}..={MAX_SAMPLE_RATE}",
                    self.sample_rate
                ),
            ));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::invalid_config(
                "block_size",
                format!("{} is outside 1..={MAX_BLOCK_SIZE}", self.block_size),
            ));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(ConfigError::invalid_config(
                "channels",
                format!("{} is outside 1..={MAX_CHANNELS}", self.channels),
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::invalid_config("log_filter", "must not be empty"));
        }
        Ok(())
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string. Missing fields take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no engine config, using defaults");
            Ok(Self::default())
        }
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Convert to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.sample_rate, 48000.0);
        assert_eq!(config.block_size, 512);
        assert_eq!(config.channels, 2);
        assert_eq!(config.flavor, Flavor::Modern);
        assert_eq!(config.log_filter, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml("flavor = \"vocal\"\nchannels = 1").unwrap();
        assert_eq!(config.flavor, Flavor::Vocal);
        assert_eq!(config.channels, 1);
        assert_eq!(config.block_size, 512);
    }

    #[test]
    fn test_integer_sample_rate() {
        let config = EngineConfig::from_toml("sample_rate = 44100").unwrap();
        assert_eq!(config.sample_rate, 44100.0);
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let cases = [
            ("sample_rate = 100.0", "sample_rate"),
            ("block_size = 0", "block_size"),
            ("channels = 9", "channels"),
            ("channels = 0", "channels"),
            ("log_filter = \"  \"", "log_filter"),
        ];
        for (toml_str, expected) in cases {
            match EngineConfig::from_toml(toml_str) {
                Err(ConfigError::InvalidConfig { field, .. }) => assert_eq!(field, expected),
                other => panic!("{toml_str}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = EngineConfig {
            flavor: Flavor::Multiband,
            preset_dirs: vec![PathBuf::from("/tmp/presets")],
            ..EngineConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert!(text.contains("flavor = \"multiband\""));
        assert_eq!(EngineConfig::from_toml(&text).unwrap(), config);
    }
}

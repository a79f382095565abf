//! Engine configuration and preset management for dynamix.
//!
//! - [`Preset`]: a TOML document holding a partial parameter map for one
//!   flavour. Applying it writes each entry through the parameter layer.
//! - [`PresetLibrary`]: resolves a name to a factory preset, a file in a
//!   preset directory, or a literal path, in that order.
//! - [`EngineConfig`]: sample rate, block size, channels, flavour and log
//!   filter for a processing session.
//!
//! # Example
//!
//! ```rust
//! use dynamix_config::{Preset, PresetLibrary};
//! use dynamix_dynamics::{DynamicsProcessor, Flavor};
//!
//! let preset = Preset::from_toml(r#"
//!     name = "Tight"
//!     flavor = "modern"
//!     [params]
//!     threshold = -22.0
//!     ratio = 6.0
//! "#).unwrap();
//!
//! let processor = DynamicsProcessor::new(Flavor::Modern, 48000.0, 2);
//! assert_eq!(preset.apply(&processor), 2);
//!
//! let (radio, _) = PresetLibrary::new().find("vocal-radio").unwrap();
//! assert_eq!(radio.flavor, Flavor::Vocal);
//! ```

mod engine;
mod error;
mod library;
mod preset;

/// Platform-specific paths for presets and configuration.
pub mod paths;

pub use engine::{EngineConfig, MAX_BLOCK_SIZE, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
pub use error::ConfigError;
pub use library::{PresetEntry, PresetLibrary, PresetSource};
pub use paths::{
    APP_NAME, ensure_user_presets_dir, list_presets_in_dir, preset_name_from_path,
    system_presets_dir, user_config_dir, user_config_file, user_presets_dir,
};
pub use preset::Preset;

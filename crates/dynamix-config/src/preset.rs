//! Preset file format and operations.

use std::collections::BTreeMap;
use std::path::Path;

use dynamix_dynamics::{DynamicsProcessor, FactoryPreset, Flavor, ParamKey, ParameterStore};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A partial parameter map for one flavour.
///
/// Applying a preset writes each entry through the parameter layer, so
/// parameters it leaves out keep their current values.
///
/// # TOML Format
///
/// ```toml
/// name = "Warm Bus"
/// description = "Slow vintage glue"
/// flavor = "vintage"
/// tags = ["bus", "warm"]
///
/// [params]
/// threshold = -16.0
/// ratio = 3.0
/// warmth = 45.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Flavour the parameters belong to.
    #[serde(default)]
    pub flavor: Flavor,

    /// Search tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Parameter ID to value.
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
}

impl Preset {
    /// Create an empty preset for `flavor`.
    pub fn new(name: impl Into<String>, flavor: Flavor) -> Self {
        Self {
            name: name.into(),
            description: None,
            flavor,
            tags: Vec::new(),
            params: BTreeMap::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set one parameter.
    pub fn with_param(mut self, id: impl Into<String>, value: f32) -> Self {
        self.params.insert(id.into(), value);
        self
    }

    /// Copy a compiled-in preset.
    pub fn from_factory(preset: &FactoryPreset) -> Self {
        Self {
            name: preset.name.to_string(),
            description: Some(preset.description.to_string()),
            flavor: preset.flavor,
            tags: preset.tags.iter().map(|t| (*t).to_string()).collect(),
            params: preset
                .params
                .iter()
                .map(|(id, value)| ((*id).to_string(), *value))
                .collect(),
        }
    }

    /// Capture every current value of a processor.
    pub fn capture(name: impl Into<String>, processor: &DynamicsProcessor) -> Self {
        let mut preset = Self::new(name, processor.flavor());
        preset.params = processor
            .parameters()
            .into_iter()
            .map(|entry| (entry.key.id().to_string(), entry.value))
            .collect();
        preset
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating parent directories.
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

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every entry names a parameter of the flavour and holds a finite
    /// value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let store = ParameterStore::new(self.flavor);
        for (id, value) in &self.params {
            let reason = match id.parse::<ParamKey>() {
                Err(_) => Some(format!("unknown parameter for flavor {}", self.flavor)),
                Ok(key) if store.descriptor(key).is_none() => {
                    Some(format!("not a {} parameter", self.flavor))
                }
                Ok(_) if !value.is_finite() => Some(format!("non-finite value {value}")),
                Ok(_) => None,
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidParameter {
                    preset: self.name.clone(),
                    param: id.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Apply the entries to a processor. Unknown IDs are skipped with a
    /// warning. Returns how many entries were applied.
    pub fn apply(&self, processor: &DynamicsProcessor) -> usize {
        if self.flavor != processor.flavor() {
            tracing::warn!(
                preset = %self.name,
                preset_flavor = %self.flavor,
                target = %processor.flavor(),
                "applying preset to a different flavor"
            );
        }
        let applied = processor
            .params()
            .apply(self.params.iter().map(|(id, value)| (id.as_str(), *value)));
        tracing::debug!(preset = %self.name, applied, total = self.params.len(), "preset applied");
        applied
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True if the preset sets nothing.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled", Flavor::default())
    }
}

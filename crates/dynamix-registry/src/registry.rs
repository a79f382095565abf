//! Registry of processor constructors.

use std::fmt;

use dynamix_core::ParameterInfo;
use dynamix_dynamics::{DynamicsProcessor, EngineError, FACTORY_PRESETS, FactoryPreset, Flavor};

use crate::error::RegistryError;

/// Constructor stored in the registry: `(sample_rate, channels)`.
pub type ProcessorFactory =
    Box<dyn Fn(f32, usize) -> Result<DynamicsProcessor, EngineError> + Send + Sync>;

/// Describes a registered processor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorDescriptor {
    /// Unique identifier (lowercase, no spaces).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Brief description.
    pub description: String,
    /// Flavour the processor is built from.
    pub flavor: Flavor,
    /// Number of parameters.
    pub param_count: usize,
}

struct RegistryEntry {
    descriptor: ProcessorDescriptor,
    factory: ProcessorFactory,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Registry of available processors.
///
/// [`ProcessorRegistry::new`] registers the four flavours under their IDs.
/// The registry is an ordinary value: whoever owns the processing graph
/// builds one and passes it by reference.
#[derive(Debug)]
pub struct ProcessorRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorRegistry {
    /// Registry with one entry per flavour.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(Flavor::ALL.len()),
        };
        for flavor in Flavor::ALL {
            let descriptor = ProcessorDescriptor {
                id: flavor.id().to_string(),
                name: flavor.name().to_string(),
                description: flavor.description().to_string(),
                flavor,
                param_count: DynamicsProcessor::new(flavor, 48000.0, 1).param_count(),
            };
            registry.entries.push(RegistryEntry {
                descriptor,
                factory: Box::new(move |sr, ch| DynamicsProcessor::try_new(flavor, sr, ch)),
            });
        }
        registry
    }

    /// Registry with the flavours and every factory preset.
    pub fn with_factory_presets() -> Self {
        let mut registry = Self::new();
        for preset in FACTORY_PRESETS {
            if let Err(err) = registry.register_preset(preset) {
                tracing::warn!(preset = preset.id, %err, "skipping factory preset");
            }
        }
        registry
    }

    /// Register a custom constructor.
    pub fn register<F>(
        &mut self,
        descriptor: ProcessorDescriptor,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(f32, usize) -> Result<DynamicsProcessor, EngineError> + Send + Sync + 'static,
    {
        if self.descriptor(&descriptor.id).is_some() {
            return Err(RegistryError::Duplicate(descriptor.id));
        }
        tracing::debug!(id = %descriptor.id, flavor = %descriptor.flavor, "processor registered");
        self.entries.push(RegistryEntry {
            descriptor,
            factory: Box::new(factory),
        });
        Ok(())
    }

    /// Register a factory preset as its own entry.
    pub fn register_preset(&mut self, preset: &'static FactoryPreset) -> Result<(), RegistryError> {
        let flavor = preset.flavor;
        let descriptor = ProcessorDescriptor {
            id: preset.id.to_string(),
            name: preset.name.to_string(),
            description: preset.description.to_string(),
            flavor,
            param_count: DynamicsProcessor::new(flavor, 48000.0, 1).param_count(),
        };
        self.register(descriptor, move |sr, ch| {
            let processor = DynamicsProcessor::try_new(flavor, sr, ch)?;
            processor.load_preset(preset);
            Ok(processor)
        })
    }

    /// Descriptors of every entry, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &ProcessorDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// IDs of every entry, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.all().map(|d| d.id.as_str())
    }

    /// Entries built from `flavor`.
    pub fn for_flavor(&self, flavor: Flavor) -> impl Iterator<Item = &ProcessorDescriptor> {
        self.all().filter(move |d| d.flavor == flavor)
    }

    /// Descriptor by ID (case-insensitive).
    pub fn descriptor(&self, id: &str) -> Option<&ProcessorDescriptor> {
        self.entry(id).map(|e| &e.descriptor)
    }

    fn entry(&self, id: &str) -> Option<&RegistryEntry> {
        let id = id.trim();
        self.entries
            .iter()
            .find(|e| e.descriptor.id.eq_ignore_ascii_case(id))
    }

    /// Build a processor, reporting why construction failed.
    pub fn try_create(
        &self,
        id: &str,
        sample_rate: f32,
        channels: usize,
    ) -> Result<DynamicsProcessor, RegistryError> {
        let entry = self
            .entry(id)
            .ok_or_else(|| RegistryError::UnknownProcessor(id.to_string()))?;
        Ok((entry.factory)(sample_rate, channels)?)
    }

    /// Build a processor, or `None` for an unknown ID or unsupported channel
    /// count.
    pub fn create(&self, id: &str, sample_rate: f32, channels: usize) -> Option<DynamicsProcessor> {
        self.try_create(id, sample_rate, channels)
            .map_err(|err| tracing::warn!(id, %err, "cannot create processor"))
            .ok()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = ProcessorRegistry::new();
        assert_eq!(registry.len(), 4);
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, ["vintage", "modern", "vocal", "multiband"]);
    }

    #[test]
    fn test_create_each_flavor() {
        let registry = ProcessorRegistry::new();
        for descriptor in registry.all() {
            let processor = registry.create(&descriptor.id, 44100.0, 2);
            let processor = processor.unwrap();
            assert_eq!(processor.flavor(), descriptor.flavor);
            assert_eq!(processor.channels(), 2);
            assert_eq!(processor.param_count(), descriptor.param_count);
        }
    }

    #[test]
    fn test_unknown_and_invalid() {
        let registry = ProcessorRegistry::new();
        assert!(registry.create("fuzz", 48000.0, 2).is_none());
        assert!(registry.create("modern", 48000.0, 0).is_none());
        assert_eq!(
            registry.try_create("fuzz", 48000.0, 2).err(),
            Some(RegistryError::UnknownProcessor("fuzz".into()))
        );
        assert!(matches!(
            registry.try_create("vocal", 48000.0, 99),
            Err(RegistryError::Engine(EngineError::UnsupportedChannels(99)))
        ));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ProcessorRegistry::new();
        assert_eq!(
            registry.descriptor("MultiBand").map(|d| d.flavor),
            Some(Flavor::Multiband)
        );
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = ProcessorRegistry::new();
        let descriptor = ProcessorDescriptor {
            id: "bus-glue".into(),
            name: "Bus Glue".into(),
            description: "Slow modern compression".into(),
            flavor: Flavor::Modern,
            param_count: 0,
        };
        registry
            .register(descriptor.clone(), |sr, ch| {
                let p = DynamicsProcessor::try_new(Flavor::Modern, sr, ch)?;
                p.set_parameter("release", 180.0);
                Ok(p)
            })
            .unwrap();
        assert_eq!(
            registry.register(descriptor, |sr, ch| {
                DynamicsProcessor::try_new(Flavor::Modern, sr, ch)
            }),
            Err(RegistryError::Duplicate("bus-glue".into()))
        );
        let p = registry.create("bus-glue", 48000.0, 1).unwrap();
        assert_eq!(p.get_parameter("release"), Some(180.0));
        assert_eq!(registry.for_flavor(Flavor::Modern).count(), 2);
    }

    #[test]
    fn test_factory_presets_registered() {
        let registry = ProcessorRegistry::with_factory_presets();
        assert_eq!(registry.len(), 4 + FACTORY_PRESETS.len());
        let p = registry.create("vocal-podcast", 48000.0, 1).unwrap();
        assert_eq!(p.flavor(), Flavor::Vocal);
        assert_eq!(p.get_parameter("threshold"), Some(-24.0));
        assert_eq!(p.get_parameter("breath_control"), Some(60.0));
    }
}

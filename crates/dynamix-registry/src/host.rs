//! Host capability: load processors into slots and drive them.
//!
//! [`NativeHost`] is the boundary a transport or plugin bridge would call
//! through. [`InProcessHost`] is the production implementation: it builds
//! processors from a borrowed [`ProcessorRegistry`] and calls them directly.

use std::collections::BTreeMap;
use std::fmt;

use dynamix_core::BlockProcessor;
use dynamix_dynamics::{AnalysisSnapshot, DynamicsProcessor};

use crate::error::HostError;
use crate::registry::ProcessorRegistry;

/// Identifies a loaded processor within a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Load, unload, parameterize and run processors by slot.
pub trait NativeHost {
    /// Build `processor_id` into an empty slot.
    fn load(
        &mut self,
        slot: SlotId,
        processor_id: &str,
        sample_rate: f32,
        channels: usize,
    ) -> Result<(), HostError>;

    /// Drop the processor in `slot`.
    fn unload(&mut self, slot: SlotId) -> Result<(), HostError>;

    /// Set a parameter. Returns the stored (clamped) value, or `None` for
    /// an unknown parameter ID.
    fn set_parameter(
        &mut self,
        slot: SlotId,
        id: &str,
        value: f32,
    ) -> Result<Option<f32>, HostError>;

    /// Read a parameter. `None` for an empty slot or unknown ID.
    fn get_parameter(&self, slot: SlotId, id: &str) -> Option<f32>;

    /// Process one block of planar audio.
    fn process(
        &mut self,
        slot: SlotId,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
    ) -> Result<(), HostError>;

    /// Latest metering of the processor in `slot`.
    fn analysis(&self, slot: SlotId) -> Option<AnalysisSnapshot>;
}

/// Host that runs processors in the calling thread.
#[derive(Debug)]
pub struct InProcessHost<'r> {
    registry: &'r ProcessorRegistry,
    slots: BTreeMap<SlotId, DynamicsProcessor>,
}

impl<'r> InProcessHost<'r> {
    /// Empty host building processors from `registry`.
    pub fn new(registry: &'r ProcessorRegistry) -> Self {
        Self {
            registry,
            slots: BTreeMap::new(),
        }
    }

    /// Occupied slots, ascending.
    pub fn slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.slots.keys().copied()
    }

    /// The processor in `slot`.
    pub fn processor(&self, slot: SlotId) -> Option<&DynamicsProcessor> {
        self.slots.get(&slot)
    }

    /// Mutable access to the processor in `slot`.
    pub fn processor_mut(&mut self, slot: SlotId) -> Option<&mut DynamicsProcessor> {
        self.slots.get_mut(&slot)
    }

    /// Total latency (samples) of the processor in `slot`.
    pub fn latency(&self, slot: SlotId) -> Option<usize> {
        self.slots.get(&slot).map(BlockProcessor::latency_samples)
    }

    /// Unload everything.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    fn occupied_mut(&mut self, slot: SlotId) -> Result<&mut DynamicsProcessor, HostError> {
        self.slots.get_mut(&slot).ok_or(HostError::NotLoaded(slot))
    }
}

impl NativeHost for InProcessHost<'_> {
    fn load(
        &mut self,
        slot: SlotId,
        processor_id: &str,
        sample_rate: f32,
        channels: usize,
    ) -> Result<(), HostError> {
        if self.slots.contains_key(&slot) {
            return Err(HostError::AlreadyLoaded(slot));
        }
        let processor = self.registry.try_create(processor_id, sample_rate, channels)?;
        tracing::info!(%slot, processor_id, sample_rate, channels, "processor loaded");
        self.slots.insert(slot, processor);
        Ok(())
    }

    fn unload(&mut self, slot: SlotId) -> Result<(), HostError> {
        self.slots
            .remove(&slot)
            .map(|_| tracing::info!(%slot, "processor unloaded"))
            .ok_or(HostError::NotLoaded(slot))
    }

    fn set_parameter(
        &mut self,
        slot: SlotId,
        id: &str,
        value: f32,
    ) -> Result<Option<f32>, HostError> {
        Ok(self.occupied_mut(slot)?.set_parameter(id, value))
    }

    fn get_parameter(&self, slot: SlotId, id: &str) -> Option<f32> {
        self.slots.get(&slot)?.get_parameter(id)
    }

    fn process(
        &mut self,
        slot: SlotId,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
    ) -> Result<(), HostError> {
        Ok(self.occupied_mut(slot)?.try_process(input, output)?)
    }

    fn analysis(&self, slot: SlotId) -> Option<AnalysisSnapshot> {
        self.slots.get(&slot).map(DynamicsProcessor::analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynamix_dynamics::EngineError;

    #[test]
    fn test_load_and_unload() {
        let registry = ProcessorRegistry::new();
        let mut host = InProcessHost::new(&registry);
        host.load(SlotId(1), "vintage", 48000.0, 2).unwrap();
        assert_eq!(
            host.load(SlotId(1), "modern", 48000.0, 2),
            Err(HostError::AlreadyLoaded(SlotId(1)))
        );
        host.load(SlotId(0), "modern", 48000.0, 1).unwrap();
        assert_eq!(host.slots().collect::<Vec<_>>(), [SlotId(0), SlotId(1)]);

        host.unload(SlotId(1)).unwrap();
        assert_eq!(host.unload(SlotId(1)), Err(HostError::NotLoaded(SlotId(1))));
        assert!(host.processor(SlotId(1)).is_none());
    }

    #[test]
    fn test_load_failures_leave_slot_empty() {
        let registry = ProcessorRegistry::new();
        let mut host = InProcessHost::new(&registry);
        assert!(matches!(
            host.load(SlotId(0), "nope", 48000.0, 2),
            Err(HostError::UnknownProcessor(_))
        ));
        assert!(host.load(SlotId(0), "vocal", 48000.0, 0).is_err());
        assert_eq!(host.slots().count(), 0);
    }

    #[test]
    fn test_parameters_through_host() {
        let registry = ProcessorRegistry::new();
        let mut host = InProcessHost::new(&registry);
        host.load(SlotId(7), "modern", 48000.0, 2).unwrap();
        assert_eq!(host.set_parameter(SlotId(7), "ratio", 50.0), Ok(Some(20.0)));
        assert_eq!(host.set_parameter(SlotId(7), "warmth", 10.0), Ok(None));
        assert_eq!(host.get_parameter(SlotId(7), "ratio"), Some(20.0));
        assert_eq!(host.get_parameter(SlotId(8), "ratio"), None);
        assert_eq!(
            host.set_parameter(SlotId(8), "ratio", 2.0),
            Err(HostError::NotLoaded(SlotId(8)))
        );
    }

    #[test]
    fn test_process_through_host() {
        let registry = ProcessorRegistry::new();
        let mut host = InProcessHost::new(&registry);
        host.load(SlotId(0), "modern", 48000.0, 1).unwrap();
        host.set_parameter(SlotId(0), "lookahead", 5.0).unwrap();

        let input = vec![0.25f32; 256];
        let mut output = vec![0.0f32; 256];
        host.process(SlotId(0), &[&input[..]], &mut [&mut output[..]]).unwrap();
        assert!(output.iter().all(|y| y.is_finite()));
        assert_eq!(host.latency(SlotId(0)), Some(240));
        assert!(host.analysis(SlotId(0)).is_some_and(|a| a.rms_level > 0.2));

        let mut short = vec![0.0f32; 128];
        assert!(matches!(
            host.process(SlotId(0), &[&input[..]], &mut [&mut short[..]]),
            Err(HostError::Engine(EngineError::LengthMismatch { .. }))
        ));
    }
}

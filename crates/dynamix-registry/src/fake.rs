//! A recording [`NativeHost`] for tests of code that drives a host.
//!
//! It never builds a processor: `process` copies input to output and
//! parameters are stored unclamped.

use std::collections::{BTreeMap, HashMap};

use dynamix_dynamics::AnalysisSnapshot;

use crate::error::HostError;
use crate::host::{NativeHost, SlotId};

/// A call received by [`FakeHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    /// `load(slot, processor_id, sample_rate, channels)`
    Load(SlotId, String, f32, usize),
    /// `unload(slot)`
    Unload(SlotId),
    /// `set_parameter(slot, id, value)`
    SetParameter(SlotId, String, f32),
    /// `process(slot, channels, frames)`
    Process(SlotId, usize, usize),
}

/// Host stand-in that records every call.
#[derive(Debug, Default)]
pub struct FakeHost {
    calls: Vec<HostCall>,
    slots: BTreeMap<SlotId, HashMap<String, f32>>,
}

impl FakeHost {
    /// Empty fake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Forget recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl NativeHost for FakeHost {
    fn load(
        &mut self,
        slot: SlotId,
        processor_id: &str,
        sample_rate: f32,
        channels: usize,
    ) -> Result<(), HostError> {
        self.calls
            .push(HostCall::Load(slot, processor_id.to_string(), sample_rate, channels));
        if self.slots.contains_key(&slot) {
            return Err(HostError::AlreadyLoaded(slot));
        }
        self.slots.insert(slot, HashMap::new());
        Ok(())
    }

    fn unload(&mut self, slot: SlotId) -> Result<(), HostError> {
        self.calls.push(HostCall::Unload(slot));
        self.slots
            .remove(&slot)
            .map(drop)
            .ok_or(HostError::NotLoaded(slot))
    }

    fn set_parameter(
        &mut self,
        slot: SlotId,
        id: &str,
        value: f32,
    ) -> Result<Option<f32>, HostError> {
        self.calls
            .push(HostCall::SetParameter(slot, id.to_string(), value));
        let params = self.slots.get_mut(&slot).ok_or(HostError::NotLoaded(slot))?;
        params.insert(id.to_string(), value);
        Ok(Some(value))
    }

    fn get_parameter(&self, slot: SlotId, id: &str) -> Option<f32> {
        self.slots.get(&slot)?.get(id).copied()
    }

    fn process(
        &mut self,
        slot: SlotId,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
    ) -> Result<(), HostError> {
        let frames = input.first().map_or(0, |c| c.len());
        self.calls.push(HostCall::Process(slot, input.len(), frames));
        if !self.slots.contains_key(&slot) {
            return Err(HostError::NotLoaded(slot));
        }
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            let n = inp.len().min(out.len());
            out[..n].copy_from_slice(&inp[..n]);
        }
        Ok(())
    }

    fn analysis(&self, slot: SlotId) -> Option<AnalysisSnapshot> {
        self.slots.get(&slot).map(|_| AnalysisSnapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_copies() {
        let mut host = FakeHost::new();
        host.load(SlotId(2), "vocal", 44100.0, 1).unwrap();
        host.set_parameter(SlotId(2), "ratio", 99.0).unwrap();
        let input = [0.1f32, -0.2, 0.3];
        let mut output = [0.0f32; 3];
        host.process(SlotId(2), &[&input[..]], &mut [&mut output[..]]).unwrap();
        assert_eq!(output, input);
        assert_eq!(host.get_parameter(SlotId(2), "ratio"), Some(99.0));
        assert_eq!(
            host.calls(),
            [
                HostCall::Load(SlotId(2), "vocal".into(), 44100.0, 1),
                HostCall::SetParameter(SlotId(2), "ratio".into(), 99.0),
                HostCall::Process(SlotId(2), 1, 3),
            ]
        );
        host.unload(SlotId(2)).unwrap();
        assert!(host.analysis(SlotId(2)).is_none());
    }
}

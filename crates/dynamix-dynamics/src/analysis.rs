//! Per-block metering published from the audio thread.
//!
//! The processor measures input and output once per block, builds an
//! [`AnalysisSnapshot`] and publishes it to an [`AnalysisCell`]. Readers on
//! any thread take a copy through an [`AnalysisHandle`].
//!
//! The cell is a sequence lock over `AtomicU32` fields: the writer bumps the
//! sequence to odd, stores the fields, then bumps it to even. A reader
//! retries while the sequence is odd or moved during its read, up to
//! [`MAX_READ_ATTEMPTS`], and then returns what it last read. The writer
//! never waits.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering, fence};

use dynamix_core::level_to_db;

use crate::band_splitter::NUM_BANDS;

/// Reader retries before settling for the last values seen.
pub const MAX_READ_ATTEMPTS: usize = 8;

const SCALAR_FIELDS: usize = 7;
const FIELD_COUNT: usize = SCALAR_FIELDS + 2 * NUM_BANDS;

/// RMS and peak of a block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Levels {
    /// RMS over all channels (linear).
    pub rms: f32,
    /// Peak `|x|` over all channels (linear).
    pub peak: f32,
}

impl Levels {
    /// Measure planar channel buffers. Non-finite samples count as silence.
    pub fn measure<C: AsRef<[f32]>>(channels: &[C]) -> Self {
        let mut sum_sq = 0.0f64;
        let mut count = 0usize;
        let mut peak = 0.0f32;
        for channel in channels {
            for &x in channel.as_ref() {
                let x = if x.is_finite() { x.abs() } else { 0.0 };
                sum_sq += f64::from(x) * f64::from(x);
                peak = peak.max(x);
            }
            count += channel.as_ref().len();
        }
        let rms = if count > 0 {
            (sum_sq / count as f64).sqrt() as f32
        } else {
            0.0
        };
        Self { rms, peak }
    }
}

/// Metering values for the most recent block.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisSnapshot {
    /// Input RMS (dBFS, -96 floor).
    pub input_level: f32,
    /// Output RMS (dBFS, -96 floor).
    pub output_level: f32,
    /// Gain reduction at the end of the block (dB, ≥ 0).
    pub gain_reduction: f32,
    /// Input RMS (linear).
    pub rms_level: f32,
    /// Input peak (linear, clamped to 1).
    pub peak_level: f32,
    /// Input crest factor `20·log10(peak / (rms + 0.001))` (dB), 0 when silent.
    pub dynamic_range: f32,
    /// Output peak (linear).
    pub output_peak: f32,
    /// Per-band RMS (dBFS), multiband only.
    pub band_levels: [f32; NUM_BANDS],
    /// Per-band gain reduction (dB), multiband only.
    pub band_reductions: [f32; NUM_BANDS],
}

impl Default for AnalysisSnapshot {
    fn default() -> Self {
        Self {
            input_level: dynamix_core::SILENCE_DB,
            output_level: dynamix_core::SILENCE_DB,
            gain_reduction: 0.0,
            rms_level: 0.0,
            peak_level: 0.0,
            dynamic_range: 0.0,
            output_peak: 0.0,
            band_levels: [dynamix_core::SILENCE_DB; NUM_BANDS],
            band_reductions: [0.0; NUM_BANDS],
        }
    }
}

impl AnalysisSnapshot {
    /// Build a snapshot from block levels and the final gain reduction.
    pub fn from_levels(input: Levels, output: Levels, gain_reduction: f32) -> Self {
        let dynamic_range = if input.peak > 0.0 {
            (20.0 * (input.peak / (input.rms + 0.001)).log10()).max(0.0)
        } else {
            0.0
        };
        Self {
            input_level: level_to_db(input.rms),
            output_level: level_to_db(output.rms),
            gain_reduction: gain_reduction.max(0.0),
            rms_level: input.rms,
            peak_level: input.peak.min(1.0),
            dynamic_range,
            output_peak: output.peak,
            ..Self::default()
        }
    }

    fn to_fields(self) -> [f32; FIELD_COUNT] {
        let mut fields = [0.0; FIELD_COUNT];
        fields[..SCALAR_FIELDS].copy_from_slice(&[
            self.input_level,
            self.output_level,
            self.gain_reduction,
            self.rms_level,
            self.peak_level,
            self.dynamic_range,
            self.output_peak,
        ]);
        fields[SCALAR_FIELDS..SCALAR_FIELDS + NUM_BANDS].copy_from_slice(&self.band_levels);
        fields[SCALAR_FIELDS + NUM_BANDS..].copy_from_slice(&self.band_reductions);
        fields
    }

    fn from_fields(f: &[f32; FIELD_COUNT]) -> Self {
        let mut band_levels = [0.0; NUM_BANDS];
        let mut band_reductions = [0.0; NUM_BANDS];
        band_levels.copy_from_slice(&f[SCALAR_FIELDS..SCALAR_FIELDS + NUM_BANDS]);
        band_reductions.copy_from_slice(&f[SCALAR_FIELDS + NUM_BANDS..]);
        Self {
            input_level: f[0],
            output_level: f[1],
            gain_reduction: f[2],
            rms_level: f[3],
            peak_level: f[4],
            dynamic_range: f[5],
            output_peak: f[6],
            band_levels,
            band_reductions,
        }
    }
}

/// Lock-free single-writer snapshot cell.
#[derive(Debug)]
pub struct AnalysisCell {
    seq: AtomicU32,
    fields: [AtomicU32; FIELD_COUNT],
}

impl Default for AnalysisCell {
    fn default() -> Self {
        let cell = Self {
            seq: AtomicU32::new(0),
            fields: core::array::from_fn(|_| AtomicU32::new(0)),
        };
        cell.publish(&AnalysisSnapshot::default());
        cell
    }
}

impl AnalysisCell {
    /// Cell holding the default (silent) snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot. Only one thread may publish.
    pub fn publish(&self, snapshot: &AnalysisSnapshot) {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);
        for (slot, value) in self.fields.iter().zip(snapshot.to_fields()) {
            slot.store(value.to_bits(), Ordering::Relaxed);
        }
        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    /// Copy out the latest snapshot.
    pub fn load(&self) -> AnalysisSnapshot {
        let mut values = [0.0f32; FIELD_COUNT];
        for _ in 0..MAX_READ_ATTEMPTS {
            let before = self.seq.load(Ordering::Acquire);
            for (value, slot) in values.iter_mut().zip(self.fields.iter()) {
                *value = f32::from_bits(slot.load(Ordering::Relaxed));
            }
            fence(Ordering::Acquire);
            let after = self.seq.load(Ordering::Relaxed);
            if before == after && before % 2 == 0 {
                break;
            }
            std::hint::spin_loop();
        }
        AnalysisSnapshot::from_fields(&values)
    }
}

/// Cloneable read handle to a processor's analysis.
#[derive(Debug, Clone)]
pub struct AnalysisHandle(Arc<AnalysisCell>);

impl AnalysisHandle {
    /// Latest snapshot.
    pub fn get(&self) -> AnalysisSnapshot {
        self.0.load()
    }
}

/// Builds and publishes one snapshot per block.
#[derive(Debug)]
pub struct AnalysisReporter {
    cell: Arc<AnalysisCell>,
    last: AnalysisSnapshot,
}

impl Default for AnalysisReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisReporter {
    /// Reporter with a fresh cell.
    pub fn new() -> Self {
        Self {
            cell: Arc::new(AnalysisCell::new()),
            last: AnalysisSnapshot::default(),
        }
    }

    /// Handle for readers.
    pub fn handle(&self) -> AnalysisHandle {
        AnalysisHandle(Arc::clone(&self.cell))
    }

    /// Most recent snapshot published by this reporter.
    pub fn last(&self) -> AnalysisSnapshot {
        self.last
    }

    /// Publish `snapshot`, replacing the previous one.
    pub fn report(&mut self, snapshot: AnalysisSnapshot) {
        self.last = snapshot;
        self.cell.publish(&snapshot);
    }

    /// Publish the silent default.
    pub fn clear(&mut self) {
        self.report(AnalysisSnapshot::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_measure() {
        let a = [0.5f32, -0.5, 0.5, -0.5];
        let b = [0.0f32, 0.0, f32::NAN, 1.0];
        let levels = Levels::measure(&[&a[..], &b[..]]);
        assert_eq!(levels.peak, 1.0);
        let expected = ((4.0 * 0.25 + 1.0) / 8.0f32).sqrt();
        assert!((levels.rms - expected).abs() < 1e-6);
    }

    #[test]
    fn test_silent_snapshot() {
        let snap = AnalysisSnapshot::from_levels(Levels::default(), Levels::default(), 0.0);
        assert_eq!(snap.input_level, -96.0);
        assert_eq!(snap.output_level, -96.0);
        assert_eq!(snap.dynamic_range, 0.0);
        assert_eq!(snap.gain_reduction, 0.0);
    }

    #[test]
    fn test_peak_clamped_and_crest() {
        let input = Levels { rms: 0.5, peak: 2.0 };
        let snap = AnalysisSnapshot::from_levels(input, input, 3.0);
        assert_eq!(snap.peak_level, 1.0);
        assert_eq!(snap.output_peak, 2.0);
        let crest = 20.0 * (2.0f32 / 0.501).log10();
        assert!((snap.dynamic_range - crest).abs() < 1e-4);
    }

    #[test]
    fn test_cell_roundtrip() {
        let cell = AnalysisCell::new();
        assert_eq!(cell.load(), AnalysisSnapshot::default());
        let mut snap = AnalysisSnapshot::from_levels(
            Levels { rms: 0.1, peak: 0.3 },
            Levels { rms: 0.05, peak: 0.2 },
            4.5,
        );
        snap.band_levels = [-10.0, -20.0, -30.0, -40.0];
        snap.band_reductions = [1.0, 2.0, 3.0, 4.0];
        cell.publish(&snap);
        assert_eq!(cell.load(), snap);
    }

    #[test]
    fn test_handle_sees_latest_report() {
        let mut reporter = AnalysisReporter::new();
        let handle = reporter.handle();
        let other = handle.clone();
        for i in 0..5 {
            let mut snap = AnalysisSnapshot::default();
            snap.gain_reduction = i as f32;
            reporter.report(snap);
        }
        assert_eq!(handle.get().gain_reduction, 4.0);
        assert_eq!(other.get(), reporter.last());
        reporter.clear();
        assert_eq!(handle.get(), AnalysisSnapshot::default());
    }

    #[test]
    fn test_handle_readable_from_another_thread() {
        let mut reporter = AnalysisReporter::new();
        let handle = reporter.handle();
        let mut snap = AnalysisSnapshot::default();
        snap.output_peak = 0.75;
        reporter.report(snap);
        let seen = std::thread::spawn(move || handle.get().output_peak).join();
        assert_eq!(seen.ok(), Some(0.75));
    }
}

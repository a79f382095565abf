//! Source-type classification from spectral and dynamic features.

use std::fmt;

use serde::Serialize;

use crate::spectrum::largest_peaks;

/// Peaks summed into the harmonic-content measure.
pub const HARMONIC_PEAKS: usize = 10;

/// Window (samples) used for transient counting.
pub const TRANSIENT_WINDOW: usize = 512;

/// RMS jump between consecutive windows that counts as a transient.
pub const TRANSIENT_RATIO: f32 = 3.0;

/// Upper bound of the fundamental search (Hz).
pub const FUNDAMENTAL_MAX_HZ: f32 = 500.0;

/// Minimum amplitude of a fundamental.
pub const FUNDAMENTAL_MIN_AMPLITUDE: f32 = 0.01;

/// Crest factor (dB) above which a source counts as dynamic.
pub const DYNAMIC_CREST_DB: f32 = 12.0;

/// Kind of source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Voice.
    Vocal,
    /// Drums or percussion.
    Drums,
    /// Bass instrument.
    Bass,
    /// Guitar.
    Guitar,
    /// Keys or other bright material.
    Keys,
    /// No rule matched.
    Unknown,
}

impl SourceType {
    /// Lower-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            SourceType::Vocal => "vocal",
            SourceType::Drums => "drums",
            SourceType::Bass => "bass",
            SourceType::Guitar => "guitar",
            SourceType::Keys => "keys",
            SourceType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result with the features that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceCharacteristics {
    /// Detected type.
    #[serde(rename = "type")]
    pub source_type: SourceType,
    /// Rule confidence in [0, 1].
    pub confidence: f32,
    /// Share of spectral amplitude in the largest peaks, [0, 1].
    pub harmonic_content: f32,
    /// Transient density, [0, 1].
    pub transient_content: f32,
    /// Strongest component below 500 Hz, if loud enough (Hz).
    pub fundamental_frequency: Option<f32>,
    /// Spectral centroid (Hz).
    pub spectral_centroid: f32,
    /// Crest factor above [`DYNAMIC_CREST_DB`].
    pub is_dynamic: bool,
}

impl Default for SourceCharacteristics {
    fn default() -> Self {
        Self {
            source_type: SourceType::Unknown,
            confidence: 0.5,
            harmonic_content: 0.0,
            transient_content: 0.0,
            fundamental_frequency: None,
            spectral_centroid: 0.0,
            is_dynamic: false,
        }
    }
}

/// Amplitude share of the [`HARMONIC_PEAKS`] largest local maxima.
pub fn harmonic_content(amplitudes: &[f32]) -> f32 {
    let peaks: f32 = largest_peaks(amplitudes, HARMONIC_PEAKS)
        .into_iter()
        .map(|i| amplitudes[i])
        .sum();
    let total: f32 = amplitudes.iter().sum();
    peaks / (total + 1e-10)
}

/// Transient density: RMS jumps per 100 windows, capped at 1.
pub fn transient_content(signal: &[f32]) -> f32 {
    let jumps = crate::dynamics::count_level_jumps(signal, TRANSIENT_WINDOW, TRANSIENT_RATIO);
    (jumps as f32 / 100.0).min(1.0)
}

/// Frequency of the strongest bin in `(0, 500 Hz)`, when it exceeds
/// [`FUNDAMENTAL_MIN_AMPLITUDE`].
pub fn detect_fundamental(amplitudes: &[f32], sample_rate: f32, fft_size: usize) -> Option<f32> {
    let resolution = sample_rate / fft_size.max(1) as f32;
    let last = ((FUNDAMENTAL_MAX_HZ / resolution) as usize).min(amplitudes.len());
    let (bin, &amplitude) = amplitudes
        .get(1..last)?
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))?;
    (amplitude > FUNDAMENTAL_MIN_AMPLITUDE).then(|| (bin + 1) as f32 * resolution)
}

/// Apply the classification rules in priority order.
pub fn classify(
    harmonic: f32,
    transient: f32,
    fundamental: Option<f32>,
    centroid: f32,
) -> (SourceType, f32) {
    match fundamental {
        Some(f) if harmonic > 0.7 && f > 80.0 && f < 1000.0 => (SourceType::Vocal, 0.85),
        None if transient > 0.7 => (SourceType::Drums, 0.8),
        Some(f) if f < 200.0 => (SourceType::Bass, 0.75),
        Some(f) if harmonic > 0.6 && f > 200.0 => (SourceType::Guitar, 0.7),
        _ if centroid > 2000.0 => (SourceType::Keys, 0.65),
        _ => (SourceType::Unknown, 0.5),
    }
}

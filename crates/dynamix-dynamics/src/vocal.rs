//! Vocal side-chain: voice-type timing, de-esser and breath control.

use core::fmt;
use core::str::FromStr;

use dynamix_core::time_constant_coeff;

use crate::error::ParseParamError;

/// Labels for the vocal type choice parameter, in index order.
pub const VOCAL_TYPE_LABELS: &[&str] = &["Auto", "Male", "Female", "Rap", "Sung"];

/// Voice character. Fixed types pin attack/release; `Auto` lets the
/// adaptive controller choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VocalType {
    /// Adaptive timing.
    #[default]
    Auto,
    /// 10 ms / 100 ms.
    Male,
    /// 7 ms / 80 ms.
    Female,
    /// 3 ms / 40 ms.
    Rap,
    /// 12 ms / 120 ms.
    Sung,
}

impl VocalType {
    /// All types in parameter index order.
    pub const ALL: [VocalType; 5] = [
        VocalType::Auto,
        VocalType::Male,
        VocalType::Female,
        VocalType::Rap,
        VocalType::Sung,
    ];

    /// Type for a (rounded, clamped) parameter value.
    pub fn from_index(value: f32) -> Self {
        let index = if value.is_finite() {
            value.round().clamp(0.0, (Self::ALL.len() - 1) as f32) as usize
        } else {
            0
        };
        Self::ALL[index]
    }

    /// Parameter index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        VOCAL_TYPE_LABELS[self.index()]
    }

    /// Fixed `(attack_ms, release_ms)`, or `None` for `Auto`.
    pub const fn timings(self) -> Option<(f32, f32)> {
        match self {
            VocalType::Auto => None,
            VocalType::Male => Some((10.0, 100.0)),
            VocalType::Female => Some((7.0, 80.0)),
            VocalType::Rap => Some((3.0, 40.0)),
            VocalType::Sung => Some((12.0, 120.0)),
        }
    }
}

impl fmt::Display for VocalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VocalType {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseParamError(s.to_string()))
    }
}

/// Samples of per-channel history used by the sibilance proxy.
pub const SIBILANCE_WINDOW: usize = 5;

/// Envelope level above which a frame counts as sibilant.
pub const SIBILANCE_THRESHOLD: f32 = 0.3;

/// Lowest gain the de-esser applies.
const DE_ESS_FLOOR: f32 = 0.3;

/// Linear one-pole with separate rise and fall times.
#[derive(Debug, Clone, Copy)]
struct LevelEnvelope {
    attack_ms: f32,
    release_ms: f32,
    attack: f32,
    release: f32,
    value: f32,
}

impl LevelEnvelope {
    fn new(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut env = Self {
            attack_ms,
            release_ms,
            attack: 0.0,
            release: 0.0,
            value: 0.0,
        };
        env.set_sample_rate(sample_rate);
        env
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.attack = time_constant_coeff(self.attack_ms, sample_rate);
        self.release = time_constant_coeff(self.release_ms, sample_rate);
    }

    #[inline]
    fn update(&mut self, level: f32) -> f32 {
        let coeff = if level > self.value {
            self.attack
        } else {
            self.release
        };
        self.value = level + coeff * (self.value - level);
        self.value
    }
}

/// Per-channel high-frequency proxy.
///
/// The ratio of summed absolute first differences to summed magnitude over
/// the last [`SIBILANCE_WINDOW`] samples rises toward 1 for bright, noisy
/// content such as "s" and "sh".
#[derive(Debug, Clone, Copy, Default)]
struct SibilanceWindow {
    samples: [f32; SIBILANCE_WINDOW + 1],
    next: usize,
    filled: usize,
}

impl SibilanceWindow {
    #[inline]
    fn push(&mut self, x: f32) -> f32 {
        self.samples[self.next] = x;
        self.next = (self.next + 1) % self.samples.len();
        self.filled = (self.filled + 1).min(self.samples.len());
        if self.filled < self.samples.len() {
            return 0.0;
        }

        let len = self.samples.len();
        let mut diff = 0.0;
        let mut magnitude = 0.0;
        let mut previous = self.samples[self.next];
        for k in 1..len {
            let current = self.samples[(self.next + k) % len];
            diff += (current - previous).abs();
            magnitude += current.abs();
            previous = current;
        }

        if magnitude > 0.01 {
            (diff / (magnitude + 0.001)).min(1.0)
        } else {
            0.0
        }
    }
}

/// Broadband de-esser keyed by [`SibilanceWindow`].
#[derive(Debug, Clone)]
pub struct DeEsser {
    windows: Vec<SibilanceWindow>,
    envelope: LevelEnvelope,
}

impl DeEsser {
    /// De-esser for `channels` channels with a 2 ms / 20 ms envelope.
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        Self {
            windows: vec![SibilanceWindow::default(); channels],
            envelope: LevelEnvelope::new(sample_rate, 2.0, 20.0),
        }
    }

    /// Update envelope coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.envelope.set_sample_rate(sample_rate);
    }

    /// Feed one frame (one sample per channel) and return the gain to apply
    /// for `amount` in \[0, 1\].
    #[inline]
    pub fn process_frame(&mut self, frame: &[f32], amount: f32) -> f32 {
        let level = frame
            .iter()
            .zip(self.windows.iter_mut())
            .map(|(&x, w)| w.push(x))
            .fold(0.0f32, f32::max);
        let env = self.envelope.update(level);
        if amount > 0.0 && env > SIBILANCE_THRESHOLD {
            (1.0 - env * amount).max(DE_ESS_FLOOR)
        } else {
            1.0
        }
    }

    /// Current sibilance envelope.
    pub fn envelope(&self) -> f32 {
        self.envelope.value
    }

    /// Clear history and envelope.
    pub fn reset(&mut self) {
        self.windows.fill(SibilanceWindow::default());
        self.envelope.value = 0.0;
    }
}

/// Breath-level attenuator.
///
/// Material between -50 and -20 dBFS is treated as breath, weighted toward
/// the quiet end; anything louder or quieter is not.
#[derive(Debug, Clone)]
pub struct BreathControl {
    envelope: LevelEnvelope,
}

impl BreathControl {
    /// Breath control with a 5 ms / 50 ms envelope.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            envelope: LevelEnvelope::new(sample_rate, 5.0, 50.0),
        }
    }

    /// Update envelope coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.envelope.set_sample_rate(sample_rate);
    }

    /// Breath likelihood for a detector level in dBFS.
    #[inline]
    pub fn breath_level(level_db: f32) -> f32 {
        if (-50.0..=-20.0).contains(&level_db) {
            ((-20.0 - level_db) / 20.0).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Advance with the frame level in dBFS and return the gain multiplier
    /// for `amount` in \[0, 1\].
    #[inline]
    pub fn process(&mut self, level_db: f32, amount: f32) -> f32 {
        let env = self.envelope.update(Self::breath_level(level_db));
        1.0 - env * amount * 0.5
    }

    /// Clear the envelope.
    pub fn reset(&mut self) {
        self.envelope.value = 0.0;
    }
}

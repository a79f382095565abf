//! Static tone shaping applied after gain: warmth, proximity, presence, air.
//!
//! A [`ToneStack`] holds up to [`MAX_TONE_BANDS`] biquads per channel. A band
//! whose gain rounds to 0 dB is skipped entirely so a zero amount leaves the
//! signal bit-exact.

use dynamix_core::{
    Biquad, Coefficients, high_shelf_coefficients, low_shelf_coefficients,
    peaking_eq_coefficients,
};

/// Bands a stack can hold.
pub const MAX_TONE_BANDS: usize = 3;

/// Highest usable band frequency as a fraction of the sample rate.
const NYQUIST_GUARD: f32 = 0.45;

/// Filter shape of one tone band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneShape {
    /// Shelf below the corner frequency.
    LowShelf,
    /// Bell with the given Q.
    Peak(f32),
    /// Shelf above the corner frequency.
    HighShelf,
}

/// One band of a [`ToneStack`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneBand {
    /// Filter shape.
    pub shape: ToneShape,
    /// Corner or centre frequency (Hz).
    pub frequency: f32,
    /// Gain (dB).
    pub gain_db: f32,
}

impl ToneBand {
    /// Low shelf at `frequency`.
    pub const fn low_shelf(frequency: f32, gain_db: f32) -> Self {
        Self {
            shape: ToneShape::LowShelf,
            frequency,
            gain_db,
        }
    }

    /// Bell at `frequency`.
    pub const fn peak(frequency: f32, q: f32, gain_db: f32) -> Self {
        Self {
            shape: ToneShape::Peak(q),
            frequency,
            gain_db,
        }
    }

    /// High shelf at `frequency`.
    pub const fn high_shelf(frequency: f32, gain_db: f32) -> Self {
        Self {
            shape: ToneShape::HighShelf,
            frequency,
            gain_db,
        }
    }

    fn is_flat(&self) -> bool {
        self.gain_db.abs() < 1e-3 || !self.gain_db.is_finite()
    }

    fn coefficients(&self, sample_rate: f32) -> Coefficients {
        let frequency = self.frequency.min(sample_rate * NYQUIST_GUARD).max(1.0);
        match self.shape {
            ToneShape::LowShelf => low_shelf_coefficients(frequency, self.gain_db, sample_rate),
            ToneShape::Peak(q) => peaking_eq_coefficients(frequency, q, self.gain_db, sample_rate),
            ToneShape::HighShelf => high_shelf_coefficients(frequency, self.gain_db, sample_rate),
        }
    }
}

/// Per-channel chain of tone biquads.
#[derive(Debug, Clone)]
pub struct ToneStack {
    sample_rate: f32,
    bands: [Option<ToneBand>; MAX_TONE_BANDS],
    filters: Vec<[Biquad; MAX_TONE_BANDS]>,
}

impl ToneStack {
    /// Empty (flat) stack for `channels` channels.
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        Self {
            sample_rate,
            bands: [None; MAX_TONE_BANDS],
            filters: (0..channels).map(|_| Default::default()).collect(),
        }
    }

    /// Install `bands`. Coefficients are recomputed only for bands that
    /// changed; filter state is kept. Flat bands are disabled.
    pub fn set_bands(&mut self, bands: &[ToneBand]) {
        for slot in 0..MAX_TONE_BANDS {
            let band = bands.get(slot).copied().filter(|b| !b.is_flat());
            if band == self.bands[slot] {
                continue;
            }
            self.bands[slot] = band;
            if let Some(band) = band {
                let coeffs = band.coefficients(self.sample_rate);
                for channel in &mut self.filters {
                    channel[slot].set(coeffs);
                }
            }
        }
    }

    /// Whether any band is active.
    pub fn is_flat(&self) -> bool {
        self.bands.iter().all(Option::is_none)
    }

    /// Filter one sample of `channel`.
    #[inline]
    pub fn process(&mut self, channel: usize, x: f32) -> f32 {
        let filters = &mut self.filters[channel];
        let mut y = x;
        for (band, filter) in self.bands.iter().zip(filters.iter_mut()) {
            if band.is_some() {
                y = filter.process(y);
            }
        }
        y
    }

    /// Recompute every active band for a new sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for (slot, band) in self.bands.iter().enumerate() {
            if let Some(band) = band {
                let coeffs = band.coefficients(sample_rate);
                for channel in &mut self.filters {
                    channel[slot].set(coeffs);
                }
            }
        }
    }

    /// Clear filter state.
    pub fn reset(&mut self) {
        for channel in &mut self.filters {
            for filter in channel.iter_mut() {
                filter.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Steady-state output/input RMS ratio for a sine at `freq`.
    ///
    /// Sampled peaks undershoot at high frequencies, RMS does not.
    fn tone_gain(stack: &mut ToneStack, freq: f32) -> f32 {
        let sr = 48000.0;
        let mut in_sq = 0.0f64;
        let mut out_sq = 0.0f64;
        for n in 0..48000 {
            let x = (2.0 * core::f32::consts::PI * freq * n as f32 / sr).sin();
            let y = stack.process(0, x);
            if n >= 24000 {
                in_sq += f64::from(x * x);
                out_sq += f64::from(y * y);
            }
        }
        (out_sq / in_sq).sqrt() as f32
    }

    #[test]
    fn test_flat_stack_is_exact() {
        let mut stack = ToneStack::new(48000.0, 1);
        stack.set_bands(&[ToneBand::low_shelf(200.0, 0.0)]);
        assert!(stack.is_flat());
        for x in [0.1, -0.7, 0.333] {
            assert_eq!(stack.process(0, x), x);
        }
    }

    #[test]
    fn test_low_shelf_boosts_lows() {
        let mut stack = ToneStack::new(48000.0, 1);
        stack.set_bands(&[ToneBand::low_shelf(200.0, 6.0)]);
        let low = tone_gain(&mut stack, 40.0);
        stack.reset();
        let high = tone_gain(&mut stack, 8000.0);
        assert!(low > 1.8, "low gain {low}");
        assert!((high - 1.0).abs() < 0.05, "high gain {high}");
    }

    #[test]
    fn test_high_shelf_boosts_highs() {
        let mut stack = ToneStack::new(48000.0, 1);
        stack.set_bands(&[ToneBand::high_shelf(10000.0, 6.0)]);
        let high = tone_gain(&mut stack, 16000.0);
        stack.reset();
        let low = tone_gain(&mut stack, 100.0);
        assert!(high > 1.4, "high gain {high}");
        assert!((low - 1.0).abs() < 0.02, "low gain {low}");
    }

    #[test]
    fn test_presence_peak() {
        let mut stack = ToneStack::new(48000.0, 1);
        stack.set_bands(&[ToneBand::peak(3500.0, 1.0, 4.5)]);
        let centre = tone_gain(&mut stack, 3500.0);
        assert!((centre - 1.679).abs() < 0.05, "centre gain {centre}");
    }

    #[test]
    fn test_frequency_limited_below_nyquist() {
        let mut stack = ToneStack::new(16000.0, 1);
        stack.set_bands(&[ToneBand::high_shelf(10000.0, 4.0)]);
        for n in 0..1000 {
            let x = if n % 2 == 0 { 0.5 } else { -0.5 };
            assert!(stack.process(0, x).is_finite());
        }
    }

    #[test]
    fn test_sample_rate_change_keeps_bands() {
        let mut stack = ToneStack::new(44100.0, 2);
        stack.set_bands(&[
            ToneBand::low_shelf(200.0, -3.0),
            ToneBand::high_shelf(10000.0, 2.0),
        ]);
        stack.set_sample_rate(96000.0);
        assert!(!stack.is_flat());
    }
}

//! Four-band complementary crossover.
//!
//! Each split takes a low-pass of the remaining signal and passes the
//! difference up to the next split:
//!
//! ```text
//! x ──► LP(c1) ─────────────────────────────► band 0
//!  └──(x - band0) ──► LP(c2) ───────────────► band 1
//!                  └──(r1 - band1) ──► LP(c3) ► band 2
//!                                   └─────────► band 3 = r2 - band2
//! ```
//!
//! Because every band is defined as what the earlier splits left over, the
//! four unprocessed bands sum back to the input exactly (up to float
//! rounding), whatever the filter order or crossover frequencies. Each
//! low-pass is two cascaded Butterworth biquads (24 dB/oct).

use dynamix_core::{Biquad, lowpass_coefficients};

/// Number of bands produced by [`BandSplitter`].
pub const NUM_BANDS: usize = 4;

/// Default crossover frequencies (Hz).
pub const DEFAULT_CROSSOVERS: [f32; NUM_BANDS - 1] = [200.0, 1000.0, 5000.0];

const BUTTERWORTH_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Two cascaded biquads forming one crossover low-pass.
#[derive(Debug, Clone, Default)]
struct CrossoverLowpass {
    first: Biquad,
    second: Biquad,
}

impl CrossoverLowpass {
    fn set_frequency(&mut self, frequency: f32, sample_rate: f32) {
        let coeffs = lowpass_coefficients(frequency, BUTTERWORTH_Q, sample_rate);
        self.first.set(coeffs);
        self.second.set(coeffs);
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        self.second.process(self.first.process(x))
    }

    fn clear(&mut self) {
        self.first.clear();
        self.second.clear();
    }
}

/// Multichannel four-band splitter.
///
/// # Example
///
/// ```rust
/// use dynamix_dynamics::{BandSplitter, NUM_BANDS};
///
/// let mut splitter = BandSplitter::new(48000.0, 1, [200.0, 1000.0, 5000.0]);
/// let bands = splitter.split_sample(0, 0.5);
/// let sum: f32 = bands.iter().sum();
/// assert!((sum - 0.5).abs() < 1e-6);
/// assert_eq!(bands.len(), NUM_BANDS);
/// ```
#[derive(Debug, Clone)]
pub struct BandSplitter {
    sample_rate: f32,
    crossovers: [f32; NUM_BANDS - 1],
    filters: Vec<[CrossoverLowpass; NUM_BANDS - 1]>,
}

impl BandSplitter {
    /// Create a splitter for `channels` channels.
    pub fn new(sample_rate: f32, channels: usize, crossovers: [f32; NUM_BANDS - 1]) -> Self {
        let mut splitter = Self {
            sample_rate,
            crossovers: [0.0; NUM_BANDS - 1],
            filters: (0..channels).map(|_| Default::default()).collect(),
        };
        splitter.apply_crossovers(crossovers);
        splitter
    }

    /// Crossover frequencies in use (after ordering and Nyquist limits).
    pub fn crossovers(&self) -> [f32; NUM_BANDS - 1] {
        self.crossovers
    }

    /// Update crossover frequencies. Coefficients are only recomputed when a
    /// frequency actually changes; filter state is kept.
    pub fn set_crossovers(&mut self, crossovers: [f32; NUM_BANDS - 1]) {
        if self.sanitize_crossovers(crossovers) != self.crossovers {
            self.apply_crossovers(crossovers);
        }
    }

    /// Update the sample rate and recompute coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.apply_crossovers(self.crossovers);
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.filters.len()
    }

    /// Split one sample of `channel` into its four bands.
    #[inline]
    pub fn split_sample(&mut self, channel: usize, x: f32) -> [f32; NUM_BANDS] {
        let filters = &mut self.filters[channel];
        let mut bands = [0.0; NUM_BANDS];
        let mut rest = x;
        for (band, lowpass) in bands.iter_mut().zip(filters.iter_mut()) {
            let low = lowpass.process(rest);
            *band = low;
            rest -= low;
        }
        bands[NUM_BANDS - 1] = rest;
        bands
    }

    /// Split a block of `channel` into four band buffers.
    ///
    /// Every band buffer must be at least `input.len()` long.
    pub fn split(&mut self, channel: usize, input: &[f32], bands: &mut [&mut [f32]; NUM_BANDS]) {
        for (i, &x) in input.iter().enumerate() {
            let split = self.split_sample(channel, x);
            for (band, value) in bands.iter_mut().zip(split) {
                band[i] = value;
            }
        }
    }

    /// Clear all filter state.
    pub fn reset(&mut self) {
        for channel in &mut self.filters {
            for lowpass in channel.iter_mut() {
                lowpass.clear();
            }
        }
    }

    fn sanitize_crossovers(&self, crossovers: [f32; NUM_BANDS - 1]) -> [f32; NUM_BANDS - 1] {
        let limit = self.sample_rate * 0.45;
        let mut out = [0.0; NUM_BANDS - 1];
        let mut floor = 10.0f32;
        for (dst, f) in out.iter_mut().zip(crossovers) {
            let f = if f.is_finite() { f } else { floor };
            *dst = f.max(floor).min(limit);
            floor = *dst;
        }
        out
    }

    fn apply_crossovers(&mut self, crossovers: [f32; NUM_BANDS - 1]) {
        self.crossovers = self.sanitize_crossovers(crossovers);
        for channel in &mut self.filters {
            for (lowpass, &f) in channel.iter_mut().zip(self.crossovers.iter()) {
                lowpass.set_frequency(f, self.sample_rate);
            }
        }
    }
}

/// Recombine one frame of bands with per-band linear gains.
#[inline]
pub fn recombine_sample(bands: &[f32; NUM_BANDS], gains: &[f32; NUM_BANDS]) -> f32 {
    bands.iter().zip(gains.iter()).map(|(b, g)| b * g).sum()
}

/// Recombine four band buffers with per-band linear gains into `output`.
pub fn recombine(bands: [&[f32]; NUM_BANDS], gains: [f32; NUM_BANDS], output: &mut [f32]) {
    for (i, out) in output.iter_mut().enumerate() {
        let frame = [bands[0][i], bands[1][i], bands[2][i], bands[3][i]];
        *out = recombine_sample(&frame, &gains);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * core::f32::consts::PI * freq * i as f32 / 48000.0).sin() * 0.5)
            .collect()
    }

    fn band_energy(freq: f32) -> [f32; NUM_BANDS] {
        let mut splitter = BandSplitter::new(48000.0, 1, DEFAULT_CROSSOVERS);
        let input = sine(freq, 9600);
        let mut energy = [0.0; NUM_BANDS];
        for (i, &x) in input.iter().enumerate() {
            let bands = splitter.split_sample(0, x);
            if i >= 4800 {
                for (e, b) in energy.iter_mut().zip(bands) {
                    *e += b * b;
                }
            }
        }
        energy
    }

    #[test]
    fn test_reconstruction() {
        let mut splitter = BandSplitter::new(48000.0, 2, DEFAULT_CROSSOVERS);
        let input: Vec<f32> = (0..2048)
            .map(|i| ((i * 7919) % 2001) as f32 / 1000.0 - 1.0)
            .collect();
        for &x in &input {
            for ch in 0..2 {
                let sum: f32 = splitter.split_sample(ch, x).iter().sum();
                assert!((sum - x).abs() < 1e-5, "{} vs {}", sum, x);
            }
        }
    }

    #[test]
    fn test_block_split_and_recombine() {
        let mut splitter = BandSplitter::new(44100.0, 1, [150.0, 900.0, 4000.0]);
        let input = sine(440.0, 512);
        let mut b0 = vec![0.0; 512];
        let mut b1 = vec![0.0; 512];
        let mut b2 = vec![0.0; 512];
        let mut b3 = vec![0.0; 512];
        splitter.split(
            0,
            &input,
            &mut [&mut b0[..], &mut b1[..], &mut b2[..], &mut b3[..]],
        );
        let mut out = vec![0.0; 512];
        recombine([&b0[..], &b1[..], &b2[..], &b3[..]], [1.0; NUM_BANDS], &mut out);
        for (o, x) in out.iter().zip(&input) {
            assert!((o - x).abs() < 1e-5);
        }
    }

    #[test]
    fn test_low_tone_favours_low_band() {
        // Complementary splits leak phase residue upward, so only check the
        // dominant band and that little reaches the top two.
        let energy = band_energy(60.0);
        assert!(energy[0] > energy[1]);
        assert!(energy[0] > 10.0 * (energy[2] + energy[3]));
    }

    #[test]
    fn test_high_tone_lands_in_top_band() {
        let energy = band_energy(12000.0);
        assert!(energy[3] > 10.0 * (energy[0] + energy[1] + energy[2]));
    }

    #[test]
    fn test_crossovers_ordered_and_limited() {
        let mut splitter = BandSplitter::new(8000.0, 1, DEFAULT_CROSSOVERS);
        let c = splitter.crossovers();
        assert!(c[2] <= 3600.0);
        splitter.set_crossovers([500.0, 400.0, f32::NAN]);
        let c = splitter.crossovers();
        assert!(c[0] <= c[1] && c[1] <= c[2]);
    }

    #[test]
    fn test_recombine_gains() {
        let bands = [0.1, 0.2, 0.3, 0.4];
        assert!((recombine_sample(&bands, &[1.0, 0.0, 1.0, 0.0]) - 0.4).abs() < 1e-6);
    }
}

//! Lookahead delay for the signal path.
//!
//! The detector reads the undelayed input while gain is applied to a copy
//! delayed by up to [`MAX_LOOKAHEAD_MS`], so reduction is already in place
//! when a transient reaches the output. Wet and dry paths share the delay.
//!
//! # Memory
//!
//! One ring buffer per channel is allocated at construction for the maximum
//! lookahead at the configured sample rate. Changing the delay never
//! reallocates; changing the sample rate does.

use dynamix_core::{ms_to_samples, samples_to_ms};

/// Longest supported lookahead in milliseconds.
pub const MAX_LOOKAHEAD_MS: f32 = 10.0;

/// Per-channel integer-sample delay line.
///
/// # Example
///
/// ```rust
/// use dynamix_dynamics::LookaheadDelay;
///
/// let mut delay = LookaheadDelay::new(1000.0, 1);
/// delay.set_delay_ms(3.0);
/// assert_eq!(delay.delay_samples(), 3);
///
/// let out: Vec<f32> = [1.0, 0.0, 0.0, 0.0]
///     .iter()
///     .map(|&x| delay.process(0, x))
///     .collect();
/// assert_eq!(out, [0.0, 0.0, 0.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct LookaheadDelay {
    sample_rate: f32,
    rings: Vec<Vec<f32>>,
    write_pos: Vec<usize>,
    delay: usize,
}

impl LookaheadDelay {
    /// Allocate rings for `channels` channels at `sample_rate`.
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        let capacity = Self::capacity_for(sample_rate);
        Self {
            sample_rate,
            rings: vec![vec![0.0; capacity]; channels],
            write_pos: vec![0; channels],
            delay: 0,
        }
    }

    fn capacity_for(sample_rate: f32) -> usize {
        ms_to_samples(MAX_LOOKAHEAD_MS, sample_rate).round().max(0.0) as usize + 1
    }

    /// Set the delay in milliseconds, clamped to `0..=MAX_LOOKAHEAD_MS`.
    ///
    /// The sample count is `round(ms · sr / 1000)`.
    pub fn set_delay_ms(&mut self, ms: f32) {
        let ms = if ms.is_finite() {
            ms.clamp(0.0, MAX_LOOKAHEAD_MS)
        } else {
            0.0
        };
        let samples = ms_to_samples(ms, self.sample_rate).round() as usize;
        self.delay = samples.min(self.capacity() - 1);
    }

    /// Current delay in samples.
    pub fn delay_samples(&self) -> usize {
        self.delay
    }

    /// Ring length per channel.
    pub fn capacity(&self) -> usize {
        self.rings.first().map_or(1, Vec::len)
    }

    /// Push `x` into `channel` and return the sample written `delay` calls ago.
    ///
    /// The ring is written even at zero delay so that raising the delay later
    /// reads recent input rather than stale history.
    #[inline]
    pub fn process(&mut self, channel: usize, x: f32) -> f32 {
        let ring = &mut self.rings[channel];
        let len = ring.len();
        let w = self.write_pos[channel];
        ring[w] = x;
        self.write_pos[channel] = (w + 1) % len;
        if self.delay == 0 {
            return x;
        }
        ring[(w + len - self.delay) % len]
    }

    /// Reallocate for a new sample rate, keeping the delay in milliseconds.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let ms = samples_to_ms(self.delay as f32, self.sample_rate);
        let channels = self.rings.len();
        *self = Self::new(sample_rate, channels);
        self.set_delay_ms(ms);
    }

    /// Zero all rings.
    pub fn reset(&mut self) {
        for ring in &mut self.rings {
            ring.fill(0.0);
        }
        self.write_pos.fill(0);
    }
}

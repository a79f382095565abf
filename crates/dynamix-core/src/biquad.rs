//! Biquad (bi-quadratic) filter structure.
//!
//! Second-order IIR sections used by the band splitter and the tone stages
//! (warmth, proximity, presence, air).
//!
//! Coefficient calculation uses the RBJ Audio EQ Cookbook formulas.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf, sqrtf};

/// Coefficient tuple `(b0, b1, b2, a0, a1, a2)` before normalization.
pub type Coefficients = (f32, f32, f32, f32, f32, f32);

/// Generic biquad filter coefficients and state.
///
/// Implements the Direct Form I biquad structure:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    /// Input delay line: x[n-1], x[n-2]
    x1: f32,
    x2: f32,

    /// Output delay line: y[n-1], y[n-2]
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Creates a biquad from a coefficient tuple.
    pub fn with_coefficients(coefficients: Coefficients) -> Self {
        let mut biquad = Self::new();
        biquad.set(coefficients);
        biquad
    }

    /// Sets the biquad coefficients, normalizing by `a0`.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Sets the coefficients from a tuple, keeping the filter state.
    pub fn set(&mut self, (b0, b1, b2, a0, a1, a2): Coefficients) {
        self.set_coefficients(b0, b1, b2, a0, a1, a2);
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = crate::math::flush_denormal(output);

        output
    }

    /// Clears the filter state without changing coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Low-pass coefficients.
///
/// * `frequency` - Cutoff frequency in Hz
/// * `q` - Q factor (0.707 for Butterworth response)
/// * `sample_rate` - Sample rate in Hz
pub fn lowpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// High-pass coefficients, RBJ cookbook form.
pub fn highpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> Coefficients {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    let b0 = (1.0 + cos_omega) / 2.0;
    let b1 = -(1.0 + cos_omega);
    let b2 = (1.0 + cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// Peaking EQ coefficients (bell boost or cut around `frequency`).
pub fn peaking_eq_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> Coefficients {
    let a = powf(10.0, gain_db / 40.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    let b0 = 1.0 + alpha * a;
    let b1 = -2.0 * cos_omega;
    let b2 = 1.0 - alpha * a;
    let a0 = 1.0 + alpha / a;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha / a;

    (b0, b1, b2, a0, a1, a2)
}

/// Low-shelf coefficients (shelf slope S = 1).
///
/// Boosts or cuts everything below `frequency` by `gain_db`.
pub fn low_shelf_coefficients(frequency: f32, gain_db: f32, sample_rate: f32) -> Coefficients {
    let a = powf(10.0, gain_db / 40.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / 2.0 * core::f32::consts::SQRT_2;
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;

    let b0 = a * ((a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha);
    let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_omega);
    let b2 = a * ((a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha);
    let a0 = (a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha;
    let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_omega);
    let a2 = (a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha;

    (b0, b1, b2, a0, a1, a2)
}

/// High-shelf coefficients (shelf slope S = 1).
///
/// Boosts or cuts everything above `frequency` by `gain_db`.
pub fn high_shelf_coefficients(frequency: f32, gain_db: f32, sample_rate: f32) -> Coefficients {
    let a = powf(10.0, gain_db / 40.0);
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / 2.0 * core::f32::consts::SQRT_2;
    let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;

    let b0 = a * ((a + 1.0) + (a - 1.0) * cos_omega + two_sqrt_a_alpha);
    let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_omega);
    let b2 = a * ((a + 1.0) + (a - 1.0) * cos_omega - two_sqrt_a_alpha);
    let a0 = (a + 1.0) - (a - 1.0) * cos_omega + two_sqrt_a_alpha;
    let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cos_omega);
    let a2 = (a + 1.0) - (a - 1.0) * cos_omega - two_sqrt_a_alpha;

    (b0, b1, b2, a0, a1, a2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(biquad: &mut Biquad, input: f32, n: usize) -> f32 {
        let mut out = 0.0;
        for _ in 0..n {
            out = biquad.process(input);
        }
        out
    }

    fn sine_gain(biquad: &mut Biquad, freq: f32, sample_rate: f32) -> f32 {
        let n = (sample_rate as usize) / 2;
        let mut peak = 0.0f32;
        for i in 0..n {
            let x = sinf(2.0 * PI * freq * i as f32 / sample_rate);
            let y = biquad.process(x);
            if i > n / 2 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_biquad_passthrough() {
        let mut biquad = Biquad::new();
        for i in 0..10 {
            let input = i as f32 * 0.1;
            assert!((biquad.process(input) - input).abs() < 0.0001);
        }
    }

    #[test]
    fn test_biquad_clear() {
        let mut biquad = Biquad::with_coefficients(lowpass_coefficients(1000.0, 0.707, 48000.0));
        settle(&mut biquad, 1.0, 10);
        biquad.clear();
        assert_eq!(biquad.x1, 0.0);
        assert_eq!(biquad.y1, 0.0);
    }

    #[test]
    fn test_biquad_lowpass_dc_pass() {
        let mut biquad = Biquad::with_coefficients(lowpass_coefficients(1000.0, 0.707, 44100.0));
        let output = settle(&mut biquad, 1.0, 1000);
        assert!((output - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_peaking_unity_at_zero_gain() {
        let mut biquad =
            Biquad::with_coefficients(peaking_eq_coefficients(1000.0, 1.0, 0.0, 44100.0));
        let output = settle(&mut biquad, 1.0, 1000);
        assert!((output - 1.0).abs() < 0.05, "got {}", output);
    }

    #[test]
    fn test_low_shelf_dc_gain() {
        let mut biquad = Biquad::with_coefficients(low_shelf_coefficients(200.0, 6.0, 48000.0));
        let output = settle(&mut biquad, 1.0, 20000);
        let expected = powf(10.0, 6.0 / 20.0);
        assert!((output - expected).abs() < 0.02, "got {}", output);
    }

    #[test]
    fn test_low_shelf_leaves_highs() {
        let mut biquad = Biquad::with_coefficients(low_shelf_coefficients(200.0, -6.0, 48000.0));
        let gain = sine_gain(&mut biquad, 5000.0, 48000.0);
        assert!((gain - 1.0).abs() < 0.05, "got {}", gain);
    }

    #[test]
    fn test_high_shelf_boosts_highs() {
        let mut biquad = Biquad::with_coefficients(high_shelf_coefficients(8000.0, 6.0, 48000.0));
        let gain = sine_gain(&mut biquad, 18000.0, 48000.0);
        assert!(gain > 1.7, "got {}", gain);
        let mut biquad = Biquad::with_coefficients(high_shelf_coefficients(8000.0, 6.0, 48000.0));
        let dc = settle(&mut biquad, 1.0, 5000);
        assert!((dc - 1.0).abs() < 0.02, "got {}", dc);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut biquad = Biquad::with_coefficients(highpass_coefficients(30.0, 0.7, 48000.0));
        let dc = settle(&mut biquad, 1.0, 48000);
        assert!(dc.abs() < 1e-3, "got {}", dc);
        let gain = sine_gain(&mut biquad, 1000.0, 48000.0);
        assert!((gain - 1.0).abs() < 0.02, "got {}", gain);
    }
}

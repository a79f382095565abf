//! Static waveshapers used for coloration and output protection.
//!
//! # Coloration
//!
//! | Function | Character |
//! |----------|-----------|
//! | [`HarmonicShaper`] | Asymmetric tube stage, even + odd harmonics |
//! | [`vintage_color`] | Gentle even-order bend, `x + a·0.1·x²·sign(x)` |
//! | [`character`] | Very light sinusoidal bend for "transparent" voicing |
//!
//! # Output
//!
//! [`SoftLimiter`] leaves samples below its threshold untouched and maps the
//! overshoot onto the remaining headroom with a saturating curve, so output
//! approaches full scale without hard clipping.

use core::f32::consts::PI;
use libm::{copysignf, expf, sinf, tanhf};

/// Asymmetric rational waveshaper modelling a driven tube stage.
///
/// ```text
/// drive = 1 + 3·a          e = x · drive
/// e > 0:  s = e / (1 + 0.3·e²)      softer positive half
/// e ≤ 0:  s = e / (1 + 1.5·|e|)     harder negative half
/// s -= 0.05·a · s²                   grid-bias bend
/// out = s / (0.5·drive + 0.5)
/// ```
///
/// The uneven halves generate even harmonics. The bias term is the
/// `bias·(1 - s²)` offset of a biased stage with its static part removed,
/// so silence stays silent. `amount = 0` returns the input unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HarmonicShaper;

impl HarmonicShaper {
    /// Shape a sample with drive `amount` in \[0, 1\].
    #[inline]
    pub fn shape(x: f32, amount: f32) -> f32 {
        if amount <= 0.0 {
            return x;
        }

        let drive = 1.0 + amount * 3.0;
        let e = x * drive;
        let mut s = if e > 0.0 {
            e / (1.0 + e * e * 0.3)
        } else {
            e / (1.0 + e.abs() * 1.5)
        };

        let bias = amount * 0.05;
        s -= bias * s * s;

        s / (drive * 0.5 + 0.5)
    }
}

/// Gentle even-order coloration: `x + a·0.1·x²·sign(x)`.
#[inline]
pub fn vintage_color(x: f32, amount: f32) -> f32 {
    if amount <= 0.0 {
        return x;
    }
    x + amount * 0.1 * x * x.abs()
}

/// Very light sinusoidal bend: `x + a·0.02·sin(2πx)`.
#[inline]
pub fn character(x: f32, amount: f32) -> f32 {
    if amount <= 0.0 {
        return x;
    }
    x + amount * 0.02 * sinf(2.0 * PI * x)
}

/// Saturating curve used by [`SoftLimiter`] above its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimiterCurve {
    /// `tanh(o / 0.1)`
    #[default]
    Tanh,
    /// `1 - exp(-o / 0.1)`
    Exponential,
}

/// Soft output limiter.
///
/// Samples with `|x| ≤ threshold` pass unchanged. Above it:
/// `sign(x) · (t + (1 - t) · f((|x| - t) / 0.1))` where `f` is the
/// [`LimiterCurve`]. The output magnitude never exceeds 1.0.
///
/// ```rust
/// use dynamix_core::{LimiterCurve, SoftLimiter};
///
/// let limiter = SoftLimiter::new(0.95, LimiterCurve::Tanh);
/// assert_eq!(limiter.process(0.5), 0.5);
/// assert!(limiter.process(4.0) <= 1.0);
/// assert!(limiter.process(4.0) > 0.95);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftLimiter {
    threshold: f32,
    curve: LimiterCurve,
}

impl SoftLimiter {
    /// Overshoot scale in linear units.
    const KNEE: f32 = 0.1;

    /// Create a limiter. `threshold` is clamped to \[0.5, 1.0\].
    pub fn new(threshold: f32, curve: LimiterCurve) -> Self {
        Self {
            threshold: threshold.clamp(0.5, 1.0),
            curve,
        }
    }

    /// Threshold above which samples are compressed.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Limit one sample.
    #[inline]
    pub fn process(&self, x: f32) -> f32 {
        let magnitude = x.abs();
        if magnitude <= self.threshold {
            return x;
        }

        let overshoot = (magnitude - self.threshold) / Self::KNEE;
        let shaped = match self.curve {
            LimiterCurve::Tanh => tanhf(overshoot),
            LimiterCurve::Exponential => 1.0 - expf(-overshoot),
        };
        let limited = self.threshold + (1.0 - self.threshold) * shaped;
        copysignf(limited, x)
    }
}

impl Default for SoftLimiter {
    fn default() -> Self {
        Self::new(0.95, LimiterCurve::Tanh)
    }
}

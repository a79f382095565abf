//! Mathematical utility functions for dynamics processing.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`level_to_db`] - Detector conversion with a hard [`SILENCE_DB`] floor
//!
//! # Utilities
//!
//! - [`sanitize`] - Replace non-finite samples with silence
//! - [`wet_dry_mix`] - Dry/wet blend
//! - [`ms_to_samples`] / [`samples_to_ms`] - Time conversions

use libm::{expf, log10f, logf};

/// Level reported for a signal that is exactly zero.
///
/// Detectors map silence here instead of `-inf` so the dB-domain recursion
/// in [`EnvelopeFollower`](crate::EnvelopeFollower) stays finite.
pub const SILENCE_DB: f32 = -96.0;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use dynamix_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Inputs are floored at 1e-10 (-200 dB) so zero never yields `-inf`.
///
/// # Example
/// ```rust
/// use dynamix_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // 20 * log10(linear) = 20 * ln(linear) / ln(10)
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Convert a detector level (linear, non-negative) to dBFS.
///
/// Exactly-zero and non-finite levels map to [`SILENCE_DB`]. Non-zero levels
/// quieter than the floor are clamped to it.
///
/// ```rust
/// use dynamix_core::{level_to_db, SILENCE_DB};
///
/// assert_eq!(level_to_db(0.0), SILENCE_DB);
/// assert!((level_to_db(1.0)).abs() < 1e-6);
/// ```
#[inline]
pub fn level_to_db(level: f32) -> f32 {
    if level > 0.0 && level.is_finite() {
        (20.0 * log10f(level)).max(SILENCE_DB)
    } else {
        SILENCE_DB
    }
}

/// Replace NaN and infinities with silence.
#[inline]
pub fn sanitize(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}

/// Crossfade between dry and wet signals.
///
/// Computed as `dry * (1 - mix) + wet * mix` so that `mix = 0` returns
/// `dry` and `mix = 1` returns `wet` exactly.
///
/// # Arguments
///
/// * `dry` - Unprocessed signal
/// * `wet` - Processed signal
/// * `mix` - Blend factor in \[0.0, 1.0\]: 0.0 = all dry, 1.0 = all wet
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Convert milliseconds to a (fractional) sample count.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Convert a sample count to milliseconds.
#[inline]
pub fn samples_to_ms(samples: f32, sample_rate: f32) -> f32 {
    samples * 1000.0 / sample_rate
}

/// One-pole smoothing coefficient for a time constant in milliseconds.
///
/// `exp(-1 / (ms * 0.001 * sample_rate))`. Non-positive times return 0
/// (instant response).
#[inline]
pub fn time_constant_coeff(time_ms: f32, sample_rate: f32) -> f32 {
    let samples = time_ms * 0.001 * sample_rate;
    if samples > 0.0 {
        expf(-1.0 / samples)
    } else {
        0.0
    }
}

/// Flush values in the subnormal range to zero.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_linear_roundtrip() {
        let original = 0.5;
        let db = linear_to_db(original);
        let back = db_to_linear(db);
        assert!(
            (original - back).abs() < 1e-5,
            "Roundtrip failed: {} -> {} -> {}",
            original,
            db,
            back
        );
    }

    #[test]
    fn test_level_to_db_floor() {
        assert_eq!(level_to_db(0.0), SILENCE_DB);
        assert_eq!(level_to_db(f32::NAN), SILENCE_DB);
        assert_eq!(level_to_db(f32::INFINITY), SILENCE_DB);
        assert_eq!(level_to_db(1e-9), SILENCE_DB);
        assert!((level_to_db(0.5) + 6.0206).abs() < 1e-3);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(f32::NAN), 0.0);
        assert_eq!(sanitize(f32::NEG_INFINITY), 0.0);
        assert_eq!(sanitize(0.25), 0.25);
    }

    #[test]
    fn test_wet_dry_mix_endpoints_exact() {
        let dry = 0.3137;
        let wet = -0.771;
        assert_eq!(wet_dry_mix(dry, wet, 0.0), dry);
        assert_eq!(wet_dry_mix(dry, wet, 1.0), wet);
        assert!((wet_dry_mix(1.0, 0.0, 0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_time_constant_coeff() {
        let c = time_constant_coeff(10.0, 48000.0);
        assert!((c - expf(-1.0 / 480.0)).abs() < 1e-7);
        assert_eq!(time_constant_coeff(0.0, 48000.0), 0.0);
        assert!(time_constant_coeff(1000.0, 48000.0) < 1.0);
    }

    #[test]
    fn test_ms_samples_conversion() {
        assert!((ms_to_samples(10.0, 48000.0) - 480.0).abs() < 1e-3);
        assert!((samples_to_ms(480.0, 48000.0) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-30), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }
}

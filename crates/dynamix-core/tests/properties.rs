//! Property-based tests for dynamix-core primitives.
//!
//! Covers the compression law (monotonicity, knee continuity, 1:1 identity),
//! envelope stability and limiter bounds using proptest.

use proptest::prelude::*;
use dynamix_core::{
    Biquad, EnvelopeFollower, GainComputer, HarmonicShaper, KneeCurve, LimiterCurve,
    SILENCE_DB, SmoothedParam, SoftLimiter, high_shelf_coefficients, low_shelf_coefficients,
    peaking_eq_coefficients,
};

fn curve(index: usize) -> KneeCurve {
    if index % 2 == 0 {
        KneeCurve::Smoothstep
    } else {
        KneeCurve::Quadratic
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// For fixed settings the reduction never decreases as the envelope rises.
    #[test]
    fn reduction_is_monotonic(
        threshold in -60.0f32..0.0,
        ratio in 1.0f32..20.0,
        knee in 0.0f32..12.0,
        curve_index in 0usize..2,
        a in -96.0f32..12.0,
        b in -96.0f32..12.0,
    ) {
        let gc = GainComputer::new(threshold, ratio, knee).with_curve(curve(curve_index));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(gc.reduction_db(lo) <= gc.reduction_db(hi) + 1e-5,
            "r({}) = {} > r({}) = {}", lo, gc.reduction_db(lo), hi, gc.reduction_db(hi));
    }

    /// Reduction is never negative.
    #[test]
    fn reduction_non_negative(
        threshold in -60.0f32..0.0,
        ratio in 1.0f32..20.0,
        knee in 0.0f32..12.0,
        env in -96.0f32..24.0,
    ) {
        prop_assert!(GainComputer::new(threshold, ratio, knee).reduction_db(env) >= 0.0);
    }

    /// No step at either knee edge.
    #[test]
    fn knee_edges_continuous(
        threshold in -60.0f32..0.0,
        ratio in 1.0f32..20.0,
        knee in 0.5f32..12.0,
        curve_index in 0usize..2,
    ) {
        let gc = GainComputer::new(threshold, ratio, knee).with_curve(curve(curve_index));
        let eps = 1e-3;
        for edge in [threshold - knee / 2.0, threshold + knee / 2.0] {
            let below = gc.reduction_db(edge - eps);
            let above = gc.reduction_db(edge + eps);
            prop_assert!((below - above).abs() < 0.01,
                "jump at {}: {} vs {}", edge, below, above);
        }
    }

    /// Ratio 1 never compresses.
    #[test]
    fn unity_ratio_is_identity(
        threshold in -60.0f32..0.0,
        knee in 0.0f32..12.0,
        env in -96.0f32..24.0,
    ) {
        prop_assert_eq!(GainComputer::new(threshold, 1.0, knee).reduction_db(env), 0.0);
    }

    /// The envelope stays finite and within the span of its inputs.
    #[test]
    fn envelope_bounded(
        attack in 0.1f32..100.0,
        release in 10.0f32..1000.0,
        input in prop::array::uniform32(prop::num::f32::ANY),
    ) {
        let mut env = EnvelopeFollower::with_times(48000.0, attack, release);
        for &x in &input {
            let level = env.process(x);
            prop_assert!(level.is_finite());
            prop_assert!(level >= SILENCE_DB - 1e-3);
        }
    }

    /// Limiter output never exceeds full scale and keeps the sign.
    #[test]
    fn limiter_bounded(x in -1000.0f32..1000.0, threshold in 0.5f32..1.0, exp in any::<bool>()) {
        let c = if exp { LimiterCurve::Exponential } else { LimiterCurve::Tanh };
        let y = SoftLimiter::new(threshold, c).process(x);
        prop_assert!(y.abs() <= 1.0);
        prop_assert!(y * x >= 0.0);
    }

    /// The tube shaper stays finite for any finite input and drive.
    #[test]
    fn shaper_finite(x in -10.0f32..10.0, drive in 0.0f32..1.0) {
        prop_assert!(HarmonicShaper::shape(x, drive).is_finite());
    }

    /// Tone filters used by the colour stages are stable across their ranges.
    #[test]
    fn tone_filters_stable(
        freq in 100.0f32..12000.0,
        gain in -12.0f32..12.0,
        kind in 0usize..3,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let coeffs = match kind {
            0 => low_shelf_coefficients(freq, gain, 48000.0),
            1 => high_shelf_coefficients(freq, gain, 48000.0),
            _ => peaking_eq_coefficients(freq, 1.0, gain, 48000.0),
        };
        let mut biquad = Biquad::with_coefficients(coeffs);
        for _ in 0..8 {
            for &x in &input {
                prop_assert!(biquad.process(x).is_finite());
            }
        }
    }

    /// SmoothedParam converges toward its target value.
    #[test]
    fn smoothed_param_converges(
        initial in -10.0f32..10.0,
        target in -10.0f32..10.0,
        time_ms in 1.0f32..50.0,
    ) {
        let mut p = SmoothedParam::with_config(initial, 48000.0, time_ms);
        p.set_target(target);
        let n = (time_ms * 48.0 * 10.0) as usize;
        for _ in 0..n {
            p.advance();
        }
        prop_assert!((p.get() - target).abs() < 0.01 * (initial - target).abs().max(1.0));
    }
}

//! Static compression curve.
//!
//! Maps an envelope level in dB to a gain reduction in dB (always ≥ 0).
//!
//! ```text
//! reduction
//!    ▲                         ╱  slope 1 - 1/ratio
//!    │                      ╱
//!    │                  ╱
//!    │           ....╱           knee window blends in the ratio
//!    │______.....
//!    └────────┬────┬────┬──────────► envelope dB
//!         t - k/2  t  t + k/2
//! ```
//!
//! Inside the knee window the reduction is `w(p) · o/2 · (1 - 1/ratio)` where
//! `p` is the normalized knee position, `o` the overshoot above the knee start
//! and `w` a [`KneeCurve`]. At the upper edge this equals the straight ratio
//! line, so the curve has no step.
//!
//! [`KneeCurve::Smoothstep`] (`p²(3-2p)`) leaves the lower edge with zero
//! slope; [`KneeCurve::Quadratic`] (`p²`) is the vintage variant. Both are
//! continuous and monotonic.

/// Interpolation used inside the knee window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KneeCurve {
    /// Cubic Hermite `p²(3 - 2p)`.
    #[default]
    Smoothstep,
    /// Plain square `p²`.
    Quadratic,
}

impl KneeCurve {
    /// Evaluate the blend weight for a normalized knee position in \[0, 1\].
    #[inline]
    pub fn weight(self, p: f32) -> f32 {
        match self {
            KneeCurve::Smoothstep => p * p * (3.0 - 2.0 * p),
            KneeCurve::Quadratic => p * p,
        }
    }
}

/// Threshold/ratio/knee compression law.
///
/// Stateless apart from its settings; [`reduction_db`](Self::reduction_db)
/// is a pure function of the envelope level.
///
/// # Example
///
/// ```rust
/// use dynamix_core::GainComputer;
///
/// let gc = GainComputer::new(-12.0, 4.0, 0.0);
/// // 12 dB over threshold at 4:1 leaves 3 dB, so 9 dB of reduction
/// assert!((gc.reduction_db(0.0) - 9.0).abs() < 1e-5);
/// assert_eq!(gc.reduction_db(-20.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainComputer {
    /// Threshold in dBFS
    pub threshold_db: f32,
    /// Compression ratio (≥ 1)
    pub ratio: f32,
    /// Knee width in dB (≥ 0)
    pub knee_db: f32,
    /// Knee interpolation
    pub curve: KneeCurve,
}

impl GainComputer {
    /// Create a gain computer with a smoothstep knee.
    pub fn new(threshold_db: f32, ratio: f32, knee_db: f32) -> Self {
        Self {
            threshold_db,
            ratio: ratio.max(1.0),
            knee_db: knee_db.max(0.0),
            curve: KneeCurve::Smoothstep,
        }
    }

    /// Replace the knee interpolation.
    pub fn with_curve(mut self, curve: KneeCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Gain reduction in dB for the given envelope level. Never negative.
    #[inline]
    pub fn reduction_db(&self, envelope_db: f32) -> f32 {
        reduction_db(
            envelope_db,
            self.threshold_db,
            self.ratio,
            self.knee_db,
            self.curve,
        )
    }

    /// Linear gain multiplier `10^(-reduction/20)` for the given envelope.
    #[inline]
    pub fn gain(&self, envelope_db: f32) -> f32 {
        crate::math::db_to_linear(-self.reduction_db(envelope_db))
    }
}

impl Default for GainComputer {
    fn default() -> Self {
        Self::new(-18.0, 4.0, 2.0)
    }
}

/// Free-function form of [`GainComputer::reduction_db`].
///
/// `ratio` below 1 is treated as 1 and a non-positive `knee_db` gives a hard
/// knee, so the knee position is never computed with a zero divisor.
#[inline]
pub fn reduction_db(
    envelope_db: f32,
    threshold_db: f32,
    ratio: f32,
    knee_db: f32,
    curve: KneeCurve,
) -> f32 {
    let slope = 1.0 - 1.0 / ratio.max(1.0);
    if slope <= 0.0 {
        return 0.0;
    }

    let half_knee = knee_db * 0.5;
    if knee_db <= 0.0 {
        let overshoot = envelope_db - threshold_db;
        return if overshoot > 0.0 { overshoot * slope } else { 0.0 };
    }

    if envelope_db <= threshold_db - half_knee {
        0.0
    } else if envelope_db >= threshold_db + half_knee {
        (envelope_db - threshold_db) * slope
    } else {
        let p = (envelope_db - threshold_db + half_knee) / knee_db;
        // Half the overshoot from the knee start: meets the ratio line
        // exactly at threshold + knee/2.
        let overshoot = envelope_db - (threshold_db - half_knee);
        (curve.weight(p) * overshoot * 0.5 * slope).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_is_zero() {
        let gc = GainComputer::new(-20.0, 4.0, 6.0);
        assert_eq!(gc.reduction_db(-40.0), 0.0);
        assert_eq!(gc.reduction_db(-23.0), 0.0);
    }

    #[test]
    fn test_above_knee_follows_ratio() {
        let gc = GainComputer::new(-20.0, 4.0, 6.0);
        // 10 dB over at 4:1 → 7.5 dB reduction
        assert!((gc.reduction_db(-10.0) - 7.5).abs() < 1e-5);
    }

    #[test]
    fn test_hard_knee_steady_state() {
        let gc = GainComputer::new(-12.0, 4.0, 0.0);
        assert!((gc.reduction_db(0.0) - 9.0).abs() < 1e-5);
        assert_eq!(gc.reduction_db(-12.0), 0.0);
    }

    #[test]
    fn test_ratio_one_is_identity() {
        let gc = GainComputer::new(-40.0, 1.0, 6.0);
        for db in [-96.0, -40.0, -37.0, 0.0, 12.0] {
            assert_eq!(gc.reduction_db(db), 0.0);
        }
        assert_eq!(gc.gain(0.0), 1.0);
    }

    #[test]
    fn test_knee_edges_continuous() {
        for curve in [KneeCurve::Smoothstep, KneeCurve::Quadratic] {
            let gc = GainComputer::new(-18.0, 6.0, 8.0).with_curve(curve);
            let eps = 1e-3;
            let lower = -22.0;
            let upper = -14.0;
            assert!((gc.reduction_db(lower - eps) - gc.reduction_db(lower + eps)).abs() < 1e-2);
            assert!((gc.reduction_db(upper - eps) - gc.reduction_db(upper + eps)).abs() < 1e-2);
        }
    }

    #[test]
    fn test_knee_midpoint_smoothstep() {
        let gc = GainComputer::new(-18.0, 2.0, 4.0);
        // p = 0.5 → s = 0.5; overshoot = 2 dB → 0.5 * (2 * 0.5) * 0.5 = 0.25 dB
        assert!((gc.reduction_db(-18.0) - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_monotonic_sweep() {
        let gc = GainComputer::new(-24.0, 8.0, 10.0);
        let mut prev = 0.0;
        let mut db = -60.0;
        while db < 6.0 {
            let r = gc.reduction_db(db);
            assert!(r >= prev, "reduction decreased at {} dB", db);
            prev = r;
            db += 0.05;
        }
    }

    #[test]
    fn test_weight_endpoints() {
        assert_eq!(KneeCurve::Smoothstep.weight(0.0), 0.0);
        assert_eq!(KneeCurve::Smoothstep.weight(1.0), 1.0);
        assert_eq!(KneeCurve::Quadratic.weight(1.0), 1.0);
    }
}

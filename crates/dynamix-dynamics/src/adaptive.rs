//! Program-dependent attack/release retuning.
//!
//! The controller runs once per block, before the sample loop. It measures
//! the block, updates its history and hands back the attack/release times
//! the envelope follower should use for this block. It never touches the
//! gain computer.
//!
//! Two strategies exist:
//!
//! - [`AdaptiveStrategy::BlockHistory`]: averages transient density and the
//!   spread of block RMS over the last [`HISTORY_CAPACITY`] blocks.
//! - [`AdaptiveStrategy::PreviousBlockCrest`]: looks only at the crest
//!   factor of the *previous* block. The current block is measured but only
//!   takes effect on the next call, a deliberate one-block delay.
//!
//! Every returned time is clamped to the profile's bounds.

use dynamix_core::sanitize;

/// Blocks remembered by the history strategy.
pub const HISTORY_CAPACITY: usize = 10;

/// How the effective attack/release times are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdaptiveStrategy {
    /// Use the user's times unchanged.
    #[default]
    None,
    /// Rolling transient density and RMS-variation history.
    BlockHistory,
    /// Crest factor of the previous block.
    PreviousBlockCrest,
}

/// Measurements of one input block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockStats {
    /// Mean positive sample-to-sample rise of `|x|`.
    pub transient_density: f32,
    /// RMS over all channels.
    pub rms: f32,
    /// Peak `|x|` over all channels.
    pub peak: f32,
}

impl BlockStats {
    /// Measure a planar block. Non-finite samples count as silence.
    pub fn measure(channels: &[&[f32]]) -> Self {
        let mut rise = 0.0f64;
        let mut rise_count = 0usize;
        let mut sum_sq = 0.0f64;
        let mut count = 0usize;
        let mut peak = 0.0f32;

        for channel in channels {
            let mut previous: Option<f32> = None;
            for &x in channel.iter() {
                let magnitude = sanitize(x).abs();
                sum_sq += f64::from(magnitude) * f64::from(magnitude);
                peak = peak.max(magnitude);
                if let Some(p) = previous {
                    rise += f64::from((magnitude - p).max(0.0));
                    rise_count += 1;
                }
                previous = Some(magnitude);
            }
            count += channel.len();
        }

        Self {
            transient_density: if rise_count > 0 {
                (rise / rise_count as f64) as f32
            } else {
                0.0
            },
            rms: if count > 0 {
                (sum_sq / count as f64).sqrt() as f32
            } else {
                0.0
            },
            peak,
        }
    }
}

/// Fixed-capacity FIFO of block measurements.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    values: [f32; HISTORY_CAPACITY],
    len: usize,
    next: usize,
}

impl RollingHistory {
    /// Empty history.
    pub const fn new() -> Self {
        Self {
            values: [0.0; HISTORY_CAPACITY],
            len: 0,
            next: 0,
        }
    }

    /// Append a value, evicting the oldest once full.
    pub fn push(&mut self, value: f32) {
        self.values[self.next] = value;
        self.next = (self.next + 1) % HISTORY_CAPACITY;
        self.len = (self.len + 1).min(HISTORY_CAPACITY);
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been pushed since the last clear.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mean of the stored values (0 when empty).
    pub fn mean(&self) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        self.stored().iter().sum::<f32>() / self.len as f32
    }

    /// Population standard deviation (0 when empty).
    pub fn std_dev(&self) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let var = self
            .stored()
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f32>()
            / self.len as f32;
        var.sqrt()
    }

    /// Drop all values.
    pub fn clear(&mut self) {
        self.len = 0;
        self.next = 0;
    }

    // Once full every slot is live; before that the first `len` are.
    fn stored(&self) -> &[f32] {
        &self.values[..self.len]
    }
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Feedback loop that retunes envelope ballistics from program material.
///
/// # Example
///
/// ```rust
/// use dynamix_dynamics::{AdaptiveStrategy, AdaptiveTimingController, BlockStats};
///
/// let mut ctl = AdaptiveTimingController::new(
///     AdaptiveStrategy::BlockHistory,
///     (0.5, 20.0),
///     (20.0, 200.0),
/// );
/// // Dense transients: attack halves
/// let stats = BlockStats { transient_density: 0.3, rms: 0.2, peak: 0.9 };
/// let (attack, _release) = ctl.update(&stats, 10.0, 100.0);
/// assert_eq!(attack, 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct AdaptiveTimingController {
    strategy: AdaptiveStrategy,
    attack_bounds: (f32, f32),
    release_bounds: (f32, f32),
    transients: RollingHistory,
    rms: RollingHistory,
    previous: Option<BlockStats>,
    effective_attack_ms: f32,
    effective_release_ms: f32,
}

impl AdaptiveTimingController {
    /// Create a controller. Bounds are `(min, max)` in milliseconds.
    pub fn new(
        strategy: AdaptiveStrategy,
        attack_bounds: (f32, f32),
        release_bounds: (f32, f32),
    ) -> Self {
        Self {
            strategy,
            attack_bounds,
            release_bounds,
            transients: RollingHistory::new(),
            rms: RollingHistory::new(),
            previous: None,
            effective_attack_ms: attack_bounds.0,
            effective_release_ms: release_bounds.0,
        }
    }

    /// Controller configured from a flavour profile.
    pub fn from_profile(profile: &crate::FlavorProfile) -> Self {
        let mut ctl = Self::new(
            profile.adaptive,
            profile.attack_bounds,
            profile.release_bounds,
        );
        ctl.effective_attack_ms = profile.default_attack_ms;
        ctl.effective_release_ms = profile.default_release_ms;
        ctl
    }

    /// Strategy in use.
    pub fn strategy(&self) -> AdaptiveStrategy {
        self.strategy
    }

    /// Observe one block and return `(attack_ms, release_ms)` for it.
    pub fn update(&mut self, stats: &BlockStats, user_attack: f32, user_release: f32) -> (f32, f32) {
        let (attack, release) = match self.strategy {
            AdaptiveStrategy::None => (user_attack, user_release),
            AdaptiveStrategy::BlockHistory => {
                self.transients.push(stats.transient_density);
                self.rms.push(stats.rms);
                (
                    history_attack(self.transients.mean(), user_attack, self.attack_bounds),
                    history_release(self.rms.std_dev(), user_release, self.release_bounds),
                )
            }
            AdaptiveStrategy::PreviousBlockCrest => {
                let timing = match self.previous {
                    Some(prev) => crest_timing(&prev, user_attack, user_release),
                    None => (user_attack, user_release),
                };
                self.previous = Some(*stats);
                timing
            }
        };

        let (attack, release) = match self.strategy {
            AdaptiveStrategy::None => (attack, release),
            _ => (
                attack.clamp(self.attack_bounds.0, self.attack_bounds.1),
                release.clamp(self.release_bounds.0, self.release_bounds.1),
            ),
        };

        if attack != self.effective_attack_ms || release != self.effective_release_ms {
            tracing::debug!(
                strategy = ?self.strategy,
                attack_ms = attack,
                release_ms = release,
                "adaptive timing retuned"
            );
        }
        self.effective_attack_ms = attack;
        self.effective_release_ms = release;
        (attack, release)
    }

    /// Attack time chosen for the most recent block.
    pub fn effective_attack_ms(&self) -> f32 {
        self.effective_attack_ms
    }

    /// Release time chosen for the most recent block.
    pub fn effective_release_ms(&self) -> f32 {
        self.effective_release_ms
    }

    /// Number of blocks in the rolling history.
    pub fn history_len(&self) -> usize {
        self.transients.len()
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.transients.clear();
        self.rms.clear();
        self.previous = None;
    }
}

fn history_attack(avg_transients: f32, user_attack: f32, bounds: (f32, f32)) -> f32 {
    if avg_transients > 0.1 {
        (user_attack * 0.5).max(bounds.0)
    } else if avg_transients < 0.05 {
        (user_attack * 1.2).min(bounds.1)
    } else {
        user_attack
    }
}

fn history_release(rms_variation: f32, user_release: f32, bounds: (f32, f32)) -> f32 {
    if rms_variation < 0.05 {
        (user_release * 1.5).min(bounds.1)
    } else if rms_variation > 0.15 {
        (user_release * 0.7).max(bounds.0)
    } else {
        user_release
    }
}

fn crest_timing(prev: &BlockStats, user_attack: f32, user_release: f32) -> (f32, f32) {
    let crest = prev.peak / (prev.rms + 0.001);
    let sustain = prev.rms / (prev.peak + 0.001);
    let attack = if crest > 3.0 {
        user_attack * 0.5
    } else {
        user_attack
    };
    let release = if sustain > 0.7 {
        user_release * 1.5
    } else {
        user_release
    };
    (attack, release)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(transient_density: f32, rms: f32, peak: f32) -> BlockStats {
        BlockStats {
            transient_density,
            rms,
            peak,
        }
    }

    #[test]
    fn test_measure_block() {
        let left = [0.0, 0.5, 0.0, 0.5];
        let right = [0.0; 4];
        let s = BlockStats::measure(&[&left[..], &right[..]]);
        assert_eq!(s.peak, 0.5);
        // Rises of 0.5 twice over 6 deltas
        assert!((s.transient_density - 1.0 / 6.0).abs() < 1e-6);
        assert!((s.rms - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_measure_ignores_non_finite() {
        let ch = [f32::NAN, 1.0, f32::INFINITY];
        let s = BlockStats::measure(&[&ch[..]]);
        assert!(s.rms.is_finite());
        assert_eq!(s.peak, 1.0);
    }

    #[test]
    fn test_measure_empty() {
        assert_eq!(BlockStats::measure(&[]), BlockStats::default());
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut h = RollingHistory::new();
        for i in 0..15 {
            h.push(i as f32);
        }
        assert_eq!(h.len(), HISTORY_CAPACITY);
        // Holds 5..=14
        assert!((h.mean() - 9.5).abs() < 1e-6);
    }

    #[test]
    fn test_history_std_dev() {
        let mut h = RollingHistory::new();
        assert_eq!(h.std_dev(), 0.0);
        h.push(1.0);
        h.push(3.0);
        assert!((h.std_dev() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_block_history_slow_material() {
        let mut ctl = AdaptiveTimingController::new(
            AdaptiveStrategy::BlockHistory,
            (0.5, 20.0),
            (20.0, 200.0),
        );
        // Sustained, quiet transients: slower attack, longer release
        let (a, r) = ctl.update(&stats(0.01, 0.3, 0.4), 10.0, 100.0);
        assert!((a - 12.0).abs() < 1e-5);
        assert!((r - 150.0).abs() < 1e-4);
    }

    #[test]
    fn test_block_history_bounds_hold() {
        let mut ctl = AdaptiveTimingController::new(
            AdaptiveStrategy::BlockHistory,
            (0.5, 20.0),
            (20.0, 200.0),
        );
        let (a, r) = ctl.update(&stats(0.5, 0.1, 1.0), 0.1, 1000.0);
        assert_eq!(a, 0.5);
        assert_eq!(r, 200.0);
        let (a, _) = ctl.update(&stats(0.0, 0.1, 1.0), 100.0, 100.0);
        assert!(a <= 20.0);
    }

    #[test]
    fn test_block_history_release_speeds_up_on_variation() {
        let mut ctl = AdaptiveTimingController::new(
            AdaptiveStrategy::BlockHistory,
            (0.5, 20.0),
            (20.0, 200.0),
        );
        ctl.update(&stats(0.07, 0.0, 0.0), 5.0, 100.0);
        let (a, r) = ctl.update(&stats(0.07, 0.8, 1.0), 5.0, 100.0);
        // Middle transient band keeps the user attack
        assert_eq!(a, 5.0);
        // std dev 0.4 > 0.15
        assert!((r - 70.0).abs() < 1e-4);
        assert_eq!(ctl.history_len(), 2);
    }

    #[test]
    fn test_previous_block_crest_is_one_block_late() {
        let mut ctl = AdaptiveTimingController::new(
            AdaptiveStrategy::PreviousBlockCrest,
            (0.5, 50.0),
            (20.0, 1500.0),
        );
        let spiky = stats(0.2, 0.05, 0.9);
        // First block: no previous analysis, user times
        assert_eq!(ctl.update(&spiky, 10.0, 100.0), (10.0, 100.0));
        // Second block reacts to the first
        let sustained = stats(0.0, 0.8, 0.9);
        let (a, r) = ctl.update(&sustained, 10.0, 100.0);
        assert_eq!(a, 5.0);
        assert_eq!(r, 100.0);
        // Third block reacts to the sustained second
        let (a, r) = ctl.update(&spiky, 10.0, 100.0);
        assert_eq!(a, 10.0);
        assert!((r - 150.0).abs() < 1e-4);
    }

    #[test]
    fn test_crest_never_inverts() {
        let mut ctl = AdaptiveTimingController::new(
            AdaptiveStrategy::PreviousBlockCrest,
            (0.5, 50.0),
            (20.0, 1500.0),
        );
        ctl.update(&stats(0.0, 0.0, 1.0), 0.1, 1000.0);
        let (a, r) = ctl.update(&stats(0.0, 1.0, 1.0), 0.1, 1000.0);
        assert!((0.5..=50.0).contains(&a));
        assert!((20.0..=1500.0).contains(&r));
    }

    #[test]
    fn test_none_passes_through() {
        let mut ctl = AdaptiveTimingController::new(AdaptiveStrategy::None, (0.5, 20.0), (20.0, 200.0));
        assert_eq!(ctl.update(&stats(1.0, 1.0, 1.0), 80.0, 900.0), (80.0, 900.0));
    }

    #[test]
    fn test_reset_clears_history() {
        let mut ctl = AdaptiveTimingController::new(
            AdaptiveStrategy::BlockHistory,
            (0.5, 20.0),
            (20.0, 200.0),
        );
        ctl.update(&stats(0.2, 0.1, 0.5), 5.0, 50.0);
        ctl.reset();
        assert_eq!(ctl.history_len(), 0);
    }
}

//! Envelope follower operating in the dB domain.
//!
//! The detector level is converted to dBFS before smoothing, so attack and
//! release times describe a constant dB-per-time slope regardless of signal
//! level. Silence maps to [`SILENCE_DB`](crate::SILENCE_DB) rather than `-inf`.

use crate::math::{SILENCE_DB, level_to_db, time_constant_coeff};

/// One-pole ballistics filter tracking signal level in dBFS.
///
/// ```text
/// coeff = attack_coeff   if input_db > envelope
///         release_coeff  otherwise
/// envelope = input_db + coeff * (envelope - input_db)
/// ```
///
/// # Example
///
/// ```rust
/// use dynamix_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::new(48000.0);
/// env.set_attack_ms(1.0);
/// env.set_release_ms(100.0);
///
/// for _ in 0..4800 {
///     env.update(-6.0);
/// }
/// assert!((env.level_db() + 6.0).abs() < 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    /// Current envelope level in dBFS
    envelope_db: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl EnvelopeFollower {
    /// Create a new envelope follower resting at the silence floor.
    ///
    /// Defaults:
    /// - Attack: 10ms
    /// - Release: 100ms
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(sample_rate, 10.0, 100.0)
    }

    /// Create with specified attack and release times.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            envelope_db: SILENCE_DB,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack_ms: attack_ms.max(0.1),
            release_ms: release_ms.max(1.0),
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Set the attack time in milliseconds (minimum 0.1 ms).
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms.max(0.1);
        self.attack_coeff = time_constant_coeff(self.attack_ms, self.sample_rate);
    }

    /// Get current attack time in milliseconds.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Set the release time in milliseconds (minimum 1 ms).
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.max(1.0);
        self.release_coeff = time_constant_coeff(self.release_ms, self.sample_rate);
    }

    /// Get current release time in milliseconds.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Set both times, recomputing coefficients only for values that changed.
    ///
    /// Called once per block by processors whose timing is retuned adaptively.
    pub fn set_times(&mut self, attack_ms: f32, release_ms: f32) {
        if attack_ms.max(0.1) != self.attack_ms {
            self.set_attack_ms(attack_ms);
        }
        if release_ms.max(1.0) != self.release_ms {
            self.set_release_ms(release_ms);
        }
    }

    /// Update sample rate and recalculate coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Advance the envelope by one sample given the detector level in dB.
    ///
    /// A non-finite input is treated as silence, so the stored envelope can
    /// never become NaN.
    #[inline]
    pub fn update(&mut self, input_db: f32) -> f32 {
        let input_db = if input_db.is_finite() {
            input_db
        } else {
            SILENCE_DB
        };

        let coeff = if input_db > self.envelope_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };

        self.envelope_db = input_db + coeff * (self.envelope_db - input_db);
        self.envelope_db
    }

    /// Rectify a linear sample, convert to dB and advance the envelope.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.update(level_to_db(input.abs()))
    }

    /// Current envelope level in dBFS without processing new input.
    pub fn level_db(&self) -> f32 {
        self.envelope_db
    }

    /// Reset the envelope to the silence floor.
    pub fn reset(&mut self) {
        self.envelope_db = SILENCE_DB;
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = time_constant_coeff(self.attack_ms, self.sample_rate);
        self.release_coeff = time_constant_coeff(self.release_ms, self.sample_rate);
    }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_starts_at_floor() {
        let env = EnvelopeFollower::new(48000.0);
        assert_eq!(env.level_db(), SILENCE_DB);
    }

    #[test]
    fn test_envelope_attack() {
        let mut env = EnvelopeFollower::new(48000.0);
        env.set_attack_ms(1.0);

        let mut level = SILENCE_DB;
        for _ in 0..480 {
            level = env.update(0.0);
        }

        // Ten time constants: within 96 dB * e^-10
        assert!(level > -0.01, "Envelope should rise to 0 dB, got {}", level);
    }

    #[test]
    fn test_envelope_release() {
        let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 10.0);
        for _ in 0..480 {
            env.update(0.0);
        }

        // One release time constant toward -96 dB covers ~63% of the distance
        for _ in 0..480 {
            env.update(SILENCE_DB);
        }
        let expected = SILENCE_DB * (1.0 - (-1.0f32).exp());
        assert!(
            (env.level_db() - expected).abs() < 0.5,
            "Expected ~{}, got {}",
            expected,
            env.level_db()
        );
    }

    #[test]
    fn test_envelope_single_step_matches_formula() {
        let mut env = EnvelopeFollower::with_times(48000.0, 10.0, 100.0);
        env.update(-20.0);
        let coeff = time_constant_coeff(10.0, 48000.0);
        let expected = -20.0 + coeff * (SILENCE_DB + 20.0);
        assert!((env.level_db() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_envelope_non_finite_is_silence() {
        let mut env = EnvelopeFollower::new(48000.0);
        env.update(-3.0);
        env.update(f32::NAN);
        assert!(env.level_db().is_finite());
        env.update(f32::INFINITY);
        assert!(env.level_db().is_finite());
    }

    #[test]
    fn test_envelope_process_rectifies() {
        let mut env = EnvelopeFollower::with_times(48000.0, 0.1, 100.0);
        let a = env.process(-0.5);
        env.reset();
        let b = env.process(0.5);
        assert_eq!(a, b);
        assert!(a > SILENCE_DB);
    }

    #[test]
    fn test_envelope_reset() {
        let mut env = EnvelopeFollower::new(48000.0);
        for _ in 0..100 {
            env.update(0.0);
        }
        env.reset();
        assert_eq!(env.level_db(), SILENCE_DB);
    }

    #[test]
    fn test_set_times_clamps() {
        let mut env = EnvelopeFollower::new(48000.0);
        env.set_times(0.0, 0.0);
        assert_eq!(env.attack_ms(), 0.1);
        assert_eq!(env.release_ms(), 1.0);
    }
}

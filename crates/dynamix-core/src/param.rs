//! Parameter smoothing for click-free automation.
//!
//! Makeup gain and mix change per block when the control side writes new
//! values. Jumping straight to the new value produces an audible step, so the
//! processor ramps toward it with a one-pole smoother.

use libm::expf;

/// Exponentially smoothed parameter.
///
/// ```text
/// y[n] = y[n-1] + coeff * (target - y[n-1])
/// coeff = 1 - exp(-1 / (tau * sample_rate))
/// ```
///
/// # Example
///
/// ```rust
/// use dynamix_core::SmoothedParam;
///
/// let mut gain = SmoothedParam::with_config(1.0, 48000.0, 10.0);
/// gain.set_target(0.5);
/// for _ in 0..4800 {
///     gain.advance();
/// }
/// assert!((gain.get() - 0.5).abs() < 0.001);
/// ```
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create a parameter at `initial` with the default 10 ms smoothing at 48 kHz.
    pub fn new(initial: f32) -> Self {
        Self::with_config(initial, 48000.0, 10.0)
    }

    /// Create with explicit sample rate and smoothing time.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate,
            smoothing_time_ms,
        };
        param.recalculate_coeff();
        param
    }

    /// Set the value the parameter will ramp toward.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and snap to it.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update sample rate and recalculate the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Set smoothing time in milliseconds. Zero disables smoothing.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Advance by one sample and return the smoothed value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Whether the value has reached its target (within 1e-6).
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// Jump to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = self.smoothing_time_ms / 1000.0 * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

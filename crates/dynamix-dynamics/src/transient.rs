//! Transient detection for gain preservation.
//!
//! Compares the current frame's energy with the mean of the previous
//! [`TRANSIENT_WINDOW`] frames. A frame well above its recent average is a
//! transient, and the processor pulls the gain back toward unity by the
//! detected strength. History carries over between blocks, so a transient on
//! the first sample of a block is judged against the end of the last one.

/// Frames of history the current frame is compared against.
pub const TRANSIENT_WINDOW: usize = 5;

/// Energy ratio at which detection starts.
const ONSET_RATIO: f32 = 1.5;

/// Ratio span from onset to full strength.
const RATIO_SPAN: f32 = 2.0;

/// Rolling cross-channel energy detector.
///
/// # Example
///
/// ```rust
/// use dynamix_dynamics::TransientDetector;
///
/// let mut det = TransientDetector::new();
/// for _ in 0..8 {
///     assert_eq!(det.process_frame(0.01), 0.0);
/// }
/// assert_eq!(det.process_frame(1.0), 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransientDetector {
    history: [f32; TRANSIENT_WINDOW],
    next: usize,
    filled: usize,
}

impl TransientDetector {
    /// Detector with empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's energy (sum of `|x|` over channels).
    ///
    /// Returns the transient strength in \[0, 1\]. Until a full window of
    /// history exists the result is 0.
    #[inline]
    pub fn process_frame(&mut self, energy: f32) -> f32 {
        let energy = if energy.is_finite() { energy.abs() } else { 0.0 };
        let strength = if self.filled == TRANSIENT_WINDOW {
            let previous = self.history.iter().sum::<f32>() / TRANSIENT_WINDOW as f32;
            let ratio = energy / (previous + 0.001);
            ((ratio - ONSET_RATIO) / RATIO_SPAN).clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.history[self.next] = energy;
        self.next = (self.next + 1) % TRANSIENT_WINDOW;
        self.filled = (self.filled + 1).min(TRANSIENT_WINDOW);
        strength
    }

    /// Clear the history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Blend `gain` back toward unity by `strength × amount`.
#[inline]
pub fn preserve_transient(gain: f32, strength: f32, amount: f32) -> f32 {
    gain + strength * amount * (1.0 - gain)
}

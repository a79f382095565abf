//! FFT wrapper with windowing functions

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    #[default]
    Hann,
    /// Hamming window
    Hamming,
    /// Blackman window
    Blackman,
}

impl Window {
    /// Weight of sample `i` in a window of length `n`.
    #[inline]
    pub fn weight(&self, i: usize, n: usize) -> f32 {
        let x = 2.0 * PI * i as f32 / n as f32;
        match self {
            Window::Rectangular => 1.0,
            Window::Hann => 0.5 * (1.0 - x.cos()),
            Window::Hamming => 0.54 - 0.46 * x.cos(),
            Window::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
        }
    }

    /// Apply window to a buffer
    pub fn apply(&self, buffer: &mut [f32]) {
        let n = buffer.len();
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample *= self.weight(i, n);
        }
    }

    /// Get window coefficients
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs);
        coeffs
    }

    /// Amplitude normalisation for a window of `size`: half the window sum,
    /// so a full-scale sine centred on a bin reads 1.0.
    pub fn amplitude_scale(&self, size: usize) -> f32 {
        let sum: f32 = (0..size).map(|i| self.weight(i, size)).sum();
        if sum > 0.0 { 2.0 / sum } else { 0.0 }
    }
}

/// Forward FFT with a cached plan.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish()
    }
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of bins from DC to Nyquist.
    pub fn bins(&self) -> usize {
        self.size / 2 + 1
    }

    /// Perform forward FFT on real input
    ///
    /// Input is zero-padded or truncated to the FFT size. Returns the
    /// `size/2 + 1` bins from DC to Nyquist.
    pub fn forward(&self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer.truncate(self.bins());
        buffer
    }

    /// Amplitude spectrum of `signal`, averaged over half-overlapping frames.
    ///
    /// Each frame is windowed over its real length (a signal shorter than
    /// the FFT size is one zero-padded frame) and scaled by
    /// [`Window::amplitude_scale`].
    pub fn amplitude_spectrum(&self, signal: &[f32], window: Window) -> Vec<f32> {
        let mut average = vec![0.0f32; self.bins()];
        if signal.is_empty() {
            return average;
        }

        let hop = (self.size / 2).max(1);
        let mut frames = 0usize;
        let mut start = 0usize;
        let mut frame = Vec::with_capacity(self.size);
        loop {
            let end = (start + self.size).min(signal.len());
            let len = end - start;
            frame.clear();
            frame.extend_from_slice(&signal[start..end]);
            window.apply(&mut frame);
            let scale = window.amplitude_scale(len);

            for (acc, bin) in average.iter_mut().zip(self.forward(&frame)) {
                *acc += bin.norm() * scale;
            }
            frames += 1;

            if end == signal.len() || start + hop + self.size > signal.len() {
                break;
            }
            start += hop;
        }

        let inv = 1.0 / frames as f32;
        for value in &mut average {
            *value *= inv;
        }
        average
    }
}

/// Compute magnitude spectrum in dB
pub fn magnitude_db(spectrum: &[f32]) -> Vec<f32> {
    spectrum
        .iter()
        .map(|&mag| 20.0 * (mag + 1e-10).log10())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, amp: f32, len: usize, sr: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (2.0 * PI * freq * i as f32 / sr).sin())
            .collect()
    }

    #[test]
    fn test_window_hann() {
        let mut buffer = vec![1.0; 100];
        Window::Hann.apply(&mut buffer);

        // Hann window should be 0 at edges, 1 at center
        assert!(buffer[0] < 0.01);
        assert!(buffer[99] < 0.01);
        assert!((buffer[50] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_amplitude_normalisation() {
        // 1500 Hz sits exactly on bin 256 of an 8192 FFT at 48 kHz
        let fft = Fft::new(8192);
        let spectrum = fft.amplitude_spectrum(&sine(1500.0, 0.5, 8192, 48000.0), Window::Hann);
        assert!((spectrum[256] - 0.5).abs() < 0.01, "peak {}", spectrum[256]);
        assert!(spectrum[1000] < 1e-3);
    }

    #[test]
    fn test_averaging_keeps_level() {
        let fft = Fft::new(1024);
        let single = fft.amplitude_spectrum(&sine(1500.0, 0.8, 1024, 48000.0), Window::Hann);
        let long = fft.amplitude_spectrum(&sine(1500.0, 0.8, 10 * 1024, 48000.0), Window::Hann);
        // 1500 Hz is bin 32 at 1024 points
        assert!((single[32] - long[32]).abs() < 0.02);
    }

    #[test]
    fn test_dc_detection() {
        let fft = Fft::new(256);
        let spectrum = fft.forward(&[1.0; 256]);

        let dc_mag = spectrum[0].norm();
        let other_mag: f32 = spectrum[1..].iter().map(|c| c.norm()).sum();

        assert!(dc_mag > other_mag * 10.0);
        assert_eq!(spectrum.len(), 129);
    }

    #[test]
    fn test_empty_signal() {
        let fft = Fft::new(64);
        assert!(fft.amplitude_spectrum(&[], Window::Hann).iter().all(|&m| m == 0.0));
    }
}

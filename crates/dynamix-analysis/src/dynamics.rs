//! Level and dynamics helpers used by the analyzer
//!
//! - RMS and peak level
//! - Crest factor
//! - Windowed RMS and transient counting
//! - Mono downmix of planar channels

/// Average planar channels into one mono buffer.
///
/// The result is as long as the shortest channel. Non-finite samples count
/// as silence.
pub fn downmix<C: AsRef<[f32]>>(channels: &[C]) -> Vec<f32> {
    let Some(len) = channels.iter().map(|c| c.as_ref().len()).min() else {
        return Vec::new();
    };
    let scale = 1.0 / channels.len() as f32;
    let mut mono = vec![0.0f32; len];
    for channel in channels {
        for (acc, &x) in mono.iter_mut().zip(channel.as_ref()) {
            if x.is_finite() {
                *acc += x;
            }
        }
    }
    for x in &mut mono {
        *x *= scale;
    }
    mono
}

/// Compute RMS (Root Mean Square) level of a signal
///
/// Returns RMS value in linear scale (not dB)
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }

    let sum_sq: f32 = signal.iter().map(|&x| x * x).sum();
    (sum_sq / signal.len() as f32).sqrt()
}

/// Compute peak level (maximum absolute value)
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |m, x| m.max(x.abs()))
}

/// Crest factor `20·log10(peak / (rms + 1e-10))` in dB, 0 for silence.
///
/// Typical values:
/// - Sine wave: 3 dB
/// - Music: 12-18 dB
/// - Heavily compressed: 6-12 dB
pub fn crest_factor_db(signal: &[f32]) -> f32 {
    let peak = peak(signal);
    if peak <= 0.0 {
        return 0.0;
    }
    20.0 * (peak / (rms(signal) + 1e-10)).log10()
}

/// RMS of consecutive non-overlapping windows. A trailing partial window is
/// dropped.
pub fn windowed_rms(signal: &[f32], window_size: usize) -> Vec<f32> {
    if window_size == 0 {
        return Vec::new();
    }
    signal.chunks_exact(window_size).map(rms).collect()
}

/// Number of windows whose RMS exceeds `ratio` times the previous window's.
pub fn count_level_jumps(signal: &[f32], window_size: usize, ratio: f32) -> usize {
    windowed_rms(signal, window_size)
        .windows(2)
        .filter(|pair| pair[1] > pair[0] * ratio)
        .count()
}

//! Block processing trait shared by every processor in the workspace.
//!
//! A [`BlockProcessor`] consumes one block of non-interleaved channel
//! buffers and writes the same shape to its output. Blocks must arrive in
//! order: processors keep envelope and timing state across calls.
//!
//! ## Design Decisions
//!
//! - **Planar buffers**: `&[&[f32]]` in, `&mut [&mut [f32]]` out, one slice
//!   per channel, all the same length.
//! - **Object-safe**: hosts store `Box<dyn BlockProcessor>` when the
//!   processor type is chosen at runtime.
//! - **No allocations**: `process` runs on the audio thread.

/// Core trait for multichannel block processors.
///
/// # Example
///
/// ```rust
/// use dynamix_core::BlockProcessor;
///
/// struct Trim(f32);
///
/// impl BlockProcessor for Trim {
///     fn process(&mut self, input: &[&[f32]], output: &mut [&mut [f32]]) {
///         for (inp, out) in input.iter().zip(output.iter_mut()) {
///             for (x, y) in inp.iter().zip(out.iter_mut()) {
///                 *y = x * self.0;
///             }
///         }
///     }
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///     fn reset(&mut self) {}
/// }
///
/// let mut trim = Trim(0.5);
/// let left = [1.0, 0.5];
/// let mut out = [0.0; 2];
/// trim.process(&[&left], &mut [&mut out]);
/// assert_eq!(out, [0.5, 0.25]);
/// ```
pub trait BlockProcessor {
    /// Process one block.
    ///
    /// `input` and `output` must have the same channel count and every
    /// channel the same length.
    fn process(&mut self, input: &[&[f32]], output: &mut [&mut [f32]]);

    /// Update the sample rate and recompute rate-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear envelope, filter and delay state without touching parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Default is 0.
    fn latency_samples(&self) -> usize {
        0
    }
}

/// Check that `input` and `output` have matching channel counts and lengths.
///
/// Returns the first mismatch found as `(channel, input_len, output_len)`;
/// a channel-count mismatch is reported with `channel = usize::MAX`.
pub fn buffer_mismatch(
    input: &[&[f32]],
    output: &[&mut [f32]],
) -> Option<(usize, usize, usize)> {
    if input.len() != output.len() {
        return Some((usize::MAX, input.len(), output.len()));
    }
    let frames = input.first().map_or(0, |c| c.len());
    input
        .iter()
        .zip(output.iter())
        .enumerate()
        .find(|(_, (i, o))| i.len() != frames || o.len() != frames)
        .map(|(ch, (i, o))| (ch, i.len(), o.len()))
}

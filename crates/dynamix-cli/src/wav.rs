//! Planar WAV I/O on top of `hound`.

use std::path::Path;

use anyhow::Context;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Decoded audio, one `Vec` per channel.
pub struct Audio {
    /// Planar samples.
    pub channels: Vec<Vec<f32>>,
    /// Sample rate (Hz).
    pub sample_rate: u32,
}

impl Audio {
    /// Frames per channel.
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Borrowed channel slices.
    pub fn planes(&self) -> Vec<&[f32]> {
        self.channels.iter().map(Vec::as_slice).collect()
    }
}

/// Read a WAV file. Integer PCM is scaled to [-1, 1).
pub fn read_wav(path: &Path) -> anyhow::Result<Audio> {
    let reader =
        WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channel_count = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .with_context(|| format!("decoding {}", path.display()))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .with_context(|| format!("decoding {}", path.display()))?
        }
    };

    let frames = interleaved.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in interleaved.chunks_exact(channel_count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    Ok(Audio {
        channels,
        sample_rate: spec.sample_rate,
    })
}

/// Write planar channels. 32-bit output is float, 16 and 24 are PCM.
pub fn write_wav(path: &Path, audio: &Audio, bit_depth: u16) -> anyhow::Result<()> {
    let float = match bit_depth {
        16 | 24 => false,
        32 => true,
        other => anyhow::bail!("unsupported bit depth {other} (use 16, 24 or 32)"),
    };
    let spec = WavSpec {
        channels: u16::try_from(audio.channels.len()).context("too many channels")?,
        sample_rate: audio.sample_rate,
        bits_per_sample: bit_depth,
        sample_format: if float {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("creating {}", path.display()))?;
    let max = (1i32 << (bit_depth - 1)) as f32;

    for n in 0..audio.frames() {
        for channel in &audio.channels {
            let sample = channel[n];
            if float {
                writer.write_sample(sample)?;
            } else {
                writer.write_sample((sample * max).clamp(-max, max - 1.0) as i32)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

//! File-based processing command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use dynamix_config::EngineConfig;
use dynamix_core::{BlockProcessor, level_to_db};
use dynamix_dynamics::{DynamicsProcessor, Flavor, Levels, MAX_CHANNELS};
use dynamix_registry::ProcessorRegistry;
use indicatif::{ProgressBar, ProgressStyle};

use super::common::{library, parse_key_val};
use crate::wav::{Audio, read_wav, write_wav};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Compressor flavor (vintage, modern, vocal, multiband)
    #[arg(short, long)]
    flavor: Option<Flavor>,

    /// Preset: factory id, name in a preset directory, or file path
    #[arg(short, long)]
    preset: Option<String>,

    /// Parameter override, e.g. "threshold=-18" (repeatable)
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, f32)>,

    /// Processing block size (defaults to the config value)
    #[arg(long)]
    block_size: Option<usize>,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Pass audio through unprocessed
    #[arg(long)]
    bypass: bool,
}

pub fn run(args: ProcessArgs, config: &EngineConfig) -> anyhow::Result<()> {
    println!("Reading {}...", args.input.display());
    let input = read_wav(&args.input)?;
    let channels = input.channels.len();
    let frames = input.frames();
    let sample_rate = input.sample_rate as f32;
    println!(
        "  {frames} frames, {channels} channel(s), {} Hz, {:.2}s",
        input.sample_rate,
        frames as f32 / sample_rate
    );
    if channels > MAX_CHANNELS {
        anyhow::bail!("{channels} channels is more than the supported {MAX_CHANNELS}");
    }

    let preset = args
        .preset
        .as_deref()
        .map(|name| library(config).find(name))
        .transpose()?;
    let flavor = args
        .flavor
        .or_else(|| preset.as_ref().map(|(p, _)| p.flavor))
        .unwrap_or(config.flavor);

    let registry = ProcessorRegistry::new();
    let mut processor = registry
        .try_create(flavor.id(), sample_rate, channels)
        .with_context(|| format!("creating {flavor} processor"))?;

    if let Some((preset, source)) = &preset {
        let applied = preset.apply(&processor);
        println!("Preset: {} ({applied} parameters, {source:?})", preset.name);
    }
    for (id, value) in &args.param {
        let Some(stored) = processor.set_parameter(id, *value) else {
            anyhow::bail!(
                "'{id}' is not a {flavor} parameter (see `dynamix params --flavor {flavor}`)"
            );
        };
        if stored != *value {
            println!("  {id} clamped to {stored}");
        }
    }
    processor.set_enabled(!args.bypass);
    processor.reset();

    println!(
        "Processing with {} ({})...",
        flavor.name(),
        if args.bypass { "bypassed" } else { "active" }
    );
    let block_size = args.block_size.unwrap_or(config.block_size).max(1);
    let output = process_audio(&mut processor, &input, block_size)?;

    let snapshot = processor.analysis();
    let in_levels = Levels::measure(&input.channels);
    let out_levels = Levels::measure(&output.channels);
    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        level_to_db(in_levels.rms),
        level_to_db(in_levels.peak)
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        level_to_db(out_levels.rms),
        level_to_db(out_levels.peak)
    );
    println!("\nLast block:");
    println!("  Gain reduction: {:.1} dB", snapshot.gain_reduction);
    println!("  Dynamic range:  {:.1} dB", snapshot.dynamic_range);
    if flavor == Flavor::Multiband {
        let reductions: Vec<String> = snapshot
            .band_reductions
            .iter()
            .map(|r| format!("{r:.1}"))
            .collect();
        println!("  Band reductions: [{}] dB", reductions.join(", "));
    }

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &output, args.bit_depth)?;
    println!("Done!");
    Ok(())
}

/// Run the whole file through `processor` in blocks, then flush the
/// lookahead so the output lines up with the input.
fn process_audio(
    processor: &mut DynamicsProcessor,
    input: &Audio,
    block_size: usize,
) -> anyhow::Result<Audio> {
    let frames = input.frames();
    let channels = input.channels.len();
    let mut output = vec![vec![0.0f32; frames]; channels];

    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut start = 0;
    while start < frames {
        let end = (start + block_size).min(frames);
        let ins: Vec<&[f32]> = input.channels.iter().map(|c| &c[start..end]).collect();
        let mut outs: Vec<&mut [f32]> = output.iter_mut().map(|c| &mut c[start..end]).collect();
        processor.try_process(&ins, &mut outs)?;
        start = end;
        pb.set_position(start as u64);
    }
    pb.finish_with_message("done");

    let latency = processor.latency_samples().min(frames);
    if latency > 0 {
        let silence = vec![0.0f32; latency];
        let mut tail = vec![vec![0.0f32; latency]; channels];
        let ins: Vec<&[f32]> = (0..channels).map(|_| silence.as_slice()).collect();
        let mut outs: Vec<&mut [f32]> = tail.iter_mut().map(Vec::as_mut_slice).collect();
        processor.try_process(&ins, &mut outs)?;
        for (channel, tail) in output.iter_mut().zip(tail) {
            channel.drain(..latency);
            channel.extend(tail);
        }
        tracing::debug!(latency, "compensated lookahead delay");
    }

    Ok(Audio {
        channels: output,
        sample_rate: input.sample_rate,
    })
}

//! Spectral analysis command.

use std::path::PathBuf;

use clap::Args;
use dynamix_analysis::{AnalysisReport, EqCurvePoint, EqGoal, SpectralAnalyzer};

use super::common::header;
use crate::wav::read_wav;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Reference WAV file to match the tonal balance against
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Auto-EQ goal (clarity, warmth, brightness, punch, balance)
    #[arg(short, long, default_value = "balance")]
    goal: EqGoal,

    /// FFT size
    #[arg(long, default_value_t = dynamix_analysis::DEFAULT_FFT_SIZE)]
    fft_size: usize,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let audio = read_wav(&args.input)?;
    let analyzer = SpectralAnalyzer::with_fft_size(audio.sample_rate as f32, args.fft_size);
    let report = analyzer.analyze(&audio.channels, args.goal);

    let matched = match &args.reference {
        Some(path) => {
            let reference = read_wav(path)?;
            if reference.sample_rate != audio.sample_rate {
                tracing::warn!(
                    input = audio.sample_rate,
                    reference = reference.sample_rate,
                    "sample rates differ, matching by frequency anyway"
                );
            }
            Some(analyzer.match_reference(&audio.channels, &reference.channels))
        }
        None => None,
    };

    if args.json {
        let mut value = serde_json::to_value(&report)?;
        if let (Some(matched), Some(object)) = (&matched, value.as_object_mut()) {
            object.insert("reference_match".into(), serde_json::to_value(matched)?);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_report(&args.input, &report);
    if let Some(matched) = &matched {
        println!();
        header("Reference Match");
        print_curve(matched);
    }
    Ok(())
}

fn print_report(path: &std::path::Path, report: &AnalysisReport) {
    header(&format!("Analysis: {}", path.display()));
    println!(
        "  {} samples, {} channel(s), {} Hz",
        report.samples, report.channels, report.sample_rate
    );
    println!(
        "  RMS {:.1} dB, Peak {:.1} dB, Crest {:.1} dB",
        report.rms_db, report.peak_db, report.crest_factor_db
    );

    println!();
    header("Spectrum");
    if report.spectrum.is_empty() {
        println!("  (too short to analyze)");
    } else {
        let loudest = report
            .spectrum
            .iter()
            .max_by(|a, b| a.magnitude_db.total_cmp(&b.magnitude_db));
        if let Some(band) = loudest {
            println!(
                "  {} bands, loudest {:.0} Hz at {:.1} dB",
                report.spectrum.len(),
                band.frequency,
                band.magnitude_db
            );
        }
    }

    println!();
    header("Tonal Balance");
    for (region, level) in report.tonal_balance.iter() {
        println!("  {:12} {level:7.1} dB", region.label());
    }

    println!();
    header("Problems");
    if report.problems.is_empty() {
        println!("  (none)");
    }
    for problem in &report.problems {
        println!(
            "  {:?} at {:.0} Hz ({}): {}",
            problem.kind, problem.frequency, problem.severity, problem.description
        );
    }

    println!();
    header("Source");
    let source = &report.source;
    println!(
        "  {} (confidence {:.0}%)",
        source.source_type,
        source.confidence * 100.0
    );
    if let Some(f0) = source.fundamental_frequency {
        println!("  Fundamental: {f0:.1} Hz");
    }
    println!("  Spectral centroid: {:.0} Hz", source.spectral_centroid);

    println!();
    header("Recommendation");
    let rec = &report.recommendation;
    println!("  Flavor: {}", rec.flavor);
    for (id, value) in &rec.params {
        println!("  {id:12} {value}");
    }
    println!("  {}", rec.reason);

    println!();
    header(&format!("Auto-EQ ({})", report.goal));
    print_curve(&report.auto_eq);
}

fn print_curve(curve: &[EqCurvePoint]) {
    if curve.is_empty() {
        println!("  (flat)");
    }
    for point in curve {
        println!(
            "  {:9} {:7.0} Hz {:+6.1} dB  Q {:.2}",
            format!("{:?}", point.kind),
            point.frequency,
            point.gain_db,
            point.q
        );
    }
}

//! Integration tests for the `dynamix` binary.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run `dynamix` with its config lookups pointed at `home`.
fn dynamix(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dynamix"))
        .args(args)
        .env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run dynamix")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_stereo(path: &Path, frames: usize) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 48000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for n in 0..frames {
        let t = n as f32 / 48000.0;
        writer
            .write_sample(0.8 * (2.0 * std::f32::consts::PI * 220.0 * t).sin())
            .unwrap();
        writer
            .write_sample(0.3 * (2.0 * std::f32::consts::PI * 3000.0 * t).sin())
            .unwrap();
    }
    writer.finalize().unwrap();
}

fn read_all(path: &Path) -> (hound::WavSpec, Vec<f32>) {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<f32>().map(Result::unwrap).collect();
    (spec, samples)
}

#[test]
fn flavors_lists_the_four_processors() {
    let home = TempDir::new().unwrap();
    let output = dynamix(home.path(), &["flavors"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for id in ["vintage", "modern", "vocal", "multiband"] {
        assert!(text.contains(id), "missing {id} in:\n{text}");
    }
    assert!(text.contains("4 registered."));
}

#[test]
fn params_lists_flavor_specific_controls() {
    let home = TempDir::new().unwrap();
    let output = dynamix(home.path(), &["params", "--flavor", "vocal"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("de_ess_amount"));
    assert!(text.contains("threshold"));
    assert!(!text.contains("band1_ratio"));
}

#[test]
fn presets_list_and_show() {
    let home = TempDir::new().unwrap();
    let output = dynamix(home.path(), &["presets", "list", "--flavor", "vintage"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("vintage-slam"));
    assert!(!text.contains("vocal-radio"));

    let output = dynamix(home.path(), &["presets", "show", "vocal-radio"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Radio Vocal"));
    assert!(text.contains("de_ess_amount"));
}

#[test]
fn saved_preset_is_listed_and_usable() {
    let home = TempDir::new().unwrap();
    let output = dynamix(
        home.path(),
        &["presets", "save", "tight", "--flavor", "modern", "--param", "ratio=6"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = stdout(&dynamix(home.path(), &["presets", "list"]));
    assert!(text.contains("tight"));

    let input = home.path().join("in.wav");
    let out = home.path().join("out.wav");
    write_stereo(&input, 4800);
    let output = dynamix(
        home.path(),
        &["process", input.to_str().unwrap(), out.to_str().unwrap(), "--preset", "tight"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("Preset: tight"));
}

#[test]
fn process_compresses_and_keeps_shape() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("in.wav");
    let out = home.path().join("out.wav");
    write_stereo(&input, 24000);

    let output = dynamix(
        home.path(),
        &[
            "process",
            input.to_str().unwrap(),
            out.to_str().unwrap(),
            "--flavor",
            "modern",
            "--param",
            "threshold=-30",
            "--param",
            "ratio=8",
            "--param",
            "lookahead=5",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("Gain reduction"));

    let (spec_in, dry) = read_all(&input);
    let (spec_out, wet) = read_all(&out);
    assert_eq!(spec_out.channels, spec_in.channels);
    assert_eq!(spec_out.sample_rate, spec_in.sample_rate);
    assert_eq!(wet.len(), dry.len());
    assert!(wet.iter().all(|y| y.is_finite() && y.abs() <= 1.0));
    let peak = |s: &[f32]| s.iter().fold(0.0f32, |m, y| m.max(y.abs()));
    assert!(peak(&wet[wet.len() / 2..]) < peak(&dry[dry.len() / 2..]));
}

#[test]
fn bypass_copies_the_file() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("in.wav");
    let out = home.path().join("out.wav");
    write_stereo(&input, 2000);

    let output = dynamix(
        home.path(),
        &["process", input.to_str().unwrap(), out.to_str().unwrap(), "--bypass"],
    );
    assert!(output.status.success());
    assert_eq!(read_all(&input).1, read_all(&out).1);
}

#[test]
fn unknown_parameter_fails() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("in.wav");
    write_stereo(&input, 512);
    let output = dynamix(
        home.path(),
        &[
            "process",
            input.to_str().unwrap(),
            home.path().join("out.wav").to_str().unwrap(),
            "--flavor",
            "modern",
            "--param",
            "warmth=10",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("warmth"));
}

#[test]
fn analyze_json_includes_reference_match() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("in.wav");
    let reference = home.path().join("ref.wav");
    write_stereo(&input, 16384);
    write_stereo(&reference, 16384);

    let output = dynamix(
        home.path(),
        &[
            "analyze",
            input.to_str().unwrap(),
            "--reference",
            reference.to_str().unwrap(),
            "--goal",
            "warmth",
            "--json",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["channels"], 2);
    assert_eq!(value["goal"], "warmth");
    assert!(value["source"]["type"].is_string());
    assert!(value["auto_eq"].is_array());
    // identical files need no correction
    assert_eq!(value["reference_match"].as_array().map(Vec::len), Some(0));
}

#[test]
fn analyze_text_report() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("in.wav");
    write_stereo(&input, 16384);
    let output = dynamix(home.path(), &["analyze", input.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Tonal Balance"));
    assert!(text.contains("Recommendation"));
    assert!(text.contains("Auto-EQ (balance)"));
}

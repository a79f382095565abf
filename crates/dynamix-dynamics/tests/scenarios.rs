//! End-to-end scenarios with known expected outcomes.

use dynamix_core::{BlockProcessor, time_constant_coeff};
use dynamix_dynamics::{DynamicsProcessor, Flavor};

const SR: f32 = 48000.0;
const BLOCK: usize = 480;

fn sine(freq: f32, amp: f32, n: usize) -> f32 {
    amp * (2.0 * std::f32::consts::PI * freq * n as f32 / SR).sin()
}

/// Feed `total` samples of `signal` to a mono processor in blocks and return
/// the gain reduction reported after each block plus the concatenated output.
fn run_mono(
    comp: &mut DynamicsProcessor,
    signal: impl Fn(usize) -> f32,
    total: usize,
) -> (Vec<f32>, Vec<f32>) {
    let mut reductions = Vec::new();
    let mut output = Vec::with_capacity(total);
    let mut start = 0;
    while start < total {
        let len = BLOCK.min(total - start);
        let input: Vec<f32> = (start..start + len).map(&signal).collect();
        let mut out = vec![0.0f32; len];
        comp.process(&[&input[..]], &mut [&mut out[..]]);
        reductions.push(comp.analysis().gain_reduction);
        output.extend_from_slice(&out);
        start += len;
    }
    (reductions, output)
}

fn plain_modern() -> DynamicsProcessor {
    let mut comp = DynamicsProcessor::new(Flavor::Modern, SR, 1);
    for (id, value) in [
        ("adaptive", 0.0),
        ("lookahead", 0.0),
        ("transient_preserve", 0.0),
        ("transparency", 100.0),
        ("knee", 0.0),
        ("makeup_gain", 0.0),
    ] {
        assert!(comp.set_parameter(id, value).is_some(), "{id}");
    }
    comp.reset();
    comp
}

#[test]
fn steady_sine_settles_at_static_reduction() {
    let mut comp = plain_modern();
    comp.set_parameter("threshold", -12.0);
    comp.set_parameter("ratio", 4.0);
    comp.set_parameter("attack", 1.0);
    comp.set_parameter("release", 500.0);

    let (reductions, output) = run_mono(&mut comp, |n| sine(1000.0, 1.0, n), 2 * SR as usize);

    // (0 - (-12)) * (1 - 1/4) = 9 dB, minus the envelope ripple below the peaks
    let last = reductions.last().copied().unwrap_or_default();
    assert!((last - 9.0).abs() < 0.5, "settled reduction {last}");
    assert!(output.iter().all(|y| y.is_finite()));

    let tail_peak = output[output.len() - 4800..]
        .iter()
        .fold(0.0f32, |m, y| m.max(y.abs()));
    let expected = 10f32.powf(-last / 20.0);
    assert!(
        (tail_peak - expected).abs() < 0.05,
        "tail peak {tail_peak}, expected about {expected}"
    );
}

#[test]
fn silence_in_silence_out() {
    for flavor in Flavor::ALL {
        let mut comp = DynamicsProcessor::new(flavor, SR, 1);
        let (reductions, output) = run_mono(&mut comp, |_| 0.0, SR as usize / 2);
        assert!(output.iter().all(|&y| y == 0.0), "{flavor}");
        assert!(reductions.iter().all(|&r| r == 0.0), "{flavor}");
        let snap = comp.analysis();
        assert_eq!(snap.input_level, -96.0);
        assert_eq!(snap.dynamic_range, 0.0);
    }
}

#[test]
fn spike_is_caught_and_released() {
    let mut comp = plain_modern();
    comp.set_parameter("threshold", -55.0);
    comp.set_parameter("attack", 0.1);
    comp.set_parameter("release", 100.0);

    let spike = |n: usize| if (24000..24010).contains(&n) { 1.0 } else { 0.0 };
    let (reductions, output) = run_mono(&mut comp, spike, SR as usize);

    let max = reductions.iter().fold(0.0f32, |m, &r| m.max(r));
    assert!(max > 20.0, "spike reduction {max}");
    assert_eq!(reductions.last().copied(), Some(0.0));
    assert!(output.iter().all(|y| y.is_finite() && y.abs() <= 1.0));
}

/// Constant-magnitude random-sign noise at -60 dBFS.
fn noise_bed(len: usize, seed: &mut u32) -> Vec<f32> {
    (0..len)
        .map(|_| {
            *seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            if *seed >> 31 == 0 { 0.001 } else { -0.001 }
        })
        .collect()
}

#[test]
fn single_sample_spike_moves_envelope_in_one_step() {
    let mut comp = plain_modern();
    for (id, value) in [
        ("threshold", -60.0),
        ("ratio", 20.0),
        ("attack", 0.1),
        ("release", 100.0),
    ] {
        assert_eq!(comp.set_parameter(id, value), Some(value), "{id}");
    }

    let mut seed = 7;
    for _ in 0..20 {
        let bed = noise_bed(BLOCK, &mut seed);
        let mut out = vec![0.0f32; BLOCK];
        comp.process(&[&bed[..]], &mut [&mut out[..]]);
    }
    let before = comp.analysis().gain_reduction;
    assert!(before < 0.01, "noise bed already reduced by {before}");

    // the spike is the last sample, so the snapshot reports its reduction
    let mut block = noise_bed(BLOCK, &mut seed);
    block[BLOCK - 1] = 1.0;
    let mut out = vec![0.0f32; BLOCK];
    comp.process(&[&block[..]], &mut [&mut out[..]]);
    let at_spike = comp.analysis().gain_reduction;

    // envelope steps from -60 dB toward 0 dB by (1 - attack_coeff) of the gap
    let coeff = time_constant_coeff(0.1, SR);
    let envelope = -60.0 * coeff;
    let expected = (envelope + 60.0) * (1.0 - 1.0 / 20.0);
    assert!(
        (at_spike - expected).abs() < 0.05,
        "reduction at spike {at_spike}, expected {expected}"
    );
    assert!(at_spike > 10.0);
}

#[test]
fn disabled_processor_copies_input() {
    for flavor in Flavor::ALL {
        let mut comp = DynamicsProcessor::new(flavor, SR, 2);
        comp.set_enabled(false);
        let left: Vec<f32> = (0..1024).map(|n| sine(440.0, 1.7, n)).collect();
        let right: Vec<f32> = (0..1024).map(|n| sine(97.0, 0.3, n)).collect();
        let mut out_l = vec![0.0f32; 1024];
        let mut out_r = vec![0.0f32; 1024];
        comp.process(&[&left[..], &right[..]], &mut [&mut out_l[..], &mut out_r[..]]);
        assert_eq!(out_l, left, "{flavor}");
        assert_eq!(out_r, right, "{flavor}");
    }
}

#[test]
fn lookahead_delays_the_signal() {
    let mut comp = plain_modern();
    comp.set_parameter("ratio", 1.0);
    comp.set_parameter("lookahead", 2.0);

    let impulse = |n: usize| if n == 0 { 0.5 } else { 0.0 };
    let (_, output) = run_mono(&mut comp, impulse, BLOCK);

    assert_eq!(comp.latency_samples(), 96);
    let position = output.iter().position(|&y| y != 0.0);
    assert_eq!(position, Some(96));
}

/// Run one stereo block, returning the count of non-zero output samples.
fn nonzero_after(comp: &mut DynamicsProcessor, value: f32) -> usize {
    let input = vec![value; BLOCK];
    let mut out_l = vec![0.0f32; BLOCK];
    let mut out_r = vec![0.0f32; BLOCK];
    comp.process(&[&input[..], &input[..]], &mut [&mut out_l[..], &mut out_r[..]]);
    out_l.iter().chain(&out_r).filter(|&&y| y != 0.0).count()
}

#[test]
fn lookahead_change_does_not_replay_old_audio() {
    let mut comp = DynamicsProcessor::new(Flavor::Modern, SR, 2);
    comp.set_parameter("ratio", 1.0);
    comp.set_parameter("lookahead", 5.0);
    nonzero_after(&mut comp, 0.5);

    comp.set_parameter("lookahead", 0.0);
    for _ in 0..100 {
        assert_eq!(nonzero_after(&mut comp, 0.0), 0);
    }
    comp.set_parameter("lookahead", 5.0);
    for _ in 0..4 {
        assert_eq!(nonzero_after(&mut comp, 0.0), 0);
    }
    assert_eq!(comp.latency_samples(), 240);
}

#[test]
fn re_enabling_does_not_replay_old_audio() {
    let mut comp = DynamicsProcessor::new(Flavor::Modern, SR, 2);
    comp.set_parameter("ratio", 1.0);
    comp.set_parameter("lookahead", 5.0);
    nonzero_after(&mut comp, 0.5);

    comp.set_enabled(false);
    assert_eq!(nonzero_after(&mut comp, 0.0), 0);
    comp.set_enabled(true);
    for _ in 0..4 {
        assert_eq!(nonzero_after(&mut comp, 0.0), 0);
    }
}

#[test]
fn heavier_ratio_means_more_reduction() {
    let mut reductions = Vec::new();
    for ratio in [2.0, 4.0, 10.0] {
        let mut comp = plain_modern();
        comp.set_parameter("threshold", -20.0);
        comp.set_parameter("ratio", ratio);
        let (r, _) = run_mono(&mut comp, |n| sine(500.0, 0.8, n), SR as usize / 2);
        reductions.push(r.last().copied().unwrap_or_default());
    }
    assert!(reductions[0] < reductions[1] && reductions[1] < reductions[2]);
}

#[test]
fn vintage_output_stays_under_ceiling() {
    let mut comp = DynamicsProcessor::new(Flavor::Vintage, SR, 1);
    comp.set_parameter("makeup_gain", 24.0);
    comp.reset();
    let (_, output) = run_mono(&mut comp, |n| sine(200.0, 1.0, n), SR as usize / 2);
    assert!(output.iter().all(|y| y.abs() <= 1.0));
    let peak = output.iter().fold(0.0f32, |m, y| m.max(y.abs()));
    assert!(peak > 0.9, "vintage peak {peak}");
}

#[test]
fn vocal_de_esser_tames_sibilance() {
    let energy = |de_ess: f32| {
        let mut comp = DynamicsProcessor::new(Flavor::Vocal, SR, 1);
        comp.set_parameter("de_ess_amount", de_ess);
        comp.set_parameter("breath_control", 0.0);
        comp.set_parameter("presence_enhance", 0.0);
        comp.set_parameter("air_enhance", 0.0);
        comp.set_parameter("proximity_fix", 0.0);
        comp.set_parameter("ratio", 1.0);
        comp.reset();
        let (_, output) = run_mono(&mut comp, |n| sine(7000.0, 0.6, n), SR as usize / 4);
        output[output.len() / 2..].iter().map(|y| y * y).sum::<f32>()
    };
    assert!(energy(100.0) < energy(0.0) * 0.8);
}

#[test]
fn multiband_compresses_only_the_loud_band() {
    let mut comp = DynamicsProcessor::new(Flavor::Multiband, SR, 1);
    comp.set_parameter("band1_threshold", -30.0);
    comp.set_parameter("band1_ratio", 8.0);
    comp.set_parameter("band4_threshold", 0.0);
    run_mono(&mut comp, |n| sine(60.0, 0.8, n), SR as usize / 2);
    let snap = comp.analysis();
    assert!(snap.band_reductions[0] > 5.0, "low band {:?}", snap.band_reductions);
    assert_eq!(snap.band_reductions[3], 0.0);
}

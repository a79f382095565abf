//! The dynamics processor shared by every flavour.
//!
//! # Signal Flow
//!
//! ```text
//!            ┌──────────── detector (undelayed, cross-channel peak) ───────────┐
//!            │                                                                  ▼
//! input ─► sanitize ─► lookahead ─► × gain ─► colour / tone ─► dry/wet ─► limiter ─► output
//!                          │                                       ▲
//!                          └──────────────── dry ─────────────────┘
//! ```
//!
//! Per block the processor takes a [`Settings`] snapshot, retunes attack and
//! release (adaptive strategy, vocal type or user values), then runs the
//! per-sample loop. The multiband engine replaces the single detector with
//! a [`BandSplitter`] and four band detectors and sums the bands before the
//! shared makeup, mix and limiter.
//!
//! `process` never allocates. Non-finite samples are replaced with silence
//! before they reach any recursive state.

use std::sync::Arc;

use dynamix_core::{
    BlockProcessor, EnvelopeFollower, GainComputer, HarmonicShaper, ParamDescriptor,
    ParameterInfo, SmoothedParam, SoftLimiter, buffer_mismatch, character, db_to_linear,
    level_to_db, reduction_db, sanitize, vintage_color, wet_dry_mix,
};

use crate::MAX_CHANNELS;
use crate::adaptive::{AdaptiveTimingController, BlockStats};
use crate::analysis::{AnalysisHandle, AnalysisReporter, AnalysisSnapshot, Levels};
use crate::band_splitter::{BandSplitter, NUM_BANDS, recombine_sample};
use crate::error::EngineError;
use crate::flavor::{Flavor, FlavorProfile};
use crate::lookahead::LookaheadDelay;
use crate::params::{ParamKey, ParameterEntry, ParameterStore, Settings};
use crate::presets::FactoryPreset;
use crate::tone::{ToneBand, ToneStack};
use crate::transient::{TransientDetector, preserve_transient};
use crate::vocal::{BreathControl, DeEsser};

/// Knee width used by every multiband band (dB).
pub const MULTIBAND_KNEE_DB: f32 = 2.0;

/// Makeup and mix ramp time (ms).
const SMOOTHING_MS: f32 = 10.0;

/// Advance a smoother and land exactly on the target once it is reached.
#[inline]
fn next_smoothed(param: &mut SmoothedParam) -> f32 {
    let value = param.advance();
    if param.is_settled() {
        param.snap_to_target();
        param.get()
    } else {
        value
    }
}

/// Full-band detector and the flavour's side stages.
#[derive(Debug, Clone)]
struct SingleBand {
    envelope: EnvelopeFollower,
    tone: ToneStack,
    transient: TransientDetector,
    de_esser: DeEsser,
    breath: BreathControl,
    last_reduction: f32,
}

impl SingleBand {
    fn new(sample_rate: f32, channels: usize) -> Self {
        Self {
            envelope: EnvelopeFollower::new(sample_rate),
            tone: ToneStack::new(sample_rate, channels),
            transient: TransientDetector::new(),
            de_esser: DeEsser::new(sample_rate, channels),
            breath: BreathControl::new(sample_rate),
            last_reduction: 0.0,
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.envelope.set_sample_rate(sample_rate);
        self.tone.set_sample_rate(sample_rate);
        self.de_esser.set_sample_rate(sample_rate);
        self.breath.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.envelope.reset();
        self.tone.reset();
        self.transient.reset();
        self.de_esser.reset();
        self.breath.reset();
        self.last_reduction = 0.0;
    }

    fn configure_tone(&mut self, flavor: Flavor, settings: &Settings) {
        match flavor {
            Flavor::Vintage => self
                .tone
                .set_bands(&[ToneBand::low_shelf(200.0, settings.warmth * 3.0)]),
            Flavor::Vocal => self.tone.set_bands(&[
                ToneBand::low_shelf(200.0, -settings.proximity * 6.0),
                ToneBand::peak(3500.0, 1.0, settings.presence * 4.5),
                ToneBand::high_shelf(10000.0, settings.air * 4.0),
            ]),
            Flavor::Modern | Flavor::Multiband => self.tone.set_bands(&[]),
        }
    }
}

/// Four-band splitter with one detector per band.
#[derive(Debug, Clone)]
struct MultibandEngine {
    splitter: BandSplitter,
    envelopes: [EnvelopeFollower; NUM_BANDS],
    last_reductions: [f32; NUM_BANDS],
    band_energy: [f64; NUM_BANDS],
}

impl MultibandEngine {
    fn new(sample_rate: f32, channels: usize, crossovers: [f32; NUM_BANDS - 1]) -> Self {
        Self {
            splitter: BandSplitter::new(sample_rate, channels, crossovers),
            envelopes: core::array::from_fn(|_| EnvelopeFollower::new(sample_rate)),
            last_reductions: [0.0; NUM_BANDS],
            band_energy: [0.0; NUM_BANDS],
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.splitter.set_sample_rate(sample_rate);
        for env in &mut self.envelopes {
            env.set_sample_rate(sample_rate);
        }
    }

    fn reset(&mut self) {
        self.splitter.reset();
        for env in &mut self.envelopes {
            env.reset();
        }
        self.last_reductions = [0.0; NUM_BANDS];
        self.band_energy = [0.0; NUM_BANDS];
    }
}

#[derive(Debug, Clone)]
enum Engine {
    Single(Box<SingleBand>),
    Multiband(Box<MultibandEngine>),
}

/// Real-time dynamics processor for any [`Flavor`].
///
/// Parameters live in a shared [`ParameterStore`]; hand [`params`](Self::params)
/// to a control thread and keep the processor on the audio thread.
///
/// # Example
///
/// ```rust
/// use dynamix_core::BlockProcessor;
/// use dynamix_dynamics::{DynamicsProcessor, Flavor};
///
/// let mut comp = DynamicsProcessor::new(Flavor::Modern, 48000.0, 2);
/// comp.set_parameter("threshold", -24.0);
/// comp.set_parameter("ratio", 6.0);
///
/// let left = vec![0.5f32; 256];
/// let right = vec![-0.5f32; 256];
/// let mut out_l = vec![0.0f32; 256];
/// let mut out_r = vec![0.0f32; 256];
/// comp.process(&[&left[..], &right[..]], &mut [&mut out_l[..], &mut out_r[..]]);
///
/// assert!(comp.analysis().gain_reduction > 0.0);
/// ```
#[derive(Debug)]
pub struct DynamicsProcessor {
    profile: FlavorProfile,
    params: Arc<ParameterStore>,
    reporter: AnalysisReporter,
    sample_rate: f32,
    channels: usize,
    engine: Engine,
    lookahead: LookaheadDelay,
    adaptive: AdaptiveTimingController,
    makeup: SmoothedParam,
    mix: SmoothedParam,
    limiter: SoftLimiter,
    timing: (f32, f32),
    nan_latched: bool,
    bypassed: bool,
}

impl DynamicsProcessor {
    /// Create a processor, rejecting unsupported channel counts.
    pub fn try_new(flavor: Flavor, sample_rate: f32, channels: usize) -> Result<Self, EngineError> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(EngineError::UnsupportedChannels(channels));
        }
        Ok(Self::build(flavor, sample_rate, channels))
    }

    /// Create a processor. The channel count is clamped to `1..=MAX_CHANNELS`.
    pub fn new(flavor: Flavor, sample_rate: f32, channels: usize) -> Self {
        Self::build(flavor, sample_rate, channels.clamp(1, MAX_CHANNELS))
    }

    fn build(flavor: Flavor, sample_rate: f32, channels: usize) -> Self {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            48000.0
        };
        let profile = flavor.profile();
        let params = Arc::new(ParameterStore::new(flavor));
        let settings = params.settings();

        let engine = if profile.features.multiband {
            Engine::Multiband(Box::new(MultibandEngine::new(
                sample_rate,
                channels,
                settings.crossovers,
            )))
        } else {
            Engine::Single(Box::new(SingleBand::new(sample_rate, channels)))
        };

        let mut makeup = SmoothedParam::with_config(1.0, sample_rate, SMOOTHING_MS);
        makeup.set_immediate(db_to_linear(settings.makeup_db));
        let mut mix = SmoothedParam::with_config(1.0, sample_rate, SMOOTHING_MS);
        mix.set_immediate(settings.mix);

        tracing::debug!(%flavor, sample_rate, channels, "dynamics processor created");

        Self {
            profile,
            params,
            reporter: AnalysisReporter::new(),
            sample_rate,
            channels,
            engine,
            lookahead: LookaheadDelay::new(sample_rate, channels),
            adaptive: AdaptiveTimingController::from_profile(&profile),
            makeup,
            mix,
            limiter: SoftLimiter::new(profile.limiter_ceiling, profile.limiter_curve),
            timing: (settings.attack_ms, settings.release_ms),
            nan_latched: false,
            bypassed: false,
        }
    }

    /// Flavour of this processor.
    pub fn flavor(&self) -> Flavor {
        self.profile.flavor
    }

    /// Flavour profile in use.
    pub fn profile(&self) -> &FlavorProfile {
        &self.profile
    }

    /// Channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Sample rate (Hz).
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Shared parameter store.
    pub fn params(&self) -> Arc<ParameterStore> {
        Arc::clone(&self.params)
    }

    /// Set a parameter by string ID. Returns the stored (clamped) value, or
    /// `None` for an ID this flavour does not have.
    pub fn set_parameter(&self, id: &str, value: f32) -> Option<f32> {
        self.params.set_parameter(id, value)
    }

    /// Set a parameter by key.
    pub fn set(&self, key: ParamKey, value: f32) -> Option<f32> {
        self.params.set(key, value)
    }

    /// Read a parameter by string ID.
    pub fn get_parameter(&self, id: &str) -> Option<f32> {
        self.params.get_by_id(id)
    }

    /// Every parameter with its value and display string.
    pub fn parameters(&self) -> Vec<ParameterEntry> {
        self.params.parameters()
    }

    /// Apply a factory preset. Returns how many values were applied.
    pub fn load_preset(&self, preset: &FactoryPreset) -> usize {
        if preset.flavor != self.flavor() {
            tracing::warn!(
                preset = preset.id,
                target = %self.flavor(),
                "preset made for {} applied to another flavor",
                preset.flavor
            );
        }
        let applied = self.params.apply(preset.params.iter().copied());
        tracing::debug!(preset = preset.id, applied, "preset loaded");
        applied
    }

    /// Enable processing, or bypass it with a verbatim copy.
    pub fn set_enabled(&self, enabled: bool) {
        self.params.set_enabled(enabled);
    }

    /// Whether processing is enabled.
    pub fn is_enabled(&self) -> bool {
        self.params.is_enabled()
    }

    /// Snapshot of the last processed block.
    pub fn analysis(&self) -> AnalysisSnapshot {
        self.reporter.last()
    }

    /// Read handle for analysis from other threads.
    pub fn analysis_handle(&self) -> AnalysisHandle {
        self.reporter.handle()
    }

    /// Attack and release (ms) used for the last block.
    pub fn effective_timing(&self) -> (f32, f32) {
        self.timing
    }

    /// Process one block, reporting malformed buffers as an error instead of
    /// panicking.
    pub fn try_process(
        &mut self,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
    ) -> Result<(), EngineError> {
        self.validate(input, output)?;
        self.run(input, output);
        Ok(())
    }

    fn validate(&self, input: &[&[f32]], output: &[&mut [f32]]) -> Result<(), EngineError> {
        if input.len() != self.channels {
            return Err(EngineError::ChannelMismatch {
                expected: self.channels,
                actual: input.len(),
            });
        }
        match buffer_mismatch(input, output) {
            Some((usize::MAX, _, actual)) => Err(EngineError::ChannelMismatch {
                expected: self.channels,
                actual,
            }),
            Some((channel, input, output)) => Err(EngineError::LengthMismatch {
                channel,
                input,
                output,
            }),
            None => Ok(()),
        }
    }

    fn run(&mut self, input: &[&[f32]], output: &mut [&mut [f32]]) {
        if !self.params.is_enabled() {
            for (inp, out) in input.iter().zip(output.iter_mut()) {
                out.copy_from_slice(inp);
            }
            self.bypassed = true;
            return;
        }
        // the delay line saw nothing while bypassed
        if self.bypassed {
            self.lookahead.reset();
            self.bypassed = false;
        }

        let settings = self.params.settings();
        self.check_non_finite(input);
        self.makeup.set_target(db_to_linear(settings.makeup_db));
        self.mix.set_target(settings.mix);

        let stats = BlockStats::measure(input);
        let gain_reduction = if matches!(self.engine, Engine::Multiband(_)) {
            self.lookahead.set_delay_ms(0.0);
            self.run_multiband(input, output, &settings)
        } else {
            self.lookahead.set_delay_ms(settings.lookahead_ms);
            self.timing = self.block_timing(&settings, &stats);
            self.run_single(input, output, &settings)
        };

        let input_levels = Levels {
            rms: stats.rms,
            peak: stats.peak,
        };
        let mut snapshot =
            AnalysisSnapshot::from_levels(input_levels, Levels::measure(output), gain_reduction);
        if let Engine::Multiband(engine) = &self.engine {
            let frames = input.first().map_or(0, |c| c.len());
            let count = (frames * self.channels).max(1) as f64;
            for b in 0..NUM_BANDS {
                snapshot.band_levels[b] = level_to_db((engine.band_energy[b] / count).sqrt() as f32);
                snapshot.band_reductions[b] = engine.last_reductions[b];
            }
        }
        self.reporter.report(snapshot);
    }

    fn check_non_finite(&mut self, input: &[&[f32]]) {
        let dirty = input.iter().any(|c| c.iter().any(|x| !x.is_finite()));
        if dirty && !self.nan_latched {
            tracing::warn!(
                flavor = %self.flavor(),
                "non-finite input samples replaced with silence"
            );
        }
        self.nan_latched = dirty;
    }

    fn block_timing(&mut self, settings: &Settings, stats: &BlockStats) -> (f32, f32) {
        if !settings.adaptive {
            return (settings.attack_ms, settings.release_ms);
        }
        if self.profile.features.vocal_chain
            && let Some(fixed) = settings.vocal_type.timings()
        {
            return fixed;
        }
        self.adaptive
            .update(stats, settings.attack_ms, settings.release_ms)
    }

    fn run_single(
        &mut self,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
        settings: &Settings,
    ) -> f32 {
        let Engine::Single(engine) = &mut self.engine else {
            return 0.0;
        };
        let features = self.profile.features;
        let channels = self.channels;
        let frames = input.first().map_or(0, |c| c.len());

        engine.envelope.set_times(self.timing.0, self.timing.1);
        engine.configure_tone(self.profile.flavor, settings);
        let computer = GainComputer::new(settings.threshold_db, settings.ratio, settings.knee_db)
            .with_curve(self.profile.knee_curve);
        let character_amount = 1.0 - settings.transparency;

        let mut frame = [0.0f32; MAX_CHANNELS];
        for n in 0..frames {
            let mut peak = 0.0f32;
            let mut energy = 0.0f32;
            for (ch, slot) in frame.iter_mut().enumerate().take(channels) {
                let x = sanitize(input[ch][n]);
                *slot = x;
                peak = peak.max(x.abs());
                energy += x.abs();
            }

            let level_db = level_to_db(peak);
            let envelope_db = engine.envelope.update(level_db);
            let reduction = computer.reduction_db(envelope_db);
            engine.last_reduction = reduction;

            let mut gain = db_to_linear(-reduction) * next_smoothed(&mut self.makeup);
            let mut de_ess = 1.0;
            if features.vocal_chain {
                gain *= engine.breath.process(level_db, settings.breath);
                de_ess = engine
                    .de_esser
                    .process_frame(&frame[..channels], settings.de_ess);
            }
            if features.transient_preserve {
                let strength = engine.transient.process_frame(energy);
                gain = preserve_transient(gain, strength, settings.transient_preserve);
            }
            let mix = next_smoothed(&mut self.mix);

            for (ch, &x) in frame.iter().enumerate().take(channels) {
                let dry = self.lookahead.process(ch, x);
                let mut wet = dry * gain;
                if features.tube_stage {
                    wet = vintage_color(HarmonicShaper::shape(wet, settings.tube), settings.color);
                }
                if features.transient_preserve {
                    wet = character(wet, character_amount);
                }
                wet *= de_ess;
                wet = engine.tone.process(ch, wet);
                output[ch][n] = self.limiter.process(wet_dry_mix(dry, wet, mix));
            }
        }
        engine.last_reduction
    }

    fn run_multiband(
        &mut self,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
        settings: &Settings,
    ) -> f32 {
        let Engine::Multiband(engine) = &mut self.engine else {
            return 0.0;
        };
        let channels = self.channels;
        let frames = input.first().map_or(0, |c| c.len());
        let any_solo = settings.any_solo();

        engine.splitter.set_crossovers(settings.crossovers);
        for (env, band) in engine.envelopes.iter_mut().zip(settings.bands.iter()) {
            env.set_times(band.attack_ms, band.release_ms);
        }
        engine.band_energy = [0.0; NUM_BANDS];

        let mut frame = [0.0f32; MAX_CHANNELS];
        let mut split = [[0.0f32; NUM_BANDS]; MAX_CHANNELS];
        for n in 0..frames {
            let mut band_peak = [0.0f32; NUM_BANDS];
            for ch in 0..channels {
                let x = sanitize(input[ch][n]);
                frame[ch] = x;
                split[ch] = engine.splitter.split_sample(ch, x);
                for (b, &v) in split[ch].iter().enumerate() {
                    band_peak[b] = band_peak[b].max(v.abs());
                    engine.band_energy[b] += f64::from(v) * f64::from(v);
                }
            }

            let mut gains = [0.0f32; NUM_BANDS];
            for b in 0..NUM_BANDS {
                let band = &settings.bands[b];
                let envelope_db = engine.envelopes[b].update(level_to_db(band_peak[b]));
                let reduction = if band.bypass {
                    0.0
                } else {
                    reduction_db(
                        envelope_db,
                        band.threshold_db,
                        band.ratio,
                        MULTIBAND_KNEE_DB,
                        self.profile.knee_curve,
                    )
                };
                engine.last_reductions[b] = reduction;

                let active = if any_solo { band.solo } else { !band.mute };
                gains[b] = if !active {
                    0.0
                } else if band.bypass {
                    1.0
                } else {
                    db_to_linear(-reduction) * db_to_linear(band.gain_db)
                };
            }

            let makeup = next_smoothed(&mut self.makeup);
            let mix = next_smoothed(&mut self.mix);
            for ch in 0..channels {
                let wet = recombine_sample(&split[ch], &gains) * makeup;
                output[ch][n] = self.limiter.process(wet_dry_mix(frame[ch], wet, mix));
            }
        }

        engine.last_reductions.iter().sum::<f32>() / NUM_BANDS as f32
    }
}

impl BlockProcessor for DynamicsProcessor {
    /// Process one block.
    ///
    /// # Panics
    ///
    /// Panics if the input channel count differs from the processor's, or if
    /// input and output shapes differ. Use
    /// [`try_process`](DynamicsProcessor::try_process) to get an error instead.
    fn process(&mut self, input: &[&[f32]], output: &mut [&mut [f32]]) {
        if let Err(err) = self.validate(input, output) {
            panic!("DynamicsProcessor::process called with malformed buffers: {err}");
        }
        self.run(input, output);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return;
        }
        self.sample_rate = sample_rate;
        match &mut self.engine {
            Engine::Single(engine) => engine.set_sample_rate(sample_rate),
            Engine::Multiband(engine) => engine.set_sample_rate(sample_rate),
        }
        self.lookahead.set_sample_rate(sample_rate);
        self.makeup.set_sample_rate(sample_rate);
        self.mix.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        match &mut self.engine {
            Engine::Single(engine) => engine.reset(),
            Engine::Multiband(engine) => engine.reset(),
        }
        self.lookahead.reset();
        self.adaptive.reset();
        let settings = self.params.settings();
        self.makeup.set_immediate(db_to_linear(settings.makeup_db));
        self.mix.set_immediate(settings.mix);
        self.nan_latched = false;
        self.reporter.clear();
    }

    fn latency_samples(&self) -> usize {
        if self.params.is_enabled() {
            self.lookahead.delay_samples()
        } else {
            0
        }
    }
}

impl ParameterInfo for DynamicsProcessor {
    fn param_count(&self) -> usize {
        self.params.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        self.params.descriptor_at(index)
    }

    fn get_param(&self, index: usize) -> f32 {
        self.params.get_index(index).unwrap_or(0.0)
    }

    fn set_param(&mut self, index: usize, value: f32) {
        self.params.set_index(index, value);
    }
}

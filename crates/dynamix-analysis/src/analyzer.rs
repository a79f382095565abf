//! The spectral analyzer and its combined report.
//!
//! Every entry point takes planar channel buffers, downmixes them to mono and
//! runs one averaged FFT pass. Buffers shorter than [`MIN_ANALYSIS_SAMPLES`]
//! produce empty or default results rather than errors.

use dynamix_core::level_to_db;
use dynamix_dynamics::Flavor;
use serde::Serialize;

use crate::dynamics::{crest_factor_db, downmix, peak, rms};
use crate::eq_curve::{EqCurvePoint, EqGoal, auto_eq_curve, match_balance};
use crate::fft::{Fft, Window};
use crate::problems::{ProblemFrequency, detect_problems};
use crate::source::{
    DYNAMIC_CREST_DB, SourceCharacteristics, SourceType, classify, detect_fundamental,
    harmonic_content, transient_content,
};
use crate::spectrum::{FrequencyBand, log_bands, spectral_centroid};
use crate::tonal::TonalBalance;

/// FFT size used by [`SpectralAnalyzer::new`].
pub const DEFAULT_FFT_SIZE: usize = 8192;

/// Shortest buffer (per channel) that is analysed.
pub const MIN_ANALYSIS_SAMPLES: usize = 64;

const FALLBACK_SAMPLE_RATE: f32 = 48000.0;

/// Features measured once per buffer and shared by the analyses.
struct Measurement {
    mono: Vec<f32>,
    amplitudes: Vec<f32>,
    bands: Vec<FrequencyBand>,
}

/// Suggested processor settings for a measured source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Flavour to load.
    pub flavor: Flavor,
    /// Source the suggestion is based on.
    pub source_type: SourceType,
    /// `(parameter id, value)` pairs, a partial map for the flavour.
    pub params: Vec<(&'static str, f32)>,
    /// Why these settings were chosen.
    pub reason: String,
}

impl Recommendation {
    /// Apply the suggested values to `processor`. Returns how many were set.
    pub fn apply(&self, processor: &dynamix_dynamics::DynamicsProcessor) -> usize {
        processor.params().apply(self.params.iter().copied())
    }
}

/// Everything the analyzer can say about one buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Sample rate of the analysed audio (Hz).
    pub sample_rate: f32,
    /// Samples per channel analysed.
    pub samples: usize,
    /// Channels downmixed.
    pub channels: usize,
    /// Mono RMS (dBFS).
    pub rms_db: f32,
    /// Mono peak (dBFS).
    pub peak_db: f32,
    /// Mono crest factor (dB).
    pub crest_factor_db: f32,
    /// Log-spaced spectrum.
    pub spectrum: Vec<FrequencyBand>,
    /// Mean level per region.
    pub tonal_balance: TonalBalance,
    /// Detected problems.
    pub problems: Vec<ProblemFrequency>,
    /// Source classification.
    pub source: SourceCharacteristics,
    /// Suggested processor settings.
    pub recommendation: Recommendation,
    /// Goal the auto-EQ curve was built for.
    pub goal: EqGoal,
    /// Auto-EQ curve.
    pub auto_eq: Vec<EqCurvePoint>,
}

/// Offline spectral analyzer.
///
/// # Example
///
/// ```rust
/// use dynamix_analysis::{EqGoal, SpectralAnalyzer};
///
/// let tone: Vec<f32> = (0..16384)
///     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 48000.0).sin())
///     .collect();
/// let analyzer = SpectralAnalyzer::new(48000.0);
/// let report = analyzer.analyze(&[&tone[..]], EqGoal::Clarity);
/// assert_eq!(report.spectrum.len(), 100);
/// assert!(report.source.fundamental_frequency.is_some());
/// ```
#[derive(Debug)]
pub struct SpectralAnalyzer {
    sample_rate: f32,
    fft: Fft,
    window: Window,
}

impl SpectralAnalyzer {
    /// Analyzer with an 8192-point Hann FFT.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_fft_size(sample_rate, DEFAULT_FFT_SIZE)
    }

    /// Analyzer with a custom FFT size (rounded up to at least 64).
    pub fn with_fft_size(sample_rate: f32, fft_size: usize) -> Self {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            tracing::warn!(sample_rate, "invalid analysis sample rate, using 48 kHz");
            FALLBACK_SAMPLE_RATE
        };
        Self {
            sample_rate,
            fft: Fft::new(fft_size.max(MIN_ANALYSIS_SAMPLES)),
            window: Window::Hann,
        }
    }

    /// Use a different analysis window.
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Sample rate (Hz).
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// FFT size.
    pub fn fft_size(&self) -> usize {
        self.fft.size()
    }

    fn measure<C: AsRef<[f32]>>(&self, buffer: &[C]) -> Option<Measurement> {
        let mono = downmix(buffer);
        if mono.len() < MIN_ANALYSIS_SAMPLES {
            tracing::debug!(samples = mono.len(), "buffer too short to analyse");
            return None;
        }
        let amplitudes = self.fft.amplitude_spectrum(&mono, self.window);
        let bands = log_bands(&amplitudes, self.sample_rate, self.fft.size());
        Some(Measurement {
            mono,
            amplitudes,
            bands,
        })
    }

    /// Log-spaced spectrum of the downmix.
    pub fn analyze_spectrum<C: AsRef<[f32]>>(&self, buffer: &[C]) -> Vec<FrequencyBand> {
        self.measure(buffer).map(|m| m.bands).unwrap_or_default()
    }

    /// Resonances and region build-ups.
    pub fn detect_problems<C: AsRef<[f32]>>(&self, buffer: &[C]) -> Vec<ProblemFrequency> {
        self.measure(buffer)
            .map(|m| detect_problems(&m.bands))
            .unwrap_or_default()
    }

    /// Mean level per named region.
    pub fn analyze_tonal_balance<C: AsRef<[f32]>>(&self, buffer: &[C]) -> TonalBalance {
        self.measure(buffer)
            .map(|m| TonalBalance::from_bands(&m.bands))
            .unwrap_or_default()
    }

    /// Classify the source.
    pub fn detect_source_type<C: AsRef<[f32]>>(&self, buffer: &[C]) -> SourceCharacteristics {
        self.measure(buffer)
            .map(|m| self.characterize(&m))
            .unwrap_or_default()
    }

    /// High-pass, problem fixes and the goal's enhancement points.
    pub fn generate_auto_eq_curve<C: AsRef<[f32]>>(
        &self,
        buffer: &[C],
        goal: EqGoal,
    ) -> Vec<EqCurvePoint> {
        let Some(m) = self.measure(buffer) else {
            return Vec::new();
        };
        let problems = detect_problems(&m.bands);
        auto_eq_curve(&problems, &TonalBalance::from_bands(&m.bands), goal)
    }

    /// Bells moving the source's tonal balance toward the reference's.
    ///
    /// Empty when either buffer is too short.
    pub fn match_reference<C: AsRef<[f32]>, R: AsRef<[f32]>>(
        &self,
        source: &[C],
        reference: &[R],
    ) -> Vec<EqCurvePoint> {
        match (self.measure(source), self.measure(reference)) {
            (Some(s), Some(r)) => match_balance(
                &TonalBalance::from_bands(&s.bands),
                &TonalBalance::from_bands(&r.bands),
            ),
            _ => Vec::new(),
        }
    }

    /// Suggested flavour and settings.
    pub fn recommend_settings<C: AsRef<[f32]>>(&self, buffer: &[C]) -> Recommendation {
        match self.measure(buffer) {
            Some(m) => recommend(&self.characterize(&m), crest_factor_db(&m.mono)),
            None => recommend(&SourceCharacteristics::default(), 0.0),
        }
    }

    /// Full report from a single pass.
    pub fn analyze<C: AsRef<[f32]>>(&self, buffer: &[C], goal: EqGoal) -> AnalysisReport {
        let channels = buffer.len();
        let Some(m) = self.measure(buffer) else {
            let samples = buffer.iter().map(|c| c.as_ref().len()).min().unwrap_or(0);
            return AnalysisReport {
                sample_rate: self.sample_rate,
                samples,
                channels,
                rms_db: dynamix_core::SILENCE_DB,
                peak_db: dynamix_core::SILENCE_DB,
                crest_factor_db: 0.0,
                spectrum: Vec::new(),
                tonal_balance: TonalBalance::default(),
                problems: Vec::new(),
                source: SourceCharacteristics::default(),
                recommendation: recommend(&SourceCharacteristics::default(), 0.0),
                goal,
                auto_eq: Vec::new(),
            };
        };

        let crest = crest_factor_db(&m.mono);
        let tonal_balance = TonalBalance::from_bands(&m.bands);
        let problems = detect_problems(&m.bands);
        let source = self.characterize(&m);
        let auto_eq = auto_eq_curve(&problems, &tonal_balance, goal);
        tracing::debug!(
            samples = m.mono.len(),
            problems = problems.len(),
            source = %source.source_type,
            "analysis complete"
        );
        AnalysisReport {
            sample_rate: self.sample_rate,
            samples: m.mono.len(),
            channels,
            rms_db: level_to_db(rms(&m.mono)),
            peak_db: level_to_db(peak(&m.mono)),
            crest_factor_db: crest,
            recommendation: recommend(&source, crest),
            spectrum: m.bands,
            tonal_balance,
            problems,
            source,
            goal,
            auto_eq,
        }
    }

    fn characterize(&self, m: &Measurement) -> SourceCharacteristics {
        let harmonic = harmonic_content(&m.amplitudes);
        let transient = transient_content(&m.mono);
        let fundamental = detect_fundamental(&m.amplitudes, self.sample_rate, self.fft.size());
        let centroid = spectral_centroid(&m.amplitudes, self.sample_rate, self.fft.size());
        let (source_type, confidence) = classify(harmonic, transient, fundamental, centroid);
        SourceCharacteristics {
            source_type,
            confidence,
            harmonic_content: harmonic,
            transient_content: transient,
            fundamental_frequency: fundamental,
            spectral_centroid: centroid,
            is_dynamic: crest_factor_db(&m.mono) > DYNAMIC_CREST_DB,
        }
    }
}

/// Crest factor (dB) below which material counts as already dense.
const DENSE_CREST_DB: f32 = 6.0;

/// Map a classified source and its crest factor to settings.
///
/// Base values follow the closest factory preset. Dynamic material gets a
/// faster attack and one more step of ratio, dense material one step less.
pub fn recommend(source: &SourceCharacteristics, crest_db: f32) -> Recommendation {
    let (flavor, threshold, ratio, attack, release, base) = match source.source_type {
        SourceType::Vocal => (Flavor::Vocal, -18.0, 3.0, 10.0, 100.0, "natural vocal"),
        SourceType::Drums => (Flavor::Modern, -18.0, 5.0, 1.0, 30.0, "punchy drums"),
        SourceType::Bass => (Flavor::Vintage, -15.0, 4.0, 10.0, 100.0, "steady low end"),
        SourceType::Guitar => (Flavor::Vintage, -18.0, 2.0, 15.0, 150.0, "gentle guitar"),
        SourceType::Keys => (Flavor::Modern, -15.0, 3.0, 3.0, 40.0, "transparent keys"),
        SourceType::Unknown => (Flavor::Modern, -20.0, 2.5, 10.0, 80.0, "general glue"),
    };

    let (ratio, attack, shape) = if crest_db > DYNAMIC_CREST_DB {
        (ratio + 1.0, attack * 0.5, "dynamic, faster attack")
    } else if crest_db > 0.0 && crest_db < DENSE_CREST_DB {
        (f32::max(ratio - 1.0, 1.5), attack, "already dense, lighter ratio")
    } else {
        (ratio, attack, "moderate dynamics")
    };

    Recommendation {
        flavor,
        source_type: source.source_type,
        params: vec![
            ("threshold", threshold),
            ("ratio", ratio),
            ("attack", attack),
            ("release", release),
        ],
        reason: format!("{base} ({shape}, crest {crest_db:.1} dB)"),
    }
}

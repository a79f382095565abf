//! Dynamix Analysis - offline spectral analysis and auto-EQ suggestions
//!
//! This crate inspects recorded audio and suggests corrective EQ and
//! compressor settings. Nothing here runs on the audio thread.
//!
//! - [`fft`] - FFT wrapper with windowing and averaged amplitude spectra
//! - [`spectrum`] - 100 log-spaced bands and the named frequency regions
//! - [`dynamics`] - RMS, peak, crest factor and transient counting
//! - [`problems`] - Resonance and region build-up detection
//! - [`tonal`] - Tonal balance per region
//! - [`source`] - Source-type classification
//! - [`eq_curve`] - Auto-EQ curves, tonal goals and reference matching
//! - [`analyzer`] - [`SpectralAnalyzer`] tying the above together
//!
//! ## Example
//!
//! ```rust
//! use dynamix_analysis::{EqGoal, SpectralAnalyzer};
//!
//! let left: Vec<f32> = (0..8192).map(|i| (i as f32 * 0.05).sin() * 0.3).collect();
//! let right = left.clone();
//!
//! let analyzer = SpectralAnalyzer::new(48000.0);
//! let balance = analyzer.analyze_tonal_balance(&[&left[..], &right[..]]);
//! let curve = analyzer.generate_auto_eq_curve(&[&left[..], &right[..]], EqGoal::Warmth);
//! assert_eq!(curve[0].frequency, 30.0);
//! println!("mids at {:.1} dB", balance.mids);
//! ```
//!
//! Buffers shorter than [`MIN_ANALYSIS_SAMPLES`] give empty or default
//! results; analysis never fails.

pub mod analyzer;
pub mod dynamics;
pub mod eq_curve;
pub mod fft;
pub mod problems;
pub mod source;
pub mod spectrum;
pub mod tonal;

pub use analyzer::{
    AnalysisReport, DEFAULT_FFT_SIZE, MIN_ANALYSIS_SAMPLES, Recommendation, SpectralAnalyzer,
    recommend,
};
pub use eq_curve::{
    EqCurvePoint, EqGoal, EqPointKind, ParseGoalError, auto_eq_curve, build_filters,
    match_balance,
};
pub use fft::{Fft, Window};
pub use problems::{ProblemFrequency, ProblemKind, Severity, detect_problems};
pub use source::{SourceCharacteristics, SourceType};
pub use spectrum::{FrequencyBand, NUM_SPECTRUM_BANDS, Region};
pub use tonal::TonalBalance;

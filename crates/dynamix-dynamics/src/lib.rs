//! Dynamix Dynamics - the compressor engine
//!
//! One [`DynamicsProcessor`] runs every compressor flavour. A
//! [`FlavorProfile`] picks the knee and limiter curves, the adaptive timing
//! strategy and the optional stages:
//!
//! - [`Flavor::Vintage`] - tube shaper, colour bend and warmth shelf
//! - [`Flavor::Modern`] - transient preservation and a clean character stage
//! - [`Flavor::Vocal`] - de-esser, breath control and vocal tone shelves
//! - [`Flavor::Multiband`] - four-band split with per-band compressors
//!
//! Parameters live in a lock-free [`ParameterStore`] shared with control
//! threads; metering is published through an [`AnalysisHandle`].
//!
//! ## Example
//!
//! ```rust
//! use dynamix_core::BlockProcessor;
//! use dynamix_dynamics::{DynamicsProcessor, Flavor, presets};
//!
//! let mut comp = DynamicsProcessor::new(Flavor::Vocal, 48000.0, 1);
//! if let Some(preset) = presets::find("vocal-radio") {
//!     comp.load_preset(preset);
//! }
//!
//! let input = vec![0.25f32; 512];
//! let mut output = vec![0.0f32; 512];
//! comp.process(&[&input[..]], &mut [&mut output[..]]);
//! assert!(output.iter().all(|y| y.is_finite()));
//! ```

pub mod adaptive;
pub mod analysis;
pub mod band_splitter;
pub mod error;
pub mod flavor;
pub mod lookahead;
pub mod params;
pub mod presets;
pub mod processor;
pub mod tone;
pub mod transient;
pub mod vocal;

/// Most channels a processor accepts.
pub const MAX_CHANNELS: usize = 8;

pub use adaptive::{AdaptiveStrategy, AdaptiveTimingController, BlockStats, RollingHistory};
pub use analysis::{AnalysisCell, AnalysisHandle, AnalysisReporter, AnalysisSnapshot, Levels};
pub use band_splitter::{BandSplitter, DEFAULT_CROSSOVERS, NUM_BANDS, recombine, recombine_sample};
pub use error::{EngineError, ParseFlavorError, ParseParamError};
pub use flavor::{Flavor, FlavorFeatures, FlavorProfile};
pub use lookahead::{LookaheadDelay, MAX_LOOKAHEAD_MS};
pub use params::{
    BandField, BandSettings, ParamKey, ParameterEntry, ParameterStore, Settings, flavor_parameters,
};
pub use presets::{FACTORY_PRESETS, FactoryPreset};
pub use processor::DynamicsProcessor;
pub use tone::{ToneBand, ToneShape, ToneStack};
pub use transient::{TransientDetector, preserve_transient};
pub use vocal::{BreathControl, DeEsser, VocalType};

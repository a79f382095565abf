//! Dynamix Core - DSP primitives for dynamics processing
//!
//! The building blocks shared by every compressor flavour, designed for
//! real-time use with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Level Detection and Gain
//!
//! - [`EnvelopeFollower`] - dB-domain attack/release ballistics
//! - [`GainComputer`] - threshold/ratio/knee compression law
//!
//! ## Coloration and Output
//!
//! - [`HarmonicShaper`] - asymmetric tube-style waveshaper
//! - [`vintage_color`] / [`character`] - light static bends
//! - [`SoftLimiter`] - tanh or exponential output ceiling
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR with RBJ cookbook coefficients (low-pass,
//!   peaking, shelves)
//!
//! ## Parameters
//!
//! - [`ParamDescriptor`] - range, unit, stable IDs and display formatting
//! - [`SmoothedParam`] - zipper-free ramps for gain changes
//!
//! ## Processing
//!
//! - [`BlockProcessor`] - object-safe multichannel block trait
//!
//! # no_std Support
//!
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! dynamix-core = { version = "0.1", default-features = false }
//! ```
//!
//! `alloc` is still required for parameter display strings.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod biquad;
pub mod envelope;
pub mod gain_computer;
pub mod math;
pub mod param;
pub mod param_info;
pub mod processor;
pub mod shaper;

pub use biquad::{
    Biquad, Coefficients, high_shelf_coefficients, highpass_coefficients, low_shelf_coefficients,
    lowpass_coefficients, peaking_eq_coefficients,
};
pub use envelope::EnvelopeFollower;
pub use gain_computer::{GainComputer, KneeCurve, reduction_db};
pub use math::{
    SILENCE_DB, db_to_linear, flush_denormal, level_to_db, linear_to_db, ms_to_samples,
    samples_to_ms, sanitize, time_constant_coeff, wet_dry_mix,
};
pub use param::SmoothedParam;
pub use param_info::{
    ParamDescriptor, ParamFlags, ParamId, ParamUnit, ParameterInfo, TOGGLE_LABELS,
};
pub use processor::{BlockProcessor, buffer_mismatch};
pub use shaper::{HarmonicShaper, LimiterCurve, SoftLimiter, character, vintage_color};

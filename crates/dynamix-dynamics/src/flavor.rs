//! Compressor flavours.
//!
//! One [`DynamicsProcessor`](crate::DynamicsProcessor) implements every
//! flavour. A [`FlavorProfile`] holds the handful of settings that differ:
//! default ballistics, adaptive bounds, knee and limiter curves, the
//! auto-makeup factor and which optional stages run.
//!
//! | Flavour | Knee | Limiter | Adaptive | Extra stages |
//! |---------|------|---------|----------|--------------|
//! | Vintage | quadratic | tanh @ 0.9 | previous-block crest | tube, colour, warmth shelf |
//! | Modern | smoothstep | exponential @ 0.95 | block history | transient preserve, character |
//! | Vocal | smoothstep | tanh @ 0.95 | block history (auto type) | de-esser, breath, tone shelves |
//! | Multiband | quadratic (2 dB) | tanh @ 0.95 | none | 4-band split, solo/mute/bypass |

use core::fmt;
use core::str::FromStr;

use dynamix_core::{KneeCurve, LimiterCurve};

use crate::adaptive::AdaptiveStrategy;
use crate::error::ParseFlavorError;

/// Compressor flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Flavor {
    /// Tube-style colour, slow program-dependent timing.
    Vintage,
    /// Clean, transient-aware compression.
    #[default]
    Modern,
    /// Voice chain with de-esser and breath control.
    Vocal,
    /// Four-band compressor.
    Multiband,
}

impl Flavor {
    /// Every flavour, in registry order.
    pub const ALL: [Flavor; 4] = [
        Flavor::Vintage,
        Flavor::Modern,
        Flavor::Vocal,
        Flavor::Multiband,
    ];

    /// Stable lowercase ID.
    pub const fn id(self) -> &'static str {
        match self {
            Flavor::Vintage => "vintage",
            Flavor::Modern => "modern",
            Flavor::Vocal => "vocal",
            Flavor::Multiband => "multiband",
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Flavor::Vintage => "Vintage Compressor",
            Flavor::Modern => "Modern Compressor",
            Flavor::Vocal => "Vocal Compressor",
            Flavor::Multiband => "Multiband Compressor",
        }
    }

    /// One-line description.
    pub const fn description(self) -> &'static str {
        match self {
            Flavor::Vintage => "Tube-coloured compression with program-dependent timing",
            Flavor::Modern => "Transparent compression with transient preservation",
            Flavor::Vocal => "Voice compression with de-essing, breath control and tone shaping",
            Flavor::Multiband => "Four-band compression with adjustable crossovers",
        }
    }

    /// The flavour's profile.
    pub const fn profile(self) -> FlavorProfile {
        match self {
            Flavor::Vintage => FlavorProfile {
                flavor: self,
                default_attack_ms: 10.0,
                default_release_ms: 100.0,
                attack_bounds: (0.5, 50.0),
                release_bounds: (20.0, 1500.0),
                knee_curve: KneeCurve::Quadratic,
                limiter_curve: LimiterCurve::Tanh,
                limiter_ceiling: 0.9,
                adaptive: AdaptiveStrategy::PreviousBlockCrest,
                makeup_compensation: 0.7,
                features: FlavorFeatures {
                    tube_stage: true,
                    ..FlavorFeatures::NONE
                },
            },
            Flavor::Modern => FlavorProfile {
                flavor: self,
                default_attack_ms: 5.0,
                default_release_ms: 50.0,
                attack_bounds: (0.5, 20.0),
                release_bounds: (20.0, 200.0),
                knee_curve: KneeCurve::Smoothstep,
                limiter_curve: LimiterCurve::Exponential,
                limiter_ceiling: 0.95,
                adaptive: AdaptiveStrategy::BlockHistory,
                makeup_compensation: 0.8,
                features: FlavorFeatures {
                    transient_preserve: true,
                    ..FlavorFeatures::NONE
                },
            },
            Flavor::Vocal => FlavorProfile {
                flavor: self,
                default_attack_ms: 8.0,
                default_release_ms: 80.0,
                attack_bounds: (0.5, 20.0),
                release_bounds: (20.0, 200.0),
                knee_curve: KneeCurve::Smoothstep,
                limiter_curve: LimiterCurve::Tanh,
                limiter_ceiling: 0.95,
                adaptive: AdaptiveStrategy::BlockHistory,
                makeup_compensation: 0.75,
                features: FlavorFeatures {
                    vocal_chain: true,
                    ..FlavorFeatures::NONE
                },
            },
            Flavor::Multiband => FlavorProfile {
                flavor: self,
                default_attack_ms: 10.0,
                default_release_ms: 100.0,
                attack_bounds: (0.1, 100.0),
                release_bounds: (10.0, 1000.0),
                knee_curve: KneeCurve::Quadratic,
                limiter_curve: LimiterCurve::Tanh,
                limiter_ceiling: 0.95,
                adaptive: AdaptiveStrategy::None,
                makeup_compensation: 0.6,
                features: FlavorFeatures {
                    multiband: true,
                    ..FlavorFeatures::NONE
                },
            },
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Flavor {
    type Err = ParseFlavorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flavor::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFlavorError(s.to_string()))
    }
}

/// Optional processing stages enabled for a flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlavorFeatures {
    /// Tube shaper, colour bend and warmth shelf.
    pub tube_stage: bool,
    /// Transient preservation and transparency character.
    pub transient_preserve: bool,
    /// De-esser, breath control and vocal tone shelves.
    pub vocal_chain: bool,
    /// Four-band split with per-band compressors.
    pub multiband: bool,
}

impl FlavorFeatures {
    /// No optional stages.
    pub const NONE: Self = Self {
        tube_stage: false,
        transient_preserve: false,
        vocal_chain: false,
        multiband: false,
    };
}

/// Per-flavour configuration of the shared dynamics pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlavorProfile {
    /// Flavour this profile belongs to.
    pub flavor: Flavor,
    /// Default attack time (ms).
    pub default_attack_ms: f32,
    /// Default release time (ms).
    pub default_release_ms: f32,
    /// Bounds the adaptive attack never leaves (ms).
    pub attack_bounds: (f32, f32),
    /// Bounds the adaptive release never leaves (ms).
    pub release_bounds: (f32, f32),
    /// Knee interpolation.
    pub knee_curve: KneeCurve,
    /// Output limiter curve.
    pub limiter_curve: LimiterCurve,
    /// Output limiter ceiling (linear).
    pub limiter_ceiling: f32,
    /// Adaptive timing strategy used when `adaptive` is on.
    pub adaptive: AdaptiveStrategy,
    /// Fraction of the estimated reduction restored by auto makeup.
    pub makeup_compensation: f32,
    /// Optional stages.
    pub features: FlavorFeatures,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_parse_roundtrip() {
        for flavor in Flavor::ALL {
            assert_eq!(flavor.id().parse::<Flavor>(), Ok(flavor));
            assert_eq!(flavor.to_string(), flavor.id());
        }
        assert_eq!(" Vintage ".parse::<Flavor>(), Ok(Flavor::Vintage));
        assert!("tape".parse::<Flavor>().is_err());
    }

    #[test]
    fn test_profiles_are_consistent() {
        for flavor in Flavor::ALL {
            let p = flavor.profile();
            assert_eq!(p.flavor, flavor);
            assert!(p.attack_bounds.0 <= p.default_attack_ms);
            assert!(p.default_attack_ms <= p.attack_bounds.1);
            assert!(p.release_bounds.0 <= p.default_release_ms);
            assert!(p.default_release_ms <= p.release_bounds.1);
            assert!(p.limiter_ceiling >= 0.5 && p.limiter_ceiling <= 1.0);
        }
    }

    #[test]
    fn test_feature_flags_exclusive() {
        assert!(Flavor::Vintage.profile().features.tube_stage);
        assert!(Flavor::Modern.profile().features.transient_preserve);
        assert!(Flavor::Vocal.profile().features.vocal_chain);
        assert!(Flavor::Multiband.profile().features.multiband);
        assert!(!Flavor::Modern.profile().features.multiband);
    }
}

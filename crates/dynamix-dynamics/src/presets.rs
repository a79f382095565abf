//! Built-in presets.
//!
//! A preset is a partial parameter map applied through
//! [`ParameterStore::set_parameter`](crate::ParameterStore::set_parameter),
//! so anything it leaves out keeps its current value.

use crate::flavor::Flavor;

/// A compiled-in preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactoryPreset {
    /// Stable ID, e.g. `"vintage-slam"`.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Flavour the preset targets.
    pub flavor: Flavor,
    /// Search tags.
    pub tags: &'static [&'static str],
    /// `(parameter id, value)` pairs, applied in order.
    pub params: &'static [(&'static str, f32)],
}

macro_rules! preset {
    ($id:literal, $name:literal, $desc:literal, $flavor:ident, [$($tag:literal),*], { $($key:literal => $value:expr),* $(,)? }) => {
        FactoryPreset {
            id: $id,
            name: $name,
            description: $desc,
            flavor: Flavor::$flavor,
            tags: &[$($tag),*],
            params: &[$(($key, $value)),*],
        }
    };
}

/// Every factory preset.
pub static FACTORY_PRESETS: &[FactoryPreset] = &[
    preset!("vintage-gentle", "Gentle Vintage", "Subtle compression with warm tube character", Vintage,
        ["gentle", "warm", "subtle"], {
            "threshold" => -18.0, "ratio" => 2.0, "attack" => 15.0, "release" => 150.0, "knee" => 4.0,
            "tube_saturation" => 20.0, "color" => 40.0, "warmth" => 30.0,
        }),
    preset!("vintage-medium", "Classic Vintage", "Medium compression with rich tube saturation", Vintage,
        ["classic", "warm", "rich"], {
            "threshold" => -15.0, "ratio" => 4.0, "attack" => 10.0, "release" => 100.0, "knee" => 3.0,
            "tube_saturation" => 40.0, "color" => 60.0, "warmth" => 50.0,
        }),
    preset!("vintage-slam", "Vintage Slam", "Aggressive vintage compression with heavy saturation", Vintage,
        ["aggressive", "heavy", "saturated"], {
            "threshold" => -12.0, "ratio" => 8.0, "attack" => 3.0, "release" => 50.0, "knee" => 1.0,
            "tube_saturation" => 70.0, "color" => 80.0, "warmth" => 60.0,
        }),
    preset!("vintage-parallel", "Vintage Parallel", "Parallel compression with tube character", Vintage,
        ["parallel", "vintage", "blend"], {
            "threshold" => -25.0, "ratio" => 10.0, "attack" => 1.0, "release" => 80.0, "knee" => 0.0,
            "tube_saturation" => 50.0, "color" => 70.0, "warmth" => 40.0, "mix" => 35.0,
        }),
    preset!("modern-transparent", "Transparent", "Ultra-clean, transparent compression", Modern,
        ["transparent", "clean", "gentle"], {
            "threshold" => -15.0, "ratio" => 3.0, "attack" => 3.0, "release" => 40.0, "knee" => 3.0,
            "transparency" => 95.0, "transient_preserve" => 80.0, "mix" => 100.0,
        }),
    preset!("modern-glue", "Modern Glue", "Gentle mix bus compression", Modern,
        ["glue", "mix", "subtle"], {
            "threshold" => -20.0, "ratio" => 2.5, "attack" => 10.0, "release" => 80.0, "knee" => 4.0,
            "transparency" => 85.0, "transient_preserve" => 75.0, "mix" => 100.0,
        }),
    preset!("modern-punch", "Modern Punch", "Add punch and energy", Modern,
        ["punch", "energy", "fast"], {
            "threshold" => -18.0, "ratio" => 5.0, "attack" => 1.0, "release" => 30.0, "knee" => 1.0,
            "transparency" => 75.0, "transient_preserve" => 60.0, "mix" => 100.0,
        }),
    preset!("modern-parallel", "Modern Parallel", "Transparent parallel compression", Modern,
        ["parallel", "blend", "depth"], {
            "threshold" => -25.0, "ratio" => 10.0, "attack" => 1.0, "release" => 80.0, "knee" => 0.0,
            "transparency" => 90.0, "transient_preserve" => 85.0, "mix" => 40.0,
        }),
    preset!("vocal-natural", "Natural Vocal", "Gentle, transparent vocal compression", Vocal,
        ["natural", "gentle", "transparent"], {
            "threshold" => -18.0, "ratio" => 3.0, "attack" => 10.0, "release" => 100.0,
            "presence_enhance" => 30.0, "de_ess_amount" => 30.0, "breath_control" => 20.0,
            "air_enhance" => 20.0, "proximity_fix" => 15.0,
        }),
    preset!("vocal-radio", "Radio Vocal", "Professional broadcast-style compression", Vocal,
        ["radio", "professional", "polished"], {
            "threshold" => -20.0, "ratio" => 4.0, "attack" => 6.0, "release" => 60.0,
            "presence_enhance" => 60.0, "de_ess_amount" => 50.0, "breath_control" => 40.0,
            "air_enhance" => 40.0, "proximity_fix" => 30.0,
        }),
    preset!("vocal-rap", "Rap Vocal", "Punchy compression for rap vocals", Vocal,
        ["rap", "punchy", "aggressive"], {
            "threshold" => -22.0, "ratio" => 5.0, "attack" => 3.0, "release" => 40.0,
            "presence_enhance" => 70.0, "de_ess_amount" => 40.0, "breath_control" => 50.0,
            "air_enhance" => 30.0, "proximity_fix" => 25.0,
        }),
    preset!("vocal-sung", "Sung Vocal", "Smooth compression for sung vocals", Vocal,
        ["sung", "smooth", "musical"], {
            "threshold" => -16.0, "ratio" => 3.5, "attack" => 12.0, "release" => 120.0,
            "presence_enhance" => 45.0, "de_ess_amount" => 45.0, "breath_control" => 25.0,
            "air_enhance" => 50.0, "proximity_fix" => 20.0,
        }),
    preset!("vocal-podcast", "Podcast Voice", "Consistent, broadcast-quality voice", Vocal,
        ["podcast", "voice", "consistent"], {
            "threshold" => -24.0, "ratio" => 6.0, "attack" => 8.0, "release" => 80.0,
            "presence_enhance" => 55.0, "de_ess_amount" => 60.0, "breath_control" => 60.0,
            "air_enhance" => 35.0, "proximity_fix" => 40.0,
        }),
    preset!("multiband-master", "Master Bus", "Gentle multiband compression for master bus", Multiband,
        ["master", "gentle", "glue"], {
            "band1_threshold" => -20.0, "band1_ratio" => 2.5,
            "band2_threshold" => -20.0, "band2_ratio" => 2.5,
            "band3_threshold" => -20.0, "band3_ratio" => 2.5,
            "band4_threshold" => -20.0, "band4_ratio" => 2.5,
            "mix" => 100.0,
        }),
    preset!("multiband-vocal", "Vocal Enhancement", "Optimize vocal frequency ranges", Multiband,
        ["vocal", "enhancement", "clarity"], {
            "band1_threshold" => -18.0, "band1_ratio" => 3.0,
            "band2_threshold" => -18.0, "band2_ratio" => 3.0,
            "band3_threshold" => -18.0, "band3_ratio" => 3.0,
            "band4_threshold" => -18.0, "band4_ratio" => 3.0,
            "mix" => 100.0,
        }),
    preset!("multiband-bass", "Bass Control", "Tight low-end compression", Multiband,
        ["bass", "tight", "control"], {
            "band1_threshold" => -15.0, "band1_ratio" => 4.0,
            "band2_threshold" => -20.0, "band2_ratio" => 2.0,
            "band3_threshold" => -20.0, "band3_ratio" => 2.0,
            "band4_threshold" => -20.0, "band4_ratio" => 2.0,
            "mix" => 100.0,
        }),
];

/// Look up a factory preset by ID (case-insensitive).
pub fn find(id: &str) -> Option<&'static FactoryPreset> {
    FACTORY_PRESETS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id.trim()))
}

/// Factory presets for `flavor`.
pub fn for_flavor(flavor: Flavor) -> impl Iterator<Item = &'static FactoryPreset> {
    FACTORY_PRESETS.iter().filter(move |p| p.flavor == flavor)
}

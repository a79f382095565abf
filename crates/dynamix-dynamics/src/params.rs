//! Typed, lock-free parameter storage.
//!
//! Every parameter a flavour exposes is named by a [`ParamKey`] with a
//! stable string ID and [`ParamId`]. A [`ParameterStore`] keeps one
//! `AtomicU32` (f32 bits) per key, so a control thread can write while the
//! audio thread reads. The processor copies all values into a plain
//! [`Settings`] once per block, so nothing changes under the sample loop.
//!
//! Writes clamp to the descriptor's range. A few writes have side effects:
//!
//! - `bandN_solo = On` clears every other band's solo.
//! - With `adaptive` on, `threshold` and `ratio` recompute `makeup_gain` as
//!   `|threshold| / ratio × c` (c from the flavour profile).
//! - Multiband with auto balance on: a band threshold write sets
//!   `makeup_gain = mean(|band thresholds|) / 3 × c`.

use core::fmt;
use core::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use dynamix_core::{ParamDescriptor, ParamId};

use crate::band_splitter::{DEFAULT_CROSSOVERS, NUM_BANDS};
use crate::error::ParseParamError;
use crate::flavor::Flavor;
use crate::vocal::{VOCAL_TYPE_LABELS, VocalType};

/// Per-band parameter field (multiband only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandField {
    /// Band threshold (dB).
    Threshold,
    /// Band ratio.
    Ratio,
    /// Band attack (ms).
    Attack,
    /// Band release (ms).
    Release,
    /// Post-compression band trim (dB).
    Gain,
    /// Solo: only soloed bands reach the output.
    Solo,
    /// Mute: band contributes silence.
    Mute,
    /// Bypass: band passes at unity without compression or trim.
    Bypass,
}

impl BandField {
    /// Fields in ID order.
    pub const ALL: [BandField; 8] = [
        BandField::Threshold,
        BandField::Ratio,
        BandField::Attack,
        BandField::Release,
        BandField::Gain,
        BandField::Solo,
        BandField::Mute,
        BandField::Bypass,
    ];

    /// Position within [`BandField::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

macro_rules! band_strings {
    ($fmt:ident; $($n:literal),*) => {
        [$(band_strings!(@row $fmt $n)),*]
    };
    (@row id $n:literal) => {
        [
            concat!("band", $n, "_threshold"),
            concat!("band", $n, "_ratio"),
            concat!("band", $n, "_attack"),
            concat!("band", $n, "_release"),
            concat!("band", $n, "_gain"),
            concat!("band", $n, "_solo"),
            concat!("band", $n, "_mute"),
            concat!("band", $n, "_bypass"),
        ]
    };
    (@row name $n:literal) => {
        [
            concat!("Band ", $n, " Threshold"),
            concat!("Band ", $n, " Ratio"),
            concat!("Band ", $n, " Attack"),
            concat!("Band ", $n, " Release"),
            concat!("Band ", $n, " Gain"),
            concat!("Band ", $n, " Solo"),
            concat!("Band ", $n, " Mute"),
            concat!("Band ", $n, " Bypass"),
        ]
    };
    (@row short $n:literal) => {
        [
            concat!("B", $n, " Thr"),
            concat!("B", $n, " Ratio"),
            concat!("B", $n, " Atk"),
            concat!("B", $n, " Rel"),
            concat!("B", $n, " Gain"),
            concat!("B", $n, " Solo"),
            concat!("B", $n, " Mute"),
            concat!("B", $n, " Byp"),
        ]
    };
}

static BAND_IDS: [[&str; 8]; NUM_BANDS] = band_strings!(id; "1", "2", "3", "4");
static BAND_NAMES: [[&str; 8]; NUM_BANDS] = band_strings!(name; "1", "2", "3", "4");
static BAND_SHORT_NAMES: [[&str; 8]; NUM_BANDS] = band_strings!(short; "1", "2", "3", "4");

static CROSSOVER_IDS: [&str; NUM_BANDS - 1] = ["crossover1", "crossover2", "crossover3"];
static CROSSOVER_NAMES: [&str; NUM_BANDS - 1] = ["Low Crossover", "Mid Crossover", "High Crossover"];
static CROSSOVER_SHORT_NAMES: [&str; NUM_BANDS - 1] = ["X-Low", "X-Mid", "X-High"];
const CROSSOVER_RANGES: [(f32, f32); NUM_BANDS - 1] = [(50.0, 500.0), (400.0, 2000.0), (2000.0, 10000.0)];

const BAND_ATTACK_MS: [f32; NUM_BANDS] = [15.0, 10.0, 8.0, 5.0];
const BAND_RELEASE_MS: [f32; NUM_BANDS] = [150.0, 100.0, 80.0, 50.0];

/// Strongly typed parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Threshold (dB).
    Threshold,
    /// Ratio (n:1).
    Ratio,
    /// Attack (ms).
    Attack,
    /// Release (ms).
    Release,
    /// Knee width (dB).
    Knee,
    /// Makeup gain (dB).
    MakeupGain,
    /// Dry/wet mix (%).
    Mix,
    /// Lookahead (ms).
    Lookahead,
    /// Adaptive timing, or auto balance for multiband.
    Adaptive,
    /// Tube drive (%).
    TubeSaturation,
    /// Colour bend (%).
    Color,
    /// Low-shelf warmth (%).
    Warmth,
    /// Transparency (%): less character bend when high.
    Transparency,
    /// Transient preservation (%).
    TransientPreserve,
    /// Voice type choice.
    VocalType,
    /// Presence bell (%).
    PresenceEnhance,
    /// De-esser depth (%).
    DeEssAmount,
    /// Breath attenuation (%).
    BreathControl,
    /// Air shelf (%).
    AirEnhance,
    /// Proximity low cut (%).
    ProximityFix,
    /// Crossover frequency, 0-based.
    Crossover(usize),
    /// Band field, 0-based band.
    Band(usize, BandField),
}

impl ParamKey {
    const FIXED: [ParamKey; 20] = [
        ParamKey::Threshold,
        ParamKey::Ratio,
        ParamKey::Attack,
        ParamKey::Release,
        ParamKey::Knee,
        ParamKey::MakeupGain,
        ParamKey::Mix,
        ParamKey::Lookahead,
        ParamKey::Adaptive,
        ParamKey::TubeSaturation,
        ParamKey::Color,
        ParamKey::Warmth,
        ParamKey::Transparency,
        ParamKey::TransientPreserve,
        ParamKey::VocalType,
        ParamKey::PresenceEnhance,
        ParamKey::DeEssAmount,
        ParamKey::BreathControl,
        ParamKey::AirEnhance,
        ParamKey::ProximityFix,
    ];

    /// Stable string ID. Out-of-range band or crossover indices yield `""`.
    pub fn id(self) -> &'static str {
        match self {
            ParamKey::Threshold => "threshold",
            ParamKey::Ratio => "ratio",
            ParamKey::Attack => "attack",
            ParamKey::Release => "release",
            ParamKey::Knee => "knee",
            ParamKey::MakeupGain => "makeup_gain",
            ParamKey::Mix => "mix",
            ParamKey::Lookahead => "lookahead",
            ParamKey::Adaptive => "adaptive",
            ParamKey::TubeSaturation => "tube_saturation",
            ParamKey::Color => "color",
            ParamKey::Warmth => "warmth",
            ParamKey::Transparency => "transparency",
            ParamKey::TransientPreserve => "transient_preserve",
            ParamKey::VocalType => "vocal_type",
            ParamKey::PresenceEnhance => "presence_enhance",
            ParamKey::DeEssAmount => "de_ess_amount",
            ParamKey::BreathControl => "breath_control",
            ParamKey::AirEnhance => "air_enhance",
            ParamKey::ProximityFix => "proximity_fix",
            ParamKey::Crossover(i) => CROSSOVER_IDS.get(i).copied().unwrap_or(""),
            ParamKey::Band(b, field) => BAND_IDS.get(b).map_or("", |row| row[field.index()]),
        }
    }

    /// Stable numeric ID.
    ///
    /// Common controls live at 100, vintage at 200, modern at 300, vocal at
    /// 400 and multiband at 500 (crossovers 500..503, band `b` field `f` at
    /// `510 + 10b + f`).
    pub fn param_id(self) -> ParamId {
        let raw = match self {
            ParamKey::Threshold => 100,
            ParamKey::Ratio => 101,
            ParamKey::Attack => 102,
            ParamKey::Release => 103,
            ParamKey::Knee => 104,
            ParamKey::MakeupGain => 105,
            ParamKey::Mix => 106,
            ParamKey::Lookahead => 107,
            ParamKey::Adaptive => 108,
            ParamKey::TubeSaturation => 200,
            ParamKey::Color => 201,
            ParamKey::Warmth => 202,
            ParamKey::Transparency => 300,
            ParamKey::TransientPreserve => 301,
            ParamKey::VocalType => 400,
            ParamKey::PresenceEnhance => 401,
            ParamKey::DeEssAmount => 402,
            ParamKey::BreathControl => 403,
            ParamKey::AirEnhance => 404,
            ParamKey::ProximityFix => 405,
            ParamKey::Crossover(i) => 500 + i as u32,
            ParamKey::Band(b, field) => 510 + 10 * b as u32 + field.index() as u32,
        };
        ParamId(raw)
    }

    /// Descriptor with the shared range and a generic default.
    ///
    /// Flavour-specific defaults are applied by [`flavor_parameters`].
    fn base_descriptor(self) -> ParamDescriptor {
        let desc = match self {
            ParamKey::Threshold => ParamDescriptor::gain_db("Threshold", "Thresh", -60.0, 0.0, -18.0),
            ParamKey::Ratio => ParamDescriptor::ratio(1.0, 20.0, 4.0),
            ParamKey::Attack => ParamDescriptor::time_ms("Attack", "Attack", 0.1, 100.0, 10.0),
            ParamKey::Release => ParamDescriptor::time_ms("Release", "Release", 10.0, 1000.0, 100.0),
            ParamKey::Knee => ParamDescriptor::gain_db("Knee", "Knee", 0.0, 12.0, 2.0),
            ParamKey::MakeupGain => ParamDescriptor::gain_db("Makeup Gain", "Makeup", 0.0, 24.0, 0.0),
            ParamKey::Mix => ParamDescriptor::mix(),
            ParamKey::Lookahead => ParamDescriptor::time_ms("Lookahead", "Look", 0.0, 10.0, 0.0),
            ParamKey::Adaptive => ParamDescriptor::toggle("Adaptive", "Adapt", true),
            ParamKey::TubeSaturation => ParamDescriptor::percent("Tube Saturation", "Tube", 30.0),
            ParamKey::Color => ParamDescriptor::percent("Color", "Color", 50.0),
            ParamKey::Warmth => ParamDescriptor::percent("Warmth", "Warmth", 40.0),
            ParamKey::Transparency => ParamDescriptor::percent("Transparency", "Transp", 80.0),
            ParamKey::TransientPreserve => {
                ParamDescriptor::percent("Transient Preserve", "Trans", 70.0)
            }
            ParamKey::VocalType => {
                ParamDescriptor::choice("Vocal Type", "Voice", VOCAL_TYPE_LABELS, 0)
            }
            ParamKey::PresenceEnhance => ParamDescriptor::percent("Presence", "Presence", 50.0),
            ParamKey::DeEssAmount => ParamDescriptor::percent("De-Ess", "De-Ess", 40.0),
            ParamKey::BreathControl => ParamDescriptor::percent("Breath Control", "Breath", 30.0),
            ParamKey::AirEnhance => ParamDescriptor::percent("Air", "Air", 30.0),
            ParamKey::ProximityFix => ParamDescriptor::percent("Proximity Fix", "Prox", 20.0),
            ParamKey::Crossover(i) => {
                let (min, max) = CROSSOVER_RANGES[i];
                ParamDescriptor::frequency_hz(
                    CROSSOVER_NAMES[i],
                    CROSSOVER_SHORT_NAMES[i],
                    min,
                    max,
                    DEFAULT_CROSSOVERS[i],
                )
            }
            ParamKey::Band(b, field) => {
                let name = BAND_NAMES[b][field.index()];
                let short = BAND_SHORT_NAMES[b][field.index()];
                match field {
                    BandField::Threshold => ParamDescriptor::gain_db(name, short, -60.0, 0.0, -18.0),
                    BandField::Ratio => ParamDescriptor::ratio(1.0, 20.0, 3.0).with_name(name, short),
                    BandField::Attack => {
                        ParamDescriptor::time_ms(name, short, 0.1, 100.0, BAND_ATTACK_MS[b])
                    }
                    BandField::Release => {
                        ParamDescriptor::time_ms(name, short, 10.0, 1000.0, BAND_RELEASE_MS[b])
                    }
                    BandField::Gain => ParamDescriptor::gain_db(name, short, -12.0, 12.0, 0.0),
                    BandField::Solo | BandField::Mute | BandField::Bypass => {
                        ParamDescriptor::toggle(name, short, false)
                    }
                }
            }
        };
        desc.with_id(self.param_id(), self.id())
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ParamKey {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        if let Some(key) = Self::FIXED.iter().find(|k| k.id().eq_ignore_ascii_case(id)) {
            return Ok(*key);
        }
        if let Some(i) = CROSSOVER_IDS.iter().position(|c| c.eq_ignore_ascii_case(id)) {
            return Ok(ParamKey::Crossover(i));
        }
        for (b, row) in BAND_IDS.iter().enumerate() {
            if let Some(f) = row.iter().position(|c| c.eq_ignore_ascii_case(id)) {
                return Ok(ParamKey::Band(b, BandField::ALL[f]));
            }
        }
        Err(ParseParamError(s.to_string()))
    }
}

/// Parameters exposed by `flavor`, in display order, with flavour defaults.
pub fn flavor_parameters(flavor: Flavor) -> Vec<(ParamKey, ParamDescriptor)> {
    let with = |key: ParamKey, default: f32| (key, key.base_descriptor().with_default(default));
    let base = |key: ParamKey| (key, key.base_descriptor());

    match flavor {
        Flavor::Multiband => {
            let mut params: Vec<_> = (0..NUM_BANDS - 1)
                .map(|i| base(ParamKey::Crossover(i)))
                .collect();
            for b in 0..NUM_BANDS {
                params.extend(BandField::ALL.iter().map(|&f| base(ParamKey::Band(b, f))));
            }
            params.push(base(ParamKey::MakeupGain));
            params.push(base(ParamKey::Mix));
            let auto_balance = ParamKey::Adaptive
                .base_descriptor()
                .with_name("Auto Balance", "AutoBal");
            params.push((ParamKey::Adaptive, auto_balance));
            params
        }
        single => {
            let profile = single.profile();
            let (threshold, knee, lookahead) = match single {
                Flavor::Vintage => (-12.0, 3.0, 0.0),
                Flavor::Vocal => (-20.0, 4.0, 2.0),
                _ => (-18.0, 2.0, 5.0),
            };
            let mut params = vec![
                with(ParamKey::Threshold, threshold),
                with(ParamKey::Ratio, 4.0),
                with(ParamKey::Attack, profile.default_attack_ms),
                with(ParamKey::Release, profile.default_release_ms),
                with(ParamKey::Knee, knee),
                base(ParamKey::MakeupGain),
                base(ParamKey::Mix),
                with(ParamKey::Lookahead, lookahead),
                base(ParamKey::Adaptive),
            ];
            let extras: &[ParamKey] = match single {
                Flavor::Vintage => &[ParamKey::TubeSaturation, ParamKey::Color, ParamKey::Warmth],
                Flavor::Vocal => &[
                    ParamKey::VocalType,
                    ParamKey::PresenceEnhance,
                    ParamKey::DeEssAmount,
                    ParamKey::BreathControl,
                    ParamKey::AirEnhance,
                    ParamKey::ProximityFix,
                ],
                _ => &[ParamKey::Transparency, ParamKey::TransientPreserve],
            };
            params.extend(extras.iter().map(|&k| base(k)));
            params
        }
    }
}

/// Plain copy of one band's controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSettings {
    /// Threshold (dB).
    pub threshold_db: f32,
    /// Ratio.
    pub ratio: f32,
    /// Attack (ms).
    pub attack_ms: f32,
    /// Release (ms).
    pub release_ms: f32,
    /// Trim (dB).
    pub gain_db: f32,
    /// Solo.
    pub solo: bool,
    /// Mute.
    pub mute: bool,
    /// Bypass.
    pub bypass: bool,
}

impl Default for BandSettings {
    fn default() -> Self {
        Self {
            threshold_db: -18.0,
            ratio: 3.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            gain_db: 0.0,
            solo: false,
            mute: false,
            bypass: false,
        }
    }
}

/// Per-block snapshot of every parameter.
///
/// Percent controls are stored as fractions in \[0, 1\]. Keys a flavour does
/// not expose keep their neutral value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Threshold (dB).
    pub threshold_db: f32,
    /// Ratio.
    pub ratio: f32,
    /// Attack (ms).
    pub attack_ms: f32,
    /// Release (ms).
    pub release_ms: f32,
    /// Knee (dB).
    pub knee_db: f32,
    /// Makeup (dB).
    pub makeup_db: f32,
    /// Wet fraction.
    pub mix: f32,
    /// Lookahead (ms).
    pub lookahead_ms: f32,
    /// Adaptive timing / auto balance.
    pub adaptive: bool,
    /// Tube drive.
    pub tube: f32,
    /// Colour amount.
    pub color: f32,
    /// Warmth amount.
    pub warmth: f32,
    /// Transparency.
    pub transparency: f32,
    /// Transient preservation.
    pub transient_preserve: f32,
    /// Voice type.
    pub vocal_type: VocalType,
    /// Presence amount.
    pub presence: f32,
    /// De-ess depth.
    pub de_ess: f32,
    /// Breath attenuation.
    pub breath: f32,
    /// Air amount.
    pub air: f32,
    /// Proximity fix amount.
    pub proximity: f32,
    /// Crossovers (Hz).
    pub crossovers: [f32; NUM_BANDS - 1],
    /// Band controls.
    pub bands: [BandSettings; NUM_BANDS],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threshold_db: 0.0,
            ratio: 1.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            knee_db: 0.0,
            makeup_db: 0.0,
            mix: 1.0,
            lookahead_ms: 0.0,
            adaptive: false,
            tube: 0.0,
            color: 0.0,
            warmth: 0.0,
            transparency: 1.0,
            transient_preserve: 0.0,
            vocal_type: VocalType::Auto,
            presence: 0.0,
            de_ess: 0.0,
            breath: 0.0,
            air: 0.0,
            proximity: 0.0,
            crossovers: DEFAULT_CROSSOVERS,
            bands: [BandSettings::default(); NUM_BANDS],
        }
    }
}

impl Settings {
    /// Whether any band is soloed.
    pub fn any_solo(&self) -> bool {
        self.bands.iter().any(|b| b.solo)
    }

    fn assign(&mut self, key: ParamKey, value: f32) {
        let pct = value / 100.0;
        let on = value >= 0.5;
        match key {
            ParamKey::Threshold => self.threshold_db = value,
            ParamKey::Ratio => self.ratio = value,
            ParamKey::Attack => self.attack_ms = value,
            ParamKey::Release => self.release_ms = value,
            ParamKey::Knee => self.knee_db = value,
            ParamKey::MakeupGain => self.makeup_db = value,
            ParamKey::Mix => self.mix = pct,
            ParamKey::Lookahead => self.lookahead_ms = value,
            ParamKey::Adaptive => self.adaptive = on,
            ParamKey::TubeSaturation => self.tube = pct,
            ParamKey::Color => self.color = pct,
            ParamKey::Warmth => self.warmth = pct,
            ParamKey::Transparency => self.transparency = pct,
            ParamKey::TransientPreserve => self.transient_preserve = pct,
            ParamKey::VocalType => self.vocal_type = VocalType::from_index(value),
            ParamKey::PresenceEnhance => self.presence = pct,
            ParamKey::DeEssAmount => self.de_ess = pct,
            ParamKey::BreathControl => self.breath = pct,
            ParamKey::AirEnhance => self.air = pct,
            ParamKey::ProximityFix => self.proximity = pct,
            ParamKey::Crossover(i) => {
                if let Some(c) = self.crossovers.get_mut(i) {
                    *c = value;
                }
            }
            ParamKey::Band(b, field) => {
                if let Some(band) = self.bands.get_mut(b) {
                    match field {
                        BandField::Threshold => band.threshold_db = value,
                        BandField::Ratio => band.ratio = value,
                        BandField::Attack => band.attack_ms = value,
                        BandField::Release => band.release_ms = value,
                        BandField::Gain => band.gain_db = value,
                        BandField::Solo => band.solo = on,
                        BandField::Mute => band.mute = on,
                        BandField::Bypass => band.bypass = on,
                    }
                }
            }
        }
    }
}

/// One row of [`ParameterStore::parameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterEntry {
    /// Key.
    pub key: ParamKey,
    /// Descriptor.
    pub descriptor: ParamDescriptor,
    /// Current value.
    pub value: f32,
    /// Formatted value.
    pub display: String,
}

struct Slot {
    key: ParamKey,
    descriptor: ParamDescriptor,
    value: AtomicU32,
}

impl Slot {
    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    #[inline]
    fn store(&self, value: f32) -> f32 {
        let clamped = self.descriptor.clamp(value);
        self.value.store(clamped.to_bits(), Ordering::Release);
        clamped
    }
}

/// Shared parameter values for one processor.
///
/// Wrap in `Arc` to share between a control thread and the audio thread.
///
/// # Example
///
/// ```rust
/// use dynamix_dynamics::{Flavor, ParamKey, ParameterStore};
///
/// let store = ParameterStore::new(Flavor::Modern);
/// assert_eq!(store.set(ParamKey::Ratio, 50.0), Some(20.0));
/// assert_eq!(store.get_by_id("ratio"), Some(20.0));
/// assert_eq!(store.set_parameter("no_such_param", 1.0), None);
/// ```
pub struct ParameterStore {
    flavor: Flavor,
    makeup_compensation: f32,
    slots: Vec<Slot>,
    enabled: AtomicBool,
}

impl fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterStore")
            .field("flavor", &self.flavor)
            .field("params", &self.slots.len())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl ParameterStore {
    /// Store for `flavor`, initialised to its defaults and enabled.
    pub fn new(flavor: Flavor) -> Self {
        let slots = flavor_parameters(flavor)
            .into_iter()
            .map(|(key, descriptor)| Slot {
                key,
                descriptor,
                value: AtomicU32::new(descriptor.default.to_bits()),
            })
            .collect();
        Self {
            flavor,
            makeup_compensation: flavor.profile().makeup_compensation,
            slots,
            enabled: AtomicBool::new(true),
        }
    }

    /// Flavour this store describes.
    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; every flavour has parameters.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Index of `key`, if this flavour exposes it.
    pub fn index_of(&self, key: ParamKey) -> Option<usize> {
        self.slots.iter().position(|s| s.key == key)
    }

    /// Key at `index`.
    pub fn key_at(&self, index: usize) -> Option<ParamKey> {
        self.slots.get(index).map(|s| s.key)
    }

    /// Descriptor at `index`.
    pub fn descriptor_at(&self, index: usize) -> Option<ParamDescriptor> {
        self.slots.get(index).map(|s| s.descriptor)
    }

    /// Descriptor for `key`.
    pub fn descriptor(&self, key: ParamKey) -> Option<ParamDescriptor> {
        self.slot(key).map(|s| s.descriptor)
    }

    /// Value at `index`.
    pub fn get_index(&self, index: usize) -> Option<f32> {
        self.slots.get(index).map(Slot::load)
    }

    /// Value of `key`.
    pub fn get(&self, key: ParamKey) -> Option<f32> {
        self.slot(key).map(Slot::load)
    }

    /// Value by string ID.
    pub fn get_by_id(&self, id: &str) -> Option<f32> {
        id.parse().ok().and_then(|key| self.get(key))
    }

    /// Formatted value of `key`.
    pub fn display(&self, key: ParamKey) -> Option<String> {
        self.slot(key).map(|s| s.descriptor.format_value(s.load()))
    }

    /// Write `value` (clamped) to the parameter at `index`.
    ///
    /// Returns the stored value.
    pub fn set_index(&self, index: usize, value: f32) -> Option<f32> {
        let slot = self.slots.get(index)?;
        let stored = slot.store(value);
        self.after_write(slot.key, stored);
        Some(stored)
    }

    /// Write `value` (clamped) to `key`. Returns `None` if this flavour has no
    /// such parameter.
    pub fn set(&self, key: ParamKey, value: f32) -> Option<f32> {
        let index = self.index_of(key)?;
        self.set_index(index, value)
    }

    /// Write by string ID. Unknown IDs are logged and ignored.
    pub fn set_parameter(&self, id: &str, value: f32) -> Option<f32> {
        let stored = id.parse::<ParamKey>().ok().and_then(|key| self.set(key, value));
        if stored.is_none() {
            tracing::warn!(id, flavor = %self.flavor, "ignoring unknown parameter");
        }
        stored
    }

    /// Apply `(id, value)` pairs in order. Returns how many were applied.
    pub fn apply<'a, I>(&self, params: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        params
            .into_iter()
            .filter(|(id, value)| self.set_parameter(id, *value).is_some())
            .count()
    }

    /// Restore every default without side effects.
    pub fn reset_to_defaults(&self) {
        for slot in &self.slots {
            slot.store(slot.descriptor.default);
        }
    }

    /// Every parameter with its current value and display string.
    pub fn parameters(&self) -> Vec<ParameterEntry> {
        self.slots
            .iter()
            .map(|s| {
                let value = s.load();
                ParameterEntry {
                    key: s.key,
                    descriptor: s.descriptor,
                    value,
                    display: s.descriptor.format_value(value),
                }
            })
            .collect()
    }

    /// Enable or bypass processing.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Whether processing is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Copy every value into a [`Settings`].
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        for slot in &self.slots {
            settings.assign(slot.key, slot.load());
        }
        settings
    }

    fn slot(&self, key: ParamKey) -> Option<&Slot> {
        self.slots.iter().find(|s| s.key == key)
    }

    fn adaptive(&self) -> bool {
        self.get(ParamKey::Adaptive).is_some_and(|v| v >= 0.5)
    }

    fn after_write(&self, key: ParamKey, value: f32) {
        match key {
            ParamKey::Band(band, BandField::Solo) if value >= 0.5 => {
                for other in (0..NUM_BANDS).filter(|&b| b != band) {
                    if let Some(slot) = self.slot(ParamKey::Band(other, BandField::Solo)) {
                        slot.store(0.0);
                    }
                }
            }
            ParamKey::Threshold | ParamKey::Ratio if self.adaptive() => {
                if let (Some(threshold), Some(ratio)) =
                    (self.get(ParamKey::Threshold), self.get(ParamKey::Ratio))
                {
                    let makeup = threshold.abs() / ratio.max(1.0) * self.makeup_compensation;
                    self.store_makeup(makeup);
                }
            }
            ParamKey::Band(_, BandField::Threshold) if self.adaptive() => {
                let thresholds: Vec<f32> = (0..NUM_BANDS)
                    .filter_map(|b| self.get(ParamKey::Band(b, BandField::Threshold)))
                    .collect();
                if !thresholds.is_empty() {
                    let mean = thresholds.iter().map(|t| t.abs()).sum::<f32>()
                        / thresholds.len() as f32;
                    self.store_makeup(mean / 3.0 * self.makeup_compensation);
                }
            }
            _ => {}
        }
    }

    fn store_makeup(&self, makeup_db: f32) {
        if let Some(slot) = self.slot(ParamKey::MakeupGain) {
            let stored = slot.store(makeup_db);
            tracing::debug!(makeup_db = stored, flavor = %self.flavor, "auto makeup");
        }
    }
}

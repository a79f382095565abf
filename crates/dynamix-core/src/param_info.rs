//! Parameter metadata for discoverable processor controls.
//!
//! Each control is described by a [`ParamDescriptor`]: display names, unit,
//! range, default, stable identifiers and, for stepped controls, the labels
//! shown for each step. Descriptors are plain `Copy` data so flavour tables
//! can be built as constants.
//!
//! - [`ParamId`]: stable numeric ID for automation and preset persistence
//! - [`ParamFlags`]: capability flags (automatable, stepped)
//! - `string_id`: stable snake_case ID used by presets and the CLI
//!
//! # Example
//!
//! ```rust
//! use dynamix_core::{ParamDescriptor, ParamId};
//!
//! let threshold = ParamDescriptor::gain_db("Threshold", "Thresh", -60.0, 0.0, -18.0)
//!     .with_id(ParamId(100), "threshold");
//!
//! assert_eq!(threshold.clamp(-75.0), -60.0);
//! assert_eq!(threshold.format_value(-18.0), "-18.0 dB");
//! ```

use alloc::format;
use alloc::string::String;

/// Stable parameter identifier that survives reordering.
///
/// Each flavour gets a base ID and its parameters are numbered from there:
/// common controls 100.., vintage 200.., modern 300.., vocal 400..,
/// multiband 500...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub u32);

/// Parameter capability flags.
///
/// ```rust
/// use dynamix_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!ParamFlags::NONE.contains(ParamFlags::STEPPED));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter (default for all params).
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter has discrete steps (toggles and enum-like values).
    pub const STEPPED: Self = Self(1 << 1);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Trait for processors that expose introspectable parameters by index.
///
/// Indices are stable for the lifetime of the instance. Setting a value
/// clamps it to the descriptor's range; out-of-range indices are ignored.
pub trait ParameterInfo {
    /// Number of parameters. Valid indices are `0..param_count()`.
    fn param_count(&self) -> usize;

    /// Descriptor for the parameter at `index`, or `None` if out of range.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value of the parameter at `index` (0.0 if out of range).
    fn get_param(&self, index: usize) -> f32;

    /// Set the parameter at `index`, clamped to its range.
    fn set_param(&mut self, index: usize, value: f32);

    /// Find a parameter index by its stable string ID.
    fn param_index_by_string_id(&self, string_id: &str) -> Option<usize> {
        (0..self.param_count())
            .find(|&i| self.param_info(i).is_some_and(|d| d.string_id == string_id))
    }
}

/// Describes a single parameter's metadata for display and validation.
///
/// `short_name` should stay at 8 characters or less so it fits narrow
/// displays and the CLI parameter table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display (e.g. "Makeup Gain").
    pub name: &'static str,
    /// Short name, max 8 characters (e.g. "Makeup").
    pub short_name: &'static str,
    /// Unit used when formatting the value.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Value on construction and after a reset to defaults.
    pub default: f32,
    /// Recommended step increment.
    pub step: f32,
    /// Stable numeric ID.
    pub id: ParamId,
    /// Stable snake_case ID (`"threshold"`, `"band2_release"`).
    pub string_id: &'static str,
    /// Capability flags.
    pub flags: ParamFlags,
    /// Display labels for stepped parameters, indexed by `value - min`.
    ///
    /// Empty for continuous parameters.
    pub labels: &'static [&'static str],
}

/// Labels for on/off toggles.
pub const TOGGLE_LABELS: &[&str] = &["Off", "On"];

impl ParamDescriptor {
    const fn base(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
        step: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit,
            min,
            max,
            default,
            step,
            id: ParamId(0),
            string_id: "",
            flags: ParamFlags::AUTOMATABLE,
            labels: &[],
        }
    }

    /// Standard mix parameter (0–100%, default 100%).
    pub const fn mix() -> Self {
        Self::base("Mix", "Mix", ParamUnit::Percent, 0.0, 100.0, 100.0, 1.0)
    }

    /// Percentage amount parameter (0–100%).
    pub const fn percent(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self::base(name, short_name, ParamUnit::Percent, 0.0, 100.0, default, 1.0)
    }

    /// Compression ratio parameter (`n:1`).
    pub const fn ratio(min: f32, max: f32, default: f32) -> Self {
        Self::base("Ratio", "Ratio", ParamUnit::Ratio, min, max, default, 0.1)
    }

    /// Time parameter with custom name and range (milliseconds).
    pub const fn time_ms(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::base(name, short_name, ParamUnit::Milliseconds, min, max, default, 0.1)
    }

    /// Gain or level parameter with custom name and range (decibels).
    pub const fn gain_db(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::base(name, short_name, ParamUnit::Decibels, min, max, default, 0.5)
    }

    /// Frequency parameter in Hz.
    pub const fn frequency_hz(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::base(name, short_name, ParamUnit::Hertz, min, max, default, 1.0)
    }

    /// On/off toggle stored as 0.0 or 1.0.
    pub const fn toggle(name: &'static str, short_name: &'static str, default: bool) -> Self {
        let default = if default { 1.0 } else { 0.0 };
        Self::base(name, short_name, ParamUnit::None, 0.0, 1.0, default, 1.0)
            .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED))
            .with_labels(TOGGLE_LABELS)
    }

    /// Enum-like choice stored as an index into `labels`.
    pub const fn choice(
        name: &'static str,
        short_name: &'static str,
        labels: &'static [&'static str],
        default: usize,
    ) -> Self {
        let max = if labels.is_empty() {
            0.0
        } else {
            (labels.len() - 1) as f32
        };
        Self::base(name, short_name, ParamUnit::None, 0.0, max, default as f32, 1.0)
            .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED))
            .with_labels(labels)
    }

    /// Sets the stable parameter ID and string ID.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Replaces the display names.
    pub const fn with_name(mut self, name: &'static str, short_name: &'static str) -> Self {
        self.name = name;
        self.short_name = short_name;
        self
    }

    /// Replaces the default value.
    pub const fn with_default(mut self, default: f32) -> Self {
        self.default = default;
        self
    }

    /// Sets the parameter flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the step labels.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Whether this parameter takes discrete values.
    pub const fn is_stepped(&self) -> bool {
        self.flags.contains(ParamFlags::STEPPED)
    }

    /// Clamps a value to this parameter's valid range.
    ///
    /// NaN clamps to the default. Stepped parameters are also rounded to the
    /// nearest step.
    ///
    /// ```rust
    /// use dynamix_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::gain_db("Makeup", "Makeup", 0.0, 24.0, 0.0);
    /// assert_eq!(desc.clamp(-3.0), 0.0);
    /// assert_eq!(desc.clamp(30.0), 24.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        let value = if self.is_stepped() {
            libm::roundf(value)
        } else {
            value
        };
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Human-readable display string for `value`.
    ///
    /// Stepped parameters show their label; other units use a fixed
    /// precision per unit (see [`ParamUnit::format`]).
    ///
    /// ```rust
    /// use dynamix_core::ParamDescriptor;
    ///
    /// assert_eq!(ParamDescriptor::ratio(1.0, 20.0, 4.0).format_value(4.0), "4.0:1");
    /// assert_eq!(ParamDescriptor::toggle("Adaptive", "Adapt", true).format_value(1.0), "On");
    /// ```
    pub fn format_value(&self, value: f32) -> String {
        if !self.labels.is_empty() {
            let index = libm::roundf(self.clamp(value) - self.min);
            if index >= 0.0
                && let Some(label) = self.labels.get(index as usize)
            {
                return String::from(*label);
            }
        }
        self.unit.format(value)
    }
}

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels: threshold, gain and level parameters.
    Decibels,
    /// Hertz: crossover frequencies.
    Hertz,
    /// Milliseconds: attack, release, lookahead.
    Milliseconds,
    /// Percentage: mix and amount controls.
    Percent,
    /// Ratio (n:1).
    Ratio,
    /// Dimensionless.
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use dynamix_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::Ratio.suffix(), ":1");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Percent => "%",
            ParamUnit::Ratio => ":1",
            ParamUnit::None => "",
        }
    }

    /// Format a value with this unit's precision and suffix.
    pub fn format(&self, value: f32) -> String {
        let suffix = self.suffix();
        match self {
            ParamUnit::Decibels | ParamUnit::Milliseconds | ParamUnit::Ratio => {
                format!("{value:.1}{suffix}")
            }
            ParamUnit::Percent | ParamUnit::Hertz => format!("{value:.0}{suffix}"),
            ParamUnit::None => format!("{value:.2}"),
        }
    }
}

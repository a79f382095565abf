//! Problem-frequency detection on a log-band spectrum.
//!
//! Two detectors run over the bands from [`log_bands`](crate::spectrum::log_bands):
//!
//! - **Resonance**: a band standing more than 8 dB above the mean of its two
//!   neighbours.
//! - **Region build-up**: the mean of a region exceeding the mean of the
//!   whole spectrum by a per-kind margin (mud, harshness, boxiness,
//!   sibilance).
//!
//! Suggested cuts are partial: 70% of a resonance's prominence, 50% of a
//! region's overshoot.

use std::fmt;

use serde::Serialize;

use crate::spectrum::{FrequencyBand, mean_magnitude, overall_mean};

/// Prominence (dB) above which a band is a resonance.
pub const RESONANCE_PROMINENCE_DB: f32 = 8.0;

/// Fraction of a resonance's prominence suggested as a cut.
pub const RESONANCE_CUT_FRACTION: f32 = 0.7;

/// Fraction of a region's overshoot suggested as a cut.
pub const REGION_CUT_FRACTION: f32 = 0.5;

/// Kind of problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// Narrow peak.
    Resonance,
    /// 200-500 Hz build-up.
    Mud,
    /// 2-5 kHz build-up.
    Harshness,
    /// 400-800 Hz build-up.
    Boxiness,
    /// 5-8 kHz build-up.
    Sibilance,
}

/// Static settings of a region detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRule {
    /// Kind reported.
    pub kind: ProblemKind,
    /// Inclusive band range (Hz).
    pub range: (f32, f32),
    /// Reported centre frequency (Hz).
    pub frequency: f32,
    /// Overshoot over the spectrum mean that triggers detection (dB).
    pub margin_db: f32,
    /// Overshoot that makes the problem severe (dB).
    pub severe_db: f32,
    /// Suggested filter Q.
    pub q: f32,
    /// Human-readable label.
    pub label: &'static str,
}

/// Region detectors, in reporting order.
pub const REGION_RULES: [RegionRule; 4] = [
    RegionRule {
        kind: ProblemKind::Mud,
        range: (200.0, 500.0),
        frequency: 350.0,
        margin_db: 6.0,
        severe_db: 12.0,
        q: 2.0,
        label: "muddy low mids (200-500 Hz)",
    },
    RegionRule {
        kind: ProblemKind::Harshness,
        range: (2000.0, 5000.0),
        frequency: 3500.0,
        margin_db: 8.0,
        severe_db: 12.0,
        q: 1.5,
        label: "harsh upper mids (2-5 kHz)",
    },
    RegionRule {
        kind: ProblemKind::Boxiness,
        range: (400.0, 800.0),
        frequency: 600.0,
        margin_db: 6.0,
        severe_db: 10.0,
        q: 2.0,
        label: "boxy mids (400-800 Hz)",
    },
    RegionRule {
        kind: ProblemKind::Sibilance,
        range: (5000.0, 8000.0),
        frequency: 6500.0,
        margin_db: 10.0,
        severe_db: 15.0,
        q: 3.0,
        label: "excessive sibilance (5-8 kHz)",
    },
];

/// How bad a problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Just over the margin.
    Mild,
    /// Past the midpoint between margin and severe margin.
    Moderate,
    /// Past the severe margin.
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        })
    }
}

/// A detected problem with a suggested corrective filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemFrequency {
    /// Centre frequency (Hz).
    pub frequency: f32,
    /// Problem kind.
    pub kind: ProblemKind,
    /// Severity.
    pub severity: Severity,
    /// Suggested gain (dB, negative).
    pub suggested_gain_db: f32,
    /// Suggested Q.
    pub suggested_q: f32,
    /// Human-readable description.
    pub description: String,
}

/// Bands standing more than [`RESONANCE_PROMINENCE_DB`] above their neighbours.
///
/// The two outermost bands at each end are never reported.
pub fn detect_resonances(bands: &[FrequencyBand]) -> Vec<ProblemFrequency> {
    if bands.len() < 5 {
        return Vec::new();
    }
    (2..bands.len() - 2)
        .filter_map(|i| {
            let band = &bands[i];
            let prominence =
                band.magnitude_db - (bands[i - 1].magnitude_db + bands[i + 1].magnitude_db) / 2.0;
            if prominence <= RESONANCE_PROMINENCE_DB {
                return None;
            }
            let severity = if prominence > 15.0 {
                Severity::Severe
            } else if prominence > 12.0 {
                Severity::Moderate
            } else {
                Severity::Mild
            };
            Some(ProblemFrequency {
                frequency: band.frequency,
                kind: ProblemKind::Resonance,
                severity,
                suggested_gain_db: -prominence * RESONANCE_CUT_FRACTION,
                suggested_q: 8.0,
                description: format!("{severity} resonance at {:.0} Hz", band.frequency),
            })
        })
        .collect()
}

/// Apply one region rule against the spectrum mean.
pub fn detect_region(bands: &[FrequencyBand], rule: &RegionRule) -> Option<ProblemFrequency> {
    let region = mean_magnitude(bands, rule.range.0, rule.range.1)?;
    let overshoot = region - overall_mean(bands);
    if overshoot <= rule.margin_db {
        return None;
    }
    let severity = if overshoot > rule.severe_db {
        Severity::Severe
    } else if overshoot > (rule.margin_db + rule.severe_db) / 2.0 {
        Severity::Moderate
    } else {
        Severity::Mild
    };
    Some(ProblemFrequency {
        frequency: rule.frequency,
        kind: rule.kind,
        severity,
        suggested_gain_db: -overshoot * REGION_CUT_FRACTION,
        suggested_q: rule.q,
        description: format!("{severity} {}", rule.label),
    })
}

/// Every problem in the spectrum: resonances first, then regions in
/// [`REGION_RULES`] order.
pub fn detect_problems(bands: &[FrequencyBand]) -> Vec<ProblemFrequency> {
    let mut problems = detect_resonances(bands);
    problems.extend(REGION_RULES.iter().filter_map(|rule| detect_region(bands, rule)));
    problems
}

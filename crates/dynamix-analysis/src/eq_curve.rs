//! Suggested EQ curves: problem fixes, tonal goals and reference matching.

use std::fmt;
use std::str::FromStr;

use dynamix_core::{
    Biquad, Coefficients, high_shelf_coefficients, highpass_coefficients, low_shelf_coefficients,
    lowpass_coefficients, peaking_eq_coefficients,
};
use serde::Serialize;

use crate::problems::{ProblemFrequency, ProblemKind};
use crate::tonal::TonalBalance;

/// Corner of the high-pass every auto curve starts with (Hz).
pub const AUTO_HIGHPASS_HZ: f32 = 30.0;

/// Shelves at or above this frequency are high shelves (Hz).
pub const SHELF_SPLIT_HZ: f32 = 1000.0;

/// Smallest tonal difference corrected by reference matching (dB).
pub const MATCH_THRESHOLD_DB: f32 = 2.0;

/// Fraction of a tonal difference corrected by reference matching.
pub const MATCH_FRACTION: f32 = 0.7;

/// Filter shape of a curve point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EqPointKind {
    /// Peaking filter.
    Bell,
    /// Low shelf below [`SHELF_SPLIT_HZ`], high shelf above.
    Shelf,
    /// High-pass, gain ignored.
    Highpass,
    /// Low-pass, gain ignored.
    Lowpass,
    /// Narrow cut. Realised as a bell at the point's gain and Q.
    Notch,
}

/// One filter in a suggested curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EqCurvePoint {
    /// Centre or corner frequency (Hz).
    pub frequency: f32,
    /// Gain (dB).
    pub gain_db: f32,
    /// Q.
    pub q: f32,
    /// Filter shape.
    pub kind: EqPointKind,
    /// Whether the point is active.
    pub enabled: bool,
}

impl EqCurvePoint {
    /// An enabled point.
    pub const fn new(kind: EqPointKind, frequency: f32, gain_db: f32, q: f32) -> Self {
        Self {
            frequency,
            gain_db,
            q,
            kind,
            enabled: true,
        }
    }

    /// Corrective filter for a detected problem: a notch for resonances,
    /// a bell otherwise.
    pub fn for_problem(problem: &ProblemFrequency) -> Self {
        let kind = if problem.kind == ProblemKind::Resonance {
            EqPointKind::Notch
        } else {
            EqPointKind::Bell
        };
        Self::new(kind, problem.frequency, problem.suggested_gain_db, problem.suggested_q)
    }

    /// Biquad coefficients at `sample_rate`. The frequency is clamped below
    /// Nyquist.
    pub fn coefficients(&self, sample_rate: f32) -> Coefficients {
        let frequency = self.frequency.clamp(1.0, sample_rate * 0.49);
        let q = self.q.max(0.1);
        match self.kind {
            EqPointKind::Bell | EqPointKind::Notch => {
                peaking_eq_coefficients(frequency, q, self.gain_db, sample_rate)
            }
            EqPointKind::Shelf if frequency < SHELF_SPLIT_HZ => {
                low_shelf_coefficients(frequency, self.gain_db, sample_rate)
            }
            EqPointKind::Shelf => high_shelf_coefficients(frequency, self.gain_db, sample_rate),
            EqPointKind::Highpass => highpass_coefficients(frequency, q, sample_rate),
            EqPointKind::Lowpass => lowpass_coefficients(frequency, q, sample_rate),
        }
    }
}

/// Render the enabled points of a curve as a biquad cascade.
pub fn build_filters(curve: &[EqCurvePoint], sample_rate: f32) -> Vec<Biquad> {
    curve
        .iter()
        .filter(|p| p.enabled)
        .map(|p| Biquad::with_coefficients(p.coefficients(sample_rate)))
        .collect()
}

/// Error from parsing an [`EqGoal`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown EQ goal '{0}' (expected clarity, warmth, brightness, punch or balance)")]
pub struct ParseGoalError(pub String);

/// Tonal target for the auto-EQ curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EqGoal {
    /// Less mud, more presence.
    Clarity,
    /// Low lift, gentle top roll-off.
    Warmth,
    /// Upper-mid and air lift.
    Brightness,
    /// Low lift, mud cut, upper-mid lift.
    Punch,
    /// Fill in a weak bass or air region.
    #[default]
    Balance,
}

impl EqGoal {
    /// Every goal.
    pub const ALL: [EqGoal; 5] = [
        EqGoal::Clarity,
        EqGoal::Warmth,
        EqGoal::Brightness,
        EqGoal::Punch,
        EqGoal::Balance,
    ];

    /// Lower-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            EqGoal::Clarity => "clarity",
            EqGoal::Warmth => "warmth",
            EqGoal::Brightness => "brightness",
            EqGoal::Punch => "punch",
            EqGoal::Balance => "balance",
        }
    }

    /// Enhancement points for this goal given the measured balance.
    pub fn curve(self, balance: &TonalBalance) -> Vec<EqCurvePoint> {
        use EqPointKind::{Bell, Shelf};
        match self {
            EqGoal::Clarity => {
                let mut curve = Vec::with_capacity(2);
                if balance.low_mids > balance.mids + 3.0 {
                    curve.push(EqCurvePoint::new(Bell, 350.0, -2.0, 2.0));
                }
                curve.push(EqCurvePoint::new(Bell, 3000.0, 2.0, 1.2));
                curve
            }
            EqGoal::Warmth => vec![
                EqCurvePoint::new(Shelf, 150.0, 2.0, 0.7),
                EqCurvePoint::new(Shelf, 8000.0, -1.0, 0.7),
            ],
            EqGoal::Brightness => vec![
                EqCurvePoint::new(Bell, 5000.0, 2.0, 1.0),
                EqCurvePoint::new(Shelf, 10000.0, 2.5, 0.7),
            ],
            EqGoal::Punch => vec![
                EqCurvePoint::new(Shelf, 100.0, 2.5, 0.7),
                EqCurvePoint::new(Bell, 350.0, -2.0, 2.0),
                EqCurvePoint::new(Bell, 2500.0, 2.0, 1.5),
            ],
            EqGoal::Balance => {
                let mut curve = Vec::with_capacity(2);
                if balance.bass < balance.mids - 3.0 {
                    curve.push(EqCurvePoint::new(Shelf, 100.0, 1.5, 0.7));
                }
                if balance.air < balance.mids - 5.0 {
                    curve.push(EqCurvePoint::new(Shelf, 10000.0, 2.0, 0.7));
                }
                curve
            }
        }
    }
}

impl fmt::Display for EqGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EqGoal {
    type Err = ParseGoalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        EqGoal::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseGoalError(s.to_string()))
    }
}

/// Auto-EQ curve: high-pass, one fix per problem, then the goal's points.
pub fn auto_eq_curve(
    problems: &[ProblemFrequency],
    balance: &TonalBalance,
    goal: EqGoal,
) -> Vec<EqCurvePoint> {
    let mut curve = vec![EqCurvePoint::new(
        EqPointKind::Highpass,
        AUTO_HIGHPASS_HZ,
        0.0,
        0.7,
    )];
    curve.extend(problems.iter().map(EqCurvePoint::for_problem));
    curve.extend(goal.curve(balance));
    curve
}

/// Bells moving `source` toward `reference`, one per compared region whose
/// difference exceeds [`MATCH_THRESHOLD_DB`].
pub fn match_balance(source: &TonalBalance, reference: &TonalBalance) -> Vec<EqCurvePoint> {
    [
        (100.0, source.bass, reference.bass),
        (350.0, source.low_mids, reference.low_mids),
        (1000.0, source.mids, reference.mids),
        (2500.0, source.high_mids, reference.high_mids),
        (5000.0, source.presence, reference.presence),
        (12000.0, source.air, reference.air),
    ]
    .into_iter()
    .filter_map(|(frequency, src, reference)| {
        let diff = reference - src;
        (diff.abs() > MATCH_THRESHOLD_DB)
            .then(|| EqCurvePoint::new(EqPointKind::Bell, frequency, diff * MATCH_FRACTION, 1.5))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::Severity;

    fn balance(level: f32) -> TonalBalance {
        TonalBalance {
            sub_bass: level,
            bass: level,
            low_mids: level,
            mids: level,
            high_mids: level,
            presence: level,
            brilliance: level,
            air: level,
        }
    }

    #[test]
    fn test_goal_parse() {
        assert_eq!("Warmth".parse::<EqGoal>(), Ok(EqGoal::Warmth));
        assert_eq!(" punch ".parse::<EqGoal>(), Ok(EqGoal::Punch));
        let err = "loud".parse::<EqGoal>().unwrap_err();
        assert!(err.to_string().contains("loud"));
        for goal in EqGoal::ALL {
            assert_eq!(goal.to_string().parse::<EqGoal>(), Ok(goal));
        }
    }

    #[test]
    fn test_goal_conditions() {
        let flat = balance(-30.0);
        assert_eq!(EqGoal::Clarity.curve(&flat).len(), 1);
        assert!(EqGoal::Balance.curve(&flat).is_empty());

        let muddy = TonalBalance { low_mids: -20.0, ..flat };
        assert_eq!(EqGoal::Clarity.curve(&muddy)[0].frequency, 350.0);

        let dull = TonalBalance { bass: -40.0, air: -40.0, ..flat };
        let curve = EqGoal::Balance.curve(&dull);
        assert_eq!(curve.len(), 2);
        assert!(curve.iter().all(|p| p.kind == EqPointKind::Shelf && p.gain_db > 0.0));
        assert_eq!(EqGoal::Punch.curve(&flat).len(), 3);
    }

    #[test]
    fn test_auto_curve_order() {
        let problems = [
            ProblemFrequency {
                frequency: 632.0,
                kind: ProblemKind::Resonance,
                severity: Severity::Mild,
                suggested_gain_db: -6.0,
                suggested_q: 8.0,
                description: String::new(),
            },
            ProblemFrequency {
                frequency: 350.0,
                kind: ProblemKind::Mud,
                severity: Severity::Mild,
                suggested_gain_db: -3.5,
                suggested_q: 2.0,
                description: String::new(),
            },
        ];
        let curve = auto_eq_curve(&problems, &balance(-30.0), EqGoal::Warmth);
        let kinds: Vec<EqPointKind> = curve.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            [
                EqPointKind::Highpass,
                EqPointKind::Notch,
                EqPointKind::Bell,
                EqPointKind::Shelf,
                EqPointKind::Shelf
            ]
        );
        assert_eq!(curve[0].frequency, 30.0);
        assert_eq!(curve[2].gain_db, -3.5);
    }

    #[test]
    fn test_match_balance() {
        let source = balance(-30.0);
        let reference = TonalBalance { mids: -25.0, air: -31.0, bass: -33.0, ..source };
        let curve = match_balance(&source, &reference);
        assert_eq!(curve.len(), 2);
        assert_eq!(curve[0].frequency, 100.0);
        assert!((curve[0].gain_db + 2.1).abs() < 1e-5);
        assert_eq!(curve[1].frequency, 1000.0);
        assert!((curve[1].gain_db - 3.5).abs() < 1e-5);
        assert!(match_balance(&source, &source).is_empty());
    }

    #[test]
    fn test_filters_are_stable() {
        let curve = auto_eq_curve(&[], &balance(-30.0), EqGoal::Punch);
        let mut filters = build_filters(&curve, 48000.0);
        assert_eq!(filters.len(), 4);
        for i in 0..48000 {
            let x = if i % 100 == 0 { 1.0 } else { 0.0 };
            let y = filters.iter_mut().fold(x, |s, f| f.process(s));
            assert!(y.is_finite() && y.abs() < 10.0, "sample {i}: {y}");
        }
    }
}

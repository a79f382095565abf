//! Tonal balance: mean band level per named region.

use serde::Serialize;

use crate::spectrum::{FrequencyBand, Region, mean_magnitude};

/// Mean dB magnitude of the log bands in each [`Region`].
///
/// A region with no bands (e.g. air at low sample rates) reads 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TonalBalance {
    /// 20-60 Hz
    pub sub_bass: f32,
    /// 60-250 Hz
    pub bass: f32,
    /// 250-500 Hz
    pub low_mids: f32,
    /// 500 Hz - 2 kHz
    pub mids: f32,
    /// 2-4 kHz
    pub high_mids: f32,
    /// 4-6 kHz
    pub presence: f32,
    /// 6-10 kHz
    pub brilliance: f32,
    /// 10-20 kHz
    pub air: f32,
}

impl TonalBalance {
    /// Measure a log-band spectrum.
    pub fn from_bands(bands: &[FrequencyBand]) -> Self {
        let level = |region: Region| {
            let (low, high) = region.range();
            mean_magnitude(bands, low, high).unwrap_or(0.0)
        };
        Self {
            sub_bass: level(Region::SubBass),
            bass: level(Region::Bass),
            low_mids: level(Region::LowMids),
            mids: level(Region::Mids),
            high_mids: level(Region::HighMids),
            presence: level(Region::Presence),
            brilliance: level(Region::Brilliance),
            air: level(Region::Air),
        }
    }

    /// Level of one region.
    pub fn get(&self, region: Region) -> f32 {
        match region {
            Region::SubBass => self.sub_bass,
            Region::Bass => self.bass,
            Region::LowMids => self.low_mids,
            Region::Mids => self.mids,
            Region::HighMids => self.high_mids,
            Region::Presence => self.presence,
            Region::Brilliance => self.brilliance,
            Region::Air => self.air,
        }
    }

    /// `(region, level)` pairs, low to high.
    pub fn iter(&self) -> impl Iterator<Item = (Region, f32)> + '_ {
        Region::ALL.into_iter().map(|r| (r, self.get(r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::band_frequency;

    #[test]
    fn test_regions_average_their_bands() {
        let bands: Vec<FrequencyBand> = (0..100)
            .map(|i| {
                let frequency = band_frequency(i);
                let region = Region::of(frequency);
                let magnitude_db = if region == Region::Bass { -10.0 } else { -40.0 };
                FrequencyBand { frequency, magnitude_db, region }
            })
            .collect();
        let balance = TonalBalance::from_bands(&bands);
        assert_eq!(balance.mids, -40.0);
        assert_eq!(balance.bass, -10.0);
        assert_eq!(balance.iter().count(), 8);
        assert_eq!(balance.get(Region::Air), balance.air);
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(TonalBalance::from_bands(&[]), TonalBalance::default());
    }
}

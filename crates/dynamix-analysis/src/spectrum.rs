//! Log-spaced spectrum bands and the named frequency regions.

use serde::Serialize;

/// Number of log-spaced bands reported by the analyzer.
pub const NUM_SPECTRUM_BANDS: usize = 100;

/// Lowest band frequency (Hz). Bands span three decades above it.
pub const LOWEST_BAND_HZ: f32 = 20.0;

/// Floor added to magnitudes before conversion to dB.
pub const MAGNITUDE_FLOOR: f32 = 1e-10;

/// Named frequency regions, low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// 20-60 Hz
    SubBass,
    /// 60-250 Hz
    Bass,
    /// 250-500 Hz
    LowMids,
    /// 500 Hz - 2 kHz
    Mids,
    /// 2-4 kHz
    HighMids,
    /// 4-6 kHz
    Presence,
    /// 6-10 kHz
    Brilliance,
    /// 10-20 kHz
    Air,
}

impl Region {
    /// Every region, low to high.
    pub const ALL: [Region; 8] = [
        Region::SubBass,
        Region::Bass,
        Region::LowMids,
        Region::Mids,
        Region::HighMids,
        Region::Presence,
        Region::Brilliance,
        Region::Air,
    ];

    /// Inclusive frequency range (Hz).
    pub const fn range(self) -> (f32, f32) {
        match self {
            Region::SubBass => (20.0, 60.0),
            Region::Bass => (60.0, 250.0),
            Region::LowMids => (250.0, 500.0),
            Region::Mids => (500.0, 2000.0),
            Region::HighMids => (2000.0, 4000.0),
            Region::Presence => (4000.0, 6000.0),
            Region::Brilliance => (6000.0, 10000.0),
            Region::Air => (10000.0, 20000.0),
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Region::SubBass => "Sub Bass",
            Region::Bass => "Bass",
            Region::LowMids => "Low Mids",
            Region::Mids => "Mids",
            Region::HighMids => "High Mids",
            Region::Presence => "Presence",
            Region::Brilliance => "Brilliance",
            Region::Air => "Air",
        }
    }

    /// Region a frequency belongs to. Boundaries belong to the upper region.
    pub fn of(frequency: f32) -> Region {
        Region::ALL
            .iter()
            .copied()
            .find(|r| frequency < r.range().1)
            .unwrap_or(Region::Air)
    }
}

/// One log-spaced spectrum band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyBand {
    /// Band frequency (Hz).
    pub frequency: f32,
    /// Magnitude (dB).
    pub magnitude_db: f32,
    /// Region the band falls in.
    pub region: Region,
}

/// Frequency of band `i`: `20·1000^(i/100)`.
pub fn band_frequency(i: usize) -> f32 {
    LOWEST_BAND_HZ * 1000f32.powf(i as f32 / NUM_SPECTRUM_BANDS as f32)
}

/// Sample an amplitude spectrum (DC to Nyquist, `fft_size/2 + 1` bins) at the
/// log-spaced band frequencies.
///
/// Each band reads the bin at or just below its frequency. Bands above the
/// last bin are omitted, so low sample rates yield fewer bands.
pub fn log_bands(amplitudes: &[f32], sample_rate: f32, fft_size: usize) -> Vec<FrequencyBand> {
    if amplitudes.is_empty() || fft_size == 0 || sample_rate <= 0.0 {
        return Vec::new();
    }
    let resolution = sample_rate / fft_size as f32;
    (0..NUM_SPECTRUM_BANDS)
        .map(band_frequency)
        .filter_map(|frequency| {
            let bin = (frequency / resolution) as usize;
            amplitudes.get(bin).map(|&mag| FrequencyBand {
                frequency,
                magnitude_db: 20.0 * (mag + MAGNITUDE_FLOOR).log10(),
                region: Region::of(frequency),
            })
        })
        .collect()
}

/// Mean dB magnitude of bands with `low ≤ f ≤ high`, or `None` if there are none.
pub fn mean_magnitude(bands: &[FrequencyBand], low: f32, high: f32) -> Option<f32> {
    let (sum, count) = bands
        .iter()
        .filter(|b| b.frequency >= low && b.frequency <= high)
        .fold((0.0f32, 0usize), |(s, n), b| (s + b.magnitude_db, n + 1));
    (count > 0).then(|| sum / count as f32)
}

/// Mean dB magnitude of every band, 0 when empty.
pub fn overall_mean(bands: &[FrequencyBand]) -> f32 {
    if bands.is_empty() {
        return 0.0;
    }
    bands.iter().map(|b| b.magnitude_db).sum::<f32>() / bands.len() as f32
}

/// Spectral centroid (Hz) of an amplitude spectrum.
pub fn spectral_centroid(amplitudes: &[f32], sample_rate: f32, fft_size: usize) -> f32 {
    let resolution = sample_rate / fft_size.max(1) as f32;
    let (weighted, total) = amplitudes
        .iter()
        .enumerate()
        .fold((0.0f32, 0.0f32), |(w, t), (i, &m)| {
            (w + i as f32 * resolution * m, t + m)
        });
    if total > 0.0 { weighted / total } else { 0.0 }
}

/// Indices of the `count` largest local maxima, largest first.
pub fn largest_peaks(amplitudes: &[f32], count: usize) -> Vec<usize> {
    if amplitudes.len() < 3 {
        return Vec::new();
    }
    let mut peaks: Vec<usize> = (1..amplitudes.len() - 1)
        .filter(|&i| amplitudes[i] > amplitudes[i - 1] && amplitudes[i] > amplitudes[i + 1])
        .collect();
    peaks.sort_by(|&a, &b| amplitudes[b].total_cmp(&amplitudes[a]));
    peaks.truncate(count);
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_frequencies() {
        assert_eq!(band_frequency(0), 20.0);
        assert!((band_frequency(50) - 632.46).abs() < 0.1);
        assert!(band_frequency(99) < 20000.0);
    }

    #[test]
    fn test_regions() {
        assert_eq!(Region::of(30.0), Region::SubBass);
        assert_eq!(Region::of(60.0), Region::Bass);
        assert_eq!(Region::of(3000.0), Region::HighMids);
        assert_eq!(Region::of(19000.0), Region::Air);
        assert_eq!(Region::LowMids.label(), "Low Mids");
    }

    #[test]
    fn test_log_bands_drop_above_nyquist() {
        let amplitudes = vec![1.0f32; 4097];
        assert_eq!(log_bands(&amplitudes, 48000.0, 8192).len(), NUM_SPECTRUM_BANDS);

        let narrow = vec![1.0f32; 4097];
        let bands = log_bands(&narrow, 8000.0, 8192);
        assert!(bands.len() < NUM_SPECTRUM_BANDS);
        assert!(bands.iter().all(|b| b.frequency <= 4000.0));
        assert!(bands.iter().all(|b| b.magnitude_db.abs() < 1e-3));
    }

    #[test]
    fn test_means() {
        let bands: Vec<FrequencyBand> = [(100.0, -10.0), (200.0, -20.0), (5000.0, -40.0)]
            .iter()
            .map(|&(frequency, magnitude_db)| FrequencyBand {
                frequency,
                magnitude_db,
                region: Region::of(frequency),
            })
            .collect();
        assert_eq!(mean_magnitude(&bands, 50.0, 250.0), Some(-15.0));
        assert_eq!(mean_magnitude(&bands, 10000.0, 20000.0), None);
        assert!((overall_mean(&bands) + 70.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_centroid_and_peaks() {
        let mut amplitudes = vec![0.0f32; 513];
        amplitudes[10] = 1.0;
        amplitudes[100] = 0.5;
        assert!((spectral_centroid(&amplitudes, 1024.0, 1024) - 40.0).abs() < 1e-3);
        assert_eq!(largest_peaks(&amplitudes, 1), vec![10]);
        assert_eq!(largest_peaks(&amplitudes, 5), vec![10, 100]);
    }
}

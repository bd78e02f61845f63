//! Core (main) loudness per critical band
//!
//! Maps one validated one-third-octave frame to the 20 core loudness values
//! of the approximated critical bands:
//!
//! ```text
//! 28 band levels ──► equal-loudness correction (bands 0..11)
//!                ──► 3 virtual critical bands below 300 Hz + 17 raw bands
//!                ──► ear transmission, field, band adaptation
//!                ──► core loudness (sone/Bark)
//! ```

use crate::spectrum::{FieldType, ThirdOctaveSpectrum};
use crate::tables::{
    A0, CRITICAL_BANDS, DCB, DDF, DLL, LOUDNESS_SLOPE_S, LOW_FREQUENCY_BANDS, LTQ, RAP,
};
use std::ops::Index;

/// Bands summed into each virtual critical band below 300 Hz
const VIRTUAL_BAND_RANGES: [std::ops::Range<usize>; 3] = [0..6, 6..9, 9..11];

/// Core loudness of the 20 approximated critical bands (sone/Bark)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreLoudness {
    values: [f64; CRITICAL_BANDS],
}

impl CoreLoudness {
    /// Wrap raw core loudness values, clamping negatives to zero
    pub fn from_values(values: [f64; CRITICAL_BANDS]) -> Self {
        Self {
            values: values.map(|v| v.max(0.0)),
        }
    }

    /// Core loudness values
    pub fn values(&self) -> &[f64; CRITICAL_BANDS] {
        &self.values
    }

    /// Core loudness of band `band`, or zero past the last band
    ///
    /// The band after the last one is the zero sentinel that closes the
    /// specific-loudness pattern at 24 Bark.
    pub fn get(&self, band: usize) -> f64 {
        self.values.get(band).copied().unwrap_or(0.0)
    }

    /// True if no band carries loudness
    pub fn is_silent(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

impl Index<usize> for CoreLoudness {
    type Output = f64;

    fn index(&self, band: usize) -> &f64 {
        &self.values[band]
    }
}

/// Computes core loudness from one-third-octave spectra
#[derive(Debug, Clone, Copy, Default)]
pub struct MainLoudnessCalculator {
    field_type: FieldType,
}

impl MainLoudnessCalculator {
    /// Create a calculator for the given sound field
    pub fn new(field_type: FieldType) -> Self {
        Self { field_type }
    }

    /// Sound field used for the corrections
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Core loudness of one spectrum frame
    pub fn calculate(&self, spectrum: &ThirdOctaveSpectrum) -> CoreLoudness {
        let levels = critical_band_levels(spectrum);

        let mut core = [0.0; CRITICAL_BANDS];
        for (band, (&level, value)) in levels.iter().zip(core.iter_mut()).enumerate() {
            let mut le = level - A0[band];
            if self.field_type == FieldType::Diffuse {
                le += DDF[band];
            }

            // At or below threshold the band stays silent
            if le > LTQ[band] {
                le -= DCB[band];
                *value = band_loudness(le, LTQ[band]);
            }
        }

        // Threshold varies inside the lowest critical band
        let korry = 0.4 + 0.32 * core[0].powf(0.2);
        if korry <= 1.0 {
            core[0] *= korry;
        }

        CoreLoudness::from_values(core)
    }
}

/// Levels of the 20 approximated critical bands (dB)
///
/// The first three are synthesised from the corrected bands up to 250 Hz,
/// the remaining 17 are the one-third-octave bands from 315 Hz upwards.
fn critical_band_levels(spectrum: &ThirdOctaveSpectrum) -> [f64; CRITICAL_BANDS] {
    let levels = spectrum.levels();

    let mut intensities = [0.0; LOW_FREQUENCY_BANDS];
    for (band, intensity) in intensities.iter_mut().enumerate() {
        *intensity = 10.0_f64.powf(equal_loudness_corrected(band, levels[band]) / 10.0);
    }

    let mut out = [0.0; CRITICAL_BANDS];
    for (slot, range) in out.iter_mut().zip(VIRTUAL_BAND_RANGES) {
        let sum: f64 = intensities[range].iter().sum();
        *slot = if sum > 0.0 {
            10.0 * sum.log10()
        } else {
            f64::NEG_INFINITY
        };
    }
    out[VIRTUAL_BAND_RANGES.len()..].copy_from_slice(&levels[LOW_FREQUENCY_BANDS..]);
    out
}

/// Apply the equal-loudness correction of one band below 300 Hz
fn equal_loudness_corrected(band: usize, level: f64) -> f64 {
    let last = RAP.len() - 1;
    let range = (0..last)
        .find(|&j| level <= RAP[j] - DLL[j][band])
        .unwrap_or(last);
    level + DLL[range][band]
}

/// Loudness formula for a band level above its threshold
fn band_loudness(level: f64, threshold: f64) -> f64 {
    let s = LOUDNESS_SLOPE_S;
    let a1 = 0.0635 * 10.0_f64.powf(0.025 * threshold);
    let excess = 10.0_f64.powf((level - threshold) / 10.0);
    let n = a1 * ((1.0 - s + s * excess).powf(0.25) - 1.0);
    n.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum_with(band: usize, level: f64) -> ThirdOctaveSpectrum {
        let mut levels = [-60.0; 28];
        levels[band] = level;
        ThirdOctaveSpectrum::new(&levels).unwrap()
    }

    #[test]
    fn test_silence_gives_zero_core_loudness() {
        let calc = MainLoudnessCalculator::new(FieldType::Free);
        let core = calc.calculate(&ThirdOctaveSpectrum::uniform(-60.0).unwrap());
        assert!(core.is_silent());
    }

    #[test]
    fn test_1khz_tone_lands_in_ninth_band() {
        let calc = MainLoudnessCalculator::new(FieldType::Free);
        let core = calc.calculate(&spectrum_with(16, 60.0));

        // 60 dB - dcb 1.5 dB against a 3 dB threshold
        let expected = 0.0635 * 10.0_f64.powf(0.075)
            * ((0.75 + 0.25 * 10.0_f64.powf(5.55)).powf(0.25) - 1.0);
        assert!((core[8] - expected).abs() < 1e-12);
        assert!((core[8] - 1.227).abs() < 0.001, "got {}", core[8]);

        for band in (0..20).filter(|&b| b != 8) {
            assert_eq!(core[band], 0.0, "band {band} should be silent");
        }
    }

    #[test]
    fn test_low_bands_merge_into_virtual_bands() {
        let calc = MainLoudnessCalculator::new(FieldType::Free);

        // 100, 125 and 160 Hz all feed the second virtual band
        for band in 6..9 {
            let core = calc.calculate(&spectrum_with(band, 80.0));
            assert!(core[1] > 0.0);
            assert_eq!(core[0], 0.0);
            assert_eq!(core[2], 0.0);
        }
    }

    #[test]
    fn test_equal_loudness_range_selection() {
        // 25 Hz: the first range ends at 45 + 32 = 77 dB
        assert_eq!(equal_loudness_corrected(0, 77.0), 45.0);
        assert_eq!(equal_loudness_corrected(0, 78.0), 78.0 - 29.0);
        // Beyond every range the last correction applies
        assert_eq!(equal_loudness_corrected(0, 120.0), 120.0 - 15.0);
        // 80 Hz is never corrected
        assert_eq!(equal_loudness_corrected(5, 63.0), 63.0);
    }

    #[test]
    fn test_diffuse_field_correction() {
        let free = MainLoudnessCalculator::new(FieldType::Free);
        let diffuse = MainLoudnessCalculator::new(FieldType::Diffuse);

        // ddf is +3 dB at 1 kHz and -2 dB at 2.5 kHz
        let tone_1k = spectrum_with(16, 60.0);
        assert!(diffuse.calculate(&tone_1k)[8] > free.calculate(&tone_1k)[8]);

        let tone_2k5 = spectrum_with(20, 60.0);
        assert!(diffuse.calculate(&tone_2k5)[12] < free.calculate(&tone_2k5)[12]);
    }

    #[test]
    fn test_lowest_band_correction() {
        let calc = MainLoudnessCalculator::new(FieldType::Free);
        let core = calc.calculate(&spectrum_with(5, 90.0));

        // Recompute the uncorrected value and apply the factor by hand
        let level = critical_band_levels(&spectrum_with(5, 90.0))[0] - A0[0] - DCB[0];
        let raw = band_loudness(level, LTQ[0]);
        let korry = (0.4 + 0.32 * raw.powf(0.2)).min(1.0);
        assert!((core[0] - raw * korry).abs() < 1e-12);
        assert!(core[0] < raw);
    }

    #[test]
    fn test_sentinel_past_last_band() {
        let core = CoreLoudness::from_values([1.0; 20]);
        assert_eq!(core.get(19), 1.0);
        assert_eq!(core.get(20), 0.0);
    }

    #[test]
    fn test_from_values_clamps_negatives() {
        let mut values = [0.5; 20];
        values[3] = -0.2;
        assert_eq!(CoreLoudness::from_values(values)[3], 0.0);
    }
}

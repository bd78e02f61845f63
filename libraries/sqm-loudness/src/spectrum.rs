//! Input spectra and sound field selection
//!
//! A [`ThirdOctaveSpectrum`] can only be built from a level slice that
//! passes validation, so the numeric stages never see an invalid frame.

use crate::error::{LoudnessError, Result};
use crate::tables::{
    LOW_FREQUENCY_BANDS, MAX_LOW_FREQUENCY_LEVEL_DB, THIRD_OCTAVE_BANDS, THIRD_OCTAVE_CENTERS_HZ,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sound field in which the spectrum was measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Frontal free field
    #[default]
    Free,
    /// Diffuse (reverberant) field
    Diffuse,
}

impl FieldType {
    /// Convert to the literal used in settings and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Diffuse => "diffuse",
        }
    }
}

impl FromStr for FieldType {
    type Err = LoudnessError;

    /// Only the exact literals `"free"` and `"diffuse"` are accepted
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "free" => Ok(Self::Free),
            "diffuse" => Ok(Self::Diffuse),
            other => Err(LoudnessError::InvalidFieldType(other.to_string())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated one-third-octave band levels (dB re 20 µPa), 25 Hz to 12.5 kHz
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThirdOctaveSpectrum {
    levels: [f64; THIRD_OCTAVE_BANDS],
}

impl ThirdOctaveSpectrum {
    /// Validate and wrap a slice of band levels
    ///
    /// # Errors
    /// - [`LoudnessError::InvalidBandCount`] unless there are exactly 28 levels
    /// - [`LoudnessError::NonFiniteLevel`] for NaN or infinite levels
    /// - [`LoudnessError::LevelOutOfRange`] if a band up to 250 Hz exceeds 120 dB
    pub fn new(levels: &[f64]) -> Result<Self> {
        let levels: [f64; THIRD_OCTAVE_BANDS] =
            levels
                .try_into()
                .map_err(|_| LoudnessError::InvalidBandCount {
                    expected: THIRD_OCTAVE_BANDS,
                    actual: levels.len(),
                })?;

        if let Some(band) = levels.iter().position(|l| !l.is_finite()) {
            return Err(LoudnessError::NonFiniteLevel { band });
        }

        if let Some(band) = levels[..LOW_FREQUENCY_BANDS]
            .iter()
            .position(|&l| l > MAX_LOW_FREQUENCY_LEVEL_DB)
        {
            return Err(LoudnessError::LevelOutOfRange {
                band,
                level_db: levels[band],
                max_db: MAX_LOW_FREQUENCY_LEVEL_DB,
            });
        }

        Ok(Self { levels })
    }

    /// Spectrum with every band at the same level
    pub fn uniform(level_db: f64) -> Result<Self> {
        Self::new(&[level_db; THIRD_OCTAVE_BANDS])
    }

    /// Band levels in dB
    pub fn levels(&self) -> &[f64; THIRD_OCTAVE_BANDS] {
        &self.levels
    }

    /// Level of one band
    pub fn level(&self, band: usize) -> f64 {
        self.levels[band]
    }

    /// Nominal centre frequencies matching [`levels`](Self::levels)
    pub fn center_frequencies() -> &'static [f64; THIRD_OCTAVE_BANDS] {
        &THIRD_OCTAVE_CENTERS_HZ
    }
}

impl TryFrom<&[f64]> for ThirdOctaveSpectrum {
    type Error = LoudnessError;

    fn try_from(levels: &[f64]) -> Result<Self> {
        Self::new(levels)
    }
}

/// Validate every frame of a time-major spectrogram up front
///
/// Errors are tagged with the index of the first offending frame.
pub(crate) fn validate_frames<S: AsRef<[f64]>>(frames: &[S]) -> Result<Vec<ThirdOctaveSpectrum>> {
    if frames.is_empty() {
        return Err(LoudnessError::EmptySignal);
    }

    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| ThirdOctaveSpectrum::new(frame.as_ref()).map_err(|e| e.in_frame(i)))
        .collect()
}

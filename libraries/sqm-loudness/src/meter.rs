//! Zwicker loudness meter
//!
//! Ties the stages together for stationary spectra and for spectrum
//! sequences at the 2 kHz frame rate:
//!
//! ```text
//! stationary:    spectrum ─► core loudness ─► slopes ─► N, N'(z)
//! time-varying:  spectra  ─► core loudness ─► decay filter ─► slopes
//!                         ─► temporal weighting ─► decimation ─► N(t), N'(z, t)
//! ```

use crate::config::{LoudnessConfig, TimeVaryingConfig};
use crate::error::Result;
use crate::level::{exceeded_percentile, sone_to_phon};
use crate::main_loudness::{CoreLoudness, MainLoudnessCalculator};
use crate::nonlinear::filter_core_sequence;
use crate::slopes::{bark_axis, SlopeIntegrator, SpecificLoudness};
use crate::spectrum::{validate_frames, FieldType, ThirdOctaveSpectrum};
use crate::temporal::{decimate, TemporalWeighting};
use std::fmt;
use tracing::debug;

/// Loudness of a stationary sound
#[derive(Debug, Clone, PartialEq)]
pub struct StationaryLoudness {
    /// Total loudness in sone, rounded to the ISO 532-1 reporting precision
    pub total: f64,

    /// Specific loudness over 0.1..=24 Bark (sone/Bark)
    pub specific: SpecificLoudness,

    /// Sound field the spectrum was evaluated for
    pub field_type: FieldType,
}

impl StationaryLoudness {
    /// Loudness level in phon
    pub fn loudness_level_phon(&self) -> f64 {
        sone_to_phon(self.total)
    }

    /// Critical-band rate of each specific loudness sample (Bark)
    pub fn bark_axis(&self) -> Vec<f64> {
        bark_axis()
    }
}

impl fmt::Display for StationaryLoudness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loudness: {:.3} sone ({:.1} phon), {} field",
            self.total,
            self.loudness_level_phon(),
            self.field_type
        )
    }
}

/// Loudness of a time-varying sound at the decimated output rate
#[derive(Debug, Clone, PartialEq)]
pub struct TimeVaryingLoudness {
    /// Temporally weighted total loudness per output sample (sone)
    pub total: Vec<f64>,

    /// Specific loudness per output sample (sone/Bark)
    pub specific: Vec<SpecificLoudness>,

    /// Start time of each output sample (s)
    pub time_axis: Vec<f64>,

    /// Sound field the spectra were evaluated for
    pub field_type: FieldType,
}

impl TimeVaryingLoudness {
    /// Number of output samples
    pub fn len(&self) -> usize {
        self.total.len()
    }

    /// True if there are no output samples
    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }

    /// Maximum total loudness (sone)
    pub fn max(&self) -> f64 {
        self.total.iter().copied().fold(0.0, f64::max)
    }

    /// Loudness exceeded during `percent` % of the time (sone)
    ///
    /// Returns `None` if `percent` is outside 0..=100.
    pub fn percentile(&self, percent: f64) -> Option<f64> {
        exceeded_percentile(&self.total, percent)
    }

    /// Loudness exceeded during 5 % of the time (sone)
    pub fn n5(&self) -> f64 {
        self.percentile(5.0).unwrap_or(0.0)
    }

    /// Loudness exceeded during 10 % of the time (sone)
    pub fn n10(&self) -> f64 {
        self.percentile(10.0).unwrap_or(0.0)
    }

    /// Critical-band rate of each specific loudness sample (Bark)
    pub fn bark_axis(&self) -> Vec<f64> {
        bark_axis()
    }
}

impl fmt::Display for TimeVaryingLoudness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loudness: max {:.2} sone, N5 {:.2} sone, N10 {:.2} sone over {} samples, {} field",
            self.max(),
            self.n5(),
            self.n10(),
            self.len(),
            self.field_type
        )
    }
}

/// Zwicker loudness meter (ISO 532-1 / DIN 45631)
///
/// # Example
///
/// ```ignore
/// use sqm_loudness::{FieldType, LoudnessConfig, LoudnessMeter};
///
/// let meter = LoudnessMeter::new(LoudnessConfig::new(FieldType::Free))?;
///
/// // One 28-band spectrum, 25 Hz to 12.5 kHz
/// let result = meter.stationary(&levels)?;
/// println!("{result}");
///
/// // Spectra every 0.5 ms
/// let series = meter.time_varying(&frames)?;
/// println!("N5 = {:.2} sone", series.n5());
/// ```
#[derive(Debug, Clone)]
pub struct LoudnessMeter {
    config: LoudnessConfig,
    calculator: MainLoudnessCalculator,
    integrator: SlopeIntegrator,
}

impl LoudnessMeter {
    /// Create a meter from validated settings
    ///
    /// # Errors
    /// Returns [`LoudnessError::InvalidConfig`](crate::LoudnessError::InvalidConfig)
    /// if a model constant is out of range
    pub fn new(config: LoudnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            calculator: MainLoudnessCalculator::new(config.field_type),
            integrator: SlopeIntegrator::new(),
            config,
        })
    }

    /// Settings in use
    pub fn config(&self) -> &LoudnessConfig {
        &self.config
    }

    /// Loudness of one stationary spectrum
    ///
    /// # Errors
    /// Fails on a wrong band count, a non-finite level, or a band up to
    /// 250 Hz above 120 dB
    pub fn stationary(&self, levels: &[f64]) -> Result<StationaryLoudness> {
        let spectrum = ThirdOctaveSpectrum::new(levels)?;
        Ok(self.stationary_spectrum(&spectrum))
    }

    /// Loudness of an already validated spectrum
    pub fn stationary_spectrum(&self, spectrum: &ThirdOctaveSpectrum) -> StationaryLoudness {
        let core = self.calculator.calculate(spectrum);
        let (total, specific) = self.integrator.integrate(&core);

        debug!(
            field_type = %self.config.field_type,
            total_sone = total,
            "Stationary loudness computed"
        );

        StationaryLoudness {
            total,
            specific,
            field_type: self.config.field_type,
        }
    }

    /// Loudness of a sequence of spectra at the configured frame rate
    ///
    /// Every frame is validated before any computation starts.
    ///
    /// # Errors
    /// Fails on an empty sequence, or with
    /// [`LoudnessError::Frame`](crate::LoudnessError::Frame) carrying the
    /// index of the first invalid frame
    pub fn time_varying<S: AsRef<[f64]>>(&self, frames: &[S]) -> Result<TimeVaryingLoudness> {
        let spectra = validate_frames(frames)?;
        let tv = &self.config.time_varying;

        debug!(
            frames = spectra.len(),
            field_type = %self.config.field_type,
            "Time-varying loudness started"
        );

        let core: Vec<CoreLoudness> = spectra
            .iter()
            .map(|spectrum| self.calculator.calculate(spectrum))
            .collect();
        let decayed = filter_core_sequence(&core, tv);

        let (totals, specific): (Vec<f64>, Vec<SpecificLoudness>) = decayed
            .iter()
            .map(|frame| self.integrator.integrate(frame))
            .unzip();

        let weighted = TemporalWeighting::new(tv).apply(&totals);
        let total = decimate(&weighted, tv.decimation);
        let specific = decimate(&specific, tv.decimation);
        let time_axis = time_axis(total.len(), tv);

        debug!(
            output_samples = total.len(),
            max_sone = total.iter().copied().fold(0.0, f64::max),
            "Time-varying loudness computed"
        );

        Ok(TimeVaryingLoudness {
            total,
            specific,
            time_axis,
            field_type: self.config.field_type,
        })
    }
}

impl Default for LoudnessMeter {
    fn default() -> Self {
        let config = LoudnessConfig::default();
        Self {
            calculator: MainLoudnessCalculator::new(config.field_type),
            integrator: SlopeIntegrator::new(),
            config,
        }
    }
}

/// Start times of `len` decimated output samples (s)
fn time_axis(len: usize, config: &TimeVaryingConfig) -> Vec<f64> {
    let interval = config.output_interval();
    (0..len).map(|i| i as f64 * interval).collect()
}

/// Loudness of a stationary spectrum with default model constants
///
/// `field_type` is `"free"` or `"diffuse"`.
///
/// # Errors
/// Fails on an unknown field type or an invalid spectrum
pub fn loudness_stationary(levels: &[f64], field_type: &str) -> Result<StationaryLoudness> {
    let config = LoudnessConfig::new(field_type.parse()?);
    LoudnessMeter::new(config)?.stationary(levels)
}

/// Loudness of spectra sampled every 0.5 ms with default model constants
///
/// `field_type` is `"free"` or `"diffuse"`.
///
/// # Errors
/// Fails on an unknown field type, an empty sequence or an invalid frame
pub fn loudness_time_varying<S: AsRef<[f64]>>(
    frames: &[S],
    field_type: &str,
) -> Result<TimeVaryingLoudness> {
    let config = LoudnessConfig::new(field_type.parse()?);
    LoudnessMeter::new(config)?.time_varying(frames)
}

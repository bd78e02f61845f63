//! Loudness computation settings

use crate::error::{LoudnessError, Result};
use crate::spectrum::FieldType;
use serde::{Deserialize, Serialize};

/// Settings shared by stationary and time-varying loudness
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoudnessConfig {
    /// Sound field of the input spectra ("free" or "diffuse")
    pub field_type: FieldType,

    /// Constants of the time-varying model
    pub time_varying: TimeVaryingConfig,
}

impl LoudnessConfig {
    /// Default settings for the given sound field
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Self::default()
        }
    }

    /// Check every value against its valid domain
    ///
    /// # Errors
    /// Returns [`LoudnessError::InvalidConfig`] naming the first bad field
    pub fn validate(&self) -> Result<()> {
        self.time_varying.validate()
    }
}

/// Constants of the time-varying loudness model
///
/// The defaults are the values fixed by ISO 532-1 and rarely need changing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeVaryingConfig {
    /// Frame rate of the input spectra (Hz)
    pub frame_rate_hz: f64,

    /// Interpolated sub-steps per frame in the decay filter
    pub decay_oversampling: usize,

    /// Short decay time constant (ms)
    pub tau_short_ms: f64,

    /// Long decay time constant (ms)
    pub tau_long_ms: f64,

    /// Time constant of the slowly recharging second capacitor (ms)
    pub tau_var_ms: f64,

    /// Fast low-pass of the temporal weighting (ms)
    pub weighting_tau_fast_ms: f64,

    /// Slow low-pass of the temporal weighting (ms)
    pub weighting_tau_slow_ms: f64,

    /// Share of the fast low-pass in the weighted sum (0..=1)
    pub weighting_fast_share: f64,

    /// Keep every n-th frame of the output
    pub decimation: usize,
}

impl Default for TimeVaryingConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: crate::FRAME_RATE_HZ,
            decay_oversampling: 24,
            tau_short_ms: 5.0,
            tau_long_ms: 15.0,
            tau_var_ms: 75.0,
            weighting_tau_fast_ms: 3.5,
            weighting_tau_slow_ms: 70.0,
            weighting_fast_share: 0.47,
            decimation: 4,
        }
    }
}

impl TimeVaryingConfig {
    /// Interval between input frames (s)
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.frame_rate_hz
    }

    /// Interval between decimated output samples (s)
    pub fn output_interval(&self) -> f64 {
        self.decimation as f64 / self.frame_rate_hz
    }

    /// Check every value against its valid domain
    ///
    /// # Errors
    /// Returns [`LoudnessError::InvalidConfig`] naming the first bad field
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("frame_rate_hz", self.frame_rate_hz),
            ("tau_short_ms", self.tau_short_ms),
            ("tau_long_ms", self.tau_long_ms),
            ("tau_var_ms", self.tau_var_ms),
            ("weighting_tau_fast_ms", self.weighting_tau_fast_ms),
            ("weighting_tau_slow_ms", self.weighting_tau_slow_ms),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LoudnessError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        // The two-capacitor decay needs real eigenvalues
        let (t_short, t_long, t_var) = (self.tau_short_ms, self.tau_long_ms, self.tau_var_ms);
        if (t_var + t_long).powi(2) < 4.0 * t_var * t_short {
            return Err(LoudnessError::InvalidConfig(format!(
                "decay time constants give an oscillating filter: \
                 (tau_var_ms + tau_long_ms)^2 must be at least 4 * tau_var_ms * tau_short_ms, \
                 got tau_short_ms = {t_short}, tau_long_ms = {t_long}, tau_var_ms = {t_var}"
            )));
        }

        if !(0.0..=1.0).contains(&self.weighting_fast_share) {
            return Err(LoudnessError::InvalidConfig(format!(
                "weighting_fast_share must be within 0..=1, got {}",
                self.weighting_fast_share
            )));
        }

        if self.decay_oversampling == 0 {
            return Err(LoudnessError::InvalidConfig(
                "decay_oversampling must be at least 1".to_string(),
            ));
        }
        if self.decimation == 0 {
            return Err(LoudnessError::InvalidConfig(
                "decimation must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

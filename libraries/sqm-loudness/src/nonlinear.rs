//! Nonlinear temporal decay of core loudness
//!
//! Models forward masking: loudness rises with the stimulus but falls off
//! slowly after it stops, and the longer a sound lasted the slower it fades.
//! The ear is approximated by two coupled capacitors. While the input falls
//! the output discharges through both (or through a single pole once they
//! are equal); while the input rises the output follows immediately and the
//! second capacitor recharges slowly.
//!
//! Each band is filtered on its own, strictly in time order. Between two
//! real frames the input is linearly interpolated on a finer grid so the
//! discharge curve is smooth at the 0.5 ms frame rate.

use crate::config::TimeVaryingConfig;
use crate::main_loudness::CoreLoudness;
use crate::tables::CRITICAL_BANDS;
use tracing::trace;

/// Input within this distance of the output counts as steady (sone/Bark)
const STEADY_TOLERANCE: f64 = 1e-5;

/// Per-sub-step coefficients of the two-capacitor discharge network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayCoefficients {
    /// Charge flowing from the output into the second capacitor
    pub store_from_output: f64,
    /// Self-coupling of the second capacitor (negative)
    pub store_feedback: f64,
    /// Self-coupling of the output while discharging
    pub output_feedback: f64,
    /// Charge returned from the second capacitor to the output (negative)
    pub output_from_store: f64,
    /// Single-pole decay once both capacitors are level
    pub single_pole: f64,
    /// Recharge rate of the second capacitor
    pub recharge: f64,
}

impl DecayCoefficients {
    /// Derive the coefficients from the model time constants
    pub fn new(config: &TimeVaryingConfig) -> Self {
        let t_short = config.tau_short_ms / 1000.0;
        let t_long = config.tau_long_ms / 1000.0;
        let t_var = config.tau_var_ms / 1000.0;
        let dt = config.frame_interval() / config.decay_oversampling as f64;

        // Eigenvalues of the linear two-capacitor system
        let p = (t_var + t_long) / (t_var * t_short);
        let q = 1.0 / (t_short * t_var);
        let root = (p * p / 4.0 - q).sqrt();
        let lambda1 = -p / 2.0 + root;
        let lambda2 = -p / 2.0 - root;
        let den = t_var * (lambda1 - lambda2);
        let e1 = (lambda1 * dt).exp();
        let e2 = (lambda2 * dt).exp();

        let k1 = t_var * lambda1 + 1.0;
        let k2 = t_var * lambda2 + 1.0;

        Self {
            store_from_output: (e1 - e2) / den,
            store_feedback: (k2 * e1 - k1 * e2) / den,
            output_feedback: (k1 * e1 - k2 * e2) / den,
            output_from_store: k1 * k2 * (e1 - e2) / den,
            single_pole: (-dt / t_long).exp(),
            recharge: (-dt / t_var).exp(),
        }
    }
}

impl Default for DecayCoefficients {
    fn default() -> Self {
        Self::new(&TimeVaryingConfig::default())
    }
}

/// Decay filter state of one critical band
#[derive(Debug, Clone)]
pub(crate) struct NonlinearDecayFilter {
    coefficients: DecayCoefficients,
    oversampling: usize,
    /// Output capacitor
    uo: f64,
    /// Second (slow) capacitor
    u2: f64,
}

impl NonlinearDecayFilter {
    /// Create a discharged filter
    pub(crate) fn new(config: &TimeVaryingConfig) -> Self {
        Self {
            coefficients: DecayCoefficients::new(config),
            oversampling: config.decay_oversampling.max(1),
            uo: 0.0,
            u2: 0.0,
        }
    }

    /// Advance one sub-step with input `ui` and return the output
    pub(crate) fn step(&mut self, ui: f64) -> f64 {
        let c = &self.coefficients;
        let (uo_last, u2_last) = (self.uo, self.u2);

        if ui < uo_last - STEADY_TOLERANCE {
            if uo_last > u2_last {
                // Both capacitors discharge together
                let uo = uo_last * c.output_feedback - u2_last * c.output_from_store;
                let u2 = uo_last * c.store_from_output - u2_last * c.store_feedback;
                self.uo = uo.max(ui);
                self.u2 = u2.min(self.uo);
            } else {
                self.uo = (uo_last * c.single_pole).max(ui);
                self.u2 = self.uo;
            }
        } else {
            // Output follows the input, the store recharges towards it
            self.uo = ui;
            self.u2 = if ui > u2_last {
                (u2_last - ui) * c.recharge + ui
            } else {
                ui
            };
        }

        self.uo
    }

    /// Filter one band's core loudness sequence
    ///
    /// Output `t` is the response to real frame `t`. The interpolated
    /// sub-steps up to the next frame only advance the state, and the last
    /// frame has no successor to interpolate towards.
    pub(crate) fn process(&mut self, input: &[f64]) -> Vec<f64> {
        let mut output = Vec::with_capacity(input.len());
        let substeps = self.oversampling as f64;

        for (t, &current) in input.iter().enumerate() {
            output.push(self.step(current));

            if let Some(&next) = input.get(t + 1) {
                let delta = (next - current) / substeps;
                for k in 1..self.oversampling {
                    self.step(current + k as f64 * delta);
                }
            }
        }

        output
    }
}

/// Apply the decay filter to every band of a core loudness sequence
///
/// Bands are independent, so they are filtered concurrently when the
/// `parallel` feature is enabled. Results do not depend on the feature.
pub fn filter_core_sequence(
    frames: &[CoreLoudness],
    config: &TimeVaryingConfig,
) -> Vec<CoreLoudness> {
    let filter_band = |band: usize| -> Vec<f64> {
        let input: Vec<f64> = frames.iter().map(|frame| frame[band]).collect();
        let output = NonlinearDecayFilter::new(config).process(&input);
        trace!(
            band,
            frames = frames.len(),
            peak = output.iter().copied().fold(0.0, f64::max),
            "Decay filter applied"
        );
        output
    };

    let bands: Vec<Vec<f64>> = {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..CRITICAL_BANDS).into_par_iter().map(filter_band).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..CRITICAL_BANDS).map(filter_band).collect()
        }
    };

    (0..frames.len())
        .map(|t| {
            let mut values = [0.0; CRITICAL_BANDS];
            for (value, band) in values.iter_mut().zip(&bands) {
                *value = band[t];
            }
            CoreLoudness::from_values(values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> NonlinearDecayFilter {
        NonlinearDecayFilter::new(&TimeVaryingConfig::default())
    }

    fn burst(on: usize, off: usize) -> Vec<f64> {
        let mut input = vec![1.0; on];
        input.resize(on + off, 0.0);
        input
    }

    #[test]
    fn test_default_coefficients() {
        let c = DecayCoefficients::default();
        assert!((c.store_from_output - 0.000277).abs() < 1e-6);
        assert!((c.store_feedback + 0.99972).abs() < 1e-5);
        assert!((c.output_feedback - 0.99529).abs() < 1e-5);
        assert!((c.output_from_store + 0.000554).abs() < 1e-6);
        assert!((c.single_pole - 0.998612).abs() < 1e-6);
        assert!((c.recharge - 0.999722).abs() < 1e-6);
    }

    #[test]
    fn test_constant_input_passes_through() {
        let output = filter().process(&[2.5; 100]);
        assert!(output.iter().all(|&v| v == 2.5));
    }

    #[test]
    fn test_rising_input_is_followed_immediately() {
        let input: Vec<f64> = (0..50).map(|t| t as f64 * 0.1).collect();
        let output = filter().process(&input);
        assert_eq!(output, input);
    }

    #[test]
    fn test_decay_after_offset() {
        let output = filter().process(&burst(100, 200));

        // Monotonic decay, still audible 10 ms later, never negative
        let tail = &output[100..];
        assert!(tail.windows(2).all(|w| w[1] <= w[0]));
        assert!(tail[0] < 1.0 && tail[0] > 0.85);
        assert!(tail[20] > 0.1);
        assert!(tail.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_long_bursts_fade_slower() {
        let long = filter().process(&burst(400, 100));
        let short = filter().process(&burst(10, 100));

        // Compare 15 ms after each offset
        assert!(long[430] > short[40] * 1.5, "{} vs {}", long[430], short[40]);
    }

    #[test]
    fn test_output_stays_below_running_max() {
        let input: Vec<f64> = (0..400)
            .map(|t| ((t as f64 * 0.07).sin() * 3.0).max(0.0))
            .collect();
        let output = filter().process(&input);

        let mut running_max = 0.0_f64;
        for (i, o) in input.iter().zip(&output) {
            running_max = running_max.max(*i);
            assert!(*o <= running_max + 1e-12);
            assert!(*o >= *i - 1e-12);
        }
    }

    #[test]
    fn test_single_frame_is_processed_alone() {
        assert_eq!(filter().process(&[0.7]), vec![0.7]);
    }

    #[test]
    fn test_fresh_filter_starts_discharged() {
        let mut charged = filter();
        charged.process(&[3.0; 10]);
        assert!(charged.step(0.0) > 2.5);

        // Each band starts from an empty filter
        assert_eq!(filter().step(0.0), 0.0);
    }

    #[test]
    fn test_sequence_filter_matches_single_band() {
        let config = TimeVaryingConfig::default();
        let input = burst(30, 30);
        let frames: Vec<CoreLoudness> = input
            .iter()
            .map(|&v| {
                let mut values = [0.0; CRITICAL_BANDS];
                values[5] = v;
                values[12] = v * 2.0;
                CoreLoudness::from_values(values)
            })
            .collect();

        let filtered = filter_core_sequence(&frames, &config);
        let band5 = NonlinearDecayFilter::new(&config).process(&input);
        let doubled: Vec<f64> = input.iter().map(|v| v * 2.0).collect();
        let band12 = NonlinearDecayFilter::new(&config).process(&doubled);

        assert_eq!(filtered.len(), frames.len());
        for (t, frame) in filtered.iter().enumerate() {
            assert_eq!(frame[5], band5[t]);
            assert_eq!(frame[12], band12[t]);
            assert_eq!(frame[0], 0.0);
        }
    }
}

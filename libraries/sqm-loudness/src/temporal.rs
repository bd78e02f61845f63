//! Temporal weighting and decimation of time-varying loudness
//!
//! The total loudness at the frame rate is smoothed by a weighted pair of
//! first-order low-passes and then thinned to the output rate.

use crate::config::TimeVaryingConfig;

/// First-order low-pass with zero initial state
#[derive(Debug, Clone, Copy)]
struct OnePole {
    coefficient: f64,
    state: f64,
}

impl OnePole {
    fn new(tau_s: f64, dt_s: f64) -> Self {
        Self {
            coefficient: (-dt_s / tau_s).exp(),
            state: 0.0,
        }
    }

    fn process(&mut self, x: f64) -> f64 {
        self.state = self.state * self.coefficient + x * (1.0 - self.coefficient);
        self.state
    }
}

/// Weighted sum of a fast and a slow low-pass
#[derive(Debug, Clone, Copy)]
pub struct TemporalWeighting {
    fast: OnePole,
    slow: OnePole,
    fast_share: f64,
}

impl TemporalWeighting {
    /// Create a weighting with zero initial state
    pub fn new(config: &TimeVaryingConfig) -> Self {
        let dt = config.frame_interval();
        Self {
            fast: OnePole::new(config.weighting_tau_fast_ms / 1000.0, dt),
            slow: OnePole::new(config.weighting_tau_slow_ms / 1000.0, dt),
            fast_share: config.weighting_fast_share,
        }
    }

    /// Advance one frame
    pub fn process(&mut self, x: f64) -> f64 {
        self.fast_share * self.fast.process(x) + (1.0 - self.fast_share) * self.slow.process(x)
    }

    /// Weight a whole sequence
    pub fn apply(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.process(x)).collect()
    }
}

/// Keep every `factor`-th element, starting with the first
pub fn decimate<T: Clone>(input: &[T], factor: usize) -> Vec<T> {
    input.iter().step_by(factor.max(1)).cloned().collect()
}

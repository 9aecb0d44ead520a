//! Emission time sampling for a single scintillation component.
//!
//! Without a rise time the emission time is a plain exponential decay.
//! With a rise time `r` and decay constant `τ`, proposals are drawn from the
//! decay exponential and accepted with probability
//!
//! ```text
//! f(t) = exp(-t/r) (1 - exp(-t/r)) (τ + r) / τ²
//! ```
//!
//! `f` peaks at `(τ + r) / (4τ²)`. While that peak does not exceed one, the
//! probability that a trial is accepted is exactly `r / (τ (r + 2τ))`, so the
//! expected number of trials is `τ (r + 2τ) / r`. Accepted times then follow the
//! biexponential density proportional to `exp(-t/a) - exp(-t/b)` with
//! `a = 1 / (1/τ + 1/r)` and `b = 1 / (1/τ + 2/r)`, whose mean is `a + b` and
//! whose variance is `a² + b²`. The acceptance probability is strictly positive
//! for any positive `τ` and `r`, so the loop terminates with probability one;
//! [TimingSampler] still caps the number of trials.
use photolib_common::{NO_RISE_TIME, Time};
use rand::{
    Rng,
    distr::{Distribution, Open01},
};
use tracing::debug;

pub const DEFAULT_MAX_TIMING_RETRIES: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScintillationComponent {
    pub time_constant: f64,
    /// `None` selects pure exponential decay.
    pub rise_time: Option<f64>,
}

impl ScintillationComponent {
    /// Builds a component from a raw rise time, where any non-positive value
    /// (conventionally [NO_RISE_TIME]) disables the rise. Run configuration
    /// rejects a rise time of zero before it gets here.
    pub fn new(time_constant: f64, rise_time: f64) -> Self {
        Self {
            time_constant,
            rise_time: (rise_time > 0.0).then_some(rise_time),
        }
    }

    pub fn without_rise(time_constant: f64) -> Self {
        Self::new(time_constant, NO_RISE_TIME)
    }

    /// Probability that a single rejection trial is accepted.
    /// Returns `None` in no-rise mode, or when the acceptance function exceeds one
    /// somewhere and the closed form no longer holds.
    pub fn acceptance_probability(&self) -> Option<f64> {
        let tau = self.time_constant;
        let rise = self.rise_time?;
        ((tau + rise) / (4.0 * tau * tau) <= 1.0).then(|| rise / (tau * (rise + 2.0 * tau)))
    }
}

fn acceptance(t: f64, time_constant: f64, rise_time: f64) -> f64 {
    let rise_factor = f64::exp(-t / rise_time);
    rise_factor * (1.0 - rise_factor) / time_constant / time_constant
        * (time_constant + rise_time)
}

/// One trial of the emission time draw given the two uniform variates.
///
/// In no-rise mode the result is `-time_constant * ln(u1)` and `u2` is unused.
/// In rise mode the accepted proposal `t` is returned as `-t`, and `None` means
/// the proposal was rejected and a fresh pair of variates is required.
pub fn sample_time(time_constant: f64, rise_time: Option<f64>, u1: f64, u2: f64) -> Option<Time> {
    match rise_time {
        None => Some(-time_constant * f64::ln(u1)),
        Some(rise_time) => {
            let t = -time_constant * f64::ln(1.0 - u1);
            (u2 <= acceptance(t, time_constant, rise_time)).then_some(-t)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimingDraw {
    Accepted(Time),
    /// The retry limit was reached; holds the last proposal.
    Exhausted(Time),
}

impl TimingDraw {
    pub fn offset(&self) -> Time {
        match *self {
            Self::Accepted(offset) | Self::Exhausted(offset) => offset,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }
}

#[derive(Debug, Clone)]
pub struct TimingSampler {
    max_retries: usize,
}

impl Default for TimingSampler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TIMING_RETRIES)
    }
}

impl TimingSampler {
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries: max_retries.max(1),
        }
    }

    /// Draws an emission time offset, consuming two variates per trial from `rng`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        component: &ScintillationComponent,
    ) -> TimingDraw {
        let mut last_proposal = Time::default();
        for _ in 0..self.max_retries {
            let u1: f64 = Open01.sample(rng);
            let u2: f64 = Open01.sample(rng);
            if let Some(offset) = sample_time(component.time_constant, component.rise_time, u1, u2)
            {
                return TimingDraw::Accepted(offset);
            }
            last_proposal = component.time_constant * f64::ln(1.0 - u1);
        }
        debug!(
            "Emission time rejection sampling gave up after {} trials (time constant {}, rise time {:?})",
            self.max_retries, component.time_constant, component.rise_time
        );
        TimingDraw::Exhausted(last_proposal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{SeedableRng, rngs::StdRng};

    fn moments(samples: &[f64]) -> (f64, f64) {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, variance)
    }

    #[test]
    fn no_rise_is_exponential_draw() {
        let offset = sample_time(1.0, None, 0.5, 0.9).expect("no-rise mode always accepts");
        assert_approx_eq!(offset, f64::ln(2.0));
        assert_approx_eq!(offset, 0.693, 1e-3);
        assert_eq!(sample_time(1.0, None, 0.5, 0.1), Some(offset));
    }

    #[test]
    fn sentinel_disables_rise() {
        assert_eq!(ScintillationComponent::new(6.0, NO_RISE_TIME).rise_time, None);
        assert_eq!(ScintillationComponent::new(6.0, 0.0).rise_time, None);
        assert_eq!(ScintillationComponent::new(6.0, 1.5).rise_time, Some(1.5));
    }

    #[test]
    fn rise_mode_accepts_and_rejects() {
        // u1 = 1/2 proposes t = ln 2, so exp(-t/r) = 1/4 for r = 1/2 and f(t) = 3/16 (1 + r)
        let rise = 0.5;
        let threshold = 3.0 / 16.0 * (1.0 + rise);
        let accepted = sample_time(1.0, Some(rise), 0.5, threshold - 1e-9);
        assert_approx_eq!(accepted.expect("below threshold"), -f64::ln(2.0));
        assert_eq!(sample_time(1.0, Some(rise), 0.5, threshold + 1e-9), None);
    }

    #[test]
    fn rise_mode_offsets_are_negative() {
        let mut rng = StdRng::seed_from_u64(7);
        let sampler = TimingSampler::default();
        let component = ScintillationComponent::new(6.0, 1.0);
        for _ in 0..1000 {
            let draw = sampler.sample(&mut rng, &component);
            assert!(!draw.is_exhausted());
            assert!(draw.offset() <= 0.0);
        }
    }

    #[test]
    fn rise_mode_matches_biexponential_moments() {
        let tau = 1.0;
        let rise = 0.5;
        let a = 1.0 / (1.0 / tau + 1.0 / rise);
        let b = 1.0 / (1.0 / tau + 2.0 / rise);

        let mut rng = StdRng::seed_from_u64(12345);
        let sampler = TimingSampler::default();
        let component = ScintillationComponent::new(tau, rise);
        let samples = (0..10_000)
            .map(|_| sampler.sample(&mut rng, &component).offset())
            .collect::<Vec<_>>();

        let (mean, variance) = moments(&samples);
        assert_approx_eq!(mean, -(a + b), 0.05 * (a + b));
        assert_approx_eq!(variance, a * a + b * b, 0.1 * (a * a + b * b));
    }

    #[test]
    fn acceptance_probability_closed_form() {
        let component = ScintillationComponent::new(1.0, 0.5);
        assert_approx_eq!(component.acceptance_probability().expect("bounded"), 0.2);
        assert_eq!(
            ScintillationComponent::without_rise(1.0).acceptance_probability(),
            None
        );
        // (τ + r) / 4τ² > 1
        assert_eq!(
            ScintillationComponent::new(0.1, 1.0).acceptance_probability(),
            None
        );
    }

    #[test]
    fn retry_limit_returns_last_proposal() {
        // Acceptance is vanishingly small for a tiny rise time on a long decay.
        let mut rng = StdRng::seed_from_u64(3);
        let sampler = TimingSampler::new(5);
        let draw = sampler.sample(&mut rng, &ScintillationComponent::new(1590.0, 1e-6));
        assert!(draw.is_exhausted());
        assert!(draw.offset() <= 0.0);
    }
}

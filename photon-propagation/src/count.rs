use photolib_common::PhotonCount;
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use tracing::warn;

/// Draws Poisson distributed photon counts.
#[derive(Default, Debug, Clone, Copy)]
pub struct CountSampler;

impl CountSampler {
    /// Returns a Poisson draw with the given mean.
    /// Non-positive or non-finite means give zero without touching `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, mean: f64) -> PhotonCount {
        if !mean.is_finite() || mean <= 0.0 {
            return 0;
        }
        match Poisson::new(mean) {
            Ok(poisson) => poisson.sample(rng) as PhotonCount,
            Err(e) => {
                warn!("Cannot sample Poisson with mean {mean}: {e}, using the rounded mean");
                mean.round() as PhotonCount
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{RngCore, SeedableRng, rngs::StdRng};

    #[test]
    fn zero_mean_is_zero() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..1000 {
            assert_eq!(CountSampler.sample(&mut rng, 0.0), 0);
        }
    }

    #[test]
    fn non_positive_mean_does_not_draw() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut reference = rng.clone();
        assert_eq!(CountSampler.sample(&mut rng, 0.0), 0);
        assert_eq!(CountSampler.sample(&mut rng, -3.0), 0);
        assert_eq!(CountSampler.sample(&mut rng, f64::NAN), 0);
        assert_eq!(rng.next_u64(), reference.next_u64());
    }

    #[test]
    fn mean_and_variance_are_equal() {
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 100_000;
        let samples = (0..n)
            .map(|_| CountSampler.sample(&mut rng, 5.0) as f64)
            .collect::<Vec<_>>();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance =
            samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
        assert_approx_eq!(mean, 5.0, 0.02 * 5.0);
        assert_approx_eq!(variance, 5.0, 0.05 * 5.0);
    }
}

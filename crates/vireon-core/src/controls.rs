//! Null-model generators for control runs.
//!
//! Both generators are seeded so a control run can be reproduced exactly:
//! - [`shuffle_proxies`] keeps the values but destroys temporal order.
//! - [`poissonize`] keeps only the mean, replacing the series with Poisson noise.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use statrs::distribution::{DiscreteCDF, Poisson};

use crate::error::{self, Result};
use crate::numeric::mean;

/// Seeded permutation of `proxies`. The input is left untouched.
pub fn shuffle_proxies<T: Clone>(proxies: &[T], seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut shuffled = proxies.to_vec();
    shuffled.shuffle(&mut rng);
    shuffled
}

/// Replace `series` with Poisson draws whose rate is the series mean.
///
/// Draws are taken by inverting the Poisson CDF at uniform variates. An empty
/// series yields an empty vector and a zero mean yields all zeros.
pub fn poissonize(series: &[f64], seed: u64) -> Result<Vec<f64>> {
    let Some(lambda) = mean(series) else {
        return Ok(Vec::new());
    };
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(error::input(format!(
            "poisson rate must be a non-negative finite mean, got {lambda}"
        )));
    }
    if lambda == 0.0 {
        return Ok(vec![0.0; series.len()]);
    }

    let poisson = Poisson::new(lambda).map_err(|e| error::input(e.to_string()))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let draws = (0..series.len())
        .map(|_| poisson.inverse_cdf(rng.random::<f64>()) as f64)
        .collect();
    log::trace!("poissonized {} points at rate {lambda:.4}", series.len());
    Ok(draws)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_a_permutation() {
        let data: Vec<u32> = (0..100).collect();
        let mut shuffled = shuffle_proxies(&data, 3);
        assert_ne!(shuffled, data);
        shuffled.sort_unstable();
        assert_eq!(shuffled, data);
    }

    #[test]
    fn shuffle_is_reproducible_per_seed() {
        let data: Vec<f64> = (0..50).map(f64::from).collect();
        assert_eq!(shuffle_proxies(&data, 7), shuffle_proxies(&data, 7));
        assert_ne!(shuffle_proxies(&data, 7), shuffle_proxies(&data, 8));
    }

    #[test]
    fn poissonize_matches_length_and_mean() {
        let series = vec![4.0; 2000];
        let draws = poissonize(&series, 4).unwrap();
        assert_eq!(draws.len(), series.len());
        assert!(draws.iter().all(|&d| d >= 0.0 && d.fract() == 0.0));
        let m = mean(&draws).unwrap();
        assert!((m - 4.0).abs() < 0.3, "mean {m} too far from 4");
    }

    #[test]
    fn poissonize_is_reproducible_per_seed() {
        let series = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(poissonize(&series, 1).unwrap(), poissonize(&series, 1).unwrap());
    }

    #[test]
    fn poissonize_edge_cases() {
        assert!(poissonize(&[], 0).unwrap().is_empty());
        assert_eq!(poissonize(&[0.0, 0.0], 0).unwrap(), vec![0.0, 0.0]);
        assert!(matches!(
            poissonize(&[-1.0, -2.0], 0),
            Err(crate::LeashError::InvalidInput(_))
        ));
    }
}

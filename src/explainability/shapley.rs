//! Permutation-sampling Shapley estimation
//!
//! Estimates each token's Shapley value for a scalar payout function over
//! masked variants of the text. Exact computation is exponential in token
//! count, so the estimator draws random permutations: each walk adds tokens
//! to the coalition one at a time and accumulates the marginal payout
//! change. The baseline is the fully-masked variant.
//!
//! The sample budget bounds runtime directly: one payout evaluation per
//! token per permutation, plus one baseline evaluation.

use ndarray::Array1;
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::masker::TokenMasker;

/// Configuration for the permutation estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapleyConfig {
    /// Number of random permutations to sample
    pub n_samples: usize,
    /// Seed for the sampling RNG; `None` draws from entropy, at the cost of
    /// run-to-run reproducibility
    pub seed: Option<u64>,
    /// Evaluate permutation samples in parallel. Requires the payout
    /// function to tolerate concurrent invocation.
    pub parallel: bool,
}

impl Default for ShapleyConfig {
    fn default() -> Self {
        Self {
            n_samples: 32,
            seed: Some(42),
            parallel: false,
        }
    }
}

impl ShapleyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the sample budget
    pub fn with_n_samples(mut self, n: usize) -> Self {
        self.n_samples = n.max(1);
        self
    }

    /// Builder method to set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method to draw the seed from entropy
    pub fn with_entropy(mut self) -> Self {
        self.seed = None;
        self
    }

    /// Builder method to enable parallel sample evaluation
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Permutation-sampling Shapley estimator
#[derive(Debug, Clone)]
pub struct PermutationShapley {
    config: ShapleyConfig,
}

impl PermutationShapley {
    pub fn new(config: ShapleyConfig) -> Self {
        Self { config }
    }

    /// Estimate one Shapley value per token for `payout` over the masker's
    /// variants.
    ///
    /// With a fixed seed the result is deterministic, independent of whether
    /// samples run in parallel: every sample derives its own RNG from the
    /// seed and the sample index.
    pub fn estimate<F>(&self, masker: &TokenMasker, payout: F) -> Result<Array1<f64>>
    where
        F: Fn(&str) -> Result<f64> + Sync,
    {
        let n_tokens = masker.len();
        if n_tokens == 0 {
            return Ok(Array1::zeros(0));
        }

        // The empty-coalition payout is identical for every permutation
        let baseline = payout(&masker.variant(&vec![false; n_tokens]))?;

        let sample = |sample_idx: usize| -> Result<Vec<f64>> {
            let mut rng = match self.config.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(sample_idx as u64)),
                None => StdRng::from_entropy(),
            };

            let mut perm: Vec<usize> = (0..n_tokens).collect();
            perm.shuffle(&mut rng);

            let mut included = vec![false; n_tokens];
            let mut contributions = vec![0.0; n_tokens];
            let mut prev = baseline;

            for &token_idx in &perm {
                included[token_idx] = true;
                let current = payout(&masker.variant(&included))?;
                contributions[token_idx] = current - prev;
                prev = current;
            }
            Ok(contributions)
        };

        let per_sample: Vec<Vec<f64>> = if self.config.parallel {
            (0..self.config.n_samples)
                .into_par_iter()
                .map(sample)
                .collect::<Result<Vec<_>>>()?
        } else {
            (0..self.config.n_samples)
                .map(sample)
                .collect::<Result<Vec<_>>>()?
        };

        let mut totals = Array1::<f64>::zeros(n_tokens);
        for contributions in &per_sample {
            for (i, c) in contributions.iter().enumerate() {
                totals[i] += c;
            }
        }
        totals /= self.config.n_samples as f64;
        Ok(totals)
    }
}

//! Sampled weighted Shapley values.
//!
//! Each sample draws a uniform random order of the agents and lets them join
//! a running coalition one at a time. An agent's marginal contribution at the
//! moment it joins is multiplied by that agent's own weight and added to its
//! accumulator; the payout is the accumulator divided by the sample count.
//!
//! Weights scale the contributions attributed to their agent and leave the
//! sampling distribution uniform. With unit weights the payouts sum to the
//! value of the grand coalition; with other weights they do not.

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, trace};

use super::*;

/// Per-agent payouts, index-aligned with agent ids.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ShapleyVector(Vec<f64>);

impl ShapleyVector {
    pub fn new(payouts: Vec<f64>) -> Self {
        ShapleyVector(payouts)
    }

    /// Sum of all payouts.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl Deref for ShapleyVector {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub const DEFAULT_SAMPLES: usize = 10_000;

/// Samples handled by one parallel task. Each task owns its own random stream.
const CHUNK_SAMPLES: usize = 1_000;

fn check_arguments<V>(v: &V, n: usize, weights: &[Weight]) -> Result<()>
where
    V: CoalitionValue + ?Sized,
{
    if weights.len() != n {
        return Err(PayoutError::WeightMismatch {
            weights: weights.len(),
            agents: n,
        });
    }
    if n > COALITION_CAPACITY {
        return Err(PayoutError::TooManyAgents {
            count: n,
            max: COALITION_CAPACITY,
        });
    }
    if let Some(found) = v.covered_agents()
        && found != n
    {
        return Err(PayoutError::AgentCountMismatch { expected: n, found });
    }
    Ok(())
}

/// Walks one random order of the agents, adding weighted marginals into `acc`.
fn sample_order<V, R>(v: &V, weights: &[Weight], order: &mut [AgentId], acc: &mut [f64], rng: &mut R)
where
    V: CoalitionValue + ?Sized,
    R: Rng + ?Sized,
{
    order.shuffle(rng);
    let mut co = Coalition::empty();
    let mut prev = v.value(co) as f64;
    for &ag in order.iter() {
        co = co.with(ag);
        let cur = v.value(co) as f64;
        acc[ag] += (cur - prev) * weights[ag] as f64;
        prev = cur;
    }
}

/// Monte Carlo permutation sampler.
#[derive(Clone, Debug)]
pub struct ShapleyEstimator {
    samples: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl ShapleyEstimator {
    pub fn new(samples: usize) -> Self {
        ShapleyEstimator { samples, cancel: None }
    }

    /// Makes the estimator stop between samples once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn check<V>(&self, v: &V, n: usize, weights: &[Weight]) -> Result<()>
    where
        V: CoalitionValue + ?Sized,
    {
        if self.samples == 0 {
            return Err(PayoutError::InvalidSamples);
        }
        check_arguments(v, n, weights)
    }

    /// Estimates the payouts of `n` agents valued by `v`, drawing orders from `rng`.
    pub fn estimate<V, R>(&self, v: &V, n: usize, weights: &[Weight], rng: &mut R) -> Result<ShapleyVector>
    where
        V: CoalitionValue + ?Sized,
        R: Rng + ?Sized,
    {
        self.check(v, n, weights)?;
        if n == 0 {
            return Ok(ShapleyVector::default());
        }
        let mut acc = vec![0.0; n];
        let mut order = (0..n).collect::<Vec<AgentId>>();
        for completed in 0..self.samples {
            if self.is_cancelled() {
                return Err(PayoutError::Cancelled { completed });
            }
            sample_order(v, weights, &mut order, &mut acc, rng);
        }
        debug!(agents = n, samples = self.samples, "estimated shapley values");
        Ok(self.finish(acc))
    }

    /// Estimates in parallel over chunks of samples.
    ///
    /// Chunk `i` draws from the ChaCha stream `i` of `seed`, and partial sums
    /// are added in chunk order, so the result only depends on `seed`.
    /// On cancellation, `completed` counts the samples of the chunk that noticed it.
    pub fn estimate_parallel<V>(&self, v: &V, n: usize, weights: &[Weight], seed: u64) -> Result<ShapleyVector>
    where
        V: CoalitionValue + Sync + ?Sized,
    {
        self.check(v, n, weights)?;
        if n == 0 {
            return Ok(ShapleyVector::default());
        }
        let chunks = self.samples.div_ceil(CHUNK_SAMPLES);
        let partials = (0..chunks)
            .into_par_iter()
            .map(|chunk| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(chunk as u64);
                let count = CHUNK_SAMPLES.min(self.samples - chunk * CHUNK_SAMPLES);
                let mut acc = vec![0.0; n];
                let mut order = (0..n).collect::<Vec<AgentId>>();
                for done in 0..count {
                    if self.is_cancelled() {
                        return Err(PayoutError::Cancelled { completed: done });
                    }
                    sample_order(v, weights, &mut order, &mut acc, &mut rng);
                }
                trace!(chunk, count, "sampled chunk");
                Ok(acc)
            })
            .collect::<Result<Vec<_>>>()?;
        let mut acc = vec![0.0; n];
        for partial in partials {
            for (a, p) in acc.iter_mut().zip(partial) {
                *a += p;
            }
        }
        debug!(agents = n, samples = self.samples, chunks, "estimated shapley values in parallel");
        Ok(self.finish(acc))
    }

    fn finish(&self, acc: Vec<f64>) -> ShapleyVector {
        let samples = self.samples as f64;
        ShapleyVector(acc.into_iter().map(|x| x / samples).collect())
    }
}

impl Default for ShapleyEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES)
    }
}

/// Limit on the agent count for exact enumeration.
pub const EXACT_MAX_AGENTS: usize = 20;

/// Exact value of the sampled process: every agent's classical Shapley value
/// times its own weight. Enumerates all coalitions, so only for small `n`.
pub fn exact_shapley<V>(v: &V, n: usize, weights: &[Weight]) -> Result<ShapleyVector>
where
    V: CoalitionValue + ?Sized,
{
    check_arguments(v, n, weights)?;
    if n > EXACT_MAX_AGENTS {
        return Err(PayoutError::TooManyAgents {
            count: n,
            max: EXACT_MAX_AGENTS,
        });
    }
    if n == 0 {
        return Ok(ShapleyVector::default());
    }
    // coef[k] = k! (n-1-k)! / n! = 1 / (n * C(n-1, k))
    let mut coef = Vec::with_capacity(n);
    let mut binom = 1.0f64;
    for k in 0..n {
        coef.push(1.0 / (n as f64 * binom));
        binom = binom * (n - 1 - k) as f64 / (k + 1) as f64;
    }
    let values = CharacteristicFunction::tabulate(n, v);
    let mut phi = vec![0.0; n];
    for (co, base) in values.iter() {
        for ag in (0..n).filter(|&ag| !co.contains(ag)) {
            let marginal = values.get(co.with(ag)) as f64 - base as f64;
            phi[ag] += coef[co.len()] * marginal;
        }
    }
    Ok(ShapleyVector(
        phi.into_iter().zip(weights).map(|(x, &w)| x * w as f64).collect(),
    ))
}

//! Pure allocation policies over the unassigned pool. Nothing here mutates
//! the registry; callers reserve what they keep.

use std::cmp::Reverse;

use potato_core::config::SamplingStrategy;
use potato_core::errors::AssignmentError;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::pool::UnassignedPool;

/// Shuffle, then stable-sort by descending remaining quota and take `k`.
/// Ties keep their shuffled order, so equally-needed ids are drawn at random.
pub fn sample_random<R: Rng>(pool: &UnassignedPool, k: usize, rng: &mut R) -> Vec<String> {
    let mut candidates: Vec<(&str, usize)> = pool.iter().collect();
    candidates.shuffle(rng);
    candidates.sort_by_key(|&(_, quota)| Reverse(quota));
    candidates
        .into_iter()
        .take(k)
        .map(|(id, _)| id.to_string())
        .collect()
}

/// First `k` ids in insertion order.
pub fn sample_ordered(pool: &UnassignedPool, k: usize) -> Vec<String> {
    pool.iter().take(k).map(|(id, _)| id.to_string()).collect()
}

/// Dispatch on the configured strategy.
pub fn sample<R: Rng>(
    pool: &UnassignedPool,
    k: usize,
    strategy: SamplingStrategy,
    rng: &mut R,
) -> Vec<String> {
    match strategy {
        SamplingStrategy::Random => sample_random(pool, k, rng),
        SamplingStrategy::Ordered => sample_ordered(pool, k),
    }
}

/// Draw `n` distinct test questions and insert each at a uniformly random
/// position of the list as extended so far.
pub fn inject_test_questions<R: Rng>(
    mut sampled: Vec<String>,
    test_pool: &[String],
    n: usize,
    rng: &mut R,
) -> Result<Vec<String>, AssignmentError> {
    if n > test_pool.len() {
        return Err(AssignmentError::InsufficientPool {
            requested: n,
            available: test_pool.len(),
        });
    }
    let picks: Vec<&String> = test_pool.choose_multiple(rng, n).collect();
    for id in picks {
        let pos = rng.gen_range(0..=sampled.len());
        sampled.insert(pos, id.clone());
    }
    Ok(sampled)
}

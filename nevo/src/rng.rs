use rand::{distributions::WeightedIndex, prelude::Distribution, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The random number generator owned by populations.
///
/// Its state is serialized together with the population,
/// so a reloaded population continues the same sequence.
pub type PopulationRng = ChaCha8Rng;

pub(crate) fn seeded_rng(seed: Option<u64>) -> PopulationRng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Returns `true` with probability `probability`.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f32) -> bool {
    rng.gen::<f32>() < probability
}

/// Probabilities below this are treated as zero.
const MIN_RANK_PROBABILITY: f32 = 1e-9;

/// Returns a rank-based probability distribution over `size`
/// ranked items, where item `i` is `coefficient` times more
/// likely to be picked than item `i + 1`.
///
/// Values are unnormalized (their sum approaches but never
/// reaches 1), and vanish once they drop below 1e-9.
///
/// # Examples
/// ```
/// use nevo::rank_prob_dist;
///
/// let dist = rank_prob_dist(3, 2.0);
/// assert_eq!(dist, vec![0.5, 0.25, 0.125]);
/// ```
pub fn rank_prob_dist(size: usize, coefficient: f32) -> Vec<f32> {
    let mut dist = Vec::with_capacity(size);
    let mut probability = 1.0 - 1.0 / coefficient;
    for _ in 0..size {
        if probability < MIN_RANK_PROBABILITY {
            probability = 0.0;
        }
        dist.push(probability);
        probability /= coefficient;
    }
    dist
}

/// Picks an index using the weights of a [`rank_prob_dist`].
/// Falls back to the first index on degenerate weights.
pub(crate) fn pick_ranked<R: Rng + ?Sized>(rng: &mut R, weights: &[f32]) -> usize {
    match WeightedIndex::new(weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_dist_is_decreasing() {
        let dist = rank_prob_dist(10, 1.75);
        assert!(dist.windows(2).all(|w| w[0] > w[1]));
        assert!(dist.iter().sum::<f32>() < 1.0);
    }

    #[test]
    fn rank_dist_vanishes() {
        let dist = rank_prob_dist(100, 10.0);
        assert!(dist[0] > 0.0);
        assert_eq!(dist[99], 0.0);
    }

    #[test]
    fn seeded_rngs_agree() {
        let mut a = seeded_rng(Some(7));
        let mut b = seeded_rng(Some(7));
        for _ in 0..16 {
            assert_eq!(a.gen::<u64>(), b.gen::<u64>());
        }
    }

    #[test]
    fn ranked_pick_prefers_top() {
        let mut rng = seeded_rng(Some(3));
        let weights = rank_prob_dist(5, 4.0);
        let picks = (0..1000).filter(|_| pick_ranked(&mut rng, &weights) == 0).count();
        assert!(picks > 600);
    }

    #[test]
    fn degenerate_weights_pick_first() {
        let mut rng = seeded_rng(Some(3));
        assert_eq!(pick_ranked(&mut rng, &[0.0, 0.0]), 0);
        assert_eq!(pick_ranked(&mut rng, &[]), 0);
    }
}

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Returns a permutation of `0..len` shuffled with a generator seeded from `seed`.
///
/// The same `(seed, len)` pair always yields the same permutation, so training
/// curves are reproducible across runs.
pub fn shuffle_order(len: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(&mut rng);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(order: &[usize]) -> bool {
        let mut seen = vec![false; order.len()];
        for &idx in order {
            if idx >= seen.len() || seen[idx] {
                return false;
            }
            seen[idx] = true;
        }
        true
    }

    #[test]
    fn every_index_appears_exactly_once() {
        for seed in [0, 1, 1234, u64::MAX] {
            for len in [0, 1, 2, 7, 64, 1000] {
                let order = shuffle_order(len, seed);
                assert_eq!(order.len(), len);
                assert!(is_permutation(&order), "seed={seed} len={len}");
            }
        }
    }

    #[test]
    fn same_seed_same_order() {
        assert_eq!(shuffle_order(500, 1234), shuffle_order(500, 1234));
    }

    #[test]
    fn different_seeds_reorder() {
        assert_ne!(shuffle_order(500, 1), shuffle_order(500, 2));
    }
}

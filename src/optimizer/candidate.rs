//! Candidate value type — one bacterium/particle of the swarm

use rand::Rng;

/// One point in the 2-D heap-size search space, plus its swarm state:
/// per-dimension velocity and the best configuration this lineage has seen.
///
/// `Clone` is a deep value copy. Best-so-far snapshots are always taken by
/// cloning, so a stored snapshot never aliases a live, still-mutating
/// candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub min_heap_mb: i64,
    pub max_heap_mb: i64,
    /// Velocity for (min, max), carried across generations.
    pub velocity: [f64; 2],
    pub best_min_heap_mb: i64,
    pub best_max_heap_mb: i64,
    pub best_cost: f64,
}

impl Candidate {
    /// Create a candidate at the given position with zero velocity and an
    /// unevaluated personal best.
    pub fn new(min_heap_mb: i64, max_heap_mb: i64) -> Self {
        Self {
            min_heap_mb,
            max_heap_mb,
            velocity: [0.0, 0.0],
            best_min_heap_mb: min_heap_mb,
            best_max_heap_mb: max_heap_mb,
            best_cost: f64::INFINITY,
        }
    }

    /// Uniform random candidate within `[low, high]`.
    ///
    /// `min` is drawn over the full range first, then `max` over
    /// `[max(min, low), high]`, so `min <= max` holds by construction.
    /// Used both at population init and at elimination-dispersal.
    pub fn random<R: Rng>(rng: &mut R, low: i64, high: i64) -> Self {
        let min_heap = rng.gen_range(low..=high);
        let max_heap = rng.gen_range(min_heap.max(low)..=high);
        Self::new(min_heap, max_heap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_candidates_respect_ordering_and_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let c = Candidate::random(&mut rng, 128, 1024);
            assert!(128 <= c.min_heap_mb);
            assert!(c.min_heap_mb <= c.max_heap_mb);
            assert!(c.max_heap_mb <= 1024);
        }
    }

    #[test]
    fn fresh_candidate_has_no_evaluated_best() {
        let c = Candidate::new(256, 512);
        assert_eq!(c.best_min_heap_mb, 256);
        assert_eq!(c.best_max_heap_mb, 512);
        assert!(c.best_cost.is_infinite());
        assert_eq!(c.velocity, [0.0, 0.0]);
    }

    #[test]
    fn clone_is_a_fully_independent_copy() {
        let mut a = Candidate::new(200, 400);
        a.velocity = [1.5, -2.5];
        a.best_cost = 1.25;
        let snapshot = a.clone();

        a.min_heap_mb = 999;
        a.velocity[0] = 0.0;
        a.best_cost = 0.5;

        assert_eq!(snapshot.min_heap_mb, 200);
        assert_eq!(snapshot.velocity, [1.5, -2.5]);
        assert_eq!(snapshot.best_cost, 1.25);
    }

    #[test]
    fn degenerate_range_pins_both_dimensions() {
        let mut rng = StdRng::seed_from_u64(0);
        let c = Candidate::random(&mut rng, 512, 512);
        assert_eq!(c.min_heap_mb, 512);
        assert_eq!(c.max_heap_mb, 512);
    }
}

//! Hybrid bacterial-swarm optimizer (BFO + PSO)
//!
//! Generational search over `(min_heap, max_heap)` pairs. Each generation:
//!
//! 1. PSO velocity/position update pulling every candidate toward its
//!    personal best and the global best,
//! 2. chemotactic tumble — a small random perturbation, applied with
//!    probability [`TUMBLE_PROBABILITY`],
//! 3. constraint repair (clamp into bounds, `min <= max`),
//! 4. evaluation through the [`CostOracle`], updating personal and global
//!    bests,
//! 5. truncation-selection reproduction (best half duplicated),
//! 6. elimination-dispersal (each slot randomly reinitialized with
//!    probability [`ELIMINATION_PROBABILITY`]).
//!
//! The global best snapshot is a detached copy and its cost never increases
//! over a run, regardless of how noisy the individual measurements are.

mod candidate;

pub use candidate::Candidate;

use crate::oracle::{CostOracle, OracleError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

/// PSO inertia weight — how much of the previous velocity is retained.
const INERTIA: f64 = 0.6;

/// Cognitive weight — pull toward the candidate's own best position.
const COGNITIVE: f64 = 1.2;

/// Social weight — pull toward the global best position.
const SOCIAL: f64 = 1.2;

/// Probability of a chemotactic tumble per candidate per generation.
const TUMBLE_PROBABILITY: f64 = 0.3;

/// Tumble perturbation range for the min-heap dimension (MB).
const TUMBLE_MIN_HEAP_MB: i64 = 10;

/// Tumble perturbation range for the max-heap dimension (MB).
const TUMBLE_MAX_HEAP_MB: i64 = 20;

/// Probability that a slot is eliminated and re-dispersed per generation.
const ELIMINATION_PROBABILITY: f64 = 0.05;

/// Fixed parameters for one optimization run.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Population size N.
    pub population: usize,
    /// Number of generations T.
    pub generations: usize,
    /// Lower bound for both heap dimensions (MB).
    pub low_bound: i64,
    /// Upper bound for both heap dimensions (MB).
    pub high_bound: i64,
}

/// Detached copy of the best configuration ever evaluated.
///
/// Copied, never referenced, from the candidate that achieved it, so later
/// mutation of that candidate cannot corrupt the record. `cost` is
/// monotonically non-increasing over a run.
#[derive(Debug, Clone, Copy)]
struct BestSnapshot {
    min_heap_mb: i64,
    max_heap_mb: i64,
    cost: f64,
}

/// Final outcome of an optimization run.
///
/// `cost`, `duration_ms` and `used_memory_mb` come from one fresh
/// re-measurement of the best position after the loop ends; with a noisy
/// benchmark they can differ slightly from the cost recorded while
/// searching. That is expected, not a defect.
#[derive(Debug, Clone, Serialize)]
pub struct TuningResult {
    pub min_heap_mb: i64,
    pub max_heap_mb: i64,
    pub cost: f64,
    pub duration_ms: f64,
    pub used_memory_mb: f64,
}

/// The generational search engine.
pub struct Optimizer<O: CostOracle> {
    params: SearchParams,
    oracle: O,
    rng: StdRng,
}

impl<O: CostOracle> Optimizer<O> {
    /// Create an optimizer. A fixed `seed` makes the full sequence of
    /// proposed configurations reproducible (given a deterministic oracle).
    pub fn new(params: SearchParams, oracle: O, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            params,
            oracle,
            rng,
        }
    }

    /// Run the full search and return the re-measured best configuration.
    ///
    /// Any oracle error (probe failure, unparseable output, missing
    /// calibration) aborts the run immediately with no partial result.
    pub async fn run(mut self) -> Result<TuningResult, OracleError> {
        let SearchParams {
            population,
            generations,
            low_bound,
            high_bound,
        } = self.params;

        let mut pop: Vec<Candidate> = (0..population)
            .map(|_| Candidate::random(&mut self.rng, low_bound, high_bound))
            .collect();

        self.oracle.calibrate_baseline().await?;

        // Evaluate the initial population; the first candidate always seeds
        // the global best.
        let mut global_best = BestSnapshot {
            min_heap_mb: low_bound,
            max_heap_mb: high_bound,
            cost: f64::INFINITY,
        };
        for cand in &mut pop {
            let m = self.oracle.measure(cand.min_heap_mb, cand.max_heap_mb).await?;
            let cost = self.oracle.cost_of(&m)?;
            cand.best_min_heap_mb = cand.min_heap_mb;
            cand.best_max_heap_mb = cand.max_heap_mb;
            cand.best_cost = cost;
            if cost < global_best.cost {
                global_best = BestSnapshot {
                    min_heap_mb: cand.min_heap_mb,
                    max_heap_mb: cand.max_heap_mb,
                    cost,
                };
            }
            debug!(
                min_mb = cand.min_heap_mb,
                max_mb = cand.max_heap_mb,
                cost,
                time_ms = m.duration_ms,
                mem_mb = m.used_memory_mb,
                "Initial candidate evaluated"
            );
        }

        for generation in 0..generations {
            info!(
                generation = generation + 1,
                total = generations,
                best_cost = global_best.cost,
                best_min_mb = global_best.min_heap_mb,
                best_max_mb = global_best.max_heap_mb,
                "Generation start"
            );

            for cand in &mut pop {
                // One (r1, r2) pair shared by both dimensions: the min and
                // max moves of a single update are deliberately correlated.
                let r1: f64 = self.rng.gen();
                let r2: f64 = self.rng.gen();

                let mut pos = [cand.min_heap_mb, cand.max_heap_mb];
                let pbest = [cand.best_min_heap_mb, cand.best_max_heap_mb];
                let gbest = [global_best.min_heap_mb, global_best.max_heap_mb];

                for d in 0..2 {
                    let vel = INERTIA * cand.velocity[d]
                        + COGNITIVE * r1 * (pbest[d] - pos[d]) as f64
                        + SOCIAL * r2 * (gbest[d] - pos[d]) as f64;
                    cand.velocity[d] = vel;
                    pos[d] = (pos[d] as f64 + vel).round() as i64;
                }

                // Chemotactic tumble
                if self.rng.gen::<f64>() < TUMBLE_PROBABILITY {
                    pos[0] += self.rng.gen_range(-TUMBLE_MIN_HEAP_MB..=TUMBLE_MIN_HEAP_MB);
                    pos[1] += self.rng.gen_range(-TUMBLE_MAX_HEAP_MB..=TUMBLE_MAX_HEAP_MB);
                }

                // Repair order matters: min is clamped first so the max
                // clamp can use its final value as a floor.
                pos[0] = pos[0].clamp(low_bound, high_bound);
                pos[1] = pos[1].clamp(pos[0].max(low_bound), high_bound);

                let m = self.oracle.measure(pos[0], pos[1]).await?;
                let cost = self.oracle.cost_of(&m)?;

                if cost < cand.best_cost {
                    cand.best_cost = cost;
                    cand.best_min_heap_mb = pos[0];
                    cand.best_max_heap_mb = pos[1];
                }

                cand.min_heap_mb = pos[0];
                cand.max_heap_mb = pos[1];

                if cost < global_best.cost {
                    global_best = BestSnapshot {
                        min_heap_mb: pos[0],
                        max_heap_mb: pos[1],
                        cost,
                    };
                }

                debug!(
                    min_mb = pos[0],
                    max_mb = pos[1],
                    cost,
                    time_ms = m.duration_ms,
                    mem_mb = m.used_memory_mb,
                    "Candidate evaluated"
                );
            }

            pop = reproduce(pop, population / 2);

            for slot in pop.iter_mut() {
                if self.rng.gen::<f64>() < ELIMINATION_PROBABILITY {
                    *slot = Candidate::random(&mut self.rng, low_bound, high_bound);
                    debug!(
                        min_mb = slot.min_heap_mb,
                        max_mb = slot.max_heap_mb,
                        "Slot eliminated and re-dispersed"
                    );
                }
            }
        }

        // One fresh measurement of the winner so the reported numbers are
        // current, not the possibly-stale values recorded mid-search.
        let m = self
            .oracle
            .measure(global_best.min_heap_mb, global_best.max_heap_mb)
            .await?;
        let cost = self.oracle.cost_of(&m)?;
        Ok(TuningResult {
            min_heap_mb: global_best.min_heap_mb,
            max_heap_mb: global_best.max_heap_mb,
            cost,
            duration_ms: m.duration_ms,
            used_memory_mb: m.used_memory_mb,
        })
    }
}

/// Truncation-selection reproduction: stably sort by personal-best cost,
/// keep the best `keep`, and duplicate each survivor into two fresh slots.
///
/// The rebuilt population has `2 * keep` slots. With an odd population size
/// this is one fewer than before; the working population then stays at
/// `2 * keep` for the rest of the run.
fn reproduce(pop: Vec<Candidate>, keep: usize) -> Vec<Candidate> {
    let mut sorted = pop;
    sorted.sort_by(|a, b| a.best_cost.partial_cmp(&b.best_cost).unwrap_or(Ordering::Equal));
    sorted.truncate(keep);

    let mut next = Vec::with_capacity(keep * 2);
    next.extend(sorted.iter().cloned());
    next.extend(sorted);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_with_cost(min: i64, max: i64, cost: f64) -> Candidate {
        let mut c = Candidate::new(min, max);
        c.best_cost = cost;
        c
    }

    #[test]
    fn reproduction_duplicates_the_best_half() {
        // [a..f] ascending by cost, already shuffled positionally
        let pop = vec![
            candidate_with_cost(500, 900, 3.0), // d
            candidate_with_cost(200, 600, 1.0), // a
            candidate_with_cost(600, 950, 5.0), // e
            candidate_with_cost(300, 700, 2.0), // b
            candidate_with_cost(700, 1000, 6.0), // f
            candidate_with_cost(400, 800, 2.5), // c
        ];

        let next = reproduce(pop, 3);
        assert_eq!(next.len(), 6);

        // [a, b, c, a, b, c]
        let costs: Vec<f64> = next.iter().map(|c| c.best_cost).collect();
        assert_eq!(costs, vec![1.0, 2.0, 2.5, 1.0, 2.0, 2.5]);
        for i in 0..3 {
            assert_eq!(next[i].min_heap_mb, next[i + 3].min_heap_mb);
            assert_eq!(next[i].max_heap_mb, next[i + 3].max_heap_mb);
            assert_eq!(next[i].best_cost, next[i + 3].best_cost);
        }
    }

    #[test]
    fn reproduction_sort_is_stable_for_tied_costs() {
        let mut a = candidate_with_cost(100, 200, 1.0);
        a.velocity = [1.0, 0.0];
        let mut b = candidate_with_cost(300, 400, 1.0);
        b.velocity = [2.0, 0.0];

        let next = reproduce(vec![a, b], 1);
        assert_eq!(next.len(), 2);
        // First-listed candidate wins the tie
        assert_eq!(next[0].min_heap_mb, 100);
        assert_eq!(next[0].velocity, [1.0, 0.0]);
    }

    #[test]
    fn odd_population_shrinks_by_one() {
        let pop = vec![
            candidate_with_cost(100, 200, 1.0),
            candidate_with_cost(100, 200, 2.0),
            candidate_with_cost(100, 200, 3.0),
            candidate_with_cost(100, 200, 4.0),
            candidate_with_cost(100, 200, 5.0),
        ];
        let next = reproduce(pop, 5 / 2);
        assert_eq!(next.len(), 4);
    }

    #[test]
    fn duplicated_slots_are_independent_copies() {
        let pop = vec![
            candidate_with_cost(100, 200, 1.0),
            candidate_with_cost(300, 400, 2.0),
        ];
        let mut next = reproduce(pop, 1);
        next[0].min_heap_mb = 777;
        assert_eq!(next[1].min_heap_mb, 100);
    }
}

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use super::*;

/// Uniform selector backed by any `rand` generator.
#[derive(Clone, Debug)]
pub struct RandomSelector<R = SmallRng> {
    rng: R,
}

impl RandomSelector<SmallRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }
}

impl<R: RngCore> RandomSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> TileSelector for RandomSelector<R> {
    fn draw_from(&mut self, candidates: &[Position], count: CellCount) -> Vec<Position> {
        let total = candidates.len();
        let mut count = usize::from(count);
        if count > total {
            log::warn!(
                "Cannot draw {} distinct tiles out of {}, drawing all of them",
                count,
                total
            );
            count = total;
        }

        // partial Fisher-Yates from the end, only the walked tail is finalized
        let mut pool = candidates.to_vec();
        let stop = total - count;
        for i in (stop..total).rev() {
            let j = self.rng.gen_range(0..=i);
            pool.swap(i, j);
        }
        pool.split_off(stop)
    }

    fn pick(&mut self, candidates: &[Position]) -> Option<Position> {
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.gen_range(0..candidates.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn draw_returns_requested_count_of_distinct_positions() {
        let mut selector = RandomSelector::seeded(7);

        for total in 0..=30u16 {
            for count in 0..=total {
                let drawn = selector.draw(total, count);
                let unique: BTreeSet<_> = drawn.iter().copied().collect();

                assert_eq!(drawn.len(), usize::from(count));
                assert_eq!(unique.len(), drawn.len());
                assert!(drawn.iter().all(|&pos| pos < total));
            }
        }
    }

    #[test]
    fn draw_clamps_oversized_requests() {
        let mut selector = RandomSelector::seeded(1);

        let drawn = selector.draw(4, 9);

        assert_eq!(drawn.len(), 4);
    }

    #[test]
    fn draw_is_close_to_uniform() {
        const TOTAL: u16 = 25;
        const COUNT: u16 = 3;
        const TRIALS: u32 = 20_000;

        let mut selector = RandomSelector::seeded(0xdead_beef);
        let mut hits = [0u32; TOTAL as usize];
        for _ in 0..TRIALS {
            for pos in selector.draw(TOTAL, COUNT) {
                hits[usize::from(pos)] += 1;
            }
        }

        // expected 2400 per tile, allow roughly 6 sigma
        let expected = f64::from(TRIALS) * f64::from(COUNT) / f64::from(TOTAL);
        for (pos, &count) in hits.iter().enumerate() {
            let deviation = (f64::from(count) - expected).abs();
            assert!(
                deviation < expected * 0.12,
                "tile {} hit {} times, expected about {}",
                pos,
                count,
                expected
            );
        }
    }

    #[test]
    fn draw_from_only_uses_candidates() {
        let mut selector = RandomSelector::seeded(3);
        let candidates = [2, 5, 9, 14];

        let drawn = selector.draw_from(&candidates, 2);

        assert_eq!(drawn.len(), 2);
        assert!(drawn.iter().all(|pos| candidates.contains(pos)));
    }

    #[test]
    fn pick_handles_empty_and_single_candidate() {
        let mut selector = RandomSelector::seeded(11);

        assert_eq!(selector.pick(&[]), None);
        assert_eq!(selector.pick(&[17]), Some(17));
    }

    #[test]
    fn same_seed_draws_same_layout() {
        let a = RandomSelector::seeded(42).draw(25, 5);
        let b = RandomSelector::seeded(42).draw(25, 5);

        assert_eq!(a, b);
    }
}

use crate::*;
pub use random::*;

mod random;

/// Source of hazard layouts and random picks for a round.
pub trait TileSelector {
    /// Draws `count` distinct entries of `candidates`, every subset equally likely.
    fn draw_from(&mut self, candidates: &[Position], count: CellCount) -> Vec<Position>;

    /// Picks one entry of `candidates` uniformly, `None` when there is nothing to pick.
    fn pick(&mut self, candidates: &[Position]) -> Option<Position>;

    /// Draws `count` distinct positions out of `0..total`.
    fn draw(&mut self, total: CellCount, count: CellCount) -> Vec<Position> {
        let candidates: Vec<Position> = (0..total).collect();
        self.draw_from(&candidates, count)
    }
}

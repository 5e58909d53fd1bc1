use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use payout::*;
pub use round::*;
pub use store::*;
pub use tile::*;
pub use types::*;
pub use wallet::*;

pub use gemsweep_protocol::RoundSnapshot;

mod engine;
mod error;
mod generator;
mod payout;
mod round;
mod store;
mod tile;
mod types;
mod wallet;

/// Grid shape shared by every round an engine plays.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGameConfig")]
pub struct GameConfig {
    pub total_tiles: CellCount,
}

impl GameConfig {
    pub const DEFAULT_TILES: CellCount = 25;

    pub const fn new_unchecked(total_tiles: CellCount) -> Self {
        Self { total_tiles }
    }

    /// A grid needs room for at least one mine and one gem.
    pub fn new(total_tiles: CellCount) -> Self {
        Self::new_unchecked(total_tiles.clamp(2, CellCount::MAX))
    }

    pub const fn max_hazards(&self) -> CellCount {
        self.total_tiles.saturating_sub(1)
    }

    /// Clamps a requested mine count into `1..=total_tiles - 1`.
    pub fn clamp_hazards(&self, requested: i64) -> CellCount {
        let max = self.max_hazards().max(1);
        let clamped = requested.clamp(1, i64::from(max));
        if clamped != requested {
            log::warn!(
                "Mine count {} out of range, using {} (allowed 1..={})",
                requested,
                clamped,
                max
            );
        }
        CellCount::try_from(clamped).unwrap_or(max)
    }

    pub fn contains(&self, position: Position) -> bool {
        position < self.total_tiles
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(Self::DEFAULT_TILES)
    }
}

#[derive(Deserialize)]
struct RawGameConfig {
    total_tiles: CellCount,
}

impl From<RawGameConfig> for GameConfig {
    fn from(raw: RawGameConfig) -> Self {
        Self::new(raw.total_tiles)
    }
}

/// Secret mine placement for one round, fixed once the round starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardLayout {
    mine_mask: Vec<bool>,
    positions: Vec<Position>,
}

impl HazardLayout {
    pub fn from_positions(total_tiles: CellCount, positions: &[Position]) -> Result<Self> {
        let mut mine_mask = vec![false; usize::from(total_tiles)];
        let mut unique = Vec::with_capacity(positions.len());

        for &position in positions {
            let slot = mine_mask
                .get_mut(usize::from(position))
                .ok_or(GameError::InvalidPosition)?;
            if !*slot {
                *slot = true;
                unique.push(position);
            }
        }

        Ok(Self {
            mine_mask,
            positions: unique,
        })
    }

    pub fn total_tiles(&self) -> CellCount {
        CellCount::try_from(self.mine_mask.len()).unwrap_or(CellCount::MAX)
    }

    pub fn mine_count(&self) -> CellCount {
        CellCount::try_from(self.positions.len()).unwrap_or(CellCount::MAX)
    }

    pub fn safe_tile_count(&self) -> CellCount {
        self.total_tiles().saturating_sub(self.mine_count())
    }

    pub fn contains_mine(&self, position: Position) -> bool {
        self.mine_mask
            .get(usize::from(position))
            .copied()
            .unwrap_or(false)
    }

    /// Mine positions in draw order.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }
}

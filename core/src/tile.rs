use serde::{Deserialize, Serialize};

use crate::Position;

/// True identity of a tile, only handed out once a round settles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Gem,
    Mine,
}

impl TileKind {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

/// One entry of the settlement grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileReveal {
    pub position: Position,
    pub kind: TileKind,
    /// Whether the player opened this tile, as opposed to it being shown at settlement.
    pub picked: bool,
}

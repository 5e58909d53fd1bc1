use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Idle -> Active
/// - Active -> HazardHit
/// - Active -> CashedOut
/// - HazardHit -> Idle
/// - CashedOut -> Idle
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    #[default]
    Idle,
    Active,
    HazardHit,
    CashedOut,
}

impl RoundStatus {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Round is over and waiting for the settlement display to be dismissed.
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::HazardHit | Self::CashedOut)
    }
}

/// The single live round owned by an engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoundState {
    bet: Amount,
    hazard_count: CellCount,
    layout: Option<HazardLayout>,
    revealed: Vec<Position>,
    status: RoundStatus,
}

impl RoundState {
    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn bet(&self) -> Amount {
        self.bet
    }

    pub fn hazard_count(&self) -> CellCount {
        self.hazard_count
    }

    /// Revealed positions in reveal order.
    pub fn revealed(&self) -> &[Position] {
        &self.revealed
    }

    pub fn is_revealed(&self, position: Position) -> bool {
        self.revealed.contains(&position)
    }

    pub fn has_hazard_at(&self, position: Position) -> bool {
        self.layout
            .as_ref()
            .is_some_and(|layout| layout.contains_mine(position))
    }

    pub fn hazard_positions(&self) -> &[Position] {
        self.layout
            .as_ref()
            .map(HazardLayout::positions)
            .unwrap_or_default()
    }

    pub fn safe_revealed_count(&self) -> CellCount {
        let count = self
            .revealed
            .iter()
            .filter(|&&pos| !self.has_hazard_at(pos))
            .count();
        CellCount::try_from(count).unwrap_or(CellCount::MAX)
    }

    /// Gems still hidden on the board.
    pub fn gems_left(&self) -> CellCount {
        self.layout.as_ref().map_or(0, |layout| {
            layout
                .safe_tile_count()
                .saturating_sub(self.safe_revealed_count())
        })
    }

    pub fn unrevealed(&self, total_tiles: CellCount) -> Vec<Position> {
        (0..total_tiles)
            .filter(|&pos| !self.is_revealed(pos))
            .collect()
    }

    /// Every tile's identity, marking the ones the player opened.
    pub fn full_grid(&self, total_tiles: CellCount) -> Vec<TileReveal> {
        (0..total_tiles)
            .map(|position| TileReveal {
                position,
                kind: if self.has_hazard_at(position) {
                    TileKind::Mine
                } else {
                    TileKind::Gem
                },
                picked: self.is_revealed(position),
            })
            .collect()
    }

    pub fn to_snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            amount: self.bet.to_decimal(),
            mine_indices: self
                .hazard_positions()
                .iter()
                .map(|&pos| i64::from(pos))
                .collect(),
            clicked_indices: self.revealed.iter().map(|&pos| i64::from(pos)).collect(),
            mine_hit: self.revealed.iter().any(|&pos| self.has_hazard_at(pos)),
            mine_count: Some(i64::from(self.hazard_count)),
        }
    }

    pub(crate) fn start(&mut self, bet: Amount, hazard_count: CellCount, layout: HazardLayout) {
        self.bet = bet;
        self.hazard_count = hazard_count;
        self.layout = Some(layout);
        self.revealed.clear();
        self.status = RoundStatus::Active;
    }

    pub(crate) fn resume(
        &mut self,
        bet: Amount,
        hazard_count: CellCount,
        layout: HazardLayout,
        revealed: Vec<Position>,
    ) {
        self.start(bet, hazard_count, layout);
        self.revealed = revealed;
    }

    /// Records a reveal and reports what was underneath.
    pub(crate) fn push_reveal(&mut self, position: Position) -> TileKind {
        self.revealed.push(position);
        if self.has_hazard_at(position) {
            TileKind::Mine
        } else {
            TileKind::Gem
        }
    }

    /// Ends the round; the stake has either been paid out or forfeited by now.
    pub(crate) fn settle(&mut self, status: RoundStatus) {
        debug_assert!(status.is_settled());
        self.status = status;
        self.bet = Amount::ZERO;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

use serde::{Deserialize, Serialize};

use crate::*;

/// Gem multipliers in hundredths, indexed by safe tiles revealed. Index zero carries no payout.
const GEM_MULTIPLIERS: [u32; 25] = [
    0, 103, 108, 112, 118, 124, 130, 137, 146, 155, 165, 177, 190, 206, 225, 247, 275, 309, 354,
    413, 495, 619, 825, 1238, 2475,
];

/// Cumulative multiplier per safe reveal. The same table applies whatever the mine count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayoutTable {
    multipliers: Vec<Multiplier>,
}

impl PayoutTable {
    /// Custom table, must be non-empty and non-decreasing after the unused first entry.
    pub fn new(multipliers: Vec<Multiplier>) -> Result<Self> {
        if multipliers.is_empty() {
            return Err(GameError::InvalidPayoutTable);
        }
        if multipliers.iter().skip(1).zip(multipliers.iter().skip(2)).any(|(a, b)| a > b) {
            return Err(GameError::InvalidPayoutTable);
        }
        Ok(Self { multipliers })
    }

    pub fn multiplier_for(&self, safe_revealed: CellCount) -> Multiplier {
        match self.multipliers.get(usize::from(safe_revealed)) {
            Some(&multiplier) => multiplier,
            None => {
                log::warn!(
                    "No multiplier for {} safe reveals, table only covers {}",
                    safe_revealed,
                    self.max_safe_reveals()
                );
                Multiplier::ZERO
            }
        }
    }

    /// Multiplier to show the player, `1.00x` before anything is revealed.
    pub fn display_multiplier(&self, safe_revealed: CellCount) -> Multiplier {
        if safe_revealed == 0 {
            Multiplier::ONE
        } else {
            self.multiplier_for(safe_revealed)
        }
    }

    /// Net winnings on top of the stake, never negative.
    pub fn profit(&self, bet: Amount, safe_revealed: CellCount) -> Amount {
        if safe_revealed == 0 {
            return Amount::ZERO;
        }
        self.multiplier_for(safe_revealed)
            .apply(bet)
            .saturating_sub(bet)
    }

    pub fn max_safe_reveals(&self) -> CellCount {
        CellCount::try_from(self.multipliers.len().saturating_sub(1)).unwrap_or(CellCount::MAX)
    }
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self {
            multipliers: GEM_MULTIPLIERS
                .iter()
                .copied()
                .map(Multiplier::from_hundredths)
                .collect(),
        }
    }
}

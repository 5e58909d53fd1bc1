use serde::{Deserialize, Serialize};

use crate::*;

/// What the presentation layer needs after each engine call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub safe_revealed_count: CellCount,
    pub profit: Amount,
    pub multiplier: Multiplier,
    pub status: RoundStatus,
    /// Full board, only present once the round has settled.
    pub revealed_grid: Option<Vec<TileReveal>>,
}

impl RoundOutcome {
    pub fn is_settled(&self) -> bool {
        self.status.is_settled()
    }
}

/// Drives a single round at a time against a wallet and a snapshot store.
#[derive(Debug)]
pub struct RoundEngine<W, S, T = RandomSelector> {
    config: GameConfig,
    payouts: PayoutTable,
    wallet: W,
    store: S,
    selector: T,
    round: RoundState,
}

impl<W, S, T> RoundEngine<W, S, T>
where
    W: Wallet,
    S: KeyValueStore,
    T: TileSelector,
{
    /// Fails with [`GameError::InvalidPayoutTable`] when the table cannot price every safe tile
    /// the grid can hold.
    pub fn new(
        config: GameConfig,
        payouts: PayoutTable,
        wallet: W,
        store: S,
        selector: T,
    ) -> Result<Self> {
        let max_safe = config.total_tiles.saturating_sub(1);
        if payouts.max_safe_reveals() < max_safe {
            log::error!(
                "payout table covers {} safe reveals but the grid allows {}",
                payouts.max_safe_reveals(),
                max_safe
            );
            return Err(GameError::InvalidPayoutTable);
        }

        Ok(Self {
            config,
            payouts,
            wallet,
            store,
            selector,
            round: RoundState::default(),
        })
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn payouts(&self) -> &PayoutTable {
        &self.payouts
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn status(&self) -> RoundStatus {
        self.round.status()
    }

    pub fn bet(&self) -> Amount {
        self.round.bet()
    }

    pub fn hazard_count(&self) -> CellCount {
        self.round.hazard_count()
    }

    pub fn revealed(&self) -> &[Position] {
        self.round.revealed()
    }

    pub fn gems_left(&self) -> CellCount {
        self.round.gems_left()
    }

    pub fn has_hazard_at(&self, position: Position) -> bool {
        self.round.has_hazard_at(position)
    }

    /// Current count, multiplier and profit without changing anything.
    pub fn current_outcome(&self) -> RoundOutcome {
        let safe_revealed_count = self.round.safe_revealed_count();
        RoundOutcome {
            safe_revealed_count,
            profit: self.payouts.profit(self.round.bet(), safe_revealed_count),
            multiplier: self.payouts.display_multiplier(safe_revealed_count),
            status: self.round.status(),
            revealed_grid: None,
        }
    }

    /// Starts a round from raw decimal input.
    pub fn place_bet(&mut self, amount: f64, hazard_count: CellCount) -> Result<RoundOutcome> {
        let amount = Amount::from_decimal(amount)?;
        self.place_bet_amount(amount, hazard_count)
    }

    /// Starts a round. A settled round still on display is dismissed first.
    pub fn place_bet_amount(
        &mut self,
        amount: Amount,
        hazard_count: CellCount,
    ) -> Result<RoundOutcome> {
        if self.round.status().is_active() {
            return Err(GameError::StateConflict("a round is already in progress"));
        }

        let available = self.wallet.balance();
        if amount > available {
            return Err(GameError::InsufficientFunds {
                needed: amount,
                available,
            });
        }

        let hazard_count = self.config.clamp_hazards(i64::from(hazard_count));
        let positions = self.selector.draw(self.config.total_tiles, hazard_count);
        let layout = HazardLayout::from_positions(self.config.total_tiles, &positions)?;

        self.wallet.debit(amount)?;
        self.round.reset();
        self.round.start(amount, hazard_count, layout);
        self.persist();

        log::debug!("bet placed: {} with {} mines", amount, hazard_count);
        Ok(self.current_outcome())
    }

    pub fn reveal_tile(&mut self, position: Position) -> Result<RoundOutcome> {
        self.check_active()?;
        if !self.config.contains(position) {
            return Err(GameError::InvalidPosition);
        }
        if self.round.is_revealed(position) {
            return Err(GameError::StateConflict("tile already revealed"));
        }

        let kind = self.round.push_reveal(position);
        self.persist();

        match kind {
            TileKind::Mine => {
                log::debug!("mine hit at {}", position);
                Ok(self.settle_forfeit())
            }
            TileKind::Gem => {
                let outcome = self.current_outcome();
                log::debug!(
                    "gem at {}: {} safe, profit {}",
                    position,
                    outcome.safe_revealed_count,
                    outcome.profit
                );
                Ok(outcome)
            }
        }
    }

    /// Reveals a uniformly chosen hidden tile, `None` once nothing is left to reveal.
    pub fn pick_random_unrevealed(&mut self) -> Result<Option<RoundOutcome>> {
        self.check_active()?;
        let candidates = self.round.unrevealed(self.config.total_tiles);
        match self.selector.pick(&candidates) {
            Some(position) => self.reveal_tile(position).map(Some),
            None => Ok(None),
        }
    }

    /// Pays out stake plus profit and settles the round.
    pub fn cash_out(&mut self) -> Result<RoundOutcome> {
        self.check_active()?;

        let safe_revealed_count = self.round.safe_revealed_count();
        let bet = self.round.bet();
        let profit = self.payouts.profit(bet, safe_revealed_count);
        self.wallet.credit(bet.saturating_add(profit))?;

        let revealed_grid = self.round.full_grid(self.config.total_tiles);
        self.round.settle(RoundStatus::CashedOut);
        self.clear_snapshot();

        log::debug!(
            "cashed out {} + {} after {} gems",
            bet,
            profit,
            safe_revealed_count
        );
        Ok(RoundOutcome {
            safe_revealed_count,
            profit,
            multiplier: self.payouts.display_multiplier(safe_revealed_count),
            status: RoundStatus::CashedOut,
            revealed_grid: Some(revealed_grid),
        })
    }

    /// Dismisses a settled round so the board can be cleared.
    pub fn acknowledge_settlement(&mut self) -> Result<()> {
        match self.round.status() {
            RoundStatus::Idle => Ok(()),
            RoundStatus::Active => Err(GameError::StateConflict("round has not settled")),
            RoundStatus::HazardHit | RoundStatus::CashedOut => {
                self.round.reset();
                Ok(())
            }
        }
    }

    /// Loads a persisted round at start-up, if there is one.
    pub fn restore(&mut self) -> Result<Option<RoundOutcome>> {
        match self.store.load::<RoundSnapshot>() {
            Ok(Some(snapshot)) => match self.recover_from_snapshot(&snapshot) {
                Err(GameError::CorruptSnapshot) => {
                    log::error!("discarding unrecoverable round snapshot: {:?}", snapshot);
                    self.clear_snapshot();
                    Ok(None)
                }
                recovered => recovered,
            },
            Ok(None) => Ok(None),
            Err(err) => {
                log::error!("discarding unreadable round snapshot: {}", err);
                self.clear_snapshot();
                Ok(None)
            }
        }
    }

    /// Best-effort repair of a persisted round; the stake was already debited before the restart.
    pub fn recover_from_snapshot(
        &mut self,
        snapshot: &RoundSnapshot,
    ) -> Result<Option<RoundOutcome>> {
        if self.round.status().is_active() {
            return Err(GameError::StateConflict("a round is already in progress"));
        }
        if !snapshot.has_round() {
            return Ok(None);
        }

        let bet = Amount::from_decimal(snapshot.amount).map_err(|_| GameError::CorruptSnapshot)?;
        let total = self.config.total_tiles;
        let mine_indices = self.sanitize_positions(&snapshot.mine_indices);
        let mut revealed = self.sanitize_positions(&snapshot.clicked_indices);

        let requested = match snapshot.mine_count {
            Some(count) if count != 0 => count,
            _ if !mine_indices.is_empty() => mine_indices.len() as i64,
            _ => 1,
        };
        let hazard_count = self.config.clamp_hazards(requested);

        let mut positions: Vec<Position> = mine_indices
            .into_iter()
            .take(usize::from(hazard_count))
            .collect();
        if positions.len() != usize::from(hazard_count) {
            log::warn!(
                "{}: {} mines stored for a count of {}, redrawing",
                GameError::CorruptSnapshot,
                positions.len(),
                hazard_count
            );
            revealed.truncate(usize::from(total.saturating_sub(hazard_count)));
            let candidates: Vec<Position> = (0..total)
                .filter(|pos| !revealed.contains(pos))
                .collect();
            positions = self.selector.draw_from(&candidates, hazard_count);
        }
        let layout = HazardLayout::from_positions(total, &positions)?;

        self.round.reset();
        self.round.resume(bet, hazard_count, layout, revealed);

        let hit = self
            .round
            .revealed()
            .iter()
            .any(|&pos| self.round.has_hazard_at(pos));
        if snapshot.mine_hit || hit {
            log::warn!("recovered round had already hit a mine, forfeiting");
            return Ok(Some(self.settle_forfeit()));
        }

        self.persist();
        let outcome = self.current_outcome();
        log::debug!(
            "recovered round: bet {}, {} mines, {} revealed",
            bet,
            hazard_count,
            self.round.revealed().len()
        );
        Ok(Some(outcome))
    }

    fn settle_forfeit(&mut self) -> RoundOutcome {
        let safe_revealed_count = self.round.safe_revealed_count();
        let revealed_grid = self.round.full_grid(self.config.total_tiles);
        self.round.settle(RoundStatus::HazardHit);
        self.clear_snapshot();

        RoundOutcome {
            safe_revealed_count,
            profit: Amount::ZERO,
            multiplier: Multiplier::ZERO,
            status: RoundStatus::HazardHit,
            revealed_grid: Some(revealed_grid),
        }
    }

    /// In-range positions in their original order, first occurrence wins.
    fn sanitize_positions(&self, raw: &[i64]) -> Vec<Position> {
        let mut positions = Vec::with_capacity(raw.len());
        for &index in raw {
            match Position::try_from(index) {
                Ok(pos) if self.config.contains(pos) && !positions.contains(&pos) => {
                    positions.push(pos)
                }
                _ => log::warn!("dropping stored tile index {}", index),
            }
        }
        positions
    }

    fn check_active(&self) -> Result<()> {
        if self.round.status().is_active() {
            Ok(())
        } else {
            Err(GameError::StateConflict("no active round"))
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.round.to_snapshot()) {
            log::error!("failed to save round snapshot: {}", err);
        }
    }

    fn clear_snapshot(&mut self) {
        if let Err(err) = self.store.clear::<RoundSnapshot>() {
            log::error!("failed to clear round snapshot: {}", err);
        }
    }
}

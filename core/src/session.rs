use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Active -> Won (cash out or every safe cell revealed)
/// - Active -> Lost (bomb revealed)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Active,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// What a driver or UI needs to render the round after a transition.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub revealed_safe_count: CellCount,
    pub hints_bought: u32,
    pub current_multiplier: f64,
    pub current_winnings: Credits,
    pub balance: Credits,
    pub stake: Credits,
    pub hint_spend: Credits,
}

/// One round of play, from the stake being placed to a win or a loss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    config: GameConfig,
    rules: PayoutRules,
    layout: MineLayout,
    board: Array2<Cell>,
    hints: Array2<Option<u8>>,
    revealed_safe: CellCount,
    hints_bought: u32,
    hint_spend: Credits,
    multiplier: f64,
    winnings: Credits,
    balance: Credits,
    state: SessionState,
    hint_selection_pending: bool,
    triggered_bomb: Option<Coord2>,
}

impl Session {
    /// Places the stake and lays out the bombs. `balance` is what the player holds
    /// before staking; the stake is deducted immediately.
    pub fn start(
        balance: Credits,
        config: GameConfig,
        rules: PayoutRules,
        generator: impl LayoutGenerator,
    ) -> Result<Self> {
        config.validate(balance)?;

        let layout = generator.generate(&config);
        if layout.size() != config.size || layout.bomb_count() != config.bombs {
            return Err(SessionError::InvalidConfiguration(
                "bomb layout does not match the requested board",
            ));
        }

        let size = config.size.to_nd_index();
        let mut session = Self {
            config,
            rules,
            layout,
            board: Array2::default(size),
            hints: Array2::default(size),
            revealed_safe: 0,
            hints_bought: 0,
            hint_spend: 0.0,
            multiplier: 0.0,
            winnings: 0.0,
            balance: round2(balance - config.stake),
            state: SessionState::Active,
            hint_selection_pending: false,
            triggered_bomb: None,
        };
        session.multiplier = session.multiplier_at(0);

        log::debug!(
            "Round started: stake {:.2}, {} bombs, balance {:.2}",
            config.stake,
            config.bombs,
            session.balance
        );
        Ok(session)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rules(&self) -> &PayoutRules {
        &self.rules
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.layout.size()
    }

    pub fn total_cells(&self) -> CellCount {
        self.layout.total_cells()
    }

    pub fn bomb_count(&self) -> CellCount {
        self.layout.bomb_count()
    }

    pub fn stake(&self) -> Credits {
        self.config.stake
    }

    pub fn balance(&self) -> Credits {
        self.balance
    }

    pub fn winnings(&self) -> Credits {
        self.winnings
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.revealed_safe
    }

    pub fn hints_bought(&self) -> u32 {
        self.hints_bought
    }

    pub fn hint_spend(&self) -> Credits {
        self.hint_spend
    }

    /// Cells still face down, bombs included.
    pub fn hidden_count(&self) -> CellCount {
        self.board.iter().filter(|cell| cell.is_hidden()).count() as CellCount
    }

    /// Fails with [`SessionError::InvalidCell`] outside the board.
    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.layout.validate_coords(coords)?;
        Ok(self.board[coords.to_nd_index()])
    }

    pub fn board(&self) -> &Array2<Cell> {
        &self.board
    }

    /// Bomb count disclosed by a purchased hint on this cell. `None` when no hint was
    /// bought there, or the cell is off the board.
    pub fn hint_at(&self, coords: Coord2) -> Option<u8> {
        self.hints.get(coords.to_nd_index()).copied().flatten()
    }

    pub fn triggered_bomb(&self) -> Option<Coord2> {
        self.triggered_bomb
    }

    pub fn is_hint_selection_pending(&self) -> bool {
        self.hint_selection_pending
    }

    /// Bomb positions, only once the round is over.
    pub fn disclosed_bombs(&self) -> Vec<Coord2> {
        if self.is_finished() {
            self.layout.bomb_coords().collect()
        } else {
            Vec::new()
        }
    }

    pub(crate) fn layout(&self) -> &MineLayout {
        &self.layout
    }

    /// RTP currently applied to the multiplier curve.
    pub fn adjusted_rtp(&self) -> f64 {
        self.rules
            .adjusted_rtp(self.hints_bought, self.total_cells(), self.bomb_count())
    }

    /// Multiplier paid after `revealed` safe cells under the current RTP.
    pub fn multiplier_at(&self, revealed: CellCount) -> f64 {
        compute_multiplier(
            self.adjusted_rtp(),
            revealed,
            self.total_cells(),
            self.bomb_count(),
        )
    }

    /// Multiplier the next safe reveal would pay, if a safe cell is left.
    pub fn next_multiplier(&self) -> Option<f64> {
        let next = self.revealed_safe + 1;
        (self.state.is_active() && next <= self.layout.safe_cell_count())
            .then(|| self.multiplier_at(next))
    }

    /// Winnings the next safe reveal would pay.
    pub fn potential_win(&self) -> Option<Credits> {
        self.next_multiplier()
            .map(|multiplier| multiplier * self.config.stake)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            revealed_safe_count: self.revealed_safe,
            hints_bought: self.hints_bought,
            current_multiplier: self.multiplier,
            current_winnings: self.winnings,
            balance: self.balance,
            stake: self.config.stake,
            hint_spend: self.hint_spend,
        }
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<SessionSnapshot> {
        let coords = self.layout.validate_coords(coords)?;
        self.check_active()?;

        if !self.board[coords.to_nd_index()].is_hidden() {
            return Err(SessionError::InvalidCell);
        }

        if self.layout.contains_bomb(coords) {
            log::debug!("Bomb at {:?}, round lost", coords);
            self.board[coords.to_nd_index()] = Cell::RevealedBomb;
            self.triggered_bomb = Some(coords);
            self.winnings = 0.0;
            self.end_round(false);
        } else {
            self.board[coords.to_nd_index()] = Cell::RevealedSafe;
            self.revealed_safe += 1;
            self.multiplier = self.multiplier_at(self.revealed_safe);
            self.winnings = round2(self.multiplier * self.config.stake);
            log::debug!(
                "Safe at {:?}: {} revealed, x{:.4}, winnings {:.2}",
                coords,
                self.revealed_safe,
                self.multiplier,
                self.winnings
            );

            if self.revealed_safe == self.layout.safe_cell_count() {
                self.end_round(true);
            }
        }

        Ok(self.snapshot())
    }

    pub fn cash_out(&mut self) -> Result<SessionSnapshot> {
        self.check_active()?;
        if self.revealed_safe == 0 {
            return Err(SessionError::NothingRevealedYet);
        }
        if self.hint_selection_pending {
            return Err(SessionError::PendingHintSelection);
        }

        self.end_round(true);
        Ok(self.snapshot())
    }

    /// Opens hint selection, returning a priced quote per candidate.
    pub fn begin_hint_selection(&mut self) -> Result<Vec<HintQuote>> {
        self.check_active()?;
        if self.revealed_safe == 0 {
            return Err(SessionError::NothingRevealedYet);
        }

        let quotes: Vec<_> = self.hint_pricing().quotes().collect();
        if quotes.is_empty() {
            return Err(SessionError::NoHintCandidates);
        }

        self.hint_selection_pending = true;
        Ok(quotes)
    }

    /// Closes a pending hint selection free of charge. Returns whether one was open.
    pub fn cancel_hint_selection(&mut self) -> bool {
        core::mem::take(&mut self.hint_selection_pending)
    }

    /// Buys a hint on `coords` at its current quoted price.
    pub fn buy_hint(&mut self, coords: Coord2) -> Result<SessionSnapshot> {
        self.check_active()?;
        let candidate = self
            .hint_candidate(coords)
            .ok_or(SessionError::InvalidCell)?;
        let quote = self.hint_pricing().quote(&candidate);
        self.buy_hint_at(coords, quote.cost)
    }

    /// Buys a hint on `coords` at a previously offered price.
    ///
    /// The price comes out of the current winnings. The board and the bomb layout
    /// are left untouched; only the disclosed count is remembered.
    pub fn buy_hint_at(&mut self, coords: Coord2, offered_cost: Credits) -> Result<SessionSnapshot> {
        let coords = self.layout.validate_coords(coords)?;
        self.check_active()?;
        let candidate = self
            .hint_candidate(coords)
            .ok_or(SessionError::InvalidCell)?;

        if !offered_cost.is_finite() || offered_cost < 0.0 {
            return Err(SessionError::InvalidConfiguration(
                "hint cost must be a finite, non-negative amount",
            ));
        }
        if self.winnings < offered_cost {
            return Err(SessionError::InsufficientCredits);
        }

        self.winnings = round2(self.winnings - offered_cost);
        self.hint_spend = round2(self.hint_spend + offered_cost);
        self.hints[coords.to_nd_index()] = Some(candidate.local_bomb_count);
        self.hints_bought = self.hints_bought.saturating_add(1);
        self.hint_selection_pending = false;

        log::debug!(
            "Hint at {:?} for {:.2}: {} bombs nearby, rtp now {:.4}",
            coords,
            offered_cost,
            candidate.local_bomb_count,
            self.adjusted_rtp()
        );
        Ok(self.snapshot())
    }

    fn end_round(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.hint_selection_pending = false;
        if won {
            self.state = SessionState::Won;
            self.balance = round2(self.balance + self.winnings);
            log::debug!(
                "Round won: credited {:.2}, balance {:.2}",
                self.winnings,
                self.balance
            );
        } else {
            self.state = SessionState::Lost;
            for coords in self.layout.bomb_coords() {
                self.board[coords.to_nd_index()] = Cell::RevealedBomb;
            }
            log::debug!("Round lost, balance {:.2}", self.balance);
        }
    }

    fn check_active(&self) -> Result<()> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(SessionError::AlreadyEnded)
        }
    }
}

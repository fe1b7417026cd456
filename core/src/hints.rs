use serde::{Deserialize, Serialize};

use crate::*;

/// How the uncertainty left after a hint is estimated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntropyModel {
    /// The hint reveals the true number of bombs `K` among the candidate's hidden
    /// neighbours, with `K` hypergeometric over all hidden cells.
    ///
    /// Both terms differ from [`EntropyModel::Legacy`]: the entropy before the hint
    /// is the global density `H(bombs / hidden)` ([`HintPricing::prior_entropy`]),
    /// not the neighbourhood estimate [`HintPricing::entropy`], and the entropy after
    /// is `Σ P(K = k) · H(k / u)`. Both are per hidden cell, so the gain always lies
    /// in `[0, 1]`.
    #[default]
    Hypergeometric,
    /// Earlier pricing, kept for compatibility. Its outcome weights sum to one over
    /// the true local count and are applied to the same entropy, so the discount is
    /// always zero and every hint costs the base price.
    Legacy,
}

/// A revealed safe cell that still borders at least one hidden cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintCandidate {
    pub coords: Coord2,
    /// Bombs in the 8-neighbourhood.
    pub local_bomb_count: u8,
    pub hidden_neighbors: u8,
    /// In-bounds neighbours, hidden or not.
    pub total_neighbors: u8,
}

impl HintCandidate {
    pub const fn row(&self) -> Coord {
        self.coords.0
    }

    pub const fn col(&self) -> Coord {
        self.coords.1
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HintQuote {
    pub candidate: HintCandidate,
    /// Price in credits, rounded to cents.
    pub cost: Credits,
}

/// Shannon entropy of a single yes/no outcome, in bits.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -p * p.log2() - (1.0 - p) * (1.0 - p).log2()
}

impl Session {
    /// Cells a hint can currently be bought on, in row-major order.
    ///
    /// Computed from the board on every call; yields nothing once the round is over.
    pub fn hint_candidates(&self) -> impl Iterator<Item = HintCandidate> + '_ {
        let active = self.state().is_active();
        self.board()
            .indexed_iter()
            .filter(move |(_, cell)| active && cell.is_revealed_safe())
            .filter_map(move |((row, col), _)| self.candidate_at((row as Coord, col as Coord)))
    }

    /// The candidate at `coords`, if a hint can be bought there right now.
    pub fn hint_candidate(&self, coords: Coord2) -> Option<HintCandidate> {
        let coords = self.layout().validate_coords(coords).ok()?;
        if !self.state().is_active() || !self.board()[coords.to_nd_index()].is_revealed_safe() {
            return None;
        }
        self.candidate_at(coords)
    }

    pub fn hint_pricing(&self) -> HintPricing<'_> {
        HintPricing { session: self }
    }

    fn candidate_at(&self, coords: Coord2) -> Option<HintCandidate> {
        let mut hidden_neighbors = 0;
        let mut total_neighbors = 0;
        for pos in self.board().iter_neighbors(coords) {
            total_neighbors += 1;
            if self.board()[pos.to_nd_index()].is_hidden() {
                hidden_neighbors += 1;
            }
        }

        (hidden_neighbors > 0).then(|| HintCandidate {
            coords,
            local_bomb_count: self.layout().adjacent_bomb_count(coords),
            hidden_neighbors,
            total_neighbors,
        })
    }
}

/// Prices hints against the current state of a session.
#[derive(Copy, Clone, Debug)]
pub struct HintPricing<'a> {
    session: &'a Session,
}

impl<'a> HintPricing<'a> {
    /// Share of the next potential win, the same for every candidate.
    pub fn base_cost(&self) -> Credits {
        let session = self.session;
        session.multiplier_at(session.revealed_safe_count() + 1)
            * session.stake()
            * session.rules().hint_base_cost_factor
    }

    /// Entropy of a hidden neighbour assuming as many of them hold bombs as the
    /// board allows.
    pub fn entropy(&self, candidate: &HintCandidate) -> f64 {
        let hidden = CellCount::from(candidate.hidden_neighbors);
        if hidden == 0 {
            return 0.0;
        }
        let max_bombs = hidden.min(self.session.bomb_count());
        binary_entropy(f64::from(max_bombs) / f64::from(hidden))
    }

    /// Entropy of any hidden cell before the hint, from the global bomb density.
    pub fn prior_entropy(&self) -> f64 {
        let hidden = self.session.hidden_count();
        if hidden == 0 {
            return 0.0;
        }
        binary_entropy(f64::from(self.session.bomb_count()) / f64::from(hidden))
    }

    /// [`Self::prior_entropy`] under the hypergeometric model, [`Self::entropy`]
    /// under the legacy one.
    pub fn entropy_before(&self, candidate: &HintCandidate) -> f64 {
        match self.session.rules().entropy_model {
            EntropyModel::Hypergeometric => self.prior_entropy(),
            EntropyModel::Legacy => self.entropy(candidate),
        }
    }

    pub fn expected_entropy_after(&self, candidate: &HintCandidate) -> f64 {
        match self.session.rules().entropy_model {
            EntropyModel::Hypergeometric => self.hypergeometric_entropy_after(candidate),
            EntropyModel::Legacy => self.legacy_entropy_after(candidate),
        }
    }

    fn hypergeometric_entropy_after(&self, candidate: &HintCandidate) -> f64 {
        let hidden = self.session.hidden_count();
        let bombs = self.session.bomb_count();
        let draws = CellCount::from(candidate.hidden_neighbors);
        if draws == 0 || bombs > hidden || draws > hidden {
            return 0.0;
        }

        let safe = hidden - bombs;
        let lowest = draws.saturating_sub(safe);
        let highest = draws.min(bombs);
        let outcomes = combination(hidden, draws);

        (lowest..=highest)
            .map(|k| {
                let weight = combination(bombs, k) * combination(safe, draws - k) / outcomes;
                weight * binary_entropy(f64::from(k) / f64::from(draws))
            })
            .sum()
    }

    fn legacy_entropy_after(&self, candidate: &HintCandidate) -> f64 {
        let neighbors = CellCount::from(candidate.total_neighbors);
        let local = CellCount::from(candidate.local_bomb_count);
        let choose = |n: CellCount, k: CellCount| if k > n { 0.0 } else { combination(n, k) };

        let total_weight: f64 = (0..=local)
            .map(|i| {
                choose(local, i) * choose(neighbors - local, neighbors - i)
                    / choose(neighbors, neighbors)
            })
            .sum();
        total_weight * self.entropy(candidate)
    }

    /// Fraction of the uncertainty the hint is expected to remove.
    pub fn information_gain_factor(&self, candidate: &HintCandidate) -> f64 {
        let before = self.entropy_before(candidate);
        if before == 0.0 {
            return 0.0;
        }
        (before - self.expected_entropy_after(candidate)) / before
    }

    /// Base cost discounted by the information gain. Degenerate results fall back to
    /// the base cost so the price is always finite and non-negative.
    pub fn hint_cost(&self, candidate: &HintCandidate) -> Credits {
        let base = self.base_cost();
        let gain = self.information_gain_factor(candidate);
        let cost = base * (1.0 - gain);
        log::trace!(
            "Hint at row {} col {}: base {:.4}, gain {:.4}, cost {:.4}",
            candidate.row(),
            candidate.col(),
            base,
            gain,
            cost
        );
        if cost.is_finite() && cost >= 0.0 {
            cost
        } else {
            base
        }
    }

    pub fn quote(&self, candidate: &HintCandidate) -> HintQuote {
        HintQuote {
            candidate: *candidate,
            cost: round2(self.hint_cost(candidate)),
        }
    }

    pub fn quotes(&self) -> impl Iterator<Item = HintQuote> + 'a {
        let pricing = *self;
        self.session
            .hint_candidates()
            .map(move |candidate| pricing.quote(&candidate))
    }

    /// Mean price over all candidates, as shown on the hint button.
    pub fn average_hint_cost(&self) -> Option<Credits> {
        let (total, count) = self
            .session
            .hint_candidates()
            .map(|candidate| self.hint_cost(&candidate))
            .filter(|cost| cost.is_finite())
            .fold((0.0, 0u32), |(total, count), cost| (total + cost, count + 1));
        (count > 0).then(|| round2(total / f64::from(count)))
    }
}

use core::fmt;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Next move requested by a [`DecisionPolicy`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Reveal,
    BuyHint,
    CashOut,
}

/// Automated player used by the simulation harness.
///
/// Policies only see what a player sees: the session's public state, never the
/// bomb layout.
pub trait DecisionPolicy {
    /// Name used for logging and reports.
    fn name(&self) -> &'static str;

    fn decide(&mut self, session: &Session) -> Decision;

    /// Hidden cell to reveal next. `None` makes the harness cash out.
    fn choose_cell(&mut self, session: &Session) -> Option<Coord2>;

    /// Candidate to buy a hint on. `None` makes the harness cash out.
    fn choose_hint(&mut self, session: &Session) -> Option<HintCandidate>;
}

/// Built-in policies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Risk-threshold player: cashes out when danger is high, buys hints when they
    /// are cheap relative to the next win.
    Heuristic,
    /// Cashes out as soon as this many safe cells are revealed.
    CashOutAfter(CellCount),
    /// Never stops until the board is cleared or a bomb goes off.
    RevealAll,
}

impl PolicyKind {
    pub fn label(self) -> &'static str {
        match self {
            PolicyKind::Heuristic => "Heuristic",
            PolicyKind::CashOutAfter(_) => "Cash Out After",
            PolicyKind::RevealAll => "Reveal All",
        }
    }

    pub fn create_policy(self, seed: u64) -> Box<dyn DecisionPolicy + Send> {
        let rng = SmallRng::seed_from_u64(seed);
        match self {
            PolicyKind::Heuristic => Box::new(HeuristicPolicy::new(rng)),
            PolicyKind::CashOutAfter(reveals) => Box::new(CashOutAfterPolicy { reveals, rng }),
            PolicyKind::RevealAll => Box::new(RevealAllPolicy { rng }),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::CashOutAfter(reveals) => write!(f, "{} {}", self.label(), reveals),
            _ => f.write_str(self.label()),
        }
    }
}

fn random_hidden_cell(rng: &mut SmallRng, session: &Session) -> Option<Coord2> {
    let hidden: Vec<Coord2> = session
        .board()
        .indexed_iter()
        .filter(|(_, cell)| cell.is_hidden())
        .map(|((row, col), _)| (row as Coord, col as Coord))
        .collect();
    hidden.choose(rng).copied()
}

fn random_candidate(rng: &mut SmallRng, session: &Session) -> Option<HintCandidate> {
    let candidates: Vec<_> = session.hint_candidates().collect();
    candidates.choose(rng).copied()
}

pub struct HeuristicPolicy {
    rng: SmallRng,
    cash_out_risk: f64,
    hint_risk: f64,
    hint_budget: f64,
}

impl HeuristicPolicy {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            rng,
            cash_out_risk: 0.9,
            hint_risk: 0.7,
            hint_budget: 0.5,
        }
    }

    /// Expected bombs per hidden cell, counting each hint as one bomb located.
    fn risk(session: &Session) -> f64 {
        let hidden = session.hidden_count();
        if hidden == 0 {
            return 1.0;
        }
        (f64::from(session.bomb_count()) - f64::from(session.hints_bought())) / f64::from(hidden)
    }
}

impl DecisionPolicy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "Heuristic"
    }

    fn decide(&mut self, session: &Session) -> Decision {
        let risk = Self::risk(session);
        if risk > self.cash_out_risk {
            return Decision::CashOut;
        }

        if risk > self.hint_risk {
            let pricing = session.hint_pricing();
            let affordable = match (pricing.average_hint_cost(), session.potential_win()) {
                (Some(cost), Some(potential)) => cost < potential * self.hint_budget,
                _ => false,
            };
            if affordable {
                return Decision::BuyHint;
            }
        }

        Decision::Reveal
    }

    fn choose_cell(&mut self, session: &Session) -> Option<Coord2> {
        random_hidden_cell(&mut self.rng, session)
    }

    fn choose_hint(&mut self, session: &Session) -> Option<HintCandidate> {
        random_candidate(&mut self.rng, session)
    }
}

pub struct CashOutAfterPolicy {
    reveals: CellCount,
    rng: SmallRng,
}

impl DecisionPolicy for CashOutAfterPolicy {
    fn name(&self) -> &'static str {
        "Cash Out After"
    }

    fn decide(&mut self, session: &Session) -> Decision {
        if session.revealed_safe_count() >= self.reveals {
            Decision::CashOut
        } else {
            Decision::Reveal
        }
    }

    fn choose_cell(&mut self, session: &Session) -> Option<Coord2> {
        random_hidden_cell(&mut self.rng, session)
    }

    fn choose_hint(&mut self, _session: &Session) -> Option<HintCandidate> {
        None
    }
}

pub struct RevealAllPolicy {
    rng: SmallRng,
}

impl DecisionPolicy for RevealAllPolicy {
    fn name(&self) -> &'static str {
        "Reveal All"
    }

    fn decide(&mut self, _session: &Session) -> Decision {
        Decision::Reveal
    }

    fn choose_cell(&mut self, session: &Session) -> Option<Coord2> {
        random_hidden_cell(&mut self.rng, session)
    }

    fn choose_hint(&mut self, _session: &Session) -> Option<HintCandidate> {
        None
    }
}

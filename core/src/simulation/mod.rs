//! Batch play of many independent rounds under an automated policy, used to
//! estimate the empirical return to player of a set of [`PayoutRules`].

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;
pub use policy::*;

mod policy;

pub const DEFAULT_STARTING_BALANCE: Credits = 100_000.0;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub iterations: u32,
    pub stake: Credits,
    pub bombs: CellCount,
    pub starting_balance: Credits,
    /// Feeds every bomb layout of the run.
    pub seed: u64,
    pub rules: PayoutRules,
}

impl SimulationConfig {
    pub fn new(iterations: u32, stake: Credits, bombs: CellCount, seed: u64) -> Self {
        Self {
            iterations,
            stake,
            bombs,
            starting_balance: DEFAULT_STARTING_BALANCE,
            seed,
            rules: PayoutRules::default(),
        }
    }

    pub fn with_starting_balance(mut self, starting_balance: Credits) -> Self {
        self.starting_balance = starting_balance;
        self
    }

    pub fn with_rules(mut self, rules: PayoutRules) -> Self {
        self.rules = rules;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Won,
    Lost,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_number: u32,
    pub starting_balance: Credits,
    pub stake: Credits,
    pub bomb_count: CellCount,
    /// Credited to the balance at the end of the round, `0` on a loss.
    pub money_won: Credits,
    /// Charged to the balance on top of the stake.
    pub money_spent_on_hints: Credits,
    pub hints_bought: u32,
    /// Every reveal attempted, the fatal one included.
    pub cells_revealed: u32,
    pub outcome: GameOutcome,
    pub final_balance: Credits,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub total_games: u32,
    pub games_won: u32,
    pub total_money_won: Credits,
    pub total_money_gambled: Credits,
    pub total_money_spent_on_hints: Credits,
    pub average_cells_revealed: f64,
    pub final_balance: Credits,
    /// Winnings over everything paid in (stakes and hints), as a percentage.
    pub empirical_rtp_percent: f64,
    /// Final balance minus starting balance: won minus gambled minus hints.
    pub player_net: Credits,
}

impl SimulationSummary {
    pub fn from_records(starting_balance: Credits, records: &[GameRecord]) -> Self {
        let total_games = records.len() as u32;
        let won = || records.iter().filter(|r| r.outcome == GameOutcome::Won);

        let games_won = won().count() as u32;
        let total_money_won: Credits = won().map(|r| r.money_won).sum();
        let total_money_gambled: Credits = records.iter().map(|r| r.stake).sum();
        let total_money_spent_on_hints: Credits =
            records.iter().map(|r| r.money_spent_on_hints).sum();
        let average_cells_revealed = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| f64::from(r.cells_revealed)).sum::<f64>() / f64::from(total_games)
        };
        let final_balance = records
            .last()
            .map_or(starting_balance, |r| r.final_balance);
        let paid_in = total_money_gambled + total_money_spent_on_hints;
        let empirical_rtp_percent = if paid_in > 0.0 {
            total_money_won / paid_in * 100.0
        } else {
            0.0
        };

        Self {
            total_games,
            games_won,
            total_money_won: round2(total_money_won),
            total_money_gambled: round2(total_money_gambled),
            total_money_spent_on_hints: round2(total_money_spent_on_hints),
            average_cells_revealed,
            final_balance,
            empirical_rtp_percent,
            player_net: round2(final_balance - starting_balance),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub config: SimulationConfig,
    pub policy: String,
    pub records: Vec<GameRecord>,
    pub summary: SimulationSummary,
}

/// Plays `config.iterations` rounds back to back, stopping early once the balance
/// cannot cover the stake.
pub fn run_simulation(
    config: &SimulationConfig,
    policy: &mut dyn DecisionPolicy,
) -> Result<SimulationReport> {
    GameConfig::new(config.stake, config.bombs).validate(config.starting_balance)?;

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut balance = config.starting_balance;
    let mut records = Vec::new();

    for game_number in 1..=config.iterations {
        if balance < config.stake {
            log::info!(
                "Stopping after {} games, balance {:.2} cannot cover stake {:.2}",
                records.len(),
                balance,
                config.stake
            );
            break;
        }

        let layout_seed = rng.random();
        let record = play_game(game_number, balance, layout_seed, config, policy)?;
        log::debug!(
            "Game {}: {:?}, won {:.2}, {} hints, {} cells, balance {:.2}",
            record.game_number,
            record.outcome,
            record.money_won,
            record.hints_bought,
            record.cells_revealed,
            record.final_balance
        );
        balance = record.final_balance;
        records.push(record);
    }

    let summary = SimulationSummary::from_records(config.starting_balance, &records);
    log::info!(
        "{} games with {}: {} won, RTP {:.2}%, final balance {:.2}",
        summary.total_games,
        policy.name(),
        summary.games_won,
        summary.empirical_rtp_percent,
        summary.final_balance
    );

    Ok(SimulationReport {
        config: *config,
        policy: policy.name().into(),
        records,
        summary,
    })
}

fn play_game(
    game_number: u32,
    balance: Credits,
    layout_seed: u64,
    config: &SimulationConfig,
    policy: &mut dyn DecisionPolicy,
) -> Result<GameRecord> {
    let mut session = Session::start(
        balance,
        GameConfig::new(config.stake, config.bombs),
        config.rules,
        RandomLayoutGenerator::new(layout_seed),
    )?;
    let mut cells_revealed = 0;

    // the first reveal is not up to the policy, cashing out needs one safe cell
    while session.state().is_active() {
        let decision = if session.revealed_safe_count() == 0 {
            Decision::Reveal
        } else {
            policy.decide(&session)
        };

        match decision {
            Decision::Reveal => match policy.choose_cell(&session) {
                Some(coords) => {
                    session.reveal(coords)?;
                    cells_revealed += 1;
                }
                None => {
                    session.cash_out()?;
                }
            },
            Decision::BuyHint => {
                let quote = policy
                    .choose_hint(&session)
                    .map(|candidate| session.hint_pricing().quote(&candidate));
                match quote {
                    Some(quote) if quote.cost > 0.0 && session.winnings() > quote.cost => {
                        session.buy_hint_at(quote.candidate.coords, quote.cost)?;
                    }
                    _ => {
                        session.cash_out()?;
                    }
                }
            }
            Decision::CashOut => {
                session.cash_out()?;
            }
        }
    }

    let outcome = match session.state() {
        SessionState::Lost => GameOutcome::Lost,
        _ => GameOutcome::Won,
    };
    let money_won = match outcome {
        GameOutcome::Won => session.winnings(),
        GameOutcome::Lost => 0.0,
    };
    // a later reveal recomputes winnings and drops the in-round deduction, so the
    // player pays for hints out of the balance
    let money_spent_on_hints = session.hint_spend();
    let final_balance = round2(session.balance() - money_spent_on_hints);

    Ok(GameRecord {
        game_number,
        starting_balance: balance,
        stake: config.stake,
        bomb_count: config.bombs,
        money_won,
        money_spent_on_hints,
        hints_bought: session.hints_bought(),
        cells_revealed,
        outcome,
        final_balance,
    })
}

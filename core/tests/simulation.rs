use minestake_core::simulation::*;
use minestake_core::{
    Coord, Coord2, EntropyModel, HintCandidate, PayoutRules, Session, SessionError,
};

fn run(config: &SimulationConfig, kind: PolicyKind, policy_seed: u64) -> SimulationReport {
    let mut policy = kind.create_policy(policy_seed);
    run_simulation(config, policy.as_mut()).unwrap()
}

#[test]
fn same_seed_same_summary() {
    let config = SimulationConfig::new(300, 10.0, 5, 2024);

    let first = run(&config, PolicyKind::Heuristic, 7);
    let second = run(&config, PolicyKind::Heuristic, 7);

    assert_eq!(first.summary, second.summary);
    assert_eq!(first.records, second.records);
}

#[test]
fn different_seeds_diverge() {
    let a = run(&SimulationConfig::new(200, 10.0, 5, 1), PolicyKind::RevealAll, 1);
    let b = run(&SimulationConfig::new(200, 10.0, 5, 2), PolicyKind::RevealAll, 2);

    assert_ne!(a.records, b.records);
}

#[test]
fn balance_follows_stakes_and_credits() {
    for kind in [
        PolicyKind::Heuristic,
        PolicyKind::CashOutAfter(3),
        PolicyKind::RevealAll,
    ] {
        let config = SimulationConfig::new(150, 10.0, 8, 99).with_starting_balance(5_000.0);
        let report = run(&config, kind, 3);

        let mut balance = config.starting_balance;
        for record in &report.records {
            assert_eq!(record.starting_balance, balance);
            balance = balance - record.stake + record.money_won - record.money_spent_on_hints;
            assert!((record.final_balance - balance).abs() < 1e-6, "{kind}");
            balance = record.final_balance;
        }
        assert_eq!(report.summary.final_balance, balance);
    }
}

#[test]
fn records_are_numbered_and_outcomes_consistent() {
    let config = SimulationConfig::new(100, 2.0, 3, 5);
    let report = run(&config, PolicyKind::Heuristic, 5);

    for (index, record) in report.records.iter().enumerate() {
        assert_eq!(record.game_number as usize, index + 1);
        assert!(record.cells_revealed >= 1);
        if record.outcome == GameOutcome::Lost {
            assert_eq!(record.money_won, 0.0);
        }
    }
    assert_eq!(report.policy, "Heuristic");
}

/// Buys one hint after the first safe cell, then reveals up to three and cashes out.
struct HintThenReveal;

impl DecisionPolicy for HintThenReveal {
    fn name(&self) -> &'static str {
        "Hint Then Reveal"
    }

    fn decide(&mut self, session: &Session) -> Decision {
        if session.hints_bought() == 0 {
            Decision::BuyHint
        } else if session.revealed_safe_count() < 3 {
            Decision::Reveal
        } else {
            Decision::CashOut
        }
    }

    fn choose_cell(&mut self, session: &Session) -> Option<Coord2> {
        session
            .board()
            .indexed_iter()
            .find(|(_, cell)| cell.is_hidden())
            .map(|((row, col), _)| (row as Coord, col as Coord))
    }

    fn choose_hint(&mut self, session: &Session) -> Option<HintCandidate> {
        session.hint_candidates().next()
    }
}

#[test]
fn hints_are_paid_from_the_balance() {
    let config = SimulationConfig::new(50, 10.0, 1, 12).with_starting_balance(1_000.0);
    let report = run_simulation(&config, &mut HintThenReveal).unwrap();

    let with_hints: Vec<_> = report
        .records
        .iter()
        .filter(|r| r.hints_bought > 0)
        .collect();
    assert!(!with_hints.is_empty());
    for record in &report.records {
        assert_eq!(record.hints_bought > 0, record.money_spent_on_hints > 0.0);
        let expected = record.starting_balance - record.stake + record.money_won
            - record.money_spent_on_hints;
        assert!((record.final_balance - expected).abs() < 1e-6);
    }

    // a won round that reveals again after the hint keeps its full winnings, yet
    // still ends below starting + won - stake by the hint price
    let revealed_after_hint = with_hints
        .iter()
        .find(|r| r.outcome == GameOutcome::Won && r.cells_revealed == 3)
        .expect("a won game with three reveals");
    assert!(
        revealed_after_hint.final_balance
            < revealed_after_hint.starting_balance - revealed_after_hint.stake
                + revealed_after_hint.money_won
    );

    let summary = &report.summary;
    assert!(summary.total_money_spent_on_hints > 0.0);
    let without_hints = summary.total_money_won - summary.total_money_gambled;
    let net = without_hints - summary.total_money_spent_on_hints;
    assert!((summary.player_net - net).abs() < 1e-6);
    assert!(summary.final_balance < config.starting_balance + without_hints);
}

#[test]
fn legacy_pricing_still_runs() {
    let rules = PayoutRules {
        entropy_model: EntropyModel::Legacy,
        ..PayoutRules::default()
    };
    let config = SimulationConfig::new(100, 10.0, 20, 8).with_rules(rules);
    let report = run(&config, PolicyKind::Heuristic, 8);

    assert!(report.summary.total_games > 0);
}

#[test]
fn invalid_stake_is_rejected_up_front() {
    let config = SimulationConfig::new(10, 0.0, 3, 1);
    let mut policy = PolicyKind::RevealAll.create_policy(1);

    assert!(matches!(
        run_simulation(&config, policy.as_mut()),
        Err(SessionError::InvalidConfiguration(_))
    ));
}

#[test]
fn report_serializes_to_json() {
    let config = SimulationConfig::new(3, 1.0, 2, 4);
    let report = run(&config, PolicyKind::CashOutAfter(2), 4);

    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["summary"]["total_games"], 3);
    assert_eq!(json["records"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["config"]["rules"]["entropy_model"], "Hypergeometric");
}

use minestake_core::*;

fn start(balance: Credits, stake: Credits, bombs: &[Coord2]) -> Session {
    let layout = MineLayout::from_bomb_coords((BOARD_SIZE, BOARD_SIZE), bombs).unwrap();
    let config = GameConfig::new(stake, layout.bomb_count());
    Session::start(balance, config, PayoutRules::default(), layout).unwrap()
}

fn all_cells() -> impl Iterator<Item = Coord2> {
    (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| (row, col)))
}

#[test]
fn single_bomb_first_reveal_pays_ten_ten() {
    let mut session = start(1000.0, 10.0, &[(4, 4)]);
    assert_eq!(session.balance(), 990.0);

    let snapshot = session.reveal((0, 0)).unwrap();

    assert!((snapshot.current_multiplier - 0.97 / 0.96).abs() < 1e-9);
    assert_eq!(snapshot.current_winnings, 10.10);
    assert_eq!(snapshot.state, SessionState::Active);

    let snapshot = session.cash_out().unwrap();
    assert_eq!(snapshot.state, SessionState::Won);
    assert_eq!(snapshot.balance, 1000.10);
}

#[test]
fn twenty_four_bombs_win_on_the_only_safe_cell() {
    let bombs: Vec<_> = all_cells().filter(|&c| c != (2, 2)).collect();
    let mut session = start(1000.0, 10.0, &bombs);

    let snapshot = session.reveal((2, 2)).unwrap();

    assert!((snapshot.current_multiplier - 24.25).abs() < 1e-9);
    assert_eq!(snapshot.state, SessionState::Won);
    assert_eq!(snapshot.balance, 1232.5);
    assert_eq!(session.cash_out(), Err(SessionError::AlreadyEnded));
}

#[test]
fn a_bomb_locks_the_round() {
    let mut session = start(100.0, 5.0, &[(1, 1), (3, 3)]);
    session.reveal((0, 4)).unwrap();

    let snapshot = session.reveal((3, 3)).unwrap();

    assert_eq!(snapshot.state, SessionState::Lost);
    assert_eq!(snapshot.current_winnings, 0.0);
    assert_eq!(snapshot.balance, 95.0);
    assert_eq!(session.triggered_bomb(), Some((3, 3)));
    assert_eq!(session.disclosed_bombs(), vec![(1, 1), (3, 3)]);

    assert_eq!(session.reveal((0, 0)), Err(SessionError::AlreadyEnded));
    assert_eq!(session.cash_out(), Err(SessionError::AlreadyEnded));
    assert_eq!(session.buy_hint((0, 4)), Err(SessionError::AlreadyEnded));
    assert_eq!(
        session.begin_hint_selection(),
        Err(SessionError::AlreadyEnded)
    );
}

#[test]
fn clearing_the_board_wins() {
    let bombs = [(0, 0), (2, 3), (4, 1)];
    let mut session = start(50.0, 1.0, &bombs);

    for coords in all_cells().filter(|c| !bombs.contains(c)) {
        session.reveal(coords).unwrap();
    }

    assert_eq!(session.state(), SessionState::Won);
    assert_eq!(session.revealed_safe_count(), 22);
    assert!(session.hint_candidates().next().is_none());
}

#[test]
fn hint_purchase_flow() {
    let mut session = start(1000.0, 10.0, &[(0, 1)]);
    session.reveal((0, 0)).unwrap();

    let quotes = session.begin_hint_selection().unwrap();
    assert_eq!(quotes.len(), 1);
    let quote = quotes[0];
    assert_eq!(quote.candidate.coords, (0, 0));
    assert!(quote.cost >= 0.0 && quote.cost <= 5.27);

    assert_eq!(session.cash_out(), Err(SessionError::PendingHintSelection));

    let snapshot = session.buy_hint(quote.candidate.coords).unwrap();
    assert_eq!(snapshot.hints_bought, 1);
    assert_eq!(snapshot.hint_spend, quote.cost);
    assert!((snapshot.current_winnings - (10.10 - quote.cost)).abs() < 1e-9);
    assert_eq!(session.hint_at((0, 0)), Some(1));
    assert!(!session.is_hint_selection_pending());

    // the next reveal prices winnings off the raised RTP
    let snapshot = session.reveal((4, 4)).unwrap();
    let expected_rtp = 0.97 + 1.0 / 24.0 * 0.2;
    assert!((session.adjusted_rtp() - expected_rtp).abs() < 1e-12);
    assert!((snapshot.current_multiplier - expected_rtp / 0.92).abs() < 1e-9);
    assert_eq!(
        snapshot.current_winnings,
        round2(snapshot.current_multiplier * 10.0)
    );
}

#[test]
fn cancelling_hint_selection_is_free() {
    let mut session = start(1000.0, 10.0, &[(0, 1), (3, 3)]);
    session.reveal((0, 0)).unwrap();
    let before = session.snapshot();

    session.begin_hint_selection().unwrap();
    assert!(session.cancel_hint_selection());
    assert!(!session.cancel_hint_selection());

    assert_eq!(session.snapshot(), before);
    assert!(session.cash_out().is_ok());
}

#[test]
fn configuration_is_checked_before_staking() {
    let layout = MineLayout::from_bomb_coords((5, 5), &[(0, 0)]).unwrap();

    let too_poor = Session::start(
        5.0,
        GameConfig::new(10.0, 1),
        PayoutRules::default(),
        layout.clone(),
    );
    assert!(matches!(
        too_poor,
        Err(SessionError::InvalidConfiguration(_))
    ));

    let mismatched = Session::start(
        100.0,
        GameConfig::new(10.0, 2),
        PayoutRules::default(),
        layout,
    );
    assert!(matches!(
        mismatched,
        Err(SessionError::InvalidConfiguration(_))
    ));
}

#[test]
fn snapshots_serialize() {
    let mut session = start(1000.0, 10.0, &[(4, 4)]);
    let snapshot = session.reveal((0, 0)).unwrap();

    let json = serde_json::to_value(snapshot).unwrap();

    assert_eq!(json["state"], "Active");
    assert_eq!(json["current_winnings"], 10.1);
    assert_eq!(json["revealed_safe_count"], 1);
}

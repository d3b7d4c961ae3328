//! Message flow between players and games.

use chrono::{Duration, Utc};
use mines_core::*;
use mines_protocol::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn login(username: &str, game_id: Option<&str>) -> Login {
    Login {
        username: Some(username.to_owned()),
        game_id: game_id.map(str::to_owned),
    }
}

fn events(outbound: &[Outbound]) -> Vec<&ServerEvent> {
    outbound.iter().map(|out| &out.event).collect()
}

fn first_mine(session: &Session) -> Coord2 {
    session
        .game()
        .lock()
        .board()
        .squares()
        .iter()
        .find(|square| square.is_mine())
        .map(Square::coords)
        .unwrap()
}

#[test]
fn join_sends_the_game_state_to_the_new_player() {
    init_logging();
    let dispatcher = Dispatcher::default();

    let (session, out) = dispatcher.join(&Login::default());

    assert_eq!(session.game_id(), dispatcher.games().default_id());
    assert!(!session.username().is_empty());
    assert_eq!(out.len(), 7);
    assert_eq!(
        out[0],
        Outbound::sender(ServerEvent::SetUsername {
            username: session.username().to_owned()
        })
    );
    assert_eq!(out[1].audience, Audience::Room);
    match &out[2].event {
        ServerEvent::Board { board, dimensions } => {
            assert_eq!(board.len(), 8);
            assert_eq!(board[0].len(), 8);
            assert_eq!(dimensions.mines, 10);
            assert!(board.iter().flatten().all(|s| s.mine.is_none()));
        }
        other => panic!("expected board, got {other:?}"),
    }
    assert_eq!(
        out[6].event,
        ServerEvent::ShareGame {
            name: "Default game".into(),
            hidden: false,
            is_default_game: true,
        }
    );
}

#[test]
fn unknown_game_id_joins_the_default_game() {
    init_logging();
    let dispatcher = Dispatcher::default();
    let (session, _) = dispatcher.join(&login("ada", Some("missing")));
    assert_eq!(session.game_id(), dispatcher.games().default_id());
    assert_eq!(session.username(), "ada");
}

#[test]
fn reveal_broadcasts_squares_flag_count_and_players() {
    init_logging();
    let dispatcher = Dispatcher::default();
    let (session, _) = dispatcher.join(&login("ada", None));

    let out = dispatcher.handle(&session, ClientAction::Reveal { x: 3, y: 3 }, Utc::now());

    assert!(out.iter().all(|o| o.audience == Audience::Room));
    let ServerEvent::Squares(squares) = &out[0].event else {
        panic!("expected squares, got {:?}", out[0].event);
    };
    assert!(!squares.is_empty());
    assert!(squares.iter().all(|s| s.revealed_by.as_deref() == Some("ada")));
    assert_eq!(out[1].event, ServerEvent::FlagCount(0));
    let ServerEvent::Players(players) = &out[2].event else {
        panic!("expected players, got {:?}", out[2].event);
    };
    assert_eq!(players[0].points as usize, squares.len());
}

#[test]
fn out_of_range_input_is_ignored() {
    init_logging();
    let dispatcher = Dispatcher::default();
    let (session, _) = dispatcher.join(&login("ada", None));
    let now = Utc::now();

    assert!(dispatcher.handle(&session, ClientAction::Reveal { x: -1, y: 0 }, now).is_empty());
    assert!(dispatcher.handle(&session, ClientAction::Flag { x: 0, y: -7 }, now).is_empty());
    assert!(!session.game().lock().board().is_generated());

    let out = dispatcher.handle(&session, ClientAction::Reveal { x: 200, y: 0 }, now);
    assert_eq!(events(&out)[0], &ServerEvent::Squares(Vec::new()));
}

#[test]
fn flag_sends_the_redacted_square() {
    init_logging();
    let dispatcher = Dispatcher::default();
    let (session, _) = dispatcher.join(&login("ada", None));
    let now = Utc::now();
    dispatcher.handle(&session, ClientAction::Reveal { x: 0, y: 0 }, now);
    let hidden = session
        .game()
        .lock()
        .board()
        .squares()
        .iter()
        .find(|square| !square.revealed)
        .map(Square::coords)
        .unwrap();

    let out = dispatcher.handle(
        &session,
        ClientAction::Flag {
            x: hidden.0.into(),
            y: hidden.1.into(),
        },
        now,
    );

    assert_eq!(out[0].event, ServerEvent::FlagCount(1));
    let ServerEvent::Squares(squares) = &out[1].event else {
        panic!("expected squares, got {:?}", out[1].event);
    };
    assert!(squares[0].flagged);
    assert_eq!(squares[0].mine, None);
    assert_eq!(squares[0].count, None);
}

#[test]
fn losing_reveal_announces_loser_then_resets() {
    init_logging();
    let mut dispatcher = Dispatcher::default();
    let handle = dispatcher
        .games_mut()
        .create(Some(GameConfig::new((8, 8), 30)), Some("hard"));
    let game_id = handle.lock().id().to_owned();
    let (ada, _) = dispatcher.join(&login("ada", Some(&game_id)));
    let (bob, _) = dispatcher.join(&login("bob", Some(&game_id)));
    let now = Utc::now();
    dispatcher.handle(&ada, ClientAction::Reveal { x: 0, y: 0 }, now);
    let mine = first_mine(&bob);

    let out = dispatcher.handle(
        &bob,
        ClientAction::Reveal {
            x: mine.0.into(),
            y: mine.1.into(),
        },
        now,
    );

    let lose = out
        .iter()
        .find_map(|o| match &o.event {
            ServerEvent::Lose { loser, squares } => Some((loser.clone(), squares.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(lose.0, "bob");
    assert!(lose.1.iter().all(|s| s.lose && !s.revealed));
    assert!(lose.1.iter().any(|s| s.is_mine()));
    assert!(handle.lock().is_resetting());

    // input is dropped until the window elapses
    assert!(dispatcher.handle(&ada, ClientAction::Reveal { x: 1, y: 1 }, now).is_empty());
    assert!(dispatcher.tick(&handle, now + Duration::seconds(4)).is_empty());

    let out = dispatcher.tick(&handle, now + Duration::seconds(5));
    assert_eq!(out.len(), 3);
    assert!(matches!(&out[1].event, ServerEvent::Board { .. }));
    assert_eq!(out[2].event, ServerEvent::FlagCount(0));
    assert!(!dispatcher.handle(&ada, ClientAction::Reveal { x: 1, y: 1 }, now).is_empty());
}

#[test]
fn winning_reveal_announces_the_winner() {
    init_logging();
    let mut dispatcher = Dispatcher::default();
    let handle = dispatcher
        .games_mut()
        .create(Some(GameConfig::new((1, 1), 1)), None);
    let game_id = handle.lock().id().to_owned();
    let (ada, _) = dispatcher.join(&login("ada", Some(&game_id)));

    let out = dispatcher.handle(&ada, ClientAction::Reveal { x: 0, y: 0 }, Utc::now());

    assert_eq!(out.last().unwrap().event, ServerEvent::Win("ada".into()));
    assert!(handle.lock().is_resetting());
    assert_eq!(dispatcher.tick_all(Utc::now() + Duration::seconds(6)).len(), 1);
}

#[test]
fn next_dimensions_are_clamped() {
    init_logging();
    let dispatcher = Dispatcher::default();
    let (session, _) = dispatcher.join(&login("ada", None));

    let out = dispatcher.handle(
        &session,
        ClientAction::NextDimensions {
            width: 4,
            height: 4,
            mines: 100,
        },
        Utc::now(),
    );

    assert_eq!(
        out,
        vec![Outbound::room(ServerEvent::NextDimensions(Dimensions {
            width: 4,
            height: 4,
            mines: 16,
        }))]
    );
    assert_eq!(
        session.game().lock().board().config(),
        GameConfig::new((8, 8), 10)
    );
}

#[test]
fn sharing_the_default_game_is_ignored() {
    init_logging();
    let mut dispatcher = Dispatcher::default();
    let (default_session, _) = dispatcher.join(&login("ada", None));
    let share = ClientAction::ShareGame {
        name: "Mine now".into(),
        hidden: true,
    };
    assert!(dispatcher.handle(&default_session, share, Utc::now()).is_empty());

    let handle = dispatcher.games_mut().create(None, None);
    let game_id = handle.lock().id().to_owned();
    let (session, _) = dispatcher.join(&login("bob", Some(&game_id)));
    let out = dispatcher.handle(
        &session,
        ClientAction::ShareGame {
            name: "Friday".into(),
            hidden: false,
        },
        Utc::now(),
    );

    assert_eq!(
        out[0].event,
        ServerEvent::ShareGame {
            name: "Friday".into(),
            hidden: false,
            is_default_game: false,
        }
    );
    assert_eq!(dispatcher.games().available().len(), 2);
}

#[test]
fn leaving_the_last_player_drops_the_game() {
    init_logging();
    let mut dispatcher = Dispatcher::default();
    let handle = dispatcher.games_mut().create(None, None);
    let game_id = handle.lock().id().to_owned();
    let (ada, _) = dispatcher.join(&login("ada", Some(&game_id)));
    let (default_session, _) = dispatcher.join(&login("bob", None));

    let out = dispatcher.leave(&ada);

    let ServerEvent::Players(players) = &out[0].event else {
        panic!("expected players, got {:?}", out[0].event);
    };
    assert!(!players[0].connected);
    assert!(dispatcher.games().get(&game_id).is_none());

    dispatcher.leave(&default_session);
    assert!(dispatcher.games().get(dispatcher.games().default_id()).is_some());
}

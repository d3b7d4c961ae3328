use chrono::{DateTime, Utc};
use mines_core::*;

use crate::*;

/// A joined player and the game they joined.
#[derive(Clone, Debug)]
pub struct Session {
    game: GameHandle,
    game_id: String,
    username: String,
}

impl Session {
    pub fn game(&self) -> &GameHandle {
        &self.game
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Turns player messages into game calls and game results into outbound events.
///
/// Routine races (clicking a revealed square, clicking during the reset window, coordinates off
/// the board) produce no events rather than errors.
#[derive(Debug, Default)]
pub struct Dispatcher {
    games: Games,
}

impl Dispatcher {
    pub fn new(settings: Settings) -> Self {
        Self {
            games: Games::new(settings),
        }
    }

    pub fn games(&self) -> &Games {
        &self.games
    }

    pub fn games_mut(&mut self) -> &mut Games {
        &mut self.games
    }

    /// Adds the player to the requested game, or the default game, and sends them its state.
    pub fn join(&self, login: &Login) -> (Session, Vec<Outbound>) {
        let handle = self.games.get_or_default(login.game_id.as_deref());
        let (game_id, username, events) = {
            let mut game = handle.lock();
            let player = game.add_player(login.username.as_deref());
            let board = game.board();
            let events = vec![
                Outbound::sender(ServerEvent::SetUsername {
                    username: player.username.clone(),
                }),
                Outbound::room(ServerEvent::Players(game.players().to_vec())),
                Outbound::sender(ServerEvent::board(board)),
                Outbound::room(ServerEvent::Squares(
                    board.squares_revealed_by(&player.username),
                )),
                Outbound::sender(ServerEvent::FlagCount(board.flag_count())),
                Outbound::sender(ServerEvent::NextDimensions(
                    game.next_dimensions().into(),
                )),
                Outbound::sender(self.share_event(&game)),
            ];
            (game.id().to_owned(), player.username, events)
        };
        log::debug!("Dispatcher: {} joined game {}", username, game_id);

        let session = Session {
            game: handle,
            game_id,
            username,
        };
        (session, events)
    }

    pub fn handle(
        &self,
        session: &Session,
        action: ClientAction,
        now: DateTime<Utc>,
    ) -> Vec<Outbound> {
        log::trace!("Dispatcher: {} sent {:?}", session.username, action);
        let mut game = session.game.lock();
        match action {
            ClientAction::Reveal { x, y } => reveal(&mut game, &session.username, x, y, now),
            ClientAction::Flag { x, y } => flag(&mut game, x, y),
            ClientAction::NextDimensions {
                width,
                height,
                mines,
            } => {
                game.set_next_dimensions(GameConfig::clamped(width, height, mines));
                vec![Outbound::room(ServerEvent::NextDimensions(
                    game.next_dimensions().into(),
                ))]
            }
            ClientAction::ShareGame { name, hidden } => {
                if !game.update_sharing(name, hidden) {
                    return Vec::new();
                }
                vec![Outbound::room(self.share_event(&game))]
            }
        }
    }

    /// Completes the reset of `handle` once its window has elapsed and announces the fresh board.
    pub fn tick(&self, handle: &GameHandle, now: DateTime<Utc>) -> Vec<Outbound> {
        let mut game = handle.lock();
        if !game.poll_reset(now) {
            return Vec::new();
        }
        vec![
            Outbound::room(ServerEvent::Players(game.players().to_vec())),
            Outbound::room(ServerEvent::board(game.board())),
            Outbound::room(ServerEvent::FlagCount(game.board().flag_count())),
        ]
    }

    /// [`Self::tick`] for every game, keyed by game id. Games with nothing to announce are left
    /// out.
    pub fn tick_all(&self, now: DateTime<Utc>) -> Vec<(String, Vec<Outbound>)> {
        self.games
            .iter()
            .filter_map(|(id, handle)| {
                let events = self.tick(handle, now);
                (!events.is_empty()).then(|| (id.to_owned(), events))
            })
            .collect()
    }

    /// Marks the player disconnected and drops games nobody is left in.
    pub fn leave(&mut self, session: &Session) -> Vec<Outbound> {
        let events = {
            let mut game = session.game.lock();
            game.player_disconnected(&session.username);
            vec![Outbound::room(ServerEvent::Players(game.players().to_vec()))]
        };
        self.games.sweep();
        events
    }

    fn share_event(&self, game: &Game) -> ServerEvent {
        ServerEvent::ShareGame {
            name: game.name().to_owned(),
            hidden: game.is_hidden(),
            is_default_game: game.id() == self.games.default_id(),
        }
    }
}

fn reveal(game: &mut Game, username: &str, x: i64, y: i64, now: DateTime<Utc>) -> Vec<Outbound> {
    if !game.round_state().accepts_input() {
        return Vec::new();
    }
    let Some(coords) = coords_from_signed(x, y) else {
        return Vec::new();
    };

    let changed = game.reveal(coords, username);
    let board = game.board();
    let mut events = vec![
        Outbound::room(ServerEvent::Squares(changed)),
        Outbound::room(ServerEvent::FlagCount(board.flag_count())),
        Outbound::room(ServerEvent::Players(game.players().to_vec())),
    ];
    if board.lost() {
        events.push(Outbound::room(ServerEvent::Lose {
            loser: username.to_owned(),
            squares: board.remaining_squares(),
        }));
    }
    if board.won() {
        events.push(Outbound::room(ServerEvent::Win(game.winner())));
    }

    if let Some(until) = game.begin_reset(now) {
        log::debug!(
            "Dispatcher: game {} finished, next board at {}",
            game.id(),
            until
        );
    }
    events
}

fn flag(game: &mut Game, x: i64, y: i64) -> Vec<Outbound> {
    let Some(square) = coords_from_signed(x, y).and_then(|coords| game.toggle_flag(coords)) else {
        return Vec::new();
    };
    vec![
        Outbound::room(ServerEvent::FlagCount(game.board().flag_count())),
        Outbound::room(ServerEvent::Squares(vec![square.for_player()])),
    ]
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub username: String,
    pub color: String,
    pub points: u32,
    pub connected: bool,
}

/// Valid transitions:
/// - Active -> Finished, when a reveal wins or loses the board
/// - Finished -> Resetting, when the reset window starts
/// - Resetting -> Active, once the window has elapsed and a fresh board is in place
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    #[default]
    Active,
    Finished,
    Resetting { until: DateTime<Utc> },
}

impl RoundState {
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// One shared board plus the players working on it.
#[derive(Clone, Debug)]
pub struct Game {
    id: String,
    name: String,
    hidden: bool,
    do_not_delete: bool,
    next_dimensions: GameConfig,
    board: Board,
    players: Vec<Player>,
    round: RoundState,
    reset_delay: Duration,
}

impl Game {
    pub fn new(config: GameConfig, name: impl Into<String>) -> Self {
        Self::with_board(Board::new(config), name)
    }

    /// Game whose first round is played on `board`, later rounds use the board's dimensions.
    pub fn with_board(board: Board, name: impl Into<String>) -> Self {
        let game = Self {
            id: random_game_id(),
            name: name.into(),
            hidden: true,
            do_not_delete: false,
            next_dimensions: board.config(),
            board,
            players: Vec::new(),
            round: RoundState::Active,
            reset_delay: Settings::default().reset_delay(),
        };
        log::debug!(
            "Game {}: created {:?} with board seed {}",
            game.id,
            game.name,
            game.board.seed()
        );
        game
    }

    pub fn with_reset_delay(mut self, reset_delay: Duration) -> Self {
        self.reset_delay = reset_delay;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn unhide(&mut self) {
        self.hidden = false;
    }

    pub fn do_not_delete(&self) -> bool {
        self.do_not_delete
    }

    pub fn protect(&mut self) {
        self.do_not_delete = true;
    }

    /// Renames and lists or unlists the game. The protected default game keeps its settings.
    pub fn update_sharing(&mut self, name: impl Into<String>, hidden: bool) -> bool {
        if self.do_not_delete {
            log::debug!("Game {}: ignoring sharing update on protected game", self.id);
            return false;
        }
        self.name = name.into();
        self.hidden = hidden;
        true
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn round_state(&self) -> RoundState {
        self.round
    }

    /// Whether the game is inside the reset window, discarding input.
    pub fn is_resetting(&self) -> bool {
        matches!(self.round, RoundState::Resetting { .. })
    }

    pub fn reset_delay(&self) -> Duration {
        self.reset_delay
    }

    pub fn next_dimensions(&self) -> GameConfig {
        self.next_dimensions
    }

    /// Dimensions for the next round, the current board is untouched.
    pub fn set_next_dimensions(&mut self, config: GameConfig) {
        self.next_dimensions = config;
    }

    /// Joins a player, generating a name when none or a blank one is given. A returning player
    /// keeps their points.
    pub fn add_player(&mut self, username: Option<&str>) -> Player {
        let username = match username {
            Some(username) if !username.trim().is_empty() => username.to_owned(),
            _ => {
                let mut username = random_username();
                while self.player(&username).is_some() {
                    username = random_username();
                }
                username
            }
        };
        let color = random_color();

        let player = match self.player_mut(&username) {
            Some(player) => {
                player.color = color;
                player.connected = true;
                player.clone()
            }
            None => {
                let player = Player {
                    username,
                    color,
                    points: 0,
                    connected: true,
                };
                self.players.push(player.clone());
                player
            }
        };
        log::debug!("Game {}: {} joined", self.id, player.username);
        player
    }

    pub fn player(&self, username: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.username == username)
    }

    fn player_mut(&mut self, username: &str) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| player.username == username)
    }

    /// Roster in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn remove_player(&mut self, username: &str) {
        self.players.retain(|player| player.username != username);
    }

    /// Marks a player as gone. They stay on the roster until the next reset.
    pub fn player_disconnected(&mut self, username: &str) {
        if let Some(player) = self.player_mut(username) {
            player.connected = false;
            log::debug!("Game {}: {} disconnected", self.id, username);
        }
    }

    pub fn has_connected_players(&self) -> bool {
        self.players.iter().any(|player| player.connected)
    }

    pub fn number_of_connected_players(&self) -> usize {
        self.players.iter().filter(|player| player.connected).count()
    }

    /// Reveals for `player` and credits them with every square the reveal exposed in their name,
    /// unless it hit a mine.
    pub fn reveal(&mut self, coords: Coord2, player: &str) -> Vec<Square> {
        if !self.round.accepts_input() {
            return Vec::new();
        }

        let changed = self.board.reveal(coords, Some(player));

        if !self.board.lost() {
            let gained = changed
                .iter()
                .filter(|square| square.revealed_by.as_deref() == Some(player))
                .count() as u32;
            if let Some(scorer) = self.player_mut(player) {
                scorer.points += gained;
            }
        }

        if self.board.is_finished() {
            log::debug!(
                "Game {}: round finished {:?} by {}",
                self.id,
                self.board.state(),
                player
            );
            self.round = RoundState::Finished;
        }

        changed
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Option<Square> {
        if !self.round.accepts_input() {
            return None;
        }
        self.board.toggle_flag(coords)
    }

    /// Usernames sharing the top score, joined with `", "` in roster order. Empty when nobody
    /// scored.
    pub fn winner(&self) -> String {
        let top = self
            .players
            .iter()
            .map(|player| player.points)
            .max()
            .unwrap_or(0);
        if top == 0 {
            return String::new();
        }
        self.players
            .iter()
            .filter(|player| player.points == top)
            .map(|player| player.username.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Starts the reset window of a finished round. Returns when the window closes.
    pub fn begin_reset(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !matches!(self.round, RoundState::Finished) {
            return None;
        }
        let until = now + self.reset_delay;
        self.round = RoundState::Resetting { until };
        log::debug!("Game {}: resetting until {}", self.id, until);
        Some(until)
    }

    /// Completes the reset once the window has elapsed: fresh board, zeroed points, disconnected
    /// players dropped. Returns whether it happened.
    pub fn poll_reset(&mut self, now: DateTime<Utc>) -> bool {
        match self.round {
            RoundState::Resetting { until } if now >= until => {
                self.reset_board();
                self.clear_player_points();
                self.remove_disconnected_players();
                true
            }
            _ => false,
        }
    }

    /// Replaces the board with an empty one sized by the next dimensions and reopens input.
    pub fn reset_board(&mut self) {
        self.board = Board::new(self.next_dimensions);
        self.round = RoundState::Active;
        log::debug!(
            "Game {}: new board {:?} with seed {}",
            self.id,
            self.next_dimensions,
            self.board.seed()
        );
    }

    pub fn clear_player_points(&mut self) {
        for player in &mut self.players {
            player.points = 0;
        }
    }

    pub fn remove_disconnected_players(&mut self) {
        self.players.retain(|player| player.connected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_game(seed: &str, config: GameConfig) -> Game {
        Game::with_board(Board::with_seed(config, seed), "test")
    }

    fn first_mine(board: &Board) -> Coord2 {
        board
            .squares()
            .iter()
            .find(|square| square.is_mine())
            .map(Square::coords)
            .unwrap()
    }

    #[test]
    fn reveal_credits_every_square_of_a_cascade() {
        let mut game = seeded_game("cascade", GameConfig::new((8, 8), 10));
        game.add_player(Some("ada"));

        let changed = game.reveal((3, 3), "ada");

        assert!(!changed.is_empty());
        assert_eq!(game.player("ada").unwrap().points, changed.len() as u32);
    }

    #[test]
    fn losing_click_scores_nothing() {
        let mut game = seeded_game("boom", GameConfig::new((8, 8), 30));
        game.add_player(Some("ada"));
        game.add_player(Some("bob"));
        game.reveal((0, 0), "ada");
        let ada_points = game.player("ada").unwrap().points;

        let mine = first_mine(game.board());
        let changed = game.reveal(mine, "bob");

        assert_eq!(changed.len(), 1);
        assert!(game.board().lost());
        assert_eq!(game.player("bob").unwrap().points, 0);
        assert_eq!(game.player("ada").unwrap().points, ada_points);
        assert_eq!(game.round_state(), RoundState::Finished);
    }

    #[test]
    fn finished_round_drops_input() {
        let mut game = seeded_game("finish", GameConfig::new((6, 6), 15));
        game.add_player(Some("ada"));
        game.reveal((0, 0), "ada");
        let mine = first_mine(game.board());
        game.reveal(mine, "ada");

        assert!(game.reveal((5, 5), "ada").is_empty());
        assert!(game.toggle_flag((5, 5)).is_none());
    }

    #[test]
    fn reset_window_gates_input_until_it_elapses() {
        let mut game = seeded_game("window", GameConfig::new((6, 6), 15))
            .with_reset_delay(Duration::seconds(5));
        game.add_player(Some("ada"));
        game.add_player(Some("bob"));
        game.reveal((0, 0), "ada");
        let mine = first_mine(game.board());
        game.reveal(mine, "bob");
        game.player_disconnected("bob");

        let now = Utc::now();
        let until = game.begin_reset(now).unwrap();
        assert_eq!(until, now + Duration::seconds(5));
        assert!(game.is_resetting());
        assert!(game.begin_reset(now).is_none());
        assert!(game.reveal((1, 1), "ada").is_empty());
        assert!(!game.poll_reset(now + Duration::seconds(4)));
        assert!(game.player("bob").is_some());

        assert!(game.poll_reset(until));
        assert_eq!(game.round_state(), RoundState::Active);
        assert!(!game.board().is_generated());
        assert!(game.player("bob").is_none());
        assert_eq!(game.player("ada").unwrap().points, 0);
        assert!(!game.reveal((1, 1), "ada").is_empty());
    }

    #[test]
    fn reset_uses_next_dimensions() {
        let mut game = seeded_game("dims", GameConfig::new((8, 8), 10));
        game.set_next_dimensions(GameConfig::new((16, 12), 30));
        assert_eq!(game.board().config(), GameConfig::new((8, 8), 10));

        game.reset_board();

        assert_eq!(game.board().config(), GameConfig::new((16, 12), 30));
        assert_ne!(game.board().seed(), "dims");
    }

    #[test]
    fn rejoin_keeps_points() {
        let mut game = seeded_game("rejoin", GameConfig::new((8, 8), 10));
        game.add_player(Some("ada"));
        game.reveal((4, 4), "ada");
        let points = game.player("ada").unwrap().points;
        game.player_disconnected("ada");
        assert!(!game.has_connected_players());

        let player = game.add_player(Some("ada"));

        assert_eq!(player.points, points);
        assert!(player.connected);
        assert_eq!(game.players().len(), 1);
        assert_eq!(game.number_of_connected_players(), 1);
    }

    #[test]
    fn anonymous_players_get_distinct_names() {
        let mut game = seeded_game("names", GameConfig::default());
        let a = game.add_player(None);
        let b = game.add_player(None);
        assert_ne!(a.username, b.username);
        assert_eq!(game.players().len(), 2);
    }

    #[test]
    fn blank_names_are_replaced_with_generated_ones() {
        let mut game = seeded_game("blank", GameConfig::default());
        let empty = game.add_player(Some(""));
        let spaces = game.add_player(Some("   "));

        assert!(!empty.username.trim().is_empty());
        assert!(!spaces.username.trim().is_empty());
        assert_ne!(empty.username, spaces.username);
        assert!(game.player("").is_none());
        assert_eq!(game.players().len(), 2);
    }

    #[test]
    fn repeated_reveal_keeps_points_and_flags() {
        let mut game = seeded_game("again", GameConfig::new((8, 8), 10));
        game.add_player(Some("ada"));
        assert!(!game.reveal((3, 3), "ada").is_empty());
        let hidden = game
            .board()
            .squares()
            .iter()
            .find(|square| !square.revealed)
            .map(Square::coords)
            .unwrap();
        game.toggle_flag(hidden);
        let points = game.player("ada").unwrap().points;
        let flags = game.board().flag_count();
        let hidden_safe = game.board().hidden_safe();

        assert!(game.reveal((3, 3), "ada").is_empty());

        assert_eq!(game.player("ada").unwrap().points, points);
        assert_eq!(game.board().flag_count(), flags);
        assert_eq!(game.board().hidden_safe(), hidden_safe);
        assert_eq!(game.board().reveals().len(), points as usize);
    }

    #[test]
    fn winner_lists_ties_in_roster_order() {
        let mut game = seeded_game("tie", GameConfig::default());
        for name in ["ada", "bob", "cyd"] {
            game.add_player(Some(name));
        }
        game.players[0].points = 7;
        game.players[1].points = 3;
        game.players[2].points = 7;

        assert_eq!(game.winner(), "ada, cyd");
    }

    #[test]
    fn winner_is_empty_without_points() {
        let mut game = seeded_game("none", GameConfig::default());
        assert_eq!(game.winner(), "");
        game.add_player(Some("ada"));
        assert_eq!(game.winner(), "");
    }

    #[test]
    fn protected_game_keeps_sharing_settings() {
        let mut game = seeded_game("share", GameConfig::default());
        assert!(game.update_sharing("Friday", false));
        assert_eq!(game.name(), "Friday");
        assert!(!game.is_hidden());

        game.protect();
        assert!(!game.update_sharing("Other", true));
        assert_eq!(game.name(), "Friday");
    }
}

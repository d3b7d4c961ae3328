//! Wire messages exchanged with connected players, as JSON.

use mines_core::{Board, Dimensions, Player, Square};
use serde::{Deserialize, Serialize};

/// First message of a connection. Both fields are optional: a missing name is generated and a
/// missing or unknown game id lands the player in the default game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub game_id: Option<String>,
}

/// Messages sent by a player once joined.
///
/// Coordinates and dimensions arrive as signed integers straight from the client and are
/// range-checked on use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "lowercase")]
pub enum ClientAction {
    Reveal {
        x: i64,
        y: i64,
    },
    Flag {
        x: i64,
        y: i64,
    },
    #[serde(rename = "next dimensions")]
    NextDimensions {
        width: i64,
        height: i64,
        mines: i64,
    },
    #[serde(rename = "share game")]
    ShareGame {
        name: String,
        hidden: bool,
    },
}

impl ClientAction {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Messages sent to players.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "set username")]
    SetUsername { username: String },
    #[serde(rename = "players")]
    Players(Vec<Player>),
    /// Whole board as the players see it, indexed `[x][y]`.
    #[serde(rename = "board")]
    Board {
        board: Vec<Vec<Square>>,
        dimensions: Dimensions,
    },
    /// Squares that changed, never carrying hidden information.
    #[serde(rename = "squares")]
    Squares(Vec<Square>),
    #[serde(rename = "flag count")]
    FlagCount(i32),
    #[serde(rename = "next dimensions")]
    NextDimensions(Dimensions),
    #[serde(rename = "share game", rename_all = "camelCase")]
    ShareGame {
        name: String,
        hidden: bool,
        is_default_game: bool,
    },
    /// The losing player and every square that was still hidden.
    #[serde(rename = "lose")]
    Lose { loser: String, squares: Vec<Square> },
    /// Comma separated names of the top scorers.
    #[serde(rename = "win")]
    Win(String),
}

impl ServerEvent {
    pub fn board(board: &Board) -> Self {
        Self::Board {
            board: board.squares_for_player(),
            dimensions: board.dimensions(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Who an event goes to: the player whose message caused it, or everyone in the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Audience {
    Sender,
    Room,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub audience: Audience,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn sender(event: ServerEvent) -> Self {
        Self {
            audience: Audience::Sender,
            event,
        }
    }

    pub fn room(event: ServerEvent) -> Self {
        Self {
            audience: Audience::Room,
            event,
        }
    }
}

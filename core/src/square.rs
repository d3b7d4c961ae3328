use serde::{Deserialize, Serialize};

use crate::*;

/// One cell of a shared board.
///
/// `mine` and `count` stay `None` until the board is generated. Squares handed to players go through
/// [`Square::for_player`] so hidden squares never carry them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Square {
    pub x: Coord,
    pub y: Coord,
    pub revealed: bool,
    pub flagged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mine: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revealed_by: Option<String>,
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub lose: bool,
}

impl Square {
    pub(crate) fn new((x, y): Coord2) -> Self {
        Self {
            x,
            y,
            revealed: false,
            flagged: false,
            mine: None,
            count: None,
            revealed_by: None,
            lose: false,
        }
    }

    pub const fn coords(&self) -> Coord2 {
        (self.x, self.y)
    }

    pub fn is_mine(&self) -> bool {
        self.mine.unwrap_or(false)
    }

    /// Copy of this square that is safe to send to any player.
    pub fn for_player(&self) -> Self {
        let mut square = self.clone();
        if !square.revealed {
            square.mine = None;
            square.count = None;
        }
        square
    }
}

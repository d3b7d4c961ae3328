//! Authoritative state for shared-board multiplayer mines.
//!
//! A [`Board`] owns one grid and its seeded mine layout, a [`Game`] puts players and scoring on top
//! of a board, and [`Games`] keeps track of every live game.

use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use game::*;
pub use generator::*;
pub use identity::*;
pub use registry::*;
pub use replay::*;
pub use settings::*;
pub use square::*;
pub use types::*;

mod board;
mod error;
mod game;
mod generator;
mod identity;
mod registry;
mod replay;
mod settings;
mod square;
mod types;

/// Board dimensions and target mine count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Dimensions", into = "Dimensions")]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new((size_x, size_y): Coord2, mines: CellCount) -> Self {
        let size_x = size_x.max(1);
        let size_y = size_y.max(1);
        let mines = mines.clamp(1, mult(size_x, size_y));
        Self::new_unchecked((size_x, size_y), mines)
    }

    /// Builds a config from untrusted numbers, clamping each into range.
    pub fn clamped(width: i64, height: i64, mines: i64) -> Self {
        let axis = |value: i64| value.clamp(1, Coord::MAX.into()) as Coord;
        let config = Self::new(
            (axis(width), axis(height)),
            mines.clamp(1, CellCount::MAX.into()) as CellCount,
        );
        if i64::from(config.size.0) != width
            || i64::from(config.size.1) != height
            || i64::from(config.mines) != mines
        {
            log::warn!(
                "Clamped board {}x{} with {} mines to {:?}",
                width,
                height,
                mines,
                config
            );
        }
        config
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked((8, 8), 10)
    }
}

/// Wire shape of a [`GameConfig`]: `{"width": 8, "height": 8, "mines": 10}`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
}

impl From<Dimensions> for GameConfig {
    fn from(dimensions: Dimensions) -> Self {
        Self::new((dimensions.width, dimensions.height), dimensions.mines)
    }
}

impl From<GameConfig> for Dimensions {
    fn from(config: GameConfig) -> Self {
        Self {
            width: config.width(),
            height: config.height(),
            mines: config.mines,
        }
    }
}

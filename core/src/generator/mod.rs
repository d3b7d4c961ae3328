use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;
pub use seeded::*;

mod seeded;

/// Source of mine layouts for a board configuration.
pub trait MineLayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout;
}

/// Mine positions of a generated board with the adjacent mine count of every square, both
/// indexed `[x, y]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mines: Array2<bool>,
    counts: Array2<u8>,
    placed: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mines: Array2<bool>) -> Self {
        let counts = Array2::from_shape_fn(mines.raw_dim(), |(x, y)| {
            mines
                .iter_neighbors((x as Coord, y as Coord))
                .filter(|pos| mines[pos.to_nd_index()])
                .count() as u8
        });
        let placed = mines.iter().filter(|&&mine| mine).count() as CellCount;
        Self {
            mines,
            counts,
            placed,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mines = Array2::from_elem(size.to_nd_index(), false);
        for &pos in mine_coords {
            *mines
                .get_mut(pos.to_nd_index())
                .ok_or(GameError::InvalidCoords)? = true;
        }
        Ok(Self::from_mine_mask(mines))
    }

    pub fn size(&self) -> Coord2 {
        let (width, height) = self.mines.dim();
        (width as Coord, height as Coord)
    }

    pub fn total_cells(&self) -> CellCount {
        self.mines.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.placed
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.placed
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.mines[coords.to_nd_index()]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.counts[coords.to_nd_index()]
    }
}

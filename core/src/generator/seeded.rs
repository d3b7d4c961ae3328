use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use super::*;

/// Deterministic generator: the same seed, board size and first click always give the same layout.
///
/// The first click and its neighbors are reserved and never hold a mine. Every other cell takes the
/// next entry of a seeded permutation of `min(mines, free cells)` mines padded with safe cells, in
/// x-major then y order.
#[derive(Clone, Debug, PartialEq)]
pub struct SeededGenerator<'a> {
    seed: &'a str,
    start: Coord2,
}

impl<'a> SeededGenerator<'a> {
    pub fn new(seed: &'a str, start: Coord2) -> Self {
        Self { seed, start }
    }
}

impl MineLayoutGenerator for SeededGenerator<'_> {
    fn generate(self, config: GameConfig) -> MineLayout {
        let mut reserved: Array2<bool> = Array2::default(config.size.to_nd_index());
        reserved[self.start.to_nd_index()] = true;
        for coords in reserved.iter_neighbors(self.start) {
            reserved[coords.to_nd_index()] = true;
        }
        let reserved_count = reserved.iter().filter(|&&r| r).count() as CellCount;

        let free_cells = config.total_cells() - reserved_count;
        if config.mines > free_cells {
            log::warn!(
                "Minefield already full, placing {} mines instead of the requested {}",
                free_cells,
                config.mines
            );
        }
        let mines_to_place = config.mines.min(free_cells);

        let mut distribution: Vec<bool> = (0..free_cells).map(|i| i < mines_to_place).collect();
        shuffle_with_seed(&mut distribution, self.seed);

        let mut next_mine = distribution.into_iter();
        let mine_mask = Array2::from_shape_fn(config.size.to_nd_index(), |pos| {
            // `from_shape_fn` visits in logical order, the last axis (y) fastest
            !reserved[pos] && next_mine.next().unwrap_or(false)
        });

        MineLayout::from_mine_mask(mine_mask)
    }
}

/// Seeded Fisher-Yates shuffle.
///
/// The seed string is hashed with SHA-256 into a ChaCha8 key, so any string is usable and the
/// permutation is stable across platforms.
pub fn shuffle_with_seed<T>(items: &mut [T], seed: &str) {
    let mut rng = seeded_rng(seed);
    for i in (1..items.len()).rev() {
        // sampled as u64 so 32-bit targets draw the same stream
        let j = rng.gen_range(0..=i as u64) as usize;
        items.swap(i, j);
    }
}

fn seeded_rng(seed: &str) -> ChaCha8Rng {
    let digest = Sha256::digest(seed.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    ChaCha8Rng::from_seed(key)
}

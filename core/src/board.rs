use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Identity credited with the very first reveal when the caller did not name a player.
pub const DEFAULT_PLAYER: &str = "default";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardState {
    /// Mines not placed yet, waiting for the first reveal.
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl BoardState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One entry of the reveal log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealRecord {
    pub x: Coord,
    pub y: Coord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
}

/// A flag toggle, positioned before reveal log entry `at`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRecord {
    pub x: Coord,
    pub y: Coord,
    pub at: usize,
}

/// One shared minefield.
///
/// Mines are placed lazily around the first revealed square using the board seed, so the seed, the
/// dimensions and the first click fully determine the layout. Every revealed square is appended to
/// an ordered log that can replay the board (see [`Replay`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: GameConfig,
    seed: String,
    squares: Array2<Square>,
    state: BoardState,
    initial: Option<Coord2>,
    hidden_safe: CellCount,
    flag_count: i32,
    reveals: Vec<RevealRecord>,
    flag_toggles: Vec<FlagRecord>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl Board {
    /// Empty board with a fresh random seed.
    pub fn new(config: GameConfig) -> Self {
        Self::with_seed(config, random_seed())
    }

    pub fn with_seed(config: GameConfig, seed: impl Into<String>) -> Self {
        let seed = seed.into();
        log::debug!("Board {}: created {:?}", seed, config);
        Self {
            config,
            seed,
            squares: Array2::from_shape_fn(config.size.to_nd_index(), |(x, y)| {
                Square::new((x as Coord, y as Coord))
            }),
            state: BoardState::Ready,
            initial: None,
            hidden_safe: 0,
            flag_count: 0,
            reveals: Vec::new(),
            flag_toggles: Vec::new(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn dimensions(&self) -> Dimensions {
        self.config.into()
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn is_generated(&self) -> bool {
        self.initial.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn won(&self) -> bool {
        matches!(self.state, BoardState::Won)
    }

    pub fn lost(&self) -> bool {
        matches!(self.state, BoardState::Lost)
    }

    /// First click, known once the board is generated.
    pub fn initial(&self) -> Option<Coord2> {
        self.initial
    }

    /// Safe squares nobody has revealed yet.
    pub fn hidden_safe(&self) -> CellCount {
        self.hidden_safe
    }

    pub fn flag_count(&self) -> i32 {
        self.flag_count
    }

    pub fn reveals(&self) -> &[RevealRecord] {
        &self.reveals
    }

    pub fn flag_toggles(&self) -> &[FlagRecord] {
        &self.flag_toggles
    }

    pub fn squares(&self) -> &Array2<Square> {
        &self.squares
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn in_bounds(&self, (x, y): Coord2) -> bool {
        x < self.config.width() && y < self.config.height()
    }

    pub fn square(&self, coords: Coord2) -> Option<&Square> {
        self.squares.get(coords.to_nd_index())
    }

    /// In-bounds neighbors of `coords`, up to eight.
    pub fn adjacent(&self, coords: Coord2) -> NeighborIter {
        self.squares.iter_neighbors(coords)
    }

    pub fn adjacent_squares(&self, coords: Coord2) -> SmallVec<[&Square; 8]> {
        self.adjacent(coords)
            .map(|pos| &self.squares[pos.to_nd_index()])
            .collect()
    }

    /// Places the mines around the first click.
    ///
    /// # Panics
    ///
    /// When the board was already generated: a second layout would break replays.
    pub fn generate(&mut self, start: Coord2) -> Result<()> {
        assert!(
            !self.is_generated(),
            "board {} generated twice (first click {:?}, again at {:?})",
            self.seed,
            self.initial,
            start
        );
        if !self.in_bounds(start) {
            return Err(GameError::InvalidCoords);
        }

        let layout = SeededGenerator::new(&self.seed, start).generate(self.config);
        for ((x, y), square) in self.squares.indexed_iter_mut() {
            let coords = (x as Coord, y as Coord);
            square.mine = Some(layout.contains_mine(coords));
            square.count = Some(layout.adjacent_mine_count(coords));
        }

        self.hidden_safe = layout.safe_cell_count();
        self.initial = Some(start);
        self.started_at = Some(Utc::now());
        self.state = BoardState::Active;
        log::debug!(
            "Board {}: generated {} mines, start serialization: {}",
            self.seed,
            layout.mine_count(),
            self.serialize_start().unwrap_or_default()
        );
        Ok(())
    }

    /// Reveals a square, flooding outward from squares with no adjacent mines.
    ///
    /// Returns every square that changed, the clicked one first. Out of bounds, already revealed
    /// and finished boards give an empty list.
    pub fn reveal(&mut self, coords: Coord2, player: Option<&str>) -> Vec<Square> {
        if !self.in_bounds(coords) {
            return Vec::new();
        }

        let player = if self.is_generated() {
            player
        } else {
            if let Err(err) = self.generate(coords) {
                log::warn!("Board {}: could not generate at {:?}: {}", self.seed, coords, err);
                return Vec::new();
            }
            Some(player.unwrap_or(DEFAULT_PLAYER))
        };

        if self.is_finished() {
            return Vec::new();
        }

        let mut changed = Vec::new();
        // `revealed` is the visited set: a square is expanded at most once
        let mut pending = vec![coords];
        while let Some(pos) = pending.pop() {
            if !self.reveal_single(pos, player) {
                continue;
            }

            let square = &self.squares[pos.to_nd_index()];
            changed.push(square.clone());

            if square.count == Some(0) && !square.is_mine() {
                let neighbors: SmallVec<[Coord2; 8]> = self
                    .adjacent(pos)
                    .filter(|&n| !self.squares[n.to_nd_index()].revealed)
                    .collect();
                log::trace!("Board {}: flooding from {:?} into {:?}", self.seed, pos, neighbors);
                // reversed so the first neighbor is expanded first
                pending.extend(neighbors.into_iter().rev());
            }
        }

        changed
    }

    fn reveal_single(&mut self, (x, y): Coord2, player: Option<&str>) -> bool {
        let square = &mut self.squares[(x, y).to_nd_index()];
        if square.revealed {
            return false;
        }

        square.revealed = true;
        square.revealed_by = player.map(str::to_owned);
        let was_flagged = std::mem::take(&mut square.flagged);
        let is_mine = square.is_mine();

        self.reveals.push(RevealRecord {
            x,
            y,
            by: player.map(str::to_owned),
        });

        if was_flagged {
            self.flag_count -= 1;
        }

        if is_mine {
            log::debug!("Board {}: mine hit at {:?}", self.seed, (x, y));
            self.end(BoardState::Lost);
        } else {
            self.hidden_safe -= 1;
            if self.hidden_safe == 0 {
                self.end(BoardState::Won);
            }
        }

        true
    }

    fn end(&mut self, state: BoardState) {
        if self.state.is_finished() {
            return;
        }
        self.state = state;
        self.ended_at = Some(Utc::now());
        log::debug!("Board {}: finished {:?} after {:?}s", self.seed, state, self.time());
    }

    /// Flags a hidden square or clears its flag. Returns the square when it changed.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Option<Square> {
        if !self.can_mark(coords) {
            return None;
        }
        if self.squares[coords.to_nd_index()].flagged {
            self.unflag(coords);
        } else {
            self.flag(coords);
        }
        self.square(coords).cloned()
    }

    pub fn flag(&mut self, coords: Coord2) -> bool {
        self.set_flag(coords, true)
    }

    pub fn unflag(&mut self, coords: Coord2) -> bool {
        self.set_flag(coords, false)
    }

    fn can_mark(&self, coords: Coord2) -> bool {
        !self.is_finished() && self.square(coords).is_some_and(|square| !square.revealed)
    }

    fn set_flag(&mut self, (x, y): Coord2, flagged: bool) -> bool {
        if !self.can_mark((x, y)) {
            return false;
        }
        let square = &mut self.squares[(x, y).to_nd_index()];
        if square.flagged == flagged {
            return false;
        }

        square.flagged = flagged;
        self.flag_count += if flagged { 1 } else { -1 };
        self.flag_toggles.push(FlagRecord {
            x,
            y,
            at: self.reveals.len(),
        });
        true
    }

    /// Every square as a player may see it, indexed `[x][y]`.
    pub fn squares_for_player(&self) -> Vec<Vec<Square>> {
        self.squares
            .outer_iter()
            .map(|column| column.iter().map(Square::for_player).collect())
            .collect()
    }

    /// Squares revealed by `player`.
    pub fn squares_revealed_by(&self, player: &str) -> Vec<Square> {
        self.squares
            .iter()
            .filter(|square| square.revealed_by.as_deref() == Some(player))
            .cloned()
            .collect()
    }

    /// Every unrevealed square with full information and the `lose` marker, for the final view of
    /// a lost round.
    pub fn remaining_squares(&self) -> Vec<Square> {
        self.squares
            .iter()
            .filter(|square| !square.revealed)
            .map(|square| Square {
                lose: true,
                ..square.clone()
            })
            .collect()
    }

    /// Seconds from the first click to the end of the round, `None` while it is not finished.
    pub fn time(&self) -> Option<f64> {
        let (started_at, ended_at) = (self.started_at?, self.ended_at?);
        Some((ended_at - started_at).num_milliseconds() as f64 / 1000.0)
    }

    /// `height/width/mines/seed/initialX/initialY`, enough to regenerate the layout.
    pub fn serialize_start(&self) -> Option<String> {
        StartRecord::from_board(self).map(|record| record.to_string())
    }

    /// Encoded replay of the whole round, see [`Replay`].
    pub fn serialize(&self) -> Option<String> {
        Replay::from_board(self).map(|replay| replay.encode())
    }
}

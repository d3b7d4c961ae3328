use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::*;

/// Everything needed to regenerate a board's layout, printed as
/// `height/width/mines/seed/initialX/initialY`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartRecord {
    pub config: GameConfig,
    pub seed: String,
    pub initial: Coord2,
}

impl StartRecord {
    pub fn from_board(board: &Board) -> Option<Self> {
        Some(Self {
            config: board.config(),
            seed: board.seed().to_owned(),
            initial: board.initial()?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.config.size;
        let mines = self.config.mines;
        if GameConfig::new((width, height), mines) != self.config {
            return Err(GameError::MalformedStart(format!(
                "{width}x{height} board cannot hold {mines} mines"
            )));
        }
        if self.initial.0 >= width || self.initial.1 >= height {
            return Err(GameError::InvalidCoords);
        }
        Ok(())
    }

    /// Fresh board with the recorded layout, the first click not yet revealed.
    pub fn regenerate(&self) -> Result<Board> {
        let mut board = Board::with_seed(self.config, self.seed.clone());
        board.generate(self.initial)?;
        Ok(board)
    }
}

impl fmt::Display for StartRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}",
            self.config.height(),
            self.config.width(),
            self.config.mines,
            self.seed,
            self.initial.0,
            self.initial.1
        )
    }
}

impl FromStr for StartRecord {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        fn field<T: FromStr>(value: Option<&str>, name: &str) -> Result<T> {
            value
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| GameError::MalformedStart(format!("bad or missing {name}")))
        }

        // the seed sits in the middle and may itself contain slashes
        let mut head = s.splitn(4, '/');
        let height: Coord = field(head.next(), "height")?;
        let width: Coord = field(head.next(), "width")?;
        let mines: CellCount = field(head.next(), "mines")?;
        let rest = head
            .next()
            .ok_or_else(|| GameError::MalformedStart("missing seed".into()))?;

        let mut tail = rest.rsplitn(3, '/');
        let initial_y: Coord = field(tail.next(), "initialY")?;
        let initial_x: Coord = field(tail.next(), "initialX")?;
        let seed = tail
            .next()
            .ok_or_else(|| GameError::MalformedStart("missing seed".into()))?;

        let record = Self {
            config: GameConfig::new_unchecked((width, height), mines),
            seed: seed.to_owned(),
            initial: (initial_x, initial_y),
        };
        record.validate()?;
        Ok(record)
    }
}

/// Full record of a round: the start record plus the ordered reveal log and flag toggles.
///
/// Rebuilding regenerates the layout from the seed and first click, then re-applies the log, which
/// reproduces the squares, outcome and flag count of the recorded board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replay {
    pub height: Coord,
    pub width: Coord,
    pub mines: CellCount,
    pub seed: String,
    pub initial_x: Coord,
    pub initial_y: Coord,
    pub reveals: Vec<RevealRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagRecord>,
}

impl Replay {
    pub fn from_board(board: &Board) -> Option<Self> {
        let (initial_x, initial_y) = board.initial()?;
        let config = board.config();
        Some(Self {
            height: config.height(),
            width: config.width(),
            mines: config.mines,
            seed: board.seed().to_owned(),
            initial_x,
            initial_y,
            reveals: board.reveals().to_vec(),
            flags: board.flag_toggles().to_vec(),
        })
    }

    pub fn start(&self) -> StartRecord {
        StartRecord {
            config: GameConfig::new_unchecked((self.width, self.height), self.mines),
            seed: self.seed.clone(),
            initial: (self.initial_x, self.initial_y),
        }
    }

    /// Hex encoded JSON.
    ///
    /// # Panics
    ///
    /// Never in practice: every field is a string, an integer or a list of those.
    pub fn encode(&self) -> String {
        hex::encode(serde_json::to_vec(self).expect("replay of plain fields always serializes"))
    }

    pub fn decode(blob: &str) -> Result<Self> {
        let bytes = hex::decode(blob.trim())?;
        let replay: Self = serde_json::from_slice(&bytes)?;
        replay.start().validate()?;
        Ok(replay)
    }

    /// Regenerates the board and re-applies every recorded flag toggle and reveal in order.
    pub fn rebuild(&self) -> Result<Board> {
        let mut board = self.start().regenerate()?;
        let mut flags = self.flags.iter().peekable();

        for (index, record) in self.reveals.iter().enumerate() {
            while let Some(flag) = flags.next_if(|flag| flag.at <= index) {
                self.apply_flag(&mut board, flag)?;
            }
            // entries already revealed by an earlier cascade are no-ops
            board.reveal((record.x, record.y), record.by.as_deref());
            if board.reveals().get(index) != Some(record) {
                log::warn!(
                    "Replay of board {} diverged at reveal {}: {:?}",
                    self.seed,
                    index,
                    record
                );
                return Err(GameError::ReplayDiverged { index });
            }
        }
        for flag in flags {
            self.apply_flag(&mut board, flag)?;
        }

        if board.reveals().len() != self.reveals.len() {
            return Err(GameError::ReplayDiverged {
                index: self.reveals.len(),
            });
        }
        Ok(board)
    }

    fn apply_flag(&self, board: &mut Board, flag: &FlagRecord) -> Result<()> {
        if board.toggle_flag((flag.x, flag.y)).is_none() {
            return Err(GameError::ReplayDiverged {
                index: board.reveals().len(),
            });
        }
        Ok(())
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Malformed start record: {0}")]
    MalformedStart(String),
    #[error("Replay blob is not valid hex: {0}")]
    ReplayEncoding(#[from] hex::FromHexError),
    #[error("Replay or settings document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Replay diverged from its recorded reveal log at entry {index}")]
    ReplayDiverged { index: usize },
    #[error("Invalid settings: {0}")]
    InvalidSettings(&'static str),
}

pub type Result<T> = core::result::Result<T, GameError>;

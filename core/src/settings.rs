use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Engine-wide settings, usually read from a JSON config file.
///
/// ```json
/// {"board": {"width": 16, "height": 16, "mines": 40}, "resetDelayMs": 5000}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Board used by the default game and by games created without explicit dimensions.
    pub board: GameConfig,
    /// How long a finished round stays on screen before the board is replaced.
    pub reset_delay_ms: u64,
    pub default_game_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            board: GameConfig::default(),
            reset_delay_ms: 5000,
            default_game_name: "Default game".into(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        log::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.try_reset_delay().is_none() {
            return Err(GameError::InvalidSettings("reset delay is out of range"));
        }
        if self.default_game_name.trim().is_empty() {
            return Err(GameError::InvalidSettings("default game name is empty"));
        }
        Ok(())
    }

    pub fn reset_delay(&self) -> Duration {
        self.try_reset_delay().unwrap_or(Duration::zero())
    }

    fn try_reset_delay(&self) -> Option<Duration> {
        i64::try_from(self.reset_delay_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
    }
}

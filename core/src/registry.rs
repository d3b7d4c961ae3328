use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::*;

/// Shared handle to one game. The lock admits one mutation at a time per game; different games
/// never contend.
#[derive(Clone, Debug)]
pub struct GameHandle(Arc<Mutex<Game>>);

impl GameHandle {
    pub fn new(game: Game) -> Self {
        Self(Arc::new(Mutex::new(game)))
    }

    /// Locks the game for one mutation.
    ///
    /// # Panics
    ///
    /// When a previous holder panicked mid-mutation, leaving the game in an unknown state.
    pub fn lock(&self) -> MutexGuard<'_, Game> {
        self.0.lock().expect("game lock poisoned")
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Every live game, including the always-present default game.
#[derive(Debug)]
pub struct Games {
    settings: Settings,
    default_id: String,
    games: BTreeMap<String, GameHandle>,
}

impl Games {
    pub fn new(settings: Settings) -> Self {
        let mut default_game = Game::new(settings.board, settings.default_game_name.clone())
            .with_reset_delay(settings.reset_delay());
        default_game.protect();
        default_game.unhide();

        let default_id = default_game.id().to_owned();
        let mut games = BTreeMap::new();
        games.insert(default_id.clone(), GameHandle::new(default_game));
        log::debug!("Games: default game {}", default_id);

        Self {
            settings,
            default_id,
            games,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Creates a hidden game, using the configured board when no dimensions are given.
    pub fn create(&mut self, config: Option<GameConfig>, name: Option<&str>) -> GameHandle {
        let game = Game::new(
            config.unwrap_or(self.settings.board),
            name.unwrap_or("Unnamed game"),
        )
        .with_reset_delay(self.settings.reset_delay());
        let id = game.id().to_owned();
        let handle = GameHandle::new(game);
        self.games.insert(id.clone(), handle.clone());
        log::debug!("Games: created {}", id);
        handle
    }

    pub fn get(&self, id: &str) -> Option<GameHandle> {
        self.games.get(id).cloned()
    }

    /// The game with `id`, falling back to the default game.
    pub fn get_or_default(&self, id: Option<&str>) -> GameHandle {
        id.and_then(|id| self.get(id))
            .unwrap_or_else(|| self.default_game())
    }

    pub fn default_game(&self) -> GameHandle {
        // the default game is protected from `sweep`, so it is always present
        self.games[&self.default_id].clone()
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Drops every unprotected game nobody is connected to. Returns the removed ids.
    pub fn sweep(&mut self) -> Vec<String> {
        let mut removed = Vec::new();
        self.games.retain(|id, handle| {
            let game = handle.lock();
            let keep = game.do_not_delete() || game.has_connected_players();
            if !keep {
                removed.push(id.clone());
            }
            keep
        });
        if !removed.is_empty() {
            log::debug!("Games: swept {:?}", removed);
        }
        removed
    }

    /// Listed games with their names, in id order.
    pub fn available(&self) -> Vec<(String, String)> {
        self.games
            .iter()
            .filter_map(|(id, handle)| {
                let game = handle.lock();
                (!game.is_hidden()).then(|| (id.clone(), game.name().to_owned()))
            })
            .collect()
    }

    /// Every game in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GameHandle)> {
        self.games.iter().map(|(id, handle)| (id.as_str(), handle))
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Default for Games {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

//! Application state shared across routes

use std::sync::Arc;
use tracing::info;

use crate::arena::Arena;
use crate::config::Config;
use crate::game::{ActiveSet, PlayerId};
use crate::ws::Broadcaster;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub arena: Arc<Arena>,
    pub broadcaster: Arc<Broadcaster>,
    /// Players still in the running round; connections drop theirs on disconnect
    pub active_set: Arc<ActiveSet>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // Session events and arena teleports share one channel
        let broadcaster = Arc::new(Broadcaster::new());
        let arena = Arc::new(Arena::new(config.arena.clone(), broadcaster.sender()));

        Self {
            config,
            arena,
            broadcaster,
            active_set: Arc::new(ActiveSet::new()),
        }
    }

    /// Remove a player from the world and from the running round
    pub fn disconnect(&self, player: PlayerId) {
        if let Some(body) = self.arena.remove_player(player) {
            info!(player_id = %player, display_name = %body.display_name, "Player left");
        }
        self.active_set.remove(player);
    }
}

//! Players still eligible for elimination in the current round

use parking_lot::Mutex;
use std::collections::HashSet;

use super::ports::PlayerId;

/// Shared between the session task and connection handlers.
///
/// Only the elimination step and disconnect handling shrink the set; both
/// go through [`ActiveSet::remove`], which tolerates absent players.
#[derive(Debug, Default)]
pub struct ActiveSet {
    players: Mutex<HashSet<PlayerId>>,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents at round start
    pub fn reset(&self, players: impl IntoIterator<Item = PlayerId>) {
        let mut guard = self.players.lock();
        guard.clear();
        guard.extend(players);
    }

    /// Returns whether the player was present
    pub fn remove(&self, player: PlayerId) -> bool {
        self.players.lock().remove(&player)
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.lock().contains(&player)
    }

    pub fn len(&self) -> usize {
        self.players.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.lock().is_empty()
    }

    /// Sorted copy, so iteration order does not depend on hashing
    pub fn snapshot(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self.players.lock().iter().copied().collect();
        players.sort();
        players
    }

    pub fn clear(&self) {
        self.players.lock().clear();
    }
}

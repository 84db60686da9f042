//! In-process world: player bodies, map template and live round maps

pub mod geometry;
pub mod map;

pub use map::MapTemplate;

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

use crate::game::palette::Color;
use crate::game::ports::{
    MapProvider, Pad, PadContainer, PadId, PlayerDirectory, PlayerId, Position, RoundMap,
    ScreenContainer, SpatialQuery, TeleportSink,
};
use crate::ws::protocol::ServerMsg;

use map::{RoundMapState, ScreenDisplay};

/// Arena layout settings
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaConfig {
    /// `None` means no map can be cloned
    pub template: Option<MapTemplate>,
    pub lobby_spawn: Option<Position>,
    pub loser_spawn: Option<Position>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            template: Some(MapTemplate::default()),
            lobby_spawn: Some(Position::new(0.0, 5.0, -80.0)),
            loser_spawn: Some(Position::new(0.0, 5.0, 80.0)),
        }
    }
}

/// A connected player's body
#[derive(Debug, Clone)]
pub struct PlayerBody {
    pub display_name: String,
    pub position: Option<Position>,
}

/// Authoritative world state shared by the session task and connections
pub struct Arena {
    config: ArenaConfig,
    players: DashMap<PlayerId, PlayerBody>,
    maps: DashMap<u64, RoundMapState>,
    next_map_id: AtomicU64,
    events: broadcast::Sender<ServerMsg>,
}

impl Arena {
    pub fn new(config: ArenaConfig, events: broadcast::Sender<ServerMsg>) -> Self {
        Self {
            config,
            players: DashMap::new(),
            maps: DashMap::new(),
            next_map_id: AtomicU64::new(1),
            events,
        }
    }

    /// Register a player; the body starts at the lobby spawn
    pub fn join(&self, display_name: String) -> PlayerId {
        let id = PlayerId::new();
        self.players.insert(
            id,
            PlayerBody {
                display_name,
                position: self.config.lobby_spawn,
            },
        );
        id
    }

    /// Returns false for unknown players
    pub fn update_position(&self, player: PlayerId, position: Position) -> bool {
        match self.players.get_mut(&player) {
            Some(mut body) => {
                body.position = Some(position);
                true
            }
            None => false,
        }
    }

    pub fn remove_player(&self, player: PlayerId) -> Option<PlayerBody> {
        self.players.remove(&player).map(|(_, body)| body)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn live_maps(&self) -> usize {
        self.maps.len()
    }

    /// What each screen of a live map shows
    pub fn screens(&self, screens: ScreenContainer) -> Vec<ScreenDisplay> {
        self.maps
            .get(&screens.0)
            .map(|m| m.screens.clone())
            .unwrap_or_default()
    }

    pub fn pad_color(&self, pads: PadContainer, pad: PadId) -> Option<Color> {
        let map = self.maps.get(&pads.0)?;
        let state = map.pads.iter().find(|p| p.id == pad)?;
        state.color.clone()
    }
}

impl PlayerDirectory for Arena {
    fn active_players(&self) -> Vec<PlayerId> {
        self.players.iter().map(|entry| *entry.key()).collect()
    }

    fn player_position(&self, player: PlayerId) -> Option<Position> {
        self.players.get(&player).and_then(|body| body.position)
    }
}

impl MapProvider for Arena {
    fn clone_round_map(&self) -> Option<RoundMap> {
        let template = self.config.template.as_ref()?;
        let id = self.next_map_id.fetch_add(1, Ordering::Relaxed);
        let state = template.instantiate();
        let has_screens = !state.screens.is_empty();
        self.maps.insert(id, state);

        debug!(map_id = id, "Round map cloned");
        Some(RoundMap {
            pads: PadContainer(id),
            screens: has_screens.then_some(ScreenContainer(id)),
        })
    }

    fn destroy_round_map(&self, pads: PadContainer) {
        if self.maps.remove(&pads.0).is_some() {
            debug!(map_id = pads.0, "Round map destroyed");
        }
    }

    fn list_pads(&self, pads: PadContainer) -> Vec<Pad> {
        self.maps
            .get(&pads.0)
            .map(|m| m.pads())
            .unwrap_or_default()
    }

    fn set_pad_color(&self, pads: PadContainer, pad: PadId, color: &Color) {
        if let Some(mut map) = self.maps.get_mut(&pads.0) {
            map.set_color(pad, color);
        }
    }

    fn show_on_screens(&self, screens: ScreenContainer, color: &Color) {
        if let Some(mut map) = self.maps.get_mut(&screens.0) {
            map.show(color);
        }
    }
}

impl SpatialQuery for Arena {
    fn is_player_on_pad_of_color(&self, player: PlayerId, color: &Color, pads: PadContainer) -> bool {
        let Some(body) = self.player_position(player) else {
            return false;
        };
        let Some(map) = self.maps.get(&pads.0) else {
            return false;
        };
        map.pad_under(&body)
            .and_then(|pad| pad.color.as_ref())
            .is_some_and(|c| c == color)
    }
}

impl TeleportSink for Arena {
    fn teleport(&self, player: PlayerId, destination: Position) {
        if !self.update_position(player, destination) {
            return;
        }
        let _ = self.events.send(ServerMsg::Teleported {
            player_id: player,
            position: destination,
        });
    }

    fn loser_destination(&self) -> Option<Position> {
        self.config.loser_spawn
    }

    fn lobby_destination(&self) -> Option<Position> {
        self.config.lobby_spawn
    }
}

//! Capabilities the round engine needs from the outside world.
//!
//! The engine never touches a scene graph directly; everything it reads or
//! writes goes through these traits. `crate::arena::Arena` is the in-process
//! implementation, tests provide their own.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::palette::Color;

/// Opaque handle identifying a connected participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// World-space position; y is up
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        let dz = (self.z - other.z) as f64;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn raised(&self, height: f32) -> Position {
        Position::new(self.x, self.y + height, self.z)
    }
}

/// Pad identifier, unique within one pad container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PadId(pub u32);

/// Read-only view of a pad; `position` is the center of its top surface
#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    pub id: PadId,
    pub position: Position,
}

/// Color given to a pad for the current tick
#[derive(Debug, Clone, PartialEq)]
pub struct PadAssignment {
    pub pad: Pad,
    pub color: Color,
}

/// Handle to a cloned round map's pads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PadContainer(pub u64);

/// Handle to a cloned round map's display surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenContainer(pub u64);

/// A freshly cloned playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundMap {
    pub pads: PadContainer,
    pub screens: Option<ScreenContainer>,
}

/// Session phase announced to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Lobby,
    Round,
}

/// Outcome of one round, reported when it finishes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundSummary {
    /// Tick cycles completed
    pub ticks: u32,
    /// Players still active when the round ended
    pub survivors: Vec<PlayerId>,
    /// Eliminated players, in elimination order
    pub eliminated: Vec<PlayerId>,
    /// Target of the final tick
    pub last_target: Option<Color>,
}

impl RoundSummary {
    /// A round that never started
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn was_skipped(&self) -> bool {
        self.ticks == 0
    }
}

/// Connected players and their physical presence
pub trait PlayerDirectory: Send + Sync {
    fn active_players(&self) -> Vec<PlayerId>;

    /// `None` when the player has no body in the world right now
    fn player_position(&self, player: PlayerId) -> Option<Position>;
}

/// Round map lifecycle and pad access
pub trait MapProvider: Send + Sync {
    fn clone_round_map(&self) -> Option<RoundMap>;

    fn destroy_round_map(&self, pads: PadContainer);

    fn list_pads(&self, pads: PadContainer) -> Vec<Pad>;

    fn set_pad_color(&self, pads: PadContainer, pad: PadId, color: &Color);

    /// Show the color swatch and name on every display in the container
    fn show_on_screens(&self, screens: ScreenContainer, color: &Color);
}

/// Containment test against the live pad container
pub trait SpatialQuery: Send + Sync {
    fn is_player_on_pad_of_color(&self, player: PlayerId, color: &Color, pads: PadContainer)
        -> bool;
}

/// Best-effort player relocation
pub trait TeleportSink: Send + Sync {
    fn teleport(&self, player: PlayerId, destination: Position);

    fn loser_destination(&self) -> Option<Position>;

    fn lobby_destination(&self) -> Option<Position>;
}

/// Everything the round engine reads from or writes to the world
pub trait World: PlayerDirectory + MapProvider + SpatialQuery + TeleportSink {}

impl<T> World for T where T: PlayerDirectory + MapProvider + SpatialQuery + TeleportSink {}

/// Fire-and-forget notifications emitted by the session
pub trait RoundObserver: Send + Sync {
    fn on_phase_changed(&self, phase: Phase);

    fn on_countdown_tick(&self, seconds_remaining: u32);

    fn on_target_color_changed(&self, color: &Color);

    fn on_pads_assigned(&self, _assignments: &[PadAssignment]) {}

    fn on_player_eliminated(&self, _player: PlayerId) {}

    fn on_round_finished(&self, _summary: &RoundSummary) {}
}

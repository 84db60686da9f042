//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};

use crate::game::palette::Color;
use crate::game::ports::{PadAssignment, PadId, Phase, PlayerId, Position, RoundSummary};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Current body position, reported by the client
    Move { x: f32, y: f32, z: f32 },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },

    /// Leave the session
    Leave,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome {
        player_id: PlayerId,
        server_time: u64,
        phase: Phase,
    },

    /// Session switched between lobby and round
    PhaseChanged { phase: Phase },

    /// Lobby countdown, ends with 0
    Countdown { seconds_remaining: u32 },

    /// Target color for the current tick
    TargetColor { color: Color },

    /// Pad colors for the current tick
    PadColors { pads: Vec<PadColorInfo> },

    /// Server moved a player
    Teleported {
        player_id: PlayerId,
        position: Position,
    },

    /// Player was not on a pad of the target color
    Eliminated { player_id: PlayerId },

    /// Round ended
    RoundFinished {
        ticks: u32,
        survivors: Vec<PlayerId>,
        eliminated: Vec<PlayerId>,
    },

    /// Error message
    Error { code: String, message: String },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

/// One pad in a `pad_colors` message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PadColorInfo {
    pub pad_id: PadId,
    pub position: Position,
    pub color: String,
    pub rgb: [u8; 3],
}

impl From<&PadAssignment> for PadColorInfo {
    fn from(a: &PadAssignment) -> Self {
        Self {
            pad_id: a.pad.id,
            position: a.pad.position,
            color: a.color.name.clone(),
            rgb: a.color.rgb,
        }
    }
}

impl From<&RoundSummary> for ServerMsg {
    fn from(summary: &RoundSummary) -> Self {
        ServerMsg::RoundFinished {
            ticks: summary.ticks,
            survivors: summary.survivors.clone(),
            eliminated: summary.eliminated.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_move_parses() {
        let msg: ClientMsg =
            serde_json::from_value(json!({"type": "move", "x": 1.0, "y": 2.5, "z": -3.0})).unwrap();
        assert_eq!(msg, ClientMsg::Move { x: 1.0, y: 2.5, z: -3.0 });

        let leave: ClientMsg = serde_json::from_str(r#"{"type":"leave"}"#).unwrap();
        assert_eq!(leave, ClientMsg::Leave);
    }

    #[test]
    fn server_messages_are_tagged() {
        let phase = serde_json::to_value(ServerMsg::PhaseChanged { phase: Phase::Lobby }).unwrap();
        assert_eq!(phase, json!({"type": "phase_changed", "phase": "Lobby"}));

        let target = serde_json::to_value(ServerMsg::TargetColor {
            color: Color::new("Blue", [0, 0, 255]),
        })
        .unwrap();
        assert_eq!(
            target,
            json!({"type": "target_color", "color": {"name": "Blue", "rgb": [0, 0, 255]}})
        );
    }
}

//! Fan-out of session events to every connected client

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::game::palette::Color;
use crate::game::ports::{PadAssignment, Phase, PlayerId, RoundObserver, RoundSummary};

use super::protocol::{PadColorInfo, ServerMsg};

/// Broadcast buffer; slow clients skip ahead past this many messages
const BROADCAST_CAPACITY: usize = 256;

/// Publishes session events on a tokio broadcast channel.
///
/// Sends are fire-and-forget: having no subscribers is not an error.
pub struct Broadcaster {
    tx: broadcast::Sender<ServerMsg>,
    phase: RwLock<Phase>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            phase: RwLock::new(Phase::Lobby),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.tx.subscribe()
    }

    /// Sender handle for other components that publish directly
    pub fn sender(&self) -> broadcast::Sender<ServerMsg> {
        self.tx.clone()
    }

    /// Last announced phase, for clients that join mid-session
    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    pub fn send(&self, msg: ServerMsg) {
        let _ = self.tx.send(msg);
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundObserver for Broadcaster {
    fn on_phase_changed(&self, phase: Phase) {
        *self.phase.write() = phase;
        self.send(ServerMsg::PhaseChanged { phase });
    }

    fn on_countdown_tick(&self, seconds_remaining: u32) {
        self.send(ServerMsg::Countdown { seconds_remaining });
    }

    fn on_target_color_changed(&self, color: &Color) {
        self.send(ServerMsg::TargetColor {
            color: color.clone(),
        });
    }

    fn on_pads_assigned(&self, assignments: &[PadAssignment]) {
        let pads = assignments.iter().map(PadColorInfo::from).collect();
        self.send(ServerMsg::PadColors { pads });
    }

    fn on_player_eliminated(&self, player: PlayerId) {
        self.send(ServerMsg::Eliminated { player_id: player });
    }

    fn on_round_finished(&self, summary: &RoundSummary) {
        self.send(ServerMsg::from(summary));
    }
}

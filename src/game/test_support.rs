//! In-memory collaborators for round and session tests

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::{ready, Future};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::util::time::Timer;

use super::palette::Color;
use super::ports::{
    MapProvider, Pad, PadAssignment, PadContainer, PadId, Phase, PlayerDirectory, PlayerId,
    Position, RoundMap, RoundObserver, RoundSummary, ScreenContainer, SpatialQuery, TeleportSink,
};

pub(crate) const LOSER_SPOT: Position = Position::new(0.0, 100.0, 0.0);
pub(crate) const LOBBY_SPOT: Position = Position::new(0.0, 200.0, 0.0);

/// In-memory world whose elimination outcomes are scripted per player.
pub(crate) struct FakeWorld {
    players: Mutex<BTreeMap<PlayerId, Option<Position>>>,
    template: Option<Vec<Pad>>,
    maps: Mutex<HashMap<u64, BTreeMap<PadId, Color>>>,
    next_map: AtomicU64,
    outcomes: Mutex<HashMap<PlayerId, VecDeque<bool>>>,
    pub(crate) clones: Mutex<u32>,
    pub(crate) destroyed: Mutex<Vec<PadContainer>>,
    pub(crate) teleports: Mutex<Vec<(PlayerId, Position)>>,
    pub(crate) screens: Mutex<Vec<String>>,
    pub(crate) loser: Option<Position>,
    pub(crate) lobby: Option<Position>,
}

impl FakeWorld {
    pub(crate) fn with_pads(count: u32) -> Self {
        let pads = (0..count)
            .map(|i| Pad {
                id: PadId(i),
                position: Position::new(i as f32 * 10.0, 0.0, 0.0),
            })
            .collect();
        Self {
            players: Mutex::new(BTreeMap::new()),
            template: Some(pads),
            maps: Mutex::new(HashMap::new()),
            next_map: AtomicU64::new(1),
            outcomes: Mutex::new(HashMap::new()),
            clones: Mutex::new(0),
            destroyed: Mutex::new(Vec::new()),
            teleports: Mutex::new(Vec::new()),
            screens: Mutex::new(Vec::new()),
            loser: Some(LOSER_SPOT),
            lobby: Some(LOBBY_SPOT),
        }
    }

    pub(crate) fn without_map() -> Self {
        Self {
            template: None,
            ..Self::with_pads(0)
        }
    }

    /// Adds a player standing at the origin
    pub(crate) fn join(&self) -> PlayerId {
        let id = PlayerId::new();
        self.players.lock().insert(id, Some(Position::default()));
        id
    }

    pub(crate) fn join_without_body(&self) -> PlayerId {
        let id = PlayerId::new();
        self.players.lock().insert(id, None);
        id
    }

    pub(crate) fn leave(&self, player: PlayerId) {
        self.players.lock().remove(&player);
    }

    /// Result of each successive "on a pad of the target color" check
    pub(crate) fn script(&self, player: PlayerId, outcomes: impl IntoIterator<Item = bool>) {
        self.outcomes
            .lock()
            .insert(player, outcomes.into_iter().collect());
    }

    pub(crate) fn pad_colors(&self, pads: PadContainer) -> Vec<Color> {
        self.maps
            .lock()
            .get(&pads.0)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn live_maps(&self) -> usize {
        self.maps.lock().len()
    }
}

impl PlayerDirectory for FakeWorld {
    fn active_players(&self) -> Vec<PlayerId> {
        self.players.lock().keys().copied().collect()
    }

    fn player_position(&self, player: PlayerId) -> Option<Position> {
        self.players.lock().get(&player).copied().flatten()
    }
}

impl MapProvider for FakeWorld {
    fn clone_round_map(&self) -> Option<RoundMap> {
        let template = self.template.as_ref()?;
        *self.clones.lock() += 1;
        let id = self.next_map.fetch_add(1, Ordering::Relaxed);
        let colors = template
            .iter()
            .map(|p| (p.id, Color::new("Unset", [0, 0, 0])))
            .collect();
        self.maps.lock().insert(id, colors);
        Some(RoundMap {
            pads: PadContainer(id),
            screens: Some(ScreenContainer(id)),
        })
    }

    fn destroy_round_map(&self, pads: PadContainer) {
        self.maps.lock().remove(&pads.0);
        self.destroyed.lock().push(pads);
    }

    fn list_pads(&self, pads: PadContainer) -> Vec<Pad> {
        if !self.maps.lock().contains_key(&pads.0) {
            return Vec::new();
        }
        self.template.clone().unwrap_or_default()
    }

    fn set_pad_color(&self, pads: PadContainer, pad: PadId, color: &Color) {
        if let Some(map) = self.maps.lock().get_mut(&pads.0) {
            map.insert(pad, color.clone());
        }
    }

    fn show_on_screens(&self, _screens: ScreenContainer, color: &Color) {
        self.screens.lock().push(color.name.clone());
    }
}

impl SpatialQuery for FakeWorld {
    fn is_player_on_pad_of_color(&self, player: PlayerId, color: &Color, pads: PadContainer) -> bool {
        let scripted = self
            .outcomes
            .lock()
            .get_mut(&player)
            .and_then(VecDeque::pop_front)
            .unwrap_or(false);
        let color_present = self
            .maps
            .lock()
            .get(&pads.0)
            .is_some_and(|m| m.values().any(|c| c == color));
        scripted && color_present
    }
}

impl TeleportSink for FakeWorld {
    fn teleport(&self, player: PlayerId, destination: Position) {
        if let Some(body) = self.players.lock().get_mut(&player) {
            *body = Some(destination);
            self.teleports.lock().push((player, destination));
        }
    }

    fn loser_destination(&self) -> Option<Position> {
        self.loser
    }

    fn lobby_destination(&self) -> Option<Position> {
        self.lobby
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Phase(Phase),
    Countdown(u32),
    Target(String),
    Pads(Vec<(PadId, String)>),
    Eliminated(PlayerId),
    Finished(RoundSummary),
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub(crate) fn targets(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Target(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn pad_rounds(&self) -> Vec<Vec<(PadId, String)>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Pads(pads) => Some(pads),
                _ => None,
            })
            .collect()
    }
}

impl RoundObserver for RecordingObserver {
    fn on_phase_changed(&self, phase: Phase) {
        self.events.lock().push(Event::Phase(phase));
    }

    fn on_countdown_tick(&self, seconds_remaining: u32) {
        self.events.lock().push(Event::Countdown(seconds_remaining));
    }

    fn on_target_color_changed(&self, color: &Color) {
        self.events.lock().push(Event::Target(color.name.clone()));
    }

    fn on_pads_assigned(&self, assignments: &[PadAssignment]) {
        let pads = assignments
            .iter()
            .map(|a| (a.pad.id, a.color.name.clone()))
            .collect();
        self.events.lock().push(Event::Pads(pads));
    }

    fn on_player_eliminated(&self, player: PlayerId) {
        self.events.lock().push(Event::Eliminated(player));
    }

    fn on_round_finished(&self, summary: &RoundSummary) {
        self.events.lock().push(Event::Finished(summary.clone()));
    }
}

type SleepHook = Box<dyn Fn(usize, Duration) + Send + Sync>;

/// Returns immediately and records every requested wait.
#[derive(Default)]
pub(crate) struct RecordingTimer {
    sleeps: Arc<Mutex<Vec<Duration>>>,
    hook: Option<SleepHook>,
}

impl RecordingTimer {
    /// Runs `hook` with the zero-based sleep number before each wait completes
    pub(crate) fn with_hook(hook: impl Fn(usize, Duration) + Send + Sync + 'static) -> Self {
        Self {
            sleeps: Arc::default(),
            hook: Some(Box::new(hook)),
        }
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

impl Timer for RecordingTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        let index = {
            let mut sleeps = self.sleeps.lock();
            sleeps.push(duration);
            sleeps.len() - 1
        };
        if let Some(hook) = &self.hook {
            hook(index, duration);
        }
        ready(())
    }
}

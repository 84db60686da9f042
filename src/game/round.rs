//! One elimination round: target rotation, pad assignment, elimination checks

use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::util::time::Timer;

use super::active::ActiveSet;
use super::difficulty::DifficultyProfile;
use super::palette::{Color, Palette};
use super::ports::{
    Pad, PadAssignment, Phase, PlayerId, Position, RoundMap, RoundObserver, RoundSummary, World,
};
use super::sampler;
use super::weighting::pad_weights;

/// Height above a pad's surface players are dropped at during placement
pub const PLACEMENT_HEIGHT: f32 = 3.0;

/// Round tuning shared by every round of a session
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSettings {
    pub palette: Palette,
    pub difficulty: DifficultyProfile,
    /// Pause between the first pad assignment and player placement
    pub settle_delay: Duration,
    /// Also end the round once a single player is left standing
    pub end_on_last_survivor: bool,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            palette: Palette::default(),
            difficulty: DifficultyProfile::default(),
            settle_delay: Duration::from_secs(1),
            end_on_last_survivor: false,
        }
    }
}

/// Round errors. All of them abort only the current round.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoundError {
    #[error("round map could not be cloned")]
    MissingMapAsset,
}

/// Where a round is in its tick cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStage {
    SelectingTarget,
    AssigningPads,
    WaitingForTick,
    EvaluatingElimination,
    RoundOver,
}

/// Mutable per-round state, owned by the running engine
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    pub stage: RoundStage,
    pub target_color: Option<Color>,
    pub tick_interval: Duration,
    /// 1-based, advances once per tick
    pub round_index: u32,
    /// Target of the previous tick, carried over from the previous round
    pub last_target_color_name: Option<String>,
    pub first_tick: bool,
}

impl RoundState {
    pub fn new(difficulty: &DifficultyProfile, last_target_color_name: Option<String>) -> Self {
        Self {
            stage: RoundStage::SelectingTarget,
            target_color: None,
            tick_interval: difficulty.initial_interval,
            round_index: 1,
            last_target_color_name,
            first_tick: true,
        }
    }
}

/// Drives a single round against the world collaborators.
pub struct RoundEngine<'a, W: ?Sized, O: ?Sized, T, R> {
    world: &'a W,
    observer: &'a O,
    timer: &'a T,
    settings: &'a RoundSettings,
    active: &'a ActiveSet,
    rng: &'a mut R,
    state: RoundState,
    participants: Vec<PlayerId>,
    eliminated: Vec<PlayerId>,
    ticks: u32,
}

impl<'a, W, O, T, R> RoundEngine<'a, W, O, T, R>
where
    W: World + ?Sized,
    O: RoundObserver + ?Sized,
    T: Timer,
    R: Rng + Send,
{
    pub fn new(
        world: &'a W,
        observer: &'a O,
        timer: &'a T,
        settings: &'a RoundSettings,
        active: &'a ActiveSet,
        rng: &'a mut R,
        last_target_color_name: Option<String>,
    ) -> Self {
        Self {
            world,
            observer,
            timer,
            settings,
            active,
            rng,
            state: RoundState::new(&settings.difficulty, last_target_color_name),
            participants: Vec::new(),
            eliminated: Vec::new(),
            ticks: 0,
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Run the round to completion.
    ///
    /// Returns a skipped summary when nobody has a body in the world, and
    /// `MissingMapAsset` when no playfield could be cloned. Teardown runs
    /// exactly once for every round that got a map.
    pub async fn run(mut self) -> Result<RoundSummary, RoundError> {
        self.participants = self
            .world
            .active_players()
            .into_iter()
            .filter(|p| self.world.player_position(*p).is_some())
            .collect();
        self.participants.sort();
        self.participants.dedup();

        if self.participants.is_empty() {
            info!("No players present, skipping round");
            return Ok(RoundSummary::skipped());
        }

        let map = self
            .world
            .clone_round_map()
            .ok_or(RoundError::MissingMapAsset)?;

        self.active.reset(self.participants.iter().copied());
        info!(players = self.participants.len(), "Round started");

        loop {
            match self.state.stage {
                RoundStage::SelectingTarget => {
                    self.select_target();
                    self.state.stage = RoundStage::AssigningPads;
                }
                RoundStage::AssigningPads => {
                    self.assign_pads(&map).await;
                    self.state.stage = RoundStage::WaitingForTick;
                }
                RoundStage::WaitingForTick => {
                    self.timer.sleep(self.state.tick_interval).await;
                    self.state.stage = RoundStage::EvaluatingElimination;
                }
                RoundStage::EvaluatingElimination => {
                    self.evaluate_elimination(&map);
                    self.ticks += 1;
                    self.state.stage = if self.is_over() {
                        RoundStage::RoundOver
                    } else {
                        self.advance();
                        RoundStage::SelectingTarget
                    };
                }
                RoundStage::RoundOver => break,
            }
        }

        Ok(self.teardown(&map))
    }

    fn select_target(&mut self) {
        let previous = self.state.last_target_color_name.as_deref();
        let target = self
            .settings
            .palette
            .random_except(&mut *self.rng, previous)
            .clone();

        self.state.last_target_color_name = Some(target.name.clone());
        self.state.target_color = Some(target);
    }

    async fn assign_pads(&mut self, map: &RoundMap) {
        let Some(target) = self.state.target_color.clone() else {
            return;
        };

        let pads = self.world.list_pads(map.pads);
        let difficulty = &self.settings.difficulty;
        let fraction = difficulty.fraction(self.state.round_index);
        let num_correct = difficulty.num_correct(pads.len(), fraction);

        if pads.is_empty() {
            warn!(round_index = self.state.round_index, "Round map has no pads");
        }

        let positions = self.active_positions();
        let weights = pad_weights(&pads, &positions);
        let pool: Vec<(usize, f64)> = weights.into_iter().enumerate().collect();
        let chosen = sampler::sample(&mut *self.rng, pool, num_correct);

        let mut is_correct = vec![false; pads.len()];
        for index in chosen {
            is_correct[index] = true;
        }

        let mut assignments = Vec::with_capacity(pads.len());
        for (pad, correct) in pads.iter().zip(is_correct) {
            let color = if correct {
                target.clone()
            } else {
                self.settings
                    .palette
                    .random_except(&mut *self.rng, Some(&target.name))
                    .clone()
            };
            self.world.set_pad_color(map.pads, pad.id, &color);
            assignments.push(PadAssignment {
                pad: pad.clone(),
                color,
            });
        }

        debug!(
            round_index = self.state.round_index,
            target_color = %target.name,
            pads = pads.len(),
            correct = num_correct,
            fraction,
            "Pads assigned"
        );

        self.observer.on_phase_changed(Phase::Round);
        self.observer.on_target_color_changed(&target);
        self.observer.on_pads_assigned(&assignments);
        if let Some(screens) = map.screens {
            self.world.show_on_screens(screens, &target);
        }

        if self.state.first_tick {
            self.timer.sleep(self.settings.settle_delay).await;
            self.place_players(&pads);
        }
    }

    /// Drop every active player onto a random pad
    fn place_players(&mut self, pads: &[Pad]) {
        if pads.is_empty() {
            return;
        }
        for player in self.active.snapshot() {
            if let Some(pad) = pads.choose(&mut *self.rng) {
                self.world
                    .teleport(player, pad.position.raised(PLACEMENT_HEIGHT));
            }
        }
    }

    fn active_positions(&self) -> Vec<Position> {
        self.active
            .snapshot()
            .into_iter()
            .filter_map(|p| self.world.player_position(p))
            .collect()
    }

    fn evaluate_elimination(&mut self, map: &RoundMap) {
        let Some(target) = self.state.target_color.as_ref() else {
            return;
        };

        for player in self.active.snapshot() {
            if self.world.player_position(player).is_none() {
                continue;
            }
            if self.world.is_player_on_pad_of_color(player, target, map.pads) {
                continue;
            }
            // Already gone if the player disconnected during the wait
            if !self.active.remove(player) {
                continue;
            }

            info!(
                player_id = %player,
                round_index = self.state.round_index,
                target_color = %target.name,
                "Player eliminated"
            );
            self.eliminated.push(player);
            self.observer.on_player_eliminated(player);
            if let Some(destination) = self.world.loser_destination() {
                self.world.teleport(player, destination);
            }
        }
    }

    fn is_over(&self) -> bool {
        let remaining = self.active.len();
        remaining == 0
            || (self.settings.end_on_last_survivor && self.participants.len() > 1 && remaining == 1)
    }

    fn advance(&mut self) {
        self.state.round_index += 1;
        self.state.tick_interval = self.settings.difficulty.interval(self.state.tick_interval);
        self.state.first_tick = false;
    }

    fn teardown(&mut self, map: &RoundMap) -> RoundSummary {
        self.world.destroy_round_map(map.pads);

        if let Some(lobby) = self.world.lobby_destination() {
            for player in &self.participants {
                self.world.teleport(*player, lobby);
            }
        }

        let summary = RoundSummary {
            ticks: self.ticks,
            survivors: self.active.snapshot(),
            eliminated: self.eliminated.clone(),
            last_target: self.state.target_color.clone(),
        };
        self.active.clear();

        info!(
            ticks = summary.ticks,
            survivors = summary.survivors.len(),
            eliminated = summary.eliminated.len(),
            "Round over"
        );
        self.observer.on_round_finished(&summary);
        summary
    }
}

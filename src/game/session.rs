//! Lobby / round cycle that runs for the lifetime of the process

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::util::time::Timer;

use super::active::ActiveSet;
use super::ports::{Phase, RoundObserver, RoundSummary, World};
use super::round::{RoundEngine, RoundSettings};

/// Session timing plus the per-round tuning
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub round: RoundSettings,
    /// Lobby countdown length in whole seconds
    pub intermission_secs: u32,
    /// Pause between round teardown and the next lobby phase
    pub post_round_delay: Duration,
    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            round: RoundSettings::default(),
            intermission_secs: 10,
            post_round_delay: Duration::from_secs(2),
            seed: None,
        }
    }
}

/// Outer state machine: lobby countdown, one round, short delay, repeat.
pub struct SessionLoop<W: ?Sized, O: ?Sized, T> {
    world: Arc<W>,
    observer: Arc<O>,
    timer: T,
    settings: Arc<SessionSettings>,
    active: Arc<ActiveSet>,
    rng: ChaCha8Rng,
    last_target: Option<String>,
    rounds_played: u64,
}

impl<W, O, T> SessionLoop<W, O, T>
where
    W: World + ?Sized,
    O: RoundObserver + ?Sized,
    T: Timer,
{
    pub fn new(
        world: Arc<W>,
        observer: Arc<O>,
        timer: T,
        settings: Arc<SessionSettings>,
        active: Arc<ActiveSet>,
    ) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        Self {
            world,
            observer,
            timer,
            settings,
            active,
            rng: ChaCha8Rng::seed_from_u64(seed),
            last_target: None,
            rounds_played: 0,
        }
    }

    /// Run forever; only process shutdown stops this
    pub async fn run(mut self) {
        info!(
            intermission_secs = self.settings.intermission_secs,
            "Session loop started"
        );
        loop {
            self.run_cycle().await;
        }
    }

    /// One lobby phase followed by one round.
    ///
    /// Returns `None` when the round could not start because of a missing map.
    pub async fn run_cycle(&mut self) -> Option<RoundSummary> {
        self.observer.on_phase_changed(Phase::Lobby);
        self.countdown().await;

        let outcome = RoundEngine::new(
            &*self.world,
            &*self.observer,
            &self.timer,
            &self.settings.round,
            &self.active,
            &mut self.rng,
            self.last_target.clone(),
        )
        .run()
        .await;

        let summary = match outcome {
            Ok(summary) => {
                if let Some(target) = &summary.last_target {
                    self.last_target = Some(target.name.clone());
                }
                if !summary.was_skipped() {
                    self.rounds_played += 1;
                    info!(rounds_played = self.rounds_played, "Round finished");
                }
                Some(summary)
            }
            Err(e) => {
                warn!(error = %e, "Round aborted, returning to lobby");
                None
            }
        };

        self.timer.sleep(self.settings.post_round_delay).await;
        summary
    }

    async fn countdown(&self) {
        let mut remaining = self.settings.intermission_secs;
        while remaining > 0 {
            self.observer.on_countdown_tick(remaining);
            self.timer.sleep(Duration::from_secs(1)).await;
            remaining -= 1;
        }
        self.observer.on_countdown_tick(0);
    }

    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }
}

//! Game session state machine: Idle -> Playing -> GameOver
//!
//! Owns the actor, the hazard field, and the clock for one game mode, and is
//! driven by the host's frame callback through [`GameSession::frame`].

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{ActorState, PhysicsActor};
use super::clock::ClockScheduler;
use super::collision::{CollisionKind, CollisionSystem};
use super::hazard::{Hazard, HazardField, RandomSource};
use super::world::{DeviceClass, GameMode, GameSpeed, WorldConfig};
use crate::achievements::{ScoreAchievementTracker, SessionSummary, TrackerSnapshot};
use crate::consts::STEP;
use crate::persistence::KeyValueStore;
use crate::settings::Settings;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting for start; actor at its start position
    Idle,
    /// Simulation running
    Playing,
    /// Run ended by a collision
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("game configuration cannot change while playing")]
    ConfigLockedWhilePlaying,
}

/// Read-only per-frame view for the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<'a> {
    pub phase: SessionPhase,
    pub mode: GameMode,
    pub actor: ActorState,
    /// Cosmetic tilt (radians)
    pub rotation: f32,
    pub actor_x: f32,
    pub hazards: &'a [Hazard],
    pub score: u64,
    pub high_score: u64,
    pub elapsed_ticks: u64,
    pub last_collision: Option<CollisionKind>,
}

/// One game session for a single mode
pub struct GameSession<S: KeyValueStore, R: RandomSource = Pcg32> {
    config: WorldConfig,
    phase: SessionPhase,
    actor: PhysicsActor,
    field: HazardField,
    collision: CollisionSystem,
    tracker: ScoreAchievementTracker<S>,
    clock: ClockScheduler,
    rng: R,
    /// Fixed steps simulated since start
    elapsed_ticks: u64,
    last_collision: Option<CollisionKind>,
    last_summary: Option<SessionSummary>,
}

impl<S: KeyValueStore> GameSession<S, Pcg32> {
    /// Session with a seeded PCG hazard generator
    pub fn new(config: WorldConfig, store: S, seed: u64) -> Self {
        Self::with_rng(config, store, Pcg32::seed_from_u64(seed))
    }

    /// Session configured from saved preferences
    pub fn from_settings(
        mode: GameMode,
        settings: &Settings,
        width: f32,
        height: f32,
        store: S,
        seed: u64,
    ) -> Self {
        Self::new(settings.world_config(mode, width, height), store, seed)
    }
}

impl<S: KeyValueStore, R: RandomSource> GameSession<S, R> {
    /// Session with an injected random source
    pub fn with_rng(config: WorldConfig, store: S, rng: R) -> Self {
        let mode = config.mode;
        Self {
            actor: PhysicsActor::new(&config),
            collision: CollisionSystem::for_mode(mode),
            tracker: ScoreAchievementTracker::load(store, mode),
            config,
            phase: SessionPhase::Idle,
            field: HazardField::new(),
            clock: ClockScheduler::default(),
            rng,
            elapsed_ticks: 0,
            last_collision: None,
            last_summary: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.config.mode
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn score(&self) -> u64 {
        self.tracker.score()
    }

    pub fn progress(&self) -> TrackerSnapshot {
        self.tracker.snapshot()
    }

    /// Summary of the most recent finished run
    pub fn last_summary(&self) -> Option<&SessionSummary> {
        self.last_summary.as_ref()
    }

    /// Title for an achievement id
    pub fn achievement_title(&self, id: &str) -> Option<&'static str> {
        self.tracker.title(id)
    }

    /// Idle -> Playing. Ignored unless Idle.
    pub fn start(&mut self) {
        if self.phase != SessionPhase::Idle {
            return;
        }
        self.clear_run();
        self.tracker.on_session_start();
        self.phase = SessionPhase::Playing;
        log::info!(
            "{} session started (speed {}, {:.0}x{:.0})",
            self.config.mode.as_str(),
            self.config.speed.level(),
            self.config.width,
            self.config.height
        );
    }

    /// Back to Idle from any phase; an unfinished run is abandoned
    pub fn reset(&mut self) {
        if self.phase == SessionPhase::Playing {
            log::info!("Run abandoned at score {}", self.tracker.score());
        }
        self.clear_run();
        self.phase = SessionPhase::Idle;
    }

    /// Reset and start in one go
    pub fn play_again(&mut self) {
        self.reset();
        self.start();
    }

    /// Flap/jump input. Returns whether the actor received the impulse.
    pub fn impulse(&mut self) -> bool {
        match self.phase {
            SessionPhase::Idle if self.config.mode.impulse_starts_session() => {
                self.start();
                self.actor.apply_impulse()
            }
            SessionPhase::Playing => self.actor.apply_impulse(),
            _ => false,
        }
    }

    /// Start-or-reset input
    pub fn toggle_run(&mut self) {
        match self.phase {
            SessionPhase::Idle => self.start(),
            SessionPhase::Playing => self.reset(),
            SessionPhase::GameOver => self.play_again(),
        }
    }

    /// Feed a display-frame timestamp (ms); runs the due fixed steps and
    /// returns how many ran. Stops early once the run ends.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        if self.phase != SessionPhase::Playing {
            return 0;
        }
        let due = self.clock.advance(now_ms);
        let mut ran = 0;
        for _ in 0..due {
            if self.phase != SessionPhase::Playing {
                break;
            }
            let before = self.elapsed_ticks;
            self.step();
            if self.elapsed_ticks > before {
                ran += 1;
            }
        }
        ran
    }

    /// One fixed step: physics, spawn, hazard advance, collision, scoring.
    /// Returns the collision that ended the run, if any.
    pub fn step(&mut self) -> Option<CollisionKind> {
        if self.phase != SessionPhase::Playing {
            return None;
        }
        if !self.config.is_valid() {
            log::debug!(
                "Skipping step: invalid world {}x{}",
                self.config.width,
                self.config.height
            );
            return None;
        }

        self.elapsed_ticks += 1;
        let actor = self.actor.integrate(STEP);

        self.field
            .spawn_if_needed(&self.config, self.elapsed_ticks, &mut self.rng);
        let cleared = self
            .field
            .advance(STEP, self.config.scroll_speed, self.config.clear_x());

        // Collision is judged on the advanced positions before any clear is credited
        if let Some(hit) = self
            .collision
            .check(&actor, self.field.hazards(), &self.config)
        {
            self.game_over(hit);
            return Some(hit);
        }

        for _ in &cleared {
            self.tracker.on_clear_event();
        }
        None
    }

    /// Change the difficulty selector (not while Playing)
    pub fn set_game_speed(&mut self, speed: GameSpeed) -> Result<(), SessionError> {
        self.reconfigure(speed, self.config.device)
    }

    /// Change the device class (not while Playing)
    pub fn set_device_class(&mut self, device: DeviceClass) -> Result<(), SessionError> {
        self.reconfigure(self.config.speed, device)
    }

    /// Track the host canvas size. A degenerate size only makes steps skip.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.config = self.config.with_size(width, height);
        if self.config.is_valid() {
            self.actor.set_bounds(&self.config);
            if self.phase == SessionPhase::Idle {
                self.actor.reset(&self.config);
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let actor = self.actor.state();
        Snapshot {
            phase: self.phase,
            mode: self.config.mode,
            actor,
            rotation: actor.rotation(),
            actor_x: self.config.actor_x,
            hazards: self.field.hazards(),
            score: self.tracker.score(),
            high_score: self.tracker.high_score(),
            elapsed_ticks: self.elapsed_ticks,
            last_collision: self.last_collision,
        }
    }

    fn reconfigure(&mut self, speed: GameSpeed, device: DeviceClass) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Playing {
            return Err(SessionError::ConfigLockedWhilePlaying);
        }
        self.config = WorldConfig::for_mode(
            self.config.mode,
            speed,
            device,
            self.config.width,
            self.config.height,
        );
        if self.phase == SessionPhase::Idle && self.config.is_valid() {
            self.actor.reset(&self.config);
        }
        log::info!("Game speed set to {} ({:?})", speed.level(), device);
        Ok(())
    }

    fn clear_run(&mut self) {
        self.actor.reset(&self.config);
        self.field.clear();
        self.clock.reset();
        self.elapsed_ticks = 0;
        self.last_collision = None;
    }

    fn game_over(&mut self, hit: CollisionKind) {
        self.phase = SessionPhase::GameOver;
        self.last_collision = Some(hit);
        self.clock.reset();
        let summary = self.tracker.on_session_end(self.tracker.score());
        log::info!(
            "Game over ({:?}) after {} ticks: score {}, best {}",
            hit,
            self.elapsed_ticks,
            summary.final_score,
            summary.high_score
        );
        self.last_summary = Some(summary);
    }
}

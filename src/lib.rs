//! Avatar Arcade - arcade mini-games starring the customized character
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, physics, hazards, collisions, session)
//! - `achievements`: Score, high score, and milestone tracking
//! - `persistence`: Key/value storage boundary (LocalStorage on web)
//! - `settings`: Player preferences (game speed, device class)

pub mod achievements;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use achievements::{AchievementRecord, ScoreAchievementTracker, SessionSummary, TrackerSnapshot};
pub use persistence::{KeyValueStore, MemoryStore, StoreError};
pub use settings::Settings;
pub use sim::{GameMode, GameSession, GameSpeed, SessionPhase, WorldConfig};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_STEP_MS: f64 = 1000.0 / 60.0;
    /// Largest frame delta the clock accepts, prevents catch-up storms after a stall
    pub const MAX_FRAME_DELTA_MS: f64 = 100.0;
    /// One fixed step, in ticks (physics quantities are per tick)
    pub const STEP: f32 = 1.0;

    /// Default playfield
    pub const DEFAULT_WORLD_WIDTH: f32 = 600.0;
    pub const DEFAULT_WORLD_HEIGHT: f32 = 600.0;
    pub const FLAP_GROUND_HEIGHT: f32 = 60.0;
    pub const RUNNER_GROUND_HEIGHT: f32 = 80.0;

    /// Actor box (the character avatar)
    pub const ACTOR_WIDTH: f32 = 40.0;
    pub const ACTOR_HEIGHT: f32 = 40.0;
    /// Actor centre as a fraction of world width
    pub const ACTOR_X_FRACTION: f32 = 0.25;

    /// Hitbox shrink per side (fraction of actor size)
    pub const HITBOX_SHRINK: f32 = 0.18;

    /// Gap pair margin from ceiling and ground
    pub const GAP_MIN_MARGIN: f32 = 50.0;
    /// Gap pair column width
    pub const GAP_PAIR_WIDTH: f32 = 60.0;

    /// Cosmetic tilt bounds (radians)
    pub const MIN_TILT: f32 = -std::f32::consts::FRAC_PI_6;
    pub const MAX_TILT: f32 = std::f32::consts::FRAC_PI_2;
    /// Radians of tilt per px/tick of vertical velocity
    pub const TILT_PER_VELOCITY: f32 = 0.08;
}

/// Ticks to whole seconds of session time
#[inline]
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 * (consts::SIM_STEP_MS / 1000.0) as f32
}

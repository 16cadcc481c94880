//! Game modes, difficulty selection, and per-session world configuration
//!
//! `WorldConfig::for_mode` is a pure function of (mode, speed, device, size),
//! so the same selector always produces the same physics.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Which arcade game is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Flap through gaps; touching the ground ends the run
    #[default]
    Flap,
    /// Jump over obstacles; the ground is the resting state
    Runner,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Flap => "flap",
            GameMode::Runner => "runner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "flap" | "flappy" => Some(GameMode::Flap),
            "runner" | "run" | "jump" => Some(GameMode::Runner),
            _ => None,
        }
    }

    /// Prefix for persisted keys, keeps the two games' records apart
    pub fn storage_prefix(&self) -> &'static str {
        self.as_str()
    }

    /// Whether impulse may be issued while airborne
    pub fn impulse_in_air(&self) -> bool {
        match self {
            GameMode::Flap => true,
            GameMode::Runner => false,
        }
    }

    /// Whether an impulse while Idle starts the session
    pub fn impulse_starts_session(&self) -> bool {
        match self {
            GameMode::Flap => true,
            GameMode::Runner => false,
        }
    }

    /// Whether touching the ground ends the run
    pub fn ground_is_fatal(&self) -> bool {
        match self {
            GameMode::Flap => true,
            GameMode::Runner => false,
        }
    }
}

/// Device class, used to compensate touch input latency in the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
}

/// Numeric "game speed" selector (1 = gentle, 5 = frantic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct GameSpeed(u8);

impl GameSpeed {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Clamps into the supported range
    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    fn factor(&self) -> f32 {
        self.0 as f32
    }
}

impl Default for GameSpeed {
    fn default() -> Self {
        Self(3)
    }
}

impl From<u8> for GameSpeed {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl From<GameSpeed> for u8 {
    fn from(speed: GameSpeed) -> Self {
        speed.0
    }
}

/// Immutable per-session world parameters.
///
/// Physics units are per tick: `gravity` in px/tick², `impulse_strength`
/// and `scroll_speed` in px/tick. Y grows downward, so impulse is negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub mode: GameMode,
    /// Selector the physics below were derived from
    pub speed: GameSpeed,
    pub device: DeviceClass,
    pub width: f32,
    pub height: f32,
    pub ground_height: f32,
    pub scroll_speed: f32,
    pub gravity: f32,
    pub impulse_strength: f32,
    /// Vertical opening of a gap pair
    pub gap_size: f32,
    /// Minimum distance between a gap and the ceiling/ground
    pub gap_margin: f32,
    /// Width of a gap-pair column
    pub hazard_width: f32,
    /// Distance between spawns, as a fraction of world width
    pub spawn_spacing: f32,
    /// Actor centre x (fixed; the world scrolls past it)
    pub actor_x: f32,
    pub actor_width: f32,
    pub actor_height: f32,
}

impl WorldConfig {
    /// Derive the configuration for a mode, speed selector, and device
    pub fn for_mode(
        mode: GameMode,
        speed: GameSpeed,
        device: DeviceClass,
        width: f32,
        height: f32,
    ) -> Self {
        let s = speed.factor();
        match mode {
            GameMode::Flap => Self {
                mode,
                speed,
                device,
                width,
                height,
                ground_height: FLAP_GROUND_HEIGHT,
                scroll_speed: 1.5 + 0.5 * s,
                gravity: 0.3 + 0.05 * s,
                impulse_strength: -(6.5 + 0.25 * s),
                gap_size: 190.0 - 10.0 * s,
                gap_margin: GAP_MIN_MARGIN,
                hazard_width: GAP_PAIR_WIDTH,
                spawn_spacing: 0.66 - 0.03 * s,
                actor_x: width * ACTOR_X_FRACTION,
                actor_width: ACTOR_WIDTH,
                actor_height: ACTOR_HEIGHT,
            },
            GameMode::Runner => {
                let (gravity_scale, impulse_scale) = match device {
                    DeviceClass::Desktop => (1.0, 1.0),
                    DeviceClass::Mobile => (0.9, 1.08),
                };
                Self {
                    mode,
                    speed,
                    device,
                    width,
                    height,
                    ground_height: RUNNER_GROUND_HEIGHT,
                    scroll_speed: 4.0 + s,
                    gravity: (0.7 + 0.05 * s) * gravity_scale,
                    impulse_strength: -(12.5 + 0.3 * s) * impulse_scale,
                    gap_size: 0.0,
                    gap_margin: 0.0,
                    hazard_width: 0.0,
                    spawn_spacing: 0.85 - 0.05 * s,
                    actor_x: width * ACTOR_X_FRACTION,
                    actor_width: ACTOR_WIDTH,
                    actor_height: ACTOR_HEIGHT,
                }
            }
        }
    }

    /// Same configuration with new playfield dimensions (host resize)
    pub fn with_size(&self, width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            actor_x: width * ACTOR_X_FRACTION,
            ..self.clone()
        }
    }

    /// Y of the ground surface
    #[inline]
    pub fn ground_top(&self) -> f32 {
        self.height - self.ground_height
    }

    /// Rearmost hazard x below which the next hazard spawns
    #[inline]
    pub fn spawn_threshold(&self) -> f32 {
        self.width - self.width * self.spawn_spacing
    }

    /// Actor centre y at session start
    pub fn actor_start_y(&self) -> f32 {
        match self.mode {
            GameMode::Flap => self.height / 2.0,
            GameMode::Runner => self.ground_top() - self.actor_height / 2.0,
        }
    }

    /// Smallest actor centre y
    #[inline]
    pub fn actor_min_y(&self) -> f32 {
        self.actor_height / 2.0
    }

    /// Largest actor centre y (resting on the ground)
    #[inline]
    pub fn actor_max_y(&self) -> f32 {
        self.ground_top() - self.actor_height / 2.0
    }

    /// Hazards whose right edge passes this x are cleared; it is the
    /// actor's trailing edge, so a cleared hazard can no longer be hit
    #[inline]
    pub fn clear_x(&self) -> f32 {
        self.actor_x - self.actor_width / 2.0
    }

    /// Rejects degenerate playfields (e.g. zero-size canvas during a resize)
    pub fn is_valid(&self) -> bool {
        let finite = [
            self.width,
            self.height,
            self.ground_height,
            self.scroll_speed,
            self.gravity,
            self.impulse_strength,
            self.spawn_spacing,
            self.actor_x,
        ]
        .iter()
        .all(|v| v.is_finite());

        finite
            && self.width > 0.0
            && self.height > 0.0
            && self.actor_width > 0.0
            && self.actor_height > 0.0
            && self.actor_max_y() > self.actor_min_y()
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::for_mode(
            GameMode::Flap,
            GameSpeed::default(),
            DeviceClass::Desktop,
            DEFAULT_WORLD_WIDTH,
            DEFAULT_WORLD_HEIGHT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_selector_clamps() {
        assert_eq!(GameSpeed::new(0).level(), GameSpeed::MIN);
        assert_eq!(GameSpeed::new(9).level(), GameSpeed::MAX);
        let parsed: GameSpeed = serde_json::from_str("42").unwrap();
        assert_eq!(parsed.level(), GameSpeed::MAX);
    }

    #[test]
    fn test_for_mode_is_deterministic() {
        let a = WorldConfig::for_mode(GameMode::Runner, GameSpeed::new(2), DeviceClass::Mobile, 800.0, 400.0);
        let b = WorldConfig::for_mode(GameMode::Runner, GameSpeed::new(2), DeviceClass::Mobile, 800.0, 400.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_spacing_narrows_with_speed() {
        let slow = WorldConfig::for_mode(GameMode::Flap, GameSpeed::new(1), DeviceClass::Desktop, 600.0, 600.0);
        let fast = WorldConfig::for_mode(GameMode::Flap, GameSpeed::new(5), DeviceClass::Desktop, 600.0, 600.0);
        assert!(fast.spawn_spacing < slow.spawn_spacing);
        assert!(fast.scroll_speed > slow.scroll_speed);
        assert!(fast.gap_size < slow.gap_size);
    }

    #[test]
    fn test_mobile_runner_compensates_latency() {
        let desktop = WorldConfig::for_mode(GameMode::Runner, GameSpeed::default(), DeviceClass::Desktop, 600.0, 400.0);
        let mobile = WorldConfig::for_mode(GameMode::Runner, GameSpeed::default(), DeviceClass::Mobile, 600.0, 400.0);
        assert!(mobile.gravity < desktop.gravity);
        assert!(mobile.impulse_strength < desktop.impulse_strength);

        // Flap ignores the device class
        let flap_d = WorldConfig::for_mode(GameMode::Flap, GameSpeed::default(), DeviceClass::Desktop, 600.0, 600.0);
        let flap_m = WorldConfig::for_mode(GameMode::Flap, GameSpeed::default(), DeviceClass::Mobile, 600.0, 600.0);
        assert_eq!(flap_m.device, DeviceClass::Mobile);
        assert_eq!(WorldConfig { device: DeviceClass::Desktop, ..flap_m }, flap_d);
    }

    #[test]
    fn test_spawn_threshold() {
        let mut config = WorldConfig::default();
        config.width = 600.0;
        config.spawn_spacing = 0.6;
        assert!((config.spawn_threshold() - 240.0).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_sizes() {
        let config = WorldConfig::default();
        assert!(config.is_valid());
        assert!(!config.with_size(0.0, 600.0).is_valid());
        assert!(!config.with_size(600.0, -1.0).is_valid());
        assert!(!config.with_size(600.0, 70.0).is_valid());
        assert!(!config.with_size(f32::NAN, 600.0).is_valid());
    }
}

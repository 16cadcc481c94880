//! Procedurally generated hazards scrolling toward the actor
//!
//! Hazards live in insertion order: the last entry is always the rearmost
//! (right-most), which drives the spawn spacing rule.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::world::{GameMode, WorldConfig};
use crate::ticks_to_secs;

/// Injectable randomness, so tests can script exact hazard sequences
pub trait RandomSource {
    /// Uniform sample in [0, 1)
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in [lo, hi); collapses to `lo` for an empty range
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            lo
        } else {
            lo + (hi - lo) * self.next_unit()
        }
    }
}

impl RandomSource for Pcg32 {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> f32 {
        (**self).next_unit()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f32 {
        (**self).next_unit()
    }
}

/// Hazard shape and placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HazardKind {
    /// Two columns with an opening from `gap_top` to `gap_top + gap_size`
    GapPair { gap_top: f32, gap_size: f32 },
    /// Block standing on the ground
    SolidObstacle { height: f32 },
    /// Hole in the ground
    PitGap,
    /// Floating block; `bottom` is the y of its lower edge
    AirborneObstacle { bottom: f32, height: f32 },
}

impl HazardKind {
    pub fn name(&self) -> &'static str {
        match self {
            HazardKind::GapPair { .. } => "gap_pair",
            HazardKind::SolidObstacle { .. } => "solid",
            HazardKind::PitGap => "pit",
            HazardKind::AirborneObstacle { .. } => "airborne",
        }
    }
}

/// A scrolling hazard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    /// Leading (left) edge
    pub x: f32,
    pub width: f32,
    pub kind: HazardKind,
    /// Set once, when the trailing edge passes the actor
    pub passed: bool,
}

impl Hazard {
    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Trailing (right) edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Emitted the first time a hazard's trailing edge passes the actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearEvent {
    pub hazard_id: u32,
}

/// Runner obstacle generation table entry
struct RunnerKindEntry {
    kind: RunnerKind,
    weight: f32,
    /// Session seconds before the kind becomes eligible
    unlock_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunnerKind {
    Solid,
    Pit,
    Airborne,
}

static RUNNER_KINDS: [RunnerKindEntry; 3] = [
    RunnerKindEntry { kind: RunnerKind::Solid, weight: 5.0, unlock_secs: 0.0 },
    RunnerKindEntry { kind: RunnerKind::Pit, weight: 3.0, unlock_secs: 8.0 },
    RunnerKindEntry { kind: RunnerKind::Airborne, weight: 3.0, unlock_secs: 16.0 },
];

/// Solid obstacle width / height ranges
const SOLID_WIDTH: (f32, f32) = (20.0, 40.0);
const SOLID_HEIGHT: (f32, f32) = (30.0, 60.0);
/// Pit width range
const PIT_WIDTH: (f32, f32) = (50.0, 90.0);
/// Airborne obstacle ranges; lift is the gap between ground and its lower edge
const AIRBORNE_WIDTH: (f32, f32) = (30.0, 50.0);
const AIRBORNE_HEIGHT: (f32, f32) = (18.0, 28.0);
const AIRBORNE_LIFT: (f32, f32) = (40.0, 70.0);

/// The active hazard set
#[derive(Debug, Clone)]
pub struct HazardField {
    hazards: Vec<Hazard>,
    next_id: u32,
}

impl Default for HazardField {
    fn default() -> Self {
        Self::new()
    }
}

impl HazardField {
    pub fn new() -> Self {
        Self {
            hazards: Vec::new(),
            next_id: 1,
        }
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn clear(&mut self) {
        self.hazards.clear();
    }

    /// Append a hazard (used by generation and by hosts replaying a layout)
    pub fn push(&mut self, x: f32, width: f32, kind: HazardKind) -> &Hazard {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.hazards.push(Hazard {
            id,
            x,
            width,
            kind,
            passed: false,
        });
        &self.hazards[self.hazards.len() - 1]
    }

    /// Whether the spacing rule calls for a new hazard
    pub fn needs_spawn(&self, config: &WorldConfig) -> bool {
        match self.hazards.last() {
            None => true,
            Some(rearmost) => rearmost.x < config.spawn_threshold(),
        }
    }

    /// Spawn one hazard at the right edge when the spacing rule allows it
    pub fn spawn_if_needed<R: RandomSource + ?Sized>(
        &mut self,
        config: &WorldConfig,
        elapsed_ticks: u64,
        rng: &mut R,
    ) -> bool {
        if !config.is_valid() || !self.needs_spawn(config) {
            return false;
        }

        let (width, kind) = match config.mode {
            GameMode::Flap => (config.hazard_width, generate_gap_pair(config, rng)),
            GameMode::Runner => generate_runner_obstacle(config, ticks_to_secs(elapsed_ticks), rng),
        };
        let hazard = self.push(config.width, width, kind);
        log::debug!(
            "Spawned {} #{} at x={:.1} (w={:.1})",
            hazard.kind.name(),
            hazard.id,
            hazard.x,
            hazard.width
        );
        true
    }

    /// Scroll every hazard left, emit clear events, retire off-screen hazards
    pub fn advance(&mut self, step: f32, scroll_speed: f32, clear_x: f32) -> Vec<ClearEvent> {
        let dx = scroll_speed * step;
        let mut cleared = Vec::new();

        for hazard in &mut self.hazards {
            hazard.x -= dx;
            if !hazard.passed && hazard.right() < clear_x {
                hazard.passed = true;
                cleared.push(ClearEvent { hazard_id: hazard.id });
            }
        }

        self.hazards.retain(|h| h.right() >= 0.0);
        cleared
    }
}

/// Gap pair with its opening placed uniformly between the margins
fn generate_gap_pair<R: RandomSource + ?Sized>(config: &WorldConfig, rng: &mut R) -> HazardKind {
    let lo = config.gap_margin;
    let hi = config.ground_top() - config.gap_margin - config.gap_size;
    let gap_top = if hi < lo {
        // Playfield too short for the margins; centre the gap
        ((config.ground_top() - config.gap_size) / 2.0).max(0.0)
    } else {
        rng.range(lo, hi)
    };
    HazardKind::GapPair {
        gap_top,
        gap_size: config.gap_size,
    }
}

/// Weighted pick among the kinds unlocked at `elapsed_secs`
fn pick_runner_kind<R: RandomSource + ?Sized>(elapsed_secs: f32, rng: &mut R) -> RunnerKind {
    let eligible = || RUNNER_KINDS.iter().filter(move |e| elapsed_secs >= e.unlock_secs);
    let total: f32 = eligible().map(|e| e.weight).sum();
    let mut roll = rng.next_unit() * total;
    for entry in eligible() {
        if roll < entry.weight {
            return entry.kind;
        }
        roll -= entry.weight;
    }
    RunnerKind::Solid
}

fn generate_runner_obstacle<R: RandomSource + ?Sized>(
    config: &WorldConfig,
    elapsed_secs: f32,
    rng: &mut R,
) -> (f32, HazardKind) {
    match pick_runner_kind(elapsed_secs, rng) {
        RunnerKind::Solid => {
            let width = rng.range(SOLID_WIDTH.0, SOLID_WIDTH.1);
            let height = rng.range(SOLID_HEIGHT.0, SOLID_HEIGHT.1);
            (width, HazardKind::SolidObstacle { height })
        }
        RunnerKind::Pit => (rng.range(PIT_WIDTH.0, PIT_WIDTH.1), HazardKind::PitGap),
        RunnerKind::Airborne => {
            let width = rng.range(AIRBORNE_WIDTH.0, AIRBORNE_WIDTH.1);
            let height = rng.range(AIRBORNE_HEIGHT.0, AIRBORNE_HEIGHT.1);
            let lift = rng.range(AIRBORNE_LIFT.0, AIRBORNE_LIFT.1);
            (
                width,
                HazardKind::AirborneObstacle {
                    bottom: config.ground_top() - lift,
                    height,
                },
            )
        }
    }
}

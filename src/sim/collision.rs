//! Collision detection between the actor, the world bounds, and hazards
//!
//! The actor collides with a hitbox shrunk on every side so near-misses feel
//! fair; hazards use their full dimensions.

use glam::Vec2;

use super::actor::ActorState;
use super::hazard::{Hazard, HazardKind};
use super::world::{GameMode, WorldConfig};
use crate::consts::HITBOX_SHRINK;

/// Axis-aligned box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Box spanning `left..right` horizontally and `top..bottom` vertically
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            min: Vec2::new(left, top),
            max: Vec2::new(right, bottom),
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Shrink each side by `fraction` of the box's size on that axis
    pub fn shrink(&self, fraction: f32) -> Self {
        let inset = self.size() * fraction;
        Self {
            min: self.min + inset,
            max: self.max - inset,
        }
    }

    /// Strict horizontal overlap with the band `left..right`
    #[inline]
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.right() > left && self.left() < right
    }

    /// Strict vertical overlap with the band `top..bottom`
    #[inline]
    pub fn overlaps_y(&self, top: f32, bottom: f32) -> bool {
        self.bottom() > top && self.top() < bottom
    }
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    Ground,
    Ceiling,
    Hazard { id: u32 },
}

/// Per-mode collision rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPolicy {
    /// Touching the ground ends the run (flap) or is the resting state (runner)
    pub ground_fatal: bool,
    pub ceiling_fatal: bool,
    /// Distance (px) from the ground/ceiling that already counts as contact
    pub ground_tolerance: f32,
    /// Hitbox shrink per side, as a fraction of actor size
    pub hitbox_shrink: f32,
}

impl CollisionPolicy {
    pub fn for_mode(mode: GameMode) -> Self {
        Self {
            ground_fatal: mode.ground_is_fatal(),
            ceiling_fatal: false,
            ground_tolerance: 0.5,
            hitbox_shrink: HITBOX_SHRINK,
        }
    }
}

/// Runs the per-step collision check
#[derive(Debug, Clone)]
pub struct CollisionSystem {
    policy: CollisionPolicy,
}

impl CollisionSystem {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self { policy }
    }

    pub fn for_mode(mode: GameMode) -> Self {
        Self::new(CollisionPolicy::for_mode(mode))
    }

    pub fn policy(&self) -> &CollisionPolicy {
        &self.policy
    }

    /// Full (unshrunk) actor bounds
    pub fn actor_bounds(actor: &ActorState, config: &WorldConfig) -> Aabb {
        Aabb::from_center(
            Vec2::new(config.actor_x, actor.position_y),
            Vec2::new(config.actor_width, config.actor_height),
        )
    }

    /// Forgiving hitbox used against hazards
    pub fn actor_hitbox(&self, actor: &ActorState, config: &WorldConfig) -> Aabb {
        Self::actor_bounds(actor, config).shrink(self.policy.hitbox_shrink)
    }

    /// First fatal condition, world bounds before hazards (in insertion order)
    pub fn check(
        &self,
        actor: &ActorState,
        hazards: &[Hazard],
        config: &WorldConfig,
    ) -> Option<CollisionKind> {
        if let Some(hit) = self.check_world(actor, config) {
            return Some(hit);
        }

        let hitbox = self.actor_hitbox(actor, config);
        hazards
            .iter()
            .find(|h| hazard_hit(&hitbox, actor.is_airborne, h, config))
            .map(|h| CollisionKind::Hazard { id: h.id })
    }

    /// `check(..).is_some()`
    pub fn collided(&self, actor: &ActorState, hazards: &[Hazard], config: &WorldConfig) -> bool {
        self.check(actor, hazards, config).is_some()
    }

    /// Ground and ceiling contact, judged on the clamped full bounds
    pub fn check_world(&self, actor: &ActorState, config: &WorldConfig) -> Option<CollisionKind> {
        let bounds = Self::actor_bounds(actor, config);
        let tolerance = self.policy.ground_tolerance;

        if self.policy.ground_fatal && bounds.bottom() >= config.ground_top() - tolerance {
            return Some(CollisionKind::Ground);
        }
        if self.policy.ceiling_fatal && bounds.top() <= tolerance {
            return Some(CollisionKind::Ceiling);
        }
        None
    }
}

/// Whether `hitbox` is fatally inside `hazard`
pub fn hazard_hit(hitbox: &Aabb, is_airborne: bool, hazard: &Hazard, config: &WorldConfig) -> bool {
    if !hitbox.overlaps_x(hazard.left(), hazard.right()) {
        return false;
    }

    match hazard.kind {
        HazardKind::GapPair { gap_top, gap_size } => {
            hitbox.top() < gap_top || hitbox.bottom() > gap_top + gap_size
        }
        // Standing over a pit means falling in; jumping across is fine
        HazardKind::PitGap => !is_airborne,
        HazardKind::SolidObstacle { height } => {
            let ground = config.ground_top();
            hitbox.overlaps_y(ground - height, ground)
        }
        HazardKind::AirborneObstacle { bottom, height } => hitbox.overlaps_y(bottom - height, bottom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::{DeviceClass, GameSpeed};

    fn flap_world() -> WorldConfig {
        let mut config = WorldConfig::for_mode(
            GameMode::Flap,
            GameSpeed::default(),
            DeviceClass::Desktop,
            600.0,
            600.0,
        );
        config.ground_height = 60.0;
        config.actor_x = 150.0;
        config
    }

    fn runner_world() -> WorldConfig {
        let mut config = WorldConfig::for_mode(
            GameMode::Runner,
            GameSpeed::default(),
            DeviceClass::Desktop,
            600.0,
            400.0,
        );
        config.actor_x = 140.0;
        config
    }

    fn hazard(x: f32, width: f32, kind: HazardKind) -> Hazard {
        Hazard {
            id: 1,
            x,
            width,
            kind,
            passed: false,
        }
    }

    fn airborne_at(y: f32) -> ActorState {
        ActorState {
            position_y: y,
            velocity_y: 0.0,
            is_airborne: true,
        }
    }

    #[test]
    fn test_shrink() {
        let b = Aabb::from_center(Vec2::new(100.0, 100.0), Vec2::new(40.0, 40.0));
        let s = b.shrink(0.25);
        assert_eq!(s.left(), 90.0);
        assert_eq!(s.right(), 110.0);
        assert_eq!(s.top(), 90.0);
        assert_eq!(s.bottom(), 110.0);
    }

    #[test]
    fn test_gap_hitbox_above_gap_top() {
        let config = flap_world();
        let gap = hazard(130.0, 60.0, HazardKind::GapPair { gap_top: 200.0, gap_size: 150.0 });
        // Hitbox y in [180, 220], overlapping horizontally
        let hitbox = Aabb::from_edges(140.0, 180.0, 160.0, 220.0);
        assert!(hazard_hit(&hitbox, true, &gap, &config));

        // Fully inside the gap
        let inside = Aabb::from_edges(140.0, 210.0, 160.0, 340.0);
        assert!(!hazard_hit(&inside, true, &gap, &config));

        // Below the gap bottom
        let low = Aabb::from_edges(140.0, 330.0, 160.0, 360.0);
        assert!(hazard_hit(&low, true, &gap, &config));

        // Same heights, no horizontal overlap
        let clear = Aabb::from_edges(20.0, 180.0, 60.0, 220.0);
        assert!(!hazard_hit(&clear, true, &gap, &config));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let hitbox = Aabb::from_edges(100.0, 0.0, 130.0, 10.0);
        assert!(!hitbox.overlaps_x(130.0, 200.0));
        assert!(!hitbox.overlaps_x(50.0, 100.0));
        assert!(hitbox.overlaps_x(129.0, 200.0));
    }

    #[test]
    fn test_pit_only_fatal_when_grounded() {
        let config = runner_world();
        let system = CollisionSystem::for_mode(GameMode::Runner);
        let pit = [hazard(100.0, 80.0, HazardKind::PitGap)];

        let mut actor = ActorState {
            position_y: config.actor_max_y(),
            velocity_y: 0.0,
            is_airborne: true,
        };
        assert!(!system.collided(&actor, &pit, &config));

        actor.is_airborne = false;
        assert_eq!(
            system.check(&actor, &pit, &config),
            Some(CollisionKind::Hazard { id: 1 })
        );
    }

    #[test]
    fn test_runner_ground_is_not_fatal() {
        let config = runner_world();
        let system = CollisionSystem::for_mode(GameMode::Runner);
        let resting = ActorState {
            position_y: config.actor_max_y(),
            velocity_y: 0.0,
            is_airborne: false,
        };
        assert_eq!(system.check(&resting, &[], &config), None);
    }

    #[test]
    fn test_flap_ground_is_fatal() {
        let config = flap_world();
        let system = CollisionSystem::for_mode(GameMode::Flap);
        let grounded = ActorState {
            position_y: config.actor_max_y(),
            velocity_y: 0.0,
            is_airborne: false,
        };
        assert_eq!(system.check(&grounded, &[], &config), Some(CollisionKind::Ground));
        assert_eq!(system.check(&airborne_at(300.0), &[], &config), None);
    }

    #[test]
    fn test_ceiling_is_harmless_by_default() {
        let config = flap_world();
        let system = CollisionSystem::for_mode(GameMode::Flap);
        assert_eq!(system.check(&airborne_at(config.actor_min_y()), &[], &config), None);

        let strict = CollisionSystem::new(CollisionPolicy {
            ceiling_fatal: true,
            ..CollisionPolicy::for_mode(GameMode::Flap)
        });
        assert_eq!(
            strict.check(&airborne_at(config.actor_min_y()), &[], &config),
            Some(CollisionKind::Ceiling)
        );
    }

    #[test]
    fn test_world_checked_before_hazards() {
        let config = flap_world();
        let system = CollisionSystem::for_mode(GameMode::Flap);
        let grounded = ActorState {
            position_y: config.actor_max_y(),
            velocity_y: 0.0,
            is_airborne: false,
        };
        let gap = [hazard(130.0, 60.0, HazardKind::GapPair { gap_top: 100.0, gap_size: 150.0 })];
        assert_eq!(system.check(&grounded, &gap, &config), Some(CollisionKind::Ground));
    }

    #[test]
    fn test_first_hazard_in_order_wins() {
        let config = flap_world();
        let system = CollisionSystem::for_mode(GameMode::Flap);
        let mut a = hazard(130.0, 60.0, HazardKind::GapPair { gap_top: 400.0, gap_size: 100.0 });
        let mut b = a;
        a.id = 7;
        b.id = 8;
        assert_eq!(
            system.check(&airborne_at(300.0), &[a, b], &config),
            Some(CollisionKind::Hazard { id: 7 })
        );
    }

    #[test]
    fn test_solid_and_airborne_obstacles() {
        let config = runner_world();
        let system = CollisionSystem::for_mode(GameMode::Runner);
        let ground = config.ground_top();
        let solid = [hazard(130.0, 30.0, HazardKind::SolidObstacle { height: 40.0 })];

        let resting = ActorState {
            position_y: config.actor_max_y(),
            velocity_y: 0.0,
            is_airborne: false,
        };
        assert!(system.collided(&resting, &solid, &config));
        // Jumped well above it
        assert!(!system.collided(&airborne_at(ground - 120.0), &solid, &config));

        // Floating block whose lower edge sits 45px above the ground
        let floating = [hazard(
            130.0,
            40.0,
            HazardKind::AirborneObstacle { bottom: ground - 45.0, height: 20.0 },
        )];
        assert!(!system.collided(&resting, &floating, &config));
        assert!(system.collided(&airborne_at(ground - 60.0), &floating, &config));
    }
}

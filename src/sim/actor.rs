//! The controllable character: vertical position, velocity, and bounds

use serde::{Deserialize, Serialize};

use super::world::WorldConfig;
use crate::consts::{MAX_TILT, MIN_TILT, TILT_PER_VELOCITY};

/// Authoritative actor state, updated once per fixed step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    /// Centre y (grows downward)
    pub position_y: f32,
    /// px/tick, negative is upward
    pub velocity_y: f32,
    pub is_airborne: bool,
}

impl ActorState {
    /// Cosmetic tilt (radians) for the renderer, no effect on physics
    pub fn rotation(&self) -> f32 {
        (self.velocity_y * TILT_PER_VELOCITY).clamp(MIN_TILT, MAX_TILT)
    }
}

/// Which bound the last integration clamped against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundContact {
    pub ceiling: bool,
    pub ground: bool,
}

/// Gravity, impulse, and bounds for the actor
#[derive(Debug, Clone)]
pub struct PhysicsActor {
    state: ActorState,
    gravity: f32,
    impulse_strength: f32,
    impulse_in_air: bool,
    min_y: f32,
    max_y: f32,
    contact: BoundContact,
}

impl PhysicsActor {
    /// Place the actor at the world's start position, at rest
    pub fn new(config: &WorldConfig) -> Self {
        let mut actor = Self {
            state: ActorState {
                position_y: 0.0,
                velocity_y: 0.0,
                is_airborne: false,
            },
            gravity: config.gravity,
            impulse_strength: config.impulse_strength,
            impulse_in_air: config.mode.impulse_in_air(),
            min_y: config.actor_min_y(),
            max_y: config.actor_max_y(),
            contact: BoundContact::default(),
        };
        actor.reset(config);
        actor
    }

    /// Re-centre at the start position with zero velocity
    pub fn reset(&mut self, config: &WorldConfig) {
        self.gravity = config.gravity;
        self.impulse_strength = config.impulse_strength;
        self.impulse_in_air = config.mode.impulse_in_air();
        self.min_y = config.actor_min_y();
        self.max_y = config.actor_max_y();

        let start_y = config.actor_start_y();
        self.contact = BoundContact {
            ceiling: false,
            ground: start_y >= self.max_y,
        };
        self.state = ActorState {
            position_y: start_y,
            velocity_y: 0.0,
            is_airborne: !self.contact.ground,
        };
    }

    /// Track new bounds after a playfield resize, keeping the actor inside
    pub fn set_bounds(&mut self, config: &WorldConfig) {
        self.min_y = config.actor_min_y();
        self.max_y = config.actor_max_y();
        if self.max_y > self.min_y {
            self.state.position_y = self.state.position_y.clamp(self.min_y, self.max_y);
        }
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn contact(&self) -> BoundContact {
        self.contact
    }

    /// `velocity += gravity * step`
    pub fn apply_gravity(&mut self, step: f32) {
        self.state.velocity_y += self.gravity * step;
    }

    /// Flap/jump. Overwrites velocity (repeated input never stacks lift).
    /// Returns false when the mode refuses a mid-air jump.
    pub fn apply_impulse(&mut self) -> bool {
        if !self.impulse_in_air && self.state.is_airborne {
            return false;
        }
        self.state.velocity_y = self.impulse_strength;
        self.state.is_airborne = true;
        self.contact.ground = false;
        true
    }

    /// Advance one step: gravity, integrate, clamp to bounds
    pub fn integrate(&mut self, step: f32) -> ActorState {
        self.apply_gravity(step);
        self.state.position_y += self.state.velocity_y * step;

        self.contact = BoundContact::default();
        if self.state.position_y <= self.min_y {
            self.state.position_y = self.min_y;
            self.state.velocity_y = 0.0;
            self.contact.ceiling = true;
        }
        if self.state.position_y >= self.max_y {
            self.state.position_y = self.max_y;
            self.state.velocity_y = 0.0;
            self.contact.ground = true;
        }
        self.state.is_airborne = !self.contact.ground;
        self.state
    }

    pub fn is_at_upper_bound(&self) -> bool {
        self.contact.ceiling
    }

    pub fn is_at_lower_bound(&self) -> bool {
        self.contact.ground
    }
}

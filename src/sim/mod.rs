//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected RNG only
//! - Stable hazard order (insertion order)
//! - No rendering or platform dependencies

pub mod actor;
pub mod clock;
pub mod collision;
pub mod hazard;
pub mod session;
pub mod world;

pub use actor::{ActorState, PhysicsActor};
pub use clock::ClockScheduler;
pub use collision::{Aabb, CollisionKind, CollisionPolicy, CollisionSystem, hazard_hit};
pub use hazard::{ClearEvent, Hazard, HazardField, HazardKind, RandomSource};
pub use session::{GameSession, SessionError, SessionPhase, Snapshot};
pub use world::{DeviceClass, GameMode, GameSpeed, WorldConfig};

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame time is clamped before it reaches any step function
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids never reused)
//! - No rendering or platform dependencies

pub mod actor;
pub mod curve;
pub mod driver;
pub mod entities;
pub mod meteor;
pub mod night;
pub mod pong;
pub mod terrain;

pub use actor::{Actor, ActorInput, Facing, step};
pub use curve::{Curve, CubicSegment, PathError, SampleCache, sample_y};
pub use driver::{CallbackId, FrameClock, FrameDriver, FrameTime, clamp_dt};
pub use entities::{
    Explosion, Firefly, Lifetime, Meteor, ShootingStar, SpawnTimer, Toast, WindGust,
};
pub use meteor::{MeteorGame, MeteorPhase, MeteorPlayer, Winner};
pub use night::{Interaction, NightScene, Overlay, TelescopeView};
pub use pong::{Pong, PongInput};
pub use terrain::{GrassTuft, Ridge, Terrain};

//! Starry Hills - terrain-following platformer physics for night-sky mini-games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (curves, actor physics, entities, games)
//! - `renderer`: Display lists built from simulation state, drawn on a 2D canvas
//! - `platform`: Keyboard/touch input normalization
//! - `persistence`: String key/value storage (LocalStorage on web)
//! - `tuning`: Data-driven physics constants
//! - `settings`: Scene preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::SceneSettings;
pub use tuning::{Tuning, TuningError};

/// Scene and physics constants
pub mod consts {
    /// Scene width in scene units (SVG viewBox of the hills)
    pub const VIEW_W: f32 = 1200.0;
    /// Scene height in scene units
    pub const VIEW_H: f32 = 600.0;

    /// Downward acceleration (units/s²)
    pub const GRAVITY: f32 = 2000.0;
    /// Horizontal acceleration while a direction is held
    pub const MOVE_ACCEL: f32 = 4000.0;
    /// Horizontal speed cap
    pub const MAX_SPEED_X: f32 = 450.0;
    /// Upward speed applied on jump
    pub const JUMP_SPEED: f32 = 800.0;
    /// Horizontal deceleration on the ground with no input
    pub const FRICTION_GROUND: f32 = 2000.0;
    /// Horizontal deceleration in the air with no input
    pub const FRICTION_AIR: f32 = 200.0;

    /// Allowed penetration when catching a surface
    pub const CATCH_TOLERANCE: f32 = 2.0;
    /// Seconds during which ground collision is ignored after a drop
    pub const DROP_WINDOW: f32 = 0.25;
    /// Distance the actor is pushed below the surface on drop
    pub const DROP_NUDGE: f32 = 3.0;
    /// Minimum downward speed at the start of a drop
    pub const DROP_MIN_VY: f32 = 50.0;

    /// Largest simulation step per frame (seconds)
    pub const MAX_FRAME_DT: f32 = 0.032;
}

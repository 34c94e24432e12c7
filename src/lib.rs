//! Ink Raiders - A lane shooter against an advancing formation
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (movement, collisions, effects, waves, game state)
//! - `bridge`: Entity-id to visual-handle table and the frontend boundary
//! - `game`: Controller that owns the simulation and drives it once per frame
//! - `platform`: Frame clock and key mapping
//! - `highscores`: Single-scalar high score persistence
//! - `tuning`: Data-driven game balance

pub mod bridge;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use bridge::{Bridge, Frontend, VisualHandle};
pub use game::Game;
pub use highscores::{HighScoreStore, JsonFileStore, MemoryStore, StoreError};
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// World geometry constants
///
/// Axes: x is lateral, y is the fixed play plane, z is depth. Enemies sit at
/// negative z and advance toward the player at positive z.
pub mod consts {
    use glam::Vec3;

    /// Lateral bounds shared by the player and the formation sweep
    pub const BOUND_LEFT: f32 = -25.0;
    pub const BOUND_RIGHT: f32 = 25.0;

    /// Player spawn point (reset here at every level start)
    pub const PLAYER_START: Vec3 = Vec3::new(0.0, 0.0, 15.0);
    /// Player cube edge length
    pub const PLAYER_SIZE: f32 = 2.0;

    /// Formation layout
    pub const GRID_SPACING_X: f32 = 4.0;
    pub const GRID_SPACING_Z: f32 = 3.0;
    pub const GRID_FRONT_Z: f32 = -15.0;

    /// Enemy cube edge lengths
    pub const ENEMY_SIZE: f32 = 1.8;
    pub const INKER_SIZE: f32 = 1.4;

    /// Projectile radii
    pub const BULLET_RADIUS: f32 = 0.3;
    pub const ENEMY_BULLET_RADIUS: f32 = 0.4;
    pub const INKER_BULLET_RADIUS: f32 = 0.3;

    /// Pickup extents
    pub const COIN_RADIUS: f32 = 0.7;
    pub const COIN_THICKNESS: f32 = 0.2;
    pub const POWERUP_SIZE: f32 = 1.5;

    /// Bonus ship flight lane and box
    pub const BONUS_SHIP_Z: f32 = -23.0;
    pub const BONUS_SHIP_EDGE_X: f32 = 30.0;
    pub const BONUS_SHIP_SIZE: Vec3 = Vec3::new(3.0, 1.0, 1.5);

    /// Player bullets spawn this far ahead of the ship
    pub const MUZZLE_OFFSET: f32 = 2.0;
}

/// Half extents of a cube with the given edge length
#[inline]
pub fn cube_half_extents(edge: f32) -> Vec3 {
    Vec3::splat(edge / 2.0)
}

/// Clamp a lateral coordinate to the play bounds
#[inline]
pub fn clamp_lateral(x: f32) -> f32 {
    x.clamp(consts::BOUND_LEFT, consts::BOUND_RIGHT)
}

/// True when a lateral coordinate lies outside the play bounds
#[inline]
pub fn outside_lateral(x: f32) -> bool {
    x > consts::BOUND_RIGHT || x < consts::BOUND_LEFT
}

//! Data-driven game balance
//!
//! Every number that shapes difficulty lives here. Defaults reproduce the
//! shipped game; a partial JSON document can override any subset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a tuning document was rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
}

/// Balance constants read by every simulation subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_max_speed: f32,
    pub player_acceleration: f32,
    pub player_friction: f32,
    /// Multiplier on friction, acceleration and max speed while inked
    pub inked_handling: f32,
    /// Friction bonus per side-thruster tier
    pub handling_per_tier: f32,
    /// Acceleration bonus per main-thruster tier
    pub thrust_per_tier: f32,
    pub lives: u8,

    // === Player fire ===
    pub fire_cooldown: f32,
    /// Fire-rate bonus per reload tier (cooldown / (1 + tier * this))
    pub reload_per_tier: f32,
    pub bullet_speed: f32,
    /// Bullet speed bonus per gun-barrel tier
    pub barrel_per_tier: f32,
    /// Player bullets vanish beyond this depth
    pub bullet_despawn_z: f32,

    // === Enemy fire ===
    pub enemy_bullet_speed: f32,
    pub inker_bullet_speed: f32,
    /// Enemy projectiles vanish this far behind the player
    pub enemy_bullet_despawn_behind: f32,
    /// ... or this far outside the lateral bounds
    pub enemy_bullet_despawn_margin: f32,
    /// Chance per second at base speed
    pub shoot_probability: f32,

    // === Pickups ===
    pub coin_fall_speed: f32,
    pub powerup_fall_speed: f32,
    /// Pickups vanish this far behind the player
    pub pickup_despawn_behind: f32,
    pub drop_chance: f32,
    /// Dev-mode power-ups spawn this far in front of the player
    pub dev_powerup_distance: f32,
    pub dev_coin_grant: u32,

    // === Effects ===
    pub powerup_duration: f32,
    pub inked_duration: f32,
    pub pierce_max_hits: u32,
    pub explosion_reach_x: f32,
    pub explosion_reach_z: f32,
    /// Width of each arm of the cross-shaped blast
    pub explosion_arm: f32,

    // === Formation ===
    pub enemy_base_speed: f32,
    pub enemy_step_back: f32,
    /// Base speed multiplier applied every `ramp_every` reversals
    pub ramp_factor: f32,
    pub ramp_every: u32,
    /// Speed multiplier gained per cleared level
    pub level_speed_increment: f32,
    pub grid_min: u32,
    /// Random grid growth per level (rows and columns sampled independently)
    pub grid_growth_per_level: f32,
    pub grid_static_variance: f32,
    pub grid_max_rows: u32,
    pub grid_max_cols: u32,
    /// Inker chance on the front row
    pub inker_front_chance: f32,
    /// Inker chance lost per row behind the front
    pub inker_falloff_per_row: f32,

    // === Level transition ===
    pub transition_speed: f32,
    pub transition_end_z: f32,

    // === Bonus ship ===
    /// Spawn chance per second while no bonus ship is flying
    pub bonus_ship_chance: f32,
    pub bonus_ship_speed: f32,
    pub bonus_ship_scores: Vec<u64>,

    // === Economy ===
    pub upgrade_base_cost: u32,
    pub upgrade_cost_step: u32,
    pub crosshair_cost: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_max_speed: 25.0,
            player_acceleration: 60.0,
            player_friction: 40.0,
            inked_handling: 0.3,
            handling_per_tier: 0.25,
            thrust_per_tier: 0.15,
            lives: 2,

            fire_cooldown: 0.4,
            reload_per_tier: 0.2,
            bullet_speed: 50.0,
            barrel_per_tier: 0.15,
            bullet_despawn_z: -25.0,

            enemy_bullet_speed: 15.0,
            inker_bullet_speed: 12.0,
            enemy_bullet_despawn_behind: 10.0,
            enemy_bullet_despawn_margin: 10.0,
            shoot_probability: 0.1,

            coin_fall_speed: 10.0,
            powerup_fall_speed: 8.0,
            pickup_despawn_behind: 5.0,
            drop_chance: 0.25,
            dev_powerup_distance: 20.0,
            dev_coin_grant: 1000,

            powerup_duration: 10.0,
            inked_duration: 5.0,
            pierce_max_hits: 3,
            explosion_reach_x: 4.5,
            explosion_reach_z: 3.5,
            explosion_arm: 1.0,

            enemy_base_speed: 2.0,
            enemy_step_back: 1.5,
            ramp_factor: 1.17,
            ramp_every: 3,
            level_speed_increment: 0.1,
            grid_min: 3,
            grid_growth_per_level: 0.5,
            grid_static_variance: 2.0,
            grid_max_rows: 6,
            grid_max_cols: 11,
            inker_front_chance: 0.6,
            inker_falloff_per_row: 0.15,

            transition_speed: 60.0,
            transition_end_z: -50.0,

            bonus_ship_chance: 0.05,
            bonus_ship_speed: 8.0,
            bonus_ship_scores: vec![50, 100, 150, 300],

            upgrade_base_cost: 10,
            upgrade_cost_step: 5,
            crosshair_cost: 10,
        }
    }
}

impl Tuning {
    /// Overlay a (possibly partial) JSON document on the defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that cannot produce a playable formation
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.grid_min == 0 {
            return Err(TuningError::Invalid("grid_min must be at least 1"));
        }
        if self.grid_max_rows < self.grid_min {
            return Err(TuningError::Invalid("grid_max_rows is below grid_min"));
        }
        if self.grid_max_cols < self.grid_min {
            return Err(TuningError::Invalid("grid_max_cols is below grid_min"));
        }
        Ok(())
    }

    /// Drop chance after developer-mode override
    pub fn effective_drop_chance(&self, dev_mode: bool) -> f32 {
        if dev_mode { 1.0 } else { self.drop_chance }
    }
}

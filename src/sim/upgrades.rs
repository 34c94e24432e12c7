//! Coin-funded permanent upgrades
//!
//! Tiers persist for the whole session and feed multipliers into movement,
//! fire rate and bullet speed. A purchase either debits the coins and bumps
//! the tier, or changes nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tuning::Tuning;

/// Upgrade shop items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKey {
    /// One-time purchase
    Crosshair,
    /// Handling (friction)
    SideThrusters,
    /// Power (acceleration)
    MainThruster,
    /// Fire rate
    ReloadSpeed,
    /// Bullet speed
    GunBarrel,
}

impl UpgradeKey {
    pub const ALL: [UpgradeKey; 5] = [
        UpgradeKey::Crosshair,
        UpgradeKey::SideThrusters,
        UpgradeKey::MainThruster,
        UpgradeKey::ReloadSpeed,
        UpgradeKey::GunBarrel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UpgradeKey::Crosshair => "Crosshair",
            UpgradeKey::SideThrusters => "Side Thrusters (Handling)",
            UpgradeKey::MainThruster => "Main Thruster (Power)",
            UpgradeKey::ReloadSpeed => "Reload Speed (Fire Rate)",
            UpgradeKey::GunBarrel => "Gun Barrel Length",
        }
    }

    pub fn is_one_time(self) -> bool {
        self == UpgradeKey::Crosshair
    }
}

/// Why a purchase was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("the shop is closed")]
    ShopClosed,
    #[error("{0:?} is already owned")]
    AlreadyOwned(UpgradeKey),
    #[error("need {cost} coins, have {available}")]
    InsufficientFunds { cost: u32, available: u32 },
}

/// Tier per upgrade
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrades {
    pub crosshair: u32,
    pub side_thrusters: u32,
    pub main_thruster: u32,
    pub reload_speed: u32,
    pub gun_barrel: u32,
}

impl Upgrades {
    pub fn level(&self, key: UpgradeKey) -> u32 {
        match key {
            UpgradeKey::Crosshair => self.crosshair,
            UpgradeKey::SideThrusters => self.side_thrusters,
            UpgradeKey::MainThruster => self.main_thruster,
            UpgradeKey::ReloadSpeed => self.reload_speed,
            UpgradeKey::GunBarrel => self.gun_barrel,
        }
    }

    fn level_mut(&mut self, key: UpgradeKey) -> &mut u32 {
        match key {
            UpgradeKey::Crosshair => &mut self.crosshair,
            UpgradeKey::SideThrusters => &mut self.side_thrusters,
            UpgradeKey::MainThruster => &mut self.main_thruster,
            UpgradeKey::ReloadSpeed => &mut self.reload_speed,
            UpgradeKey::GunBarrel => &mut self.gun_barrel,
        }
    }

    pub fn owns_crosshair(&self) -> bool {
        self.crosshair > 0
    }

    /// Price of the next tier
    pub fn cost(&self, key: UpgradeKey, tuning: &Tuning) -> u32 {
        if key.is_one_time() {
            tuning.crosshair_cost
        } else {
            tuning.upgrade_base_cost + self.level(key) * tuning.upgrade_cost_step
        }
    }

    /// Whether the next tier can be bought with `coins`
    pub fn can_afford(&self, key: UpgradeKey, coins: u32, tuning: &Tuning) -> bool {
        !(key.is_one_time() && self.level(key) > 0) && coins >= self.cost(key, tuning)
    }

    /// Buy the next tier, debiting `coins`. Returns the new tier.
    pub fn purchase(
        &mut self,
        key: UpgradeKey,
        coins: &mut u32,
        tuning: &Tuning,
    ) -> Result<u32, PurchaseError> {
        if key.is_one_time() && self.level(key) > 0 {
            return Err(PurchaseError::AlreadyOwned(key));
        }
        let cost = self.cost(key, tuning);
        if *coins < cost {
            return Err(PurchaseError::InsufficientFunds {
                cost,
                available: *coins,
            });
        }
        *coins -= cost;
        let level = self.level_mut(key);
        *level += 1;
        Ok(*level)
    }

    // === Stat multipliers ===

    pub fn friction_multiplier(&self, tuning: &Tuning) -> f32 {
        1.0 + self.side_thrusters as f32 * tuning.handling_per_tier
    }

    pub fn acceleration_multiplier(&self, tuning: &Tuning) -> f32 {
        1.0 + self.main_thruster as f32 * tuning.thrust_per_tier
    }

    /// Seconds between shots
    pub fn fire_cooldown(&self, tuning: &Tuning) -> f32 {
        tuning.fire_cooldown / (1.0 + self.reload_speed as f32 * tuning.reload_per_tier)
    }

    pub fn bullet_speed(&self, tuning: &Tuning) -> f32 {
        tuning.bullet_speed * (1.0 + self.gun_barrel as f32 * tuning.barrel_per_tier)
    }
}

//! Side effects produced by the simulation
//!
//! The core never talks to rendering, audio or the HUD directly. Each tick it
//! appends `GameEvent`s to `GameState::events`; the host drains them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::effects::EffectKind;
use super::state::{EnemyKind, EntityId, GamePhase, PowerupKind};
use super::upgrades::UpgradeKey;

/// What a spawned entity should look like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualKind {
    Player,
    Bullet,
    EnemyBullet,
    InkerBullet,
    Enemy(EnemyKind),
    Coin,
    Powerup(PowerupKind),
    BonusShip,
}

/// One side effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned {
        id: EntityId,
        kind: VisualKind,
        pos: Vec3,
    },
    Despawned {
        id: EntityId,
    },
    PhaseChanged {
        from: GamePhase,
        to: GamePhase,
    },
    LevelStarted {
        level: u32,
    },
    CoinsChanged(u32),
    ScoreChanged(u64),
    HighScoreChanged(u64),
    LivesChanged(u8),
    EffectActivated {
        kind: EffectKind,
        remaining_fraction: f32,
    },
    /// Emitted every frame an effect stays active (HUD bars)
    EffectProgress {
        kind: EffectKind,
        remaining_fraction: f32,
    },
    EffectExpired {
        kind: EffectKind,
    },
    EnemyDestroyed {
        kind: EnemyKind,
        pos: Vec3,
    },
    BonusShipDestroyed {
        score: u64,
    },
    PlayerHit,
    CrosshairVisibility(bool),
    DevModeChanged(bool),
    UpgradePurchased {
        key: UpgradeKey,
        level: u32,
    },
}

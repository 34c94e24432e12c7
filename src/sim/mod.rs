//! Simulation core
//!
//! All gameplay logic lives here. The core never touches rendering, audio or
//! the DOM; side effects come out as `GameEvent`s.
//! - Variable timestep supplied by the host (clamped upstream)
//! - Seeded RNG only
//! - No platform dependencies

pub mod collision;
pub mod effects;
pub mod events;
pub mod movement;
pub mod score;
pub mod state;
pub mod tick;
pub mod upgrades;
pub mod wave;

pub use collision::Aabb;
pub use effects::{ActiveEffects, EffectKind, TimedEffect};
pub use events::{GameEvent, VisualKind};
pub use score::ScoreLedger;
pub use state::{
    BonusShip, Bullet, Coin, Enemy, EnemyKind, Entity, EntityId, Formation, GamePhase, GameState,
    Player, Powerup, PowerupKind, Shot,
};
pub use tick::{Command, CommandError, TickInput, TransitionError, tick};
pub use upgrades::{PurchaseError, UpgradeKey, Upgrades};

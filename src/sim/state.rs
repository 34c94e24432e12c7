//! Game state and entity registry
//!
//! Every mutable thing the simulation touches lives in `GameState`. Entities
//! carry an `EntityId` so the bridge can map them to visuals; spawning and
//! despawning always goes through the registry so the matching event is
//! emitted.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::effects::ActiveEffects;
use super::events::{GameEvent, VisualKind};
use super::score::ScoreLedger;
use super::upgrades::Upgrades;
use crate::consts::*;
use crate::cube_half_extents;
use crate::tuning::Tuning;

/// Stable identity of a simulation entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    MainMenu,
    Shop,
    /// Active gameplay
    Playing,
    Paused,
    /// Fly-forward between levels
    Transition,
    GameOver,
    /// Declared for the UI; no transition leads here
    Win,
}

impl GamePhase {
    /// Whether `self -> to` is a legal transition
    pub fn can_transition_to(self, to: GamePhase) -> bool {
        use GamePhase::*;
        matches!(
            (self, to),
            (MainMenu, Playing)
                | (MainMenu, Shop)
                | (Shop, MainMenu)
                | (Playing, Paused)
                | (Playing, Transition)
                | (Playing, GameOver)
                | (Paused, Playing)
                | (Paused, MainMenu)
                | (Transition, Playing)
                | (GameOver, MainMenu)
                | (Win, MainMenu)
        )
    }

    /// Phases in which the scene is drawn at all
    pub fn renders_scene(self) -> bool {
        !matches!(self, GamePhase::MainMenu | GamePhase::Shop)
    }
}

/// Enemy sub-kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Red,
    Blue,
    /// Fires ink that slows the player instead of costing a life
    Inker,
}

impl EnemyKind {
    pub fn score(self) -> u64 {
        match self {
            EnemyKind::Red => 20,
            EnemyKind::Inker => 30,
            EnemyKind::Blue => 40,
        }
    }

    pub fn size(self) -> f32 {
        match self {
            EnemyKind::Red | EnemyKind::Blue => ENEMY_SIZE,
            EnemyKind::Inker => INKER_SIZE,
        }
    }

    /// Whether this kind shoots at all
    pub fn shoots(self) -> bool {
        matches!(self, EnemyKind::Blue | EnemyKind::Inker)
    }
}

/// Power-up sub-kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Explosive,
    Pierce,
}

/// Common view over entities for collision and visual sync
pub trait Entity {
    fn id(&self) -> EntityId;
    fn pos(&self) -> Vec3;
    fn half_extents(&self) -> Vec3;

    /// World-space bounding box at the current position
    fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos(), self.half_extents())
    }
}

/// The player's ship
#[derive(Debug, Clone)]
pub struct Player {
    pub id: EntityId,
    pub pos: Vec3,
    /// Signed lateral speed
    pub speed: f32,
}

impl Player {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            pos: PLAYER_START,
            speed: 0.0,
        }
    }
}

/// A player bullet
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: EntityId,
    pub pos: Vec3,
    /// Enemies hit so far (only counted while Pierce is active)
    pub hits: u32,
}

/// An enemy projectile (plain or ink)
#[derive(Debug, Clone)]
pub struct Shot {
    pub id: EntityId,
    pub pos: Vec3,
    /// Unit direction, scaled by the projectile's speed constant
    pub vel: Vec3,
    pub radius: f32,
}

/// A formation member; its world position is `local + formation.offset`
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub local: Vec3,
}

/// The enemy grid, moving rigidly through a shared offset
#[derive(Debug, Clone)]
pub struct Formation {
    pub enemies: Vec<Enemy>,
    pub offset: Vec3,
    /// +1 sweeping right, -1 sweeping left
    pub direction: f32,
    /// Speed before the level multiplier; ramps within a level
    pub base_speed: f32,
    pub direction_changes: u32,
}

impl Formation {
    pub fn new(enemies: Vec<Enemy>, base_speed: f32) -> Self {
        Self {
            enemies,
            offset: Vec3::ZERO,
            direction: 1.0,
            base_speed,
            direction_changes: 0,
        }
    }

    pub fn world_pos(&self, enemy: &Enemy) -> Vec3 {
        enemy.local + self.offset
    }

    pub fn bounds_of(&self, enemy: &Enemy) -> Aabb {
        Aabb::from_center(self.world_pos(enemy), cube_half_extents(enemy.kind.size()))
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}

/// A falling coin
#[derive(Debug, Clone)]
pub struct Coin {
    pub id: EntityId,
    pub pos: Vec3,
}

/// A falling power-up
#[derive(Debug, Clone)]
pub struct Powerup {
    pub id: EntityId,
    pub kind: PowerupKind,
    pub pos: Vec3,
}

/// The occasional bonus ship crossing behind the formation
#[derive(Debug, Clone)]
pub struct BonusShip {
    pub id: EntityId,
    pub pos: Vec3,
    pub direction: f32,
}

impl Entity for Player {
    fn id(&self) -> EntityId {
        self.id
    }
    fn pos(&self) -> Vec3 {
        self.pos
    }
    fn half_extents(&self) -> Vec3 {
        cube_half_extents(PLAYER_SIZE)
    }
}

impl Entity for Bullet {
    fn id(&self) -> EntityId {
        self.id
    }
    fn pos(&self) -> Vec3 {
        self.pos
    }
    fn half_extents(&self) -> Vec3 {
        Vec3::splat(BULLET_RADIUS)
    }
}

impl Entity for Shot {
    fn id(&self) -> EntityId {
        self.id
    }
    fn pos(&self) -> Vec3 {
        self.pos
    }
    fn half_extents(&self) -> Vec3 {
        Vec3::splat(self.radius)
    }
}

impl Entity for Coin {
    fn id(&self) -> EntityId {
        self.id
    }
    fn pos(&self) -> Vec3 {
        self.pos
    }
    fn half_extents(&self) -> Vec3 {
        // Disc lying flat in the play plane
        Vec3::new(COIN_RADIUS, COIN_RADIUS, COIN_THICKNESS / 2.0)
    }
}

impl Entity for Powerup {
    fn id(&self) -> EntityId {
        self.id
    }
    fn pos(&self) -> Vec3 {
        self.pos
    }
    fn half_extents(&self) -> Vec3 {
        cube_half_extents(POWERUP_SIZE)
    }
}

impl Entity for BonusShip {
    fn id(&self) -> EntityId {
        self.id
    }
    fn pos(&self) -> Vec3 {
        self.pos
    }
    fn half_extents(&self) -> Vec3 {
        BONUS_SHIP_SIZE / 2.0
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Balance constants
    pub tuning: Tuning,
    pub phase: GamePhase,

    // === Entities ===
    pub player: Option<Player>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Shot>,
    pub inker_bullets: Vec<Shot>,
    pub formation: Option<Formation>,
    pub coins: Vec<Coin>,
    pub powerups: Vec<Powerup>,
    pub bonus_ship: Option<BonusShip>,

    // === Run-scoped counters ===
    pub lives: u8,
    /// 1-based level index
    pub level: u32,
    /// Grows by a fixed increment every cleared level
    pub speed_multiplier: f32,
    /// Seconds until the gun may fire again
    pub reload_timer: f32,

    // === Session-scoped ===
    pub coin_count: u32,
    pub upgrades: Upgrades,
    pub score: ScoreLedger,
    pub effects: ActiveEffects,
    pub dev_mode: bool,
    /// Player preference; the crosshair only shows once purchased
    pub show_crosshair: bool,

    /// Side effects produced since the last drain
    pub events: Vec<GameEvent>,

    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a session at the main menu
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let lives = tuning.lives;
        Self {
            tuning,
            phase: GamePhase::MainMenu,
            player: None,
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            inker_bullets: Vec::new(),
            formation: None,
            coins: Vec::new(),
            powerups: Vec::new(),
            bonus_ship: None,
            lives,
            level: 1,
            speed_multiplier: 1.0,
            reload_timer: 0.0,
            coin_count: 0,
            upgrades: Upgrades::default(),
            score: ScoreLedger::default(),
            effects: ActiveEffects::default(),
            dev_mode: false,
            show_crosshair: false,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Take all pending side effects
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn announce(&mut self, id: EntityId, kind: VisualKind, pos: Vec3) {
        self.events.push(GameEvent::Spawned { id, kind, pos });
    }

    // === Spawning ===

    pub fn spawn_player(&mut self) {
        if let Some(old) = self.player.take() {
            self.events.push(GameEvent::Despawned { id: old.id });
        }
        let id = self.next_entity_id();
        let player = Player::new(id);
        self.announce(id, VisualKind::Player, player.pos);
        self.player = Some(player);
    }

    pub fn spawn_bullet(&mut self, pos: Vec3) {
        let id = self.next_entity_id();
        self.announce(id, VisualKind::Bullet, pos);
        self.bullets.push(Bullet { id, pos, hits: 0 });
    }

    /// Straight enemy bullet heading toward the player's side
    pub fn spawn_enemy_bullet(&mut self, pos: Vec3) {
        let id = self.next_entity_id();
        self.announce(id, VisualKind::EnemyBullet, pos);
        self.enemy_bullets.push(Shot {
            id,
            pos,
            vel: Vec3::Z,
            radius: ENEMY_BULLET_RADIUS,
        });
    }

    pub fn spawn_inker_bullet(&mut self, pos: Vec3) {
        let id = self.next_entity_id();
        self.announce(id, VisualKind::InkerBullet, pos);
        self.inker_bullets.push(Shot {
            id,
            pos,
            vel: Vec3::Z,
            radius: INKER_BULLET_RADIUS,
        });
    }

    pub fn spawn_coin(&mut self, pos: Vec3) {
        let id = self.next_entity_id();
        self.announce(id, VisualKind::Coin, pos);
        self.coins.push(Coin { id, pos });
    }

    pub fn spawn_powerup(&mut self, pos: Vec3, kind: PowerupKind) {
        let id = self.next_entity_id();
        self.announce(id, VisualKind::Powerup(kind), pos);
        self.powerups.push(Powerup { id, kind, pos });
    }

    /// Create an enemy (not yet attached to a formation)
    pub fn make_enemy(&mut self, kind: EnemyKind, local: Vec3) -> Enemy {
        let id = self.next_entity_id();
        self.announce(id, VisualKind::Enemy(kind), local);
        Enemy { id, kind, local }
    }

    pub fn spawn_bonus_ship(&mut self, pos: Vec3, direction: f32) {
        if self.bonus_ship.is_some() {
            return;
        }
        let id = self.next_entity_id();
        self.announce(id, VisualKind::BonusShip, pos);
        self.bonus_ship = Some(BonusShip { id, pos, direction });
    }

    // === Despawning ===

    pub fn despawn_player(&mut self) {
        if let Some(player) = self.player.take() {
            self.events.push(GameEvent::Despawned { id: player.id });
        }
    }

    pub fn despawn_bonus_ship(&mut self) {
        if let Some(ship) = self.bonus_ship.take() {
            self.events.push(GameEvent::Despawned { id: ship.id });
        }
    }

    /// Remove every plain enemy bullet (ink shots stay in flight)
    pub fn clear_enemy_bullets(&mut self) {
        despawn_all(&mut self.enemy_bullets, &mut self.events);
    }

    /// Remove every in-flight projectile and power-up (level clear)
    pub fn clear_projectiles(&mut self) {
        despawn_all(&mut self.bullets, &mut self.events);
        despawn_all(&mut self.enemy_bullets, &mut self.events);
        despawn_all(&mut self.inker_bullets, &mut self.events);
        despawn_all(&mut self.powerups, &mut self.events);
    }

    /// Remove the formation and all of its members
    pub fn clear_formation(&mut self) {
        if let Some(formation) = self.formation.take() {
            for enemy in formation.enemies {
                self.events.push(GameEvent::Despawned { id: enemy.id });
            }
        }
    }

    /// Remove every entity (new game)
    pub fn clear_entities(&mut self) {
        self.despawn_player();
        self.clear_projectiles();
        despawn_all(&mut self.coins, &mut self.events);
        self.clear_formation();
        self.despawn_bonus_ship();
    }

    /// Visit every live entity as (id, world position)
    pub fn for_each_entity(&self, mut f: impl FnMut(EntityId, Vec3)) {
        if let Some(player) = &self.player {
            f(player.id, player.pos);
        }
        self.bullets.iter().for_each(|b| f(b.id, b.pos));
        self.enemy_bullets.iter().for_each(|s| f(s.id, s.pos));
        self.inker_bullets.iter().for_each(|s| f(s.id, s.pos));
        if let Some(formation) = &self.formation {
            for enemy in &formation.enemies {
                f(enemy.id, formation.world_pos(enemy));
            }
        }
        self.coins.iter().for_each(|c| f(c.id, c.pos));
        self.powerups.iter().for_each(|p| f(p.id, p.pos));
        if let Some(ship) = &self.bonus_ship {
            f(ship.id, ship.pos);
        }
    }

    /// Number of enemies still in the formation (0 when none exists)
    pub fn enemies_remaining(&self) -> usize {
        self.formation.as_ref().map_or(0, Formation::len)
    }
}

/// Empty a collection, emitting a despawn for each member
pub(crate) fn despawn_all<T: Entity>(items: &mut Vec<T>, events: &mut Vec<GameEvent>) {
    for item in items.drain(..) {
        events.push(GameEvent::Despawned { id: item.id() });
    }
}

/// Remove members matching `pred`, emitting a despawn for each
pub(crate) fn despawn_where<T: Entity>(
    items: &mut Vec<T>,
    events: &mut Vec<GameEvent>,
    mut pred: impl FnMut(&T) -> bool,
) {
    items.retain(|item| {
        if pred(item) {
            events.push(GameEvent::Despawned { id: item.id() });
            false
        } else {
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = GameState::new(1, Tuning::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_spawn_emits_event() {
        let mut state = GameState::new(1, Tuning::default());
        state.spawn_coin(Vec3::new(1.0, 0.0, -3.0));
        assert_eq!(state.coins.len(), 1);
        assert!(matches!(
            state.events.as_slice(),
            [GameEvent::Spawned {
                kind: VisualKind::Coin,
                ..
            }]
        ));
    }

    #[test]
    fn test_clear_entities_despawns_everything() {
        let mut state = GameState::new(1, Tuning::default());
        state.spawn_player();
        state.spawn_bullet(Vec3::ZERO);
        state.spawn_enemy_bullet(Vec3::ZERO);
        state.spawn_inker_bullet(Vec3::ZERO);
        state.spawn_coin(Vec3::ZERO);
        state.spawn_powerup(Vec3::ZERO, PowerupKind::Pierce);
        let enemy = state.make_enemy(EnemyKind::Red, Vec3::ZERO);
        state.formation = Some(Formation::new(vec![enemy], 2.0));
        state.drain_events();

        state.clear_entities();

        let despawns = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Despawned { .. }))
            .count();
        assert_eq!(despawns, 7);
        assert!(state.player.is_none());
        assert!(state.formation.is_none());
        assert_eq!(state.enemies_remaining(), 0);
    }

    #[test]
    fn test_world_pos_follows_offset() {
        let mut state = GameState::new(1, Tuning::default());
        let enemy = state.make_enemy(EnemyKind::Blue, Vec3::new(2.0, 0.0, -15.0));
        let mut formation = Formation::new(vec![enemy], 2.0);
        formation.offset = Vec3::new(3.0, 0.0, 1.5);
        let world = formation.world_pos(&formation.enemies[0]);
        assert_eq!(world, Vec3::new(5.0, 0.0, -13.5));
    }

    #[test]
    fn test_phase_transitions() {
        use GamePhase::*;
        assert!(MainMenu.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Transition));
        assert!(GameOver.can_transition_to(MainMenu));
        assert!(!GameOver.can_transition_to(Playing));
        assert!(!Playing.can_transition_to(Win));
        assert!(!MainMenu.can_transition_to(Win));
        assert!(!Shop.renders_scene());
        assert!(Paused.renders_scene());
    }
}

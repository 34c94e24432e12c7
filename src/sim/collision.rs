//! Collision detection and response
//!
//! Axis-aligned boxes rebuilt from each entity's current position every frame.
//! No broad phase: bullets are tested against every enemy, which is cheap at
//! this entity count.
//!
//! Resolution order per frame:
//! 1. player bullets vs enemies
//! 2. player bullets vs bonus ship
//! 3. enemy bullets vs player (a hit ends resolution for the frame)
//! 4. ink bullets vs player
//! 5. enemies vs player (overlap or advanced past the player's depth)

use glam::Vec3;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::effects::EffectKind;
use super::events::GameEvent;
use super::state::{Entity, GameState, PowerupKind, despawn_where};
use crate::tuning::Tuning;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Overlap test; touching faces count as a hit
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }
}

/// Cross-shaped blast footprint around an exploding enemy
pub fn in_blast(center: Vec3, other: Vec3, tuning: &Tuning) -> bool {
    let dx = (other.x - center.x).abs();
    let dz = (other.z - center.z).abs();
    (dx < tuning.explosion_reach_x && dz < tuning.explosion_arm)
        || (dz < tuning.explosion_reach_z && dx < tuning.explosion_arm)
}

/// Coins and power-ups touching the player are collected
pub fn collect_pickups(state: &mut GameState) {
    let Some(player_box) = state.player.as_ref().map(Entity::bounds) else {
        return;
    };

    let mut collected = 0u32;
    despawn_where(&mut state.coins, &mut state.events, |coin| {
        let hit = coin.bounds().intersects(&player_box);
        if hit {
            collected += 1;
        }
        hit
    });
    if collected > 0 {
        state.coin_count += collected;
        state.events.push(GameEvent::CoinsChanged(state.coin_count));
    }

    let mut picked: Vec<PowerupKind> = Vec::new();
    despawn_where(&mut state.powerups, &mut state.events, |powerup| {
        let hit = powerup.bounds().intersects(&player_box);
        if hit {
            picked.push(powerup.kind);
        }
        hit
    });
    for kind in picked {
        state
            .effects
            .activate(kind.into(), &state.tuning, &mut state.events);
    }
}

/// Run every collision pass in order
pub fn resolve(state: &mut GameState) {
    bullets_vs_enemies(state);
    bullets_vs_bonus_ship(state);
    if enemy_bullets_vs_player(state) {
        return;
    }
    inker_bullets_vs_player(state);
    enemies_vs_player(state);
}

/// Player bullets against the formation: drops, explosions, piercing, rewards
pub fn bullets_vs_enemies(state: &mut GameState) {
    let Some(mut formation) = state.formation.take() else {
        return;
    };

    let explosive = state.effects.is_active(EffectKind::Explosive);
    let pierce = state.effects.is_active(EffectKind::Pierce);
    let drop_chance = state.tuning.effective_drop_chance(state.dev_mode);
    let max_hits = state.tuning.pierce_max_hits;

    let mut destroyed = vec![false; formation.enemies.len()];
    let mut spent = vec![false; state.bullets.len()];

    for bullet_idx in 0..state.bullets.len() {
        let bullet_box = state.bullets[bullet_idx].bounds();

        for enemy_idx in 0..formation.enemies.len() {
            if destroyed[enemy_idx] {
                continue;
            }
            let enemy = &formation.enemies[enemy_idx];
            if !formation.bounds_of(enemy).intersects(&bullet_box) {
                continue;
            }
            let hit_pos = formation.world_pos(enemy);

            // Only a bullet's first hit can drop a power-up
            if state.bullets[bullet_idx].hits == 0 && state.rng.random::<f32>() < drop_chance {
                let kind = if state.rng.random_bool(0.5) {
                    PowerupKind::Explosive
                } else {
                    PowerupKind::Pierce
                };
                state.spawn_powerup(hit_pos, kind);
            }

            let mut blast = vec![enemy_idx];
            if explosive {
                for (other_idx, other) in formation.enemies.iter().enumerate() {
                    if other_idx != enemy_idx
                        && !destroyed[other_idx]
                        && in_blast(hit_pos, formation.world_pos(other), &state.tuning)
                    {
                        blast.push(other_idx);
                    }
                }
            }

            let mut consumed = true;
            if pierce {
                let bullet = &mut state.bullets[bullet_idx];
                bullet.hits += 1;
                consumed = bullet.hits >= max_hits;
            }

            for idx in blast {
                destroyed[idx] = true;
                let victim = &formation.enemies[idx];
                let pos = formation.world_pos(victim);
                let (id, kind) = (victim.id, victim.kind);
                state.events.push(GameEvent::Despawned { id });
                state.events.push(GameEvent::EnemyDestroyed { kind, pos });
                state.award(kind.score());
                state.spawn_coin(pos);
            }

            if consumed {
                spent[bullet_idx] = true;
                break;
            }
        }
    }

    let mut idx = 0;
    formation.enemies.retain(|_| {
        let keep = !destroyed[idx];
        idx += 1;
        keep
    });
    state.formation = Some(formation);

    let mut idx = 0;
    despawn_where(&mut state.bullets, &mut state.events, |_| {
        let gone = spent[idx];
        idx += 1;
        gone
    });
}

/// Any bullet touching the bonus ship destroys both
pub fn bullets_vs_bonus_ship(state: &mut GameState) {
    let Some(ship_box) = state.bonus_ship.as_ref().map(Entity::bounds) else {
        return;
    };
    let Some(idx) = state
        .bullets
        .iter()
        .position(|b| b.bounds().intersects(&ship_box))
    else {
        return;
    };

    let bullet = state.bullets.remove(idx);
    state.events.push(GameEvent::Despawned { id: bullet.id });
    state.despawn_bonus_ship();

    let score = state
        .tuning
        .bonus_ship_scores
        .choose(&mut state.rng)
        .copied()
        .unwrap_or(0);
    log::debug!("Bonus ship destroyed for {} points", score);
    state.events.push(GameEvent::BonusShipDestroyed { score });
    state.award(score);
}

/// Returns true when a hit cost the player a life
pub fn enemy_bullets_vs_player(state: &mut GameState) -> bool {
    let Some(player_box) = state.player.as_ref().map(Entity::bounds) else {
        return false;
    };
    let Some(idx) = state
        .enemy_bullets
        .iter()
        .position(|s| s.bounds().intersects(&player_box))
    else {
        return false;
    };

    let shot = state.enemy_bullets.remove(idx);
    state.events.push(GameEvent::Despawned { id: shot.id });
    state.lose_life();
    true
}

/// Ink hits slow the player down instead of costing a life
pub fn inker_bullets_vs_player(state: &mut GameState) {
    let Some(player_box) = state.player.as_ref().map(Entity::bounds) else {
        return;
    };
    let mut hits = 0;
    despawn_where(&mut state.inker_bullets, &mut state.events, |shot| {
        let hit = shot.bounds().intersects(&player_box);
        if hit {
            hits += 1;
        }
        hit
    });
    for _ in 0..hits {
        state
            .effects
            .activate(EffectKind::Inked, &state.tuning, &mut state.events);
    }
}

/// Returns true when the formation reached the player
pub fn enemies_vs_player(state: &mut GameState) -> bool {
    let breached = match (&state.player, &state.formation) {
        (Some(player), Some(formation)) => {
            let player_box = player.bounds();
            formation.enemies.iter().any(|enemy| {
                formation.bounds_of(enemy).intersects(&player_box)
                    || formation.world_pos(enemy).z > player.pos.z
            })
        }
        _ => false,
    };
    if breached {
        state.lose_life();
    }
    breached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{EnemyKind, Formation, GamePhase};

    /// A playing state with a player and a formation at the given world positions
    fn arena(enemies: &[(EnemyKind, Vec3)]) -> GameState {
        let mut state = GameState::new(7, Tuning::default());
        state.phase = GamePhase::Playing;
        state.spawn_player();
        let members = enemies
            .iter()
            .map(|&(kind, pos)| state.make_enemy(kind, pos))
            .collect();
        state.formation = Some(Formation::new(members, 2.0));
        state.drain_events();
        state
    }

    fn activate(state: &mut GameState, kind: EffectKind) {
        state
            .effects
            .activate(kind, &state.tuning, &mut state.events);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_center(Vec3::new(1.5, 0.0, 0.0), Vec3::ONE);
        let c = Aabb::from_center(Vec3::new(2.5, 0.0, 0.0), Vec3::splat(0.4));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(b.intersects(&c));
    }

    #[test]
    fn test_blast_is_cross_shaped() {
        let tuning = Tuning::default();
        let center = Vec3::new(0.0, 0.0, -15.0);
        assert!(in_blast(center, Vec3::new(3.0, 0.0, -15.0), &tuning));
        assert!(in_blast(center, Vec3::new(0.0, 0.0, -18.0), &tuning));
        assert!(!in_blast(center, Vec3::new(0.0, 0.0, -20.0), &tuning));
        // Diagonal neighbours are outside both arms
        assert!(!in_blast(center, Vec3::new(3.0, 0.0, -18.0), &tuning));
    }

    #[test]
    fn test_plain_hit_destroys_one_enemy() {
        let mut state = arena(&[
            (EnemyKind::Red, Vec3::new(0.0, 0.0, -15.0)),
            (EnemyKind::Red, Vec3::new(4.0, 0.0, -15.0)),
        ]);
        state.spawn_bullet(Vec3::new(0.0, 0.0, -15.0));

        bullets_vs_enemies(&mut state);

        assert_eq!(state.enemies_remaining(), 1);
        assert!(state.bullets.is_empty());
        assert_eq!(state.coins.len(), 1);
        assert_eq!(state.score.score(), 20);
    }

    #[test]
    fn test_score_by_kind() {
        let mut state = arena(&[
            (EnemyKind::Red, Vec3::new(-8.0, 0.0, -15.0)),
            (EnemyKind::Inker, Vec3::new(0.0, 0.0, -15.0)),
            (EnemyKind::Blue, Vec3::new(8.0, 0.0, -15.0)),
        ]);
        for x in [-8.0, 0.0, 8.0] {
            state.spawn_bullet(Vec3::new(x, 0.0, -15.0));
        }
        bullets_vs_enemies(&mut state);
        assert_eq!(state.score.score(), 20 + 30 + 40);
        assert_eq!(state.enemies_remaining(), 0);
    }

    #[test]
    fn test_explosive_chain() {
        let mut state = arena(&[
            (EnemyKind::Red, Vec3::new(0.0, 0.0, -15.0)),
            (EnemyKind::Red, Vec3::new(3.0, 0.0, -15.0)),
            (EnemyKind::Red, Vec3::new(0.0, 0.0, -20.0)),
        ]);
        activate(&mut state, EffectKind::Explosive);
        state.spawn_bullet(Vec3::new(0.0, 0.0, -15.0));

        bullets_vs_enemies(&mut state);

        let formation = state.formation.as_ref().unwrap();
        assert_eq!(formation.len(), 1);
        assert_eq!(formation.enemies[0].local, Vec3::new(0.0, 0.0, -20.0));
        assert_eq!(state.coins.len(), 2);
        assert_eq!(state.score.score(), 40);
    }

    #[test]
    fn test_pierce_consumes_on_third_hit() {
        let mut state = arena(&[
            (EnemyKind::Red, Vec3::new(0.0, 0.0, -5.0)),
            (EnemyKind::Red, Vec3::new(0.0, 0.0, -10.0)),
            (EnemyKind::Red, Vec3::new(0.0, 0.0, -15.0)),
            (EnemyKind::Red, Vec3::new(0.0, 0.0, -20.0)),
        ]);
        activate(&mut state, EffectKind::Pierce);
        state.spawn_bullet(Vec3::new(0.0, 0.0, -5.0));

        bullets_vs_enemies(&mut state);
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.bullets[0].hits, 1);

        state.bullets[0].pos.z = -10.0;
        bullets_vs_enemies(&mut state);
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.bullets[0].hits, 2);

        state.bullets[0].pos.z = -15.0;
        bullets_vs_enemies(&mut state);
        assert!(state.bullets.is_empty());
        assert_eq!(state.enemies_remaining(), 1);
    }

    #[test]
    fn test_pierce_stops_scanning_once_spent() {
        // Four stacked enemies: a piercing bullet takes exactly three
        let stacked = [(EnemyKind::Red, Vec3::new(0.0, 0.0, -15.0)); 4];
        let mut state = arena(&stacked);
        activate(&mut state, EffectKind::Pierce);
        state.spawn_bullet(Vec3::new(0.0, 0.0, -15.0));

        bullets_vs_enemies(&mut state);

        assert!(state.bullets.is_empty());
        assert_eq!(state.enemies_remaining(), 1);
        assert_eq!(state.score.score(), 60);
    }

    #[test]
    fn test_dev_mode_drops_on_every_first_hit() {
        let mut state = arena(&[
            (EnemyKind::Red, Vec3::new(-8.0, 0.0, -15.0)),
            (EnemyKind::Red, Vec3::new(0.0, 0.0, -15.0)),
            (EnemyKind::Red, Vec3::new(8.0, 0.0, -15.0)),
        ]);
        state.dev_mode = true;
        for x in [-8.0, 0.0, 8.0] {
            state.spawn_bullet(Vec3::new(x, 0.0, -15.0));
        }
        bullets_vs_enemies(&mut state);
        assert_eq!(state.powerups.len(), 3);
    }

    #[test]
    fn test_piercing_bullet_drops_once() {
        let stacked = [(EnemyKind::Red, Vec3::new(0.0, 0.0, -15.0)); 3];
        let mut state = arena(&stacked);
        state.dev_mode = true;
        activate(&mut state, EffectKind::Pierce);
        state.spawn_bullet(Vec3::new(0.0, 0.0, -15.0));
        bullets_vs_enemies(&mut state);
        assert_eq!(state.enemies_remaining(), 0);
        assert_eq!(state.powerups.len(), 1);
    }

    #[test]
    fn test_bonus_ship_hit() {
        let mut state = arena(&[]);
        state.spawn_bonus_ship(Vec3::new(0.0, 0.0, -23.0), 1.0);
        state.spawn_bullet(Vec3::new(0.5, 0.0, -23.0));
        state.spawn_bullet(Vec3::new(0.5, 0.0, -23.0));

        bullets_vs_bonus_ship(&mut state);

        assert!(state.bonus_ship.is_none());
        assert_eq!(state.bullets.len(), 1);
        assert!(state.tuning.bonus_ship_scores.contains(&state.score.score()));
    }

    #[test]
    fn test_enemy_bullet_costs_life_and_stops_resolution() {
        let mut state = arena(&[(EnemyKind::Red, Vec3::new(0.0, 0.0, -15.0))]);
        state.spawn_enemy_bullet(Vec3::new(0.0, 0.0, 15.0));
        state.spawn_enemy_bullet(Vec3::new(10.0, 0.0, 0.0));
        state.spawn_inker_bullet(Vec3::new(0.0, 0.0, 15.0));

        resolve(&mut state);

        assert_eq!(state.lives, 1);
        // Life loss clears the remaining enemy bullets
        assert!(state.enemy_bullets.is_empty());
        // Ink was never checked this frame
        assert_eq!(state.inker_bullets.len(), 1);
        assert!(!state.effects.is_active(EffectKind::Inked));
    }

    #[test]
    fn test_ink_hit_does_not_cost_life() {
        let mut state = arena(&[(EnemyKind::Red, Vec3::new(0.0, 0.0, -15.0))]);
        state.spawn_inker_bullet(Vec3::new(0.5, 0.0, 15.0));
        state.spawn_inker_bullet(Vec3::new(-0.5, 0.0, 14.5));

        resolve(&mut state);

        assert_eq!(state.lives, 2);
        assert!(state.inker_bullets.is_empty());
        assert!(state.effects.is_active(EffectKind::Inked));
        assert_eq!(state.effects.inked.remaining, 5.0);
    }

    #[test]
    fn test_enemy_past_player_costs_life() {
        let mut state = arena(&[(EnemyKind::Red, Vec3::new(20.0, 0.0, 16.0))]);
        assert!(enemies_vs_player(&mut state));
        assert_eq!(state.lives, 1);
    }

    #[test]
    fn test_enemy_overlapping_player_costs_life() {
        let mut state = arena(&[(EnemyKind::Blue, Vec3::new(1.0, 0.0, 14.0))]);
        assert!(enemies_vs_player(&mut state));
        assert_eq!(state.lives, 1);
    }

    #[test]
    fn test_pickups_collected() {
        let mut state = arena(&[]);
        state.spawn_coin(Vec3::new(0.5, 0.0, 15.0));
        state.spawn_coin(Vec3::new(10.0, 0.0, 15.0));
        state.spawn_powerup(Vec3::new(-0.5, 0.0, 15.5), PowerupKind::Explosive);

        collect_pickups(&mut state);

        assert_eq!(state.coin_count, 1);
        assert_eq!(state.coins.len(), 1);
        assert!(state.powerups.is_empty());
        assert!(state.effects.is_active(EffectKind::Explosive));
    }

    #[test]
    fn test_no_player_is_a_no_op() {
        let mut state = GameState::new(7, Tuning::default());
        state.phase = GamePhase::Playing;
        state.spawn_enemy_bullet(Vec3::new(0.0, 0.0, 15.0));
        state.spawn_coin(Vec3::new(0.0, 0.0, 15.0));
        resolve(&mut state);
        collect_pickups(&mut state);
        assert_eq!(state.lives, 2);
        assert_eq!(state.coin_count, 0);
    }
}

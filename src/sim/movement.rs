//! Per-frame movement integration
//!
//! The player uses an acceleration/friction model with a speed clamp and a
//! hard lateral stop. Everything else moves at constant velocity and despawns
//! past a depth threshold.

use super::state::{GameState, Player, despawn_where};
use super::tick::TickInput;
use super::upgrades::Upgrades;
use crate::clamp_lateral;
use crate::consts::*;
use crate::tuning::Tuning;

/// Effective player handling after upgrades and debuffs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handling {
    pub friction: f32,
    pub acceleration: f32,
    pub max_speed: f32,
}

impl Handling {
    pub fn for_player(tuning: &Tuning, upgrades: &Upgrades, inked: bool) -> Self {
        let mut handling = Self {
            friction: tuning.player_friction * upgrades.friction_multiplier(tuning),
            acceleration: tuning.player_acceleration * upgrades.acceleration_multiplier(tuning),
            max_speed: tuning.player_max_speed,
        };
        if inked {
            handling.friction *= tuning.inked_handling;
            handling.acceleration *= tuning.inked_handling;
            handling.max_speed *= tuning.inked_handling;
        }
        handling
    }
}

/// Advance the player's lateral speed and position
pub fn integrate_player(player: &mut Player, left: bool, right: bool, handling: &Handling, dt: f32) {
    // Friction only when coasting; never overshoots zero
    if !left && !right {
        let decay = handling.friction * dt;
        if player.speed > 0.0 {
            player.speed = (player.speed - decay).max(0.0);
        } else if player.speed < 0.0 {
            player.speed = (player.speed + decay).min(0.0);
        }
    }

    // Both held cancel out
    if left {
        player.speed -= handling.acceleration * dt;
    }
    if right {
        player.speed += handling.acceleration * dt;
    }

    player.speed = player.speed.clamp(-handling.max_speed, handling.max_speed);

    // Hard stop at the walls; speed is kept
    player.pos.x = clamp_lateral(player.pos.x + player.speed * dt);
}

/// Depth the player occupies (spawn depth when there is no player yet)
fn player_z(state: &GameState) -> f32 {
    state.player.as_ref().map_or(PLAYER_START.z, |p| p.pos.z)
}

/// Player bullets travel toward the enemies
pub fn advance_bullets(state: &mut GameState, dt: f32) {
    let speed = state.upgrades.bullet_speed(&state.tuning);
    let despawn_z = state.tuning.bullet_despawn_z;
    for bullet in &mut state.bullets {
        bullet.pos.z -= speed * dt;
    }
    despawn_where(&mut state.bullets, &mut state.events, |b| b.pos.z < despawn_z);
}

/// Enemy and ink shots travel along their stored direction
pub fn advance_enemy_shots(state: &mut GameState, dt: f32) {
    let tuning = &state.tuning;
    let limit_z = player_z(state) + tuning.enemy_bullet_despawn_behind;
    let limit_x = BOUND_RIGHT + tuning.enemy_bullet_despawn_margin;
    let gone = |pos: glam::Vec3| pos.z > limit_z || pos.x.abs() > limit_x;

    let step = tuning.enemy_bullet_speed * dt;
    for shot in &mut state.enemy_bullets {
        shot.pos += shot.vel * step;
    }
    let step = tuning.inker_bullet_speed * dt;
    for shot in &mut state.inker_bullets {
        shot.pos += shot.vel * step;
    }

    despawn_where(&mut state.enemy_bullets, &mut state.events, |s| gone(s.pos));
    despawn_where(&mut state.inker_bullets, &mut state.events, |s| gone(s.pos));
}

/// Coins and power-ups drift toward the player's side
pub fn advance_pickups(state: &mut GameState, dt: f32) {
    let limit_z = player_z(state) + state.tuning.pickup_despawn_behind;
    let coin_step = state.tuning.coin_fall_speed * dt;
    let powerup_step = state.tuning.powerup_fall_speed * dt;

    for coin in &mut state.coins {
        coin.pos.z += coin_step;
    }
    for powerup in &mut state.powerups {
        powerup.pos.z += powerup_step;
    }

    despawn_where(&mut state.coins, &mut state.events, |c| c.pos.z > limit_z);
    despawn_where(&mut state.powerups, &mut state.events, |p| p.pos.z > limit_z);
}

/// Move everything that moves during play
pub fn integrate(state: &mut GameState, input: &TickInput, dt: f32) {
    let inked = state.effects.inked.active;
    let handling = Handling::for_player(&state.tuning, &state.upgrades, inked);
    if let Some(player) = state.player.as_mut() {
        integrate_player(player, input.left, input.right, &handling, dt);
    }

    advance_bullets(state, dt);
    advance_enemy_shots(state, dt);
    advance_pickups(state, dt);
}

/// Level transition: the ship flies forward. Returns true once it is past the end mark.
pub fn fly_forward(state: &mut GameState, dt: f32) -> bool {
    let speed = state.tuning.transition_speed;
    let end_z = state.tuning.transition_end_z;
    match state.player.as_mut() {
        Some(player) => {
            player.pos.z -= speed * dt;
            player.pos.z < end_z
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::EntityId;
    use glam::Vec3;
    use proptest::prelude::*;

    fn player() -> Player {
        Player::new(EntityId(1))
    }

    fn base_handling() -> Handling {
        Handling::for_player(&Tuning::default(), &Upgrades::default(), false)
    }

    #[test]
    fn test_acceleration_accumulates() {
        let mut p = player();
        let handling = base_handling();
        integrate_player(&mut p, false, true, &handling, 0.1);
        assert!((p.speed - 6.0).abs() < 1e-5);
        assert!((p.pos.x - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_opposite_inputs_cancel() {
        let mut p = player();
        p.speed = 5.0;
        integrate_player(&mut p, true, true, &base_handling(), 0.1);
        // No friction while a key is held, net acceleration is zero
        assert!((p.speed - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_friction_never_overshoots_zero() {
        let mut p = player();
        p.speed = 1.0;
        integrate_player(&mut p, false, false, &base_handling(), 1.0);
        assert_eq!(p.speed, 0.0);

        p.speed = -1.0;
        integrate_player(&mut p, false, false, &base_handling(), 1.0);
        assert_eq!(p.speed, 0.0);
    }

    #[test]
    fn test_wall_stops_position_not_speed() {
        let mut p = player();
        p.pos.x = 24.9;
        p.speed = 20.0;
        integrate_player(&mut p, false, true, &base_handling(), 0.1);
        assert_eq!(p.pos.x, BOUND_RIGHT);
        assert!(p.speed > 0.0);
    }

    #[test]
    fn test_inked_handling() {
        let tuning = Tuning::default();
        let handling = Handling::for_player(&tuning, &Upgrades::default(), true);
        assert!((handling.max_speed - 7.5).abs() < 1e-5);
        assert!((handling.acceleration - 18.0).abs() < 1e-5);
        assert!((handling.friction - 12.0).abs() < 1e-5);
    }

    #[test]
    fn test_upgrades_scale_handling() {
        let tuning = Tuning::default();
        let upgrades = Upgrades {
            side_thrusters: 1,
            main_thruster: 2,
            ..Default::default()
        };
        let handling = Handling::for_player(&tuning, &upgrades, false);
        assert!((handling.friction - 50.0).abs() < 1e-4);
        assert!((handling.acceleration - 78.0).abs() < 1e-4);
        assert_eq!(handling.max_speed, 25.0);
    }

    #[test]
    fn test_bullets_despawn_past_threshold() {
        let mut state = GameState::new(3, Tuning::default());
        state.spawn_bullet(Vec3::new(0.0, 0.0, -20.0));
        state.spawn_bullet(Vec3::new(0.0, 0.0, 10.0));
        state.drain_events();

        advance_bullets(&mut state, 0.2);
        assert_eq!(state.bullets.len(), 1);
        assert!((state.bullets[0].pos.z - 0.0).abs() < 1e-4);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_gun_barrel_speeds_up_bullets() {
        let mut state = GameState::new(3, Tuning::default());
        state.upgrades.gun_barrel = 2;
        state.spawn_bullet(Vec3::ZERO);
        advance_bullets(&mut state, 0.1);
        assert!((state.bullets[0].pos.z + 6.5).abs() < 1e-4);
    }

    #[test]
    fn test_enemy_shots_despawn_behind_player() {
        let mut state = GameState::new(3, Tuning::default());
        state.spawn_player();
        state.spawn_enemy_bullet(Vec3::new(0.0, 0.0, 24.0));
        state.spawn_inker_bullet(Vec3::new(0.0, 0.0, 0.0));
        advance_enemy_shots(&mut state, 0.1);
        assert!(state.enemy_bullets.is_empty());
        assert_eq!(state.inker_bullets.len(), 1);
        assert!((state.inker_bullets[0].pos.z - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_pickups_fall_and_despawn() {
        let mut state = GameState::new(3, Tuning::default());
        state.spawn_player();
        state.spawn_coin(Vec3::new(0.0, 0.0, 19.5));
        state.spawn_powerup(Vec3::new(0.0, 0.0, 0.0), crate::sim::PowerupKind::Pierce);
        advance_pickups(&mut state, 0.1);
        assert!(state.coins.is_empty());
        assert!((state.powerups[0].pos.z - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_fly_forward_reaches_end() {
        let mut state = GameState::new(3, Tuning::default());
        state.spawn_player();
        assert!(!fly_forward(&mut state, 0.5));
        assert!(fly_forward(&mut state, 0.7));
    }

    proptest! {
        #[test]
        fn player_stays_in_bounds_and_under_max_speed(
            start_x in -25.0f32..25.0,
            frames in prop::collection::vec((any::<bool>(), any::<bool>(), 0.0f32..0.1), 1..200),
            side in 0u32..5,
            main in 0u32..5,
            inked in any::<bool>(),
        ) {
            let tuning = Tuning::default();
            let upgrades = Upgrades { side_thrusters: side, main_thruster: main, ..Default::default() };
            let handling = Handling::for_player(&tuning, &upgrades, inked);
            let mut p = player();
            p.pos.x = start_x;
            for (left, right, dt) in frames {
                integrate_player(&mut p, left, right, &handling, dt);
                prop_assert!(p.pos.x >= BOUND_LEFT && p.pos.x <= BOUND_RIGHT);
                prop_assert!(p.speed.abs() <= handling.max_speed);
            }
        }
    }
}

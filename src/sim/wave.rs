//! Enemy formation: generation, sweep and fire
//!
//! Each level gets a freshly sized grid. The whole grid sweeps sideways in
//! lockstep, steps toward the player whenever any member leaves the bounds,
//! and speeds up every few reversals.

use glam::Vec3;
use rand::Rng;

use super::state::{EnemyKind, Formation, GameState};
use crate::consts::*;
use crate::outside_lateral;
use crate::tuning::Tuning;

/// Sample (rows, columns) for a level
///
/// Each dimension is `min + floor(r * level_factor) + floor(r * variance)`,
/// capped so the grid fits the play area and never below one.
pub fn grid_dimensions(rng: &mut impl Rng, level: u32, tuning: &Tuning) -> (u32, u32) {
    let level_factor = level as f32 * tuning.grid_growth_per_level;
    let mut sample = |cap: u32| {
        let growth = (rng.random::<f32>() * level_factor).floor() as u32;
        let variance = (rng.random::<f32>() * tuning.grid_static_variance).floor() as u32;
        (tuning.grid_min + growth + variance).min(cap).max(1)
    };
    let rows = sample(tuning.grid_max_rows);
    let cols = sample(tuning.grid_max_cols);
    (rows, cols)
}

/// Inker chance for a row, highest at the front (row 0)
pub fn inker_chance(row: u32, tuning: &Tuning) -> f32 {
    (tuning.inker_front_chance - row as f32 * tuning.inker_falloff_per_row).max(0.0)
}

/// Roll the kind shared by every member of a row
pub fn row_kind(rng: &mut impl Rng, row: u32, rows: u32, tuning: &Tuning) -> EnemyKind {
    if row + 1 == rows {
        EnemyKind::Blue
    } else if rng.random::<f32>() < inker_chance(row, tuning) {
        EnemyKind::Inker
    } else {
        EnemyKind::Red
    }
}

/// Replace the formation with a new grid for the current level
pub fn generate_formation(state: &mut GameState) {
    state.clear_formation();

    let (rows, cols) = grid_dimensions(&mut state.rng, state.level, &state.tuning);
    let start_x = -((cols - 1) as f32 * GRID_SPACING_X) / 2.0;

    let mut enemies = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        let kind = row_kind(&mut state.rng, row, rows, &state.tuning);
        for col in 0..cols {
            let local = Vec3::new(
                start_x + col as f32 * GRID_SPACING_X,
                0.0,
                GRID_FRONT_Z - row as f32 * GRID_SPACING_Z,
            );
            enemies.push(state.make_enemy(kind, local));
        }
    }

    log::info!("Level {}: {}x{} formation", state.level, rows, cols);
    state.formation = Some(Formation::new(enemies, state.tuning.enemy_base_speed));
}

/// Formation speed including the level multiplier
pub fn current_speed(formation: &Formation, speed_multiplier: f32) -> f32 {
    formation.base_speed * speed_multiplier
}

/// Sweep sideways; reverse and step forward at the walls
pub fn sweep_formation(state: &mut GameState, dt: f32) {
    let tuning = &state.tuning;
    let multiplier = state.speed_multiplier;
    let Some(formation) = state.formation.as_mut() else {
        return;
    };

    formation.offset.x += formation.direction * current_speed(formation, multiplier) * dt;

    let hit_wall = formation
        .enemies
        .iter()
        .any(|enemy| outside_lateral(formation.world_pos(enemy).x));
    if !hit_wall {
        return;
    }

    formation.direction = -formation.direction;
    formation.offset.z += tuning.enemy_step_back;
    formation.direction_changes += 1;
    if tuning.ramp_every > 0 && formation.direction_changes % tuning.ramp_every == 0 {
        formation.base_speed *= tuning.ramp_factor;
        log::debug!(
            "Formation sped up to {:.2} after {} reversals",
            formation.base_speed,
            formation.direction_changes
        );
    }
}

/// Blue and inker enemies fire straight ahead at random
pub fn enemy_fire(state: &mut GameState, dt: f32) {
    let Some(formation) = state.formation.as_ref() else {
        return;
    };

    let speed = current_speed(formation, state.speed_multiplier);
    let chance = state.tuning.shoot_probability * (speed / state.tuning.enemy_base_speed) * dt;

    let mut muzzles: Vec<(EnemyKind, Vec3)> = Vec::new();
    for enemy in formation.enemies.iter().filter(|e| e.kind.shoots()) {
        if state.rng.random::<f32>() < chance {
            muzzles.push((enemy.kind, formation.world_pos(enemy)));
        }
    }

    for (kind, pos) in muzzles {
        match kind {
            EnemyKind::Blue => state.spawn_enemy_bullet(pos),
            EnemyKind::Inker => state.spawn_inker_bullet(pos),
            EnemyKind::Red => {}
        }
    }
}

/// Fly the bonus ship across, or maybe launch one
pub fn update_bonus_ship(state: &mut GameState, dt: f32) {
    if let Some(ship) = state.bonus_ship.as_mut() {
        ship.pos.x += ship.direction * state.tuning.bonus_ship_speed * dt;
        if ship.pos.x.abs() > BONUS_SHIP_EDGE_X {
            state.despawn_bonus_ship();
        }
        return;
    }

    if state.rng.random::<f32>() < state.tuning.bonus_ship_chance * dt {
        let direction = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let pos = Vec3::new(-direction * BONUS_SHIP_EDGE_X, 0.0, BONUS_SHIP_Z);
        log::debug!("Bonus ship launched heading {}", direction);
        state.spawn_bonus_ship(pos, direction);
    }
}

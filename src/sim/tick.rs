//! Per-frame simulation tick and game state machine
//!
//! `tick` gates which subsystems run by phase. Menu navigation, shop
//! purchases and developer toggles come in as `Command`s through
//! `GameState::apply`; illegal requests leave the state untouched.

use glam::Vec3;
use rand::Rng;
use thiserror::Error;

use super::collision;
use super::events::GameEvent;
use super::movement;
use super::state::{Formation, GamePhase, GameState, PowerupKind};
use super::upgrades::{PurchaseError, UpgradeKey};
use super::wave;
use crate::consts::*;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Steer left (held)
    pub left: bool,
    /// Steer right (held)
    pub right: bool,
    /// Fire (held; rate limited by the reload timer)
    pub fire: bool,
    /// Pause toggle (edge)
    pub pause: bool,
    /// Confirm (edge): start from the menu, leave the game-over screen
    pub confirm: bool,
}

/// Discrete requests from menus, the shop and developer keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartGame,
    OpenShop,
    BackToMenu,
    Resume,
    Purchase(UpgradeKey),
    ToggleDevMode,
    ToggleCrosshair,
    DevAddCoins,
    DevSpawnPowerup,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot go from {from:?} to {to:?}")]
    Illegal { from: GamePhase, to: GamePhase },
}

/// Why a command was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Purchase(#[from] PurchaseError),
    #[error("{0}")]
    Unavailable(&'static str),
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::Playing => {
            if input.pause {
                state.enter_phase(GamePhase::Paused);
                return;
            }
            tick_playing(state, input, dt);
        }
        GamePhase::Transition => {
            if movement::fly_forward(state, dt) {
                state.finish_transition();
            }
        }
        GamePhase::Paused => {
            if input.pause {
                state.enter_phase(GamePhase::Playing);
            }
        }
        GamePhase::MainMenu => {
            if input.confirm {
                state.start_game();
            }
        }
        GamePhase::GameOver | GamePhase::Win => {
            if input.confirm {
                state.return_to_menu();
            }
        }
        GamePhase::Shop => {}
    }
}

fn tick_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    // Gun
    state.reload_timer -= dt;
    if input.fire && state.reload_timer <= 0.0 {
        if let Some(player) = &state.player {
            let muzzle = player.pos - Vec3::Z * MUZZLE_OFFSET;
            state.spawn_bullet(muzzle);
            state.reload_timer = state.upgrades.fire_cooldown(&state.tuning);
        }
    }
    state.reload_timer = state.reload_timer.max(0.0);

    movement::integrate(state, input, dt);
    collision::collect_pickups(state);
    state.effects.tick(dt, &mut state.events);

    wave::enemy_fire(state, dt);
    wave::sweep_formation(state, dt);
    wave::update_bonus_ship(state, dt);

    collision::resolve(state);

    // Lost the last life during resolution
    if state.phase != GamePhase::Playing {
        return;
    }

    if state.formation.as_ref().is_some_and(Formation::is_empty) {
        state.start_next_level();
    }
}

impl GameState {
    /// Switch phase if the transition is legal
    pub fn set_phase(&mut self, to: GamePhase) -> Result<(), TransitionError> {
        let from = self.phase;
        if !from.can_transition_to(to) {
            return Err(TransitionError::Illegal { from, to });
        }
        log::info!("Phase {:?} -> {:?}", from, to);
        self.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });
        Ok(())
    }

    /// Internal transitions that are legal by construction
    fn enter_phase(&mut self, to: GamePhase) {
        if let Err(err) = self.set_phase(to) {
            log::warn!("Ignored phase change: {}", err);
        }
    }

    /// Handle a menu, shop or developer request
    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::StartGame => {
                if self.phase != GamePhase::MainMenu {
                    return Err(TransitionError::Illegal {
                        from: self.phase,
                        to: GamePhase::Playing,
                    }
                    .into());
                }
                self.start_game();
            }
            Command::OpenShop => self.set_phase(GamePhase::Shop)?,
            Command::BackToMenu => {
                if !self.phase.can_transition_to(GamePhase::MainMenu) {
                    return Err(TransitionError::Illegal {
                        from: self.phase,
                        to: GamePhase::MainMenu,
                    }
                    .into());
                }
                self.return_to_menu();
            }
            Command::Resume => {
                if self.phase != GamePhase::Paused {
                    return Err(TransitionError::Illegal {
                        from: self.phase,
                        to: GamePhase::Playing,
                    }
                    .into());
                }
                self.enter_phase(GamePhase::Playing);
            }
            Command::Purchase(key) => {
                self.purchase_upgrade(key)?;
            }
            Command::ToggleDevMode => {
                self.dev_mode = !self.dev_mode;
                log::info!("Developer mode {}", if self.dev_mode { "on" } else { "off" });
                self.events.push(GameEvent::DevModeChanged(self.dev_mode));
            }
            Command::ToggleCrosshair => {
                if !self.upgrades.owns_crosshair() {
                    return Err(CommandError::Unavailable("crosshair not purchased"));
                }
                self.show_crosshair = !self.show_crosshair;
                self.events
                    .push(GameEvent::CrosshairVisibility(self.crosshair_visible()));
            }
            Command::DevAddCoins => {
                if !self.dev_mode {
                    return Err(CommandError::Unavailable("developer mode is off"));
                }
                self.coin_count = self.coin_count.saturating_add(self.tuning.dev_coin_grant);
                self.events.push(GameEvent::CoinsChanged(self.coin_count));
            }
            Command::DevSpawnPowerup => {
                if !self.dev_mode {
                    return Err(CommandError::Unavailable("developer mode is off"));
                }
                let Some(player) = &self.player else {
                    return Err(CommandError::Unavailable("no player"));
                };
                let pos = player.pos - Vec3::Z * self.tuning.dev_powerup_distance;
                let kind = random_powerup(self);
                self.spawn_powerup(pos, kind);
            }
        }
        Ok(())
    }

    /// Whether the HUD should draw the crosshair
    pub fn crosshair_visible(&self) -> bool {
        self.upgrades.owns_crosshair() && self.show_crosshair
    }

    /// Reset per-run state and enter play
    ///
    /// Coins and upgrades carry over from earlier runs.
    pub fn start_game(&mut self) {
        self.clear_entities();
        self.effects.clear(&mut self.events);

        self.lives = self.tuning.lives;
        self.score.reset();
        self.level = 1;
        self.speed_multiplier = 1.0;
        self.reload_timer = 0.0;

        self.spawn_player();
        wave::generate_formation(self);

        self.events.push(GameEvent::LivesChanged(self.lives));
        self.events.push(GameEvent::ScoreChanged(self.score.score()));
        self.events.push(GameEvent::CoinsChanged(self.coin_count));
        self.events
            .push(GameEvent::CrosshairVisibility(self.crosshair_visible()));
        self.events.push(GameEvent::LevelStarted { level: self.level });

        log::info!(
            "New game (coins: {}, high score: {})",
            self.coin_count,
            self.score.high_score()
        );
        self.enter_phase(GamePhase::Playing);
    }

    /// Drop the scene and go back to the main menu
    fn return_to_menu(&mut self) {
        self.clear_entities();
        self.effects.clear(&mut self.events);
        self.enter_phase(GamePhase::MainMenu);
    }

    /// Buy the next tier of an upgrade (shop only)
    pub fn purchase_upgrade(&mut self, key: UpgradeKey) -> Result<u32, PurchaseError> {
        if self.phase != GamePhase::Shop {
            return Err(PurchaseError::ShopClosed);
        }
        let level = self
            .upgrades
            .purchase(key, &mut self.coin_count, &self.tuning)
            .inspect_err(|err| log::warn!("Purchase of {:?} refused: {}", key, err))?;

        log::info!("Bought {} tier {}", key.label(), level);
        self.events.push(GameEvent::CoinsChanged(self.coin_count));
        self.events.push(GameEvent::UpgradePurchased { key, level });
        if key == UpgradeKey::Crosshair {
            self.events
                .push(GameEvent::CrosshairVisibility(self.crosshair_visible()));
        }
        Ok(level)
    }

    /// Add points and report score changes
    pub fn award(&mut self, points: u64) {
        let new_high = self.score.add(points);
        self.events.push(GameEvent::ScoreChanged(self.score.score()));
        if new_high {
            self.events
                .push(GameEvent::HighScoreChanged(self.score.high_score()));
        }
    }

    /// Take one hit; no-op outside active play
    pub fn lose_life(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.lives = self.lives.saturating_sub(1);
        log::info!("Player hit, {} lives left", self.lives);
        self.events.push(GameEvent::LivesChanged(self.lives));
        self.events.push(GameEvent::PlayerHit);
        self.clear_enemy_bullets();

        if self.lives == 0 {
            self.enter_phase(GamePhase::GameOver);
            self.despawn_player();
        }
    }

    /// Formation cleared: bump difficulty and fly to the next level
    pub fn start_next_level(&mut self) {
        self.level += 1;
        self.speed_multiplier += self.tuning.level_speed_increment;
        self.clear_projectiles();
        self.despawn_bonus_ship();
        self.clear_formation();
        log::info!(
            "Level cleared, next level {} at speed x{:.2}",
            self.level,
            self.speed_multiplier
        );
        self.enter_phase(GamePhase::Transition);
    }

    /// End of the fly-forward: reset the ship and build the next grid
    fn finish_transition(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.pos = PLAYER_START;
            player.speed = 0.0;
        }
        self.reload_timer = 0.0;
        wave::generate_formation(self);
        self.events.push(GameEvent::LevelStarted { level: self.level });
        self.enter_phase(GamePhase::Playing);
    }
}

fn random_powerup(state: &mut GameState) -> PowerupKind {
    if state.rng.random_bool(0.5) {
        PowerupKind::Explosive
    } else {
        PowerupKind::Pierce
    }
}

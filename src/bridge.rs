//! Bridge between simulation entities and the host's visuals
//!
//! The simulation only knows `EntityId`s. The bridge owns the
//! id -> `VisualHandle` table, turns `GameEvent`s into `Frontend` calls and
//! pushes live positions once per frame.

use std::collections::HashMap;

use glam::Vec3;

use crate::sim::{EffectKind, EntityId, GameEvent, GamePhase, GameState, VisualKind};

/// Opaque identity of a drawable owned by the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u64);

/// Everything the host provides: visuals plus one-way HUD notifications
///
/// Only spawning and removal are required; the rest default to no-ops.
pub trait Frontend {
    fn spawn_visual(&mut self, kind: VisualKind, pos: Vec3) -> VisualHandle;
    fn remove_visual(&mut self, handle: VisualHandle);

    fn move_visual(&mut self, _handle: VisualHandle, _pos: Vec3) {}
    fn coins_changed(&mut self, _coins: u32) {}
    fn score_changed(&mut self, _score: u64) {}
    fn high_score_changed(&mut self, _high_score: u64) {}
    fn lives_changed(&mut self, _lives: u8) {}
    fn effect_activated(&mut self, _kind: EffectKind, _remaining_fraction: f32) {}
    fn effect_progress(&mut self, _kind: EffectKind, _remaining_fraction: f32) {}
    fn effect_expired(&mut self, _kind: EffectKind) {}
    fn phase_changed(&mut self, _from: GamePhase, _to: GamePhase) {}
    fn level_started(&mut self, _level: u32) {}
    fn crosshair_visible(&mut self, _visible: bool) {}
}

/// Live visual handles keyed by entity
#[derive(Debug, Default)]
pub struct Bridge {
    handles: HashMap<EntityId, VisualHandle>,
}

impl Bridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward a batch of simulation events to the frontend
    pub fn dispatch<F: Frontend + ?Sized>(&mut self, events: &[GameEvent], frontend: &mut F) {
        for event in events {
            match *event {
                GameEvent::Spawned { id, kind, pos } => {
                    let handle = frontend.spawn_visual(kind, pos);
                    if let Some(stale) = self.handles.insert(id, handle) {
                        log::warn!("Entity {:?} spawned twice, dropping old visual", id);
                        frontend.remove_visual(stale);
                    }
                }
                GameEvent::Despawned { id } => match self.handles.remove(&id) {
                    Some(handle) => frontend.remove_visual(handle),
                    None => log::debug!("Despawn for unknown entity {:?}", id),
                },
                GameEvent::PhaseChanged { from, to } => frontend.phase_changed(from, to),
                GameEvent::LevelStarted { level } => frontend.level_started(level),
                GameEvent::CoinsChanged(coins) => frontend.coins_changed(coins),
                GameEvent::ScoreChanged(score) => frontend.score_changed(score),
                GameEvent::HighScoreChanged(high) => frontend.high_score_changed(high),
                GameEvent::LivesChanged(lives) => frontend.lives_changed(lives),
                GameEvent::EffectActivated {
                    kind,
                    remaining_fraction,
                } => frontend.effect_activated(kind, remaining_fraction),
                GameEvent::EffectProgress {
                    kind,
                    remaining_fraction,
                } => frontend.effect_progress(kind, remaining_fraction),
                GameEvent::EffectExpired { kind } => frontend.effect_expired(kind),
                GameEvent::CrosshairVisibility(visible) => frontend.crosshair_visible(visible),
                GameEvent::EnemyDestroyed { .. }
                | GameEvent::BonusShipDestroyed { .. }
                | GameEvent::PlayerHit
                | GameEvent::DevModeChanged(_)
                | GameEvent::UpgradePurchased { .. } => {}
            }
        }
    }

    /// Push current world positions of every live entity
    pub fn sync_positions<F: Frontend + ?Sized>(&self, state: &GameState, frontend: &mut F) {
        state.for_each_entity(|id, pos| {
            if let Some(&handle) = self.handles.get(&id) {
                frontend.move_visual(handle, pos);
            }
        });
    }

    pub fn handle(&self, id: EntityId) -> Option<VisualHandle> {
        self.handles.get(&id).copied()
    }

    /// Number of visuals currently alive
    pub fn live_count(&self) -> usize {
        self.handles.len()
    }
}

//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Time (monotonic frame clock with a clamped delta)
//! - Input events (key state to per-tick input and commands)

use std::collections::HashSet;
use std::time::Instant;

use crate::sim::{Command, TickInput};

/// Monotonic frame clock
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            max_dt,
        }
    }

    /// Seconds since the clock was created
    pub fn now_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Seconds since the previous call, clamped to `max_dt`
    pub fn delta_seconds(&mut self) -> f32 {
        self.delta_at(Instant::now())
    }

    /// Same as `delta_seconds` with an explicit "now"
    pub fn delta_at(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        clamp_dt(raw, self.max_dt)
    }
}

/// Long frames (tab switches, debugger pauses) must not teleport entities
pub fn clamp_dt(raw: f32, max_dt: f32) -> f32 {
    raw.clamp(0.0, max_dt.max(0.0))
}

/// Keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    A,
    D,
    Space,
    Enter,
    Escape,
    /// Developer mode toggle
    Backquote,
    /// Developer: add coins
    M,
    /// Developer: spawn a power-up
    P,
    /// Crosshair toggle
    C,
}

/// Held keys plus the keys pressed since the last frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        // Auto-repeat does not count as a new press
        if self.held.insert(key) {
            self.pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Snapshot for the simulation tick
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            left: self.is_held(Key::Left) || self.is_held(Key::A),
            right: self.is_held(Key::Right) || self.is_held(Key::D),
            fire: self.is_held(Key::Space),
            pause: self.was_pressed(Key::Escape),
            confirm: self.was_pressed(Key::Enter) || self.was_pressed(Key::Space),
        }
    }

    /// Commands triggered by keys pressed this frame
    pub fn commands(&self) -> Vec<Command> {
        [
            (Key::Backquote, Command::ToggleDevMode),
            (Key::M, Command::DevAddCoins),
            (Key::P, Command::DevSpawnPowerup),
            (Key::C, Command::ToggleCrosshair),
        ]
        .into_iter()
        .filter(|(key, _)| self.was_pressed(*key))
        .map(|(_, command)| command)
        .collect()
    }

    /// Forget this frame's presses
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}

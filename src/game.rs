//! Game controller
//!
//! Owns the simulation, the visual bridge, the high score store and the
//! frame clock. Once per frame it feeds input through `tick`, then drains the
//! resulting events into the frontend and the store.

use crate::bridge::{Bridge, Frontend};
use crate::highscores::HighScoreStore;
use crate::platform::{FrameClock, InputState};
use crate::settings::Settings;
use crate::sim::{Command, CommandError, GameEvent, GameState, ScoreLedger, TickInput, tick};
use crate::tuning::Tuning;

pub struct Game<F: Frontend, S: HighScoreStore> {
    state: GameState,
    bridge: Bridge,
    frontend: F,
    store: S,
    clock: FrameClock,
    settings: Settings,
}

impl<F: Frontend, S: HighScoreStore> Game<F, S> {
    /// Build a session at the main menu, loading the stored high score
    pub fn new(seed: u64, tuning: Tuning, settings: Settings, frontend: F, mut store: S) -> Self {
        let high_score = store.load_high_score().unwrap_or_else(|err| {
            log::warn!("Could not load high score ({}), starting at 0", err);
            0
        });

        let mut state = GameState::new(seed, tuning);
        state.score = ScoreLedger::with_high_score(high_score);
        state.dev_mode = settings.dev_mode;
        state.show_crosshair = settings.show_crosshair;

        Self {
            state,
            bridge: Bridge::new(),
            frontend,
            store,
            clock: FrameClock::new(settings.max_frame_dt),
            settings,
        }
    }

    /// One display frame driven by the wall clock
    pub fn frame(&mut self, input: &InputState) {
        let dt = self.clock.delta_seconds();
        for command in input.commands() {
            if let Err(err) = self.command(command) {
                log::warn!("{:?} rejected: {}", command, err);
            }
        }
        self.step(&input.tick_input(), dt);
    }

    /// Advance by an explicit delta (clamped like wall-clock frames)
    pub fn step(&mut self, input: &TickInput, dt: f32) {
        let dt = crate::platform::clamp_dt(dt, self.settings.max_frame_dt);
        tick(&mut self.state, input, dt);
        self.flush();
    }

    /// Menu, shop or developer request
    pub fn command(&mut self, command: Command) -> Result<(), CommandError> {
        let result = self.state.apply(command);
        self.settings.dev_mode = self.state.dev_mode;
        self.settings.show_crosshair = self.state.show_crosshair;
        self.flush();
        result
    }

    /// Hand pending events to the store and the frontend
    fn flush(&mut self) {
        let events = self.state.drain_events();

        let newest_high = events.iter().rev().find_map(|event| match event {
            GameEvent::HighScoreChanged(high) => Some(*high),
            _ => None,
        });
        if let Some(high) = newest_high {
            if let Err(err) = self.store.persist_high_score(high) {
                log::warn!("Could not save high score {}: {}", high, err);
            }
        }

        self.bridge.dispatch(&events, &mut self.frontend);
        self.bridge.sync_positions(&self.state, &mut self.frontend);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

//! Ink Raiders entry point
//!
//! Headless native driver: runs the simulation with an autopilot at a fixed
//! 60 Hz step and logs what the frontend would have drawn.
//!
//! Usage: `ink-raiders [--seed N] [--frames N] [--tuning FILE] [--data-dir DIR]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use glam::Vec3;
    use ink_raiders::sim::{
        Command, EffectKind, GamePhase, GameState, TickInput, UpgradeKey, VisualKind,
    };
    use ink_raiders::{Frontend, Game, JsonFileStore, Settings, Tuning, VisualHandle};

    const SIM_DT: f32 = 1.0 / 60.0;

    /// Frontend that only logs
    #[derive(Default)]
    pub struct LogFrontend {
        next: u64,
        live: usize,
        pub peak_visuals: usize,
    }

    impl Frontend for LogFrontend {
        fn spawn_visual(&mut self, kind: VisualKind, pos: Vec3) -> VisualHandle {
            self.next += 1;
            self.live += 1;
            self.peak_visuals = self.peak_visuals.max(self.live);
            log::trace!("spawn {:?} at {}", kind, pos);
            VisualHandle(self.next)
        }

        fn remove_visual(&mut self, handle: VisualHandle) {
            self.live = self.live.saturating_sub(1);
            log::trace!("remove {:?}", handle);
        }

        fn coins_changed(&mut self, coins: u32) {
            log::debug!("Coins: {}", coins);
        }

        fn score_changed(&mut self, score: u64) {
            log::debug!("Score: {}", score);
        }

        fn lives_changed(&mut self, lives: u8) {
            log::info!("Lives: {}", lives);
        }

        fn effect_activated(&mut self, kind: EffectKind, _remaining_fraction: f32) {
            log::info!("{:?} active", kind);
        }

        fn effect_expired(&mut self, kind: EffectKind) {
            log::info!("{:?} expired", kind);
        }

        fn level_started(&mut self, level: u32) {
            log::info!("Level {}", level);
        }
    }

    #[derive(Parser, Debug)]
    #[command(name = "ink-raiders")]
    #[command(about = "Run Ink Raiders headless with an autopilot")]
    struct Options {
        /// RNG seed for the run
        #[arg(long, default_value_t = 0x1337)]
        seed: u64,

        /// Stop after this many 60 Hz frames
        #[arg(long, default_value_t = 60 * 120)]
        frames: u32,

        /// JSON file overriding balance values
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Directory holding settings.json and highscore.json
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
    }

    fn load_tuning(path: Option<&PathBuf>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(err) => {
                log::warn!("Tuning {} unusable ({}), using defaults", path.display(), err);
                Tuning::default()
            }
        }
    }

    /// Chase the closest enemy column and keep the trigger held
    fn autopilot(state: &GameState) -> TickInput {
        let mut input = TickInput {
            fire: true,
            ..Default::default()
        };
        let (Some(player), Some(formation)) = (&state.player, &state.formation) else {
            return input;
        };
        let target = formation
            .enemies
            .iter()
            .map(|enemy| formation.world_pos(enemy))
            .max_by(|a, b| a.z.total_cmp(&b.z).then(b.x.abs().total_cmp(&a.x.abs())));
        if let Some(target) = target {
            let dx = target.x - player.pos.x;
            input.left = dx < -0.5;
            input.right = dx > 0.5;
        }
        input
    }

    pub fn run() {
        let options = Options::parse();
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        log::info!("Ink Raiders (headless) starting, seed {:#x}", options.seed);

        let settings = Settings::load_or_default(&options.data_dir.join("settings.json"));
        let store = JsonFileStore::new(options.data_dir.join("highscore.json"));
        log::debug!("High score file: {}", store.path().display());
        let tuning = load_tuning(options.tuning.as_ref());
        let mut game = Game::new(options.seed, tuning, settings, LogFrontend::default(), store);

        if let Err(err) = game.command(Command::StartGame) {
            log::error!("Could not start: {}", err);
            return;
        }

        let mut frames = 0;
        while frames < options.frames && game.state().phase != GamePhase::GameOver {
            let input = autopilot(game.state());
            game.step(&input, SIM_DT);
            frames += 1;
        }

        let state = game.state();
        println!(
            "{:?} after {:.1}s: level {}, score {}, high score {}, coins {}, peak visuals {}",
            state.phase,
            frames as f32 * SIM_DT,
            state.level,
            state.score.score(),
            state.score.high_score(),
            state.coin_count,
            game.frontend().peak_visuals,
        );

        for key in UpgradeKey::ALL {
            log::info!("{}: tier {}", key.label(), state.upgrades.level(key));
        }

        if let Err(err) = game.settings().save(&options.data_dir.join("settings.json")) {
            log::warn!("Could not save settings: {}", err);
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host embeds the library directly
}

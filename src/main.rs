//! Drag Bounce entry point
//!
//! On the web the page drives the game through `drag_bounce::web`. Natively
//! this runs headless rounds with scripted throws on a simulated clock and
//! prints the results, which is handy for tuning physics settings.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use drag_bounce::highscores::format_date;
    use drag_bounce::persistence::{JsonFileStorage, MemoryStorage, ScoreStorage, StorageError};
    use drag_bounce::platform::{Clock, ManualClock, SystemClock};
    use drag_bounce::sim::{InputEvent, RoundPhase};
    use drag_bounce::{Session, Settings, StepMode};

    /// Simulated frame interval (ms)
    const FRAME_MS: f64 = 16.0;

    /// Play scripted Drag Bounce rounds without a display.
    #[derive(Debug, Parser)]
    #[command(name = "drag-bounce", version, about)]
    pub struct Args {
        /// Settings JSON file (defaults are used for anything missing)
        #[arg(short, long, value_name = "FILE")]
        pub settings: Option<PathBuf>,

        /// Leaderboard JSON file. Scores are kept in memory if not set.
        #[arg(long, value_name = "FILE")]
        pub scores: Option<PathBuf>,

        /// Number of rounds to play
        #[arg(short, long, default_value = "1")]
        pub rounds: u32,

        /// Seed for the scripted throws
        #[arg(long, default_value = "42")]
        pub seed: u64,

        /// Physics stepping: variable, fixed, or fixed:<hz>
        #[arg(long, value_name = "MODE", value_parser = parse_step_mode)]
        pub step_mode: Option<StepMode>,

        /// Override the round length in seconds
        #[arg(long, value_name = "SECS")]
        pub round_seconds: Option<u32>,

        /// Write the effective settings back to the settings file
        #[arg(long, requires = "settings")]
        pub save_settings: bool,

        /// Print the final frame snapshot of each round as JSON
        #[arg(long)]
        pub json: bool,
    }

    fn parse_step_mode(s: &str) -> Result<StepMode, String> {
        StepMode::from_str(s).ok_or_else(|| format!("unknown step mode '{s}'"))
    }

    pub fn main() -> ExitCode {
        env_logger::init();
        let args = Args::parse();
        match run(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{e}");
                ExitCode::FAILURE
            }
        }
    }

    fn run(args: &Args) -> Result<(), StorageError> {
        let mut settings = args
            .settings
            .as_deref()
            .map(Settings::load_from)
            .unwrap_or_default();
        if let Some(mode) = args.step_mode {
            settings.step_mode = mode;
        }
        if let Some(secs) = args.round_seconds {
            settings.round_seconds = secs;
        }
        let settings = settings.validated();

        if args.save_settings {
            if let Some(path) = &args.settings {
                settings.save_to(path)?;
            }
        }

        log::info!(
            "Drag Bounce (headless) starting: {} round(s), {} stepping",
            args.rounds,
            settings.step_mode.as_str()
        );

        match &args.scores {
            Some(path) => play(args, settings, JsonFileStorage::new(path.clone())),
            None => play(args, settings, MemoryStorage::new()),
        }
    }

    fn play<S: ScoreStorage>(args: &Args, settings: Settings, storage: S) -> Result<(), StorageError> {
        let clock = ManualClock::with_epoch(SystemClock::new().unix_ms());
        let mut session = Session::new(settings, clock.clone(), storage);
        let mut rng = Pcg32::seed_from_u64(args.seed);

        for round in 1..=args.rounds {
            let mut throws = 0;
            while session.state().phase() != RoundPhase::Ended {
                throw(&mut session, &clock, &mut rng);
                throws += 1;
            }

            let snapshot = session.snapshot();
            if let Some(result) = snapshot.last_result {
                let marker = if result.is_new_high_score() { "  NEW HIGH SCORE!" } else { "" };
                println!(
                    "Round {round}: {} points, max combo {} ({throws} throws){marker}",
                    result.score, result.max_combo
                );
            }
            if args.json {
                match serde_json::to_string_pretty(&snapshot) {
                    Ok(json) => println!("{json}"),
                    Err(e) => log::warn!("Cannot serialize snapshot: {e}"),
                }
            }

            session.input(InputEvent::PlayAgain);
            clock.advance(1000.0);
        }

        print_leaderboard(&session, &clock);
        session.teardown();
        Ok(())
    }

    /// One grab, shake, release and a short wait while it bounces
    fn throw<S: ScoreStorage>(session: &mut Session<ManualClock, S>, clock: &ManualClock, rng: &mut Pcg32) {
        session.input(InputEvent::DragStart);

        let moves = rng.random_range(8..40);
        let heading = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..0.2));
        for _ in 0..moves {
            clock.advance(FRAME_MS);
            let jitter = Vec2::new(rng.random_range(-4.0..4.0), rng.random_range(-4.0..4.0));
            let delta = heading * rng.random_range(4.0f32..20.0) + jitter;
            let velocity = delta / (FRAME_MS as f32 / 1000.0);
            session.input(InputEvent::DragMove {
                delta,
                velocity: Some(velocity),
            });
            session.frame();
            if session.state().phase() == RoundPhase::Ended {
                return;
            }
        }

        session.input(InputEvent::DragEnd);
        let wait_frames = rng.random_range(20..80);
        for _ in 0..wait_frames {
            clock.advance(FRAME_MS);
            session.frame();
            if session.state().phase() == RoundPhase::Ended {
                return;
            }
        }
    }

    fn print_leaderboard<S: ScoreStorage>(session: &Session<ManualClock, S>, clock: &ManualClock) {
        let board = session.leaderboard();
        if board.is_empty() {
            println!("No high scores yet");
            return;
        }
        println!("High scores:");
        let now = clock.unix_ms();
        for (i, entry) in board.entries.iter().enumerate() {
            println!(
                "  {}. {:>6}  combo {:>3}  {}",
                i + 1,
                entry.score,
                entry.max_combo,
                format_date(entry.timestamp, now)
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    headless::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is drag_bounce::web::start, this is just to satisfy the compiler
}

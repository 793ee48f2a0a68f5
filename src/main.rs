//! Square Sync headless runner
//!
//! Plays a synthetic song through a full session on a fixed timestep and
//! logs the result. Handy for checking timing and scoring without a window.
//!
//! Usage: square-sync [seed] [--theatre] [--config <path>] [--miss-every <n>]
//!                    [--write-config <path>]

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use square_sync::SessionConfig;
use square_sync::audio::NullAudio;
use square_sync::consts::SIM_DT;
use square_sync::path::{BeatPathGenerator, no_progress};
use square_sync::platform::{Key, ManualTime};
use square_sync::sim::{Session, SessionEvent};

/// Give up after this much simulated time
const MAX_RUN_MS: f64 = 10.0 * 60.0 * 1000.0;

#[derive(Parser, Debug)]
#[command(name = "square-sync")]
#[command(about = "Play a synthetic song through a headless session")]
struct Args {
    /// Path seed (overrides the config file)
    seed: Option<u64>,

    /// Watch the path play without judging input
    #[arg(long)]
    theatre: bool,

    /// Session config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Autoplayer skips every n-th bounce
    #[arg(long)]
    miss_every: Option<NonZeroUsize>,

    /// Write the effective config here before playing
    #[arg(long)]
    write_config: Option<PathBuf>,
}

/// Four-on-the-floor at 128 BPM with a few off-beat fills
fn synthetic_notes(bars: usize) -> Vec<f64> {
    let beat = 60.0 / 128.0;
    let mut notes = Vec::new();
    for bar in 0..bars {
        for step in 0..4 {
            notes.push((bar * 4 + step) as f64 * beat);
        }
        if bar % 4 == 3 {
            notes.push((bar * 4 + 3) as f64 * beat + beat / 2.0);
        }
    }
    notes
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SessionConfig::load(path),
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.theatre_mode |= args.theatre;
    let seed = config.seed;

    if let Some(path) = &args.write_config {
        match config.save(path) {
            Ok(()) => log::info!("Wrote session config to {}", path.display()),
            Err(e) => log::error!("Could not write {}: {}", path.display(), e),
        }
    }

    let notes = synthetic_notes(32);
    let clock = ManualTime::new(0.0);
    let mut generator = BeatPathGenerator::new(config.path);

    let mut session = match Session::start(
        config,
        &notes,
        &mut generator,
        NullAudio::new(),
        clock.clone(),
        &mut no_progress,
    ) {
        Ok(session) => session,
        Err(e) => {
            match e.user_message() {
                Some(msg) => log::error!("Could not load map: {}", msg),
                None => log::info!("Loading cancelled"),
            }
            std::process::exit(1);
        }
    };

    let step_ms = SIM_DT * 1000.0;
    let mut raw_ms = 0.0;
    while !session.phase().is_over() && raw_ms < MAX_RUN_MS {
        raw_ms += step_ms;
        clock.set(raw_ms);
        session.advance(raw_ms);

        // Autoplayer: strike each bounce on the frame it comes into reach,
        // deliberately dropping every n-th one
        if let Some(head) = session.timeline().head().copied() {
            let index = session.timeline().past_len() + 1;
            let skip = args.miss_every.is_some_and(|n| index % n.get() == 0);
            if !skip && head.time - session.playback_time() <= SIM_DT {
                session.on_input(Key::Space, raw_ms);
            }
        }

        for event in session.drain_events() {
            match event {
                SessionEvent::Resolved(judgment) => log::debug!(
                    "bounce {} {:?} at {:.3}s",
                    judgment.index,
                    judgment.resolution,
                    judgment.time
                ),
                SessionEvent::MusicStarted { lag_ms } => {
                    log::info!("music started (lag {:.1}ms)", lag_ms)
                }
                other => log::info!("{:?}", other),
            }
        }
    }

    match session.report() {
        Some(report) => log::info!(
            "seed {}: {:?} after {:.1}s | hits {} misses {} | accuracy {}% | total accuracy {}%",
            seed,
            session.phase(),
            raw_ms / 1000.0,
            report.hits,
            report.misses,
            report.accuracy,
            report.total_accuracy
        ),
        None => log::info!(
            "seed {}: {:?} after {:.1}s (theatre)",
            seed,
            session.phase(),
            raw_ms / 1000.0
        ),
    }
}

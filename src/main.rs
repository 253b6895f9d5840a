//! Lane Runner entry point
//!
//! Headless driver: loads (or creates) the settings file, runs a fixed-step
//! simulation with the demo AI at the controls and reports how the run went.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use lane_runner::consts::SIM_DT;
use lane_runner::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use lane_runner::{LevelSettings, Tuning};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "lane-runner")]
#[command(about = "Run a deterministic lane runner simulation")]
struct Args {
    /// Settings file (created with defaults if missing)
    #[arg(short, long, value_name = "PATH", default_value = "LevelGenerationSettings.json")]
    settings: PathBuf,

    /// Override the seed (non-numeric input picks a random seed)
    #[arg(long)]
    seed: Option<String>,

    /// Override the starting lane count
    #[arg(long)]
    lanes: Option<i32>,

    /// Simulated seconds to run for
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    export: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

/// What happened during the run
#[derive(Debug, Default, Serialize)]
struct Summary {
    seed: i64,
    phase: String,
    score: u32,
    lives: u8,
    elapsed: f32,
    distance: f32,
    lanes: usize,
    rows_generated: usize,
    powerups_spawned: usize,
    lanes_added: usize,
    lanes_cleared: usize,
    hits: usize,
    entities_allocated: usize,
}

impl Summary {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::RowGenerated { .. } => self.rows_generated += 1,
            GameEvent::PowerUpSpawned { .. } => self.powerups_spawned += 1,
            GameEvent::LaneAdded { .. } => self.lanes_added += 1,
            GameEvent::LaneCleared { .. } => self.lanes_cleared += 1,
            GameEvent::PlayerHit { .. } => self.hits += 1,
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = LevelSettings::load(&args.settings);
    if let Some(seed) = &args.seed {
        settings.set_seed_from_str(seed);
    }
    if let Some(lanes) = args.lanes {
        settings.start_number_of_lanes = lanes;
    }
    settings.validate();

    if args.export {
        settings
            .export(&args.settings)
            .with_context(|| format!("exporting settings to {}", args.settings.display()))?;
    }

    let mut state = GameState::new(&settings, &Tuning::default());
    state.start();

    let input = TickInput {
        idle_mode: true,
        ..TickInput::headless()
    };
    let ticks = (args.seconds.max(0.0) / SIM_DT).round() as u64;
    let mut summary = Summary {
        seed: settings.seed,
        ..Default::default()
    };

    for _ in 0..ticks {
        tick(&mut state, &input, SIM_DT);
        for event in state.drain_events() {
            summary.record(&event);
        }
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    summary.phase = format!("{:?}", state.phase);
    summary.score = state.score;
    summary.lives = state.lives;
    summary.elapsed = state.elapsed;
    summary.distance = state.player.pos.z;
    summary.lanes = state.lanes.count();
    summary.entities_allocated = state.pool.len();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Seed:        {}", summary.seed);
        println!("Result:      {}", summary.phase);
        println!("Score:       {} rows", summary.score);
        println!("Lives:       {}", summary.lives);
        println!("Time:        {:.1}s", summary.elapsed);
        println!("Distance:    {:.1}", summary.distance);
        println!("Lanes:       {} (+{})", summary.lanes, summary.lanes_added);
        println!("Rows:        {}", summary.rows_generated);
        println!("Power-ups:   {}", summary.powerups_spawned);
        println!("Hits:        {}", summary.hits);
        println!("Pool size:   {}", summary.entities_allocated);
    }

    Ok(())
}

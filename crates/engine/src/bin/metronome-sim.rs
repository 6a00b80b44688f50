//! metronome-sim — drives one recurring schedule on the discrete-event timer.
//!
//! Loads a `ScheduleConfig`, arms a logging task, processes a number of timer
//! steps, and prints the resulting metrics snapshot as JSON.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use metronome_engine::config::load_dotenv;
use metronome_engine::{EventTimer, IntervalSource, Schedule, ScheduleConfig, StepTimer, Task, TaskError};

/// Discrete-event driver for a recurring schedule.
#[derive(Parser, Debug)]
#[command(name = "metronome-sim", version, about)]
struct Cli {
    /// Path to a schedule TOML config file.
    #[arg(long, env = "METRONOME_CONFIG")]
    config: Option<String>,

    /// Interval override in milliseconds.
    #[arg(long, env = "METRONOME_INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// Number of timer steps to process.
    #[arg(long, env = "METRONOME_STEPS", default_value_t = 10)]
    steps: u32,
}

/// Task that logs each occurrence.
struct TickTask {
    ticks: AtomicU64,
}

impl Task for TickTask {
    fn name(&self) -> &str {
        "tick"
    }

    fn execute(&self) -> Result<(), TaskError> {
        let n = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        info!(tick = n, "tick");
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ScheduleConfig::from_toml_file(path)?,
        None => ScheduleConfig::default(),
    };
    if let Some(interval_ms) = cli.interval_ms {
        config.interval_ms = interval_ms;
    }

    let timer = Arc::new(StepTimer::new());
    let interval = Arc::new(config.build());
    let schedule = Schedule::new(
        "sim",
        Arc::new(TickTask {
            ticks: AtomicU64::new(0),
        }) as Arc<dyn Task>,
        Arc::clone(&interval) as Arc<dyn IntervalSource>,
        Arc::clone(&timer) as Arc<dyn EventTimer>,
    );
    schedule.schedule();

    for _ in 0..cli.steps {
        if timer.step().is_none() {
            break;
        }
    }
    info!(steps = cli.steps, now = %timer.now(), "simulation complete");

    println!("{}", serde_json::to_string_pretty(&schedule.metrics())?);
    Ok(())
}

//! Heat pump controller simulator
//!
//! Runs the climate controller against a modelled room on a virtual clock
//! and prints a per-minute trace. Useful for tuning the PID and the
//! workflow margins before flashing a board.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use heatpump_core::climate::Mode;
use heatpump_core::traits::SetpointStorage;
use log::info;

mod config;
mod room;
mod sim;
mod storage;

use crate::config::SimConfig;
use crate::sim::{Simulation, Summary};
use crate::storage::{FileStorage, MemoryStorage};

/// Climate mode requested by the scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Off,
    Heat,
    Cool,
    Dry,
    HeatCool,
    FanOnly,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Off => Mode::Off,
            ModeArg::Heat => Mode::Heat,
            ModeArg::Cool => Mode::Cool,
            ModeArg::Dry => Mode::Dry,
            ModeArg::HeatCool => Mode::HeatCool,
            ModeArg::FanOnly => Mode::FanOnly,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "heatpump-sim", version, about)]
struct Args {
    /// TOML configuration, the embedded one when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulated minutes, overrides the scenario
    #[arg(short, long)]
    minutes: Option<u32>,

    /// Climate mode, overrides the scenario
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Target temperature in °C, overrides the scenario
    #[arg(short, long)]
    target: Option<f32>,

    /// Persist remembered setpoints in this file
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Log every tick
    #[arg(short, long)]
    verbose: bool,
}

fn run<S: SetpointStorage>(config: SimConfig, storage: S) -> Result<Summary> {
    let mut sim = Simulation::new(config, storage)?;
    let summary = sim.run(config.scenario.minutes);
    println!("{}", sim.controller().dump_config());
    Ok(summary)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = SimConfig::load(args.config.as_deref())?;
    if let Some(minutes) = args.minutes {
        config.scenario.minutes = minutes;
    }
    if let Some(mode) = args.mode {
        config.scenario.mode = mode.into();
    }
    if let Some(target) = args.target {
        config.scenario.target_c = target;
    }

    info!(
        "Simulating {:?} at {} C for {} min",
        config.scenario.mode, config.scenario.target_c, config.scenario.minutes
    );

    let summary = match &args.state_file {
        Some(path) => run(config, FileStorage::new(path))
            .with_context(|| format!("simulation with state file {}", path.display()))?,
        None => run(config, MemoryStorage::default())?,
    };

    println!(
        "ticks={} on={} off={} throttled={} failed={} room min={:.2} max={:.2} final={:.2}",
        summary.ticks,
        summary.power_on_actuations,
        summary.power_off_actuations,
        summary.throttled_ticks,
        summary.failed_actuations,
        summary.min_room_c,
        summary.max_room_c,
        summary.final_room_c
    );
    Ok(())
}

use std::path::PathBuf;

use gemfall_engine::{HookError, JewelConfig, PuyoConfig, SessionHooks};
use ratatui_runtime::Runtime;

use crate::{command::play::app::PlayApp, util};

mod app;
mod screens;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct JewelArg {
    /// Round length in seconds (ignored with --endless)
    #[clap(long)]
    time_limit: Option<f32>,
    /// Play without a countdown
    #[clap(long)]
    endless: bool,
    /// Seed for a reproducible board sequence
    #[clap(long)]
    seed: Option<u64>,
    /// JSON file overriding the session configuration
    #[clap(long)]
    config: Option<PathBuf>,
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PuyoArg {
    /// Seed for a reproducible pair sequence
    #[clap(long)]
    seed: Option<u64>,
    /// JSON file overriding the session configuration
    #[clap(long)]
    config: Option<PathBuf>,
}

/// Hooks wired to the local shell. There is no score server here, so both
/// hooks only log; saving always reports success.
#[derive(Debug, Default)]
struct LoggingHooks;

impl SessionHooks for LoggingHooks {
    fn on_game_start(&mut self) -> Result<(), HookError> {
        log::info!("play session starting");
        Ok(())
    }

    fn on_score_save(&mut self, score: usize) -> Result<bool, HookError> {
        log::info!("final score: {score}");
        Ok(true)
    }
}

pub(crate) fn run_jewel(arg: &JewelArg) -> anyhow::Result<()> {
    let mut config = match &arg.config {
        Some(path) => util::read_config_file::<JewelConfig>(path)?,
        None => JewelConfig::default(),
    };
    if arg.endless {
        config.time_limit = None;
    } else if let Some(time_limit) = arg.time_limit {
        config.time_limit = Some(time_limit);
    }
    if arg.seed.is_some() {
        config.seed = arg.seed;
    }

    let mut app = PlayApp::jewel(config, Box::new(LoggingHooks));
    Runtime::new().run(&mut app)?;
    Ok(())
}

pub(crate) fn run_puyo(arg: &PuyoArg) -> anyhow::Result<()> {
    let mut config = match &arg.config {
        Some(path) => util::read_config_file::<PuyoConfig>(path)?,
        None => PuyoConfig::default(),
    };
    if arg.seed.is_some() {
        config.seed = arg.seed;
    }

    let mut app = PlayApp::puyo(config, Box::new(LoggingHooks));
    Runtime::new().run(&mut app)?;
    Ok(())
}

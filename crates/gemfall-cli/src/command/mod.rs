use clap::{Parser, Subcommand};

use crate::command::play::JewelArg;

mod play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Which game to play
    #[command(subcommand)]
    game: Option<Game>,
}

#[derive(Debug, Clone, Subcommand)]
enum Game {
    /// Swap adjacent gems to line up three or more
    Jewel(#[clap(flatten)] play::JewelArg),
    /// Steer falling pairs and pop groups of four
    Puyo(#[clap(flatten)] play::PuyoArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.game.unwrap_or(Game::Jewel(JewelArg::default())) {
        Game::Jewel(arg) => play::run_jewel(&arg)?,
        Game::Puyo(arg) => play::run_puyo(&arg)?,
    }
    Ok(())
}

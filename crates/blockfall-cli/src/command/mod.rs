use std::path::PathBuf;

use anyhow::Context as _;
use blockfall_engine::{GameConfig, PieceSeed};
use clap::{ArgAction, Parser, Subcommand};

use self::{play::PlayArg, simulate::SimulateArg};
use crate::util;

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Drive a session with random commands and print a JSON summary
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Game settings shared by every mode.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GameArg {
    /// Seed for the piece sequence (32 hex digits); overrides the config file
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Game configuration file (JSON)
    #[clap(long)]
    config: Option<PathBuf>,
}

impl GameArg {
    pub(crate) fn load_config(&self) -> anyhow::Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file::<GameConfig>(path)?,
            None => GameConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config.validate().context("Invalid game configuration")?;
        Ok(config)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or_else(|| Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg, args.verbose)?,
        Mode::Simulate(arg) => simulate::run(&arg, args.verbose)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_args_are_consistent() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_simulate_args() {
        let args = CommandArgs::try_parse_from([
            "blockfall",
            "simulate",
            "--seed",
            "0123456789abcdef0123456789abcdef",
            "--commands",
            "50",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        let Some(Mode::Simulate(arg)) = args.mode else {
            panic!("expected simulate mode");
        };
        let config = arg.game().load_config().unwrap();
        assert_eq!(
            config.seed.unwrap().to_string(),
            "0123456789abcdef0123456789abcdef"
        );
    }

    #[test]
    fn test_bad_seed_is_rejected() {
        let result = CommandArgs::try_parse_from(["blockfall", "play", "--seed", "nope"]);
        assert!(result.is_err());
    }
}

use std::path::PathBuf;

use blockfall_engine::GameSession;
use ratatui_runtime::Runtime;

use self::app::PlayApp;
use crate::{command::GameArg, logging, view::SkinKind};

mod app;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    game: GameArg,
    /// How blocks are drawn: `color` or `ascii`
    #[clap(long, default_value = "color")]
    skin: SkinKind,
    /// Write logs to this file; nothing is logged otherwise
    #[clap(long)]
    log_file: Option<PathBuf>,
}

pub(crate) fn run(arg: &PlayArg, verbose: u8) -> anyhow::Result<()> {
    let PlayArg {
        game,
        skin,
        log_file,
    } = arg;

    // The terminal belongs to the game, so logs only go to a file.
    if let Some(path) = log_file {
        logging::init_file(path, verbose)?;
    }

    let config = game.load_config()?;
    let session = GameSession::with_config(config);
    tracing::info!(seed = %session.seed(), "starting play session");

    let mut app = PlayApp::new(session, skin.into_skin());
    Runtime::new().run(&mut app)?;

    let session = app.session();
    tracing::info!(
        state = %session.play_state(),
        score = session.score(),
        lines = session.stats().total_cleared_lines(),
        "play session finished"
    );
    Ok(())
}

use std::time::Duration;

use blockfall_engine::{Command, CommandOutcome, GameSession, StepOutcome};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use ratatui_runtime::{App, RenderMode, Runtime};
use tracing::{debug, info, trace};

use crate::view::{
    Skin,
    widgets::{KeyBindingDisplay, SessionDisplay},
};

const FPS: f64 = 60.0;

#[derive(Debug)]
pub(crate) struct PlayApp {
    session: GameSession,
    skin: Box<dyn Skin>,
    /// Timer generation and interval last handed to the runtime.
    synced_timer: Option<(u64, Option<Duration>)>,
    is_exiting: bool,
}

impl PlayApp {
    pub(crate) fn new(session: GameSession, skin: Box<dyn Skin>) -> Self {
        Self {
            session,
            skin,
            synced_timer: None,
            is_exiting: false,
        }
    }

    pub(crate) fn session(&self) -> &GameSession {
        &self.session
    }

    /// Mirrors the session timer onto the runtime. A new generation re-phases the tick deadline.
    fn sync_timer(&mut self, runtime: &mut Runtime) {
        let timer = self.session.timer();
        let current = (timer.generation(), timer.interval());
        if self.synced_timer != Some(current) {
            trace!(generation = current.0, interval = ?current.1, "timer synced");
            runtime.set_tick_interval(current.1);
            self.synced_timer = Some(current);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if is_quit_key(key) {
            self.is_exiting = true;
            return;
        }
        let Some(command) = command_for_key(key.code) else {
            return;
        };
        let outcome = self.session.apply(command);
        trace!(?command, ?outcome, "command applied");
        if let CommandOutcome::Locked(report) = outcome
            && report.game_over
        {
            info!(score = self.session.score(), "game over");
        }
    }
}

fn is_quit_key(key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q' | 'Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Maps a key to the session command it triggers.
fn command_for_key(code: KeyCode) -> Option<Command> {
    let command = match code {
        KeyCode::Left => Command::MoveLeft,
        KeyCode::Right => Command::MoveRight,
        KeyCode::Down => Command::SoftDrop,
        KeyCode::Up | KeyCode::Char(' ') => Command::HardDrop,
        KeyCode::Char('z' | 'Z') => Command::RotateCcw,
        KeyCode::Char('x' | 'X') => Command::RotateCw,
        KeyCode::Char('c' | 'C') => Command::Hold,
        KeyCode::Char('p' | 'P') => Command::TogglePause,
        KeyCode::Enter => Command::StartOrRestart,
        _ => return None,
    };
    Some(command)
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_render_mode(RenderMode::throttled_from_rate(FPS));
        self.sync_timer(runtime);
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, runtime: &mut Runtime, event: Event) {
        if let Some(key) = event.as_key_press_event() {
            self.handle_key(key);
            self.sync_timer(runtime);
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(24), Constraint::Length(1)])
                .areas::<2>(frame.area());
        frame.render_widget(SessionDisplay::new(&self.session, self.skin.as_ref()), main_area);
        frame.render_widget(KeyBindingDisplay::new(self.session.play_state()), help_area);
    }

    fn tick(&mut self, runtime: &mut Runtime) {
        match self.session.tick() {
            Ok(StepOutcome::Moved) => {}
            Ok(StepOutcome::Locked(report)) => {
                debug!(kind = ?report.kind, cleared_lines = report.cleared_lines, "locked by gravity");
                if report.game_over {
                    info!(score = self.session.score(), "game over");
                }
            }
            Err(_) => trace!(state = %self.session.play_state(), "tick while inactive"),
        }
        self.sync_timer(runtime);
    }
}

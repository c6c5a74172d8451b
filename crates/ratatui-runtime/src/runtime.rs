use std::{
    io,
    time::{Duration, Instant},
};

use crate::{
    App,
    event_loop::{EventLoop, RenderMode, TuiEvent},
};

/// Runs an [`App`] on a single-threaded event loop.
///
/// The app owns its timing decisions: it arms, re-arms or stops the tick schedule through
/// [`Runtime::set_tick_interval`] from any callback.
#[derive(Default, Debug)]
pub struct Runtime {
    events: EventLoop,
}

impl Runtime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tick schedule. The next tick fires one full `interval` from now.
    ///
    /// `None` stops ticking.
    pub fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.events.set_tick_interval(interval, Instant::now());
    }

    /// Returns the current tick period, or `None` while ticking is stopped.
    #[must_use]
    pub fn tick_interval(&self) -> Option<Duration> {
        self.events.tick_interval()
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.events.set_render_mode(mode);
    }

    /// Runs the application until [`App::should_exit`] returns `true`.
    ///
    /// The terminal is put into raw mode and the alternate screen for the duration of the call
    /// and restored afterwards, also on error.
    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick => app.tick(&mut self),
                    TuiEvent::Render => {
                        terminal.draw(|f| app.draw(f))?;
                    }
                    TuiEvent::Crossterm(event) => app.handle_event(&mut self, event),
                }
            }
            Ok(())
        })
    }
}

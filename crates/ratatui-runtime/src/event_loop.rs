use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event as CrosstermEvent};

/// Events dispatched to an [`App`](crate::App).
#[derive(Debug, Clone, derive_more::IsVariant, derive_more::From)]
pub(crate) enum TuiEvent {
    /// The tick deadline passed.
    Tick,
    /// Time to draw.
    Render,
    /// Key input, mouse or resize.
    Crossterm(CrosstermEvent),
}

/// Rendering trigger mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Render at fixed intervals.
    Interval(Duration),
    /// Render after every tick or terminal event.
    #[default]
    OnDirty,
    /// Like `OnDirty`, but at most once per interval. Faster changes are batched into one render.
    Throttled(Duration),
}

impl RenderMode {
    /// Creates `Throttled` mode from a frame rate (FPS).
    #[must_use]
    pub fn throttled_from_rate(rate: f64) -> Self {
        Self::Throttled(Duration::from_secs_f64(1.0 / rate))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TickSchedule {
    interval: Duration,
    next_at: Instant,
}

/// Single-threaded scheduler interleaving tick deadlines, renders and terminal input.
///
/// There is at most one tick schedule. Setting a new interval replaces it and counts the first
/// deadline from that moment.
#[derive(Debug)]
pub(crate) struct EventLoop {
    tick: Option<TickSchedule>,
    render_mode: RenderMode,
    last_render: Option<Instant>,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    pub(crate) fn new() -> Self {
        Self {
            tick: None,
            render_mode: RenderMode::default(),
            last_render: None,
            // The first frame is drawn right away.
            dirty: true,
        }
    }

    /// Replaces the tick schedule; the next tick fires `interval` after `now`.
    ///
    /// `None` stops ticking.
    pub(crate) fn set_tick_interval(&mut self, interval: Option<Duration>, now: Instant) {
        self.tick = interval.map(|interval| TickSchedule {
            interval,
            next_at: now + interval,
        });
    }

    pub(crate) fn tick_interval(&self) -> Option<Duration> {
        self.tick.map(|tick| tick.interval)
    }

    pub(crate) fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
    }

    /// Blocks until a tick is due, a render is due or a terminal event arrives.
    pub(crate) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(event) = self.due_event(now) {
                return Ok(event);
            }
            if let Some(timeout) = self.timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }
            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    /// Returns the timed event due at `now`, ticks first.
    fn due_event(&mut self, now: Instant) -> Option<TuiEvent> {
        if let Some(tick) = &mut self.tick
            && now >= tick.next_at
        {
            // Late ticks are not replayed.
            tick.next_at = now + tick.interval;
            self.dirty = true;
            return Some(TuiEvent::Tick);
        }

        let since_render = self.last_render.map(|at| now.duration_since(at));
        let render = match self.render_mode {
            RenderMode::Interval(interval) => since_render.is_none_or(|d| d >= interval),
            RenderMode::OnDirty => self.dirty,
            RenderMode::Throttled(interval) => {
                self.dirty && since_render.is_none_or(|d| d >= interval)
            }
        };
        if render {
            self.last_render = Some(now);
            self.dirty = false;
            return Some(TuiEvent::Render);
        }
        None
    }

    /// How long to wait for terminal input before the next timed event. `None` waits forever.
    fn timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick_at = self.tick.map(|tick| tick.next_at);
        let next_render_at = match self.render_mode {
            RenderMode::Interval(interval) => Some(self.last_render.map_or(now, |at| at + interval)),
            RenderMode::OnDirty => self.dirty.then_some(now),
            RenderMode::Throttled(interval) => self
                .dirty
                .then(|| self.last_render.map_or(now, |at| at + interval)),
        };
        let next_at = [next_tick_at, next_render_at].into_iter().flatten().min()?;
        Some(next_at.saturating_duration_since(now))
    }
}

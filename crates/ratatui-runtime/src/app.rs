use crossterm::event::Event;
use ratatui::Frame;

use crate::Runtime;

/// Application driven by [`Runtime::run`].
pub trait App {
    /// Called once before the first event. Set up the tick schedule and render mode here.
    fn init(&mut self, runtime: &mut Runtime);

    fn should_exit(&self) -> bool;

    /// Handles key input, mouse and resize events.
    fn handle_event(&mut self, runtime: &mut Runtime, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Called each time the tick deadline passes.
    fn tick(&mut self, runtime: &mut Runtime);
}

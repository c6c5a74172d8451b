//! Minimal event loop for ratatui applications whose clock is owned by the application.

pub use self::{app::App, event_loop::RenderMode, runtime::Runtime};

mod app;
mod event_loop;
mod runtime;

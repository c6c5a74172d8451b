//! Deterministic falling-block puzzle engine.
//!
//! The crate is split the same way the game is layered:
//!
//! - [`core`] holds the static rules: the piece catalog, the board and the rotation system.
//! - [`engine`] holds the moving parts: the bag randomizer, the game field, scoring, the tick
//!   timer handle and the [`GameSession`] state machine that ties them together.
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{Command, GameSession, PlayState};
//!
//! let mut session = GameSession::new();
//! assert_eq!(session.play_state(), PlayState::Waiting);
//!
//! session.apply(Command::StartOrRestart);
//! session.apply(Command::RotateCw);
//! session.apply(Command::HardDrop);
//!
//! assert!(session.score() > 0);
//! ```

pub use self::{config::*, core::*, engine::*};

mod config;
pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece colliding with the board or its walls")]
pub struct PieceCollisionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("session is not accepting piece commands")]
pub struct InactiveError;

/// Error returned by piece moves and rotations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From,
)]
pub enum MoveError {
    #[display("{_0}")]
    PieceCollision(PieceCollisionError),
    #[display("{_0}")]
    Inactive(InactiveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum HoldError {
    #[display("piece colliding when holding piece")]
    PieceCollision(PieceCollisionError),
    #[display("hold already used in this turn")]
    HoldAlreadyUsed,
    #[display("{_0}")]
    Inactive(InactiveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CompletePieceDropError {
    #[display("new piece colliding with the board")]
    NewPieceCollision,
}

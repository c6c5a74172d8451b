//! Game engine logic and state management.
//!
//! - [`PieceBuffer`] / [`PieceSeed`]: the seven-piece bag randomizer
//! - [`GameField`]: board, falling piece, queue and hold slot of one game
//! - [`GameStats`]: score, fractional level and lock statistics
//! - [`TickTimer`]: the tick schedule a session asks its owner to run
//! - [`GameSession`]: the play-state machine and command surface
//! - [`GameSnapshot`]: a serializable view for renderers
//!
//! # Game Flow
//!
//! 1. Create a [`GameSession`], which starts in [`PlayState::Waiting`]
//! 2. [`Command::StartOrRestart`] begins a game and arms the timer
//! 3. Commands move, rotate, hold and drop the falling piece; ticks pull it down
//! 4. A piece that cannot move down locks, full rows clear and the next piece spawns
//! 5. When a new piece does not fit, the session is over until restarted
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{GameSession, StepOutcome};
//!
//! let mut session = GameSession::new();
//! session.start_or_restart();
//!
//! session.try_move_left().ok();
//! session.try_rotate_cw().ok();
//!
//! // Let gravity do the rest.
//! loop {
//!     if let StepOutcome::Locked(report) = session.tick().unwrap() {
//!         assert_eq!(report.cleared_lines, 0);
//!         break;
//!     }
//! }
//! ```

pub use self::{
    command::*, game_field::*, game_stats::*, piece_buffer::*, session::*, snapshot::*, timer::*,
};

mod command;
mod game_field;
mod game_stats;
mod piece_buffer;
mod session;
mod snapshot;
mod timer;

use std::time::Duration;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    GameConfig, HoldError, InactiveError, MoveError, PieceCollisionError,
    core::{
        board::Board,
        piece::{Piece, PieceKind},
        rotation::{Kick, RotationDirection},
    },
};

use super::{
    command::{Command, CommandOutcome},
    game_field::GameField,
    game_stats::GameStats,
    piece_buffer::PieceSeed,
    timer::TickTimer,
};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum PlayState {
    /// No game has been started yet.
    Waiting,
    Playing,
    Paused,
    GameOver,
}

/// What happened when a piece locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockReport {
    pub kind: PieceKind,
    pub cleared_lines: usize,
    /// Points earned by the line clear.
    pub line_clear_score: u64,
    /// Points earned by the drop that led to the lock.
    pub drop_score: u64,
    /// Whether the next piece failed to spawn.
    pub game_over: bool,
}

impl LockReport {
    #[must_use]
    pub const fn total_score(&self) -> u64 {
        self.line_clear_score + self.drop_score
    }
}

/// Result of a one-row downward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepOutcome {
    Moved,
    Locked(LockReport),
}

/// A game driven by discrete commands and an external tick clock.
///
/// The session owns the current game and replaces it wholesale on restart. Piece commands only
/// act while [`PlayState::Playing`]; otherwise they fail with [`InactiveError`] and leave the
/// session untouched.
///
/// The session does not keep time. [`GameSession::timer`] describes the tick schedule it wants,
/// and the owner calls [`GameSession::tick`] accordingly.
///
/// # Example
///
/// ```
/// use blockfall_engine::{GameConfig, GameSession, PlayState, StepOutcome};
///
/// let mut session = GameSession::with_config(GameConfig {
///     seed: Some("0123456789abcdef0123456789abcdef".parse().unwrap()),
///     ..GameConfig::default()
/// });
/// assert!(session.start_or_restart());
/// assert!(session.timer().is_armed());
///
/// assert_eq!(session.tick(), Ok(StepOutcome::Moved));
///
/// session.toggle_pause().unwrap();
/// assert_eq!(session.play_state(), PlayState::Paused);
/// assert!(session.tick().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    seeder: Pcg32,
    next_seed: PieceSeed,
    seed: PieceSeed,
    field: GameField,
    stats: GameStats,
    play_state: PlayState,
    timer: TickTimer,
    last_lock: Option<LockReport>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates a waiting session with the default configuration and a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    /// Creates a waiting session.
    ///
    /// With a seed configured, the first game uses that seed and later games use seeds derived
    /// from it, so a whole sequence of games is reproducible.
    #[must_use]
    pub fn with_config(config: GameConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        Self {
            seeder: Pcg32::from_seed(seed.to_bytes()),
            next_seed: seed,
            seed,
            field: GameField::with_seed(seed),
            stats: GameStats::new(),
            play_state: PlayState::Waiting,
            timer: TickTimer::new(),
            last_lock: None,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Seed of the current game's piece sequence.
    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.seed
    }

    #[must_use]
    pub fn field(&self) -> &GameField {
        &self.field
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.field.board()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn play_state(&self) -> PlayState {
        self.play_state
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.stats.score()
    }

    /// Returns the whole part of the level.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.stats.level()
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.field.falling_piece()
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.field.held_piece()
    }

    /// Returns whether a hold command would currently succeed.
    #[must_use]
    pub fn can_hold(&self) -> bool {
        self.play_state.is_playing() && self.field.can_hold()
    }

    /// Upcoming pieces, limited to the configured preview length.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.field.next_pieces().take(self.config.preview_len)
    }

    /// Where the falling piece would land on a hard drop, while a game is in progress.
    #[must_use]
    pub fn drop_preview(&self) -> Option<Piece> {
        matches!(self.play_state, PlayState::Playing | PlayState::Paused)
            .then(|| self.field.simulate_drop_position())
    }

    #[must_use]
    pub fn last_lock(&self) -> Option<&LockReport> {
        self.last_lock.as_ref()
    }

    #[must_use]
    pub fn timer(&self) -> &TickTimer {
        &self.timer
    }

    /// Tick period for the current level.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.config.gravity.interval_for(self.stats.level())
    }

    pub fn start_timer(&mut self, interval: Duration) {
        self.timer.start(interval);
        debug!(?interval, generation = self.timer.generation(), "tick timer started");
    }

    pub fn stop_timer(&mut self) {
        self.timer.stop();
        debug!("tick timer stopped");
    }

    pub fn restart_timer(&mut self, interval: Duration) {
        self.timer.restart(interval);
        debug!(?interval, generation = self.timer.generation(), "tick timer restarted");
    }

    /// Replaces the board of the current game. Meant for puzzle and test setup.
    ///
    /// Only allowed while playing. Fails without any change if the falling piece would overlap
    /// the new board.
    pub fn set_board(&mut self, board: Board) -> Result<(), MoveError> {
        self.ensure_playing()?;
        if !board.can_place(self.field.falling_piece().blocks()) {
            return Err(PieceCollisionError.into());
        }
        self.field.set_board(board);
        Ok(())
    }

    /// Replaces the falling piece, which must fit on the board.
    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), MoveError> {
        self.ensure_playing()?;
        self.field.set_falling_piece(piece)?;
        Ok(())
    }

    /// Starts a fresh game from [`PlayState::Waiting`] or [`PlayState::GameOver`].
    ///
    /// Returns `false` and does nothing while a game is playing or paused.
    pub fn start_or_restart(&mut self) -> bool {
        match self.play_state {
            PlayState::Waiting | PlayState::GameOver => {
                self.start_game();
                true
            }
            PlayState::Playing | PlayState::Paused => false,
        }
    }

    fn start_game(&mut self) {
        self.seed = self.next_seed;
        self.next_seed = self.seeder.random();
        self.field = GameField::with_seed(self.seed);
        self.stats = GameStats::new();
        self.last_lock = None;
        self.play_state = PlayState::Playing;
        debug!(seed = %self.seed, "game started");
        self.start_timer(self.tick_interval());
    }

    /// Switches between playing and paused, stopping or starting the tick timer.
    pub fn toggle_pause(&mut self) -> Result<PlayState, InactiveError> {
        match self.play_state {
            PlayState::Playing => {
                self.play_state = PlayState::Paused;
                self.stop_timer();
            }
            PlayState::Paused => {
                self.play_state = PlayState::Playing;
                self.start_timer(self.tick_interval());
            }
            PlayState::Waiting | PlayState::GameOver => return Err(InactiveError),
        }
        debug!(state = %self.play_state, "pause toggled");
        Ok(self.play_state)
    }

    fn ensure_playing(&self) -> Result<(), InactiveError> {
        if self.play_state.is_playing() {
            Ok(())
        } else {
            Err(InactiveError)
        }
    }

    /// Translates the falling piece by `(dx, dy)` if the result fits.
    ///
    /// Moving down this way scores nothing and leaves the timer alone; see [`Self::soft_drop`].
    pub fn try_move(&mut self, dx: i8, dy: i8) -> Result<(), MoveError> {
        self.ensure_playing()?;
        let piece = self
            .field
            .falling_piece()
            .checked_shifted(dx, dy)
            .ok_or(PieceCollisionError)?;
        self.field.set_falling_piece(piece)?;
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), MoveError> {
        self.try_move(-1, 0)
    }

    pub fn try_move_right(&mut self) -> Result<(), MoveError> {
        self.try_move(1, 0)
    }

    /// Rotates the falling piece, returning the kick that made it fit.
    ///
    /// When no kick fits, the piece is left exactly as it was.
    pub fn try_rotate(&mut self, direction: RotationDirection) -> Result<Kick, MoveError> {
        self.ensure_playing()?;
        let (piece, kick) = self
            .field
            .falling_piece()
            .super_rotated(self.field.board(), direction)
            .ok_or(PieceCollisionError)?;
        trace!(?direction, dx = kick.dx, dy = kick.dy, "rotated");
        self.field.set_falling_piece_unchecked(piece);
        Ok(kick)
    }

    pub fn try_rotate_cw(&mut self) -> Result<Kick, MoveError> {
        self.try_rotate(RotationDirection::Clockwise)
    }

    pub fn try_rotate_ccw(&mut self) -> Result<Kick, MoveError> {
        self.try_rotate(RotationDirection::CounterClockwise)
    }

    pub fn try_hold(&mut self) -> Result<(), HoldError> {
        self.ensure_playing().map_err(HoldError::Inactive)?;
        self.field.try_hold()?;
        debug!(held = ?self.field.held_piece(), "piece held");
        Ok(())
    }

    /// Moves the falling piece down one row, or locks it if it cannot move.
    ///
    /// Every soft drop earns one point and restarts the tick timer, including one that locks.
    pub fn soft_drop(&mut self) -> Result<StepOutcome, InactiveError> {
        self.ensure_playing()?;
        self.stats.add_drop_score(1);
        self.restart_timer(self.tick_interval());
        if self.step_down() {
            return Ok(StepOutcome::Moved);
        }
        Ok(StepOutcome::Locked(self.lock_piece(1)))
    }

    /// Drops the falling piece as far as it goes and locks it, earning two points per row.
    pub fn hard_drop(&mut self) -> Result<LockReport, InactiveError> {
        self.ensure_playing()?;
        let mut rows = 0;
        while self.step_down() {
            rows += 1;
        }
        let drop_score = 2 * rows;
        self.stats.add_drop_score(drop_score);
        Ok(self.lock_piece(drop_score))
    }

    /// Advances gravity by one row, locking the piece if it cannot move.
    pub fn tick(&mut self) -> Result<StepOutcome, InactiveError> {
        self.ensure_playing()?;
        if self.step_down() {
            return Ok(StepOutcome::Moved);
        }
        Ok(StepOutcome::Locked(self.lock_piece(0)))
    }

    fn step_down(&mut self) -> bool {
        let piece = self.field.falling_piece().down();
        self.field.set_falling_piece(piece).is_ok()
    }

    fn lock_piece(&mut self, drop_score: u64) -> LockReport {
        let kind = self.field.falling_piece().kind();
        let (cleared_lines, result) = self.field.complete_piece_drop();
        let line_clear_score = self.stats.complete_piece_drop(cleared_lines);
        debug!(?kind, cleared_lines, line_clear_score, drop_score, "piece locked");

        if cleared_lines > 0 {
            debug!(
                level_tenths = self.stats.level_tenths(),
                score = self.stats.score(),
                "lines cleared"
            );
            self.restart_timer(self.tick_interval());
        }

        let game_over = result.is_err();
        if game_over {
            self.play_state = PlayState::GameOver;
            self.stop_timer();
            debug!(
                score = self.stats.score(),
                pieces = self.stats.completed_pieces(),
                "game over"
            );
        }

        let report = LockReport {
            kind,
            cleared_lines,
            line_clear_score,
            drop_score,
            game_over,
        };
        self.last_lock = Some(report);
        report
    }

    /// Applies a command and folds its result into a [`CommandOutcome`].
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        match command {
            Command::MoveLeft => move_outcome(self.try_move_left()),
            Command::MoveRight => move_outcome(self.try_move_right()),
            Command::RotateCw => move_outcome(self.try_rotate_cw()),
            Command::RotateCcw => move_outcome(self.try_rotate_ccw()),
            Command::SoftDrop => match self.soft_drop() {
                Ok(StepOutcome::Moved) => CommandOutcome::Applied,
                Ok(StepOutcome::Locked(report)) => CommandOutcome::Locked(report),
                Err(InactiveError) => CommandOutcome::Ignored,
            },
            Command::HardDrop => match self.hard_drop() {
                Ok(report) => CommandOutcome::Locked(report),
                Err(InactiveError) => CommandOutcome::Ignored,
            },
            Command::Hold => match self.try_hold() {
                Ok(()) => CommandOutcome::Applied,
                Err(HoldError::Inactive(_)) => CommandOutcome::Ignored,
                Err(HoldError::HoldAlreadyUsed | HoldError::PieceCollision(_)) => {
                    CommandOutcome::Rejected
                }
            },
            Command::TogglePause => match self.toggle_pause() {
                Ok(_) => CommandOutcome::Applied,
                Err(InactiveError) => CommandOutcome::Ignored,
            },
            Command::StartOrRestart => {
                if self.start_or_restart() {
                    CommandOutcome::Applied
                } else {
                    CommandOutcome::Ignored
                }
            }
        }
    }
}

fn move_outcome<T>(result: Result<T, MoveError>) -> CommandOutcome {
    match result {
        Ok(_) => CommandOutcome::Applied,
        Err(MoveError::PieceCollision(_)) => CommandOutcome::Rejected,
        Err(MoveError::Inactive(_)) => CommandOutcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_session() -> GameSession {
        let mut session = GameSession::with_config(GameConfig {
            seed: Some(PieceSeed::from_bytes([42; 16])),
            ..GameConfig::default()
        });
        assert!(session.start_or_restart());
        session
    }

    #[test]
    fn test_new_session_is_waiting() {
        let mut session = GameSession::new();
        assert_eq!(session.play_state(), PlayState::Waiting);
        assert!(!session.timer().is_armed());
        assert_eq!(session.drop_preview(), None);

        for command in Command::PIECE_COMMANDS {
            assert_eq!(session.apply(command), CommandOutcome::Ignored);
        }
        assert_eq!(session.apply(Command::TogglePause), CommandOutcome::Ignored);
        assert_eq!(session.tick(), Err(InactiveError));
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_start_arms_timer_at_base_interval() {
        let session = playing_session();
        assert_eq!(session.play_state(), PlayState::Playing);
        assert_eq!(session.timer().interval(), Some(Duration::from_millis(1000)));
        assert_eq!(session.falling_piece().rotation().index(), 0);
    }

    #[test]
    fn test_start_while_playing_is_ignored() {
        let mut session = playing_session();
        session.try_move_left().unwrap();
        let piece = session.falling_piece();
        let generation = session.timer().generation();

        assert_eq!(session.apply(Command::StartOrRestart), CommandOutcome::Ignored);
        assert_eq!(session.falling_piece(), piece);
        assert_eq!(session.timer().generation(), generation);

        session.toggle_pause().unwrap();
        assert!(!session.start_or_restart());
        assert_eq!(session.play_state(), PlayState::Paused);
    }

    #[test]
    fn test_pause_freezes_piece_commands_and_timer() {
        let mut session = playing_session();
        assert_eq!(session.toggle_pause(), Ok(PlayState::Paused));
        assert!(!session.timer().is_armed());

        let piece = session.falling_piece();
        for command in Command::PIECE_COMMANDS {
            assert_eq!(session.apply(command), CommandOutcome::Ignored);
        }
        assert_eq!(session.falling_piece(), piece);
        assert!(session.drop_preview().is_some());

        assert_eq!(session.apply(Command::TogglePause), CommandOutcome::Applied);
        assert_eq!(session.play_state(), PlayState::Playing);
        assert!(session.timer().is_armed());
    }

    #[test]
    fn test_horizontal_moves_and_rotations_keep_timer() {
        let mut session = playing_session();
        let generation = session.timer().generation();
        session.try_move_left().unwrap();
        session.try_move_right().unwrap();
        session.try_rotate_cw().unwrap();
        session.try_rotate_ccw().unwrap();
        assert_eq!(session.timer().generation(), generation);
    }

    #[test]
    fn test_soft_drop_scores_and_restarts_timer() {
        let mut session = playing_session();
        let generation = session.timer().generation();
        let piece = session.falling_piece();

        assert_eq!(session.soft_drop(), Ok(StepOutcome::Moved));
        assert_eq!(session.score(), 1);
        assert_eq!(session.falling_piece(), piece.down());
        assert_eq!(session.timer().generation(), generation + 1);
    }

    #[test]
    fn test_tick_moves_without_scoring() {
        let mut session = playing_session();
        let generation = session.timer().generation();
        let piece = session.falling_piece();

        assert_eq!(session.tick(), Ok(StepOutcome::Moved));
        assert_eq!(session.score(), 0);
        assert_eq!(session.falling_piece(), piece.down());
        assert_eq!(session.timer().generation(), generation);
    }

    #[test]
    fn test_move_against_wall_is_rejected() {
        let mut session = playing_session();
        while session.try_move_left().is_ok() {}
        let piece = session.falling_piece();
        assert_eq!(session.apply(Command::MoveLeft), CommandOutcome::Rejected);
        assert_eq!(session.falling_piece(), piece);
        assert!(piece.blocks().iter().any(|b| b.x == 0));
    }

    #[test]
    fn test_generic_move_translates_without_scoring() {
        let mut session = playing_session();
        let piece = session.falling_piece();
        let generation = session.timer().generation();
        session.try_move(1, 2).unwrap();
        assert_eq!(session.falling_piece(), piece.shifted(1, 2));
        assert_eq!(session.score(), 0);
        assert_eq!(session.timer().generation(), generation);
        assert!(session.try_move(-20, 0).is_err());
        assert_eq!(session.falling_piece(), piece.shifted(1, 2));
    }

    #[test]
    fn test_out_of_range_moves_are_rejected() {
        let mut session = playing_session();
        let piece = session.falling_piece();
        for (dx, dy) in [
            (i8::MAX, 0),
            (i8::MIN, 0),
            (64, 0),
            (-64, 0),
            (0, i8::MAX),
            (0, i8::MIN),
        ] {
            assert_eq!(
                session.try_move(dx, dy),
                Err(MoveError::PieceCollision(PieceCollisionError)),
                "({dx}, {dy})"
            );
            assert_eq!(session.falling_piece(), piece);
        }
    }

    #[test]
    fn test_board_cannot_change_outside_play() {
        let mut session = GameSession::new();
        let board = Board::from_bottom_rows(&["IIII......"]).unwrap();
        assert_eq!(
            session.set_board(board.clone()),
            Err(MoveError::Inactive(InactiveError))
        );
        session.start_or_restart();
        session.toggle_pause().unwrap();
        assert!(session.set_board(board).is_err());
        assert!(session.board().is_empty());
    }

    #[test]
    fn test_tick_locks_resting_piece() {
        let mut session = playing_session();
        let landing = session.drop_preview().unwrap();
        session.set_falling_piece(landing).unwrap();
        let kind = landing.kind();

        let StepOutcome::Locked(report) = session.tick().unwrap() else {
            panic!("resting piece should lock");
        };
        assert_eq!(report.kind, kind);
        assert_eq!(report.cleared_lines, 0);
        assert_eq!(report.total_score(), 0);
        assert!(!report.game_over);
        assert_eq!(session.last_lock(), Some(&report));
        assert_eq!(session.board().filled_cells(), 4);
        assert_eq!(session.stats().completed_pieces(), 1);
    }

    #[test]
    fn test_soft_drop_on_resting_piece_locks_with_a_point() {
        let mut session = playing_session();
        let landing = session.drop_preview().unwrap();
        session.set_falling_piece(landing).unwrap();
        let generation = session.timer().generation();

        let CommandOutcome::Locked(report) = session.apply(Command::SoftDrop) else {
            panic!("resting piece should lock");
        };
        assert_eq!(report.drop_score, 1);
        assert_eq!(report.total_score(), 1);
        assert_eq!(session.score(), 1);
        // The next piece starts on a fresh timer.
        assert_eq!(session.timer().generation(), generation + 1);
        assert!(session.timer().is_armed());
    }

    #[test]
    fn test_hard_drop_scores_two_per_row() {
        let mut session = playing_session();
        let start = session.falling_piece();
        let landing = session.drop_preview().unwrap();
        let rows = landing.blocks()[0].y - start.blocks()[0].y;

        let report = session.hard_drop().unwrap();
        assert_eq!(report.drop_score, 2 * u64::try_from(rows).unwrap());
        assert_eq!(session.score(), report.drop_score);
        assert!(session.board().filled_cells() == 4);
    }

    #[test]
    fn test_hold_is_single_use_until_lock() {
        let mut session = playing_session();
        assert!(session.can_hold());
        assert_eq!(session.apply(Command::Hold), CommandOutcome::Applied);
        assert!(!session.can_hold());
        assert_eq!(session.apply(Command::Hold), CommandOutcome::Rejected);

        session.hard_drop().unwrap();
        assert!(session.can_hold());
    }

    #[test]
    fn test_restart_after_game_over_resets_everything() {
        let mut session = playing_session();
        let first_seed = session.seed();
        while session.play_state().is_playing() {
            session.hard_drop().unwrap();
        }
        assert_eq!(session.play_state(), PlayState::GameOver);
        assert!(!session.timer().is_armed());
        assert!(session.last_lock().unwrap().game_over);
        assert_eq!(session.drop_preview(), None);

        assert_eq!(session.apply(Command::StartOrRestart), CommandOutcome::Applied);
        assert_eq!(session.play_state(), PlayState::Playing);
        assert!(session.board().is_empty());
        assert_eq!(session.score(), 0);
        assert_eq!(session.held_piece(), None);
        assert_eq!(session.last_lock(), None);
        assert_ne!(session.seed(), first_seed);
    }

    #[test]
    fn test_seeded_sessions_replay_the_same_games() {
        let config = GameConfig {
            seed: Some(PieceSeed::from_bytes([9; 16])),
            ..GameConfig::default()
        };
        let mut a = GameSession::with_config(config.clone());
        let mut b = GameSession::with_config(config);
        for _ in 0..3 {
            a.start_or_restart();
            b.start_or_restart();
            assert_eq!(a.seed(), b.seed());
            while a.play_state().is_playing() {
                a.hard_drop().unwrap();
                b.hard_drop().unwrap();
                assert_eq!(a.board(), b.board());
            }
            assert_eq!(b.play_state(), PlayState::GameOver);
        }
    }

    #[test]
    fn test_preview_length_follows_config() {
        let mut session = GameSession::with_config(GameConfig {
            preview_len: 2,
            ..GameConfig::default()
        });
        session.start_or_restart();
        assert_eq!(session.next_pieces().count(), 2);
    }
}

use crate::{
    CompletePieceDropError, HoldError, PieceCollisionError,
    core::{
        board::Board,
        piece::{Piece, PieceKind},
    },
};

use super::piece_buffer::{PieceBuffer, PieceSeed};

/// Board, falling piece, piece queue and hold slot of a single game.
#[derive(Debug, Clone)]
pub struct GameField {
    board: Board,
    falling_piece: Piece,
    piece_buffer: PieceBuffer,
    held: Option<PieceKind>,
    held_this_turn: bool,
}

impl Default for GameField {
    fn default() -> Self {
        Self::new()
    }
}

impl GameField {
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer(PieceBuffer::new())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::with_buffer(PieceBuffer::with_seed(seed))
    }

    fn with_buffer(mut piece_buffer: PieceBuffer) -> Self {
        let falling_piece = Piece::new(piece_buffer.pop_next());
        Self {
            board: Board::new(),
            falling_piece,
            piece_buffer,
            held: None,
            held_this_turn: false,
        }
    }

    /// Replaces the board, keeping the falling piece and queue.
    ///
    /// Useful to set up positions; the falling piece is not re-validated.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> Piece {
        self.falling_piece
    }

    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if !self.board.can_place(piece.blocks()) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    /// Sets the falling piece without a collision check.
    ///
    /// For pieces already validated against this board, such as a kicked rotation.
    pub fn set_falling_piece_unchecked(&mut self, piece: Piece) {
        self.falling_piece = piece;
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }

    #[must_use]
    pub fn held_this_turn(&self) -> bool {
        self.held_this_turn
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.piece_buffer.next_pieces()
    }

    #[must_use]
    pub fn simulate_drop_position(&self) -> Piece {
        self.falling_piece.simulate_drop_position(&self.board)
    }

    /// Returns the piece that would be falling after a successful hold.
    #[must_use]
    pub fn peek_falling_piece_after_hold(&self) -> Piece {
        Piece::new(self.held.unwrap_or_else(|| self.piece_buffer.peek_next()))
    }

    /// Returns whether [`Self::try_hold`] would succeed.
    #[must_use]
    pub fn can_hold(&self) -> bool {
        !self.held_this_turn
            && self
                .board
                .can_place(self.peek_falling_piece_after_hold().blocks())
    }

    /// Stores the falling piece's kind and brings in the held piece, or the next queued one.
    ///
    /// The incoming piece spawns fresh at the spawn position. Fails without any change if hold
    /// was already used since the last spawn, or if the incoming piece would not fit. Unlike a
    /// spawn after a lock, a blocked hold never ends the game.
    pub fn try_hold(&mut self) -> Result<(), HoldError> {
        if self.held_this_turn {
            return Err(HoldError::HoldAlreadyUsed);
        }
        let incoming = self.peek_falling_piece_after_hold();
        if !self.board.can_place(incoming.blocks()) {
            return Err(HoldError::PieceCollision(PieceCollisionError));
        }

        if self.held.replace(self.falling_piece.kind()).is_none() {
            self.piece_buffer.pop_next();
        }
        self.falling_piece = incoming;
        self.held_this_turn = true;
        Ok(())
    }

    /// Locks the falling piece, clears full rows and spawns the next piece.
    ///
    /// Returns the number of cleared rows, and an error when the new piece does not fit. The
    /// colliding piece is still installed as the falling piece in that case.
    pub fn complete_piece_drop(&mut self) -> (usize, Result<(), CompletePieceDropError>) {
        self.board
            .commit(self.falling_piece.blocks(), self.falling_piece.kind());
        let cleared_lines = self.board.clear_full_rows();

        self.falling_piece = Piece::new(self.piece_buffer.pop_next());
        self.held_this_turn = false;
        if !self.board.can_place(self.falling_piece.blocks()) {
            return (
                cleared_lines,
                Err(CompletePieceDropError::NewPieceCollision),
            );
        }

        (cleared_lines, Ok(()))
    }
}

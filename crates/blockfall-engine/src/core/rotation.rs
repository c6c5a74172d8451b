use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    piece::{Piece, PieceKind, PieceRotation},
};

/// Direction of a rotation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// Translation applied after a rotation to make it fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Kick {
    pub dx: i8,
    pub dy: i8,
}

impl Kick {
    pub const NONE: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self { dx, dy }
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }
}

type KickTable = [[Kick; 5]; 4];

const fn kick_row(kicks: [(i8, i8); 5]) -> [Kick; 5] {
    let mut row = [Kick::NONE; 5];
    let mut i = 0;
    while i < 5 {
        row[i] = Kick::new(kicks[i].0, kicks[i].1);
        i += 1;
    }
    row
}

// Clockwise kicks indexed by the rotation state before the turn. Board coordinates: y grows
// downward.
const STANDARD_KICKS: KickTable = [
    kick_row([(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]),
    kick_row([(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)]),
    kick_row([(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]),
    kick_row([(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]),
];

const I_KICKS: KickTable = [
    kick_row([(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)]),
    kick_row([(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)]),
    kick_row([(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)]),
    kick_row([(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)]),
];

/// Returns the kicks to try, in order, when rotating a piece of `kind` out of `from`.
///
/// Counterclockwise turns reuse the clockwise row of the state they land in, negated.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Kick, PieceKind, PieceRotation, RotationDirection, kicks};
///
/// let cw = kicks(PieceKind::T, PieceRotation::SPAWN, RotationDirection::Clockwise);
/// assert_eq!(cw[1], Kick::new(-1, 0));
///
/// let ccw = kicks(PieceKind::T, PieceRotation::SPAWN, RotationDirection::CounterClockwise);
/// assert_eq!(ccw[1], Kick::new(1, 0));
/// ```
#[must_use]
pub fn kicks(kind: PieceKind, from: PieceRotation, direction: RotationDirection) -> [Kick; 5] {
    let table = match kind {
        PieceKind::I => &I_KICKS,
        _ => &STANDARD_KICKS,
    };
    match direction {
        RotationDirection::Clockwise => table[from.index()],
        RotationDirection::CounterClockwise => {
            table[from.rotated_ccw().index()].map(Kick::negated)
        }
    }
}

impl Piece {
    /// Returns the piece rotated without any kick.
    #[must_use]
    pub fn rotated(&self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Clockwise => self.rotated_cw(),
            RotationDirection::CounterClockwise => self.rotated_ccw(),
        }
    }

    /// Rotates the piece and applies the first kick that makes it fit on `board`.
    ///
    /// Returns the placed piece and the kick that was used, or `None` when every kick collides.
    #[must_use]
    pub fn super_rotated(&self, board: &Board, direction: RotationDirection) -> Option<(Self, Kick)> {
        let rotated = self.rotated(direction);
        kicks(self.kind(), self.rotation(), direction)
            .into_iter()
            .map(|kick| (rotated.shifted(kick.dx, kick.dy), kick))
            .find(|(piece, _)| board.can_place(piece.blocks()))
    }

    /// Moves the piece down until the next step would collide.
    #[must_use]
    pub fn simulate_drop_position(&self, board: &Board) -> Self {
        let mut dropped = *self;
        while board.can_place(dropped.down().blocks()) {
            dropped = dropped.down();
        }
        dropped
    }
}

use std::fmt;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::board::{PIECE_SPAWN_X, PIECE_SPAWN_Y};

/// Absolute position of a single block on the board.
///
/// `x` grows rightward and `y` grows downward. `y` may be negative while a piece is still
/// above the top of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct BlockPos {
    pub x: i8,
    pub y: i8,
}

impl BlockPos {
    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn shifted(self, dx: i8, dy: i8) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Like [`Self::shifted`], but `None` when a coordinate leaves the `i8` range.
    #[must_use]
    pub const fn checked_shifted(self, dx: i8, dy: i8) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Rotation pivot of a piece, stored at twice its real coordinates.
///
/// I and O pivots sit on a cell corner, i.e. on half-integer coordinates. Doubling them keeps
/// every rotation exact integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Pivot {
    x2: i8,
    y2: i8,
}

impl Pivot {
    const fn new(x2: i8, y2: i8) -> Self {
        Self { x2, y2 }
    }

    /// Returns the doubled coordinates `(2x, 2y)`.
    #[must_use]
    pub const fn doubled(self) -> (i8, i8) {
        (self.x2, self.y2)
    }

    #[must_use]
    pub fn x(self) -> f32 {
        f32::from(self.x2) / 2.0
    }

    #[must_use]
    pub fn y(self) -> f32 {
        f32::from(self.y2) / 2.0
    }

    const fn shifted(self, dx: i8, dy: i8) -> Self {
        Self::new(self.x2 + 2 * dx, self.y2 + 2 * dy)
    }

    fn checked_shifted(self, dx: i8, dy: i8) -> Option<Self> {
        let x2 = dx.checked_mul(2).and_then(|d| self.x2.checked_add(d))?;
        let y2 = dy.checked_mul(2).and_then(|d| self.y2.checked_add(d))?;
        Some(Self::new(x2, y2))
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const SPAWN: Self = Self(0);

    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_ccw(self) -> Self {
        Self((self.0 + 3) % 4)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The falling piece: its kind, four absolute blocks, pivot and rotation state.
///
/// Pieces are plain values. Moving or rotating returns a new `Piece`; nothing is checked against
/// the board here, callers validate with [`Board::can_place`](super::Board::can_place).
///
/// # Example
///
/// ```
/// use blockfall_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::T);
/// let moved = piece.shifted(1, 0);
/// assert_eq!(moved.blocks()[0].x, piece.blocks()[0].x + 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Piece {
    kind: PieceKind,
    blocks: [BlockPos; 4],
    pivot: Pivot,
    rotation: PieceRotation,
}

impl Piece {
    /// Creates a piece of the given kind in spawn orientation at the spawn position.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Self::spawned_at(kind, PIECE_SPAWN_X, PIECE_SPAWN_Y)
    }

    /// Creates a piece in spawn orientation whose shape origin sits at `(x, y)`.
    #[must_use]
    pub fn spawned_at(kind: PieceKind, x: i8, y: i8) -> Self {
        let shape = kind.shape();
        let blocks = shape.offsets.map(|(dx, dy)| BlockPos::new(x + dx, y + dy));
        let pivot = Pivot::new(2 * x + shape.pivot2.0, 2 * y + shape.pivot2.1);
        Self {
            kind,
            blocks,
            pivot,
            rotation: PieceRotation::SPAWN,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn blocks(&self) -> [BlockPos; 4] {
        self.blocks
    }

    #[must_use]
    pub fn pivot(&self) -> Pivot {
        self.pivot
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    /// Translates the blocks and the pivot together.
    #[must_use]
    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            kind: self.kind,
            blocks: self.blocks.map(|b| b.shifted(dx, dy)),
            pivot: self.pivot.shifted(dx, dy),
            rotation: self.rotation,
        }
    }

    /// Translates like [`Self::shifted`], or returns `None` if any coordinate would overflow.
    ///
    /// ```
    /// use blockfall_engine::{Piece, PieceKind};
    ///
    /// let piece = Piece::new(PieceKind::T);
    /// assert_eq!(piece.checked_shifted(1, 0), Some(piece.shifted(1, 0)));
    /// assert_eq!(piece.checked_shifted(i8::MAX, 0), None);
    /// ```
    #[must_use]
    pub fn checked_shifted(&self, dx: i8, dy: i8) -> Option<Self> {
        let mut blocks = self.blocks;
        for block in &mut blocks {
            *block = block.checked_shifted(dx, dy)?;
        }
        Some(Self {
            kind: self.kind,
            blocks,
            pivot: self.pivot.checked_shifted(dx, dy)?,
            rotation: self.rotation,
        })
    }

    #[must_use]
    pub fn down(&self) -> Self {
        self.shifted(0, 1)
    }

    /// Rotates the blocks 90° clockwise around the pivot, without any kick.
    ///
    /// Block offset `(bx, by)` relative to the pivot becomes `(-by, bx)`.
    #[must_use]
    pub fn rotated_cw(&self) -> Self {
        let (px2, py2) = self.pivot.doubled();
        Self {
            blocks: self.blocks.map(|b| {
                let (bx2, by2) = (2 * b.x - px2, 2 * b.y - py2);
                BlockPos::new((px2 - by2) / 2, (py2 + bx2) / 2)
            }),
            rotation: self.rotation.rotated_cw(),
            ..*self
        }
    }

    /// Rotates the blocks 90° counterclockwise around the pivot, without any kick.
    ///
    /// Block offset `(bx, by)` relative to the pivot becomes `(by, -bx)`.
    #[must_use]
    pub fn rotated_ccw(&self) -> Self {
        let (px2, py2) = self.pivot.doubled();
        Self {
            blocks: self.blocks.map(|b| {
                let (bx2, by2) = (2 * b.x - px2, 2 * b.y - py2);
                BlockPos::new((px2 + by2) / 2, (py2 - bx2) / 2)
            }),
            rotation: self.rotation.rotated_ccw(),
            ..*self
        }
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// J-piece.
    J = 1,
    /// L-piece.
    L = 2,
    /// O-piece.
    O = 3,
    /// S-piece.
    S = 4,
    /// T-piece.
    T = 5,
    /// Z-piece.
    Z = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// Every piece kind, in catalog order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Returns the immutable catalog entry for this kind.
    #[must_use]
    pub const fn shape(self) -> &'static PieceShape {
        &PIECE_SHAPES[self as usize]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// Catalog entry: the spawn-orientation block offsets and the doubled pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceShape {
    offsets: [(i8, i8); 4],
    pivot2: (i8, i8),
}

impl PieceShape {
    /// Block offsets in spawn orientation, relative to the shape origin.
    #[must_use]
    pub const fn offsets(&self) -> &[(i8, i8); 4] {
        &self.offsets
    }

    /// Width and height of the spawn-orientation bounding box.
    #[must_use]
    pub fn size(&self) -> (u8, u8) {
        let (min_x, min_y, max_x, max_y) = self.bounds();
        (max_x.abs_diff(min_x) + 1, max_y.abs_diff(min_y) + 1)
    }

    /// Block positions normalized to the top-left of the bounding box.
    pub fn normalized_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (min_x, min_y, _, _) = self.bounds();
        self.offsets.iter().map(move |&(dx, dy)| {
            (
                usize::from(dx.abs_diff(min_x)),
                usize::from(dy.abs_diff(min_y)),
            )
        })
    }

    fn bounds(&self) -> (i8, i8, i8, i8) {
        self.offsets.iter().fold(
            (i8::MAX, i8::MAX, i8::MIN, i8::MIN),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        )
    }
}

// Spawn orientations, y grows downward. The pivot is (0.5, 0.5) for I, (0.5, -0.5) for O and
// (0, 0) for the rest, stored doubled.
const PIECE_SHAPES: [PieceShape; PieceKind::LEN] = [
    // I-piece
    PieceShape {
        offsets: [(-1, 0), (0, 0), (1, 0), (2, 0)],
        pivot2: (1, 1),
    },
    // J-piece
    PieceShape {
        offsets: [(-1, -1), (-1, 0), (0, 0), (1, 0)],
        pivot2: (0, 0),
    },
    // L-piece
    PieceShape {
        offsets: [(1, -1), (-1, 0), (0, 0), (1, 0)],
        pivot2: (0, 0),
    },
    // O-piece
    PieceShape {
        offsets: [(0, -1), (1, -1), (0, 0), (1, 0)],
        pivot2: (1, -1),
    },
    // S-piece
    PieceShape {
        offsets: [(0, -1), (1, -1), (-1, 0), (0, 0)],
        pivot2: (0, 0),
    },
    // T-piece
    PieceShape {
        offsets: [(0, -1), (-1, 0), (0, 0), (1, 0)],
        pivot2: (0, 0),
    },
    // Z-piece
    PieceShape {
        offsets: [(-1, -1), (0, -1), (0, 0), (1, 0)],
        pivot2: (0, 0),
    },
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn block_set(piece: &Piece) -> HashSet<(i8, i8)> {
        piece.blocks().iter().map(|b| (b.x, b.y)).collect()
    }

    #[test]
    fn test_spawn_position() {
        let piece = Piece::spawned_at(PieceKind::T, 4, 3);
        assert_eq!(
            block_set(&piece),
            HashSet::from([(4, 2), (3, 3), (4, 3), (5, 3)])
        );
        assert_eq!(piece.pivot().doubled(), (8, 6));
        assert_eq!(piece.rotation(), PieceRotation::SPAWN);
    }

    #[test]
    fn test_rotate_t_clockwise() {
        let piece = Piece::spawned_at(PieceKind::T, 4, 3).rotated_cw();
        // Nub points right after one clockwise turn.
        assert_eq!(
            block_set(&piece),
            HashSet::from([(5, 3), (4, 2), (4, 3), (4, 4)])
        );
        assert_eq!(piece.rotation().index(), 1);
    }

    #[test]
    fn test_rotate_i_about_corner() {
        let piece = Piece::spawned_at(PieceKind::I, 4, 3);
        let rotated = piece.rotated_cw();
        assert_eq!(
            block_set(&rotated),
            HashSet::from([(5, 2), (5, 3), (5, 4), (5, 5)])
        );
        // Pivot is untouched by rotation.
        assert_eq!(rotated.pivot(), piece.pivot());
    }

    #[test]
    fn test_rotate_o_is_stable() {
        let piece = Piece::spawned_at(PieceKind::O, 4, 3);
        let mut rotated = piece;
        for _ in 0..4 {
            rotated = rotated.rotated_cw();
            assert_eq!(block_set(&rotated), block_set(&piece));
        }
    }

    #[test]
    fn test_cw_then_ccw_is_identity() {
        for kind in PieceKind::ALL {
            let piece = Piece::spawned_at(kind, 4, 5);
            let mut rotated = piece;
            for _ in 0..3 {
                rotated = rotated.rotated_cw();
            }
            for _ in 0..3 {
                rotated = rotated.rotated_ccw();
            }
            assert_eq!(rotated, piece, "{kind:?}");
        }
    }

    #[test]
    fn test_four_rotations_restore_shape() {
        for kind in PieceKind::ALL {
            let piece = Piece::spawned_at(kind, 4, 5);
            let mut rotated = piece;
            for _ in 0..4 {
                rotated = rotated.rotated_ccw();
            }
            assert_eq!(rotated, piece, "{kind:?}");
        }
    }

    #[test]
    fn test_shift_moves_pivot() {
        let piece = Piece::spawned_at(PieceKind::I, 4, 3);
        let shifted = piece.shifted(-2, 5);
        assert_eq!(shifted.pivot().doubled(), (9 - 4, 7 + 10));
        assert!((shifted.pivot().x() - 2.5).abs() < f32::EPSILON);
        assert!((shifted.pivot().y() - 8.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_shape_sizes() {
        assert_eq!(PieceKind::I.shape().size(), (4, 1));
        assert_eq!(PieceKind::O.shape().size(), (2, 2));
        assert_eq!(PieceKind::T.shape().size(), (3, 2));
        let cells: HashSet<_> = PieceKind::T.shape().normalized_cells().collect();
        assert_eq!(cells, HashSet::from([(1, 0), (0, 1), (1, 1), (2, 1)]));
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('x'), None);
    }

    #[test]
    fn test_piece_serialization() {
        let piece = Piece::spawned_at(PieceKind::S, 4, 3);
        let serialized = serde_json::to_string(&piece).unwrap();
        let deserialized: Piece = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, piece);
    }
}

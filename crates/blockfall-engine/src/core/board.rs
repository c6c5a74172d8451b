use std::fmt;

use serde::{Deserialize, Serialize};

use super::piece::{BlockPos, PieceKind};

#[expect(clippy::cast_possible_truncation)]
pub(super) const PIECE_SPAWN_X: i8 = (Board::WIDTH / 2) as i8 - 1;
pub(super) const PIECE_SPAWN_Y: i8 = 3;

/// A single board cell: `None` when empty, otherwise the kind of the piece that locked there.
pub type Cell = Option<PieceKind>;

type Row = [Cell; Board::WIDTH];

const EMPTY_ROW: Row = [None; Board::WIDTH];

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardParseError {
    #[display("expected at most {} rows, got {_0}", Board::HEIGHT)]
    TooManyRows(#[error(not(source))] usize),
    #[display("row {row} has {len} cells, expected {}", Board::WIDTH)]
    RowWidth { row: usize, len: usize },
    #[display("invalid cell {cell:?} at row {row}")]
    InvalidCell { row: usize, cell: char },
}

/// Fixed-size occupancy grid.
///
/// Rows are addressed top-to-bottom. The first [`Board::HIDDEN_ROWS`] rows are spawn space and
/// are not meant to be drawn. Positions above the board (`y < 0`) are always considered free,
/// which lets a piece spawn partially above the top edge.
///
/// # Example
///
/// ```
/// use blockfall_engine::{BlockPos, Board, PieceKind};
///
/// let mut board = Board::new();
/// let blocks = [0, 1, 2, 3].map(|x| BlockPos::new(x, 22));
/// assert!(board.can_place(blocks));
///
/// board.commit(blocks, PieceKind::I);
/// assert_eq!(board.at(0, 22), Some(PieceKind::I));
/// assert!(!board.can_place(blocks));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    rows: [Row; Board::HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const WIDTH: usize = 10;
    pub const HEIGHT: usize = 23;
    pub const HIDDEN_ROWS: usize = 1;
    pub const VISIBLE_HEIGHT: usize = Self::HEIGHT - Self::HIDDEN_ROWS;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: [EMPTY_ROW; Self::HEIGHT],
        }
    }

    /// Builds a board whose bottom rows are given as text, one string per row.
    ///
    /// `.` is an empty cell and a piece letter (`I`, `J`, `L`, `O`, `S`, `T`, `Z`) is a locked
    /// cell. The last string is the bottom row; rows above the given ones are empty.
    pub fn from_bottom_rows<S>(rows: &[S]) -> Result<Self, BoardParseError>
    where
        S: AsRef<str>,
    {
        if rows.len() > Self::HEIGHT {
            return Err(BoardParseError::TooManyRows(rows.len()));
        }
        let mut board = Self::new();
        let top = Self::HEIGHT - rows.len();
        for (i, text) in rows.iter().enumerate() {
            let row = top + i;
            let text = text.as_ref();
            let len = text.chars().count();
            if len != Self::WIDTH {
                return Err(BoardParseError::RowWidth { row, len });
            }
            for (x, cell) in text.chars().enumerate() {
                board.rows[row][x] = match cell {
                    '.' => None,
                    c => Some(
                        PieceKind::from_char(c)
                            .ok_or(BoardParseError::InvalidCell { row, cell })?,
                    ),
                };
            }
        }
        Ok(board)
    }

    /// Returns the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the board.
    #[must_use]
    pub fn at(&self, x: usize, y: usize) -> Cell {
        assert!(
            x < Self::WIDTH && y < Self::HEIGHT,
            "cell ({x}, {y}) is outside the board"
        );
        self.rows[y][x]
    }

    /// Returns whether all blocks are inside the side walls and floor and on empty cells.
    ///
    /// Blocks above the top edge (`y < 0`) are always allowed.
    #[must_use]
    pub fn can_place(&self, blocks: [BlockPos; 4]) -> bool {
        blocks.iter().all(|b| self.is_free(*b))
    }

    fn is_free(&self, pos: BlockPos) -> bool {
        let Ok(x) = usize::try_from(pos.x) else {
            return false;
        };
        if x >= Self::WIDTH {
            return false;
        }
        match usize::try_from(pos.y) {
            Ok(y) => y < Self::HEIGHT && self.rows[y][x].is_none(),
            Err(_) => true,
        }
    }

    /// Marks the blocks as occupied by `kind`.
    ///
    /// No validity check is made; call [`Self::can_place`] first. Blocks above the top edge are
    /// dropped.
    pub fn commit(&mut self, blocks: [BlockPos; 4], kind: PieceKind) {
        for pos in blocks {
            if let (Ok(x), Ok(y)) = (usize::try_from(pos.x), usize::try_from(pos.y)) {
                self.rows[y][x] = Some(kind);
            }
        }
    }

    /// Removes every full row and inserts an empty row at the top for each one.
    ///
    /// Rows are scanned top-to-bottom; each removal shifts the rows above it down by one.
    /// Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut count = 0;
        for y in 0..Self::HEIGHT {
            if self.rows[y].iter().all(Option::is_some) {
                self.rows.copy_within(0..y, 1);
                self.rows[0] = EMPTY_ROW;
                count += 1;
            }
        }
        count
    }

    /// Iterates over all rows, top to bottom, hidden rows included.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; Self::WIDTH]> {
        self.rows.iter()
    }

    /// Iterates over the rows meant to be drawn.
    pub fn visible_rows(&self) -> impl Iterator<Item = &[Cell; Self::WIDTH]> {
        self.rows[Self::HIDDEN_ROWS..].iter()
    }

    /// Number of occupied cells on the whole board.
    #[must_use]
    pub fn filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filled_cells() == 0
    }

    fn row_string(row: &Row) -> String {
        row.iter()
            .map(|cell| cell.map_or('.', PieceKind::as_char))
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", Self::row_string(row))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rows.iter().map(Self::row_string))
            .finish()
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: ["..........", "IIII......", ...], top row first
        serializer.collect_seq(self.rows.iter().map(Self::row_string))
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        if rows.len() != Self::HEIGHT {
            return Err(serde::de::Error::custom(format!(
                "expected {} rows, got {}",
                Self::HEIGHT,
                rows.len()
            )));
        }
        Self::from_bottom_rows(&rows).map_err(serde::de::Error::custom)
    }
}

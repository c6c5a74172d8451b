use std::iter;

use blockfall_engine::{ActivePiece, BlockPos, Board};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};

use crate::view::{Skin, Tile, widgets::BlockDisplay};

type TileRow = [Tile; Board::WIDTH];

/// The visible part of the board with the falling piece and its drop preview on top.
#[derive(Debug)]
pub(crate) struct BoardDisplay<'a> {
    board: &'a Board,
    ghost: Option<[BlockPos; 4]>,
    active: Option<ActivePiece>,
    skin: &'a dyn Skin,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub(crate) fn new(board: &'a Board, skin: &'a dyn Skin) -> Self {
        Self {
            board,
            ghost: None,
            active: None,
            skin,
            block: None,
        }
    }

    pub(crate) fn ghost(self, ghost: Option<[BlockPos; 4]>) -> Self {
        Self { ghost, ..self }
    }

    pub(crate) fn active(self, active: Option<ActivePiece>) -> Self {
        Self { active, ..self }
    }

    pub(crate) fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    #[expect(clippy::cast_possible_truncation)]
    pub(crate) fn width(&self) -> u16 {
        Board::WIDTH as u16 * BlockDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    #[expect(clippy::cast_possible_truncation)]
    pub(crate) fn height(&self) -> u16 {
        Board::VISIBLE_HEIGHT as u16 * BlockDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    /// Visible rows, top to bottom. The active piece is drawn over the ghost.
    pub(crate) fn tiles(&self) -> Vec<TileRow> {
        let mut rows: Vec<TileRow> = self
            .board
            .visible_rows()
            .map(|row| row.map(|cell| cell.map_or(Tile::Empty, Tile::Locked)))
            .collect();

        let mut paint = |blocks: [BlockPos; 4], tile: Tile| {
            for pos in blocks {
                let Ok(x) = usize::try_from(pos.x) else {
                    continue;
                };
                let Some(y) = usize::try_from(pos.y)
                    .ok()
                    .and_then(|y| y.checked_sub(Board::HIDDEN_ROWS))
                else {
                    continue;
                };
                if let Some(cell) = rows.get_mut(y).and_then(|row| row.get_mut(x)) {
                    *cell = tile;
                }
            }
        };
        if let Some(ghost) = self.ghost {
            paint(ghost, Tile::Ghost);
        }
        if let Some(active) = self.active {
            paint(active.blocks, Tile::Active(active.kind));
        }
        rows
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..Board::WIDTH).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints =
            (0..Board::VISIBLE_HEIGHT).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<{ Board::VISIBLE_HEIGHT }>(&vertical)
            .into_iter()
            .map(|row| row.layout::<{ Board::WIDTH }>(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.tiles()) {
            for (grid_cell, tile) in iter::zip(grid_row, row) {
                self.skin.tile(tile).render(grid_cell, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use blockfall_engine::{Piece, PieceKind};

    use super::*;
    use crate::view::SkinKind;

    #[test]
    fn test_tiles_layer_pieces_over_board() {
        let board = Board::from_bottom_rows(&["ZZ........"]).unwrap();
        let skin = SkinKind::Ascii.into_skin();
        let active = Piece::spawned_at(PieceKind::O, 4, 10);
        let ghost = active.shifted(0, 10);
        let display = BoardDisplay::new(&board, skin.as_ref())
            .active(Some(active.into()))
            .ghost(Some(ghost.blocks()));

        let tiles = display.tiles();
        assert_eq!(tiles.len(), Board::VISIBLE_HEIGHT);

        let bottom = tiles[Board::VISIBLE_HEIGHT - 1];
        assert_eq!(bottom[0], Tile::Locked(PieceKind::Z));
        assert_eq!(bottom[2], Tile::Empty);

        let count = |tile: Tile| tiles.iter().flatten().filter(|&&t| t == tile).count();
        assert_eq!(count(Tile::Active(PieceKind::O)), 4);
        assert_eq!(count(Tile::Ghost), 4);
        for pos in active.blocks() {
            let (x, y) = (pos.x as usize, pos.y as usize - Board::HIDDEN_ROWS);
            assert_eq!(tiles[y][x], Tile::Active(PieceKind::O));
        }
    }

    #[test]
    fn test_hidden_rows_are_not_drawn() {
        let board = Board::new();
        let skin = SkinKind::Ascii.into_skin();
        // Pivot row 0: every block sits in the hidden row or above the board.
        let piece = Piece::spawned_at(PieceKind::I, 4, 0);
        let display = BoardDisplay::new(&board, skin.as_ref()).active(Some(piece.into()));
        assert!(
            display
                .tiles()
                .iter()
                .flatten()
                .all(|&tile| tile == Tile::Empty)
        );
    }
}

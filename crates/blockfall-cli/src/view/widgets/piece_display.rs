use blockfall_engine::PieceKind;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::{Skin, Tile, widgets::BlockDisplay};

/// A single piece in spawn orientation, as shown in the hold and next panels.
#[derive(Debug)]
pub(crate) struct PieceDisplay<'a> {
    piece: Option<PieceKind>,
    dimmed: bool,
    skin: &'a dyn Skin,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub(crate) fn new(skin: &'a dyn Skin) -> Self {
        Self {
            piece: None,
            dimmed: false,
            skin,
            block: None,
        }
    }

    pub(crate) fn piece(self, piece: Option<PieceKind>) -> Self {
        Self { piece, ..self }
    }

    /// Draws the piece like a drop preview, e.g. when holding is not available.
    pub(crate) fn dimmed(self, dimmed: bool) -> Self {
        Self { dimmed, ..self }
    }

    pub(crate) fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub(crate) fn width(&self) -> u16 {
        4 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub(crate) fn height(&self) -> u16 {
        2 * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(piece) = self.piece else {
            return;
        };
        let shape = piece.shape();
        let (w, h) = shape.size();
        let (w, h) = (u16::from(w), u16::from(h));
        let piece_area = area.centered(
            Constraint::Length(w * BlockDisplay::width()),
            Constraint::Length(h * BlockDisplay::height()),
        );

        let col_constraints = (0..w).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints = (0..h).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);
        let grid_rows: Vec<Vec<Rect>> = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal))
            .collect();

        let tile = if self.dimmed {
            Tile::Ghost
        } else {
            Tile::Active(piece)
        };
        let block_display = self.skin.tile(tile);
        for (x, y) in shape.normalized_cells() {
            if let Some(cell) = grid_rows.get(y).and_then(|row| row.get(x)) {
                Widget::render(&block_display, *cell, buf);
            }
        }
    }
}

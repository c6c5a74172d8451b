use std::iter;

use blockfall_engine::PieceKind;
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::{
    Skin,
    widgets::{BlockDisplay, PieceDisplay},
};

#[derive(Debug)]
pub(crate) struct PieceStackDisplay<'a> {
    pieces: Vec<PieceKind>,
    /// Slots drawn even when fewer pieces are known, so the panel keeps its size.
    slots: usize,
    skin: &'a dyn Skin,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceStackDisplay<'a> {
    pub(crate) fn new<I>(pieces: I, slots: usize, skin: &'a dyn Skin) -> Self
    where
        I: IntoIterator<Item = PieceKind>,
    {
        Self {
            pieces: pieces.into_iter().take(slots).collect(),
            slots,
            skin,
            block: None,
        }
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
        let slots = u16::try_from(self.slots).unwrap_or(u16::MAX);
        let padding = slots.saturating_sub(1);
        (2 * BlockDisplay::height())
            .saturating_mul(slots)
            .saturating_add(padding)
            .saturating_add(super::block_vertical_margin(self.block.as_ref()))
    }
}

impl Widget for PieceStackDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceStackDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);
        let layout = Layout::vertical(
            (0..self.slots).map(|_| Constraint::Length(2 * BlockDisplay::height())),
        )
        .flex(Flex::SpaceBetween);
        let cells = area.layout_vec(&layout);

        for (cell, piece) in iter::zip(cells, &self.pieces) {
            PieceDisplay::new(self.skin)
                .piece(Some(*piece))
                .render(cell, buf);
        }
    }
}

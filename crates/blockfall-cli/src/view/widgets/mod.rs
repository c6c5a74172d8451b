use ratatui::{layout::Rect, widgets::Block as BlockWidget};

pub(crate) use self::{
    block_display::*, board_display::*, key_binding_display::*, piece_display::*,
    piece_stack_display::*, session_display::*, session_stats_display::*,
};

mod block_display;
mod board_display;
mod key_binding_display;
mod piece_display;
mod piece_stack_display;
mod session_display;
mod session_stats_display;

fn block_vertical_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.height - inner_rect.height
}

fn block_horizontal_margin(block: Option<&BlockWidget>) -> u16 {
    let dummy_rect = Rect::new(0, 0, 100, 100);
    let inner_rect = block.map_or(dummy_rect, |block| block.inner(dummy_rect));
    dummy_rect.width - inner_rect.width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_margins() {
        assert_eq!(block_vertical_margin(None), 0);
        assert_eq!(block_horizontal_margin(None), 0);

        let bordered = BlockWidget::bordered();
        assert_eq!(block_vertical_margin(Some(&bordered)), 2);
        assert_eq!(block_horizontal_margin(Some(&bordered)), 2);
    }
}

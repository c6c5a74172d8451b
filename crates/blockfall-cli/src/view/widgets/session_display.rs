use blockfall_engine::{GameSession, PlayState, PREVIEW_CAPACITY};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::view::{
    Skin,
    widgets::{BoardDisplay, PieceDisplay, PieceStackDisplay, SessionStatsDisplay},
};

/// The whole play screen: hold and stats on the left, board in the middle, queue on the right.
#[derive(Debug)]
pub(crate) struct SessionDisplay<'a> {
    session: &'a GameSession,
    skin: &'a dyn Skin,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> SessionDisplay<'a> {
    pub(crate) fn new(session: &'a GameSession, skin: &'a dyn Skin) -> Self {
        Self {
            session,
            skin,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }
}

fn popup_text(state: PlayState) -> Option<&'static str> {
    match state {
        PlayState::Waiting => Some("PRESS ENTER"),
        PlayState::Playing => None,
        PlayState::Paused => Some("PAUSED"),
        PlayState::GameOver => Some("GAME OVER!!"),
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let snapshot = self.session.snapshot();
        let skin = self.skin;
        let style = skin.text_style();
        let border_style = skin.border_style(snapshot.play_state);
        let block_padding = Padding::symmetric(self.horizontal_padding, self.vertical_padding);
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style)
        };

        let game_board = BoardDisplay::new(&snapshot.board, skin)
            .active(snapshot.active)
            .ghost(snapshot.drop_preview)
            .block(Block::bordered().border_style(border_style).style(style));
        let hold_panel = PieceDisplay::new(skin)
            .piece(snapshot.held)
            .dimmed(!snapshot.can_hold)
            .block(panel("HOLD"));
        let slots = self.session.config().preview_len.min(PREVIEW_CAPACITY);
        let piece_stack = PieceStackDisplay::new(snapshot.next.iter().copied(), slots, skin)
            .block(panel("NEXT"));
        let session_stats =
            SessionStatsDisplay::new(self.session.stats(), style).block(panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(u16::max(hold_panel.width(), session_stats.width())),
            Constraint::Length(game_board.width()),
            Constraint::Length(piece_stack.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [hold_area, stats_area] = Layout::vertical([
            Constraint::Length(hold_panel.height()),
            Constraint::Length(session_stats.height()),
        ])
        .spacing(1)
        .areas(left_column);
        let hold_area = hold_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(hold_panel.width())]).flex(Flex::End),
        )[0];
        let stats_area = stats_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(session_stats.width())]).flex(Flex::End),
        )[0];

        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);

        let game_board_width = game_board.width();
        hold_panel.render(hold_area, buf);
        session_stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        if slots > 0 {
            let [piece_stack_area] =
                Layout::vertical([Constraint::Length(piece_stack.height())]).areas(right_column);
            piece_stack.render(piece_stack_area, buf);
        }

        let popup = popup_text(snapshot.play_state).zip(skin.popup_style(snapshot.play_state));
        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area =
                board_area.centered(Constraint::Length(game_board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::view::SkinKind;

    fn render_to_string(session: &GameSession) -> String {
        let skin = SkinKind::Ascii.into_skin();
        let mut terminal = Terminal::new(TestBackend::new(80, 26)).unwrap();
        terminal
            .draw(|frame| {
                frame.render_widget(SessionDisplay::new(session, skin.as_ref()), frame.area());
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_popup_follows_play_state() {
        let mut session = GameSession::new();
        assert!(render_to_string(&session).contains("PRESS ENTER"));

        session.start_or_restart();
        let screen = render_to_string(&session);
        assert!(!screen.contains("PRESS ENTER"));
        assert!(screen.contains("[]"));
        assert!(screen.contains("NEXT"));

        session.toggle_pause().unwrap();
        assert!(render_to_string(&session).contains("PAUSED"));
    }
}

use blockfall_engine::PlayState;
use ratatui::{
    prelude::{Buffer, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Keys and the action they trigger, e.g. `(&["Z", "X"], "Rotate")`.
type KeyBinding = (&'static [&'static str], &'static str);

const WAITING: &[KeyBinding] = &[(&["Enter"], "Start"), (&["Q"], "Quit")];
const PLAYING: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["↑", "Space"], "Hard Drop"),
    (&["Z", "X"], "Rotate"),
    (&["C"], "Hold"),
    (&["P"], "Pause"),
    (&["Q"], "Quit"),
];
const PAUSED: &[KeyBinding] = &[(&["P"], "Resume"), (&["Q"], "Quit")];
const GAME_OVER: &[KeyBinding] = &[(&["Enter"], "Restart"), (&["Q"], "Quit")];

const KEY_STYLE: Style = Style::new().fg(Color::Cyan);
const SEPARATOR_STYLE: Style = Style::new().fg(Color::DarkGray);

/// One-line help for the keys that do something in the current play state.
#[derive(Debug)]
pub(crate) struct KeyBindingDisplay {
    bindings: &'static [KeyBinding],
}

impl KeyBindingDisplay {
    pub(crate) fn new(state: PlayState) -> Self {
        let bindings = match state {
            PlayState::Waiting => WAITING,
            PlayState::Playing => PLAYING,
            PlayState::Paused => PAUSED,
            PlayState::GameOver => GAME_OVER,
        };
        Self { bindings }
    }

    fn line(&self) -> Line<'static> {
        let items = self.bindings.iter().enumerate().flat_map(|(i, (keys, action))| {
            let separator = (i > 0).then(|| Span::styled(" | ", SEPARATOR_STYLE));
            let keys = keys.iter().enumerate().flat_map(|(j, key)| {
                [
                    (j > 0).then(|| Span::styled("/", SEPARATOR_STYLE)),
                    Some(Span::styled(*key, KEY_STYLE)),
                ]
            });
            separator
                .into_iter()
                .chain(keys.flatten())
                .chain([Span::raw(" "), Span::raw(*action)])
        });
        Line::from_iter(items).centered()
    }
}

impl Widget for KeyBindingDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.line().render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(state: PlayState) -> String {
        KeyBindingDisplay::new(state).line().to_string()
    }

    #[test]
    fn test_bindings_follow_play_state() {
        assert_eq!(text(PlayState::Waiting), "Enter Start | Q Quit");
        assert_eq!(text(PlayState::Paused), "P Resume | Q Quit");
        assert_eq!(text(PlayState::GameOver), "Enter Restart | Q Quit");
        assert!(text(PlayState::Playing).starts_with("←/→ Move | ↓ Soft Drop | ↑/Space Hard Drop"));
    }
}

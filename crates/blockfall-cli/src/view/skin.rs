use std::fmt;

use blockfall_engine::{PieceKind, PlayState};
use ratatui::style::{Color, Modifier, Style};

use crate::view::widgets::BlockDisplay;

/// What occupies one board cell on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tile {
    Empty,
    Locked(PieceKind),
    Ghost,
    Active(PieceKind),
}

/// Visual theme for the play screen.
pub(crate) trait Skin: fmt::Debug {
    fn tile(&self, tile: Tile) -> BlockDisplay;
    fn text_style(&self) -> Style;
    fn border_style(&self, state: PlayState) -> Style;
    /// Style of the overlay shown over the board, if the state has one.
    fn popup_style(&self, state: PlayState) -> Option<Style>;
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum SkinKind {
    /// Colored blocks (needs a true-color terminal)
    #[default]
    Color,
    /// Plain characters only
    Ascii,
}

impl SkinKind {
    pub(crate) fn into_skin(self) -> Box<dyn Skin> {
        match self {
            Self::Color => Box::new(ColorSkin),
            Self::Ascii => Box::new(AsciiSkin),
        }
    }
}

mod color {
    use ratatui::style::Color;

    pub const CYAN: Color = Color::Rgb(0, 255, 255);
    pub const YELLOW: Color = Color::Rgb(255, 255, 0);
    pub const GREEN: Color = Color::Rgb(0, 255, 0);
    pub const RED: Color = Color::Rgb(255, 0, 0);
    pub const BLUE: Color = Color::Rgb(0, 0, 255);
    pub const ORANGE: Color = Color::Rgb(255, 127, 0);
    pub const MAGENTA: Color = Color::Rgb(255, 0, 255);
    pub const GRAY: Color = Color::Rgb(127, 127, 127);
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
}

const fn fg_bg(fg: Color, bg: Color) -> Style {
    Style::new().fg(fg).bg(bg)
}

const fn bg_only(color: Color) -> Style {
    Style::new().fg(color).bg(color)
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ColorSkin;

impl ColorSkin {
    const DEFAULT: Style = fg_bg(color::WHITE, color::BLACK);
    const EMPTY_DOT: Style = fg_bg(color::GRAY, color::BLACK);
    const GHOST: Style = fg_bg(color::WHITE, color::BLACK);

    const fn piece_color(kind: PieceKind) -> Color {
        match kind {
            PieceKind::I => color::CYAN,
            PieceKind::O => color::YELLOW,
            PieceKind::S => color::GREEN,
            PieceKind::Z => color::RED,
            PieceKind::J => color::BLUE,
            PieceKind::L => color::ORANGE,
            PieceKind::T => color::MAGENTA,
        }
    }
}

impl Skin for ColorSkin {
    fn tile(&self, tile: Tile) -> BlockDisplay {
        match tile {
            Tile::Empty => BlockDisplay::new(Self::EMPTY_DOT, "."),
            Tile::Ghost => BlockDisplay::new(Self::GHOST, "[]"),
            Tile::Locked(kind) | Tile::Active(kind) => {
                BlockDisplay::new(bg_only(Self::piece_color(kind)), "")
            }
        }
    }

    fn text_style(&self) -> Style {
        Self::DEFAULT
    }

    fn border_style(&self, state: PlayState) -> Style {
        let fg = match state {
            PlayState::Waiting => color::GRAY,
            PlayState::Playing => color::WHITE,
            PlayState::Paused => color::YELLOW,
            PlayState::GameOver => color::RED,
        };
        Self::DEFAULT.fg(fg)
    }

    fn popup_style(&self, state: PlayState) -> Option<Style> {
        match state {
            PlayState::Playing => None,
            PlayState::Waiting => Some(fg_bg(color::BLACK, color::WHITE)),
            PlayState::Paused => Some(fg_bg(color::BLACK, color::YELLOW)),
            PlayState::GameOver => Some(fg_bg(color::WHITE, color::RED)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct AsciiSkin;

impl Skin for AsciiSkin {
    fn tile(&self, tile: Tile) -> BlockDisplay {
        let symbol = match tile {
            Tile::Empty => " .",
            Tile::Ghost => "::",
            Tile::Locked(_) => "##",
            Tile::Active(_) => "[]",
        };
        BlockDisplay::new(Style::new(), symbol)
    }

    fn text_style(&self) -> Style {
        Style::new()
    }

    fn border_style(&self, _state: PlayState) -> Style {
        Style::new()
    }

    fn popup_style(&self, state: PlayState) -> Option<Style> {
        (!state.is_playing()).then(|| Style::new().add_modifier(Modifier::REVERSED))
    }
}

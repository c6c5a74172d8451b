pub(crate) use self::skin::{Skin, SkinKind, Tile};

pub(crate) mod skin;
pub(crate) mod widgets;

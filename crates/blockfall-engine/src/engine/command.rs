use serde::{Deserialize, Serialize};

use super::session::LockReport;

/// Discrete input accepted by [`GameSession::apply`](super::GameSession::apply).
///
/// Parses from its variant name:
///
/// ```
/// use blockfall_engine::Command;
///
/// assert_eq!("HardDrop".parse::<Command>().unwrap(), Command::HardDrop);
/// assert!("Jump".parse::<Command>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::FromStr,
)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
    Hold,
    TogglePause,
    StartOrRestart,
}

impl Command {
    pub const ALL: [Self; 9] = [
        Self::MoveLeft,
        Self::MoveRight,
        Self::SoftDrop,
        Self::HardDrop,
        Self::RotateCw,
        Self::RotateCcw,
        Self::Hold,
        Self::TogglePause,
        Self::StartOrRestart,
    ];

    /// Commands that manipulate the falling piece.
    pub const PIECE_COMMANDS: [Self; 7] = [
        Self::MoveLeft,
        Self::MoveRight,
        Self::SoftDrop,
        Self::HardDrop,
        Self::RotateCw,
        Self::RotateCcw,
        Self::Hold,
    ];
}

/// What a command did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum CommandOutcome {
    /// The state changed and no piece locked.
    Applied,
    /// The falling piece locked.
    Locked(LockReport),
    /// The command was legal in this state but the board did not allow it.
    Rejected,
    /// The command does not apply in the current play state.
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_parses_from_its_name() {
        for command in Command::ALL {
            let name = format!("{command:?}");
            assert_eq!(name.parse::<Command>().unwrap(), command);
        }
    }

    #[test]
    fn test_command_serialization() {
        let json = serde_json::to_string(&Command::RotateCcw).unwrap();
        assert_eq!(json, "\"RotateCcw\"");
        let command: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(command, Command::RotateCcw);
    }
}

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::core::{
    board::Board,
    piece::{BlockPos, Piece, PieceKind},
};

use super::{
    piece_buffer::PieceBuffer,
    session::{GameSession, PlayState},
};

/// Most upcoming pieces a snapshot can carry.
pub const PREVIEW_CAPACITY: usize = PieceBuffer::MIN_QUEUE_LEN;

/// The falling piece as a renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub blocks: [BlockPos; 4],
}

impl From<Piece> for ActivePiece {
    fn from(piece: Piece) -> Self {
        Self {
            kind: piece.kind(),
            blocks: piece.blocks(),
        }
    }
}

/// Everything a front-end needs to draw one frame.
///
/// `active` and `drop_preview` are present only while a game is playing or paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: Board,
    pub active: Option<ActivePiece>,
    pub drop_preview: Option<[BlockPos; 4]>,
    pub next: ArrayVec<PieceKind, PREVIEW_CAPACITY>,
    pub held: Option<PieceKind>,
    pub can_hold: bool,
    pub score: u64,
    pub level: u32,
    pub total_lines: usize,
    pub tick_interval_ms: u64,
    pub play_state: PlayState,
}

impl GameSession {
    /// Captures the state a renderer needs.
    ///
    /// ```
    /// use blockfall_engine::{GameSession, PlayState};
    ///
    /// let mut session = GameSession::new();
    /// assert!(session.snapshot().active.is_none());
    ///
    /// session.start_or_restart();
    /// let snapshot = session.snapshot();
    /// assert_eq!(snapshot.play_state, PlayState::Playing);
    /// assert_eq!(snapshot.next.len(), 3);
    /// assert_eq!(snapshot.tick_interval_ms, 1000);
    /// ```
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let drop_preview = self.drop_preview();
        GameSnapshot {
            board: self.board().clone(),
            active: drop_preview.map(|_| self.falling_piece().into()),
            drop_preview: drop_preview.map(|piece| piece.blocks()),
            next: self.next_pieces().take(PREVIEW_CAPACITY).collect(),
            held: self.held_piece(),
            can_hold: self.can_hold(),
            score: self.score(),
            level: self.level(),
            total_lines: self.stats().total_cleared_lines(),
            tick_interval_ms: u64::try_from(self.tick_interval().as_millis()).unwrap_or(u64::MAX),
            play_state: self.play_state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameConfig, PieceSeed};

    fn session() -> GameSession {
        GameSession::with_config(GameConfig {
            seed: Some(PieceSeed::from_bytes([5; 16])),
            ..GameConfig::default()
        })
    }

    #[test]
    fn test_snapshot_tracks_session() {
        let mut session = session();
        session.start_or_restart();
        session.try_hold().unwrap();

        let snapshot = session.snapshot();
        let active = snapshot.active.unwrap();
        assert_eq!(active, ActivePiece::from(session.falling_piece()));
        assert_eq!(snapshot.held, session.held_piece());
        assert!(!snapshot.can_hold);
        assert_eq!(
            snapshot.next.as_slice(),
            session.next_pieces().collect::<Vec<_>>()
        );
        assert_eq!(
            snapshot.drop_preview,
            session.drop_preview().map(|p| p.blocks())
        );
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut session = session();
        session.start_or_restart();
        session.hard_drop().unwrap();

        let snapshot = session.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.board.filled_cells(), 4);
    }
}

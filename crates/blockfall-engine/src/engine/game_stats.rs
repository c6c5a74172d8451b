use serde::{Deserialize, Serialize};

/// Base points for a single-line clear. An `n`-line clear is worth `2^(n-1)` times this.
const LINE_CLEAR_BASE_SCORE: u64 = 100;

/// Score, level and lock statistics of a game.
///
/// The level grows by a tenth per cleared line and is stored exactly, as a count of tenths.
/// Line clear points are multiplied by the whole level at the time of the clear, plus one.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// assert_eq!(stats.complete_piece_drop(4), 800);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.level_tenths(), 4);
/// assert_eq!(stats.level(), 0);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: u64,
    level_tenths: u32,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            level_tenths: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Returns the whole part of the level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level_tenths / 10
    }

    /// Returns the exact level in tenths: `13` means level 1.3.
    #[must_use]
    pub const fn level_tenths(&self) -> u32 {
        self.level_tenths
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by number of cleared lines.
    ///
    /// Index `n` counts the locks that cleared `n` lines, `[0]` counting locks with no clear.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Returns the points a clear of `cleared_lines` would earn at the current level.
    #[must_use]
    pub fn line_clear_score(&self, cleared_lines: usize) -> u64 {
        if cleared_lines == 0 {
            return 0;
        }
        let multiplier = 1_u64 << (cleared_lines - 1).min(63);
        multiplier * LINE_CLEAR_BASE_SCORE * (u64::from(self.level()) + 1)
    }

    /// Adds points earned by dropping a piece.
    pub const fn add_drop_score(&mut self, points: u64) {
        self.score += points;
    }

    /// Updates statistics after a piece locks, returning the line clear points earned.
    ///
    /// Points are computed at the level before the clear; the level then grows by a tenth per
    /// cleared line.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) -> u64 {
        let points = self.line_clear_score(cleared_lines);
        self.score += points;
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if let Some(count) = self.line_cleared_counter.get_mut(cleared_lines) {
            *count += 1;
        }
        self.level_tenths += u32::try_from(cleared_lines).unwrap_or(u32::MAX);
        points
    }
}

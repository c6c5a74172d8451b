use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Bag randomizer producing an endless, fair stream of piece kinds.
///
/// Each refill appends one shuffled permutation of all seven kinds. The queue is refilled as soon
/// as fewer than [`PieceBuffer::MIN_QUEUE_LEN`] pieces remain, so within every aligned group of
/// seven draws each kind appears exactly once.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceKind, engine::PieceBuffer};
///
/// let mut buffer = PieceBuffer::new();
///
/// let first = buffer.pop_next();
/// let upcoming: Vec<_> = buffer.next_pieces().take(3).collect();
/// assert_eq!(upcoming.len(), 3);
/// // The first four draws come from one bag, so they are all different.
/// assert!(!upcoming.contains(&first));
/// ```
#[derive(Debug, Clone)]
pub struct PieceBuffer {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the bag shuffler. The same seed always yields the same piece sequence.
/// It is written as a 32-character hexadecimal string, both by [`fmt::Display`] and by serde.
///
/// # Example
///
/// ```
/// use blockfall_engine::PieceSeed;
///
/// let seed: PieceSeed = "0123456789abcdef0123456789abcdef".parse().unwrap();
/// assert_eq!(seed.to_string(), "0123456789abcdef0123456789abcdef");
///
/// assert!("xyz".parse::<PieceSeed>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    const HEX_LEN: usize = 32;

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParsePieceSeedError {
    #[display("invalid hex: expected {} characters, got {_0}", PieceSeed::HEX_LEN)]
    InvalidLength(#[error(not(source))] usize),
    #[display("invalid hex: {_0:?}")]
    InvalidDigit(#[error(not(source))] String),
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN {
            return Err(ParsePieceSeedError::InvalidLength(s.len()));
        }
        // `from_str_radix` accepts a leading sign, which is not a hex digit.
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParsePieceSeedError::InvalidDigit(s.to_owned()));
        }
        let num = u128::from_str_radix(s, 16)
            .map_err(|_| ParsePieceSeedError::InvalidDigit(s.to_owned()))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBuffer {
    /// The queue never holds fewer pieces than this between draws.
    pub const MIN_QUEUE_LEN: usize = 3;

    /// Creates a piece buffer with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let bag = VecDeque::with_capacity(PieceKind::LEN + Self::MIN_QUEUE_LEN);
        let mut this = Self { rng, bag };
        this.refill();
        this
    }

    /// Appends one shuffled permutation of all seven kinds.
    fn refill(&mut self) {
        let mut new_bag = PieceKind::ALL;
        new_bag.shuffle(&mut self.rng);
        self.bag.extend(new_bag);
    }

    /// Draws the next piece, refilling the queue when it runs low.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty, which the refill rule rules out.
    pub fn pop_next(&mut self) -> PieceKind {
        let next = self
            .bag
            .pop_front()
            .expect("piece queue should never be empty");
        if self.bag.len() < Self::MIN_QUEUE_LEN {
            self.refill();
        }
        next
    }

    /// Returns an iterator over the upcoming pieces, nearest first.
    ///
    /// The iterator always yields at least [`Self::MIN_QUEUE_LEN`] pieces.
    pub fn next_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }

    /// Returns the piece [`Self::pop_next`] would return.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.bag[0]
    }

    /// Number of pieces currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bag.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bag.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn seed_from_bytes(bytes: [u8; 16]) -> PieceSeed {
        PieceSeed(bytes)
    }

    #[test]
    fn test_new_buffer_holds_one_bag() {
        let buffer = PieceBuffer::new();
        assert_eq!(buffer.len(), PieceKind::LEN);
        let kinds: HashSet<_> = buffer.next_pieces().collect();
        assert_eq!(kinds.len(), PieceKind::LEN);
    }

    #[test]
    fn test_refill_happens_below_three() {
        let mut buffer = PieceBuffer::with_seed(seed_from_bytes([7; 16]));
        for _ in 0..4 {
            buffer.pop_next();
        }
        assert_eq!(buffer.len(), 3);
        buffer.pop_next();
        assert_eq!(buffer.len(), 2 + PieceKind::LEN);
    }

    #[test]
    fn test_queue_never_drops_below_minimum() {
        let mut buffer = PieceBuffer::new();
        for _ in 0..500 {
            buffer.pop_next();
            assert!(buffer.len() >= PieceBuffer::MIN_QUEUE_LEN);
        }
    }

    #[test]
    fn test_every_bag_is_a_permutation() {
        let mut buffer = PieceBuffer::new();
        for _ in 0..50 {
            let bag: HashSet<_> = (0..PieceKind::LEN).map(|_| buffer.pop_next()).collect();
            assert_eq!(bag.len(), PieceKind::LEN);
        }
    }

    #[test]
    fn test_peek_matches_pop() {
        let mut buffer = PieceBuffer::new();
        for _ in 0..20 {
            let peeked = buffer.peek_next();
            assert_eq!(buffer.pop_next(), peeked);
        }
    }

    #[test]
    fn test_deterministic_piece_generation() {
        let seed = seed_from_bytes([
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ]);

        let mut buffer1 = PieceBuffer::with_seed(seed);
        let mut buffer2 = PieceBuffer::with_seed(seed);

        for _ in 0..30 {
            assert_eq!(buffer1.pop_next(), buffer2.pop_next());
        }
    }

    mod piece_seed {
        use super::*;

        #[test]
        fn test_format_is_32_char_hex_string() {
            let seed: PieceSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let hex_str = serialized.trim_matches('"');
            assert_eq!(hex_str.len(), 32);
            assert!(hex_str.chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn test_known_value_sequential_bytes() {
            let seed = seed_from_bytes([
                0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
                0x32, 0x10,
            ]);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");

            let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(deserialized, seed);
        }

        #[test]
        fn test_parse_uppercase_hex() {
            let seed: PieceSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
            assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
        }

        #[test]
        fn test_parse_errors() {
            assert_eq!(
                "0123".parse::<PieceSeed>(),
                Err(ParsePieceSeedError::InvalidLength(4))
            );
            assert!(matches!(
                "ghijklmnopqrstuvwxyzghijklmnopqr".parse::<PieceSeed>(),
                Err(ParsePieceSeedError::InvalidDigit(_))
            ));
            assert!(matches!(
                "+123456789abcdef0123456789abcdef".parse::<PieceSeed>(),
                Err(ParsePieceSeedError::InvalidDigit(_))
            ));
        }

        #[test]
        fn test_deserialize_error_message() {
            let result: Result<PieceSeed, _> = serde_json::from_str("\"\"");
            let err_msg = result.unwrap_err().to_string();
            assert!(err_msg.contains("invalid hex"));
        }
    }
}

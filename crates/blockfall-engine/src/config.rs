use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{PieceBuffer, PieceSeed};

/// Settings for a [`GameSession`](crate::GameSession).
///
/// Every field has a default, so a partial JSON document is a valid configuration:
///
/// ```
/// use blockfall_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "preview_len": 2 }"#).unwrap();
/// assert_eq!(config.preview_len, 2);
/// assert_eq!(config.gravity.base_interval_ms, 1000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the piece sequence. A random seed is drawn when absent.
    pub seed: Option<PieceSeed>,
    pub gravity: GravityConfig,
    /// Number of upcoming pieces exposed in snapshots.
    pub preview_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            gravity: GravityConfig::default(),
            preview_len: PieceBuffer::MIN_QUEUE_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("preview_len must be between 0 and {}, got {_0}", PieceBuffer::MIN_QUEUE_LEN)]
    PreviewTooLong(#[error(not(source))] usize),
    #[display("gravity.min_interval_ms must be positive")]
    ZeroMinInterval,
    #[display("gravity.min_interval_ms ({min}) exceeds gravity.base_interval_ms ({base})")]
    MinAboveBase { min: u64, base: u64 },
}

impl GameConfig {
    /// Checks the values serde cannot check by itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview_len > PieceBuffer::MIN_QUEUE_LEN {
            return Err(ConfigError::PreviewTooLong(self.preview_len));
        }
        self.gravity.validate()
    }
}

/// Tick interval as a function of level: `max(min, base - floor(level) * step)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    pub base_interval_ms: u64,
    pub step_ms: u64,
    pub min_interval_ms: u64,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 1000,
            step_ms: 100,
            min_interval_ms: 100,
        }
    }
}

impl GravityConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval_ms == 0 {
            return Err(ConfigError::ZeroMinInterval);
        }
        if self.min_interval_ms > self.base_interval_ms {
            return Err(ConfigError::MinAboveBase {
                min: self.min_interval_ms,
                base: self.base_interval_ms,
            });
        }
        Ok(())
    }

    /// Returns the tick interval for the given whole level.
    #[must_use]
    pub fn interval_for(&self, level: u32) -> Duration {
        let millis = self
            .base_interval_ms
            .saturating_sub(u64::from(level).saturating_mul(self.step_ms))
            .max(self.min_interval_ms);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gravity_curve() {
        let gravity = GravityConfig::default();
        assert_eq!(gravity.interval_for(0), Duration::from_millis(1000));
        assert_eq!(gravity.interval_for(1), Duration::from_millis(900));
        assert_eq!(gravity.interval_for(8), Duration::from_millis(200));
        assert_eq!(gravity.interval_for(9), Duration::from_millis(100));
        assert_eq!(gravity.interval_for(10), Duration::from_millis(100));
        assert_eq!(gravity.interval_for(u32::MAX), Duration::from_millis(100));
    }

    #[test]
    fn test_empty_document_is_default() {
        let config: GameConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_seed_and_partial_gravity() {
        let config: GameConfig = serde_json::from_str(
            r#"{
                "seed": "000000000000000000000000000000ff",
                "gravity": { "step_ms": 50 }
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.seed,
            Some("000000000000000000000000000000ff".parse().unwrap())
        );
        assert_eq!(config.gravity.step_ms, 50);
        assert_eq!(config.gravity.base_interval_ms, 1000);
        assert_eq!(config.gravity.interval_for(2), Duration::from_millis(900));
    }

    #[test]
    fn test_validate() {
        let mut config = GameConfig {
            preview_len: 4,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PreviewTooLong(4)));

        config.preview_len = 0;
        assert_eq!(config.validate(), Ok(()));

        config.gravity.min_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinInterval));

        config.gravity.min_interval_ms = 2000;
        assert_eq!(
            config.validate(),
            Err(ConfigError::MinAboveBase {
                min: 2000,
                base: 1000
            })
        );
    }
}

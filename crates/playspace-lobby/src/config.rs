//! Player limits and countdown lengths for a waiting lobby.

use playspace_tick::seconds_to_ticks;
use serde::{Deserialize, Serialize};

use crate::LobbyError;

// ---------------------------------------------------------------------------
// CountdownConfig
// ---------------------------------------------------------------------------

/// How long the lobby counts down before starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Countdown once the readiness threshold is reached.
    pub ready_seconds: u32,
    /// Countdown once the lobby is full.
    pub full_seconds: u32,
}

impl CountdownConfig {
    pub fn ready_ticks(&self) -> u64 {
        seconds_to_ticks(self.ready_seconds)
    }

    pub fn full_ticks(&self) -> u64 {
        seconds_to_ticks(self.full_seconds)
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            ready_seconds: 30,
            full_seconds: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerConfig
// ---------------------------------------------------------------------------

/// Player limits for a game, validated on construction and on decode.
///
/// In documents this reads as:
///
/// ```json
/// { "min": 2, "max": 8, "threshold": 4,
///   "countdown": { "ready_seconds": 30, "full_seconds": 5 } }
/// ```
///
/// `threshold` defaults to `min` and `countdown` to 30 s / 5 s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPlayerConfig", into = "RawPlayerConfig")]
pub struct PlayerConfig {
    min_players: usize,
    max_players: usize,
    threshold_players: usize,
    countdown: CountdownConfig,
}

impl PlayerConfig {
    pub fn new(min_players: usize, max_players: usize) -> Result<Self, LobbyError> {
        if min_players < 1 {
            return Err(LobbyError::NoMinimum);
        }
        if max_players < min_players {
            return Err(LobbyError::MaxBelowMin {
                min: min_players,
                max: max_players,
            });
        }
        Ok(Self {
            min_players,
            max_players,
            threshold_players: min_players,
            countdown: CountdownConfig::default(),
        })
    }

    /// Sets the player count at which the "ready" countdown begins.
    pub fn with_threshold(mut self, threshold_players: usize) -> Self {
        self.threshold_players = threshold_players;
        self
    }

    pub fn with_countdown(mut self, countdown: CountdownConfig) -> Self {
        self.countdown = countdown;
        self
    }

    pub fn min_players(&self) -> usize {
        self.min_players
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn threshold_players(&self) -> usize {
        self.threshold_players
    }

    pub fn countdown(&self) -> &CountdownConfig {
        &self.countdown
    }
}

/// Document form of [`PlayerConfig`].
#[derive(Serialize, Deserialize)]
struct RawPlayerConfig {
    min: usize,
    max: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    threshold: Option<usize>,
    #[serde(default)]
    countdown: CountdownConfig,
}

impl TryFrom<RawPlayerConfig> for PlayerConfig {
    type Error = LobbyError;

    fn try_from(raw: RawPlayerConfig) -> Result<Self, Self::Error> {
        let config = Self::new(raw.min, raw.max)?.with_countdown(raw.countdown);
        Ok(match raw.threshold {
            Some(threshold) => config.with_threshold(threshold),
            None => config,
        })
    }
}

impl From<PlayerConfig> for RawPlayerConfig {
    fn from(config: PlayerConfig) -> Self {
        Self {
            min: config.min_players,
            max: config.max_players,
            threshold: (config.threshold_players != config.min_players)
                .then_some(config.threshold_players),
            countdown: config.countdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::new(2, 8).unwrap();
        assert_eq!(config.threshold_players(), 2);
        assert_eq!(config.countdown().ready_ticks(), 600);
        assert_eq!(config.countdown().full_ticks(), 100);
    }

    #[test]
    fn test_rejects_zero_minimum() {
        assert_eq!(PlayerConfig::new(0, 8), Err(LobbyError::NoMinimum));
    }

    #[test]
    fn test_rejects_max_below_min() {
        assert_eq!(
            PlayerConfig::new(4, 2),
            Err(LobbyError::MaxBelowMin { min: 4, max: 2 })
        );
    }

    #[test]
    fn test_decode_full_document() {
        let config: PlayerConfig = serde_json::from_value(json!({
            "min": 2,
            "max": 8,
            "threshold": 4,
            "countdown": { "ready_seconds": 30, "full_seconds": 10 }
        }))
        .unwrap();
        assert_eq!(config.min_players(), 2);
        assert_eq!(config.max_players(), 8);
        assert_eq!(config.threshold_players(), 4);
        assert_eq!(config.countdown().full_ticks(), 200);
    }

    #[test]
    fn test_decode_partial_countdown() {
        let config: PlayerConfig = serde_json::from_value(json!({
            "min": 1,
            "max": 4,
            "countdown": { "full_seconds": 2 }
        }))
        .unwrap();
        assert_eq!(config.threshold_players(), 1);
        assert_eq!(config.countdown().ready_seconds, 30);
        assert_eq!(config.countdown().full_seconds, 2);
    }

    #[test]
    fn test_decode_invalid_limits_fails() {
        let err = serde_json::from_value::<PlayerConfig>(json!({ "min": 5, "max": 3 }))
            .unwrap_err();
        assert!(err.to_string().contains("must not be below"));
    }

    #[test]
    fn test_encode_omits_default_threshold() {
        let value = serde_json::to_value(PlayerConfig::new(2, 8).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "min": 2,
                "max": 8,
                "countdown": { "ready_seconds": 30, "full_seconds": 5 }
            })
        );
    }
}

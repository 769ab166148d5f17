//! Error types for opening games.

use playspace_config::{ConfigError, Text};
use playspace_space::SpaceError;

/// A boxed error from game-type code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while opening a configured game.
///
/// Only [`OpenError::Rejected`] is *expected*: the game type raised it on
/// purpose and its text is meant for players. Every other variant is a bug
/// or an environment problem and gets a diagnostic report.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The game type refused to open, with a player-facing reason.
    #[error("{0}")]
    Rejected(Text),

    /// The setup task panicked or was cancelled.
    #[error("game setup task failed: {0}")]
    Setup(#[from] tokio::task::JoinError),

    /// The space could not be reached while opening.
    #[error(transparent)]
    Space(#[from] SpaceError),

    /// A config value could not be read while opening.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Anything else raised by game-type code.
    #[error("{0}")]
    Other(BoxError),
}

impl OpenError {
    /// An expected, player-facing failure.
    pub fn rejected(reason: Text) -> Self {
        Self::Rejected(reason)
    }

    /// Wraps an arbitrary error from game-type code.
    pub fn other(error: impl Into<BoxError>) -> Self {
        Self::Other(error.into())
    }

    /// Returns `true` for failures already meant for players.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// The player-facing reason, if this is an expected failure.
    pub fn rejection(&self) -> Option<&Text> {
        match self {
            Self::Rejected(text) => Some(text),
            _ => None,
        }
    }
}

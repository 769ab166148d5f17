//! Unified error type for Playspace.

use playspace_config::ConfigError;
use playspace_game::OpenError;
use playspace_lobby::LobbyError;
use playspace_space::SpaceError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PlayspaceError {
    /// A document or config could not be decoded or encoded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A game failed to open.
    #[error(transparent)]
    Open(#[from] OpenError),

    /// A running space could not be reached.
    #[error(transparent)]
    Space(#[from] SpaceError),

    /// Lobby limits are invalid.
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

impl PlayspaceError {
    /// Returns `true` for failures whose message is meant for players.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Open(err) if err.is_expected())
    }
}

//! Error types for the lobby layer.

/// Errors that can occur while building lobby configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// A lobby needs at least one player to ever start.
    #[error("minimum players must be at least 1")]
    NoMinimum,

    /// The player limits contradict each other.
    #[error("maximum players ({max}) must not be below minimum players ({min})")]
    MaxBelowMin { min: usize, max: usize },
}

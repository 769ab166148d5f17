//! Error types for the space layer.

use crate::{PlayerId, SpaceId};

/// Errors that can occur when talking to a game space.
#[derive(Debug, thiserror::Error)]
pub enum SpaceError {
    /// The player is not in this space.
    #[error("player {0} not in space {1}")]
    NotInSpace(PlayerId, SpaceId),

    /// The space's command channel is closed (the space was closed).
    #[error("space {0} is unavailable")]
    Unavailable(SpaceId),
}

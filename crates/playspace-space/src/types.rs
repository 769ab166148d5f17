//! Identity, result, and notice types used by game spaces.

use std::fmt;

use playspace_config::{Identifier, Text};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for an open game space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(pub u64);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Answer to a player asking to join a space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinResult {
    Ok,
    /// No room left for another player.
    SpaceFull,
    /// The player is already in the space.
    AlreadyJoined,
    /// Rejected for a listener-specific reason.
    Error(Text),
}

impl JoinResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Player-facing reason for a rejection.
    pub fn error(&self) -> Option<Text> {
        match self {
            Self::Ok => None,
            Self::SpaceFull => Some(Text::translatable("text.playspace.join_result.space_full")),
            Self::AlreadyJoined => {
                Some(Text::translatable("text.playspace.join_result.already_joined"))
            }
            Self::Error(text) => Some(text.clone()),
        }
    }
}

/// Answer to a request to start a space's game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartResult {
    Ok,
    AlreadyStarted,
    NotEnoughPlayers,
    Error(Text),
}

impl StartResult {
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::Ok)
    }

    /// Player-facing reason for a failed start.
    pub fn error(&self) -> Option<Text> {
        match self {
            Self::Ok => None,
            Self::AlreadyStarted => {
                Some(Text::translatable("text.playspace.start_result.already_started"))
            }
            Self::NotEnoughPlayers => {
                Some(Text::translatable("text.playspace.start_result.not_enough_players"))
            }
            Self::Error(text) => Some(text.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// StartTicket
// ---------------------------------------------------------------------------

/// Where a [`StartTicket`] stands when polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketState {
    /// The space has not answered yet.
    Pending,
    /// The space answered.
    Ready(StartResult),
    /// The space went away without answering.
    Abandoned,
}

/// A start request made from inside a listener callback.
///
/// The space answers it after the current callback returns, so the
/// listener polls the ticket on a later tick instead of blocking the
/// space's own task.
#[derive(Debug)]
pub struct StartTicket {
    receiver: oneshot::Receiver<StartResult>,
}

impl StartTicket {
    /// A ticket and the sender that resolves it.
    pub fn channel() -> (oneshot::Sender<StartResult>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { receiver: rx })
    }

    /// Checks for an answer without waiting.
    pub fn poll_state(&mut self) -> TicketState {
        match self.receiver.try_recv() {
            Ok(result) => TicketState::Ready(result),
            Err(oneshot::error::TryRecvError::Empty) => TicketState::Pending,
            Err(oneshot::error::TryRecvError::Closed) => TicketState::Abandoned,
        }
    }
}

// ---------------------------------------------------------------------------
// Player notices
// ---------------------------------------------------------------------------

/// A sound played to players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub sound: Identifier,
    pub volume: f32,
    pub pitch: f32,
}

/// Something a space shows or plays to its players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerNotice {
    /// A chat line.
    Message { text: Text },
    /// A chat line shown as an error.
    Alert { text: Text },
    /// Progress bar state; `progress` is in `0.0..=1.0`.
    Bar { title: Text, progress: f32 },
    Sound(SoundCue),
}

/// Channel sender for delivering notices to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<PlayerNotice>;

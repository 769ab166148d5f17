//! Waiting lobby for Playspace game spaces.
//!
//! A [`WaitingLobby`] holds players in a space until enough of them have
//! joined, runs a countdown whose length depends on how full the lobby is,
//! and then asks the space to start.
//!
//! ```text
//! Idle ──enough players──▶ CountingDown ──countdown ends──▶ Started
//!   ▲                          │
//!   └──players leave───────────┘
//!
//! any ──start requested──▶ StartRequestedCountdown ──ends──▶ Started
//! ```
//!
//! A start that the space refuses rolls the lobby back to `Idle`.

mod config;
mod countdown;
mod error;
mod lobby;

pub use config::{CountdownConfig, PlayerConfig};
pub use countdown::{Countdown, rebase};
pub use error::LobbyError;
pub use lobby::{LobbyPhase, START_REQUESTED_COUNTDOWN, WaitingLobby};

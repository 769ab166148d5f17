//! # Playspace
//!
//! Configurable game sessions with waiting lobbies.
//!
//! Game types are registered once at startup. Each one knows how to decode
//! its own config from a game document and how to open a running space
//! from it. A [`WaitingLobby`](playspace_lobby::WaitingLobby) can be
//! installed on a space to hold players until enough have joined.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playspace::prelude::*;
//!
//! // let mut builder = Playspace::builder();
//! // builder.register(GameType::new(id, ConfigCodec::inline(), open_my_game))?;
//! // let playspace = builder.build();
//! // let space = playspace.open_document(&document).await?;
//! ```

mod builder;
mod error;
pub mod logging;

pub use builder::{Playspace, PlayspaceBuilder};
pub use error::PlayspaceError;

pub use playspace_config as config;
pub use playspace_game as game;
pub use playspace_lobby as lobby;
pub use playspace_space as space;
pub use playspace_tick as tick;

/// Commonly used types, importable with `use playspace::prelude::*`.
pub mod prelude {
    pub use crate::{Playspace, PlayspaceBuilder, PlayspaceError};
    pub use playspace_config::{ConfigCodec, ConfigError, Identifier, Text};
    pub use playspace_game::{
        AnyConfiguredGame, ConfiguredGame, ConfiguredGameCodec, GameType, OpenContext, OpenError,
        OpenProcedure,
    };
    pub use playspace_lobby::{CountdownConfig, LobbyPhase, PlayerConfig, WaitingLobby};
    pub use playspace_space::{
        GameActivity, GameHost, GameRule, HostHandle, JoinResult, LocalHost, ManagedGameSpace,
        PlayerId, PlayerNotice, RuleResult, SpaceListener, SpaceSettings, SpaceView, StartResult,
    };
    pub use playspace_tick::TickConfig;
}

//! Game types, configured games, and the open pipeline for Playspace.
//!
//! ```text
//! document ──ConfiguredGameCodec──▶ AnyConfiguredGame ──open──▶ ManagedGameSpace
//!                  ▲                         │
//!          GameTypeRegistry          (setup on blocking pool,
//!                                     then the type's own future)
//! ```
//!
//! # Key types
//!
//! - [`GameType`]: a registered kind of game: id, display name, config
//!   codec, and open function
//! - [`GameTypeRegistry`]: id → game type, frozen after startup
//! - [`ConfiguredGame`]: a game type paired with a decoded config
//! - [`AnyConfiguredGame`]: the same, with the config type erased
//! - [`ConfiguredGameCodec`]: document ⇄ [`AnyConfiguredGame`]
//! - [`OpenProcedure`]: the deferred work that produces a running space

mod codec;
mod configured;
mod error;
mod game_type;
mod open;
mod registry;
mod report;

pub use codec::{CUSTOM_KEY, ConfiguredGameCodec, NAME_KEY, TRANSLATION_KEY, TYPE_KEY};
pub use configured::{AnyConfiguredGame, ConfiguredGame, GameMetadata};
pub use error::{BoxError, OpenError};
pub use game_type::{DynGameType, GameType};
pub use open::{OpenContext, OpenProcedure};
pub use registry::{GameTypeRegistry, RegistryBuilder};
pub use report::ErrorReporter;

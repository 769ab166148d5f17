//! Configuration primitives for Playspace.
//!
//! This crate defines the vocabulary that game configuration documents are
//! written in:
//!
//! - **Types** ([`Identifier`], [`Text`]): namespaced ids and display text.
//! - **Codec** ([`ConfigCodec`], [`CodecShape`]): how a game type's typed
//!   config is read from and written to a structured document.
//! - **Errors** ([`ConfigError`]): what can go wrong while doing so.
//!
//! Documents are plain [`serde_json::Value`]s. The crate knows nothing about
//! game types or spaces; it only knows how to turn values into typed data.

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::{CONFIG_KEY, CodecShape, ConfigCodec, GameConfig};
pub use error::ConfigError;
pub use types::{Identifier, Text};

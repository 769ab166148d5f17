//! Configured games: a game type paired with its decoded config.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use playspace_config::{ConfigError, GameConfig, Identifier, Text};
use playspace_space::{HostHandle, ManagedGameSpace};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::codec::encode_game;
use crate::{GameType, OpenError};

// ---------------------------------------------------------------------------
// GameMetadata
// ---------------------------------------------------------------------------

/// The config-independent part of a configured game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameMetadata {
    /// The named document this game was loaded from, if any.
    pub source: Option<Identifier>,
    /// Literal display name.
    pub name: Option<String>,
    /// Translation key for the display name.
    pub translation: Option<String>,
    /// Extension values, decoded lazily by whoever reads them.
    pub custom: HashMap<Identifier, Value>,
}

impl GameMetadata {
    /// Literal name, else translation key, else `fallback`.
    pub fn display_name(&self, fallback: &Text) -> Text {
        if let Some(name) = &self.name {
            Text::literal(name.clone())
        } else if let Some(key) = &self.translation {
            Text::translatable(key.clone())
        } else {
            fallback.clone()
        }
    }

    /// Decodes the custom value under `key` as `T`.
    ///
    /// Returns `None` if the key is missing or the value does not decode.
    pub fn custom_value<T: DeserializeOwned>(&self, key: &Identifier) -> Option<T> {
        let value = self.custom.get(key)?;
        T::deserialize(value).ok()
    }
}

// ---------------------------------------------------------------------------
// ConfiguredGame
// ---------------------------------------------------------------------------

/// A game type together with a concrete config of type `C`.
///
/// Immutable once built. Share it as `Arc<ConfiguredGame<C>>`; opening a
/// game needs the `Arc` so the pipeline can keep it alive across tasks.
pub struct ConfiguredGame<C> {
    game_type: Arc<GameType<C>>,
    metadata: GameMetadata,
    config: C,
}

impl<C: GameConfig> ConfiguredGame<C> {
    pub fn new(game_type: Arc<GameType<C>>, config: C) -> Self {
        Self::from_parts(game_type, GameMetadata::default(), config)
    }

    pub(crate) fn from_parts(game_type: Arc<GameType<C>>, metadata: GameMetadata, config: C) -> Self {
        Self {
            game_type,
            metadata,
            config,
        }
    }

    pub fn with_source(mut self, source: Identifier) -> Self {
        self.metadata.source = Some(source);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = Some(name.into());
        self
    }

    pub fn with_translation(mut self, key: impl Into<String>) -> Self {
        self.metadata.translation = Some(key.into());
        self
    }

    /// Adds a custom value; a later value for the same key replaces it.
    pub fn with_custom(mut self, key: Identifier, value: Value) -> Self {
        self.metadata.custom.insert(key, value);
        self
    }

    pub fn game_type(&self) -> &Arc<GameType<C>> {
        &self.game_type
    }

    pub fn metadata(&self) -> &GameMetadata {
        &self.metadata
    }

    pub fn source(&self) -> Option<&Identifier> {
        self.metadata.source.as_ref()
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Literal name, else translation key, else the game type's name.
    pub fn name_text(&self) -> Text {
        self.metadata.display_name(self.game_type.name())
    }

    pub fn custom_value<T: DeserializeOwned>(&self, key: &Identifier) -> Option<T> {
        self.metadata.custom_value(key)
    }

    /// Encodes this game back into a document.
    pub fn encode(&self) -> Result<Value, ConfigError> {
        encode_game(self)
    }

    /// Short description used in logs and diagnostic reports.
    pub fn describe(&self) -> String {
        describe(self.game_type.id(), self.source())
    }
}

pub(crate) fn describe(game_type: &Identifier, source: Option<&Identifier>) -> String {
    match source {
        Some(source) => format!("{game_type} (from {source})"),
        None => game_type.to_string(),
    }
}

impl<C: PartialEq> PartialEq for ConfiguredGame<C> {
    fn eq(&self, other: &Self) -> bool {
        self.game_type.id() == other.game_type.id()
            && self.metadata == other.metadata
            && self.config == other.config
    }
}

impl<C: fmt::Debug> fmt::Debug for ConfiguredGame<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredGame")
            .field("game_type", self.game_type.id())
            .field("metadata", &self.metadata)
            .field("config", &self.config)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AnyConfiguredGame
// ---------------------------------------------------------------------------

/// Object-safe view of `ConfiguredGame<C>` for any `C`.
trait ErasedGame: Send + Sync + 'static {
    fn game_type_id(&self) -> &Identifier;
    fn game_type_name(&self) -> &Text;
    fn metadata(&self) -> &GameMetadata;
    fn encode(&self) -> Result<Value, ConfigError>;
    fn open(self: Arc<Self>, host: HostHandle)
    -> BoxFuture<'static, Result<ManagedGameSpace, OpenError>>;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<C: GameConfig> ErasedGame for ConfiguredGame<C> {
    fn game_type_id(&self) -> &Identifier {
        self.game_type.id()
    }

    fn game_type_name(&self) -> &Text {
        self.game_type.name()
    }

    fn metadata(&self) -> &GameMetadata {
        &self.metadata
    }

    fn encode(&self) -> Result<Value, ConfigError> {
        encode_game(self)
    }

    fn open(
        self: Arc<Self>,
        host: HostHandle,
    ) -> BoxFuture<'static, Result<ManagedGameSpace, OpenError>> {
        ConfiguredGame::open(&self, host).boxed()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A configured game whose config type is not known statically.
///
/// This is what decoding a document produces. Cheap to clone.
#[derive(Clone)]
pub struct AnyConfiguredGame {
    inner: Arc<dyn ErasedGame>,
}

impl AnyConfiguredGame {
    pub fn new<C: GameConfig>(game: ConfiguredGame<C>) -> Self {
        Self::from_arc(Arc::new(game))
    }

    pub fn from_arc<C: GameConfig>(game: Arc<ConfiguredGame<C>>) -> Self {
        Self { inner: game }
    }

    pub fn game_type_id(&self) -> &Identifier {
        self.inner.game_type_id()
    }

    pub fn metadata(&self) -> &GameMetadata {
        self.inner.metadata()
    }

    pub fn source(&self) -> Option<&Identifier> {
        self.metadata().source.as_ref()
    }

    /// Literal name, else translation key, else the game type's name.
    pub fn name_text(&self) -> Text {
        self.metadata().display_name(self.inner.game_type_name())
    }

    pub fn custom_value<T: DeserializeOwned>(&self, key: &Identifier) -> Option<T> {
        self.metadata().custom_value(key)
    }

    pub fn encode(&self) -> Result<Value, ConfigError> {
        self.inner.encode()
    }

    /// Opens the game. See [`ConfiguredGame::open`].
    pub fn open(
        &self,
        host: HostHandle,
    ) -> impl Future<Output = Result<ManagedGameSpace, OpenError>> + Send + use<> {
        Arc::clone(&self.inner).open(host)
    }

    /// Recovers the typed game, if its config type is `C`.
    pub fn downcast<C: GameConfig>(&self) -> Option<Arc<ConfiguredGame<C>>> {
        Arc::clone(&self.inner).into_any().downcast().ok()
    }

    pub fn describe(&self) -> String {
        describe(self.game_type_id(), self.source())
    }
}

impl<C: GameConfig> From<ConfiguredGame<C>> for AnyConfiguredGame {
    fn from(game: ConfiguredGame<C>) -> Self {
        Self::new(game)
    }
}

impl fmt::Debug for AnyConfiguredGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyConfiguredGame")
            .field("game_type", self.game_type_id())
            .field("metadata", self.metadata())
            .finish_non_exhaustive()
    }
}

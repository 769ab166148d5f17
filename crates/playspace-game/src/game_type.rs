//! Game type descriptors.

use std::fmt;
use std::sync::Arc;

use playspace_config::{CodecShape, ConfigCodec, ConfigError, GameConfig, Identifier, Text};
use serde_json::Value;

use crate::{AnyConfiguredGame, ConfiguredGame, GameMetadata, OpenContext, OpenError, OpenProcedure};

type OpenFn<C> = dyn Fn(OpenContext<C>) -> Result<OpenProcedure, OpenError> + Send + Sync;

/// A registered kind of game session.
///
/// Holds everything needed to turn a document into a typed config `C` and
/// a typed config into a running space. Immutable once built.
pub struct GameType<C> {
    id: Identifier,
    name: Text,
    codec: ConfigCodec<C>,
    open: Box<OpenFn<C>>,
}

impl<C: GameConfig> GameType<C> {
    /// Builds a game type.
    ///
    /// The display name defaults to the translation key
    /// `game_type.<namespace>.<path>`.
    pub fn new<F>(id: Identifier, codec: ConfigCodec<C>, open: F) -> Self
    where
        F: Fn(OpenContext<C>) -> Result<OpenProcedure, OpenError> + Send + Sync + 'static,
    {
        let name = Text::translatable(format!(
            "game_type.{}.{}",
            id.namespace(),
            id.path().replace('/', ".")
        ));
        Self {
            id,
            name,
            codec,
            open: Box::new(open),
        }
    }
}

impl<C> GameType<C> {
    pub fn with_name(mut self, name: Text) -> Self {
        self.name = name;
        self
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn name(&self) -> &Text {
        &self.name
    }

    pub fn codec(&self) -> &ConfigCodec<C> {
        &self.codec
    }

    /// Runs the open function. Synchronous; the returned procedure holds
    /// whatever asynchronous work remains.
    pub fn open(&self, context: OpenContext<C>) -> Result<OpenProcedure, OpenError> {
        (self.open)(context)
    }
}

impl<C> fmt::Debug for GameType<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Type-erased view
// ---------------------------------------------------------------------------

/// A [`GameType`] with its config type erased, as stored in the registry.
///
/// `decode_game` is where a config is decoded into its concrete type and
/// immediately re-erased; nothing outside the owning `GameType<C>` ever
/// sees `C` without going through [`AnyConfiguredGame::downcast`].
pub trait DynGameType: Send + Sync + 'static {
    fn id(&self) -> &Identifier;

    fn name(&self) -> &Text;

    fn shape(&self) -> CodecShape;

    /// Decodes this type's config from `document` and pairs it with
    /// `metadata`.
    fn decode_game(
        self: Arc<Self>,
        metadata: GameMetadata,
        document: &Value,
    ) -> Result<AnyConfiguredGame, ConfigError>;
}

impl<C: GameConfig> DynGameType for GameType<C> {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn name(&self) -> &Text {
        &self.name
    }

    fn shape(&self) -> CodecShape {
        self.codec.shape()
    }

    fn decode_game(
        self: Arc<Self>,
        metadata: GameMetadata,
        document: &Value,
    ) -> Result<AnyConfiguredGame, ConfigError> {
        let config = self.codec.decode(&self.id, document)?;
        let game = ConfiguredGame::from_parts(self, metadata, config);
        Ok(AnyConfiguredGame::new(game))
    }
}

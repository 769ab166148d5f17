//! The `Playspace` entry point: registry, host and codec in one place.

use std::sync::Arc;

use playspace_config::{GameConfig, Identifier};
use playspace_game::{
    AnyConfiguredGame, ConfiguredGameCodec, GameType, GameTypeRegistry, RegistryBuilder,
};
use playspace_space::{HostHandle, LocalHost, ManagedGameSpace};
use serde_json::Value;

use crate::PlayspaceError;

/// Builder for a [`Playspace`].
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = Playspace::builder().host(LocalHost::handle(64));
/// builder.register(my_game_type)?;
/// let playspace = builder.build();
/// let space = playspace.open_document(&document).await?;
/// ```
pub struct PlayspaceBuilder {
    registry: RegistryBuilder,
    host: Option<HostHandle>,
}

impl PlayspaceBuilder {
    pub fn new() -> Self {
        Self {
            registry: GameTypeRegistry::builder(),
            host: None,
        }
    }

    /// Sets the host spaces run inside. Defaults to a [`LocalHost`] with
    /// no connection ceiling.
    pub fn host(mut self, host: HostHandle) -> Self {
        self.host = Some(host);
        self
    }

    /// Registers a game type and returns its typed handle.
    pub fn register<C: GameConfig>(
        &mut self,
        game_type: GameType<C>,
    ) -> Result<Arc<GameType<C>>, PlayspaceError> {
        Ok(self.registry.register(game_type)?)
    }

    /// Freezes the registry.
    pub fn build(self) -> Playspace {
        let host = self
            .host
            .unwrap_or_else(|| Arc::new(LocalHost::default()) as HostHandle);
        Playspace {
            registry: self.registry.build(),
            host,
        }
    }
}

impl Default for PlayspaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A frozen game type registry bound to a host.
#[derive(Clone)]
pub struct Playspace {
    registry: Arc<GameTypeRegistry>,
    host: HostHandle,
}

impl Playspace {
    pub fn builder() -> PlayspaceBuilder {
        PlayspaceBuilder::new()
    }

    pub fn registry(&self) -> &Arc<GameTypeRegistry> {
        &self.registry
    }

    pub fn host(&self) -> &HostHandle {
        &self.host
    }

    pub fn codec(&self) -> ConfiguredGameCodec {
        ConfiguredGameCodec::new(Arc::clone(&self.registry))
    }

    pub fn decode(&self, document: &Value) -> Result<AnyConfiguredGame, PlayspaceError> {
        Ok(self.codec().decode(document)?)
    }

    /// Decodes a document that was loaded under the name `source`.
    pub fn decode_named(
        &self,
        source: Identifier,
        document: &Value,
    ) -> Result<AnyConfiguredGame, PlayspaceError> {
        Ok(self.codec().with_source(source).decode(document)?)
    }

    pub fn decode_str(&self, text: &str) -> Result<AnyConfiguredGame, PlayspaceError> {
        Ok(self.codec().decode_str(text)?)
    }

    /// Opens a decoded game on this host.
    pub async fn open(&self, game: &AnyConfiguredGame) -> Result<ManagedGameSpace, PlayspaceError> {
        Ok(game.open(Arc::clone(&self.host)).await?)
    }

    /// Decodes and opens in one step.
    pub async fn open_document(&self, document: &Value) -> Result<ManagedGameSpace, PlayspaceError> {
        let game = self.decode(document)?;
        tracing::debug!(game = %game.describe(), "opening game from document");
        self.open(&game).await
    }
}

impl std::fmt::Debug for Playspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playspace")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

//! Document codec for configured games.
//!
//! A game document is a JSON map:
//!
//! ```text
//! {
//!   "type": "arcade:spleef",          required, registered game type id
//!   "name": "Spleef Deluxe",          optional literal display name
//!   "translation": "game.spleef",     optional translation key
//!   "custom": { "ns:key": ... },      optional extension values
//!   "config": { ... }                 nested codecs only; inline codecs
//! }                                   read their fields from this level
//! ```
//!
//! `type` and the config payload are essential: problems with either fail
//! the decode. The cosmetic fields are read leniently and dropped with a
//! warning when malformed.

use std::collections::HashMap;
use std::sync::Arc;

use playspace_config::{ConfigError, GameConfig, Identifier};
use serde_json::{Map, Value};

use crate::{AnyConfiguredGame, ConfiguredGame, GameMetadata, GameTypeRegistry};

pub const TYPE_KEY: &str = "type";
pub const NAME_KEY: &str = "name";
pub const TRANSLATION_KEY: &str = "translation";
pub const CUSTOM_KEY: &str = "custom";

/// Decodes and encodes [`AnyConfiguredGame`]s against a registry.
#[derive(Debug, Clone)]
pub struct ConfiguredGameCodec {
    registry: Arc<GameTypeRegistry>,
    source: Option<Identifier>,
}

impl ConfiguredGameCodec {
    pub fn new(registry: Arc<GameTypeRegistry>) -> Self {
        Self {
            registry,
            source: None,
        }
    }

    /// Tags every decoded game with the document it came from.
    pub fn with_source(mut self, source: Identifier) -> Self {
        self.source = Some(source);
        self
    }

    pub fn registry(&self) -> &Arc<GameTypeRegistry> {
        &self.registry
    }

    /// Decodes a game document.
    pub fn decode(&self, document: &Value) -> Result<AnyConfiguredGame, ConfigError> {
        let map = document
            .as_object()
            .ok_or_else(|| ConfigError::NotAMap(value_kind(document)))?;

        let type_id: Identifier = map
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .ok_or(ConfigError::MissingType)?
            .parse()?;
        let game_type = self
            .registry
            .get(&type_id)
            .ok_or_else(|| ConfigError::UnknownGameType(type_id.clone()))?;

        let metadata = GameMetadata {
            source: self.source.clone(),
            name: optional_string(map, NAME_KEY, &type_id),
            translation: optional_string(map, TRANSLATION_KEY, &type_id),
            custom: custom_values(map, &type_id),
        };

        Arc::clone(game_type).decode_game(metadata, document)
    }

    /// Parses JSON text, then decodes it.
    pub fn decode_str(&self, text: &str) -> Result<AnyConfiguredGame, ConfigError> {
        let document: Value = serde_json::from_str(text)?;
        self.decode(&document)
    }

    pub fn encode(&self, game: &AnyConfiguredGame) -> Result<Value, ConfigError> {
        game.encode()
    }
}

/// Writes a typed game into a fresh document.
///
/// The config goes in first so an inline config can never shadow the
/// metadata keys.
pub(crate) fn encode_game<C: GameConfig>(game: &ConfiguredGame<C>) -> Result<Value, ConfigError> {
    let game_type = game.game_type();
    let metadata = game.metadata();
    let mut out = Map::new();

    game_type.codec().encode(game_type.id(), game.config(), &mut out)?;

    out.insert(TYPE_KEY.to_string(), Value::String(game_type.id().to_string()));
    if let Some(name) = &metadata.name {
        out.insert(NAME_KEY.to_string(), Value::String(name.clone()));
    }
    if let Some(key) = &metadata.translation {
        out.insert(TRANSLATION_KEY.to_string(), Value::String(key.clone()));
    }
    if !metadata.custom.is_empty() {
        let custom = metadata
            .custom
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        out.insert(CUSTOM_KEY.to_string(), Value::Object(custom));
    }

    Ok(Value::Object(out))
}

fn optional_string(map: &Map<String, Value>, key: &str, game_type: &Identifier) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        other => {
            tracing::warn!(
                %game_type,
                field = key,
                found = value_kind(other),
                "ignoring malformed optional field"
            );
            None
        }
    }
}

fn custom_values(map: &Map<String, Value>, game_type: &Identifier) -> HashMap<Identifier, Value> {
    let Some(value) = map.get(CUSTOM_KEY) else {
        return HashMap::new();
    };
    let Some(entries) = value.as_object() else {
        tracing::warn!(
            %game_type,
            found = value_kind(value),
            "ignoring custom values that are not a map"
        );
        return HashMap::new();
    };

    // One bad key discards the whole map.
    let parsed: Result<HashMap<Identifier, Value>, ConfigError> = entries
        .iter()
        .map(|(key, value)| Ok((key.parse::<Identifier>()?, value.clone())))
        .collect();
    parsed.unwrap_or_else(|err| {
        tracing::warn!(%game_type, error = %err, "ignoring custom values with an invalid key");
        HashMap::new()
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

//! Config codecs: how a game type's typed config lives inside a document.
//!
//! Every game type owns exactly one [`ConfigCodec`]. The codec has a
//! [`CodecShape`] that decides where the config's fields sit:
//!
//! ```text
//! Inline                              Nested
//! { "type": "arcade:spleef",          { "type": "arcade:spleef",
//!   "name": "Spleef",                   "name": "Spleef",
//!   "layers": 3 }                       "config": { "layers": 3 } }
//! ```
//!
//! Callers never branch on the shape; they hand the whole document to
//! [`ConfigCodec::decode`] and get a `C` back.

use std::fmt;
use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::{ConfigError, Identifier};

/// Key that holds the config payload for [`CodecShape::Nested`] codecs.
pub const CONFIG_KEY: &str = "config";

/// Bounds every game config type must satisfy.
///
/// Blanket-implemented, so any `Serialize + DeserializeOwned` type that is
/// thread-safe qualifies.
pub trait GameConfig: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> GameConfig for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Where a config's fields are stored in a game document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecShape {
    /// Fields are merged into the document next to `type` and `name`.
    Inline,
    /// Fields are stored under the `config` key.
    Nested,
}

/// Reads and writes a game type's config of type `C`.
pub struct ConfigCodec<C> {
    shape: CodecShape,
    _config: PhantomData<fn() -> C>,
}

impl<C: GameConfig> ConfigCodec<C> {
    /// A codec whose fields share the top level of the document.
    pub fn inline() -> Self {
        Self::with_shape(CodecShape::Inline)
    }

    /// A codec whose fields live under `config`.
    pub fn nested() -> Self {
        Self::with_shape(CodecShape::Nested)
    }

    pub fn with_shape(shape: CodecShape) -> Self {
        Self {
            shape,
            _config: PhantomData,
        }
    }

    pub fn shape(&self) -> CodecShape {
        self.shape
    }

    /// Decodes the config from a full game document.
    ///
    /// A nested codec reading a document without `config` decodes from
    /// `null`, which only succeeds for configs that accept it (e.g. `()`).
    pub fn decode(&self, game_type: &Identifier, document: &Value) -> Result<C, ConfigError> {
        let input = match self.shape {
            CodecShape::Inline => document,
            CodecShape::Nested => document.get(CONFIG_KEY).unwrap_or(&Value::Null),
        };
        C::deserialize(input).map_err(|source| ConfigError::Decode {
            game_type: game_type.clone(),
            source,
        })
    }

    /// Writes the config into `out`, mirroring the codec's shape.
    pub fn encode(
        &self,
        game_type: &Identifier,
        config: &C,
        out: &mut Map<String, Value>,
    ) -> Result<(), ConfigError> {
        let value = serde_json::to_value(config).map_err(|source| ConfigError::Encode {
            game_type: game_type.clone(),
            source,
        })?;
        match self.shape {
            CodecShape::Inline => match value {
                Value::Object(fields) => out.extend(fields),
                _ => return Err(ConfigError::InlineNotMap(game_type.clone())),
            },
            CodecShape::Nested => {
                out.insert(CONFIG_KEY.to_string(), value);
            }
        }
        Ok(())
    }
}

impl<C> Clone for ConfigCodec<C> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape,
            _config: PhantomData,
        }
    }
}

impl<C> fmt::Debug for ConfigCodec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigCodec").field("shape", &self.shape).finish()
    }
}

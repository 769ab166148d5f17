//! Error types for the configuration layer.
//!
//! Decoding a game document fails only on structurally essential fields
//! (`type` and the config payload). Cosmetic fields never produce an error,
//! so there is no variant for them here.

use crate::Identifier;

/// Errors that can occur while decoding or encoding configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not a key/value map.
    #[error("game document must be a map, got {0}")]
    NotAMap(&'static str),

    /// The `type` field is absent or not a string.
    #[error("game document is missing a `type` field")]
    MissingType,

    /// The `type` field names a game type that was never registered.
    #[error("unknown game type `{0}`")]
    UnknownGameType(Identifier),

    /// A string could not be parsed as an [`Identifier`].
    #[error("invalid identifier `{value}`: {reason}")]
    InvalidIdentifier {
        value: String,
        reason: &'static str,
    },

    /// A game type with this id is already registered.
    #[error("game type `{0}` is already registered")]
    DuplicateType(Identifier),

    /// The game type's config could not be decoded from the document.
    #[error("failed to decode config for `{game_type}`: {source}")]
    Decode {
        game_type: Identifier,
        #[source]
        source: serde_json::Error,
    },

    /// The game type's config could not be encoded.
    #[error("failed to encode config for `{game_type}`: {source}")]
    Encode {
        game_type: Identifier,
        #[source]
        source: serde_json::Error,
    },

    /// An inline config encoded to something other than a map, so its
    /// fields cannot be merged into the surrounding document.
    #[error("inline config for `{0}` must encode to a map")]
    InlineNotMap(Identifier),

    /// The document text is not valid JSON.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Returns `true` if the error concerns the `type` field.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            Self::MissingType | Self::UnknownGameType(_) | Self::InvalidIdentifier { .. }
        )
    }
}

//! Core vocabulary types shared by every Playspace crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

// ---------------------------------------------------------------------------
// Identifier
// ---------------------------------------------------------------------------

/// A namespaced identifier such as `playspace:capture_the_flag`.
///
/// Identifiers name game types, custom config values, and sounds. They are
/// written as `namespace:path`; a bare `path` takes [`Identifier::DEFAULT_NAMESPACE`].
///
/// Serialises as its string form, so a document can say
/// `"type": "arcade:spleef"` and decode straight into an `Identifier`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    namespace: String,
    path: String,
}

impl Identifier {
    /// Namespace used when a string has no `namespace:` prefix.
    pub const DEFAULT_NAMESPACE: &'static str = "playspace";

    /// Builds an identifier from its parts, validating both.
    pub fn new(namespace: &str, path: &str) -> Result<Self, ConfigError> {
        let full = format!("{namespace}:{path}");
        if namespace.is_empty() {
            return Err(invalid(full, "namespace must not be empty"));
        }
        if !namespace.chars().all(is_namespace_char) {
            return Err(invalid(full, "namespace may only contain [a-z0-9_.-]"));
        }
        if path.is_empty() {
            return Err(invalid(full, "path must not be empty"));
        }
        if !path.chars().all(is_path_char) {
            return Err(invalid(full, "path may only contain [a-z0-9_.-/]"));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Builds an identifier from parts fixed at compile time.
    ///
    /// # Panics
    ///
    /// Panics if either part is invalid.
    pub fn from_static(namespace: &'static str, path: &'static str) -> Self {
        match Self::new(namespace, path) {
            Ok(id) => id,
            Err(err) => panic!("invalid static identifier: {err}"),
        }
    }

    /// The part before the colon.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The part after the colon.
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

fn invalid(value: String, reason: &'static str) -> ConfigError {
    ConfigError::InvalidIdentifier { value, reason }
}

impl FromStr for Identifier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(Self::DEFAULT_NAMESPACE, s),
        }
    }
}

impl TryFrom<String> for Identifier {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Player-facing text: either literal or a translation key resolved by the
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Text {
    /// Shown exactly as written.
    Literal(String),
    /// Looked up by key on the client, with positional arguments.
    Translatable { key: String, args: Vec<String> },
}

impl Text {
    /// Literal text.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// A translation key with no arguments.
    pub fn translatable(key: impl Into<String>) -> Self {
        Self::Translatable {
            key: key.into(),
            args: Vec::new(),
        }
    }

    /// A translation key with positional arguments.
    pub fn translatable_with<I, S>(key: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Translatable {
            key: key.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Translatable { key, args } if args.is_empty() => f.write_str(key),
            Self::Translatable { key, args } => write!(f, "{key} [{}]", args.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_namespace() {
        let id: Identifier = "arcade:spleef".parse().unwrap();
        assert_eq!(id.namespace(), "arcade");
        assert_eq!(id.path(), "spleef");
        assert_eq!(id.to_string(), "arcade:spleef");
    }

    #[test]
    fn test_parse_bare_path_uses_default_namespace() {
        let id: Identifier = "spleef".parse().unwrap();
        assert_eq!(id.namespace(), Identifier::DEFAULT_NAMESPACE);
        assert_eq!(id.to_string(), "playspace:spleef");
    }

    #[test]
    fn test_parse_nested_path() {
        let id: Identifier = "arcade:maps/islands".parse().unwrap();
        assert_eq!(id.path(), "maps/islands");
    }

    #[test]
    fn test_from_static() {
        let id = Identifier::from_static("arcade", "ui/tick");
        assert_eq!(id.to_string(), "arcade:ui/tick");
    }

    #[test]
    #[should_panic(expected = "invalid static identifier")]
    fn test_from_static_panics_on_bad_input() {
        Identifier::from_static("Arcade", "tick");
    }

    #[test]
    fn test_parse_rejects_bad_chars() {
        assert!("Arcade:spleef".parse::<Identifier>().is_err());
        assert!("arcade:spl eef".parse::<Identifier>().is_err());
        assert!("arcade/x:spleef".parse::<Identifier>().is_err());
        assert!("arcade:".parse::<Identifier>().is_err());
    }

    #[test]
    fn test_identifier_serde_as_string() {
        let id: Identifier = "arcade:spleef".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"arcade:spleef\"");
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<Identifier>("\"Bad Id\"").is_err());
    }

    #[test]
    fn test_text_display() {
        assert_eq!(Text::literal("Spleef").to_string(), "Spleef");
        assert_eq!(Text::translatable("game.spleef").to_string(), "game.spleef");
        assert_eq!(
            Text::translatable_with("bar.countdown", ["5"]).to_string(),
            "bar.countdown [5]"
        );
    }
}

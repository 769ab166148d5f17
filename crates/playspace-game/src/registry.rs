//! The game type registry: populated once at startup, read-only after.

use std::collections::HashMap;
use std::sync::Arc;

use playspace_config::{ConfigError, GameConfig, Identifier};

use crate::{DynGameType, GameType};

/// Maps game type ids to their descriptors.
///
/// Built through [`GameTypeRegistry::builder`]; once built it is shared as
/// `Arc<GameTypeRegistry>` and never mutated again.
#[derive(Default)]
pub struct GameTypeRegistry {
    types: HashMap<Identifier, Arc<dyn DynGameType>>,
}

impl GameTypeRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up a game type by id.
    pub fn get(&self, id: &Identifier) -> Option<&Arc<dyn DynGameType>> {
        self.types.get(id)
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.types.contains_key(id)
    }

    /// All registered ids, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
        self.types.keys()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for GameTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.types.keys()).finish()
    }
}

/// Collects game types before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    types: HashMap<Identifier, Arc<dyn DynGameType>>,
}

impl RegistryBuilder {
    /// Registers a game type and returns the shared, typed handle to it.
    ///
    /// Keep the handle to build [`ConfiguredGame`](crate::ConfiguredGame)s
    /// in code without going through a document.
    pub fn register<C: GameConfig>(
        &mut self,
        game_type: GameType<C>,
    ) -> Result<Arc<GameType<C>>, ConfigError> {
        let id = game_type.id().clone();
        if self.types.contains_key(&id) {
            return Err(ConfigError::DuplicateType(id));
        }

        let game_type = Arc::new(game_type);
        self.types.insert(id.clone(), Arc::clone(&game_type) as Arc<dyn DynGameType>);
        tracing::debug!(game_type = %id, "game type registered");
        Ok(game_type)
    }

    /// Freezes the registry.
    pub fn build(self) -> Arc<GameTypeRegistry> {
        tracing::info!(game_types = self.types.len(), "game type registry built");
        Arc::new(GameTypeRegistry { types: self.types })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playspace_config::{ConfigCodec, Text};

    use crate::OpenError;

    fn unit_type(id: &str) -> GameType<()> {
        GameType::new(id.parse().unwrap(), ConfigCodec::nested(), |_| {
            Err(OpenError::rejected(Text::literal("not openable")))
        })
    }

    #[test]
    fn test_register_and_get() {
        let mut builder = GameTypeRegistry::builder();
        builder.register(unit_type("arcade:spleef")).unwrap();
        let registry = builder.build();

        let id: Identifier = "arcade:spleef".parse().unwrap();
        assert!(registry.contains(&id));
        assert_eq!(registry.get(&id).unwrap().id(), &id);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut builder = GameTypeRegistry::builder();
        builder.register(unit_type("arcade:spleef")).unwrap();
        let err = builder.register(unit_type("arcade:spleef")).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateType(_)));
    }

    #[test]
    fn test_default_display_name_is_translation_key() {
        let game_type = unit_type("arcade:maps/islands");
        assert_eq!(
            game_type.name(),
            &Text::translatable("game_type.arcade.maps.islands")
        );
    }
}

//! Listener registration and rules for a game space.
//!
//! A [`GameActivity`] is assembled before a space opens: the game type (or
//! a helper such as a waiting lobby) sets rules and registers listeners on
//! it, then the space takes ownership and drives the listeners from its own
//! task.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{JoinResult, PlayerId, PlayerNotice, SpaceId, StartResult, StartTicket};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Interactive mechanics a space can allow or deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameRule {
    Crafting,
    Portals,
    Pvp,
    FallDamage,
    Hunger,
    ThrowItems,
    Interaction,
    PlaceBlocks,
    BreakBlocks,
}

/// Outcome of testing a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleResult {
    Allow,
    Deny,
    /// No opinion; the host's default behaviour applies.
    #[default]
    Pass,
}

// ---------------------------------------------------------------------------
// Listener traits
// ---------------------------------------------------------------------------

/// What a listener can observe and do while handling a callback.
///
/// Implemented by the space actor; tests can implement it with a fake.
pub trait SpaceView {
    fn id(&self) -> SpaceId;

    /// World time in ticks.
    fn time(&self) -> u64;

    fn player_count(&self) -> usize;

    fn players(&self) -> Vec<PlayerId>;

    /// The host's current connection ceiling.
    fn connection_ceiling(&self) -> usize;

    /// Sends a notice to every player in the space.
    fn broadcast(&mut self, notice: PlayerNotice);

    /// Asks the space to start. The answer arrives on the returned ticket
    /// once the current callback has returned.
    fn request_start(&mut self) -> StartTicket;
}

/// Callbacks a space invokes on its listeners.
///
/// Every method has a no-op default, so a listener only implements the
/// events it cares about. Listeners run in registration order.
pub trait SpaceListener: Send + 'static {
    /// Called once per world tick, after time has advanced.
    fn on_tick(&mut self, _space: &mut dyn SpaceView) {}

    /// Called before a player is added. Any non-`Ok` answer rejects the
    /// player and stops later listeners from being asked.
    fn on_offer_player(&mut self, _space: &mut dyn SpaceView, _player: PlayerId) -> JoinResult {
        JoinResult::Ok
    }

    /// Called after a player has been removed.
    fn on_player_removed(&mut self, _space: &mut dyn SpaceView, _player: PlayerId) {}

    /// Called when something asks the space to start.
    ///
    /// `None` means no opinion and defers to the next listener.
    fn on_request_start(&mut self, _space: &mut dyn SpaceView) -> Option<StartResult> {
        None
    }
}

// ---------------------------------------------------------------------------
// GameActivity
// ---------------------------------------------------------------------------

/// Rules and listeners that a space is opened with.
#[derive(Default)]
pub struct GameActivity {
    rules: HashMap<GameRule, RuleResult>,
    listeners: Vec<Box<dyn SpaceListener>>,
}

impl GameActivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rule(&mut self, rule: GameRule, result: RuleResult) {
        self.rules.insert(rule, result);
    }

    /// The configured result for `rule`, or [`RuleResult::Pass`].
    pub fn test_rule(&self, rule: GameRule) -> RuleResult {
        self.rules.get(&rule).copied().unwrap_or_default()
    }

    /// Registers a listener. Listeners are invoked in registration order.
    pub fn listen(&mut self, listener: impl SpaceListener) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn into_parts(self) -> (HashMap<GameRule, RuleResult>, Vec<Box<dyn SpaceListener>>) {
        (self.rules, self.listeners)
    }
}

impl std::fmt::Debug for GameActivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameActivity")
            .field("rules", &self.rules)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

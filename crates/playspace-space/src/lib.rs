//! Managed game spaces for Playspace.
//!
//! Each open game space runs as an isolated Tokio task (actor model) that
//! owns its world clock, player list, rule table, and lifecycle listeners.
//! Every listener callback runs on that one task, so listener state never
//! needs a lock.
//!
//! # Key types
//!
//! - [`ManagedGameSpace`]: handle to a running space actor
//! - [`GameActivity`]: rules and listeners a space is opened with
//! - [`SpaceListener`]: callbacks for tick, offer, remove, start request
//! - [`SpaceView`]: what a listener can see and do during a callback
//! - [`GameHost`]: the server the space runs inside

mod activity;
mod error;
mod host;
mod space;
mod types;

pub use activity::{GameActivity, GameRule, RuleResult, SpaceListener, SpaceView};
pub use error::SpaceError;
pub use host::{ErrorReport, GameHost, HostHandle, LocalHost};
pub use space::{ManagedGameSpace, SpaceInfo, SpaceSettings};
pub use types::{
    JoinResult, PlayerId, PlayerNotice, PlayerSender, SoundCue, SpaceId, StartResult,
    StartTicket, TicketState,
};

//! Space actor: an isolated Tokio task that owns one open game space.
//!
//! The outside world talks to the actor through a [`ManagedGameSpace`]
//! handle. Commands and world ticks are handled one at a time on the
//! actor's task, which is what lets listeners keep plain mutable state.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};

use playspace_tick::{TickConfig, TickScheduler};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::{
    GameActivity, GameRule, HostHandle, JoinResult, PlayerId, PlayerNotice, PlayerSender,
    RuleResult, SpaceError, SpaceId, SpaceListener, SpaceView, StartResult, StartTicket,
};

/// Counter for generating unique space IDs.
static NEXT_SPACE_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for space actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

// ---------------------------------------------------------------------------
// Settings / info
// ---------------------------------------------------------------------------

/// Runtime settings for a space actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceSettings {
    pub tick: TickConfig,
    /// Bounded command channel size; senders wait when it is full.
    pub channel_size: usize,
}

impl Default for SpaceSettings {
    fn default() -> Self {
        Self {
            tick: TickConfig::default(),
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }
}

/// A snapshot of space metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceInfo {
    pub space_id: SpaceId,
    /// World time in ticks.
    pub time: u64,
    pub player_count: usize,
}

// ---------------------------------------------------------------------------
// Commands / handle
// ---------------------------------------------------------------------------

/// Commands sent to a space actor through its channel.
enum SpaceCommand {
    Offer {
        player: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<JoinResult>,
    },
    Remove {
        player: PlayerId,
        reply: oneshot::Sender<Result<(), SpaceError>>,
    },
    RequestStart {
        reply: oneshot::Sender<StartResult>,
    },
    TestRule {
        rule: GameRule,
        reply: oneshot::Sender<RuleResult>,
    },
    GetInfo {
        reply: oneshot::Sender<SpaceInfo>,
    },
    Close,
}

/// Handle to a running game space.
///
/// Cheap to clone; every clone talks to the same actor. Dropping every
/// handle closes the space.
#[derive(Clone, Debug)]
pub struct ManagedGameSpace {
    space_id: SpaceId,
    sender: mpsc::Sender<SpaceCommand>,
}

impl std::fmt::Debug for SpaceCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Offer { .. } => "Offer",
            Self::Remove { .. } => "Remove",
            Self::RequestStart { .. } => "RequestStart",
            Self::TestRule { .. } => "TestRule",
            Self::GetInfo { .. } => "GetInfo",
            Self::Close => "Close",
        };
        f.write_str(name)
    }
}

impl ManagedGameSpace {
    /// Spawns a space actor running `activity` and returns its handle.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(host: HostHandle, settings: SpaceSettings, activity: GameActivity) -> Self {
        let space_id = SpaceId(NEXT_SPACE_ID.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(settings.channel_size.max(1));
        let (rules, listeners) = activity.into_parts();

        let actor = SpaceActor {
            state: SpaceState {
                space_id,
                host,
                time: 0,
                players: HashMap::new(),
                queued_starts: Vec::new(),
            },
            rules,
            listeners,
            scheduler: TickScheduler::new(settings.tick),
            receiver: rx,
        };

        tokio::spawn(actor.run());

        Self {
            space_id,
            sender: tx,
        }
    }

    pub fn id(&self) -> SpaceId {
        self.space_id
    }

    /// Offers a player to the space; listeners may reject them.
    pub async fn offer_player(
        &self,
        player: PlayerId,
        sender: PlayerSender,
    ) -> Result<JoinResult, SpaceError> {
        self.call(|reply| SpaceCommand::Offer {
            player,
            sender,
            reply,
        })
        .await
    }

    pub async fn remove_player(&self, player: PlayerId) -> Result<(), SpaceError> {
        self.call(|reply| SpaceCommand::Remove { player, reply })
            .await?
    }

    /// Asks the space's listeners whether the game may start.
    pub async fn request_start(&self) -> Result<StartResult, SpaceError> {
        self.call(|reply| SpaceCommand::RequestStart { reply }).await
    }

    pub async fn test_rule(&self, rule: GameRule) -> Result<RuleResult, SpaceError> {
        self.call(|reply| SpaceCommand::TestRule { rule, reply })
            .await
    }

    pub async fn info(&self) -> Result<SpaceInfo, SpaceError> {
        self.call(|reply| SpaceCommand::GetInfo { reply }).await
    }

    /// Tells the space to shut down.
    pub async fn close(&self) -> Result<(), SpaceError> {
        self.sender
            .send(SpaceCommand::Close)
            .await
            .map_err(|_| SpaceError::Unavailable(self.space_id))
    }

    /// Sends a command carrying a reply channel and waits for the reply.
    async fn call<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SpaceCommand,
    ) -> Result<T, SpaceError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| SpaceError::Unavailable(self.space_id))?;
        reply_rx
            .await
            .map_err(|_| SpaceError::Unavailable(self.space_id))
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The part of the actor that listeners see through [`SpaceView`].
struct SpaceState {
    space_id: SpaceId,
    host: HostHandle,
    time: u64,
    /// Per-player notice channels, keyed by player.
    players: HashMap<PlayerId, PlayerSender>,
    /// Start requests made by listeners, answered after the current step.
    queued_starts: Vec<oneshot::Sender<StartResult>>,
}

impl SpaceView for SpaceState {
    fn id(&self) -> SpaceId {
        self.space_id
    }

    fn time(&self) -> u64 {
        self.time
    }

    fn player_count(&self) -> usize {
        self.players.len()
    }

    fn players(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    fn connection_ceiling(&self) -> usize {
        self.host.connection_ceiling()
    }

    fn broadcast(&mut self, notice: PlayerNotice) {
        // Closed receivers belong to players whose connection is gone.
        for sender in self.players.values() {
            let _ = sender.send(notice.clone());
        }
    }

    fn request_start(&mut self) -> StartTicket {
        let (tx, ticket) = StartTicket::channel();
        self.queued_starts.push(tx);
        ticket
    }
}

struct SpaceActor {
    state: SpaceState,
    rules: HashMap<GameRule, RuleResult>,
    listeners: Vec<Box<dyn SpaceListener>>,
    scheduler: TickScheduler,
    receiver: mpsc::Receiver<SpaceCommand>,
}

impl SpaceActor {
    /// Runs the actor loop until the space is closed or every handle drops.
    async fn run(mut self) {
        let space_id = self.state.space_id;
        tracing::info!(%space_id, listeners = self.listeners.len(), "space opened");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if self.handle_command(cmd).is_break() {
                        break;
                    }
                }
                tick = self.scheduler.wait_for_tick() => {
                    self.state.time = tick.time;
                    for listener in &mut self.listeners {
                        listener.on_tick(&mut self.state);
                    }
                    self.scheduler.record_tick_end();
                }
            }
            self.answer_queued_starts();
        }

        // Pending tickets resolve as abandoned once their senders drop.
        self.state.queued_starts.clear();
        tracing::info!(%space_id, time = self.state.time, "space closed");
    }

    fn handle_command(&mut self, cmd: SpaceCommand) -> ControlFlow<()> {
        match cmd {
            SpaceCommand::Offer {
                player,
                sender,
                reply,
            } => {
                let result = self.handle_offer(player, sender);
                let _ = reply.send(result);
            }
            SpaceCommand::Remove { player, reply } => {
                let result = self.handle_remove(player);
                let _ = reply.send(result);
            }
            SpaceCommand::RequestStart { reply } => {
                let result = self.dispatch_request_start();
                let _ = reply.send(result);
            }
            SpaceCommand::TestRule { rule, reply } => {
                let result = self.rules.get(&rule).copied().unwrap_or_default();
                let _ = reply.send(result);
            }
            SpaceCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            SpaceCommand::Close => {
                tracing::info!(space_id = %self.state.space_id, "space closing");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn handle_offer(&mut self, player: PlayerId, sender: PlayerSender) -> JoinResult {
        if self.state.players.contains_key(&player) {
            return JoinResult::AlreadyJoined;
        }

        for listener in &mut self.listeners {
            let result = listener.on_offer_player(&mut self.state, player);
            if !result.is_ok() {
                tracing::debug!(
                    space_id = %self.state.space_id,
                    %player,
                    ?result,
                    "player rejected"
                );
                return result;
            }
        }

        self.state.players.insert(player, sender);
        tracing::info!(
            space_id = %self.state.space_id,
            %player,
            players = self.state.players.len(),
            "player joined"
        );
        JoinResult::Ok
    }

    fn handle_remove(&mut self, player: PlayerId) -> Result<(), SpaceError> {
        if self.state.players.remove(&player).is_none() {
            return Err(SpaceError::NotInSpace(player, self.state.space_id));
        }

        tracing::info!(
            space_id = %self.state.space_id,
            %player,
            players = self.state.players.len(),
            "player left"
        );

        for listener in &mut self.listeners {
            listener.on_player_removed(&mut self.state, player);
        }
        Ok(())
    }

    /// First listener with an opinion decides; nobody objecting means `Ok`.
    fn dispatch_request_start(&mut self) -> StartResult {
        for listener in &mut self.listeners {
            if let Some(result) = listener.on_request_start(&mut self.state) {
                return result;
            }
        }
        StartResult::Ok
    }

    fn answer_queued_starts(&mut self) {
        // Requests queued while answering these wait for the next step.
        let queued = std::mem::take(&mut self.state.queued_starts);
        for reply in queued {
            let result = self.dispatch_request_start();
            tracing::debug!(space_id = %self.state.space_id, ?result, "start request answered");
            let _ = reply.send(result);
        }
    }

    fn info(&self) -> SpaceInfo {
        SpaceInfo {
            space_id: self.state.space_id,
            time: self.state.time,
            player_count: self.state.players.len(),
        }
    }
}

//! Integration tests for the space actor using recording listeners.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use playspace_config::Text;
use playspace_space::{
    GameActivity, GameRule, JoinResult, LocalHost, ManagedGameSpace, PlayerId, PlayerNotice,
    PlayerSender, RuleResult, SpaceError, SpaceListener, SpaceSettings, SpaceView, StartResult,
    StartTicket, TicketState,
};
use playspace_tick::TickConfig;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn dummy_sender() -> PlayerSender {
    mpsc::unbounded_channel().0
}

fn settings() -> SpaceSettings {
    SpaceSettings {
        tick: TickConfig {
            initial_jitter_us: 0,
            ..TickConfig::default()
        },
        ..SpaceSettings::default()
    }
}

fn spawn(activity: GameActivity) -> ManagedGameSpace {
    ManagedGameSpace::spawn(LocalHost::handle(100), settings(), activity)
}

/// Shared log of events seen by a listener.
type Log = Arc<Mutex<Vec<String>>>;

struct Recorder {
    log: Log,
    max_players: usize,
    start_answer: Option<StartResult>,
}

impl SpaceListener for Recorder {
    fn on_offer_player(&mut self, space: &mut dyn SpaceView, player: PlayerId) -> JoinResult {
        self.log
            .lock()
            .unwrap()
            .push(format!("offer {player} seen={}", space.player_count()));
        if space.player_count() >= self.max_players {
            JoinResult::SpaceFull
        } else {
            JoinResult::Ok
        }
    }

    fn on_player_removed(&mut self, space: &mut dyn SpaceView, player: PlayerId) {
        self.log
            .lock()
            .unwrap()
            .push(format!("removed {player} seen={}", space.player_count()));
    }

    fn on_request_start(&mut self, _space: &mut dyn SpaceView) -> Option<StartResult> {
        self.log.lock().unwrap().push("start".to_string());
        self.start_answer.clone()
    }
}

fn recorder(log: &Log, max_players: usize, start_answer: Option<StartResult>) -> Recorder {
    Recorder {
        log: Arc::clone(log),
        max_players,
        start_answer,
    }
}

// =========================================================================
// Players
// =========================================================================

#[tokio::test]
async fn test_offer_player_joins() {
    let space = spawn(GameActivity::new());
    let result = space.offer_player(pid(1), dummy_sender()).await.unwrap();
    assert_eq!(result, JoinResult::Ok);
    assert_eq!(space.info().await.unwrap().player_count, 1);
}

#[tokio::test]
async fn test_offer_same_player_twice() {
    let space = spawn(GameActivity::new());
    space.offer_player(pid(1), dummy_sender()).await.unwrap();
    let result = space.offer_player(pid(1), dummy_sender()).await.unwrap();
    assert_eq!(result, JoinResult::AlreadyJoined);
}

#[tokio::test]
async fn test_listener_sees_pre_join_count_and_can_reject() {
    let log = Log::default();
    let mut activity = GameActivity::new();
    activity.listen(recorder(&log, 1, None));
    let space = spawn(activity);

    assert_eq!(
        space.offer_player(pid(1), dummy_sender()).await.unwrap(),
        JoinResult::Ok
    );
    assert_eq!(
        space.offer_player(pid(2), dummy_sender()).await.unwrap(),
        JoinResult::SpaceFull
    );
    assert_eq!(space.info().await.unwrap().player_count, 1);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["offer P-1 seen=0".to_string(), "offer P-2 seen=1".to_string()]
    );
}

#[tokio::test]
async fn test_remove_player_notifies_with_post_leave_count() {
    let log = Log::default();
    let mut activity = GameActivity::new();
    activity.listen(recorder(&log, 10, None));
    let space = spawn(activity);

    space.offer_player(pid(1), dummy_sender()).await.unwrap();
    space.offer_player(pid(2), dummy_sender()).await.unwrap();
    space.remove_player(pid(1)).await.unwrap();

    assert_eq!(log.lock().unwrap().last().unwrap(), "removed P-1 seen=1");
}

#[tokio::test]
async fn test_remove_unknown_player() {
    let space = spawn(GameActivity::new());
    let err = space.remove_player(pid(9)).await.unwrap_err();
    assert!(matches!(err, SpaceError::NotInSpace(p, _) if p == pid(9)));
}

// =========================================================================
// Rules / start requests
// =========================================================================

#[tokio::test]
async fn test_rules_are_carried_into_space() {
    let mut activity = GameActivity::new();
    activity.set_rule(GameRule::Pvp, RuleResult::Deny);
    let space = spawn(activity);

    assert_eq!(space.test_rule(GameRule::Pvp).await.unwrap(), RuleResult::Deny);
    assert_eq!(space.test_rule(GameRule::Hunger).await.unwrap(), RuleResult::Pass);
}

#[tokio::test]
async fn test_request_start_without_listeners_is_ok() {
    let space = spawn(GameActivity::new());
    assert_eq!(space.request_start().await.unwrap(), StartResult::Ok);
}

#[tokio::test]
async fn test_first_listener_opinion_wins() {
    let log = Log::default();
    let mut activity = GameActivity::new();
    activity.listen(recorder(&log, 10, None));
    activity.listen(recorder(&log, 10, Some(StartResult::NotEnoughPlayers)));
    activity.listen(recorder(&log, 10, Some(StartResult::Ok)));
    let space = spawn(activity);

    assert_eq!(
        space.request_start().await.unwrap(),
        StartResult::NotEnoughPlayers
    );
    // The third listener was never asked.
    assert_eq!(log.lock().unwrap().len(), 2);
}

// =========================================================================
// Ticks
// =========================================================================

/// Requests a start on its first tick and records the ticket's answer.
struct TickStarter {
    ticket: Option<StartTicket>,
    requested: bool,
    outcome: Arc<Mutex<Option<TicketState>>>,
}

impl SpaceListener for TickStarter {
    fn on_tick(&mut self, space: &mut dyn SpaceView) {
        if let Some(ticket) = &mut self.ticket {
            let state = ticket.poll_state();
            if state != TicketState::Pending {
                *self.outcome.lock().unwrap() = Some(state);
                self.ticket = None;
            }
        }
        if !self.requested {
            self.requested = true;
            self.ticket = Some(space.request_start());
        }
    }

    fn on_request_start(&mut self, _space: &mut dyn SpaceView) -> Option<StartResult> {
        Some(StartResult::Error(Text::literal("map missing")))
    }
}

#[tokio::test(start_paused = true)]
async fn test_world_time_advances() {
    let space = spawn(GameActivity::new());
    tokio::time::sleep(Duration::from_millis(1_025)).await;
    assert_eq!(space.info().await.unwrap().time, 20);
}

#[tokio::test(start_paused = true)]
async fn test_start_ticket_resolves_on_a_later_tick() {
    let outcome = Arc::new(Mutex::new(None));
    let mut activity = GameActivity::new();
    activity.listen(TickStarter {
        ticket: None,
        requested: false,
        outcome: Arc::clone(&outcome),
    });
    let _space = spawn(activity);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(
        *outcome.lock().unwrap(),
        Some(TicketState::Ready(StartResult::Error(Text::literal("map missing"))))
    );
}

// =========================================================================
// Notices / shutdown
// =========================================================================

struct Greeter;

impl SpaceListener for Greeter {
    fn on_player_removed(&mut self, space: &mut dyn SpaceView, player: PlayerId) {
        space.broadcast(PlayerNotice::Message {
            text: Text::literal(format!("{player} left")),
        });
    }
}

#[tokio::test]
async fn test_broadcast_reaches_remaining_players() {
    let mut activity = GameActivity::new();
    activity.listen(Greeter);
    let space = spawn(activity);

    let (tx, mut rx) = mpsc::unbounded_channel();
    space.offer_player(pid(1), tx).await.unwrap();
    space.offer_player(pid(2), dummy_sender()).await.unwrap();
    space.remove_player(pid(2)).await.unwrap();

    assert_eq!(
        rx.recv().await.unwrap(),
        PlayerNotice::Message {
            text: Text::literal("P-2 left")
        }
    );
}

#[tokio::test]
async fn test_close_makes_space_unavailable() {
    let space = spawn(GameActivity::new());
    space.close().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let err = space.info().await.unwrap_err();
    assert!(matches!(err, SpaceError::Unavailable(_)));
}

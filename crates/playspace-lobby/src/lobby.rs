//! The waiting lobby controller.

use playspace_config::{Identifier, Text};
use playspace_space::{
    GameActivity, GameRule, JoinResult, PlayerId, PlayerNotice, RuleResult, SoundCue,
    SpaceListener, SpaceView, StartResult, StartTicket, TicketState,
};
use playspace_tick::TICKS_PER_SECOND;

use crate::{Countdown, PlayerConfig, rebase};

/// Countdown length once a start has been requested, in ticks.
pub const START_REQUESTED_COUNTDOWN: u64 = 3 * TICKS_PER_SECOND as u64;

/// Bar, countdown and sound are refreshed once per second.
const REFRESH_INTERVAL: u64 = TICKS_PER_SECOND as u64;

/// The countdown sound plays during this many final seconds.
const FINAL_SECONDS: i64 = 3;

const WAITING_TITLE: &str = "text.playspace.game.waiting_lobby.bar.waiting";
const COUNTDOWN_TITLE: &str = "text.playspace.game.waiting_lobby.bar.countdown";
const CANCEL_MESSAGE: &str = "text.playspace.game.waiting_lobby.bar.cancel";

/// Mechanics that are switched off while players wait.
const DENIED_RULES: [GameRule; 9] = [
    GameRule::Crafting,
    GameRule::Portals,
    GameRule::Pvp,
    GameRule::FallDamage,
    GameRule::Hunger,
    GameRule::ThrowItems,
    GameRule::Interaction,
    GameRule::PlaceBlocks,
    GameRule::BreakBlocks,
];

/// Where a lobby is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyPhase {
    /// Waiting for enough players.
    Idle,
    /// Counting down because enough players joined.
    CountingDown,
    /// Counting down the short countdown after a start request.
    StartRequestedCountdown,
    /// The lobby has asked the space to start. Terminal unless the start
    /// is refused.
    Started,
}

/// Holds players until enough have joined, then counts down and starts.
///
/// All state is touched only from the space's own task, through the
/// [`SpaceListener`] callbacks.
#[derive(Debug)]
pub struct WaitingLobby {
    config: PlayerConfig,
    countdown: Option<Countdown>,
    start_requested: bool,
    started: bool,
    pending_start: Option<StartTicket>,
    bar_title: Text,
    bar_progress: f32,
    sound: Identifier,
}

impl WaitingLobby {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            countdown: None,
            start_requested: false,
            started: false,
            pending_start: None,
            bar_title: Text::translatable(WAITING_TITLE),
            bar_progress: 1.0,
            sound: Identifier::from_static("playspace", "lobby/countdown"),
        }
    }

    /// Installs a lobby on `activity`: denies the lobby rules and
    /// registers the lobby as a listener.
    pub fn apply_to(activity: &mut GameActivity, config: PlayerConfig) {
        for rule in DENIED_RULES {
            activity.set_rule(rule, RuleResult::Deny);
        }
        activity.listen(Self::new(config));
    }

    /// Replaces the sound played in the final seconds.
    pub fn with_sound(mut self, sound: Identifier) -> Self {
        self.sound = sound;
        self
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn countdown(&self) -> Option<Countdown> {
        self.countdown
    }

    pub fn phase(&self) -> LobbyPhase {
        match (self.started, self.countdown) {
            (true, _) => LobbyPhase::Started,
            (false, None) => LobbyPhase::Idle,
            (false, Some(_)) if self.start_requested => LobbyPhase::StartRequestedCountdown,
            (false, Some(_)) => LobbyPhase::CountingDown,
        }
    }

    /// The bar's current title and progress.
    pub fn bar(&self) -> (&Text, f32) {
        (&self.bar_title, self.bar_progress)
    }

    /// Answers a start request.
    ///
    /// Too few players always refuses, even after the lobby has started.
    /// Before the lobby starts, the request is taken as a cue to switch to
    /// the short countdown. After it has started, other listeners decide.
    pub fn request_start(&mut self, space: &mut dyn SpaceView) -> Option<StartResult> {
        if space.player_count() < self.config.min_players() {
            return Some(StartResult::NotEnoughPlayers);
        }

        if self.started {
            None
        } else {
            if !self.start_requested {
                tracing::info!(space_id = %space.id(), "lobby start requested");
            }
            self.start_requested = true;
            Some(StartResult::Ok)
        }
    }

    /// Decides whether a player may join. The countdown is recomputed
    /// straight away so that filling the lobby is reflected immediately.
    pub fn offer_player(&mut self, space: &mut dyn SpaceView, _player: PlayerId) -> JoinResult {
        if self.is_full(space) {
            return JoinResult::SpaceFull;
        }

        self.update_countdown(space);
        JoinResult::Ok
    }

    pub fn player_removed(&mut self, space: &mut dyn SpaceView, _player: PlayerId) {
        self.update_countdown(space);
    }

    pub fn tick(&mut self, space: &mut dyn SpaceView) {
        self.poll_pending_start(space);

        if self.started {
            return;
        }

        let now = world_time(space);
        if self.countdown.is_some_and(|countdown| countdown.is_finished(now)) {
            self.started = true;
            self.pending_start = Some(space.request_start());
            tracing::info!(space_id = %space.id(), time = now, "lobby countdown finished, starting");
        }

        if space.time() % REFRESH_INTERVAL == 0 {
            self.update_countdown(space);
            self.refresh_bar(space);
            self.play_countdown_sound(space);
        }
    }

    /// Checks whether the space has answered our start request. A refusal
    /// rolls the lobby back so the countdown can run again.
    fn poll_pending_start(&mut self, space: &mut dyn SpaceView) {
        let Some(ticket) = self.pending_start.as_mut() else {
            return;
        };

        match ticket.poll_state() {
            TicketState::Pending => {}
            TicketState::Ready(result) => {
                self.pending_start = None;
                if let Some(error) = result.error() {
                    tracing::warn!(space_id = %space.id(), %error, "game start refused, lobby rolled back");
                    self.started = false;
                    self.start_requested = false;
                    self.countdown = None;
                    space.broadcast(PlayerNotice::Alert {
                        text: Text::translatable_with(CANCEL_MESSAGE, [error.to_string()]),
                    });
                }
            }
            TicketState::Abandoned => {
                self.pending_start = None;
                tracing::debug!(space_id = %space.id(), "start request abandoned");
            }
        }
    }

    /// Rebases the countdown if the target duration changed.
    fn update_countdown(&mut self, space: &dyn SpaceView) {
        let target = self.target_duration(space);
        if target == self.countdown.map(|countdown| countdown.duration) {
            return;
        }

        let now = world_time(space);
        let previous = self.countdown;
        self.countdown = rebase(previous, now, target);

        match (previous, self.countdown) {
            (None, Some(countdown)) => {
                tracing::info!(space_id = %space.id(), duration = countdown.duration, "lobby countdown started");
            }
            (Some(_), None) => {
                tracing::info!(space_id = %space.id(), "lobby countdown stopped");
            }
            (_, countdown) => {
                tracing::debug!(space_id = %space.id(), ?countdown, "lobby countdown rebased");
            }
        }
    }

    fn target_duration(&self, space: &dyn SpaceView) -> Option<i64> {
        if self.start_requested {
            return Some(ticks(START_REQUESTED_COUNTDOWN));
        }

        if space.player_count() >= self.config.min_players() {
            let countdown = self.config.countdown();
            if self.is_full(space) {
                return Some(ticks(countdown.full_ticks()));
            }
            if self.is_ready(space) {
                return Some(ticks(countdown.ready_ticks()));
            }
        }

        None
    }

    fn refresh_bar(&mut self, space: &mut dyn SpaceView) {
        match self.countdown {
            Some(countdown) => {
                let now = world_time(space);
                self.bar_title = Text::translatable_with(
                    COUNTDOWN_TITLE,
                    [countdown.remaining_seconds(now).to_string()],
                );
                self.bar_progress = countdown.progress(now);
            }
            None => {
                self.bar_title = Text::translatable(WAITING_TITLE);
                self.bar_progress = 1.0;
            }
        }

        space.broadcast(PlayerNotice::Bar {
            title: self.bar_title.clone(),
            progress: self.bar_progress,
        });
    }

    fn play_countdown_sound(&self, space: &mut dyn SpaceView) {
        let Some(countdown) = self.countdown else {
            return;
        };

        let remaining = countdown.remaining_seconds(world_time(space));
        if remaining <= FINAL_SECONDS {
            let pitch = if remaining == 0 { 1.5 } else { 1.0 };
            space.broadcast(PlayerNotice::Sound(SoundCue {
                sound: self.sound.clone(),
                volume: 1.0,
                pitch,
            }));
        }
    }

    fn is_ready(&self, space: &dyn SpaceView) -> bool {
        space.player_count() >= self.config.threshold_players()
    }

    /// Full at the game's own limit, or at the host's if that is lower.
    fn is_full(&self, space: &dyn SpaceView) -> bool {
        let count = space.player_count();
        count >= self.config.max_players() || count >= space.connection_ceiling()
    }
}

impl SpaceListener for WaitingLobby {
    fn on_tick(&mut self, space: &mut dyn SpaceView) {
        self.tick(space);
    }

    fn on_offer_player(&mut self, space: &mut dyn SpaceView, player: PlayerId) -> JoinResult {
        self.offer_player(space, player)
    }

    fn on_player_removed(&mut self, space: &mut dyn SpaceView, player: PlayerId) {
        self.player_removed(space, player);
    }

    fn on_request_start(&mut self, space: &mut dyn SpaceView) -> Option<StartResult> {
        self.request_start(space)
    }
}

fn world_time(space: &dyn SpaceView) -> i64 {
    ticks(space.time())
}

fn ticks(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use playspace_space::SpaceId;
    use tokio::sync::oneshot;

    use crate::CountdownConfig;

    /// In-memory space: tests set time and player count directly.
    struct FakeSpace {
        time: u64,
        players: usize,
        ceiling: usize,
        notices: Vec<PlayerNotice>,
        start_requests: Vec<oneshot::Sender<StartResult>>,
    }

    impl FakeSpace {
        fn new(players: usize) -> Self {
            Self {
                time: 0,
                players,
                ceiling: usize::MAX,
                notices: Vec::new(),
                start_requests: Vec::new(),
            }
        }

        fn sounds(&self) -> Vec<f32> {
            self.notices
                .iter()
                .filter_map(|notice| match notice {
                    PlayerNotice::Sound(cue) => Some(cue.pitch),
                    _ => None,
                })
                .collect()
        }
    }

    impl SpaceView for FakeSpace {
        fn id(&self) -> SpaceId {
            SpaceId(1)
        }

        fn time(&self) -> u64 {
            self.time
        }

        fn player_count(&self) -> usize {
            self.players
        }

        fn players(&self) -> Vec<PlayerId> {
            (0..self.players as u64).map(PlayerId).collect()
        }

        fn connection_ceiling(&self) -> usize {
            self.ceiling
        }

        fn broadcast(&mut self, notice: PlayerNotice) {
            self.notices.push(notice);
        }

        fn request_start(&mut self) -> StartTicket {
            let (tx, ticket) = StartTicket::channel();
            self.start_requests.push(tx);
            ticket
        }
    }

    /// min 2, threshold 4, max 8, ready 600 ticks, full 200 ticks.
    fn lobby() -> WaitingLobby {
        let config = PlayerConfig::new(2, 8)
            .unwrap()
            .with_threshold(4)
            .with_countdown(CountdownConfig {
                ready_seconds: 30,
                full_seconds: 10,
            });
        WaitingLobby::new(config)
    }

    /// Offers a player and, if accepted, adds them like the space would.
    fn join(lobby: &mut WaitingLobby, space: &mut FakeSpace) -> JoinResult {
        let player = PlayerId(space.players as u64);
        let result = lobby.offer_player(space, player);
        if result.is_ok() {
            space.players += 1;
        }
        result
    }

    fn run_until(lobby: &mut WaitingLobby, space: &mut FakeSpace, time: u64) {
        while space.time < time {
            space.time += 1;
            lobby.tick(space);
        }
    }

    #[test]
    fn test_apply_to_denies_lobby_rules() {
        let mut activity = GameActivity::new();
        WaitingLobby::apply_to(&mut activity, PlayerConfig::new(1, 4).unwrap());
        for rule in DENIED_RULES {
            assert_eq!(activity.test_rule(rule), RuleResult::Deny);
        }
        assert_eq!(activity.listener_count(), 1);
    }

    #[test]
    fn test_ready_then_full_keeps_elapsed_time() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(3);

        // Fourth offer sees three players; the countdown starts on the
        // next recompute.
        assert!(join(&mut lobby, &mut space).is_ok());
        assert_eq!(lobby.countdown(), None);
        run_until(&mut lobby, &mut space, 20);
        assert_eq!(lobby.countdown(), Some(Countdown::new(20, 600)));

        // Jump to capacity with 100 ticks elapsed.
        space.time = 120;
        space.players = 8;
        lobby.player_removed(&mut space, PlayerId(99));
        let countdown = lobby.countdown().unwrap();
        assert_eq!(countdown.duration, 200);
        assert_eq!(countdown.remaining_ticks(120), 200);
    }

    #[test]
    fn test_offer_at_capacity_is_rejected() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(8);
        lobby.player_removed(&mut space, PlayerId(0));
        let before = lobby.countdown();

        assert_eq!(join(&mut lobby, &mut space), JoinResult::SpaceFull);
        assert_eq!(space.players, 8);
        assert_eq!(lobby.countdown(), before);
    }

    #[test]
    fn test_host_ceiling_counts_as_full() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(3);
        space.ceiling = 3;
        assert_eq!(join(&mut lobby, &mut space), JoinResult::SpaceFull);

        lobby.player_removed(&mut space, PlayerId(0));
        assert_eq!(lobby.countdown().map(|c| c.duration), Some(200));
    }

    #[test]
    fn test_request_start_below_minimum_always_refuses() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(1);
        assert_eq!(lobby.request_start(&mut space), Some(StartResult::NotEnoughPlayers));

        lobby.started = true;
        assert_eq!(lobby.request_start(&mut space), Some(StartResult::NotEnoughPlayers));
    }

    #[test]
    fn test_request_start_after_started_passes_through() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(2);
        lobby.started = true;
        lobby.countdown = Some(Countdown::new(0, 600));

        assert_eq!(lobby.request_start(&mut space), None);
        assert_eq!(lobby.countdown(), Some(Countdown::new(0, 600)));
        assert!(!lobby.start_requested);
    }

    #[test]
    fn test_request_start_switches_to_short_countdown() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(2);
        lobby.player_removed(&mut space, PlayerId(0));
        assert_eq!(lobby.phase(), LobbyPhase::Idle);

        assert_eq!(lobby.request_start(&mut space), Some(StartResult::Ok));
        run_until(&mut lobby, &mut space, 20);
        assert_eq!(lobby.countdown(), Some(Countdown::new(20, 60)));
        assert_eq!(lobby.phase(), LobbyPhase::StartRequestedCountdown);
    }

    #[test]
    fn test_countdown_end_requests_start() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(2);
        lobby.request_start(&mut space);

        run_until(&mut lobby, &mut space, 79);
        assert!(space.start_requests.is_empty());
        run_until(&mut lobby, &mut space, 80);
        assert_eq!(space.start_requests.len(), 1);
        assert_eq!(lobby.phase(), LobbyPhase::Started);

        // Nothing more happens once started.
        run_until(&mut lobby, &mut space, 200);
        assert_eq!(space.start_requests.len(), 1);
    }

    #[test]
    fn test_refused_start_rolls_back() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(2);
        lobby.request_start(&mut space);
        run_until(&mut lobby, &mut space, 80);

        let reply = space.start_requests.pop().unwrap();
        reply
            .send(StartResult::Error(Text::literal("arena busy")))
            .unwrap();
        space.notices.clear();
        run_until(&mut lobby, &mut space, 81);

        assert_eq!(lobby.phase(), LobbyPhase::Idle);
        assert!(!lobby.start_requested);
        assert_eq!(
            space.notices,
            vec![PlayerNotice::Alert {
                text: Text::translatable_with(CANCEL_MESSAGE, ["arena busy"]),
            }]
        );

        // Two players is still below the threshold of four: no new countdown.
        run_until(&mut lobby, &mut space, 100);
        assert_eq!(lobby.countdown(), None);
    }

    #[test]
    fn test_accepted_start_stays_started() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(2);
        lobby.request_start(&mut space);
        run_until(&mut lobby, &mut space, 80);

        space.start_requests.pop().unwrap().send(StartResult::Ok).unwrap();
        run_until(&mut lobby, &mut space, 120);
        assert_eq!(lobby.phase(), LobbyPhase::Started);
        assert!(lobby.pending_start.is_none());
    }

    #[test]
    fn test_final_seconds_play_sound_once_each() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(2);
        lobby.request_start(&mut space);
        run_until(&mut lobby, &mut space, 200);

        // Countdown 20..80, refreshed at 20, 40, 60, 80.
        assert_eq!(space.sounds(), vec![1.0, 1.0, 1.0, 1.5]);
    }

    #[test]
    fn test_bar_shows_waiting_then_countdown() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(1);
        run_until(&mut lobby, &mut space, 20);
        assert_eq!(lobby.bar(), (&Text::translatable(WAITING_TITLE), 1.0));

        space.players = 4;
        run_until(&mut lobby, &mut space, 40);
        // Countdown started at 40 for 600 ticks.
        assert_eq!(
            lobby.bar(),
            (&Text::translatable_with(COUNTDOWN_TITLE, ["30"]), 1.0)
        );

        run_until(&mut lobby, &mut space, 340);
        assert_eq!(
            lobby.bar(),
            (&Text::translatable_with(COUNTDOWN_TITLE, ["15"]), 0.5)
        );
    }

    #[test]
    fn test_players_leaving_stops_countdown() {
        let mut lobby = lobby();
        let mut space = FakeSpace::new(4);
        lobby.player_removed(&mut space, PlayerId(9));
        assert_eq!(lobby.phase(), LobbyPhase::CountingDown);

        space.players = 3;
        lobby.player_removed(&mut space, PlayerId(3));
        assert_eq!(lobby.countdown(), None);
        assert_eq!(lobby.phase(), LobbyPhase::Idle);
    }
}

use std::sync::Arc;
use std::time::Duration;

use playspace::prelude::*;
use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, mpsc};

// ---------------------------------------------------------------------------
// Game type
// ---------------------------------------------------------------------------

/// Config for the demo game, stored inline next to `type` and `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WaitingRoomConfig {
    players: PlayerConfig,
    #[serde(default)]
    tick: TickConfig,
}

/// Takes over once the lobby's countdown ends.
struct Round {
    started: Arc<Notify>,
}

impl SpaceListener for Round {
    fn on_request_start(&mut self, space: &mut dyn SpaceView) -> Option<StartResult> {
        tracing::info!(space_id = %space.id(), players = space.player_count(), "round starting");
        space.broadcast(PlayerNotice::Message {
            text: Text::literal("Go!"),
        });
        self.started.notify_one();
        Some(StartResult::Ok)
    }
}

fn waiting_room(started: Arc<Notify>) -> GameType<WaitingRoomConfig> {
    GameType::new(
        Identifier::from_static("demo", "waiting_room"),
        ConfigCodec::inline(),
        move |context: OpenContext<WaitingRoomConfig>| {
            let config = context.config().clone();
            let started = Arc::clone(&started);
            let settings = SpaceSettings {
                tick: config.tick,
                ..SpaceSettings::default()
            };
            Ok(OpenProcedure::build(
                Arc::clone(context.host()),
                settings,
                move |activity| {
                    WaitingLobby::apply_to(activity, config.players);
                    activity.listen(Round { started });
                    Ok(())
                },
            ))
        },
    )
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Logs everything a player is shown until their channel closes.
async fn watch_player(player: PlayerId, mut notices: mpsc::UnboundedReceiver<PlayerNotice>) {
    while let Some(notice) = notices.recv().await {
        match notice {
            PlayerNotice::Bar { title, progress } => {
                tracing::debug!(%player, %title, progress, "bar");
            }
            PlayerNotice::Sound(cue) => {
                tracing::info!(%player, sound = %cue.sound, pitch = cue.pitch, "sound");
            }
            PlayerNotice::Message { text } | PlayerNotice::Alert { text } => {
                tracing::info!(%player, %text, "message");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

const DOCUMENT: &str = r#"{
    "type": "demo:waiting_room",
    "name": "Demo Waiting Room",
    "players": {
        "min": 2,
        "max": 4,
        "threshold": 3,
        "countdown": { "ready_seconds": 3, "full_seconds": 1 }
    }
}"#;

#[tokio::main]
async fn main() -> Result<(), PlayspaceError> {
    playspace::logging::init();

    let started = Arc::new(Notify::new());
    let host = Arc::new(LocalHost::new(16));
    let mut builder = Playspace::builder().host(host);
    builder.register(waiting_room(Arc::clone(&started)))?;
    let playspace = builder.build();

    let document: serde_json::Value = serde_json::from_str(DOCUMENT).map_err(ConfigError::from)?;
    let game = playspace.decode_named(Identifier::from_static("demo", "games/waiting_room"), &document)?;
    tracing::info!(game = %game.describe(), name = %game.name_text(), "decoded game");

    let space = playspace.open(&game).await?;

    for id in 1..=3 {
        let player = PlayerId(id);
        let (tx, rx) = mpsc::unbounded_channel();
        let result = space.offer_player(player, tx).await?;
        tracing::info!(%player, ?result, "offered player");
        tokio::spawn(watch_player(player, rx));
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    started.notified().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let info = space.info().await?;
    tracing::info!(time = info.time, players = info.player_count, "game running");
    space.close().await?;
    Ok(())
}

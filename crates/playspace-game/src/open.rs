//! The open pipeline: configured game → running space.
//!
//! Opening runs in two phases. The game type's open function runs on the
//! blocking pool, since it is where game types do their CPU-heavy setup
//! (map generation and the like). It returns an [`OpenProcedure`] whose
//! future then runs on the runtime and produces the space.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use playspace_config::GameConfig;
use playspace_space::{GameActivity, HostHandle, ManagedGameSpace, SpaceSettings};

use crate::{ConfiguredGame, ErrorReporter, OpenError};

/// Context report entries are filed under when opening fails.
const OPEN_CONTEXT: &str = "Opening game";

/// Everything a game type's open function gets to work with.
pub struct OpenContext<C> {
    host: HostHandle,
    game: Arc<ConfiguredGame<C>>,
}

impl<C: GameConfig> OpenContext<C> {
    pub fn host(&self) -> &HostHandle {
        &self.host
    }

    pub fn game(&self) -> &Arc<ConfiguredGame<C>> {
        &self.game
    }

    pub fn config(&self) -> &C {
        self.game.config()
    }
}

/// The second phase of opening a game: a future that builds the space.
pub struct OpenProcedure {
    future: BoxFuture<'static, Result<ManagedGameSpace, OpenError>>,
}

impl OpenProcedure {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<ManagedGameSpace, OpenError>> + Send + 'static,
    {
        Self {
            future: future.boxed(),
        }
    }

    /// The common case: configure a fresh [`GameActivity`] and spawn a
    /// space running it.
    pub fn build<F>(host: HostHandle, settings: SpaceSettings, configure: F) -> Self
    where
        F: FnOnce(&mut GameActivity) -> Result<(), OpenError> + Send + 'static,
    {
        Self::new(async move {
            let mut activity = GameActivity::new();
            configure(&mut activity)?;
            Ok(ManagedGameSpace::spawn(host, settings, activity))
        })
    }

    pub async fn open(self) -> Result<ManagedGameSpace, OpenError> {
        self.future.await
    }
}

impl fmt::Debug for OpenProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenProcedure").finish_non_exhaustive()
    }
}

impl<C: GameConfig> ConfiguredGame<C> {
    /// Runs the game type's open function on the current thread.
    pub fn open_procedure(self: &Arc<Self>, host: HostHandle) -> Result<OpenProcedure, OpenError> {
        let context = OpenContext {
            host,
            game: Arc::clone(self),
        };
        self.game_type().open(context)
    }

    /// Opens the game.
    ///
    /// The pipeline starts immediately on a spawned task, so it makes
    /// progress even if the returned future is never polled. Must be
    /// called from within a Tokio runtime.
    ///
    /// Failures other than [`OpenError::Rejected`] are also sent to the
    /// host as a diagnostic report, including a panic in either phase.
    /// The caller always gets the original error back.
    pub fn open(
        self: &Arc<Self>,
        host: HostHandle,
    ) -> impl Future<Output = Result<ManagedGameSpace, OpenError>> + Send + use<C> {
        let game = Arc::clone(self);
        let pipeline = tokio::spawn(async move {
            // The pipeline runs on its own task so a panic in the
            // procedure still reaches the report below.
            let result = match tokio::spawn(run_pipeline(Arc::clone(&game), host.clone())).await {
                Ok(result) => result,
                Err(err) => Err(OpenError::Setup(err)),
            };
            match &result {
                Ok(space) => {
                    tracing::info!(
                        game_type = %game.game_type().id(),
                        space_id = %space.id(),
                        "game opened"
                    );
                }
                Err(err) if err.is_expected() => {
                    tracing::debug!(game = %game.describe(), error = %err, "game refused to open");
                }
                Err(err) => {
                    tracing::warn!(game = %game.describe(), error = %err, "failed to open game");
                    report_failure(host, game.describe(), err);
                }
            }
            result
        });

        async move {
            match pipeline.await {
                Ok(result) => result,
                Err(err) => Err(OpenError::Setup(err)),
            }
        }
    }
}

async fn run_pipeline<C: GameConfig>(
    game: Arc<ConfiguredGame<C>>,
    host: HostHandle,
) -> Result<ManagedGameSpace, OpenError> {
    let procedure =
        tokio::task::spawn_blocking(move || game.open_procedure(host)).await??;
    procedure.open().await
}

/// Files a report about `err` from a detached task.
fn report_failure(host: HostHandle, subject: String, err: &OpenError) {
    let message = crate::report::error_chain(err);
    tokio::spawn(async move {
        let mut reporter = ErrorReporter::open(host, subject);
        reporter.report_message(OPEN_CONTEXT, message);
    });
}

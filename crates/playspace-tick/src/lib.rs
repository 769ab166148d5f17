//! Fixed-rate world clock for Playspace game spaces.
//!
//! Every game space advances in discrete ticks. The host runs at
//! [`TICKS_PER_SECOND`] ticks per second and all game-facing durations
//! (countdowns, cooldowns) are expressed in ticks, never in wall-clock time.
//!
//! # Integration
//!
//! The scheduler sits inside a space actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         tick = scheduler.wait_for_tick() => {
//!             run_listeners(tick.time);
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

/// The host's fixed tick rate.
pub const TICKS_PER_SECOND: u32 = 20;

/// Converts whole seconds to ticks at [`TICKS_PER_SECOND`].
pub const fn seconds_to_ticks(seconds: u32) -> u64 {
    seconds as u64 * TICKS_PER_SECOND as u64
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when the clock wakes up late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TickPolicy {
    /// Forget the missed ticks and schedule the next one from now.
    #[default]
    Skip,
    /// Fire missed ticks back to back, at most `max_catchup` of them.
    CatchUp { max_catchup: u32 },
}

/// Configuration for a [`TickScheduler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Ticks per second. Clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
    pub policy: TickPolicy,
    /// Fraction of the tick budget (0.0–1.0) after which a slow tick is
    /// logged as a warning.
    pub budget_warn_threshold: f64,
    /// Random delay (0–max µs) before the first tick, so spaces opened in
    /// the same instant do not tick in lockstep.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: TICKS_PER_SECOND,
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Config for a given rate with every other field defaulted.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. Called by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        let clamped = self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
        if clamped != self.tick_rate_hz {
            warn!(
                rate = self.tick_rate_hz,
                clamped, "tick_rate_hz out of range, clamping"
            );
            self.tick_rate_hz = clamped;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    /// Wall-clock length of one tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// One step of the world clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// World time after this tick: starts at 1 and grows by one per tick.
    pub time: u64,
    /// `true` if the clock woke up noticeably late.
    pub overrun: bool,
    /// Ticks dropped because of the overrun.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Drives world time for a single game space.
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Duration,
    time: u64,
    next_tick: TokioInstant,
    /// Set by `wait_for_tick`, consumed by `record_tick_end`.
    tick_start: Option<Instant>,
    total_overruns: u64,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let jitter = if config.initial_jitter_us > 0 {
            Duration::from_micros(rand::rng().random_range(0..config.initial_jitter_us))
        } else {
            Duration::ZERO
        };

        debug!(
            rate_hz = config.tick_rate_hz,
            policy = ?config.policy,
            "tick scheduler created"
        );

        Self {
            next_tick: TokioInstant::now() + tick_duration + jitter,
            config,
            tick_duration,
            time: 0,
            tick_start: None,
            total_overruns: 0,
        }
    }

    /// Scheduler at the host's default rate.
    pub fn standard() -> Self {
        Self::new(TickConfig::default())
    }

    /// Waits until the next tick is due and advances world time.
    pub async fn wait_for_tick(&mut self) -> Tick {
        let due = self.next_tick;
        time::sleep_until(due).await;

        let now = TokioInstant::now();
        let late_by = now.saturating_duration_since(due);
        // More than 10% late counts as an overrun.
        let overrun = late_by > self.tick_duration / 10;
        let behind = (late_by.as_nanos() / self.tick_duration.as_nanos()) as u64;
        let mut ticks_skipped = 0;

        self.next_tick = match self.config.policy {
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped = behind;
                }
                now + self.tick_duration
            }
            TickPolicy::CatchUp { max_catchup } => {
                if overrun && behind > max_catchup as u64 {
                    ticks_skipped = behind - max_catchup as u64;
                    now + self.tick_duration
                } else {
                    due + self.tick_duration
                }
            }
        };

        if overrun {
            self.total_overruns += 1;
            if ticks_skipped > 0 {
                warn!(
                    time = self.time + 1,
                    skipped = ticks_skipped,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "world clock overrun"
                );
            }
        }

        self.time += 1;
        self.tick_start = Some(Instant::now());
        trace!(time = self.time, overrun, "tick");

        Tick {
            time: self.time,
            overrun,
            ticks_skipped,
        }
    }

    /// Marks the end of the work done for the current tick.
    ///
    /// Logs a warning if that work used more than the configured share of
    /// the tick budget. A call without a preceding tick is ignored.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();
        let utilization = elapsed.as_secs_f64() / self.tick_duration.as_secs_f64();
        if utilization >= self.config.budget_warn_threshold {
            warn!(
                time = self.time,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "tick exceeded budget threshold"
            );
        }
    }

    /// Current world time (number of ticks fired so far).
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn total_overruns(&self) -> u64 {
        self.total_overruns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_to_ticks() {
        assert_eq!(seconds_to_ticks(0), 0);
        assert_eq!(seconds_to_ticks(3), 60);
        assert_eq!(seconds_to_ticks(30), 600);
    }

    #[test]
    fn test_validated_clamps_rate() {
        assert_eq!(TickConfig::with_rate(0).validated().tick_rate_hz, 1);
        assert_eq!(TickConfig::with_rate(500).validated().tick_rate_hz, 128);
        assert_eq!(TickConfig::with_rate(20).validated().tick_rate_hz, 20);
    }

    #[test]
    fn test_policy_deserializes_from_tag() {
        let policy: TickPolicy =
            serde_json::from_str(r#"{ "policy": "catch_up", "max_catchup": 4 }"#).unwrap();
        assert_eq!(policy, TickPolicy::CatchUp { max_catchup: 4 });
    }
}

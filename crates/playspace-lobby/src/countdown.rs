//! Lobby countdown state and rebasing.
//!
//! Times are world ticks as `i64`: rebasing an extended countdown can
//! move its start before tick zero.

use playspace_tick::TICKS_PER_SECOND;

/// An active countdown. The lobby holds an `Option<Countdown>`, `None`
/// meaning no countdown is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub start: i64,
    pub duration: i64,
}

impl Countdown {
    pub fn new(start: i64, duration: i64) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> i64 {
        self.start + self.duration
    }

    pub fn is_finished(&self, now: i64) -> bool {
        now >= self.end()
    }

    /// Ticks left at `now`, never negative.
    pub fn remaining_ticks(&self, now: i64) -> i64 {
        (self.end() - now).max(0)
    }

    /// Whole seconds left at `now`, rounded down.
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        self.remaining_ticks(now) / i64::from(TICKS_PER_SECOND)
    }

    /// Fraction of the countdown still to go, in `0.0..=1.0`.
    pub fn progress(&self, now: i64) -> f32 {
        if self.duration <= 0 {
            return 0.0;
        }
        self.remaining_ticks(now) as f32 / self.duration as f32
    }
}

/// Moves `current` onto a new target duration at time `now`.
///
/// - `target` of `None` stops the countdown.
/// - With nothing running, a fresh countdown starts at `now`.
/// - Otherwise the time left is kept if it is shorter than `target`, and
///   cut down to `target` if it is longer. A shorter target never restarts
///   the countdown and a longer one never adds time.
pub fn rebase(current: Option<Countdown>, now: i64, target: Option<i64>) -> Option<Countdown> {
    let target = target?;
    let start = match current {
        Some(countdown) => {
            let remaining = (countdown.end() - now).min(target);
            now.min(now + remaining - target)
        }
        None => now,
    };
    Some(Countdown::new(start, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebase_from_inactive_starts_now() {
        assert_eq!(rebase(None, 40, Some(600)), Some(Countdown::new(40, 600)));
    }

    #[test]
    fn test_rebase_to_inactive_clears() {
        assert_eq!(rebase(Some(Countdown::new(0, 600)), 100, None), None);
        assert_eq!(rebase(None, 100, None), None);
    }

    #[test]
    fn test_rebase_shrink_keeps_elapsed_time() {
        // Ready (600) at t=0, then full (200) at t=100 with 500 left.
        let rebased = rebase(Some(Countdown::new(0, 600)), 100, Some(200)).unwrap();
        assert_eq!(rebased, Countdown::new(100, 200));
        assert_eq!(rebased.remaining_ticks(100), 200);
    }

    #[test]
    fn test_rebase_shrink_keeps_shorter_remainder() {
        // 100 left of 600; a 200 target must not add time.
        let rebased = rebase(Some(Countdown::new(0, 600)), 500, Some(200)).unwrap();
        assert_eq!(rebased, Countdown::new(400, 200));
        assert_eq!(rebased.remaining_ticks(500), 100);
    }

    #[test]
    fn test_rebase_extend_keeps_remaining() {
        // 100 left of 200; stretching to 600 keeps 100 left.
        let rebased = rebase(Some(Countdown::new(0, 200)), 100, Some(600)).unwrap();
        assert_eq!(rebased, Countdown::new(-400, 600));
        assert_eq!(rebased.remaining_ticks(100), 100);
        assert_eq!(rebased.end(), 200);
    }

    #[test]
    fn test_remaining_and_progress() {
        let countdown = Countdown::new(0, 200);
        assert_eq!(countdown.remaining_ticks(50), 150);
        assert_eq!(countdown.remaining_seconds(50), 7);
        assert_eq!(countdown.progress(100), 0.5);
        assert_eq!(countdown.remaining_ticks(300), 0);
        assert!(countdown.is_finished(200));
        assert!(!countdown.is_finished(199));
    }
}

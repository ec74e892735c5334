use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::game_session::{Side, TimeControl};

/// Whole seconds from client input; `None` for negative or oversized values.
pub fn checked_seconds(value: i64) -> Option<u32> {
    u32::try_from(value).ok()
}

/// Remaining time per side for one session.
///
/// Stored values change only through [`Clock::credit_increment`] and
/// [`Clock::sync`]. Wall-clock time is used for timeout detection but never
/// written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    white_remaining: u32,
    black_remaining: u32,
    increment: u32,
    last_update_at: DateTime<Utc>,
}

impl Clock {
    pub fn new(time_control: TimeControl, now: DateTime<Utc>) -> Self {
        Clock {
            white_remaining: time_control.initial_seconds,
            black_remaining: time_control.initial_seconds,
            increment: time_control.increment_seconds,
            last_update_at: now,
        }
    }

    pub fn remaining(&self, side: Side) -> u32 {
        match side {
            Side::White => self.white_remaining,
            Side::Black => self.black_remaining,
        }
    }

    /// Called once the mover's move is committed.
    pub fn credit_increment(&mut self, mover: Side, now: DateTime<Utc>) {
        let slot = match mover {
            Side::White => &mut self.white_remaining,
            Side::Black => &mut self.black_remaining,
        };
        *slot = slot.saturating_add(self.increment);
        self.last_update_at = now;
    }

    /// Last-write-wins overwrite with client-reported values.
    pub fn sync(&mut self, white_remaining: u32, black_remaining: u32, now: DateTime<Utc>) {
        self.white_remaining = white_remaining;
        self.black_remaining = black_remaining;
        self.last_update_at = now;
    }

    /// Remaining time of `side` as of `now`, charging elapsed time to the side on move.
    pub fn remaining_at(&self, side: Side, side_to_move: Side, now: DateTime<Utc>) -> u32 {
        let stored = self.remaining(side);
        if side != side_to_move {
            return stored;
        }
        let elapsed = (now - self.last_update_at).num_seconds().max(0);
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        stored.saturating_sub(elapsed)
    }

    /// The side on move, if its time has run out.
    pub fn flagged_side(&self, side_to_move: Side, now: DateTime<Utc>) -> Option<Side> {
        if self.remaining_at(side_to_move, side_to_move, now) == 0 {
            Some(side_to_move)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use test_case::test_case;

    fn clock(initial: u32, increment: u32) -> (Clock, DateTime<Utc>) {
        let now = Utc::now();
        (
            Clock::new(
                TimeControl {
                    initial_seconds: initial,
                    increment_seconds: increment,
                },
                now,
            ),
            now,
        )
    }

    #[test]
    fn test_new_clock_gives_both_sides_initial_time() {
        let (clock, _) = clock(300, 5);

        assert_eq!(clock.remaining(Side::White), 300);
        assert_eq!(clock.remaining(Side::Black), 300);
    }

    #[test]
    fn test_increment_credits_only_the_mover() {
        let (mut clock, now) = clock(300, 5);
        let later = now + Duration::seconds(4);

        clock.credit_increment(Side::White, later);

        assert_eq!(clock.remaining(Side::White), 305);
        assert_eq!(clock.remaining(Side::Black), 300);
        // Elapsed time is measured from the increment, not from the start.
        assert_eq!(
            clock.remaining_at(Side::Black, Side::Black, later + Duration::seconds(10)),
            290
        );
    }

    #[test]
    fn test_sync_overwrites_both_sides() {
        let (mut clock, now) = clock(300, 5);

        clock.sync(120, 450, now);

        assert_eq!(clock.remaining(Side::White), 120);
        assert_eq!(clock.remaining(Side::Black), 450);
    }

    #[test]
    fn test_remaining_at_charges_only_side_on_move() {
        let (clock, now) = clock(60, 0);
        let later = now + Duration::seconds(25);

        assert_eq!(clock.remaining_at(Side::White, Side::White, later), 35);
        assert_eq!(clock.remaining_at(Side::Black, Side::White, later), 60);
        // Stored values untouched.
        assert_eq!(clock.remaining(Side::White), 60);
    }

    #[test]
    fn test_flagged_side_after_time_runs_out() {
        let (clock, now) = clock(10, 0);

        assert_eq!(clock.flagged_side(Side::White, now + Duration::seconds(9)), None);
        assert_eq!(
            clock.flagged_side(Side::White, now + Duration::seconds(10)),
            Some(Side::White)
        );
        assert_eq!(
            clock.flagged_side(Side::Black, now + Duration::seconds(3600)),
            Some(Side::Black)
        );
    }

    #[test_case(0, Some(0))]
    #[test_case(300, Some(300))]
    #[test_case(-1, None)]
    #[test_case(i64::MAX, None)]
    fn test_checked_seconds(value: i64, expected: Option<u32>) {
        assert_eq!(checked_seconds(value), expected);
    }
}

//! Per-turn countdown for timed matches.
//!
//! A [`TurnTimer`] is attached to a [`Match`](super::game::Match) rather than
//! baked into it. The match feeds it every event it emits; the timer arms on
//! `Started` and `TurnExecuted` and stops on `GameComplete`. Expiry is only
//! reported. Deciding what happens to the player who ran out of time is left
//! to the caller.

use chrono::{DateTime, Duration, Utc};

use super::game::{MatchEvent, Seat};

/// Default turn length for timed matches.
pub const DEFAULT_TURN_DURATION_MS: u64 = 3000;

/// Countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    /// Not armed yet
    #[default]
    Idle,
    /// Counting down on `seat`'s turn
    Running {
        seat: Seat,
        expires_at: DateTime<Utc>,
    },
    /// Ran out on `seat`'s turn; re-armed by the next move
    Expired { seat: Seat },
    /// Match finished
    Stopped,
}

/// Countdown for the seat currently holding the turn.
#[derive(Debug, Clone)]
pub struct TurnTimer {
    duration: Duration,
    state: TimerState,
}

impl TurnTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: TimerState::Idle,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX)))
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// Re-arm or stop in response to a match event.
    pub fn observe(&mut self, event: &MatchEvent, now: DateTime<Utc>) {
        match event {
            MatchEvent::Started { first } => self.arm(*first, now),
            MatchEvent::TurnExecuted {
                next_turn: Some(seat),
                ..
            } => self.arm(*seat, now),
            MatchEvent::TurnExecuted {
                next_turn: None, ..
            }
            | MatchEvent::GameComplete { .. } => self.state = TimerState::Stopped,
            MatchEvent::TimeExpired { .. } => {}
        }
    }

    fn arm(&mut self, seat: Seat, now: DateTime<Utc>) {
        self.state = TimerState::Running {
            seat,
            expires_at: now
                .checked_add_signed(self.duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
    }

    /// Report expiry once per arming.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<Seat> {
        match self.state {
            TimerState::Running { seat, expires_at } if now >= expires_at => {
                self.state = TimerState::Expired { seat };
                Some(seat)
            }
            _ => None,
        }
    }

    /// Time left on the running countdown.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.state {
            TimerState::Running { expires_at, .. } => {
                Some((expires_at - now).max(Duration::zero()))
            }
            _ => None,
        }
    }

    pub fn to_json(&self, now: DateTime<Utc>) -> serde_json::Value {
        match self.state {
            TimerState::Idle => serde_json::json!({"status": "idle"}),
            TimerState::Running { seat, .. } => serde_json::json!({
                "status": "running",
                "seat": seat.index(),
                "ms_remaining": self.remaining(now).map(|d| d.num_milliseconds()).unwrap_or(0)
            }),
            TimerState::Expired { seat } => serde_json::json!({
                "status": "expired",
                "seat": seat.index()
            }),
            TimerState::Stopped => serde_json::json!({"status": "stopped"}),
        }
    }
}

impl Default for TurnTimer {
    fn default() -> Self {
        Self::from_millis(DEFAULT_TURN_DURATION_MS)
    }
}

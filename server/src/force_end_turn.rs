//! Force-end-turn timer (§5 "Cancellation & timeouts", §9): generalizes
//! `net::KeepaliveTimer`'s armed-deadline shape to the one per-game
//! deadline that, left unattended, synthesizes an `ENDTURN` on behalf of
//! whichever seat is holding up the table.

use std::time::{Duration, Instant};

/// Tracks when the current player's turn should be force-ended if they
/// haven't acted. Re-armed every time a `TURN` message would be sent
/// (§4.F), including the mid-turn `Turn` re-broadcasts that follow a
/// `RollDice`/robber resolution.
pub struct ForceEndTurnTimer {
    deadline: Instant,
    timeout: Duration,
}

impl ForceEndTurnTimer {
    pub fn new(timeout: Duration) -> Self {
        ForceEndTurnTimer {
            deadline: Instant::now() + timeout,
            timeout,
        }
    }

    /// Re-arms the deadline a full `timeout` out from now — called
    /// whenever the current player changes or takes a turn-ending action.
    pub fn rearm(&mut self) {
        self.deadline = Instant::now() + self.timeout;
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn time_until_expired(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_timer_is_not_expired() {
        let timer = ForceEndTurnTimer::new(Duration::from_secs(60));
        assert!(!timer.is_expired());
    }

    #[test]
    fn rearm_pushes_the_deadline_out() {
        let mut timer = ForceEndTurnTimer::new(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.is_expired());
        timer.rearm();
        assert!(!timer.is_expired());
    }
}

//! Per-connection keepalive (§4.B "Keepalive"). When a peer has been idle
//! for `PING_INTERVAL`, the server sends a ping; if an expected pong
//! arrives within [`crate::PING_JITTER_TOLERANCE`] of the scheduled time
//! it is logged at `trace` instead of `debug` so healthy connections don't
//! spam the log.

use std::time::{Duration, Instant};

use crate::{PING_INTERVAL, PING_JITTER_TOLERANCE};

/// Tracks when the next ping is due and whether the last one landed inside
/// the expected jitter window. One instance lives alongside each
/// `Connection`.
pub struct KeepaliveTimer {
    next_ping_due: Instant,
}

impl KeepaliveTimer {
    pub fn new() -> Self {
        KeepaliveTimer {
            next_ping_due: Instant::now() + PING_INTERVAL,
        }
    }

    /// Call whenever any message is received from or sent to the peer;
    /// pushes the next ping back out to a full interval from now.
    pub fn note_activity(&mut self) {
        self.next_ping_due = Instant::now() + PING_INTERVAL;
    }

    pub fn is_ping_due(&self) -> bool {
        Instant::now() >= self.next_ping_due
    }

    pub fn time_until_due(&self) -> Duration {
        self.next_ping_due.saturating_duration_since(Instant::now())
    }

    /// Whether a pong arriving right now is "expected" — within
    /// [`PING_JITTER_TOLERANCE`] of when the ping was scheduled to fire —
    /// and so should be suppressed from debug logs.
    pub fn pong_is_expected(&self) -> bool {
        let now = Instant::now();
        let delta = if now >= self.next_ping_due {
            now - self.next_ping_due
        } else {
            self.next_ping_due - now
        };
        delta <= PING_JITTER_TOLERANCE
    }
}

impl Default for KeepaliveTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_timer_is_not_due() {
        let timer = KeepaliveTimer::new();
        assert!(!timer.is_ping_due());
    }

    #[test]
    fn note_activity_pushes_next_ping_out() {
        let mut timer = KeepaliveTimer::new();
        let before = timer.next_ping_due;
        timer.note_activity();
        assert!(timer.next_ping_due >= before);
    }
}

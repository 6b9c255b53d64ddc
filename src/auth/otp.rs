//! OTP Resend Countdown
//!
//! A single-fire countdown: one decrement per second until zero, at which
//! point a resend is allowed. Resending starts it again.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpCountdown {
    remaining: u32,
    total: u32,
}

impl OtpCountdown {
    pub fn new(total_secs: u32) -> Self {
        Self {
            remaining: total_secs,
            total: total_secs,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn can_resend(&self) -> bool {
        self.remaining == 0
    }

    /// One second elapsed. Returns true when this tick reached zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    /// Start over after a resend. Refused while the countdown is running.
    pub fn restart(&mut self) -> bool {
        if !self.can_resend() {
            return false;
        }
        self.remaining = self.total;
        true
    }

    /// Sync with a value reported by the background ticker
    pub fn set_remaining(&mut self, remaining: u32) {
        self.remaining = remaining.min(self.total);
    }
}

/// Drive a countdown in the background, calling `on_tick` with the seconds
/// left after each elapsed second. Stops at zero or when cancelled.
pub fn spawn_countdown<F>(total_secs: u32, on_tick: F) -> CancellationToken
where
    F: Fn(u32) + Send + 'static,
{
    let token = CancellationToken::new();
    let cancel = token.clone();

    tokio::spawn(async move {
        let mut countdown = OtpCountdown::new(total_secs);
        while !countdown.can_resend() {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    countdown.tick();
                    on_tick(countdown.remaining());
                }
            }
        }
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_countdown_reaches_zero_once() {
        let mut c = OtpCountdown::new(3);
        assert!(!c.can_resend());
        assert!(!c.tick());
        assert!(!c.tick());
        assert!(c.tick());
        assert!(c.can_resend());
        assert!(!c.tick());
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn test_restart_only_at_zero() {
        let mut c = OtpCountdown::new(30);
        assert!(!c.restart());
        c.set_remaining(0);
        assert!(c.restart());
        assert_eq!(c.remaining(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_countdown_ticks_every_second() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _token = spawn_countdown(3, move |left| sink.lock().unwrap().push(left));

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(*seen.lock().unwrap(), vec![2, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_countdown_stops() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let token = spawn_countdown(30, move |left| sink.lock().unwrap().push(left));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        token.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}

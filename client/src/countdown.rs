use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;

const TICK: Duration = Duration::from_secs(1);

/// A running once-per-second countdown.
///
/// The completion callback runs at most once, when the count reaches zero.
/// Dropping the handle cancels the countdown.
pub struct Countdown {
    token: CancellationToken,
    remaining: watch::Receiver<u32>,
}

impl Countdown {
    /// Spawns the countdown on the current tokio runtime.
    pub fn start<F>(seconds: u32, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let (remaining_tx, remaining) = watch::channel(seconds);

        let task_token = token.clone();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            let mut left = seconds;

            while left > 0 {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => return,
                    _ = ticker.tick() => {
                        left -= 1;
                        let _ = remaining_tx.send(left);
                    }
                }
            }

            if task_token.is_cancelled() {
                return;
            }
            on_fire();
            task_token.cancel();
        });

        Self { token, remaining }
    }

    /// True until the countdown fires or is cancelled.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    /// Receiver that observes every tick.
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }

    /// Stops the countdown. Safe to call any number of times.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

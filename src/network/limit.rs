//! Rate limiting for outbound flood control.
//!
//! Implements a leaky bucket keyed by elapsed time. Every line charges
//! `penalty` seconds of budget; the budget drains in real time. Once the
//! outstanding budget would exceed `threshold`, the sender sleeps for the
//! overflow before the line goes out.

use std::time::Duration;
use tokio::time::Instant;

/// Leaky-bucket pacing state for one connection.
#[derive(Debug)]
pub struct RateLimit {
    budget: Duration,
    last_tick: Instant,
    penalty: Duration,
    threshold: Duration,
}

impl RateLimit {
    /// Create a new rate limit.
    ///
    /// # Arguments
    /// * `penalty` - Budget charged per message
    /// * `threshold` - Maximum outstanding budget before messages are delayed
    pub fn new(penalty: Duration, threshold: Duration) -> Self {
        Self {
            budget: Duration::ZERO,
            last_tick: Instant::now(),
            penalty,
            threshold,
        }
    }

    /// Build from the fractional-second values found in settings.
    ///
    /// Negative or non-finite values are treated as zero.
    pub fn from_secs_f64(penalty: f64, threshold: f64) -> Self {
        Self::new(secs(penalty), secs(threshold))
    }

    /// Account for one message sent at `now` and return how long the
    /// caller must wait before sending it.
    ///
    /// The state is advanced as if the caller waits the full delay.
    pub fn reserve(&mut self, now: Instant) -> Duration {
        // Back-to-back reservations queue up behind the previous delay
        let start = now.max(self.last_tick);
        let elapsed = start.duration_since(self.last_tick);
        let charged = self.budget.saturating_sub(elapsed) + self.penalty;
        let delay = charged.saturating_sub(self.threshold);

        self.budget = charged - delay;
        self.last_tick = start + delay;
        start.duration_since(now) + delay
    }

    /// Wait until the next message may be sent.
    ///
    /// Cancel-safe: dropping the future during the delay simply abandons it.
    pub async fn tick(&mut self) {
        let delay = self.reserve(Instant::now());
        if !delay.is_zero() {
            tracing::trace!(delay_ms = delay.as_millis() as u64, "Flood control delaying send");
            crate::metrics::record_flood_delay(delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
    }

    /// Outstanding budget as of the last tick.
    pub fn budget(&self) -> Duration {
        self.budget
    }
}

fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}

//! Bounded periodic tick source.

use crate::{EnvError, PlaybackContext};
use std::time::Duration;
use tracing::debug;

/// Periodic tick signal with a fixed maximum number of ticks.
///
/// Each call to [`Interval::tick`] waits until the next deadline on the given
/// context and returns the 1-based tick count. Deadlines are anchored to the
/// first call, so a slow consumer catches up instead of drifting. After
/// `max_ticks` ticks the interval is exhausted and returns `None`.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    max_ticks: u64,
    fired: u64,
    anchor: Option<Duration>,
}

impl Interval {
    /// Creates an interval firing every `period`, at most `max_ticks` times.
    pub fn new(period: Duration, max_ticks: u64) -> Result<Self, EnvError> {
        if period.is_zero() {
            return Err(EnvError::invalid_interval("period must be non-zero"));
        }
        Ok(Self {
            period,
            max_ticks,
            fired: 0,
            anchor: None,
        })
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Maximum number of ticks.
    pub fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Returns true once all ticks have fired.
    pub fn is_exhausted(&self) -> bool {
        self.fired >= self.max_ticks
    }

    /// Waits for the next tick and returns its count, or `None` when exhausted.
    pub async fn tick<C: PlaybackContext + ?Sized>(&mut self, ctx: &C) -> Option<u64> {
        if self.is_exhausted() {
            return None;
        }

        let anchor = *self.anchor.get_or_insert_with(|| ctx.now());
        let ticks = u32::try_from(self.fired + 1).unwrap_or(u32::MAX);
        let deadline = anchor.saturating_add(self.period.saturating_mul(ticks));
        let now = ctx.now();
        if deadline > now {
            ctx.sleep(deadline - now).await;
        } else {
            debug!("tick {} late by {:?}", self.fired + 1, now - deadline);
        }

        self.fired += 1;
        Some(self.fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokioContext;

    #[test]
    fn test_zero_period_rejected() {
        let err = Interval::new(Duration::ZERO, 10).unwrap_err();
        assert!(matches!(err, EnvError::InvalidInterval(_)));
    }

    #[tokio::test]
    async fn test_interval_counts_and_stops() {
        let ctx = TokioContext::new();
        let mut interval = Interval::new(Duration::from_millis(1), 3).unwrap();

        assert_eq!(interval.tick(&ctx).await, Some(1));
        assert_eq!(interval.tick(&ctx).await, Some(2));
        assert_eq!(interval.tick(&ctx).await, Some(3));
        assert_eq!(interval.tick(&ctx).await, None);
        assert!(interval.is_exhausted());
    }

    #[tokio::test]
    async fn test_interval_paces_ticks() {
        let ctx = TokioContext::new();
        let mut interval = Interval::new(Duration::from_millis(5), 4).unwrap();

        let start = ctx.now();
        while interval.tick(&ctx).await.is_some() {}

        assert!(ctx.now() - start >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_zero_ticks_never_fires() {
        let ctx = TokioContext::new();
        let mut interval = Interval::new(Duration::from_millis(1), 0).unwrap();
        assert_eq!(interval.tick(&ctx).await, None);
    }
}

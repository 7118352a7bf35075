//! Tick sources: the once-per-second signal that drives a session countdown.
//!
//! Sessions never sleep. Their owner pulls ticks from a [`TickSource`] and
//! forwards them; tests swap in [`ManualTicks`] to fast-forward without
//! waiting on the wall clock.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

pub trait TickSource: Send {
    /// Wait for the next tick. `None` once the source is closed for good.
    fn next_tick(&mut self) -> impl Future<Output = Option<()>> + Send;

    /// Drop any pending tick so the next one is a full period away.
    fn reset(&mut self);
}

/// Wall-clock ticks from a tokio interval.
#[derive(Debug)]
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    pub fn every_second() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl TickSource for IntervalTicks {
    fn next_tick(&mut self) -> impl Future<Output = Option<()>> + Send {
        async move {
            self.interval.tick().await;
            Some(())
        }
    }

    fn reset(&mut self) {
        self.interval.reset();
    }
}

/// Ticks delivered on demand through a [`TickHandle`].
#[derive(Debug)]
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Sending half of [`ManualTicks`].
#[derive(Debug, Clone)]
pub struct TickHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTicks {
    pub fn new() -> (Self, TickHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, TickHandle { tx })
    }
}

impl TickHandle {
    /// Queue one tick. Returns false if the source was dropped.
    pub fn tick(&self) -> bool {
        self.tx.send(()).is_ok()
    }

    pub fn tick_n(&self, n: u32) -> bool {
        (0..n).all(|_| self.tick())
    }
}

impl TickSource for ManualTicks {
    fn next_tick(&mut self) -> impl Future<Output = Option<()>> + Send {
        self.rx.recv()
    }

    fn reset(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_ticks_arrive_in_order() {
        let (mut ticks, handle) = ManualTicks::new();
        assert!(handle.tick_n(2));
        assert_eq!(ticks.next_tick().await, Some(()));
        assert_eq!(ticks.next_tick().await, Some(()));
        drop(handle);
        assert_eq!(ticks.next_tick().await, None);
    }

    #[tokio::test]
    async fn reset_discards_pending_ticks() {
        let (mut ticks, handle) = ManualTicks::new();
        handle.tick_n(5);
        ticks.reset();
        handle.tick();
        assert_eq!(ticks.next_tick().await, Some(()));
        drop(handle);
        assert_eq!(ticks.next_tick().await, None);
    }

    #[tokio::test]
    async fn interval_ticks_fire() {
        let mut ticks = IntervalTicks::with_period(Duration::from_millis(5));
        assert_eq!(ticks.next_tick().await, Some(()));
        ticks.reset();
        assert_eq!(ticks.next_tick().await, Some(()));
    }
}

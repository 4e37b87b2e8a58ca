//! Repeating-timer capability and its two implementations.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::events::CarouselEvent;

/// Shortest period a timer may be armed with.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Longest period a timer may be armed with. Longer requests are shortened
/// so the first deadline always fits the clock.
pub const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

fn bounded(period: Duration) -> Duration {
    period.clamp(MIN_PERIOD, MAX_PERIOD)
}

/// Handle of an armed repeating timer. Never reused by the scheduler that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Arms and cancels repeating callbacks.
///
/// A fired timer is delivered to the owning carousel as
/// [`CarouselEvent::TimerFired`]; how that happens is up to the
/// implementation.
pub trait Scheduler {
    fn arm_repeating(&mut self, period: Duration) -> TimerId;
    /// Cancelling an unknown or already cancelled timer is a no-op.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone, Copy)]
struct Repeating {
    period: Duration,
    next_due: Duration,
}

/// Virtual-clock scheduler: nothing fires until [`ManualScheduler::advance`]
/// is called.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerId, Repeating>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn live_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_live(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn period(&self, id: TimerId) -> Option<Duration> {
        self.timers.get(&id).map(|t| t.period)
    }

    /// Moves the clock forward and returns every firing in chronological
    /// order (ties broken by arming order).
    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        let target = self.now + by;
        let mut fired = Vec::new();
        loop {
            let due = self
                .timers
                .iter()
                .filter(|(_, t)| t.next_due <= target)
                .min_by_key(|(id, t)| (t.next_due, **id))
                .map(|(id, _)| *id);
            let Some(id) = due else { break };
            if let Some(timer) = self.timers.get_mut(&id) {
                self.now = timer.next_due;
                timer.next_due += timer.period;
            }
            fired.push(id);
        }
        self.now = target;
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn arm_repeating(&mut self, period: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let period = bounded(period);
        self.timers.insert(
            id,
            Repeating {
                period,
                next_due: self.now + period,
            },
        );
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }
}

/// Scheduler backed by tokio intervals.
///
/// Each armed timer is a spawned task that sends `TimerFired` into the
/// owning instance's event queue, so ticks are serialized with user events.
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    events: Sender<CarouselEvent>,
    cancel: CancellationToken,
    next_id: u64,
    timers: HashMap<TimerId, CancellationToken>,
}

impl TokioScheduler {
    /// Timers stop when `cancel` (or the scheduler) goes away.
    pub fn new(events: Sender<CarouselEvent>, cancel: CancellationToken) -> Self {
        Self {
            events,
            cancel,
            next_id: 0,
            timers: HashMap::new(),
        }
    }

    pub fn live_timers(&self) -> usize {
        self.timers.len()
    }
}

impl Scheduler for TokioScheduler {
    fn arm_repeating(&mut self, period: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let period = bounded(period);
        let token = self.cancel.child_token();
        self.timers.insert(id, token.clone());
        let events = self.events.clone();

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        trace!(%id, "tick");
                        tokio::select! {
                            _ = token.cancelled() => break,
                            sent = events.send(CarouselEvent::TimerFired(id)) => {
                                if sent.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(token) = self.timers.remove(&id) {
            token.cancel();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, token) in self.timers.drain() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn manual_fires_on_period_boundaries() {
        let mut sched = ManualScheduler::new();
        let id = sched.arm_repeating(Duration::from_secs(2));
        assert!(sched.advance(Duration::from_millis(1999)).is_empty());
        assert_eq!(sched.advance(Duration::from_millis(1)), vec![id]);
        assert_eq!(sched.advance(Duration::from_secs(5)), vec![id, id]);
        assert_eq!(sched.now(), Duration::from_secs(7));
    }

    #[test]
    fn manual_cancel_stops_firing() {
        let mut sched = ManualScheduler::new();
        let id = sched.arm_repeating(Duration::from_secs(1));
        sched.cancel(id);
        sched.cancel(id);
        assert_eq!(sched.live_timers(), 0);
        assert!(sched.advance(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn manual_interleaves_timers_chronologically() {
        let mut sched = ManualScheduler::new();
        let slow = sched.arm_repeating(Duration::from_secs(3));
        let fast = sched.arm_repeating(Duration::from_secs(2));
        assert_eq!(
            sched.advance(Duration::from_secs(6)),
            vec![fast, slow, fast, slow, fast]
        );
    }

    #[test]
    fn manual_ids_are_not_reused() {
        let mut sched = ManualScheduler::new();
        let a = sched.arm_repeating(Duration::from_secs(1));
        sched.cancel(a);
        let b = sched.arm_repeating(Duration::from_secs(1));
        assert_ne!(a, b);
        assert!(!sched.is_live(a));
        assert!(sched.is_live(b));
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut sched = ManualScheduler::new();
        let id = sched.arm_repeating(Duration::ZERO);
        assert_eq!(sched.period(id), Some(MIN_PERIOD));
    }

    #[test]
    fn huge_period_is_clamped() {
        let mut sched = ManualScheduler::new();
        let id = sched.arm_repeating(Duration::MAX);
        assert_eq!(sched.period(id), Some(MAX_PERIOD));
        assert!(sched.advance(Duration::from_secs(3600)).is_empty());
        assert_eq!(sched.advance(MAX_PERIOD), vec![id]);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_enqueues_ticks_until_cancelled() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut sched = TokioScheduler::new(tx, CancellationToken::new());
        let id = sched.arm_repeating(Duration::from_secs(1));

        for _ in 0..2 {
            let ev = rx.recv().await.expect("tick");
            assert_eq!(ev, CarouselEvent::TimerFired(id));
        }

        sched.cancel(id);
        assert_eq!(sched.live_timers(), 0);
        let none = time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(none.is_err(), "cancelled timer must not tick");
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_timer_survives_huge_period() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut sched = TokioScheduler::new(tx, CancellationToken::new());
        let id = sched.arm_repeating(Duration::from_secs(i64::MAX as u64));

        let early = time::timeout(Duration::from_secs(24 * 60 * 60), rx.recv()).await;
        assert!(early.is_err(), "no tick before the clamped period");

        let ev = time::timeout(MAX_PERIOD, rx.recv())
            .await
            .expect("timer task still alive")
            .expect("tick");
        assert_eq!(ev, CarouselEvent::TimerFired(id));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_scheduler_cancels_timers() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut sched = TokioScheduler::new(tx.clone(), CancellationToken::new());
        sched.arm_repeating(Duration::from_secs(1));
        drop(sched);
        let none = time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(none.is_err(), "timers must stop with their scheduler");
        drop(tx);
    }
}

//! Per-second countdown refresh.
//!
//! A [`Countdown`] belongs to whatever displays a deadline. It recomputes a
//! [`CountdownFrame`] once per second and hands it to the owner's channel
//! until it is stopped or dropped.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::trace;

use crate::urgency::CountdownFrame;

pub const TICK: Duration = Duration::from_secs(1);

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A frame tagged with the key its countdown was started with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tick<K> {
    pub key: K,
    pub frame: CountdownFrame,
}

pub type TickSender<K> = mpsc::UnboundedSender<Tick<K>>;

#[derive(Debug)]
pub struct Countdown {
    timer: Option<JoinHandle<()>>,
}

impl Countdown {
    /// Sends the current frame right away and, when there is a deadline,
    /// one more every [`TICK`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<K>(
        key: K,
        deadline: Option<DateTime<Utc>>,
        clock: Arc<dyn Clock>,
        sink: TickSender<K>,
    ) -> Self
    where
        K: Clone + Send + 'static,
    {
        let Some(deadline) = deadline else {
            let frame = CountdownFrame::at(None, clock.now());
            let _ = sink.send(Tick { key, frame });
            return Self { timer: None };
        };

        let timer = tokio::spawn(async move {
            let mut interval = time::interval(TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                // the first tick completes immediately
                interval.tick().await;

                let frame = CountdownFrame::at(Some(deadline), clock.now());
                if sink.send(Tick { key: key.clone(), frame }).is_err() {
                    trace!("countdown receiver dropped");
                    break;
                }
            }
        });

        Self { timer: Some(timer) }
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    pub fn stop(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::urgency::Rgb;

    /// Follows tokio's paused clock so frames advance with `time::advance`.
    struct PausedClock {
        origin: DateTime<Utc>,
        start: time::Instant,
    }

    impl PausedClock {
        fn new(origin: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                origin,
                start: time::Instant::now(),
            })
        }
    }

    impl Clock for PausedClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = time::Instant::now() - self.start;
            self.origin + chrono::Duration::from_std(elapsed).unwrap()
        }
    }

    fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let deadline = origin() + chrono::Duration::seconds(3);
        let countdown = Countdown::start("a", Some(deadline), PausedClock::new(origin()), tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.key, "a");
        assert_eq!(first.frame.text, "3s left");

        let second = rx.recv().await.unwrap();
        assert_eq!(second.frame.text, "2s left");

        let third = rx.recv().await.unwrap();
        assert_eq!(third.frame.text, "1s left");

        time::advance(Duration::from_secs(3)).await;
        let overdue = rx.recv().await.unwrap();
        assert!(overdue.frame.is_overdue());
        assert_eq!(overdue.frame.color, Rgb::RED);

        assert!(countdown.is_running());
        countdown.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn no_deadline_sends_one_frame_without_a_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let countdown = Countdown::start(7, None, PausedClock::new(origin()), tx);

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.key, 7);
        assert_eq!(tick.frame.text, "No deadline");
        assert_eq!(tick.frame.color, Rgb::GRAY);

        assert!(!countdown.is_running());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_ends_the_stream() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let deadline = origin() + chrono::Duration::days(2);
        let countdown = Countdown::start((), Some(deadline), PausedClock::new(origin()), tx);

        rx.recv().await.unwrap();
        countdown.stop();

        // at most frames already queued before the abort
        while rx.recv().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stops_the_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let deadline = origin() + chrono::Duration::hours(1);

        {
            let _countdown =
                Countdown::start("x", Some(deadline), PausedClock::new(origin()), tx);
            rx.recv().await.unwrap();
        }

        while rx.recv().await.is_some() {}
    }
}

//! # Weekloop - Weekly-Cadence Task Loop
//!
//! Weekloop is a small asynchronous scheduling primitive for jobs that run on
//! a recurring, timezone-aware, weekly cadence: wake on a set of weekdays at
//! a fixed time of day, optionally poll every few minutes while a matched day
//! lasts, and go quiet for a configurable pause between one cycle and the
//! next. It is built on `tokio` and designed for long-lived monitoring jobs
//! (the original use case is polling a game API while a weekly competition
//! window is open).
//!
//! ## Features
//!
//! - **Weekday cadence**: wake on any set of weekdays in a fixed-offset
//!   timezone, at midnight or a configured time of day.
//! - **Sub-interval polling**: re-run every `n` seconds for as long as the
//!   matched weekday lasts.
//! - **Inter-cycle pause**: dead time after the last weekday of a cycle
//!   before the next cycle begins.
//! - **Error isolation**: a failing cycle is logged through a replaceable
//!   hook and never stops the schedule.
//! - **Cooperative cancellation**: loops stop at the next suspension point,
//!   never mid-action.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use chrono::{FixedOffset, Weekday};
//! use weekloop::{Cadence, Weekloop, WeekloopHandler};
//!
//! #[derive(Clone)]
//! struct Watcher;
//!
//! impl WeekloopHandler for Watcher {
//!     type Context = ();
//!     type Error = std::io::Error;
//!
//!     async fn handle(&self, _ctx: ()) -> Result<(), Self::Error> {
//!         // poll the upstream API here
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let cadence = Cadence::builder()
//!         .weekdays([Weekday::Wed, Weekday::Fri, Weekday::Sun])
//!         .timezone(FixedOffset::west_opt(9 * 3600).unwrap())
//!         .pause(Duration::from_secs(7 * 86400))
//!         .sub_interval(Duration::from_secs(600))
//!         .build()
//!         .unwrap();
//!     let mut task = Weekloop::new(cadence, Watcher, ());
//!     task.start().unwrap();
//!     // ... run the rest of the process; the loop polls on its own.
//! }
//! ```
mod cadence;
mod context;
mod error;
mod handler;
mod occurrence;
mod runner;

pub use cadence::{Cadence, CadenceBuilder};
pub use context::WeekloopContext;
pub use error::WeekloopError;
pub use handler::WeekloopHandler;
pub use occurrence::{next_occurrence, next_occurrence_after};
pub use runner::Weekloop;

#[cfg(test)]
mod tests {
    use super::*;
    use futures::lock::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Weekday;

    const ALL_WEEK: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Every day matches, so the first wake-up is immediate and later ones
    /// follow the sub-interval; tests stay fast regardless of when they run.
    fn every_day(sub_interval: Duration) -> Cadence {
        Cadence::builder()
            .weekdays(ALL_WEEK)
            .sub_interval(sub_interval)
            .build()
            .expect("cadence is valid")
    }

    #[derive(Debug)]
    struct MockError;

    impl std::fmt::Display for MockError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "mock cycle failure")
        }
    }

    impl std::error::Error for MockError {}

    #[derive(Clone)]
    struct MockHandler {
        counter: Arc<Mutex<i32>>,
        done_tx: Option<async_channel::Sender<()>>,
        fail: bool,
    }

    impl MockHandler {
        fn new(counter: Arc<Mutex<i32>>, done_tx: Option<async_channel::Sender<()>>) -> Self {
            MockHandler {
                counter,
                done_tx,
                fail: false,
            }
        }

        fn failing(counter: Arc<Mutex<i32>>, done_tx: Option<async_channel::Sender<()>>) -> Self {
            MockHandler {
                counter,
                done_tx,
                fail: true,
            }
        }
    }

    impl WeekloopHandler for MockHandler {
        type Context = ();
        type Error = MockError;

        async fn handle(&self, _ctx: ()) -> Result<(), MockError> {
            let mut count = self.counter.lock().await;
            *count += 1;
            if let Some(tx) = &self.done_tx {
                tx.send(()).await.expect("Failed to send done signal");
            }
            if self.fail {
                Err(MockError)
            } else {
                Ok(())
            }
        }
    }

    /// Handler that records its failures through a custom error hook.
    #[derive(Clone)]
    struct AlertingHandler {
        counter: Arc<Mutex<i32>>,
        alerts: Arc<AtomicUsize>,
        done_tx: async_channel::Sender<()>,
    }

    impl WeekloopHandler for AlertingHandler {
        type Context = ();
        type Error = MockError;

        async fn handle(&self, _ctx: ()) -> Result<(), MockError> {
            let mut count = self.counter.lock().await;
            *count += 1;
            self.done_tx
                .send(())
                .await
                .expect("Failed to send done signal");
            Err(MockError)
        }

        fn on_error(&self, _err: &MockError) {
            self.alerts.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn recv_done(rx: &async_channel::Receiver<()>) {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a cycle")
            .expect("worker dropped the done channel");
    }

    #[tokio::test]
    async fn first_same_day_wake_is_immediate() {
        let counter = Arc::new(Mutex::new(0));
        let (tx, rx) = async_channel::unbounded();
        let handler = MockHandler::new(counter.clone(), Some(tx));

        // An hour-long sub-interval: only the immediate first wake-up can
        // fire within the test's lifetime.
        let mut task = Weekloop::new(every_day(Duration::from_secs(3600)), handler, ());
        task.start().expect("Failed to start loop");

        recv_done(&rx).await;
        assert_eq!(*counter.lock().await, 1);
        task.stop().await;
    }

    #[tokio::test]
    async fn cycles_follow_the_sub_interval() {
        let counter = Arc::new(Mutex::new(0));
        let (tx, rx) = async_channel::unbounded();
        let handler = MockHandler::new(counter.clone(), Some(tx));

        let mut task = Weekloop::new(every_day(Duration::from_millis(50)), handler, ());
        task.start().expect("Failed to start loop");

        for _ in 0..3 {
            recv_done(&rx).await;
        }
        assert!(*counter.lock().await >= 3);
        task.stop().await;
    }

    #[tokio::test]
    async fn failing_cycle_does_not_stop_the_schedule() {
        let _ = env_logger::builder().is_test(true).try_init();
        let counter = Arc::new(Mutex::new(0));
        let (tx, rx) = async_channel::unbounded();
        let handler = MockHandler::failing(counter.clone(), Some(tx));

        let mut task = Weekloop::new(every_day(Duration::from_millis(50)), handler, ());
        task.start().expect("Failed to start loop");

        // The action fails every cycle; it must still be invoked again.
        recv_done(&rx).await;
        recv_done(&rx).await;
        assert!(*counter.lock().await >= 2);
        task.stop().await;
    }

    #[tokio::test]
    async fn custom_error_hook_sees_every_failure() {
        let counter = Arc::new(Mutex::new(0));
        let alerts = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = async_channel::unbounded();
        let handler = AlertingHandler {
            counter: counter.clone(),
            alerts: alerts.clone(),
            done_tx: tx,
        };

        let mut task = Weekloop::new(every_day(Duration::from_millis(50)), handler, ());
        task.start().expect("Failed to start loop");

        recv_done(&rx).await;
        recv_done(&rx).await;
        task.stop().await;

        assert!(alerts.load(Ordering::SeqCst) >= 1);
        assert!(*counter.lock().await >= 2);
    }

    #[tokio::test]
    async fn start_while_running_is_reported_not_fatal() {
        let counter = Arc::new(Mutex::new(0));
        let (tx, rx) = async_channel::unbounded();
        let handler = MockHandler::new(counter.clone(), Some(tx));

        let mut task = Weekloop::new(every_day(Duration::from_secs(3600)), handler, ());
        task.start().expect("Failed to start loop");
        assert_eq!(task.start(), Err(WeekloopError::AlreadyRunning));

        // The original run is untouched.
        recv_done(&rx).await;
        assert!(task.is_running());
        task.stop().await;
    }

    #[tokio::test]
    async fn cancellation_is_idempotent() {
        let counter = Arc::new(Mutex::new(0));
        let (tx, rx) = async_channel::unbounded();
        let handler = MockHandler::new(counter.clone(), Some(tx));

        let mut task = Weekloop::new(every_day(Duration::from_millis(50)), handler, ());
        task.start().expect("Failed to start loop");
        recv_done(&rx).await;

        task.stop().await;
        let settled = *counter.lock().await;

        // Cancelling again, in any combination, has no observable effect.
        task.stop().await;
        task.cancel();
        task.cancel();

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*counter.lock().await, settled);
        assert!(!task.is_running());
    }

    #[tokio::test]
    async fn restart_after_stop_runs_again() {
        let counter = Arc::new(Mutex::new(0));
        let (tx, rx) = async_channel::unbounded();
        let handler = MockHandler::new(counter.clone(), Some(tx));

        let mut task = Weekloop::new(every_day(Duration::from_secs(3600)), handler, ());
        task.start().expect("Failed to start loop");
        recv_done(&rx).await;
        task.stop().await;

        task.start().expect("Failed to restart loop");
        recv_done(&rx).await;
        assert!(*counter.lock().await >= 2);
        task.stop().await;
    }

    #[tokio::test]
    async fn cancel_before_start_is_a_no_op() {
        let counter = Arc::new(Mutex::new(0));
        let handler = MockHandler::new(counter.clone(), None);

        let mut task = Weekloop::new(every_day(Duration::from_secs(3600)), handler, ());
        task.cancel();
        task.stop().await;
        assert!(!task.is_running());
    }
}

use async_channel::Sender;
use nanoid::nanoid;
use tokio::task::JoinHandle;

use crate::cadence::Cadence;
use crate::error::WeekloopError;
use crate::handler::WeekloopHandler;

use super::worker::Worker;

/// A recurring task on a weekly cadence.
///
/// Owns the handler, its context, and the cadence policy, and runs at most
/// one background execution at a time. [`start`](Weekloop::start) spawns the
/// worker; [`cancel`](Weekloop::cancel) and [`stop`](Weekloop::stop) end it
/// cooperatively at the next suspension point. After the worker has exited,
/// `start` may be called again; the new run derives its cursor from the
/// wall clock, so nothing is carried over between runs.
///
/// Dropping a `Weekloop` closes its cancellation channel, which the worker
/// also observes as a cancellation at its next suspension point.
pub struct Weekloop<H: WeekloopHandler> {
    id: String,
    cadence: Cadence,
    handler: H,
    ctx: H::Context,
    cancel_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl<H: WeekloopHandler> Weekloop<H> {
    pub fn new(cadence: Cadence, handler: H, ctx: H::Context) -> Self {
        Self {
            id: nanoid!(10),
            cadence,
            handler,
            ctx,
            cancel_tx: None,
            worker: None,
        }
    }

    /// Identifier used in this loop's log lines.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Spawn the background execution.
    ///
    /// Returns [`WeekloopError::AlreadyRunning`] (and logs a warning) when a
    /// previous run is still active; the running loop is left untouched.
    /// Taking `&mut self` makes two concurrent `start` calls unrepresentable
    /// without external synchronization, so at most one worker can ever be
    /// active per loop.
    pub fn start(&mut self) -> Result<(), WeekloopError> {
        if self.is_running() {
            log::warn!("loop {}: start requested while already running", self.id);
            return Err(WeekloopError::AlreadyRunning);
        }
        let (cancel_tx, cancel_rx) = async_channel::bounded(1);
        let worker = Worker {
            id: self.id.clone(),
            cadence: self.cadence.clone(),
            handler: self.handler.clone(),
            ctx: self.ctx.clone(),
            cancel_rx,
        };
        log::info!("loop {}: starting", self.id);
        self.worker = Some(tokio::spawn(worker.run()));
        self.cancel_tx = Some(cancel_tx);
        Ok(())
    }

    /// Request cancellation without waiting for it to take effect.
    ///
    /// Idempotent: cancelling a loop that was never started, or whose worker
    /// has already exited, does nothing.
    pub fn cancel(&self) {
        if let Some(tx) = &self.cancel_tx {
            let _ = tx.try_send(());
        }
    }

    /// Request cancellation and wait until the worker has fully exited.
    ///
    /// The worker is never interrupted mid-action; an in-flight cycle runs to
    /// completion and the cancellation is observed right after it. Idempotent
    /// like [`cancel`](Weekloop::cancel).
    pub async fn stop(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.await;
        }
    }
}

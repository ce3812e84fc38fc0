use async_channel::Receiver;

use crate::cadence::Cadence;
use crate::handler::WeekloopHandler;

use super::cursor::Cursor;

/// The background execution of one loop: computes each delay, sleeps on a
/// cancellable timer, invokes the handler, isolates its errors, and exits as
/// soon as a cancellation is observed at a suspension point.
pub(crate) struct Worker<H: WeekloopHandler> {
    pub(crate) id: String,
    pub(crate) cadence: Cadence,
    pub(crate) handler: H,
    pub(crate) ctx: H::Context,
    pub(crate) cancel_rx: Receiver<()>,
}

impl<H: WeekloopHandler> Worker<H> {
    pub(crate) async fn run(self) {
        let mut cursor = Cursor::starting(&self.cadence, self.cadence.local_now());
        loop {
            let delay = cursor.next_delay(&self.cadence, self.cadence.local_now());
            log::debug!(
                "loop {}: sleeping for {}",
                self.id,
                humantime::format_duration(delay)
            );
            tokio::select! {
                // A closed channel means every handle was dropped; treat it
                // like a cancellation.
                _ = self.cancel_rx.recv() => {
                    log::info!("loop {}: cancelled during sleep", self.id);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
            if let Err(err) = self.handler.handle(self.ctx.clone()).await {
                self.handler.on_error(&err);
            }
            if self.cancel_rx.try_recv().is_ok() {
                log::info!("loop {}: cancelled after cycle", self.id);
                return;
            }
        }
    }
}

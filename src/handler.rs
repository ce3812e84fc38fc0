use std::error::Error;

use crate::context::WeekloopContext;

/// The unit of work a [`Weekloop`](crate::Weekloop) invokes on every cycle.
///
/// Implement this trait for your task and define its behavior in the
/// [`handle`](WeekloopHandler::handle) method. A cycle that returns `Err` is
/// routed to [`on_error`](WeekloopHandler::on_error) and the schedule
/// continues; a failing cycle never stops the loop.
pub trait WeekloopHandler: Clone + Send + Sync + 'static {
    type Context: WeekloopContext;
    type Error: Error + Send;

    fn handle(
        &self,
        ctx: Self::Context,
    ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

    /// Error hook for failed cycles.
    ///
    /// The default logs the error and its source chain and returns. Override
    /// it to wire in alerting or metrics. Implementations must not panic;
    /// nothing may escape this hook back into the run loop.
    fn on_error(&self, err: &Self::Error) {
        log::error!("scheduled cycle failed: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            log::error!("caused by: {cause}");
            source = cause.source();
        }
    }
}

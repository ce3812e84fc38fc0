/// Caller-owned state handed to every cycle of a [`Weekloop`](crate::Weekloop).
///
/// The loop never inspects the context; it only clones it and passes it to
/// [`WeekloopHandler::handle`](crate::WeekloopHandler::handle). Shared
/// resources (an HTTP client, a database pool) go here instead of into
/// process-wide mutable state.
pub trait WeekloopContext: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> WeekloopContext for T {}

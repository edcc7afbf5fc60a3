use crate::core::client::ClientEvent;

/// Trait for reacting to connection lifecycle changes
///
/// The session task calls `on_event` inline, in the order transitions happen,
/// so a handler sees `Connected` before any message of that connection and
/// `Disconnected` after the last one.
///
/// Events stop as soon as the session's shutdown flag is cleared: an explicit
/// shutdown produces no trailing events.
pub trait LifecycleHandler: Send + Sync + 'static {
    fn on_event(&self, event: &ClientEvent);
}

/// A lifecycle handler that ignores every event
pub struct NoOpLifecycle;

impl LifecycleHandler for NoOpLifecycle {
    fn on_event(&self, _event: &ClientEvent) {}
}

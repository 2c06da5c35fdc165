//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

/// Idempotency gate for inbound webhook deliveries
///
/// Implemented by the server layer (mailsheet-server). Implementations must
/// be safe to share between request handlers.
pub trait EventGate: Send + Sync {
    /// Has this event id already been marked?
    fn seen(&self, id: &str) -> bool;

    /// Record an event id; marking an already-seen id is a no-op
    fn mark(&self, id: &str);

    /// Atomically check and mark an event id
    ///
    /// Returns `true` if the id was newly marked (the caller should process
    /// the event) and `false` if it had been seen before.
    fn check_and_mark(&self, id: &str) -> bool;

    /// Number of ids currently remembered
    fn len(&self) -> usize;

    /// True if no ids are remembered
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

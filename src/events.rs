//! Store Events
//!
//! Persistence outcomes are reported here instead of being returned to the
//! caller of a mutation. Hosts choose where they go: the log, a channel
//! feeding a status badge, or both.

use tokio::sync::mpsc::UnboundedSender;

use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Loaded { outlines: usize },
    LoadFailed { error: DomainError },
    Saved { outlines: usize },
    SaveFailed { error: DomainError },
}

impl StoreEvent {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StoreEvent::LoadFailed { .. } | StoreEvent::SaveFailed { .. }
        )
    }
}

/// Receiver of store events
pub trait EventSink {
    fn emit(&self, event: StoreEvent);
}

/// Default sink: structured log lines
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: StoreEvent) {
        match event {
            StoreEvent::Loaded { outlines } => tracing::info!(outlines, "outlines loaded"),
            StoreEvent::Saved { outlines } => tracing::debug!(outlines, "outlines saved"),
            StoreEvent::LoadFailed { error } => tracing::error!(%error, "failed to load outlines"),
            StoreEvent::SaveFailed { error } => tracing::error!(%error, "failed to save outlines"),
        }
    }
}

/// Forward events into a channel; a dropped receiver just discards them
impl EventSink for UnboundedSender<StoreEvent> {
    fn emit(&self, event: StoreEvent) {
        let _ = self.send(event);
    }
}

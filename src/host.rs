//! Host integration seam
//!
//! The bridge is not a standalone program: the host runtime constructs it,
//! wires it to its event slots, feeds it events, and tears it down. This
//! module defines the traits the host integration layer implements and the
//! plugin entry points it calls.

use crate::bridge::EventBridge;
use crate::chat::ChatPoster;
use crate::config::ConfigSource;
use crate::error::Result;
use crate::event::EventKind;
use std::sync::Arc;
use tracing::debug;

/// A live handler registration for one event kind.
///
/// Dropping the handle detaches the handler from the host's event slot, so
/// cleanup is guaranteed even on a registration error path.
pub struct Subscription {
    kind: EventKind,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a handle that runs `release` on drop.
    #[must_use]
    pub fn new(kind: EventKind, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            kind,
            release: Some(Box::new(release)),
        }
    }

    /// The event kind this subscription covers.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            debug!(event = %self.kind, "Event handler detached");
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The host's event slots, one per lifecycle event.
pub trait EventSource {
    /// Attach a handler for `kind`, returning the handle that detaches it.
    ///
    /// Attach failures are the host's to report; they propagate out of
    /// bridge construction unrecovered.
    fn attach(&mut self, kind: EventKind) -> Result<Subscription>;
}

/// Plugin entry point: build a bridge and attach all event handlers.
///
/// Called by the host when it loads the plugin. Registration is
/// all-or-nothing: if any handler fails to attach, the ones already
/// attached are released and the error propagates to the host.
pub fn create_listener(
    source: &mut dyn EventSource,
    config: Arc<dyn ConfigSource>,
    chat: Arc<dyn ChatPoster>,
) -> Result<EventBridge> {
    EventBridge::register(source, config, chat)
}

/// Plugin exit point: detach all handlers and drop the bridge.
///
/// Called by the host when it unloads the plugin.
pub fn cleanup_listener(mut bridge: EventBridge) {
    bridge.teardown();
}

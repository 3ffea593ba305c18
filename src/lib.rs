//! Farmcast - render-farm → Slack notification bridge
//!
//! This crate bridges the lifecycle events of a render-farm job manager
//! (job state changes, worker-node state changes) to Slack messages. The
//! host runtime owns the bridge lifecycle: it constructs the bridge through
//! [`host::create_listener`], delivers events to [`bridge::EventBridge::handle`],
//! and tears it down through [`host::cleanup_listener`].
//!
//! Operators author per-event message templates in host configuration
//! (`Slack<EventName>Message` keys, `;` as line break, `{job}`-style
//! placeholders); an unset template or missing credentials simply disables
//! the notification for that event.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod host;
pub mod slack;
pub mod template;

pub use error::{Error, Result};

// Re-export the bridge and its host-facing seams
pub use bridge::EventBridge;
pub use chat::ChatPoster;
pub use config::{ConfigSource, PostSettings};
pub use host::{cleanup_listener, create_listener, EventSource, Subscription};

// Re-export event types
pub use event::{
    EventKind, EventPayload, EventShape, JobInfo, ReportInfo, TaskInfo, WorkerInfo,
};

// Re-export the Slack poster
pub use slack::SlackPoster;

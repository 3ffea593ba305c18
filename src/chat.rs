//! Chat posting seam
//!
//! The bridge needs exactly one outbound capability: post a text message to
//! a channel with fresh credentials. Keeping it behind a trait lets tests
//! assert on (or count) posts without touching the network.

use crate::config::PostSettings;
use crate::error::Result;

#[cfg(test)]
use mockall::automock;

/// Trait for posting one chat message.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ChatPoster: Send + Sync {
    /// Post `text` to the channel named in `settings`.
    ///
    /// Failures propagate to the host's plugin error handling; the bridge
    /// does not retry.
    async fn post_message(&self, settings: &PostSettings, text: &str) -> Result<()>;
}

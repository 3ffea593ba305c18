//! Host configuration access
//!
//! The host stores all bridge settings in its own plugin configuration and
//! exposes two defaulted accessors. Nothing is cached here: every event
//! firing reads fresh values, so operators can edit templates or rotate the
//! token without reloading the plugin.

use crate::event::EventKind;

/// Configuration key holding the Slack access token.
pub const API_KEY: &str = "SlackAPIKey";

/// Configuration key holding the destination channel.
pub const CHANNEL: &str = "SlackChannel";

/// Configuration key holding the post-as-authenticated-user flag.
pub const AS_USER: &str = "SlackAsUser";

/// Build the template key for one event, `Slack<EventName>Message`
/// (e.g. `SlackOnJobFailedMessage`).
#[must_use]
pub fn message_key(kind: EventKind) -> String {
    format!("Slack{}Message", kind.name())
}

/// The host's configuration accessors.
///
/// Implemented by the host integration layer over its plugin-config store.
pub trait ConfigSource: Send + Sync {
    /// Get a string entry, falling back to `default` when absent.
    fn get_string_or(&self, key: &str, default: &str) -> String;

    /// Get a boolean entry, falling back to `default` when absent.
    fn get_bool_or(&self, key: &str, default: bool) -> bool;
}

/// Credentials and options for one post attempt, read fresh per post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSettings {
    /// Slack access token
    pub api_key: String,
    /// Destination channel
    pub channel: String,
    /// Post as the authenticated user rather than the bot identity
    pub as_user: bool,
}

impl PostSettings {
    /// Read post settings from configuration.
    ///
    /// Returns `None` when either the token or the channel is missing or
    /// empty: an unconfigured bridge means notifications are disabled, not
    /// that something went wrong.
    #[must_use]
    pub fn load(config: &dyn ConfigSource) -> Option<Self> {
        let api_key = config.get_string_or(API_KEY, "");
        if api_key.is_empty() {
            return None;
        }

        let channel = config.get_string_or(CHANNEL, "");
        if channel.is_empty() {
            return None;
        }

        let as_user = config.get_bool_or(AS_USER, true);

        Some(Self {
            api_key,
            channel,
            as_user,
        })
    }
}

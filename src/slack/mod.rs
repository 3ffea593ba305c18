//! Slack - Web API poster
//!
//! This module implements the chat seam over the Slack Web API
//! `chat.postMessage` endpoint. One call per event, no retry; the post
//! includes the legacy `as_user` flag operators can turn off to post under
//! the bot identity instead.

use crate::chat::ChatPoster;
use crate::config::PostSettings;
use crate::error::{Error, Result};
use tracing::debug;


/// Slack `chat.postMessage` endpoint.
pub(crate) const CHAT_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Chat poster backed by the Slack Web API.
pub struct SlackPoster {
    http: reqwest::Client,
}

impl SlackPoster {
    /// Create a new poster with its own HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for SlackPoster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChatPoster for SlackPoster {
    async fn post_message(&self, settings: &PostSettings, text: &str) -> Result<()> {
        let response = self
            .http
            .post(CHAT_POST_MESSAGE_URL)
            .bearer_auth(&settings.api_key)
            .form(&[
                ("channel", settings.channel.as_str()),
                ("text", text),
                ("as_user", if settings.as_user { "true" } else { "false" }),
            ])
            .send()
            .await
            .map_err(|e| Error::Network(format!("chat.postMessage request failed: {}", e)))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Slack(format!("Failed to parse chat.postMessage response: {}", e)))?;

        if !body["ok"].as_bool().unwrap_or(false) {
            let error_msg = body["error"].as_str().unwrap_or("Unknown error");
            return Err(Error::Slack(format!(
                "chat.postMessage failed: {}",
                error_msg
            )));
        }

        debug!(channel = %settings.channel, as_user = settings.as_user, "Message posted to Slack");

        Ok(())
    }
}

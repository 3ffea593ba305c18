//! Error types for farmcast

use thiserror::Error;

/// Bridge error type
#[derive(Debug, Error)]
pub enum Error {
    /// Slack Web API rejected the call
    #[error("slack error: {0}")]
    Slack(String),

    /// Network error on the outbound call
    #[error("network error: {0}")]
    Network(String),

    /// Event handler attach failure reported by the host
    #[error("registration error: {0}")]
    Registration(String),

    /// Event payload does not match the shape of the fired event
    #[error("payload error: {0}")]
    Payload(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

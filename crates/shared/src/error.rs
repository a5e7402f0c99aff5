use thiserror::Error;

/// Failures on the simulator channel. None of these reach the operator; the
/// dispatcher logs and drops them.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("simulator url must use ws, wss, http or https: {0}")]
    InvalidUrl(String),
    #[error("failed to connect simulator channel {url}: {message}")]
    Connect { url: String, message: String },
    #[error("simulator channel is closed")]
    Closed,
    #[error("failed to send frame: {0}")]
    Send(String),
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures reading the robot-position endpoint. The feed degrades every one
/// of these to an empty result.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("robot feed request failed: {0}")]
    Transport(String),
    #[error("robot feed returned status {0}")]
    Status(u16),
    #[error("robot feed body could not be decoded: {0}")]
    Decode(String),
}

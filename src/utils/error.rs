use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Signaling error: {0}")]
    Signaling(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a signaling error
    pub fn signaling(msg: impl Into<String>) -> Self {
        Error::Signaling(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Create a channel closed error
    pub fn channel_closed(msg: impl Into<String>) -> Self {
        Error::ChannelClosed(msg.into())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::signaling(format!("Invalid signaling URL: {}", err))
    }
}

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

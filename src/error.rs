//! Error handling for the system monitor crate.

/// A specialized `Result` type for system monitor operations.
pub type Result<T> = std::result::Result<T, SystemError>;

/// The main error type for system monitor operations.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded for the wire
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The snapshot source could not produce a snapshot at all
    #[error("Sample failed: {0}")]
    Sample(String),

    /// Writing to a subscriber connection failed
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The broadcast hub has shut down and no longer accepts requests
    #[error("Broadcast hub is closed")]
    HubClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),
}

impl SystemError {
    /// Create a new sample error
    pub fn sample_error(msg: impl Into<String>) -> Self {
        Self::Sample(msg.into())
    }

    /// Create a new delivery error
    pub fn delivery_error(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }
}

/// Error types for the network layer
use thiserror::Error;

/// Result type alias for network operations
pub type Result<T> = std::result::Result<T, NetError>;

/// Errors that can occur while talking to the relay or to a peer
#[derive(Debug, Error)]
pub enum NetError {
    /// Socket or listener failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Line is not valid JSON, or a known message has the wrong fields
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed message with an `action` this side does not handle
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Message decoded but its content is unusable (bad board, bad code)
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The other end went away
    #[error("Connection closed")]
    ConnectionClosed,

    /// Host/port pair does not form a socket address
    #[error("Invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

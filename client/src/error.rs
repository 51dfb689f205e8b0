use thiserror::Error;

/// A single inbound frame that could not be turned into an [`InboundFrame`].
/// The frame is dropped; the session carries on.
///
/// [`InboundFrame`]: crate::decoder::InboundFrame
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("invalid telemetry: {0}")]
    InvalidTelemetry(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not connected")]
    NotConnected,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("link closed")]
    LinkClosed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("invalid base url '{0}'")]
    InvalidBaseUrl(String),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode inbound event: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode outbound message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, ClientError>;

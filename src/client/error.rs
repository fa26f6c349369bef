//! Client error type.

use thiserror::Error;

use crate::shared::config::ConfigError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure talking to the REST API
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status and an `{error}` body
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// WebSocket handshake or transport failure
    #[error("socket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A call that needs a token was made before login
    #[error("not authenticated")]
    NotAuthenticated,

    /// The socket bridge is not connected
    #[error("socket is not connected")]
    NotConnected,

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] tokio_tungstenite::tungstenite::http::header::InvalidHeaderValue),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// HTTP status of an `Api` error, or of a rejected socket handshake.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Socket(tokio_tungstenite::tungstenite::Error::Http(response)) => {
                Some(response.status().as_u16())
            }
            _ => None,
        }
    }
}

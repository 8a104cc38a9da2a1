use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid probe url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported url scheme '{0}' (expected ws or wss)")]
    UnsupportedScheme(String),

    #[error("invalid request header: {0}")]
    InvalidHeader(String),

    #[error("connect failed: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("read failed: {0}")]
    Read(#[source] tungstenite::Error),

    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

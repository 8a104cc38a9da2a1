//! One WebSocket session: connect, greet, print every frame until the peer
//! closes or the caller asks to stop.

use std::future::Future;
use std::io::Write;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ProbeConfig;
use crate::error::ProbeError;

/// Close code reported when the stream ends without a close frame.
const NO_STATUS: u16 = 1005;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The peer closed the connection (or the stream ended).
    Closed { code: u16, reason: String },
    /// `shutdown` fired; a normal close frame was sent.
    Interrupted,
}

/// Run a session against `config.endpoint()`, writing `RCV` / `CLOSE` lines
/// to `out`. Returns once the peer closes or `shutdown` completes.
pub async fn run<W, F>(
    config: &ProbeConfig,
    out: &mut W,
    shutdown: F,
) -> Result<ProbeOutcome, ProbeError>
where
    W: Write,
    F: Future<Output = ()>,
{
    let endpoint = config.endpoint()?;
    let request_id = Uuid::new_v4().to_string();

    let mut request = endpoint
        .as_str()
        .into_client_request()
        .map_err(ProbeError::Connect)?;
    let name = HeaderName::from_bytes(config.request_id_header.as_bytes())
        .map_err(|e| ProbeError::InvalidHeader(format!("{}: {e}", config.request_id_header)))?;
    let value = HeaderValue::from_str(&request_id)
        .map_err(|e| ProbeError::InvalidHeader(e.to_string()))?;
    request.headers_mut().insert(name, value);

    let (mut ws, response) = connect_async(request).await.map_err(ProbeError::Connect)?;
    info!(
        url = %endpoint,
        request_id = %request_id,
        status = response.status().as_u16(),
        "connected"
    );

    if !config.greeting.is_empty() {
        ws.send(Message::Text(config.greeting.clone()))
            .await
            .map_err(ProbeError::Send)?;
        debug!(greeting = %config.greeting, "greeting sent");
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    writeln!(out, "RCV {text}")?;
                }
                Some(Ok(Message::Binary(data))) => {
                    writeln!(out, "RCV {}", String::from_utf8_lossy(&data))?;
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = match frame {
                        Some(f) => (u16::from(f.code), f.reason.into_owned()),
                        None => (NO_STATUS, String::new()),
                    };
                    writeln!(out, "CLOSE code={code} reason={reason}")?;
                    return Ok(ProbeOutcome::Closed { code, reason });
                }
                // Ping/pong are answered by tungstenite
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(ProbeError::Read(e)),
                None => {
                    writeln!(out, "CLOSE code={NO_STATUS} reason=")?;
                    return Ok(ProbeOutcome::Closed {
                        code: NO_STATUS,
                        reason: String::new(),
                    });
                }
            },
            _ = &mut shutdown => {
                info!("interrupted by user, closing connection");
                ws.close(Some(CloseFrame {
                    code: CloseCode::Normal,
                    reason: "".into(),
                }))
                .await
                .map_err(ProbeError::Send)?;
                return Ok(ProbeOutcome::Interrupted);
            }
        }
    }
}

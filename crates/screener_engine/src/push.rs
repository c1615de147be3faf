use std::sync::mpsc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::types::{EngineEvent, ProgressEvent};

/// Pause between dial attempts while the sync is alive.
const REDIAL_DELAY: Duration = Duration::from_secs(5);

/// Reads `progress_update` frames for one job until cancelled.
///
/// The channel is best-effort: polling still drives settlement, so a failed
/// dial or dropped connection just re-dials after a pause. Frames are tagged
/// with the job id this subscription is scoped to.
pub(crate) async fn run_push_channel(
    ws_url: String,
    job_id: String,
    cancel: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            connected = connect_async(ws_url.as_str()) => match connected {
                Ok((stream, _response)) => {
                    read_frames(stream, &job_id, &cancel, &event_tx).await;
                }
                Err(err) => {
                    engine_debug!("push channel dial to {} failed: {}", ws_url, err);
                }
            },
        }
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(REDIAL_DELAY) => {}
        }
    }
}

async fn read_frames(
    mut stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    job_id: &str,
    cancel: &CancellationToken,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => return,
            frame = stream.next() => frame,
        };
        match frame {
            Some(Ok(Message::Text(text))) => {
                if let Some(event) = parse_progress_frame(text.as_str()) {
                    // Suppress frames that land after teardown.
                    if cancel.is_cancelled() {
                        return;
                    }
                    let sent = event_tx.send(EngineEvent::Push {
                        job_id: job_id.to_string(),
                        event,
                    });
                    if sent.is_err() {
                        return;
                    }
                }
            }
            Some(Ok(Message::Close(_))) | None => return,
            Some(Ok(_)) => {
                // Pings, pongs and binary frames carry no progress data.
            }
            Some(Err(err)) => {
                engine_debug!("push channel read failed: {}", err);
                return;
            }
        }
    }
}

/// Decode one text frame. Malformed frames are logged and dropped rather
/// than tearing the channel down.
pub(crate) fn parse_progress_frame(text: &str) -> Option<ProgressEvent> {
    match serde_json::from_str(text) {
        Ok(event) => Some(event),
        Err(err) => {
            engine_warn!("dropping malformed progress frame: {}", err);
            None
        }
    }
}

use crossbeam_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tracing::{debug, warn};
use tungstenite::protocol::Message;
use url::Url;

use crate::app_state::{ConnectionEvent, ConnectionId, EventKind};
use crate::connection::{Connection, Connector};
use crate::error::{ClientError, Result};

#[derive(Debug)]
enum Outgoing {
    Frame(String),
    Close,
}

/// Opens websocket connections on a tokio runtime. Each connection runs as a
/// single task that owns the socket; the manager talks to it over an
/// unbounded channel so neither side ever blocks.
pub struct WsConnector {
    endpoint: Url,
    runtime: Handle,
}

impl WsConnector {
    pub fn new(endpoint: Url, runtime: Handle) -> Self {
        Self { endpoint, runtime }
    }
}

pub struct WsConnection {
    outgoing: mpsc::UnboundedSender<Outgoing>,
}

impl Connector for WsConnector {
    type Conn = WsConnection;

    fn open(&mut self, id: ConnectionId, events: Sender<ConnectionEvent>) -> WsConnection {
        let (tx, rx) = mpsc::unbounded_channel();
        self.runtime
            .spawn(run_connection(self.endpoint.clone(), id, events, rx));
        WsConnection { outgoing: tx }
    }
}

impl Connection for WsConnection {
    fn send(&self, frame: String) -> Result<()> {
        self.outgoing
            .send(Outgoing::Frame(frame))
            .map_err(|_| ClientError::ConnectionClosed)
    }

    fn close(&self) {
        let _ = self.outgoing.send(Outgoing::Close);
    }
}

async fn run_connection(
    endpoint: Url,
    id: ConnectionId,
    events: Sender<ConnectionEvent>,
    mut outgoing: mpsc::UnboundedReceiver<Outgoing>,
) {
    let emit = |kind: EventKind| {
        let _ = events.send(ConnectionEvent::new(id, kind));
    };

    let ws_stream = match connect_async(endpoint.as_str()).await {
        Ok((stream, _resp)) => stream,
        Err(e) => {
            warn!(%endpoint, error = %e, "failed to open websocket");
            emit(EventKind::Error(e.to_string()));
            emit(EventKind::Closed);
            return;
        }
    };
    debug!(%endpoint, id = id.0, "websocket open");
    emit(EventKind::Opened);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            command = outgoing.recv() => match command {
                Some(Outgoing::Frame(text)) => {
                    if let Err(e) = write.send(Message::Text(text)).await {
                        emit(EventKind::Error(format!("send failed: {e}")));
                        break;
                    }
                }
                // a dropped handle counts as a close request
                Some(Outgoing::Close) | None => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => emit(EventKind::Frame(text)),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(EventKind::Error(format!("receive failed: {e}")));
                    break;
                }
            },
        }
    }

    debug!(id = id.0, "websocket closed");
    emit(EventKind::Closed);
}

//! Connection lifecycle for a single chat session.
//!
//! [`ConnectionManager`] owns at most one live [`Connection`] and turns user
//! intents (join, send, leave) into protocol frames. Transports report back
//! through a channel of [`ConnectionEvent`]s, which the owner drains on its
//! own thread with [`ConnectionManager::handle_event`] or one of the
//! `dispatch_*` helpers. Handlers therefore always run on the caller's thread,
//! one event at a time, in the order the transport produced them.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::app_state::{ConnectionEvent, ConnectionId, ConnectionState, EventKind, Identity};
use crate::error::{ClientError, Result};
use crate::message::{ClientMessage, IncomingEvent};

/// Handle to an open (or opening) transport connection.
///
/// Both methods must return immediately.
pub trait Connection {
    fn send(&self, frame: String) -> Result<()>;
    fn close(&self);
}

/// Opens connections to the chat endpoint. Every event of the returned
/// connection must be pushed to `events` tagged with `id`, and the last one
/// must be [`EventKind::Closed`].
pub trait Connector {
    type Conn: Connection;

    fn open(&mut self, id: ConnectionId, events: Sender<ConnectionEvent>) -> Self::Conn;
}

type JoinCallback = Box<dyn FnOnce()>;
type MessageHandler = Box<dyn FnMut(&str, &str)>;
type ErrorHandler = Box<dyn FnMut(&ClientError)>;
type CloseHandler = Box<dyn FnMut()>;

struct Active<T> {
    id: ConnectionId,
    conn: T,
}

pub struct ConnectionManager<C: Connector> {
    connector: C,
    active: Option<Active<C::Conn>>,
    state: ConnectionState,
    identity: Option<Identity>,
    next_id: u64,
    on_joined: Option<JoinCallback>,
    on_message: Option<MessageHandler>,
    on_error: Option<ErrorHandler>,
    on_close: Option<CloseHandler>,
    events_tx: Sender<ConnectionEvent>,
    events_rx: Receiver<ConnectionEvent>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            connector,
            active: None,
            state: ConnectionState::Disconnected,
            identity: None,
            next_id: 0,
            on_joined: None,
            on_message: None,
            on_error: None,
            on_close: None,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Receiver side of the transport event channel, for callers that want to
    /// `select!` on it alongside their own input.
    pub fn events(&self) -> Receiver<ConnectionEvent> {
        self.events_rx.clone()
    }

    pub fn on_message(&mut self, handler: impl FnMut(&str, &str) + 'static) {
        self.on_message = Some(Box::new(handler));
    }

    pub fn on_error(&mut self, handler: impl FnMut(&ClientError) + 'static) {
        self.on_error = Some(Box::new(handler));
    }

    /// Called when the transport ends the session on its own (server hang-up
    /// or failed open). Not called for [`leave`](Self::leave).
    pub fn on_close(&mut self, handler: impl FnMut() + 'static) {
        self.on_close = Some(Box::new(handler));
    }

    /// Opens a new connection and announces `identity` once it is up.
    /// `on_joined` runs right after the Hello frame is handed to the transport.
    ///
    /// An incomplete identity is ignored. Any existing connection is closed
    /// and discarded first.
    pub fn join(&mut self, identity: Identity, on_joined: impl FnOnce() + 'static) {
        if !identity.is_complete() {
            debug!("ignoring join with incomplete identity");
            return;
        }

        if let Some(previous) = self.active.take() {
            debug!(id = previous.id.0, "closing previous connection before join");
            previous.conn.close();
        }

        let id = ConnectionId(self.next_id);
        self.next_id += 1;

        info!(name = %identity.name, id = id.0, "joining");
        self.state = ConnectionState::Connecting;
        self.identity = Some(identity);
        self.on_joined = Some(Box::new(on_joined));

        let conn = self.connector.open(id, self.events_tx.clone());
        self.active = Some(Active { id, conn });
    }

    /// Sends a chat line verbatim. Does nothing unless connected.
    ///
    /// Returns whether the frame was handed to the transport; failures are
    /// reported through `on_error`.
    pub fn send_text(&mut self, text: &str) -> bool {
        if self.state != ConnectionState::Connected {
            debug!(state = ?self.state, "connection not ready, dropping text");
            return false;
        }

        match self.transmit(&ClientMessage::Text(text.to_owned())) {
            Ok(()) => true,
            Err(e) => {
                self.report_error(&e);
                false
            }
        }
    }

    pub fn leave(&mut self) {
        if self.state == ConnectionState::Disconnected {
            return;
        }

        if let Some(active) = self.active.take() {
            info!(id = active.id.0, "leaving");
            active.conn.close();
        }
        self.reset();
    }

    pub fn handle_event(&mut self, event: ConnectionEvent) {
        if self.active.as_ref().map(|a| a.id) != Some(event.id) {
            debug!(id = event.id.0, "dropping event from inactive connection");
            return;
        }

        match event.kind {
            EventKind::Opened => self.handle_opened(),
            EventKind::Frame(raw) => self.handle_frame(&raw),
            EventKind::Error(reason) => {
                warn!(id = event.id.0, %reason, "transport error");
                self.report_error(&ClientError::Transport(reason));
            }
            EventKind::Closed => {
                info!(id = event.id.0, "connection closed by transport");
                self.active = None;
                self.reset();
                if let Some(handler) = self.on_close.as_mut() {
                    handler();
                }
            }
        }
    }

    /// Handles every event already queued. Returns how many were handled.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Waits up to `timeout` for one event and handles it.
    pub fn dispatch_timeout(&mut self, timeout: Duration) -> bool {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                true
            }
            Err(_) => false,
        }
    }

    fn handle_opened(&mut self) {
        if self.state != ConnectionState::Connecting {
            return;
        }
        let Some(identity) = self.identity.as_ref() else {
            return;
        };

        let hello = ClientMessage::hello(identity);
        if let Err(e) = self.transmit(&hello) {
            self.report_error(&e);
            return;
        }

        self.state = ConnectionState::Connected;
        debug!("hello sent, connected");
        if let Some(callback) = self.on_joined.take() {
            callback();
        }
    }

    fn handle_frame(&mut self, raw: &str) {
        if self.state != ConnectionState::Connected {
            debug!("dropping frame received before hello");
            return;
        }

        match IncomingEvent::decode(raw) {
            Ok(event) => {
                if let Some(handler) = self.on_message.as_mut() {
                    handler(&event.user.name, &event.text);
                }
            }
            Err(e) => warn!(error = %e, "dropping malformed event"),
        }
    }

    fn transmit(&self, message: &ClientMessage) -> Result<()> {
        let active = self.active.as_ref().ok_or(ClientError::ConnectionClosed)?;
        let frame = message.encode()?;
        debug!(kind = ?message.kind(), "sending frame");
        active.conn.send(frame)
    }

    fn report_error(&mut self, error: &ClientError) {
        if let Some(handler) = self.on_error.as_mut() {
            handler(error);
        }
    }

    fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.identity = None;
        self.on_joined = None;
    }
}

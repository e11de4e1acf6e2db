use std::cell::RefCell;
use std::rc::Rc;

use crossbeam_channel::Sender;

use crate::app_state::{ConnectionEvent, ConnectionId, EventKind};
use crate::connection::{Connection, Connector};
use crate::error::{ClientError, Result};

#[derive(Default)]
struct Log {
    opened: Vec<ConnectionId>,
    sent: Vec<(ConnectionId, String)>,
    closed: Vec<ConnectionId>,
    events: Option<Sender<ConnectionEvent>>,
    fail_sends: bool,
}

/// In-memory connector that records every call and lets tests push events.
#[derive(Clone, Default)]
pub(crate) struct FakeConnector {
    log: Rc<RefCell<Log>>,
}

pub(crate) struct FakeConnection {
    id: ConnectionId,
    log: Rc<RefCell<Log>>,
}

impl FakeConnector {
    pub fn opened(&self) -> Vec<ConnectionId> {
        self.log.borrow().opened.clone()
    }

    pub fn sent(&self) -> Vec<(ConnectionId, String)> {
        self.log.borrow().sent.clone()
    }

    pub fn sent_frames(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, frame)| frame).collect()
    }

    pub fn closed(&self) -> Vec<ConnectionId> {
        self.log.borrow().closed.clone()
    }

    pub fn fail_sends(&self) {
        self.log.borrow_mut().fail_sends = true;
    }

    pub fn emit(&self, id: ConnectionId, kind: EventKind) {
        if let Some(events) = self.log.borrow().events.as_ref() {
            let _ = events.send(ConnectionEvent::new(id, kind));
        }
    }
}

impl Connector for FakeConnector {
    type Conn = FakeConnection;

    fn open(&mut self, id: ConnectionId, events: Sender<ConnectionEvent>) -> FakeConnection {
        let mut log = self.log.borrow_mut();
        log.opened.push(id);
        log.events = Some(events);
        FakeConnection {
            id,
            log: self.log.clone(),
        }
    }
}

impl Connection for FakeConnection {
    fn send(&self, frame: String) -> Result<()> {
        let mut log = self.log.borrow_mut();
        if log.fail_sends {
            return Err(ClientError::ConnectionClosed);
        }
        log.sent.push((self.id, frame));
        Ok(())
    }

    fn close(&self) {
        self.log.borrow_mut().closed.push(self.id);
    }
}

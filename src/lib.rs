//! Client side of the Plume chat protocol: a single websocket session that
//! announces a self-asserted identity and relays short text lines.

pub mod app_state;
pub mod colors;
pub mod config;
pub mod connection;
pub mod error;
pub mod message;
pub mod presentation;
pub mod websocket;

#[cfg(test)]
mod testing;

pub use app_state::{ConnectionEvent, ConnectionId, ConnectionState, EventKind, Identity};
pub use colors::{colorize, DisplayColor};
pub use config::ClientConfig;
pub use connection::{Connection, ConnectionManager, Connector};
pub use error::{ClientError, Result};
pub use message::{ClientMessage, IncomingEvent, MessageKind};
pub use presentation::{ChatClient, PresentationSink, TerminalSink};
pub use websocket::{WsConnection, WsConnector};

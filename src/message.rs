use serde::{Deserialize, Serialize, Serializer};

use crate::app_state::Identity;
use crate::error::{ClientError, Result};

/// Integer discriminant carried in the `type` field of every outbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Hello = 0,
    Text = 1,
}

impl Serialize for MessageKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Identity announcement, packed as `name\nemail`.
    Hello { name: String, email: String },
    Text(String),
}

#[derive(Serialize)]
struct WireFrame<'a> {
    #[serde(rename = "type")]
    kind: MessageKind,
    text: &'a str,
}

impl ClientMessage {
    pub fn hello(identity: &Identity) -> Self {
        Self::Hello {
            name: identity.name.clone(),
            email: identity.email.clone(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Hello { .. } => MessageKind::Hello,
            Self::Text(_) => MessageKind::Text,
        }
    }

    /// Serializes to the JSON frame the server expects, e.g.
    /// `{"type":1,"text":"hi"}`.
    pub fn encode(&self) -> Result<String> {
        let packed;
        let text = match self {
            Self::Hello { name, email } => {
                packed = format!("{name}\n{email}");
                packed.as_str()
            }
            Self::Text(text) => text.as_str(),
        };

        serde_json::to_string(&WireFrame {
            kind: self.kind(),
            text,
        })
        .map_err(ClientError::Encode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventUser {
    pub name: String,
}

/// A chat line relayed by the server. Inbound frames carry no usable
/// discriminant, so every one of them decodes to this shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IncomingEvent {
    pub user: EventUser,
    pub text: String,
}

impl IncomingEvent {
    pub fn decode(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(ClientError::Decode)
    }
}

//! The chat envelope that travels on a room's topic.

use serde::{Deserialize, Serialize};

/// One chat message as exchanged between peers.
///
/// The serde names are the wire contract: every peer on a topic reads and
/// writes `message`, `senderid`, and `sendername`, whatever language it is
/// written in. All three are required when decoding; unknown fields are
/// ignored so newer peers can add some.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The message body. No length limit is enforced here.
    #[serde(rename = "message")]
    pub text: String,

    /// Peer identity of the sender, as assigned by the transport.
    #[serde(rename = "senderid")]
    pub sender_id: String,

    /// The sender's display name at the moment of publishing.
    #[serde(rename = "sendername")]
    pub sender_name: String,
}

impl ChatMessage {
    /// Builds an envelope from its three parts.
    pub fn new(
        text: impl Into<String>,
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
        }
    }
}

//! Error types for the room layer.

use hbxchat_transport::TransportError;

/// Why a room could not be joined.
///
/// These are the only errors a room returns directly. Everything that
/// goes wrong after a successful join is reported as a
/// [`ChatLog`](crate::ChatLog) instead.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The transport refused to join the topic.
    #[error("could not join topic {topic}: {source}")]
    Join {
        topic: String,
        #[source]
        source: TransportError,
    },

    /// The topic was joined but no subscription could be opened on it.
    #[error("could not subscribe to topic {topic}: {source}")]
    Subscribe {
        topic: String,
        #[source]
        source: TransportError,
    },
}

//! Unified error type for HBXchat.

use hbxchat_protocol::ProtocolError;
use hbxchat_room::RoomError;
use hbxchat_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// A transport-level error (join, publish, subscription).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (join failed).
    #[error(transparent)]
    Room(#[from] RoomError),
}

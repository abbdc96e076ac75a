//! # HBXchat
//!
//! Chat rooms on top of a peer-to-peer publish/subscribe network.
//!
//! Joining a room gives you three queues (outbound text, inbound
//! messages, diagnostics). Envelope framing, ignoring your own echoes,
//! and failure reporting are handled underneath.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hbxchat::prelude::*;
//!
//! # async fn demo() -> Result<(), ChatError> {
//! let network = MemoryNetwork::new();
//! let node = network.node();
//!
//! let mut room = ChatRoom::join(&node, "alice", "rust")?;
//! room.outbound.send("hello".into()).await.ok();
//! if let Some(msg) = room.inbound.recv().await {
//!     println!("{}: {}", msg.sender_name, msg.text);
//! }
//! room.exit().await;
//! # Ok(())
//! # }
//! ```

mod error;
mod logging;

pub use error::ChatError;
pub use logging::{init_tracing, level_filter};

pub use hbxchat_protocol as protocol;
pub use hbxchat_room as room;
pub use hbxchat_transport as transport;

/// The types most programs need.
pub mod prelude {
    pub use crate::ChatError;
    pub use hbxchat_protocol::ChatMessage;
    pub use hbxchat_room::{ChatLog, ChatRoom, LogTag, RoomConfig};
    #[cfg(feature = "memory")]
    pub use hbxchat_transport::{MemoryNetwork, MemoryNode};
    pub use hbxchat_transport::{PeerId, PubSub, Subscription, Topic};
}

//! Chat room relay for HBXchat.
//!
//! A [`ChatRoom`] joins a pub/sub topic derived from a room name and runs
//! two Tokio tasks for as long as the room lives:
//!
//! - the **publish loop** turns text written to [`ChatRoom::outbound`]
//!   into envelopes on the topic,
//! - the **subscribe loop** turns envelopes from other peers into
//!   [`ChatMessage`](hbxchat_protocol::ChatMessage)s on
//!   [`ChatRoom::inbound`].
//!
//! Failures on either path never stop the room; they show up as
//! [`ChatLog`] events on [`ChatRoom::logs`].
//!
//! # Key types
//!
//! - [`ChatRoom`] — join, exit, peer list, display name
//! - [`RoomConfig`] — defaults, topic naming, queue sizes
//! - [`ChatLog`] / [`LogTag`] — diagnostic events
//! - [`RoomError`] — why a join failed

mod config;
mod error;
mod log;
mod relay;
mod room;

pub use config::{RoomConfig, DEFAULT_ROOM, DEFAULT_USER, TOPIC_PREFIX};
pub use error::RoomError;
pub use log::{ChatLog, LogTag};
pub use room::ChatRoom;

//! Wire protocol for HBXchat.
//!
//! This crate defines what peers in a chat room put on the topic:
//!
//! - **Types** ([`ChatMessage`]) — the envelope that travels on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how envelopes are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! ```text
//! Transport (bytes) → Protocol (ChatMessage) → Room (inbound queue)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::ChatMessage;

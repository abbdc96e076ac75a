//! Codec trait and implementations for serializing/deserializing envelopes.
//!
//! The room layer doesn't care HOW envelopes are serialized, only that
//! every peer on a topic agrees. [`JsonCodec`] is the format peers use
//! today; its output keeps field names so other implementations can read it.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → each room loop owns a copy of the codec and may run
///   on any thread of Tokio's pool.
/// - `'static` → the codec borrows nothing temporary, which is required
///   for anything moved into a spawned task.
///
/// ## Generic methods
///
/// `encode<T: Serialize>` and `decode<T: DeserializeOwned>` work for any
/// serde type. `DeserializeOwned` (rather than `Deserialize<'de>`) means
/// the decoded value owns its strings instead of borrowing from the
/// input buffer, so the buffer can be dropped right after decoding.
///
/// Rooms take the codec as a type parameter
/// (`ChatRoom::join_with_codec`), so swapping formats touches no loop code.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// Never produces a partially populated value: any missing or
    /// mistyped field is an error.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use hbxchat_protocol::{ChatMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg = ChatMessage::new("hi", "12D3KooWabc", "alice");
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: ChatMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::ChatMessage;

    #[test]
    fn test_encode_is_deterministic() {
        let msg = ChatMessage::new("hello", "peer-a", "alice");
        let first = JsonCodec.encode(&msg).unwrap();
        let second = JsonCodec.encode(&msg).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip_preserves_unicode_and_empty_fields() {
        for msg in [
            ChatMessage::new("", "", ""),
            ChatMessage::new("héllo 👋\n\"quoted\"", "peer-ü", "名前"),
        ] {
            let bytes = JsonCodec.encode(&msg).unwrap();
            let decoded: ChatMessage = JsonCodec.decode(&bytes).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn test_decode_garbage_is_an_error() {
        let inputs: [&[u8]; 6] = [
            b"",
            b"not json",
            b"{",
            b"[1,2,3]",
            b"\xff\xfe\x00",
            b"{\"message\":\"hi\"",
        ];
        for input in inputs {
            let result: Result<ChatMessage, _> = JsonCodec.decode(input);
            assert!(
                matches!(result, Err(ProtocolError::Decode(_))),
                "input {input:?} should fail to decode"
            );
        }
    }

    #[test]
    fn test_encode_error_surfaces_as_encode_variant() {
        // JSON object keys must be strings; a map keyed by a tuple can't be encoded.
        let mut map = HashMap::new();
        map.insert((1, 2), "x");
        let result = JsonCodec.encode(&map);
        assert!(matches!(result, Err(ProtocolError::Encode(_))));
    }
}

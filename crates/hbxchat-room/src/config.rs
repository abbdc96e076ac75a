//! Room configuration and naming conventions.

use serde::{Deserialize, Serialize};

/// Display name used when a room is joined with an empty user name.
pub const DEFAULT_USER: &str = "hbxuser";

/// Room joined when the room name is empty.
pub const DEFAULT_ROOM: &str = "lobby";

/// Prefix of every wire topic. All peers of a room must agree on it.
pub const TOPIC_PREFIX: &str = "room-HBXchat-";

/// Configuration for a chat room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Display name used when none is given.
    pub default_user: String,

    /// Room name used when none is given.
    pub default_room: String,

    /// Prepended to the room name to form the wire topic.
    pub topic_prefix: String,

    /// Outbound queue size. Writers wait when it is full.
    pub outbound_capacity: usize,

    /// Inbound queue size. A full queue stalls the subscribe loop,
    /// which in turn stops pulling from the network.
    pub inbound_capacity: usize,

    /// Diagnostic queue size. Logs that don't fit are dropped.
    pub log_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            default_user: DEFAULT_USER.to_string(),
            default_room: DEFAULT_ROOM.to_string(),
            topic_prefix: TOPIC_PREFIX.to_string(),
            outbound_capacity: 32,
            inbound_capacity: 32,
            log_capacity: 64,
        }
    }
}

impl RoomConfig {
    /// Returns `user`, or the default user when it is empty.
    pub fn resolve_user<'a>(&'a self, user: &'a str) -> &'a str {
        if user.is_empty() { &self.default_user } else { user }
    }

    /// Returns `room`, or the default room when it is empty.
    pub fn resolve_room<'a>(&'a self, room: &'a str) -> &'a str {
        if room.is_empty() { &self.default_room } else { room }
    }

    /// Derives the wire topic name for a (resolved) room name.
    pub fn topic_name(&self, room: &str) -> String {
        format!("{}{}", self.topic_prefix, room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.default_user, "hbxuser");
        assert_eq!(config.default_room, "lobby");
        assert_eq!(config.topic_prefix, "room-HBXchat-");
        assert!(config.log_capacity > 0);
    }

    #[test]
    fn test_resolve_falls_back_only_when_empty() {
        let config = RoomConfig::default();
        assert_eq!(config.resolve_user(""), "hbxuser");
        assert_eq!(config.resolve_user("alice"), "alice");
        assert_eq!(config.resolve_room(""), "lobby");
        assert_eq!(config.resolve_room("rust"), "rust");
    }

    #[test]
    fn test_topic_name_prefixes_room() {
        let config = RoomConfig::default();
        assert_eq!(config.topic_name("lobby"), "room-HBXchat-lobby");
    }

    #[test]
    fn test_partial_config_fills_in_defaults() {
        let config: RoomConfig =
            serde_json::from_str(r#"{"default_room":"general"}"#).unwrap();
        assert_eq!(config.default_room, "general");
        assert_eq!(config.default_user, "hbxuser");
        assert_eq!(config.inbound_capacity, 32);
    }
}

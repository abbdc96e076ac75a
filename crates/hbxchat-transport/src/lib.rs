//! Pub/sub transport abstraction for HBXchat.
//!
//! Provides the [`PubSub`], [`Topic`], and [`Subscription`] traits that a
//! chat room needs from the peer-to-peer network underneath it. Discovery,
//! connection setup, and the broadcast protocol itself all live behind
//! these traits.
//!
//! # Cancellation
//!
//! None of the async operations take a context argument. Callers cancel
//! an in-flight `publish` or `next` by dropping its future, usually by
//! racing it against a shutdown signal in `tokio::select!`.
//!
//! # Feature Flags
//!
//! - `memory` (default) — in-process transport backed by `tokio::sync::broadcast`

mod error;
#[cfg(feature = "memory")]
mod memory;

pub use error::TransportError;
#[cfg(feature = "memory")]
pub use memory::{MemoryNetwork, MemoryNode, MemorySubscription, MemoryTopic};

use std::fmt;
use std::future::Future;

/// Identity of a peer on the network.
///
/// Assigned by the transport, never generated by the layers above it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(String);

impl PeerId {
    /// Creates a new `PeerId` from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string form of the identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the underlying `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message as delivered by a subscription, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// The payload bytes exactly as published.
    pub data: Vec<u8>,
    /// The peer that published the message.
    pub from: PeerId,
}

/// An already-connected pub/sub network endpoint.
///
/// Discovery and bootstrapping happen before anyone calls [`join`]; by
/// then the endpoint is expected to already know some peers.
///
/// [`join`]: Self::join
pub trait PubSub: Send + Sync + 'static {
    /// The topic handle produced by [`join`](Self::join).
    type Topic: Topic;

    /// Returns this endpoint's stable peer identity.
    fn local_peer_id(&self) -> PeerId;

    /// Joins (or creates) the named broadcast topic.
    fn join(&self, topic: &str) -> Result<Self::Topic, TransportError>;
}

/// A joined broadcast topic.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → a room shares one topic between its own methods
///   (`peer_list`, `exit`) and its publish task through an `Arc`. An
///   `Arc<T>` can only cross into a `tokio::spawn`ed task if `T` is both
///   `Send` (may move to another thread) and `Sync` (may be used by
///   reference from several threads at once).
/// - `'static` → the topic owns everything it needs and borrows nothing
///   temporary, so it can live inside a task that outlives the caller.
///
/// ## Why `-> impl Future + Send` instead of `async fn`?
///
/// A plain `async fn` in a trait returns a future whose `Send`-ness is
/// unknown to generic code. The room spawns its loops on Tokio's
/// multi-threaded runtime, which requires `Send` futures, so the trait
/// spells the bound out. Implementations can still write `async fn`;
/// the compiler checks that their future satisfies the bound.
pub trait Topic: Send + Sync + 'static {
    /// The subscription type produced by [`subscribe`](Self::subscribe).
    type Subscription: Subscription;

    /// Returns the wire name of the topic.
    fn name(&self) -> &str;

    /// Opens a subscription that receives every message on the topic.
    fn subscribe(&self) -> Result<Self::Subscription, TransportError>;

    /// Broadcasts `data` to every subscriber of the topic.
    fn publish(
        &self,
        data: Vec<u8>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the peers currently known to be on the topic.
    ///
    /// This is a snapshot and may lag the real network state.
    fn list_peers(&self) -> Vec<PeerId>;

    /// Leaves the topic. Later publishes fail.
    fn close(&self);
}

/// A stream of messages from one topic.
///
/// ## Trait bounds explained
///
/// - `Send` → the subscription is moved into the subscribe task, which
///   may run on any worker thread.
/// - no `Sync` → only that one task ever touches it, through `&mut self`,
///   so it never needs to be shared. That lets implementations hold
///   receivers that are not `Sync` themselves.
/// - `'static` → it must outlive the function that spawned the task.
///
/// [`next`](Self::next) takes `&mut self` because reading advances a
/// position in the stream; [`cancel`](Self::cancel) takes `self` by value
/// so a released subscription cannot be read again.
pub trait Subscription: Send + 'static {
    /// Waits for the next message.
    ///
    /// An error is terminal: the subscription yields nothing afterwards.
    fn next(
        &mut self,
    ) -> impl Future<Output = Result<RawMessage, TransportError>> + Send;

    /// Releases the subscription.
    fn cancel(self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_id_new_and_into_inner() {
        let id = PeerId::new("peer-a");
        assert_eq!(id.as_str(), "peer-a");
        assert_eq!(id.into_inner(), "peer-a");
    }

    #[test]
    fn test_peer_id_display() {
        let id = PeerId::new("12D3KooWabc");
        assert_eq!(id.to_string(), "12D3KooWabc");
    }

    #[test]
    fn test_peer_id_ordering_is_lexicographic() {
        let mut ids = vec![PeerId::new("b"), PeerId::new("a"), PeerId::new("c")];
        ids.sort();
        assert_eq!(ids, vec![PeerId::new("a"), PeerId::new("b"), PeerId::new("c")]);
    }
}

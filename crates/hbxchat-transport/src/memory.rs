//! In-process pub/sub transport built on `tokio::sync::broadcast`.
//!
//! Every [`MemoryNode`] created from the same [`MemoryNetwork`] behaves
//! like a fully connected peer: a publish on a topic reaches every
//! subscription on that topic, the publisher's own included.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;
use tokio::sync::{broadcast, watch};
use tokio::sync::broadcast::error::RecvError;

use crate::{PeerId, PubSub, RawMessage, Subscription, Topic, TransportError};

/// Messages buffered per topic before slow subscribers start lagging.
const TOPIC_BUFFER: usize = 256;

/// A shared hub that connects every node created from it.
///
/// Cloning is cheap; clones refer to the same network.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    hub: Arc<Mutex<Hub>>,
}

#[derive(Default)]
struct Hub {
    topics: HashMap<String, TopicEntry>,
}

struct TopicEntry {
    sender: broadcast::Sender<RawMessage>,
    /// Open topic handles per peer.
    members: HashMap<PeerId, usize>,
}

impl MemoryNetwork {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node with a fresh random peer identity.
    pub fn node(&self) -> MemoryNode {
        self.node_with_id(PeerId::new(generate_peer_id()))
    }

    /// Creates a node with the given peer identity.
    pub fn node_with_id(&self, id: PeerId) -> MemoryNode {
        let (shutdown, _) = watch::channel(false);
        tracing::debug!(peer = %id, "memory node created");
        MemoryNode {
            id,
            network: self.clone(),
            shutdown: Arc::new(shutdown),
        }
    }

    // The hub is only ever held for short synchronous sections, so a
    // poisoned lock still guards consistent data.
    fn hub(&self) -> MutexGuard<'_, Hub> {
        self.hub.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One peer on a [`MemoryNetwork`].
pub struct MemoryNode {
    id: PeerId,
    network: MemoryNetwork,
    shutdown: Arc<watch::Sender<bool>>,
}

impl MemoryNode {
    /// Tears the node down.
    ///
    /// Every open subscription fails its next `next()` call and new joins
    /// are refused. This is how a transport-level failure looks to the
    /// layers above.
    pub fn shutdown(&self) {
        tracing::info!(peer = %self.id, "memory node shutting down");
        self.shutdown.send_replace(true);
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }
}

impl PubSub for MemoryNode {
    type Topic = MemoryTopic;

    fn local_peer_id(&self) -> PeerId {
        self.id.clone()
    }

    fn join(&self, topic: &str) -> Result<MemoryTopic, TransportError> {
        if self.is_shutdown() {
            return Err(TransportError::Shutdown);
        }

        let sender = {
            let mut hub = self.network.hub();
            let entry = hub
                .topics
                .entry(topic.to_string())
                .or_insert_with(|| TopicEntry {
                    sender: broadcast::channel(TOPIC_BUFFER).0,
                    members: HashMap::new(),
                });
            *entry.members.entry(self.id.clone()).or_insert(0) += 1;
            entry.sender.clone()
        };

        tracing::debug!(peer = %self.id, topic, "joined topic");
        Ok(MemoryTopic {
            name: topic.to_string(),
            peer: self.id.clone(),
            network: self.network.clone(),
            sender,
            shutdown: Arc::clone(&self.shutdown),
            closed: AtomicBool::new(false),
        })
    }
}

/// A topic joined by a [`MemoryNode`]. Closing or dropping it leaves the topic.
pub struct MemoryTopic {
    name: String,
    peer: PeerId,
    network: MemoryNetwork,
    sender: broadcast::Sender<RawMessage>,
    shutdown: Arc<watch::Sender<bool>>,
    closed: AtomicBool,
}

impl MemoryTopic {
    fn check_open(&self) -> Result<(), TransportError> {
        if *self.shutdown.borrow() {
            return Err(TransportError::Shutdown);
        }
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::TopicClosed(self.name.clone()));
        }
        Ok(())
    }
}

impl Topic for MemoryTopic {
    type Subscription = MemorySubscription;

    fn name(&self) -> &str {
        &self.name
    }

    fn subscribe(&self) -> Result<MemorySubscription, TransportError> {
        self.check_open()?;
        Ok(MemorySubscription {
            topic: self.name.clone(),
            receiver: self.sender.subscribe(),
            shutdown: self.shutdown.subscribe(),
            _node: Arc::clone(&self.shutdown),
        })
    }

    async fn publish(&self, data: Vec<u8>) -> Result<(), TransportError> {
        self.check_open()?;
        let msg = RawMessage {
            data,
            from: self.peer.clone(),
        };
        // A topic with no live subscriptions simply swallows the message.
        if self.sender.send(msg).is_err() {
            tracing::trace!(topic = %self.name, "published with no subscribers");
        }
        Ok(())
    }

    fn list_peers(&self) -> Vec<PeerId> {
        if self.closed.load(Ordering::Acquire) {
            return Vec::new();
        }
        let hub = self.network.hub();
        let mut peers: Vec<PeerId> = hub
            .topics
            .get(&self.name)
            .map(|entry| {
                entry
                    .members
                    .keys()
                    .filter(|id| **id != self.peer)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        peers.sort();
        peers
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut hub = self.network.hub();
        let mut unused = false;
        if let Some(entry) = hub.topics.get_mut(&self.name) {
            if let Some(count) = entry.members.get_mut(&self.peer) {
                *count -= 1;
                if *count == 0 {
                    entry.members.remove(&self.peer);
                }
            }
            unused = entry.members.is_empty() && entry.sender.receiver_count() == 0;
        }
        // Nobody can publish to or read from it any more.
        if unused {
            hub.topics.remove(&self.name);
        }
        tracing::debug!(peer = %self.peer, topic = %self.name, "left topic");
    }
}

impl Drop for MemoryTopic {
    fn drop(&mut self) {
        self.close();
    }
}

/// A subscription to a [`MemoryTopic`].
pub struct MemorySubscription {
    topic: String,
    receiver: broadcast::Receiver<RawMessage>,
    shutdown: watch::Receiver<bool>,
    /// Keeps the node's shutdown sender alive as long as the subscription.
    _node: Arc<watch::Sender<bool>>,
}

impl Subscription for MemorySubscription {
    async fn next(&mut self) -> Result<RawMessage, TransportError> {
        loop {
            let down = *self.shutdown.borrow_and_update();
            if down {
                return Err(TransportError::SubscriptionClosed);
            }

            tokio::select! {
                result = self.receiver.recv() => match result {
                    Ok(msg) => return Ok(msg),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            topic = %self.topic,
                            skipped,
                            "subscriber lagged, messages lost"
                        );
                    }
                    Err(RecvError::Closed) => {
                        return Err(TransportError::SubscriptionClosed);
                    }
                },
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        return Err(TransportError::SubscriptionClosed);
                    }
                }
            }
        }
    }

    fn cancel(self) {
        tracing::debug!(topic = %self.topic, "subscription cancelled");
    }
}

/// Generates a random 32-character hex peer identity (128 bits).
fn generate_peer_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

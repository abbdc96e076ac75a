//! The two loops that connect a room's queues to its topic.
//!
//! # Racing against shutdown
//!
//! Every step that can wait (reading the outbound queue, publishing,
//! waiting for the next network message, pushing into the inbound queue)
//! is wrapped in a `tokio::select!` together with
//! [`Shutdown::cancelled`]. Whichever future finishes first wins, and the
//! other one is *dropped*. Dropping a future is how Rust cancels it, so a
//! publish that loses the race is abandoned mid-flight rather than
//! completed after the room has gone.
//!
//! `biased;` changes how `select!` picks a branch when several are ready
//! at once. Without it, Tokio picks one at random (for fairness). With
//! it, branches are polled top to bottom, and the shutdown branch is
//! always first. So if the signal has fired and a message is also
//! waiting, the loop stops instead of handling one more message.

use std::sync::Arc;

use hbxchat_protocol::{ChatMessage, Codec};
use hbxchat_transport::{PeerId, Subscription, Topic};
use tokio::sync::{mpsc, watch};

use crate::log::LogSink;
use crate::LogTag;

/// Read side of a room's cancellation signal.
///
/// ## Why `watch`?
///
/// A `tokio::sync::watch` channel holds exactly one value (here a
/// `bool`) and lets any number of receivers wait for it to change. That
/// is the shape of a shutdown flag:
///
/// - the room holds the `Sender` and flips it to `true` once,
/// - each loop holds a cloned `Receiver` and can both *check* the
///   current value (no waiting) and *await* a change,
/// - a receiver that subscribes late still sees `true`, because the
///   value is stored, not broadcast as an event.
///
/// Once fired it stays fired. A dropped sender also counts as fired, so
/// dropping the room without calling `exit` still stops the loops.
#[derive(Clone)]
pub(crate) struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub(crate) fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// Resolves once the signal has fired.
    ///
    /// `borrow_and_update` reads the value and marks it as seen, so the
    /// following `changed()` only wakes for a *newer* value. Reading into
    /// a local first releases the borrow before the `.await`; holding a
    /// `watch::Ref` across an await would make the future non-`Send`.
    pub(crate) async fn cancelled(&mut self) {
        loop {
            let fired = *self.rx.borrow_and_update();
            if fired {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Relays outbound text to the topic.
pub(crate) struct Publisher<T: Topic, C: Codec> {
    pub(crate) room: Arc<str>,
    pub(crate) topic: Arc<T>,
    pub(crate) codec: C,
    pub(crate) self_id: PeerId,
    pub(crate) user_name: watch::Receiver<String>,
    pub(crate) outbound: mpsc::Receiver<String>,
    pub(crate) logs: LogSink,
    pub(crate) shutdown: Shutdown,
}

impl<T: Topic, C: Codec> Publisher<T, C> {
    pub(crate) async fn run(mut self) {
        tracing::debug!(room = %self.room, "publish loop started");

        loop {
            let text = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                next = self.outbound.recv() => match next {
                    Some(text) => text,
                    None => break,
                },
            };

            // The name is read per message so renames apply from the next send.
            let sender_name = self.user_name.borrow().clone();
            let msg = ChatMessage {
                text,
                sender_id: self.self_id.to_string(),
                sender_name,
            };

            let bytes = match self.codec.encode(&msg) {
                Ok(bytes) => bytes,
                Err(e) => {
                    self.logs.emit(
                        LogTag::PublishError,
                        format!("could not encode message: {e}"),
                    );
                    continue;
                }
            };

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                result = self.topic.publish(bytes) => {
                    if let Err(e) = result {
                        self.logs.emit(
                            LogTag::PublishError,
                            format!("could not publish to topic: {e}"),
                        );
                    } else {
                        tracing::trace!(room = %self.room, "message published");
                    }
                }
            }
        }

        tracing::debug!(room = %self.room, "publish loop stopped");
    }
}

/// Relays messages from other peers into the inbound queue.
pub(crate) struct Subscriber<S: Subscription, C: Codec> {
    pub(crate) room: Arc<str>,
    pub(crate) subscription: S,
    pub(crate) codec: C,
    pub(crate) self_id: PeerId,
    pub(crate) inbound: mpsc::Sender<ChatMessage>,
    pub(crate) logs: LogSink,
    pub(crate) shutdown: Shutdown,
}

impl<S: Subscription, C: Codec> Subscriber<S, C> {
    /// Runs until shutdown or until the subscription fails.
    ///
    /// Returning drops the inbound sender, which is how consumers learn
    /// that no more messages will arrive. The subscription is released
    /// on the way out.
    pub(crate) async fn run(mut self) {
        tracing::debug!(room = %self.room, "subscribe loop started");

        loop {
            let raw = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                next = self.subscription.next() => match next {
                    Ok(raw) => raw,
                    Err(e) => {
                        self.logs.emit(
                            LogTag::SubscribeError,
                            format!("subscription has closed: {e}"),
                        );
                        break;
                    }
                },
            };

            if raw.from == self.self_id {
                continue;
            }

            let msg: ChatMessage = match self.codec.decode(&raw.data) {
                Ok(msg) => msg,
                Err(e) => {
                    self.logs.emit(
                        LogTag::SubscribeError,
                        format!("could not decode message from {}: {e}", raw.from),
                    );
                    continue;
                }
            };

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                sent = self.inbound.send(msg) => {
                    if sent.is_err() {
                        tracing::trace!(room = %self.room, "inbound reader gone");
                    }
                }
            }
        }

        self.subscription.cancel();
        tracing::debug!(room = %self.room, "subscribe loop stopped");
    }
}

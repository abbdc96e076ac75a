//! The chat room handle: join, exit, and the queues in between.

use std::sync::Arc;

use hbxchat_protocol::{ChatMessage, Codec, JsonCodec};
use hbxchat_transport::{PeerId, PubSub, Topic};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::log::LogSink;
use crate::relay::{Publisher, Shutdown, Subscriber};
use crate::{ChatLog, RoomConfig, RoomError};

/// A joined chat room.
///
/// The three queues are public fields so a UI can borrow them side by
/// side in one `tokio::select!`:
///
/// ```rust,ignore
/// loop {
///     tokio::select! {
///         Some(msg) = room.inbound.recv() => render(msg),
///         Some(log) = room.logs.recv() => show(log),
///         line = input.next_line() => room.outbound.send(line?).await?,
///     }
/// }
/// ```
///
/// Dropping the room stops both loops and leaves the topic; [`exit`]
/// does the same but also waits for the loops to finish.
///
/// [`exit`]: Self::exit
pub struct ChatRoom<T: Topic> {
    /// Messages from other peers. Yields `None` once the subscription
    /// has ended for good.
    pub inbound: mpsc::Receiver<ChatMessage>,

    /// Text to publish, in order, under the current display name.
    pub outbound: mpsc::Sender<String>,

    /// Diagnostics from both loops.
    pub logs: mpsc::Receiver<ChatLog>,

    room_name: Arc<str>,
    topic_name: String,
    self_id: PeerId,
    user_name: watch::Sender<String>,
    topic: Arc<T>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    exited: bool,
}

impl<T: Topic> ChatRoom<T> {
    /// Joins `room_name` as `user_name` with the default [`RoomConfig`].
    ///
    /// Empty names fall back to [`DEFAULT_USER`](crate::DEFAULT_USER) and
    /// [`DEFAULT_ROOM`](crate::DEFAULT_ROOM).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn join<P>(
        pubsub: &P,
        user_name: &str,
        room_name: &str,
    ) -> Result<Self, RoomError>
    where
        P: PubSub<Topic = T>,
    {
        Self::join_with_config(pubsub, user_name, room_name, RoomConfig::default())
    }

    /// Joins a room using an explicit configuration and [`JsonCodec`].
    pub fn join_with_config<P>(
        pubsub: &P,
        user_name: &str,
        room_name: &str,
        config: RoomConfig,
    ) -> Result<Self, RoomError>
    where
        P: PubSub<Topic = T>,
    {
        Self::join_with_codec(pubsub, user_name, room_name, config, JsonCodec)
    }

    /// Joins a room with an explicit configuration and envelope codec.
    ///
    /// Every peer on the topic must use a compatible codec. The codec is
    /// cloned once so each loop owns its own copy; `Codec` already
    /// requires `Send + Sync + 'static`, which is what `tokio::spawn`
    /// needs from anything moved into a task.
    ///
    /// # Errors
    /// [`RoomError::Join`] if the topic can't be joined,
    /// [`RoomError::Subscribe`] if it can't be subscribed to. Nothing is
    /// spawned in either case.
    pub fn join_with_codec<P, C>(
        pubsub: &P,
        user_name: &str,
        room_name: &str,
        config: RoomConfig,
        codec: C,
    ) -> Result<Self, RoomError>
    where
        P: PubSub<Topic = T>,
        C: Codec + Clone,
    {
        let user_name = config.resolve_user(user_name).to_string();
        let room_name: Arc<str> = Arc::from(config.resolve_room(room_name));
        let topic_name = config.topic_name(&room_name);

        let topic = pubsub.join(&topic_name).map_err(|source| RoomError::Join {
            topic: topic_name.clone(),
            source,
        })?;
        let subscription =
            topic.subscribe().map_err(|source| RoomError::Subscribe {
                topic: topic_name.clone(),
                source,
            })?;

        let topic = Arc::new(topic);
        let self_id = pubsub.local_peer_id();

        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_capacity.max(1));
        let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_capacity.max(1));
        let (log_tx, log_rx) = mpsc::channel(config.log_capacity.max(1));
        let (user_tx, user_rx) = watch::channel(user_name.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let logs = LogSink::new(Arc::clone(&room_name), log_tx);
        let shutdown = Shutdown::new(shutdown_rx);

        let publisher = Publisher {
            room: Arc::clone(&room_name),
            topic: Arc::clone(&topic),
            codec: codec.clone(),
            self_id: self_id.clone(),
            user_name: user_rx,
            outbound: outbound_rx,
            logs: logs.clone(),
            shutdown: shutdown.clone(),
        };
        let subscriber = Subscriber {
            room: Arc::clone(&room_name),
            subscription,
            codec,
            self_id: self_id.clone(),
            inbound: inbound_tx,
            logs,
            shutdown,
        };

        let tasks = vec![
            tokio::spawn(subscriber.run()),
            tokio::spawn(publisher.run()),
        ];

        tracing::info!(
            room = %room_name,
            topic = %topic_name,
            user = %user_name,
            peer = %self_id,
            "joined chat room"
        );

        Ok(Self {
            inbound: inbound_rx,
            outbound: outbound_tx,
            logs: log_rx,
            room_name,
            topic_name,
            self_id,
            user_name: user_tx,
            topic,
            shutdown: shutdown_tx,
            tasks,
            exited: false,
        })
    }

    /// The logical room name (after defaulting).
    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// The wire topic the room is joined to.
    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    /// This peer's identity, as stamped on outgoing envelopes.
    pub fn self_id(&self) -> &PeerId {
        &self.self_id
    }

    /// The display name the next publish will carry.
    pub fn user_name(&self) -> String {
        self.user_name.borrow().clone()
    }

    /// Changes the display name for subsequent publishes.
    ///
    /// Messages already handed to the transport keep the old name.
    pub fn update_user(&self, name: impl Into<String>) {
        let name = name.into();
        tracing::info!(room = %self.room_name, user = %name, "display name changed");
        self.user_name.send_replace(name);
    }

    /// Other peers the transport currently sees on the topic.
    pub fn peer_list(&self) -> Vec<PeerId> {
        self.topic.list_peers()
    }

    /// Leaves the room.
    ///
    /// Fires the shutdown signal, waits for both loops to stop (the
    /// subscribe loop releases the subscription), then closes the topic.
    /// Once this returns, nothing more is published or delivered.
    pub async fn exit(mut self) {
        self.shutdown.send_replace(true);

        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                tracing::error!(room = %self.room_name, error = %e, "room task failed");
            }
        }

        self.topic.close();
        self.exited = true;
        tracing::info!(room = %self.room_name, "left chat room");
    }
}

impl<T: Topic> Drop for ChatRoom<T> {
    fn drop(&mut self) {
        if self.exited {
            return;
        }
        self.shutdown.send_replace(true);
        self.topic.close();
        tracing::debug!(room = %self.room_name, "chat room dropped without exit");
    }
}

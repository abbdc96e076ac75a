/// Errors that can occur in the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Joining a topic failed.
    #[error("join failed: {0}")]
    JoinFailed(String),

    /// The topic handle was closed before the operation.
    #[error("topic closed: {0}")]
    TopicClosed(String),

    /// Publishing data failed.
    #[error("publish failed: {0}")]
    PublishFailed(String),

    /// The subscription ended and will yield no more messages.
    #[error("subscription closed")]
    SubscriptionClosed,

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}

//! Diagnostic events reported by a room's loops.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Which path a diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    /// Raised by the publish loop.
    PublishError,
    /// Raised by the subscribe loop.
    SubscribeError,
}

impl fmt::Display for LogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublishError => write!(f, "puberr"),
            Self::SubscribeError => write!(f, "suberr"),
        }
    }
}

/// A recoverable failure observed by a room. Purely informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLog {
    pub tag: LogTag,
    pub message: String,
}

impl fmt::Display for ChatLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag, self.message)
    }
}

/// Writing half of a room's diagnostic queue.
///
/// Never waits: when the queue is full or nobody reads it, the event is
/// dropped. Every event also goes to `tracing`.
#[derive(Clone)]
pub(crate) struct LogSink {
    room: Arc<str>,
    tx: mpsc::Sender<ChatLog>,
}

impl LogSink {
    pub(crate) fn new(room: Arc<str>, tx: mpsc::Sender<ChatLog>) -> Self {
        Self { room, tx }
    }

    pub(crate) fn emit(&self, tag: LogTag, message: impl Into<String>) {
        let log = ChatLog {
            tag,
            message: message.into(),
        };
        tracing::warn!(room = %self.room, %tag, detail = %log.message, "room diagnostic");

        match self.tx.try_send(log) {
            Ok(()) => {}
            Err(TrySendError::Full(log)) => {
                tracing::warn!(
                    room = %self.room,
                    tag = %log.tag,
                    "diagnostic queue full, dropping event"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::trace!(room = %self.room, "diagnostic queue closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(capacity: usize) -> (LogSink, mpsc::Receiver<ChatLog>) {
        let (tx, rx) = mpsc::channel(capacity);
        (LogSink::new(Arc::from("test"), tx), rx)
    }

    #[test]
    fn test_log_tag_display() {
        assert_eq!(LogTag::PublishError.to_string(), "puberr");
        assert_eq!(LogTag::SubscribeError.to_string(), "suberr");
    }

    #[test]
    fn test_chat_log_display() {
        let log = ChatLog {
            tag: LogTag::SubscribeError,
            message: "subscription has closed".into(),
        };
        assert_eq!(log.to_string(), "[suberr] subscription has closed");
    }

    #[test]
    fn test_emit_delivers_in_order() {
        let (sink, mut rx) = sink(4);
        sink.emit(LogTag::PublishError, "one");
        sink.emit(LogTag::SubscribeError, "two");
        assert_eq!(rx.try_recv().unwrap().message, "one");
        assert_eq!(rx.try_recv().unwrap().tag, LogTag::SubscribeError);
    }

    #[test]
    fn test_emit_drops_when_full_instead_of_blocking() {
        let (sink, mut rx) = sink(1);
        sink.emit(LogTag::PublishError, "kept");
        sink.emit(LogTag::PublishError, "dropped");
        assert_eq!(rx.try_recv().unwrap().message, "kept");
        assert!(rx.try_recv().is_err());
    }

    /// Records the field names of every event it sees.
    #[derive(Default, Clone)]
    struct FieldNames(Arc<std::sync::Mutex<Vec<Vec<String>>>>);

    struct NameVisitor<'a>(&'a mut Vec<String>);

    impl tracing::field::Visit for NameVisitor<'_> {
        fn record_debug(
            &mut self,
            field: &tracing::field::Field,
            _value: &dyn std::fmt::Debug,
        ) {
            self.0.push(field.name().to_string());
        }
    }

    impl tracing::Subscriber for FieldNames {
        fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            tracing::span::Id::from_u64(1)
        }
        fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}
        fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}
        fn event(&self, event: &tracing::Event<'_>) {
            let mut names = Vec::new();
            event.record(&mut NameVisitor(&mut names));
            self.0.lock().unwrap().push(names);
        }
        fn enter(&self, _: &tracing::span::Id) {}
        fn exit(&self, _: &tracing::span::Id) {}
    }

    #[test]
    fn test_emit_traces_each_field_once() {
        let recorder = FieldNames::default();
        let (sink, _rx) = sink(1);
        tracing::subscriber::with_default(recorder.clone(), || {
            sink.emit(LogTag::PublishError, "could not publish");
        });

        let events = recorder.0.lock().unwrap();
        let names = events.first().expect("emit should trace an event");
        for field in ["message", "room", "tag", "detail"] {
            let count = names.iter().filter(|n| *n == field).count();
            assert_eq!(count, 1, "field {field} in {names:?}");
        }
    }

    #[test]
    fn test_emit_without_reader_is_harmless() {
        let (sink, rx) = sink(1);
        drop(rx);
        sink.emit(LogTag::SubscribeError, "nobody listening");
    }
}

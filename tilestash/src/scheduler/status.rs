//! Short-lived status messages

use parking_lot::Mutex;

/// How long an ordinary status line stays up, in seconds.
pub const DEFAULT_STATUS_LIFETIME: f64 = 3.0;
/// Lifetime for download progress and position fixes.
pub const LONG_STATUS_LIFETIME: f64 = 10.0;

/// Somewhere to show one-line status messages.
pub trait StatusSink: Send + Sync {
    /// Show `message` for `lifetime` seconds, replacing the previous one.
    fn publish(&self, message: &str, lifetime: f64);
}

#[derive(Debug, Clone, PartialEq)]
struct Shown {
    text: String,
    remaining: f64,
}

/// A status bar holding at most one message.
#[derive(Debug, Default)]
pub struct StatusBoard {
    shown: Mutex<Option<Shown>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible message, if any.
    pub fn current(&self) -> Option<String> {
        self.shown.lock().as_ref().map(|s| s.text.clone())
    }

    /// Age the visible message, clearing it once its lifetime is spent.
    pub fn advance(&self, dt: f64) {
        let mut shown = self.shown.lock();
        if let Some(s) = shown.as_mut() {
            s.remaining -= dt.max(0.0);
            if s.remaining <= 0.0 {
                *shown = None;
            }
        }
    }

    pub fn clear(&self) {
        *self.shown.lock() = None;
    }
}

impl StatusSink for StatusBoard {
    fn publish(&self, message: &str, lifetime: f64) {
        tracing::debug!(text = message, lifetime, "Status");
        *self.shown.lock() = Some(Shown {
            text: message.to_string(),
            remaining: lifetime,
        });
    }
}

impl<S: StatusSink + ?Sized> StatusSink for std::sync::Arc<S> {
    fn publish(&self, message: &str, lifetime: f64) {
        (**self).publish(message, lifetime)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Sink that records every message it is given.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub messages: Mutex<Vec<(String, f64)>>,
    }

    impl RecordingSink {
        pub fn texts(&self) -> Vec<String> {
            self.messages.lock().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    impl StatusSink for RecordingSink {
        fn publish(&self, message: &str, lifetime: f64) {
            self.messages.lock().push((message.to_string(), lifetime));
        }
    }

    #[test]
    fn test_message_expires() {
        let board = StatusBoard::new();
        board.publish("Looking for \"Paris\"", DEFAULT_STATUS_LIFETIME);
        board.advance(2.0);
        assert_eq!(board.current().as_deref(), Some("Looking for \"Paris\""));
        board.advance(1.0);
        assert_eq!(board.current(), None);
    }

    #[test]
    fn test_new_message_replaces_and_resets_lifetime() {
        let board = StatusBoard::new();
        board.publish("first", 1.0);
        board.advance(0.9);
        board.publish("second", LONG_STATUS_LIFETIME);
        board.advance(5.0);
        assert_eq!(board.current().as_deref(), Some("second"));
    }
}

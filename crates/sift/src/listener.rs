//! Event listener surface for platform lifecycle events.
//!
//! The hosting collaborator delivers events on its own schedule; handlers
//! are fire-and-forget. Topic patterns support a single trailing `*`
//! wildcard, so `"upload:*"` matches `"upload:completed"`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Handler invoked when an event's topic matches a registered pattern.
pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

/// A lifecycle event delivered by the hosting platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Topic, e.g. `upload:completed` or `client:init`.
    pub topic: String,
    /// Context metadata attached by the sender.
    #[serde(default)]
    pub context: serde_json::Map<String, JsonValue>,
}

impl Event {
    /// Create an event with an empty context.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            context: serde_json::Map::new(),
        }
    }

    /// Attach one context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Registry of topic-pattern handlers.
pub struct Listener {
    handlers: Vec<(String, EventHandler)>,
}

impl Listener {
    /// Create an empty listener.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler for a topic pattern.
    pub fn on(mut self, pattern: impl Into<String>, handler: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.handlers.push((pattern.into(), Arc::new(handler)));
        self
    }

    /// Deliver an event to every handler whose pattern matches its topic.
    ///
    /// Fire-and-forget: handlers return nothing and their effects are not
    /// observed by the dispatcher.
    pub fn dispatch(&self, event: &Event) {
        for (pattern, handler) in &self.handlers {
            if topic_matches(pattern, &event.topic) {
                handler(event);
            }
        }
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for Listener {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

fn topic_matches(pattern: &str, topic: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => topic.starts_with(prefix),
        None => pattern == topic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_wildcard_topic_matching() {
        assert!(topic_matches("upload:*", "upload:completed"));
        assert!(topic_matches("upload:*", "upload:started"));
        assert!(topic_matches("*", "anything"));
        assert!(topic_matches("client:init", "client:init"));
        assert!(!topic_matches("upload:*", "client:init"));
        assert!(!topic_matches("client:init", "client:init2"));
    }

    #[test]
    fn test_dispatch_reaches_matching_handlers() {
        static UPLOADS: AtomicUsize = AtomicUsize::new(0);
        static INITS: AtomicUsize = AtomicUsize::new(0);

        let listener = Listener::new()
            .on("upload:*", |_| {
                UPLOADS.fetch_add(1, Ordering::SeqCst);
            })
            .on("client:init", |_| {
                INITS.fetch_add(1, Ordering::SeqCst);
            });
        assert_eq!(listener.len(), 2);
        assert!(!listener.is_empty());
        assert!(Listener::new().is_empty());

        listener.dispatch(&Event::new("upload:completed"));
        listener.dispatch(&Event::new("client:init"));
        listener.dispatch(&Event::new("unrelated"));

        assert_eq!(UPLOADS.load(Ordering::SeqCst), 1);
        assert_eq!(INITS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_context() {
        let event = Event::new("upload:completed")
            .with_context("rows", 12)
            .with_context("source", "roster.csv");
        assert_eq!(event.context["rows"], 12);
        assert_eq!(event.context["source"], "roster.csv");
    }
}

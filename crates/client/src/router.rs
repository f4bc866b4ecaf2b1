//! In-process change feed.
//!
//! Embedders that own the socket loop decode each incoming notification and
//! hand it to [`SignalRouter::deliver`], which calls every handler registered
//! for that `(topic, path, signal)` triple in subscription order.

use crate::error::TransportError;
use crate::transport::{ChangeFeed, FeedHandle, SignalHandler};
use hashbrown::HashMap;
use mirra_core::DynamicValue;

struct Route {
    topic: String,
    path: String,
    signal: String,
    handler: SignalHandler,
}

/// Routes notifications to subscribed handlers.
#[derive(Default)]
pub struct SignalRouter {
    routes: HashMap<FeedHandle, Route>,
    next_id: u64,
}

impl SignalRouter {
    /// Creates a router with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers one notification; returns how many handlers received it.
    pub fn deliver(&mut self, topic: &str, path: &str, signal: &str, param: &DynamicValue) -> usize {
        let mut handles: Vec<FeedHandle> = self
            .routes
            .iter()
            .filter(|(_, r)| r.topic == topic && r.path == path && r.signal == signal)
            .map(|(h, _)| *h)
            .collect();
        handles.sort_unstable();

        for handle in &handles {
            if let Some(route) = self.routes.get_mut(handle) {
                (route.handler)(path, signal, param);
            }
        }
        if handles.is_empty() {
            tracing::trace!(topic, path, signal, "notification without subscribers");
        }
        handles.len()
    }

    /// Returns the number of subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if nothing is subscribed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the topics with at least one subscription.
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = self.routes.values().map(|r| r.topic.as_str()).collect();
        topics.sort_unstable();
        topics.dedup();
        topics
    }
}

impl ChangeFeed for SignalRouter {
    fn subscribe(
        &mut self,
        topic: &str,
        path: &str,
        signal: &str,
        handler: SignalHandler,
    ) -> Result<FeedHandle, TransportError> {
        self.next_id += 1;
        let handle = FeedHandle(self.next_id);
        self.routes.insert(
            handle,
            Route {
                topic: topic.to_string(),
                path: path.to_string(),
                signal: signal.to_string(),
                handler,
            },
        );
        tracing::info!(topic, path, signal, handle = handle.0, "subscribed");
        Ok(handle)
    }

    fn unsubscribe(&mut self, handle: FeedHandle) -> bool {
        let removed = self.routes.remove(&handle).is_some();
        if removed {
            tracing::info!(handle = handle.0, "unsubscribed");
        }
        removed
    }
}

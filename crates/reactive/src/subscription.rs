//! Subscriber registry for observable collections.

use crate::change_set::ChangeSet;
use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Callback type for change notifications.
///
/// Callbacks are reference counted so a notification pass can run on a
/// snapshot while the registry stays free for (un)subscribing.
pub type ChangeCallback<T> = Rc<dyn Fn(&ChangeSet<T>)>;

/// Callbacks keyed by subscription id.
pub(crate) struct SubscriptionManager<T> {
    callbacks: HashMap<SubscriptionId, ChangeCallback<T>>,
    next_id: SubscriptionId,
}

impl<T> SubscriptionManager<T> {
    pub(crate) fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
            next_id: 1,
        }
    }

    /// Registers `callback`; ids start at 1 and are never reused.
    pub(crate) fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeSet<T>) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks.insert(id, Rc::new(callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.callbacks.remove(&id).is_some()
    }

    /// Returns the callbacks in subscription order.
    pub(crate) fn callbacks(&self) -> Vec<ChangeCallback<T>> {
        let mut entries: Vec<(&SubscriptionId, &ChangeCallback<T>)> = self.callbacks.iter().collect();
        entries.sort_unstable_by_key(|(id, _)| **id);
        entries.into_iter().map(|(_, cb)| cb.clone()).collect()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }
}

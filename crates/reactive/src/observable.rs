//! Observable collection implementation.
//!
//! `ObservableCollection` owns a vector of items and notifies subscribers
//! with a [`ChangeSet`] after every mutation.
//!
//! Mutation never happens inside an observation cycle. A cycle is open while
//! subscribers are being notified, while an update closure runs, and while a
//! tracked read (`with`) runs. An `update` issued during a cycle is queued
//! and the queue drains in FIFO order once the outermost cycle ends, each
//! drained update producing its own notification.
//!
//! `untracked` reads do not open a cycle, but the items stay borrowed while
//! they run, so updates issued from them are queued too and run when the
//! outermost read returns.

use crate::change_set::ChangeSet;
use crate::subscription::{SubscriptionId, SubscriptionManager};
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

/// A queued mutation.
type Mutation<T> = Box<dyn FnOnce(&mut Vec<T>) -> ChangeSet<T>>;

/// Whether an update ran immediately or was queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The update ran and subscribers have been notified.
    Applied,
    /// An observation cycle was open; the update runs after it ends.
    Deferred,
}

/// What the collection is doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Reading,
    Mutating,
    Notifying,
}

struct Inner<T> {
    items: RefCell<Vec<T>>,
    subscriptions: RefCell<SubscriptionManager<T>>,
    deferred: RefCell<VecDeque<Mutation<T>>>,
    phase: Cell<Phase>,
    /// Depth of nested `untracked` reads
    readers: Cell<usize>,
}

/// A shared, observable vector of items.
///
/// Cloning the collection clones the handle; all clones see the same items
/// and subscribers.
///
/// # Example
///
/// ```
/// use mirra_reactive::{ChangeSet, ObservableCollection, UpdateStatus};
///
/// let collection = ObservableCollection::new(vec![1, 2, 3]);
/// let status = collection.update(|items| {
///     let mut changes = ChangeSet::new();
///     let old = core::mem::replace(&mut items[0], 10);
///     changes.modify(old, 10);
///     changes
/// });
///
/// assert_eq!(status, UpdateStatus::Applied);
/// assert_eq!(collection.with(|items| items.to_vec()), vec![10, 2, 3]);
/// ```
pub struct ObservableCollection<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for ObservableCollection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Default for ObservableCollection<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: 'static> ObservableCollection<T> {
    /// Creates a collection holding `items`.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(Inner {
                items: RefCell::new(items),
                subscriptions: RefCell::new(SubscriptionManager::new()),
                deferred: RefCell::new(VecDeque::new()),
                phase: Cell::new(Phase::Idle),
                readers: Cell::new(0),
            }),
        }
    }

    /// Reads the items inside an observation cycle.
    ///
    /// Updates issued from `f` are deferred until it returns.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let outer = self.enter(Phase::Reading);
        let result = {
            let items = self.inner.items.borrow();
            f(&items)
        };
        self.leave(outer);
        result
    }

    /// Reads the items without opening an observation cycle.
    pub fn untracked<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let readers = &self.inner.readers;
        readers.set(readers.get() + 1);
        let result = {
            let items = self.inner.items.borrow();
            f(&items)
        };
        readers.set(readers.get() - 1);
        if readers.get() == 0 && !self.is_observing() {
            self.drain();
        }
        result
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.untracked(|items| items.len())
    }

    /// Returns true if the collection holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the items.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.untracked(|items| items.to_vec())
    }

    /// Returns true while an observation cycle is open.
    #[inline]
    pub fn is_observing(&self) -> bool {
        self.inner.phase.get() != Phase::Idle
    }

    /// Returns the number of queued updates.
    pub fn pending_updates(&self) -> usize {
        self.inner.deferred.borrow().len()
    }

    /// Mutates the items.
    ///
    /// `f` returns the change set describing what it did; subscribers are
    /// notified unless it is empty. Inside an observation cycle the update is
    /// queued instead and [`UpdateStatus::Deferred`] is returned.
    pub fn update<F>(&self, f: F) -> UpdateStatus
    where
        F: FnOnce(&mut Vec<T>) -> ChangeSet<T> + 'static,
    {
        if self.is_observing() || self.is_reading() {
            let mut deferred = self.inner.deferred.borrow_mut();
            deferred.push_back(Box::new(f));
            tracing::trace!(pending = deferred.len(), "update deferred to end of cycle");
            return UpdateStatus::Deferred;
        }
        self.run(Box::new(f));
        self.drain();
        UpdateStatus::Applied
    }

    /// Replaces the whole contents, reporting old items as removed and new
    /// items as added.
    pub fn replace(&self, items: Vec<T>) -> UpdateStatus
    where
        T: Clone,
    {
        self.update(move |current| {
            let added = items.clone();
            let removed = core::mem::replace(current, items);
            ChangeSet::replaced(removed, added)
        })
    }

    /// Subscribes to changes with the given callback.
    ///
    /// Returns a subscription ID that can be used to unsubscribe.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeSet<T>) + 'static,
    {
        self.inner.subscriptions.borrow_mut().subscribe(callback)
    }

    /// Unsubscribes by ID.
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscriptions.borrow_mut().unsubscribe(id)
    }

    /// Returns the number of subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.borrow().len()
    }

    /// Returns true while an `untracked` read holds the items.
    fn is_reading(&self) -> bool {
        self.inner.readers.get() > 0 || self.inner.items.try_borrow_mut().is_err()
    }

    /// Opens a cycle unless one is open; returns the phase to restore.
    fn enter(&self, phase: Phase) -> Phase {
        let outer = self.inner.phase.get();
        if outer == Phase::Idle {
            self.inner.phase.set(phase);
        }
        outer
    }

    /// Restores `outer` and, when that closes the outermost cycle, drains the
    /// deferred queue.
    fn leave(&self, outer: Phase) {
        self.inner.phase.set(outer);
        if outer == Phase::Idle {
            self.drain();
        }
    }

    fn run(&self, mutation: Mutation<T>) {
        self.inner.phase.set(Phase::Mutating);
        let changes = {
            let mut items = self.inner.items.borrow_mut();
            mutation(&mut items)
        };
        if !changes.is_empty() {
            tracing::trace!(changes = changes.len(), "notifying subscribers");
            self.notify(&changes);
        }
        self.inner.phase.set(Phase::Idle);
    }

    fn notify(&self, changes: &ChangeSet<T>) {
        let callbacks = self.inner.subscriptions.borrow().callbacks();
        self.inner.phase.set(Phase::Notifying);
        for callback in callbacks {
            callback(changes);
        }
    }

    /// Runs queued updates in order. Stops, leaving the rest queued, while
    /// the items are borrowed.
    fn drain(&self) {
        while !self.is_reading() {
            let next = self.inner.deferred.borrow_mut().pop_front();
            match next {
                Some(mutation) => self.run(mutation),
                None => break,
            }
        }
    }
}

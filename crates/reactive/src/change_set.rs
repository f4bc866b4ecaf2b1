//! Change set for tracking collection changes.
//!
//! A ChangeSet describes one mutation of an observed collection: the items
//! that were added, removed, and replaced in place.

use alloc::vec::Vec;

/// A set of changes to an observed collection.
///
/// This struct tracks:
/// - `added`: Items that were inserted
/// - `removed`: Items that were deleted
/// - `modified`: Items that were replaced in place (old value, new value)
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeSet<T> {
    /// Items that were added to the collection
    pub added: Vec<T>,
    /// Items that were removed from the collection
    pub removed: Vec<T>,
    /// Items that were replaced (old, new)
    pub modified: Vec<(T, T)>,
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            modified: Vec::new(),
        }
    }
}

impl<T> ChangeSet<T> {
    /// Creates a new empty change set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a change set representing a freshly loaded collection.
    ///
    /// All items are treated as additions.
    pub fn initial(items: Vec<T>) -> Self {
        Self {
            added: items,
            ..Self::default()
        }
    }

    /// Creates a change set for a wholesale replacement of the contents.
    pub fn replaced(old: Vec<T>, new: Vec<T>) -> Self {
        Self {
            added: new,
            removed: old,
            modified: Vec::new(),
        }
    }

    /// Returns true if there are no changes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Returns the total number of changes.
    #[inline]
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    /// Adds a replaced item pair.
    #[inline]
    pub fn modify(&mut self, old: T, new: T) {
        self.modified.push((old, new));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_change_set_new() {
        let cs: ChangeSet<i64> = ChangeSet::new();
        assert!(cs.is_empty());
        assert_eq!(cs.len(), 0);
    }

    #[test]
    fn test_change_set_initial() {
        let cs = ChangeSet::initial(vec![1, 2]);
        assert_eq!(cs.added, vec![1, 2]);
        assert!(cs.removed.is_empty());
        assert!(cs.modified.is_empty());
    }

    #[test]
    fn test_change_set_replaced() {
        let cs = ChangeSet::replaced(vec![1], vec![2, 3]);
        assert_eq!(cs.removed, vec![1]);
        assert_eq!(cs.added, vec![2, 3]);
        assert_eq!(cs.len(), 3);
    }

    #[test]
    fn test_change_set_modify() {
        let mut cs = ChangeSet::new();
        cs.modify(4, 5);
        cs.modify(6, 7);
        assert!(!cs.is_empty());
        assert_eq!(cs.modified, vec![(4, 5), (6, 7)]);
        assert_eq!(cs.len(), 2);
    }
}

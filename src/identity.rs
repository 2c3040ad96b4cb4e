//! Detachable, equality-stable node identity.
//!
//! A [`NodeHandle`] stands for one logical node of the tree, independent of
//! whether the domain object is currently held in memory. Equality and hashing
//! go through the provider's external key only, so a handle created from a
//! reloaded instance compares equal to the handle of the original instance.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity handle for one logical tree node.
///
/// Holds the provider's stable key plus an optional cached payload. The
/// payload is released by [`detach`](NodeHandle::detach) once a traversal pass
/// is done with it; the key (and therefore identity) survives.
///
/// Identity is guaranteed stable only within one provider instance's lifetime.
pub struct NodeHandle<K, T> {
    key: K,
    payload: RefCell<Option<T>>,
}

impl<K, T> NodeHandle<K, T> {
    /// Handle with an attached payload.
    pub fn new(key: K, payload: T) -> Self {
        Self {
            key,
            payload: RefCell::new(Some(payload)),
        }
    }

    /// Handle carrying identity only, e.g. a lookup probe.
    pub fn detached(key: K) -> Self {
        Self {
            key,
            payload: RefCell::new(None),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn is_attached(&self) -> bool {
        self.payload.borrow().is_some()
    }

    /// Release the cached payload. Identity is unaffected.
    pub fn detach(&self) {
        self.payload.borrow_mut().take();
    }

    /// Re-attach a (possibly reloaded) payload.
    pub fn attach(&self, payload: T) {
        *self.payload.borrow_mut() = Some(payload);
    }
}

impl<K, T: Clone> NodeHandle<K, T> {
    /// The cached domain object, if still attached.
    pub fn object(&self) -> Option<T> {
        self.payload.borrow().clone()
    }
}

impl<K: Clone, T: Clone> Clone for NodeHandle<K, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            payload: RefCell::new(self.payload.borrow().clone()),
        }
    }
}

// Identity is the key alone; the cached payload never participates.
impl<K: PartialEq, T> PartialEq for NodeHandle<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq, T> Eq for NodeHandle<K, T> {}

impl<K: Hash, T> Hash for NodeHandle<K, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<K: fmt::Debug, T> fmt::Debug for NodeHandle<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("key", &self.key)
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_payload() {
        let a = NodeHandle::new("A", 1);
        let b = NodeHandle::new("A", 2);
        assert_eq!(a, b);

        a.detach();
        assert_eq!(a, b);
        assert!(!a.is_attached());
        assert!(b.is_attached());
    }

    #[test]
    fn test_hash_lookup_with_detached_probe() {
        let mut set = HashSet::new();
        set.insert(NodeHandle::new("A", 1));

        assert!(set.contains(&NodeHandle::detached("A")));
        assert!(!set.contains(&NodeHandle::detached("B")));
    }

    #[test]
    fn test_attach_restores_payload() {
        let h = NodeHandle::new("A", 1);
        h.detach();
        assert_eq!(h.object(), None);

        h.attach(7);
        assert_eq!(h.object(), Some(7));
    }
}

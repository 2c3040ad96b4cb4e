//! Locating materialized render instances for targeted updates.
//!
//! The renderer registers one [`RenderTree`] entry per row it materializes,
//! retaining the row's identity handle next to an opaque renderer payload.
//! After a domain mutation, [`UpdateLocator`] finds the single instance
//! representing the changed object, so only that instance is marked for
//! refresh, without re-flattening the whole visible set.

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::identity::NodeHandle;
use crate::provider::{Handle, TreeProvider};

/// One materialized render instance.
pub struct RenderNode<P: TreeProvider, H> {
    /// Retained identity of the rendered row.
    pub handle: Handle<P>,
    /// Opaque payload owned by the external renderer.
    pub payload: H,
    /// Arena index of the parent instance, None for root-level instances.
    pub parent: Option<Index>,
    /// Arena indices of child instances.
    pub children: Vec<Index>,
}

/// Arena-backed forest of the currently-materialized render instances.
///
/// Collapsed branches have no entries here: a branch that was never expanded
/// has no materialized descendants to search or to remove.
pub struct RenderTree<P: TreeProvider, H> {
    arena: Arena<RenderNode<P, H>>,
    roots: Vec<Index>,
}

impl<P: TreeProvider, H> Default for RenderTree<P, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: TreeProvider, H> RenderTree<P, H> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    /// Register a materialized instance under the given parent.
    #[instrument(level = "trace", skip(self, handle, payload))]
    pub fn insert(&mut self, handle: Handle<P>, payload: H, parent: Option<Index>) -> Index {
        let idx = self.arena.insert(RenderNode {
            handle,
            payload,
            parent,
            children: Vec::new(),
        });

        match parent {
            Some(parent_idx) => {
                if let Some(parent_node) = self.arena.get_mut(parent_idx) {
                    parent_node.children.push(idx);
                }
            }
            None => self.roots.push(idx),
        }

        idx
    }

    pub fn get(&self, idx: Index) -> Option<&RenderNode<P, H>> {
        self.arena.get(idx)
    }

    pub fn payload(&self, idx: Index) -> Option<&H> {
        self.arena.get(idx).map(|node| &node.payload)
    }

    pub fn roots(&self) -> &[Index] {
        self.roots.as_slice()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Drop an instance and all its materialized descendants, e.g. when the
    /// renderer collapses a branch.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_subtree(&mut self, idx: Index) {
        // Unlink from the parent (or root list) first.
        if let Some(node) = self.arena.get(idx) {
            match node.parent {
                Some(parent_idx) => {
                    if let Some(parent) = self.arena.get_mut(parent_idx) {
                        parent.children.retain(|&child| child != idx);
                    }
                }
                None => self.roots.retain(|&root| root != idx),
            }
        }

        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                stack.extend(node.children);
            }
        }
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.roots.clear();
    }

    /// Pre-order iteration over all materialized instances.
    pub fn iter(&self) -> RenderIter<'_, P, H> {
        let stack: Vec<Index> = self.roots.iter().rev().copied().collect();
        RenderIter { tree: self, stack }
    }
}

pub struct RenderIter<'a, P: TreeProvider, H> {
    tree: &'a RenderTree<P, H>,
    stack: Vec<Index>,
}

impl<'a, P: TreeProvider, H> Iterator for RenderIter<'a, P, H> {
    type Item = (Index, &'a RenderNode<P, H>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.stack.pop() {
            if let Some(node) = self.tree.arena.get(idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((idx, node));
            }
        }
        None
    }
}

/// Finds the render instance currently representing a given domain object.
pub struct UpdateLocator<'a, P: TreeProvider> {
    provider: &'a P,
}

impl<'a, P: TreeProvider> UpdateLocator<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Bounded walk over the materialized instances, comparing retained
    /// identities against `provider.key(node)`. The first match wins and
    /// short-circuits the walk; under the identity invariant at most one
    /// instance can match, duplicates are a provider contract violation.
    #[instrument(level = "debug", skip_all)]
    pub fn locate<H>(&self, tree: &RenderTree<P, H>, node: &P::Node) -> Option<Index> {
        let target: Handle<P> = NodeHandle::detached(self.provider.key(node));

        for (idx, instance) in tree.iter() {
            if instance.handle == target {
                debug!(key = ?target.key(), "render instance located");
                return Some(idx);
            }
        }

        debug!(key = ?target.key(), "no materialized instance");
        None
    }
}

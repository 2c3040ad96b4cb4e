//! Expand/collapse state: explicit subsets and their logical complement.
//!
//! An expansion state is logically a set of node identities. The explicit
//! variant ([`ProviderSubset`]) stores identity handles; the inverse variant
//! ([`InverseSet`]) realizes "everything expanded except these" without ever
//! enumerating the (possibly huge) full node set.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};
use crate::identity::NodeHandle;
use crate::provider::{Handle, TreeProvider};

/// Set of currently-expanded nodes, keyed by provider identity.
///
/// Mutations are idempotent set operations and cost O(expected) independent of
/// tree size. [`detach`](ExpansionState::detach) must be called once a pass has
/// fully drained, to release cached domain-object payloads.
pub trait ExpansionState<P: TreeProvider> {
    fn contains(&self, node: &P::Node) -> bool;

    /// Add a node; returns false if it was already a member.
    fn add(&mut self, node: &P::Node) -> bool;

    /// Remove a node; returns false if it was not a member.
    fn remove(&mut self, node: &P::Node) -> bool;

    /// Remove all members.
    ///
    /// Fails with [`TreeError::UnsupportedMutation`] where membership cannot
    /// be enumerated (see [`InverseSet`]).
    fn clear(&mut self) -> TreeResult<()>;

    /// Release cached payloads of all members. Membership is unaffected.
    fn detach(&mut self);
}

/// Explicit subset of a provider's tree, with automatic detachment.
///
/// Membership checks resolve through the provider's key, so a raw domain
/// object and an identity handle for the same logical node behave identically.
pub struct ProviderSubset<P: TreeProvider> {
    provider: P,
    members: HashSet<Handle<P>>,
}

impl<P: TreeProvider> ProviderSubset<P> {
    /// Empty subset.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            members: HashSet::new(),
        }
    }

    /// Subset seeded with all roots of the provider.
    pub fn with_roots(provider: P) -> Self {
        let mut subset = Self::new(provider);
        let roots: Vec<P::Node> = subset.provider.roots().collect();
        for root in &roots {
            subset.add(root);
        }
        subset
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains_handle(&self, handle: &Handle<P>) -> bool {
        self.members.contains(handle)
    }

    pub fn add_handle(&mut self, handle: Handle<P>) -> bool {
        self.members.insert(handle)
    }

    pub fn remove_handle(&mut self, handle: &Handle<P>) -> bool {
        self.members.remove(handle)
    }

    /// Identity handles of all members, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Handle<P>> {
        self.members.iter()
    }

    fn probe(&self, node: &P::Node) -> Handle<P> {
        NodeHandle::detached(self.provider.key(node))
    }
}

impl<P: TreeProvider> ExpansionState<P> for ProviderSubset<P> {
    fn contains(&self, node: &P::Node) -> bool {
        self.members.contains(&self.probe(node))
    }

    #[instrument(level = "trace", skip(self, node))]
    fn add(&mut self, node: &P::Node) -> bool {
        let added = self.members.insert(self.provider.handle(node));
        debug!(key = ?self.provider.key(node), added, "expansion add");
        added
    }

    #[instrument(level = "trace", skip(self, node))]
    fn remove(&mut self, node: &P::Node) -> bool {
        let removed = self.members.remove(&self.probe(node));
        debug!(key = ?self.provider.key(node), removed, "expansion remove");
        removed
    }

    fn clear(&mut self) -> TreeResult<()> {
        self.members.clear();
        Ok(())
    }

    fn detach(&mut self) {
        for handle in &self.members {
            handle.detach();
        }
    }
}

/// Logical complement of another expansion state.
///
/// `contains` negates the wrapped set; `add` and `remove` toggle membership in
/// the wrapped set. Wrapping an inverse in another inverse restores the
/// original containment behavior.
pub struct InverseSet<S> {
    wrapped: S,
}

impl<S> InverseSet<S> {
    pub fn new(wrapped: S) -> Self {
        Self { wrapped }
    }

    pub fn inner(&self) -> &S {
        &self.wrapped
    }

    pub fn into_inner(self) -> S {
        self.wrapped
    }
}

impl<P: TreeProvider, S: ExpansionState<P>> ExpansionState<P> for InverseSet<S> {
    fn contains(&self, node: &P::Node) -> bool {
        !self.wrapped.contains(node)
    }

    fn add(&mut self, node: &P::Node) -> bool {
        self.wrapped.remove(node)
    }

    fn remove(&mut self, node: &P::Node) -> bool {
        self.wrapped.add(node)
    }

    fn clear(&mut self) -> TreeResult<()> {
        Err(TreeError::UnsupportedMutation(
            "cannot enumerate the complement of an inverse set",
        ))
    }

    fn detach(&mut self) {
        self.wrapped.detach()
    }
}

//! The consumed data-source contract.
//!
//! A [`TreeProvider`] exposes a possibly-infinite hierarchy without the core
//! ever materializing it: roots, children and a cheap child-existence test are
//! queried on demand, and every domain object maps to a stable external key.
//! No parent/child object graph is retained by this crate.

use std::fmt;
use std::hash::Hash;

use crate::errors::TreeResult;
use crate::identity::NodeHandle;

/// One batch of sibling nodes. Lazy, finite per call, consumed at most once.
pub type Children<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Identity handle type of a provider.
pub type Handle<P> = NodeHandle<<P as TreeProvider>::Key, <P as TreeProvider>::Node>;

/// External source of hierarchical domain data.
///
/// Implementations are long-lived and externally owned. Thread-safety is the
/// implementor's concern; the traversal core itself is single-threaded and
/// pass-oriented.
pub trait TreeProvider {
    /// Opaque domain object. May be a cheap shared reference (`Rc`) to a
    /// heavyweight object, or a value reloaded per request.
    type Node: Clone;

    /// Stable external key. Two calls of [`key`](TreeProvider::key) for the
    /// same logical node must return equal keys, even if the node instances
    /// were loaded independently.
    type Key: Clone + Eq + Hash + fmt::Debug;

    /// Root nodes in stable order. Finite.
    fn roots(&self) -> Children<'_, Self::Node>;

    /// Cheap child-existence test; must not fetch the children.
    fn has_children(&self, node: &Self::Node) -> bool;

    /// The node's children. The returned iterator is single-use and must be
    /// consumed within the traversal step that requested it.
    ///
    /// May fail with [`TreeError::ProviderUnavailable`] to model timeouts on
    /// expensive subtrees; callers treat the node as childless for the
    /// current pass and re-poll later.
    ///
    /// [`TreeError::ProviderUnavailable`]: crate::errors::TreeError::ProviderUnavailable
    fn children(&self, node: &Self::Node) -> TreeResult<Children<'_, Self::Node>>;

    /// Stable identity key of a node.
    fn key(&self, node: &Self::Node) -> Self::Key;

    /// Identity handle for a node, payload attached.
    fn handle(&self, node: &Self::Node) -> Handle<Self>
    where
        Self: Sized,
    {
        NodeHandle::new(self.key(node), node.clone())
    }

    /// Drop any provider-level caches. Default: nothing cached.
    fn release(&self) {}
}

// A shared provider is still a provider. Lets consumers hold `Rc<P>` while
// passing `&P` into the traversal seams.
impl<P: TreeProvider> TreeProvider for std::rc::Rc<P> {
    type Node = P::Node;
    type Key = P::Key;

    fn roots(&self) -> Children<'_, Self::Node> {
        (**self).roots()
    }

    fn has_children(&self, node: &Self::Node) -> bool {
        (**self).has_children(node)
    }

    fn children(&self, node: &Self::Node) -> TreeResult<Children<'_, Self::Node>> {
        (**self).children(node)
    }

    fn key(&self, node: &Self::Node) -> Self::Key {
        (**self).key(node)
    }

    fn release(&self) {
        (**self).release()
    }
}

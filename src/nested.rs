//! Materialized in-memory adapter for the provider contract.
//!
//! Useful when the hierarchy is already loaded: fixtures, small reference
//! trees, or a cached snapshot of a remote source. Nodes are shared via `Rc`,
//! so handing copies to the traversal is cheap and no parent back-references
//! are needed.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use itertools::Itertools;
use tracing::instrument;

use crate::errors::{TreeError, TreeResult};
use crate::provider::{Children, TreeProvider};

/// One materialized node: a value plus its children.
#[derive(Debug)]
pub struct NestedNode<T> {
    value: T,
    children: Vec<Rc<NestedNode<T>>>,
}

impl<T> NestedNode<T> {
    pub fn leaf(value: T) -> Rc<Self> {
        Rc::new(Self {
            value,
            children: Vec::new(),
        })
    }

    pub fn branch(value: T, children: Vec<Rc<NestedNode<T>>>) -> Rc<Self> {
        Rc::new(Self { value, children })
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn children(&self) -> &[Rc<NestedNode<T>>] {
        self.children.as_slice()
    }
}

/// Adapter exposing a forest of [`NestedNode`]s as a [`TreeProvider`].
///
/// The key extractor must yield a unique key per node; duplicates are a
/// contract violation and are rejected at construction time.
pub struct NestedProvider<T, K, F>
where
    F: Fn(&T) -> K,
{
    roots: Vec<Rc<NestedNode<T>>>,
    key_fn: F,
}

impl<T, K, F> NestedProvider<T, K, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: Fn(&T) -> K,
{
    #[instrument(level = "debug", skip_all)]
    pub fn new(roots: Vec<Rc<NestedNode<T>>>, key_fn: F) -> TreeResult<Self> {
        if roots.is_empty() {
            return Err(TreeError::InvalidArgument(
                "at least one root is required".to_string(),
            ));
        }

        // Reject duplicate keys up front: the flattener and locator rely on
        // one key naming exactly one logical node.
        let mut keys = Vec::new();
        let mut stack: Vec<&Rc<NestedNode<T>>> = roots.iter().collect();
        while let Some(node) = stack.pop() {
            keys.push(key_fn(&node.value));
            stack.extend(node.children.iter());
        }

        let duplicates: Vec<K> = keys.iter().duplicates().cloned().collect();
        if !duplicates.is_empty() {
            return Err(TreeError::InvalidArgument(format!(
                "duplicate node keys: {:?}",
                duplicates
            )));
        }

        Ok(Self { roots, key_fn })
    }
}

impl<T, K, F> TreeProvider for NestedProvider<T, K, F>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: Fn(&T) -> K,
{
    type Node = Rc<NestedNode<T>>;
    type Key = K;

    fn roots(&self) -> Children<'_, Self::Node> {
        Box::new(self.roots.iter().cloned())
    }

    fn has_children(&self, node: &Self::Node) -> bool {
        !node.children.is_empty()
    }

    fn children(&self, node: &Self::Node) -> TreeResult<Children<'_, Self::Node>> {
        // Rc clones only; detaches the iterator from the borrowed argument.
        let children: Vec<Self::Node> = node.children.to_vec();
        Ok(Box::new(children.into_iter()))
    }

    fn key(&self, node: &Self::Node) -> Self::Key {
        (self.key_fn)(&node.value)
    }
}

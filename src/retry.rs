//! Recovery wrapper for providers with expensive, timeout-prone subtrees.
//!
//! [`RetryProvider`] decorates any [`TreeProvider`]. When the inner provider
//! fails a `children` call with `ProviderUnavailable`, the node is recorded as
//! timed out and served as childless for the current pass, so the traversal
//! never aborts. The host re-polls the node after [`RetryPolicy::delay`]
//! (client-driven, no internal timers): call [`retry`](RetryProvider::retry)
//! to clear the mark, then refresh the branch via the update locator.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::errors::{TreeError, TreeResult};
use crate::provider::{Children, TreeProvider};
use crate::state::{ExpansionState, ProviderSubset};

/// Re-poll policy for timed-out nodes.
///
/// The default mirrors the original behavior: a fixed delay, no backoff, and
/// no give-up: repeated timeouts simply re-poll again. Hosts that want to
/// stop retrying set `max_attempts`; once a node exceeds it,
/// [`RetryProvider::retry_hint`] stops advertising a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration, max_attempts: Option<u32>) -> TreeResult<Self> {
        if max_attempts == Some(0) {
            return Err(TreeError::InvalidArgument(
                "max_attempts must be at least 1 when set".to_string(),
            ));
        }
        Ok(Self {
            delay,
            max_attempts,
        })
    }
}

/// Decorator absorbing per-node `ProviderUnavailable` conditions.
pub struct RetryProvider<P: TreeProvider + Clone> {
    inner: P,
    policy: RetryPolicy,
    /// Nodes whose last children access timed out.
    timed_out: RefCell<ProviderSubset<P>>,
    /// Consecutive failed attempts per node, kept across retries until one
    /// succeeds.
    attempts: RefCell<HashMap<P::Key, u32>>,
    /// Last provider-suggested re-poll delay per node, preferred over the
    /// policy delay.
    suggested: RefCell<HashMap<P::Key, Duration>>,
}

impl<P: TreeProvider + Clone> RetryProvider<P> {
    /// Wrap the given provider. `P` is typically an `Rc<...>`, shared between
    /// the wrapper and its timed-out bookkeeping subset.
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        let timed_out = RefCell::new(ProviderSubset::new(inner.clone()));
        Self {
            inner,
            policy,
            timed_out,
            attempts: RefCell::new(HashMap::new()),
            suggested: RefCell::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Has the last children access for this node timed out?
    pub fn has_timed_out(&self, node: &P::Node) -> bool {
        self.timed_out.borrow().contains(node)
    }

    /// Consecutive failed attempts recorded for this node.
    pub fn attempts(&self, node: &P::Node) -> u32 {
        self.attempts
            .borrow()
            .get(&self.inner.key(node))
            .copied()
            .unwrap_or(0)
    }

    /// Delay after which the host should re-poll this node, or None if the
    /// node is not timed out or the policy has given up on it. A delay the
    /// provider suggested in its last failure wins over the policy delay.
    pub fn retry_hint(&self, node: &P::Node) -> Option<Duration> {
        if !self.has_timed_out(node) {
            return None;
        }
        if let Some(max) = self.policy.max_attempts {
            if self.attempts(node) >= max {
                return None;
            }
        }
        let suggested = self.suggested.borrow().get(&self.inner.key(node)).copied();
        Some(suggested.unwrap_or(self.policy.delay))
    }

    /// Clear the timed-out mark before re-polling. Returns whether the node
    /// was marked; the expansion bit of the node is never touched here.
    #[instrument(level = "debug", skip_all)]
    pub fn retry(&self, node: &P::Node) -> bool {
        let cleared = self.timed_out.borrow_mut().remove(node);
        debug!(key = ?self.inner.key(node), cleared, "retry requested");
        cleared
    }
}

impl<P: TreeProvider + Clone> TreeProvider for RetryProvider<P> {
    type Node = P::Node;
    type Key = P::Key;

    fn roots(&self) -> Children<'_, Self::Node> {
        self.inner.roots()
    }

    fn has_children(&self, node: &Self::Node) -> bool {
        self.inner.has_children(node)
    }

    /// Delegates to the wrapped provider, absorbing `ProviderUnavailable`.
    fn children(&self, node: &Self::Node) -> TreeResult<Children<'_, Self::Node>> {
        match self.inner.children(node) {
            Ok(children) => {
                let key = self.inner.key(node);
                self.timed_out.borrow_mut().remove(node);
                self.attempts.borrow_mut().remove(&key);
                self.suggested.borrow_mut().remove(&key);
                Ok(children)
            }
            Err(TreeError::ProviderUnavailable { retry_after }) => {
                let key = self.inner.key(node);
                let mut attempts = self.attempts.borrow_mut();
                let seen = attempts.entry(key.clone()).or_insert(0);
                *seen += 1;
                warn!(?key, attempts = *seen, ?retry_after, "children timed out");

                match retry_after {
                    Some(delay) => {
                        self.suggested.borrow_mut().insert(key, delay);
                    }
                    None => {
                        self.suggested.borrow_mut().remove(&key);
                    }
                }

                self.timed_out.borrow_mut().add(node);
                Ok(Box::new(std::iter::empty()))
            }
            Err(other) => Err(other),
        }
    }

    fn key(&self, node: &Self::Node) -> Self::Key {
        self.inner.key(node)
    }

    fn release(&self) {
        self.inner.release();
        self.timed_out.borrow_mut().detach();
        self.attempts.borrow_mut().clear();
        self.suggested.borrow_mut().clear();
    }
}

//! Lazy depth-first projection of a tree into a row sequence.
//!
//! A [`Flattener`] pairs a [`TreeProvider`] with an expansion-filter predicate
//! and projects the visible part of the tree into pre-order [`Row`]s. Nothing
//! is materialized: each pass keeps only a stack of live sibling iterators,
//! one frame per expanded ancestor level.
//!
//! A [`Pass`] is single-use. Children iterators are consumed exactly once, so
//! a new page render must begin a new pass; the pass rebuilds its stack from
//! `roots()`.

use std::cell::Cell;
use std::iter::Peekable;

use tracing::{debug, instrument, warn};

use crate::errors::{TreeError, TreeResult};
use crate::provider::{Children, Handle, TreeProvider};
use crate::state::ExpansionState;

/// One visible node paired with its branch context.
///
/// `branches()[i]` reports whether the frame at level `i + 1` (levels below
/// the root level) still had a pending sibling when this row was produced; the
/// last element is the row's own level, i.e. whether the row itself is
/// followed by a sibling. Root-level rows carry no flags; roots are drawn
/// flush-left, without a connector column.
///
/// Flags are computed once, at yield time, and never recomputed.
pub struct Row<P: TreeProvider> {
    handle: Handle<P>,
    branches: Vec<bool>,
}

// Manual impls: `P` itself needs neither `Clone` nor `Debug`.
impl<P: TreeProvider> Clone for Row<P> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            branches: self.branches.clone(),
        }
    }
}

impl<P: TreeProvider> std::fmt::Debug for Row<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Row")
            .field("key", self.handle.key())
            .field("branches", &self.branches)
            .finish()
    }
}

impl<P: TreeProvider> Row<P> {
    /// Identity handle of the node, payload attached.
    pub fn handle(&self) -> &Handle<P> {
        &self.handle
    }

    pub fn into_handle(self) -> Handle<P> {
        self.handle
    }

    pub fn key(&self) -> &P::Key {
        self.handle.key()
    }

    /// The domain object, if the handle is still attached.
    pub fn node(&self) -> Option<P::Node> {
        self.handle.object()
    }

    /// Branch-continuation flags, see the type docs for layout.
    pub fn branches(&self) -> &[bool] {
        self.branches.as_slice()
    }

    /// Depth below the root level; root-level rows are at depth 0.
    pub fn depth(&self) -> usize {
        self.branches.len()
    }
}

/// Projects `(provider, expansion filter)` into pageable row sequences.
pub struct Flattener<'t, P: TreeProvider> {
    provider: &'t P,
    filter: Box<dyn Fn(&P::Node) -> bool + 't>,
    cached_size: Cell<Option<usize>>,
}

impl<'t, P: TreeProvider> Flattener<'t, P> {
    /// Flattener with an arbitrary expansion-filter predicate. The predicate
    /// decides whether a yielded node's children are traversed.
    pub fn new<F>(provider: &'t P, filter: F) -> Self
    where
        F: Fn(&P::Node) -> bool + 't,
    {
        Self {
            provider,
            filter: Box::new(filter),
            cached_size: Cell::new(None),
        }
    }

    /// The standard tree-view rule: a node's children are traversed iff the
    /// node is a member of the expansion state.
    pub fn with_state<S>(provider: &'t P, state: &'t S) -> Self
    where
        S: ExpansionState<P>,
    {
        Self::new(provider, move |node| state.contains(node))
    }

    /// Begin a fresh traversal pass in `Idle` state.
    pub fn begin_pass(&self) -> Pass<'_, P> {
        Pass {
            provider: self.provider,
            filter: &*self.filter,
            frames: Vec::new(),
            state: PassState::Idle,
        }
    }

    /// Total number of visible rows.
    ///
    /// Trees have no random access by row index, so this drains one full pass
    /// and counts, an O(n) cost callers needing totals for paging controls
    /// must accept. The result is cached until [`detach`](Flattener::detach).
    #[instrument(level = "debug", skip(self))]
    pub fn size(&self) -> TreeResult<usize> {
        if let Some(size) = self.cached_size.get() {
            return Ok(size);
        }

        let mut pass = self.begin_pass();
        let mut size = 0;
        while pass.has_next() {
            pass.next_row()?;
            size += 1;
        }

        self.cached_size.set(Some(size));
        Ok(size)
    }

    /// Materialize one page of rows: skip `first`, then take up to `count`.
    ///
    /// Skipping past the end of the sequence yields a short or empty page,
    /// not an error.
    #[instrument(level = "debug", skip(self))]
    pub fn page(&self, first: usize, count: usize) -> TreeResult<Vec<Row<P>>> {
        let mut pass = self.begin_pass();
        pass.skip(first)?;

        let mut rows = Vec::new();
        while rows.len() < count && pass.has_next() {
            rows.push(pass.next_row()?);
        }
        Ok(rows)
    }

    /// Drop the cached size and release provider-level payloads. Call once a
    /// consumer has fully drained a pass.
    pub fn detach(&self) {
        self.cached_size.set(None);
        self.provider.release();
    }
}

/// Per-pass traversal state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassState {
    Idle,
    Traversing,
    Exhausted,
}

/// One sibling iterator plus its position in the ancestor chain (implicit in
/// the stack order). Exhausted non-top frames stay on the stack: they are the
/// ancestors whose levels report "no further siblings".
struct Frame<'a, P: TreeProvider> {
    siblings: Peekable<Children<'a, P::Node>>,
}

impl<'a, P: TreeProvider> Frame<'a, P> {
    fn new(siblings: Children<'a, P::Node>) -> Self {
        Self {
            siblings: siblings.peekable(),
        }
    }

    fn has_next(&mut self) -> bool {
        self.siblings.peek().is_some()
    }
}

/// One lazy traversal from the roots to exhaustion.
///
/// State machine: `Idle → Traversing` on the first [`has_next`](Pass::has_next)
/// or [`next_row`](Pass::next_row) call; `Traversing → Exhausted` once no frame
/// has a pending sibling. Advancing an exhausted pass is a programming error
/// and fails with [`TreeError::IllegalState`].
pub struct Pass<'a, P: TreeProvider> {
    provider: &'a P,
    filter: &'a (dyn Fn(&P::Node) -> bool + 'a),
    frames: Vec<Frame<'a, P>>,
    state: PassState,
}

impl<'a, P: TreeProvider> Pass<'a, P> {
    /// Whether another visible row is pending. Transitions the pass to
    /// `Exhausted` when the answer is final and negative.
    pub fn has_next(&mut self) -> bool {
        match self.state {
            PassState::Idle => {
                self.frames.push(Frame::new(self.provider.roots()));
                self.state = PassState::Traversing;
            }
            PassState::Traversing => {}
            PassState::Exhausted => return false,
        }

        // Pop frames whose siblings are spent; only the top of the stack can
        // be both exhausted and popped, deeper levels are gone already.
        while let Some(top) = self.frames.last_mut() {
            if top.has_next() {
                return true;
            }
            self.frames.pop();
        }

        debug!("pass exhausted");
        self.state = PassState::Exhausted;
        false
    }

    /// Produce the next visible row.
    ///
    /// Fails with [`TreeError::IllegalState`] when the pass is exhausted.
    pub fn next_row(&mut self) -> TreeResult<Row<P>> {
        if !self.has_next() {
            return Err(TreeError::IllegalState("cursor is exhausted"));
        }

        let node = match self.frames.last_mut().and_then(|f| f.siblings.next()) {
            Some(node) => node,
            // has_next() guarantees a pending sibling on the top frame.
            None => return Err(TreeError::IllegalState("no pending sibling")),
        };

        // Branch flags, frozen at yield time: one per level below the root
        // level, the yielding frame's own level last.
        let branches: Vec<bool> = self
            .frames
            .iter_mut()
            .skip(1)
            .map(|frame| frame.has_next())
            .collect();

        if (self.filter)(&node) {
            match self.provider.children(&node) {
                Ok(children) => self.frames.push(Frame::new(children)),
                Err(TreeError::ProviderUnavailable { retry_after }) => {
                    // Recoverable, absorbed at the node boundary: the node is
                    // childless for this pass and re-polled by the caller.
                    warn!(key = ?self.provider.key(&node), ?retry_after,
                        "children unavailable, treating node as childless");
                }
                Err(other) => return Err(other),
            }
        }

        Ok(Row {
            handle: self.provider.handle(&node),
            branches,
        })
    }

    /// Advance past up to `n` rows, discarding them. Stops silently at the end
    /// of the sequence; there is no random access by row index.
    #[instrument(level = "trace", skip(self))]
    pub fn skip(&mut self, n: usize) -> TreeResult<()> {
        for _ in 0..n {
            if !self.has_next() {
                break;
            }
            self.next_row()?;
        }
        Ok(())
    }
}

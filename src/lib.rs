//! Lazy flattening of hierarchical data sources.
//!
//! The crate exposes a possibly-infinite, possibly-non-serializable hierarchy,
//! supplied through the [`TreeProvider`] contract, as an expand/collapse
//! state machine plus a linear, paginated sequence of visible rows. Each row
//! carries the identity of its node and the branch-continuation flags a
//! renderer needs to draw connector lines.
//!
//! Typical flow:
//!
//! 1. Implement [`TreeProvider`] for the domain source (or adapt an in-memory
//!    structure with [`nested::NestedProvider`]).
//! 2. Track expansion in a [`state::ProviderSubset`], or wrap it in a
//!    [`state::InverseSet`] for "expand all, collapse a few".
//! 3. Per render pass, build a [`flatten::Flattener`] and drain one
//!    [`flatten::Pass`]; detach state afterwards.
//! 4. Register materialized rows in a [`locate::RenderTree`] so that
//!    [`locate::UpdateLocator`] can target single-node refreshes.
//! 5. Providers with timeout-prone subtrees go behind a
//!    [`retry::RetryProvider`].
//!
//! The core is single-threaded and pass-oriented; traversal state never
//! crosses pass boundaries.

pub mod errors;
pub mod flatten;
pub mod identity;
pub mod locate;
pub mod nested;
pub mod provider;
pub mod render;
pub mod retry;
pub mod state;
pub mod util;

pub use errors::{TreeError, TreeResult};
pub use flatten::{Flattener, Pass, Row};
pub use identity::NodeHandle;
pub use locate::{RenderTree, UpdateLocator};
pub use provider::{Children, Handle, TreeProvider};
pub use retry::{RetryPolicy, RetryProvider};
pub use state::{ExpansionState, InverseSet, ProviderSubset};

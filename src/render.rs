//! Display helpers: render-strategy selection and connector-line output.
//!
//! Markup rendering is out of scope; what belongs here is the small closed
//! set of node styles a renderer switches on, plus textual rendering of a row
//! stream: connector prefixes built from each row's frozen branch flags, and
//! regrouping into [`termtree::Tree`]s for pretty-printing.

use termtree::Tree;

use crate::flatten::Row;
use crate::provider::TreeProvider;
use crate::state::ExpansionState;

/// Closed set of render strategies, selected by capability check instead of
/// open-ended subclassing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStyle {
    /// Has children and is currently expanded.
    Expanded,
    /// Has children, currently collapsed.
    Collapsed,
    /// No children; expansion state is irrelevant.
    Leaf,
}

/// Pick the render strategy for a node.
pub fn node_style<P, S>(provider: &P, state: &S, node: &P::Node) -> NodeStyle
where
    P: TreeProvider,
    S: ExpansionState<P>,
{
    if !provider.has_children(node) {
        NodeStyle::Leaf
    } else if state.contains(node) {
        NodeStyle::Expanded
    } else {
        NodeStyle::Collapsed
    }
}

/// Connector prefix for one row, derived from its branch flags alone.
///
/// Ancestor levels contribute a continuation column (`│` while the ancestor
/// has further siblings, blank otherwise); the row's own level contributes
/// the junction (`├──` with a following sibling, `└──` for the last sibling).
/// Root-level rows have no flags and an empty prefix.
pub fn connector_prefix(branches: &[bool]) -> String {
    let mut prefix = String::new();

    let Some((own, ancestors)) = branches.split_last() else {
        return prefix;
    };

    for &continues in ancestors {
        prefix.push_str(if continues { "│   " } else { "    " });
    }
    prefix.push_str(if *own { "├── " } else { "└── " });
    prefix
}

/// One text line per visible row.
pub fn render_rows<P, I, L>(rows: I, label: L) -> Vec<String>
where
    P: TreeProvider,
    I: IntoIterator<Item = Row<P>>,
    L: Fn(&Row<P>) -> String,
{
    rows.into_iter()
        .map(|row| format!("{}{}", connector_prefix(row.branches()), label(&row)))
        .collect()
}

/// Regroup a pre-order row stream into `termtree` trees, one per root-level
/// row. Depths must be well-formed (each row at most one level deeper than
/// its predecessor), which the flattener guarantees.
pub fn to_termtree<P, I, L>(rows: I, label: L) -> Vec<Tree<String>>
where
    P: TreeProvider,
    I: IntoIterator<Item = Row<P>>,
    L: Fn(&Row<P>) -> String,
{
    let mut finished: Vec<Tree<String>> = Vec::new();
    // Open subtrees along the current ancestor chain, paired with their depth.
    let mut open: Vec<(usize, Tree<String>)> = Vec::new();

    for row in rows {
        let depth = row.depth();
        close_to_depth(&mut open, &mut finished, depth);
        open.push((depth, Tree::new(label(&row))));
    }
    close_to_depth(&mut open, &mut finished, 0);

    finished
}

/// Pop open subtrees at `depth` or deeper, attaching each to its parent (or
/// to the finished root list).
fn close_to_depth(
    open: &mut Vec<(usize, Tree<String>)>,
    finished: &mut Vec<Tree<String>>,
    depth: usize,
) {
    loop {
        match open.last() {
            Some((open_depth, _)) if *open_depth >= depth => {
                if let Some((_, done)) = open.pop() {
                    match open.last_mut() {
                        Some((_, parent)) => {
                            parent.push(done);
                        }
                        None => finished.push(done),
                    }
                }
            }
            _ => break,
        }
    }
}

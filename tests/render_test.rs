//! Tests for render-strategy selection and connector-line text output.

use std::rc::Rc;

use treeflat::nested::{NestedNode, NestedProvider};
use treeflat::render::{node_style, render_rows, to_termtree, NodeStyle};
use treeflat::{Flattener, InverseSet, NodeHandle, ProviderSubset, Row, TreeProvider};

type FooProvider = NestedProvider<String, String, fn(&String) -> String>;

fn n(key: &str, children: Vec<Rc<NestedNode<String>>>) -> Rc<NestedNode<String>> {
    NestedNode::branch(key.to_string(), children)
}

/// A{AA{AAA,AAB}, AB}, B{BA, BB}
fn foo_provider() -> Rc<FooProvider> {
    let key_fn: fn(&String) -> String = |v| v.clone();
    let roots = vec![
        n(
            "A",
            vec![
                n("AA", vec![n("AAA", vec![]), n("AAB", vec![])]),
                n("AB", vec![]),
            ],
        ),
        n("B", vec![n("BA", vec![]), n("BB", vec![])]),
    ];
    Rc::new(NestedProvider::new(roots, key_fn).expect("fixture provider"))
}

fn find_node<P>(provider: &P, key: &str) -> P::Node
where
    P: TreeProvider<Key = String>,
{
    let mut stack: Vec<P::Node> = provider.roots().collect();
    while let Some(node) = stack.pop() {
        if provider.key(&node) == key {
            return node;
        }
        stack.extend(provider.children(&node).expect("fixture children"));
    }
    panic!("no node with key {}", key);
}

fn all_rows<P: TreeProvider>(flattener: &Flattener<'_, P>) -> Vec<Row<P>> {
    flattener.page(0, usize::MAX).expect("healthy provider")
}

// ============================================================
// Strategy selection
// ============================================================

#[test]
fn given_expansion_state_when_selecting_styles_then_capability_decides() {
    let provider = foo_provider();
    let mut state = ProviderSubset::new(provider.clone());
    state.add_handle(NodeHandle::detached("A".to_string()));

    let expanded = find_node(&provider, "A");
    let collapsed = find_node(&provider, "B");
    let leaf = find_node(&provider, "AB");

    assert_eq!(node_style(&provider, &state, &expanded), NodeStyle::Expanded);
    assert_eq!(node_style(&provider, &state, &collapsed), NodeStyle::Collapsed);
    assert_eq!(node_style(&provider, &state, &leaf), NodeStyle::Leaf);
}

#[test]
fn given_expanded_leaf_when_selecting_style_then_leaf_wins() {
    let provider = foo_provider();
    let mut state = ProviderSubset::new(provider.clone());
    // Expansion bits on childless nodes are inert.
    state.add_handle(NodeHandle::detached("AB".to_string()));

    let leaf = find_node(&provider, "AB");
    assert_eq!(node_style(&provider, &state, &leaf), NodeStyle::Leaf);
}

// ============================================================
// Text output
// ============================================================

#[test]
fn given_partial_expansion_when_rendering_rows_then_connector_lines_are_exact() {
    let provider = foo_provider();
    let mut state = ProviderSubset::new(provider.clone());
    state.add_handle(NodeHandle::detached("A".to_string()));
    state.add_handle(NodeHandle::detached("AA".to_string()));

    let flattener = Flattener::with_state(&provider, &state);
    let lines = render_rows(all_rows(&flattener), |row| row.key().clone());

    assert_eq!(
        lines,
        vec![
            "A",
            "├── AA",
            "│   ├── AAA",
            "│   └── AAB",
            "└── AB",
            "B",
        ]
    );
}

#[test]
fn given_full_expansion_when_regrouping_then_one_tree_per_root() {
    let provider = foo_provider();
    let all_expanded = InverseSet::new(ProviderSubset::new(provider.clone()));
    let flattener = Flattener::with_state(&provider, &all_expanded);

    let trees = to_termtree(all_rows(&flattener), |row| row.key().clone());
    assert_eq!(trees.len(), 2);

    let rendered: Vec<String> = trees
        .iter()
        .flat_map(|tree| tree.to_string().lines().map(str::to_owned).collect::<Vec<_>>())
        .collect();
    assert_eq!(
        rendered,
        vec![
            "A",
            "├── AA",
            "│   ├── AAA",
            "│   └── AAB",
            "└── AB",
            "B",
            "├── BA",
            "└── BB",
        ]
    );
}

#[test]
fn given_same_rows_when_rendering_both_ways_then_lines_agree() {
    // The flat connector output and the regrouped trees must draw the same
    // picture for any well-formed row stream.
    let provider = foo_provider();
    let mut state = ProviderSubset::new(provider.clone());
    state.add_handle(NodeHandle::detached("A".to_string()));
    state.add_handle(NodeHandle::detached("B".to_string()));

    let flattener = Flattener::with_state(&provider, &state);

    let flat = render_rows(all_rows(&flattener), |row| row.key().clone());
    let grouped: Vec<String> = to_termtree(all_rows(&flattener), |row| row.key().clone())
        .iter()
        .flat_map(|tree| tree.to_string().lines().map(str::to_owned).collect::<Vec<_>>())
        .collect();

    assert_eq!(flat, grouped);
}

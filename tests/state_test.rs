//! Tests for expansion state: explicit subsets, inverse sets, identity
//! resolution and detachment.

use std::rc::Rc;

use treeflat::nested::{NestedNode, NestedProvider};
use treeflat::{ExpansionState, InverseSet, NodeHandle, ProviderSubset, TreeError, TreeProvider};

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

fn all_keys() -> Vec<&'static str> {
    vec!["A", "AA", "AAA", "AAB", "AB", "B", "BA", "BB"]
}

// ============================================================
// Explicit subset
// ============================================================

#[test]
fn given_subset_when_adding_twice_then_add_is_idempotent() {
    let provider = foo_provider();
    let mut subset = ProviderSubset::new(provider.clone());
    let node = find_node(&provider, "AA");

    assert!(subset.add(&node));
    assert!(!subset.add(&node));

    assert!(subset.contains(&node));
    assert_eq!(subset.len(), 1);
}

#[test]
fn given_subset_when_removing_twice_then_remove_is_idempotent() {
    let provider = foo_provider();
    let mut subset = ProviderSubset::new(provider.clone());
    let node = find_node(&provider, "AA");
    subset.add(&node);

    assert!(subset.remove(&node));
    assert!(!subset.remove(&node));

    assert!(!subset.contains(&node));
    assert!(subset.is_empty());
}

#[test]
fn given_raw_node_and_identity_handle_when_querying_then_both_behave_identically() {
    let provider = foo_provider();
    let mut subset = ProviderSubset::new(provider.clone());
    let node = find_node(&provider, "AB");

    subset.add(&node);

    assert!(subset.contains(&node));
    assert!(subset.contains_handle(&NodeHandle::detached("AB".to_string())));

    // Removing through the handle is visible to node-based queries too.
    assert!(subset.remove_handle(&NodeHandle::detached("AB".to_string())));
    assert!(!subset.contains(&node));
}

#[test]
fn given_with_roots_constructor_when_built_then_contains_exactly_the_roots() {
    let provider = foo_provider();
    let subset = ProviderSubset::with_roots(provider.clone());

    assert_eq!(subset.len(), 2);
    assert!(subset.contains(&find_node(&provider, "A")));
    assert!(subset.contains(&find_node(&provider, "B")));
    assert!(!subset.contains(&find_node(&provider, "AA")));
}

#[test]
fn given_subset_when_clearing_then_it_is_empty() {
    let provider = foo_provider();
    let mut subset = ProviderSubset::with_roots(provider.clone());

    subset.clear().expect("explicit sets can be cleared");
    assert!(subset.is_empty());
}

#[test]
fn given_subset_when_detaching_then_payloads_drop_but_membership_survives() {
    let provider = foo_provider();
    let mut subset = ProviderSubset::new(provider.clone());
    let node = find_node(&provider, "AA");
    subset.add(&node);

    assert!(subset.iter().all(|handle| handle.is_attached()));

    subset.detach();

    assert!(subset.iter().all(|handle| !handle.is_attached()));
    assert_eq!(subset.len(), 1);
    assert!(subset.contains(&node));
}

// ============================================================
// Identity stability across reloads
// ============================================================

#[test]
fn given_reloaded_node_instance_when_comparing_identities_then_they_are_equal() {
    // Two independently-built providers stand in for a reload from scratch.
    let first = foo_provider();
    let second = foo_provider();

    let original = first.handle(&find_node(&first, "AA"));
    let reloaded = second.handle(&find_node(&second, "AA"));

    assert_eq!(original, reloaded);
    assert_ne!(original, second.handle(&find_node(&second, "AB")));
}

#[test]
fn given_membership_from_one_load_when_queried_with_a_reload_then_it_still_matches() {
    let first = foo_provider();
    let second = foo_provider();

    let mut subset = ProviderSubset::new(first.clone());
    subset.add(&find_node(&first, "BA"));

    // A node instance from an independent load resolves to the same identity.
    assert!(subset.contains(&find_node(&second, "BA")));
}

// ============================================================
// Inverse set
// ============================================================

#[test]
fn given_inverse_set_when_querying_then_containment_is_negated_for_the_universe() {
    let provider = foo_provider();
    let mut explicit = ProviderSubset::new(provider.clone());
    explicit.add(&find_node(&provider, "A"));
    explicit.add(&find_node(&provider, "BA"));

    let member_snapshot: Vec<bool> = all_keys()
        .iter()
        .map(|key| explicit.contains(&find_node(&provider, key)))
        .collect();

    let inverse = InverseSet::new(explicit);
    for (key, was_member) in all_keys().iter().zip(member_snapshot) {
        let node = find_node(&provider, key);
        assert_eq!(
            inverse.contains(&node),
            !was_member,
            "containment must be negated for {}",
            key
        );
    }
}

#[test]
fn given_inverse_set_when_mutating_then_operations_route_through_the_wrapped_set() {
    // Mirrors the original inverse-set behavior: start with {A} explicit.
    let provider = foo_provider();
    let a = find_node(&provider, "A");
    let b = find_node(&provider, "B");

    let mut explicit = ProviderSubset::new(provider.clone());
    explicit.add(&a);

    let mut inverse = InverseSet::new(explicit);
    assert!(!inverse.contains(&a));
    assert!(inverse.contains(&b));

    inverse.remove(&b);
    assert!(!inverse.contains(&a));
    assert!(!inverse.contains(&b));

    inverse.add(&a);
    assert!(inverse.contains(&a));
    assert!(!inverse.contains(&b));

    // add through the inverse means the wrapped set lost the entry
    assert!(!inverse.inner().contains(&a));
    assert!(inverse.inner().contains(&b));
}

#[test]
fn given_double_inverse_when_querying_then_behaves_like_the_original_set() {
    let provider = foo_provider();
    let mut explicit = ProviderSubset::new(provider.clone());
    explicit.add(&find_node(&provider, "AA"));

    let member_snapshot: Vec<bool> = all_keys()
        .iter()
        .map(|key| explicit.contains(&find_node(&provider, key)))
        .collect();

    let double = InverseSet::new(InverseSet::new(explicit));
    for (key, was_member) in all_keys().iter().zip(member_snapshot) {
        assert_eq!(
            double.contains(&find_node(&provider, key)),
            was_member,
            "double inverse must restore containment for {}",
            key
        );
    }
}

#[test]
fn given_inverse_set_when_clearing_then_fails_with_unsupported_mutation() {
    let provider = foo_provider();
    let mut inverse = InverseSet::new(ProviderSubset::new(provider));

    let result = inverse.clear();
    assert!(matches!(result, Err(TreeError::UnsupportedMutation(_))));
}

#[test]
fn given_inverse_set_when_detaching_then_delegates_to_the_wrapped_set() {
    let provider = foo_provider();
    let mut explicit = ProviderSubset::new(provider.clone());
    explicit.add(&find_node(&provider, "AA"));

    let mut inverse = InverseSet::new(explicit);
    inverse.detach();

    assert!(inverse.inner().iter().all(|handle| !handle.is_attached()));
}

//! Integration tests for dependency tree construction.
//!
//! Tree shapes are compared in a compact notation: `A(B(C),D)` is root A with
//! children B and D, B having child C.

use rstest::rstest;

use ruledoc::domain::{
    DependencyTreeBuilder, Direction, PredicateIndexBuilder, RelationMap, Rule, RuleId, RuleSet,
    TreeNode,
};
use ruledoc::util::testing;

fn relations(entries: &[(&str, &[&str])]) -> RelationMap {
    entries
        .iter()
        .map(|(rule, related)| {
            (
                RuleId::from(*rule),
                related.iter().map(|r| RuleId::from(*r)).collect(),
            )
        })
        .collect()
}

fn shape(node: &TreeNode<RuleId>) -> String {
    if node.is_leaf() {
        return node.data().to_string();
    }
    let children: Vec<String> = node.children().iter().map(shape).collect();
    format!("{}({})", node.data(), children.join(","))
}

fn tree_shape(map: &RelationMap, root: &str) -> String {
    shape(&DependencyTreeBuilder::new(map).build_tree(&RuleId::from(root)))
}

fn rule(id: &str, requires: &[&str], ensures: &[&str]) -> Rule {
    Rule::new(id)
        .with_requires(requires.iter().copied())
        .with_ensures(ensures.iter().copied())
}

fn requires_forest_shapes(rules: Vec<Rule>) -> Vec<(String, String)> {
    let rules = RuleSet::from_rules(rules).unwrap();
    let map = PredicateIndexBuilder::relation_map(&rules, Direction::RequiresToEnsures);
    DependencyTreeBuilder::new(&map)
        .build_forest()
        .iter()
        .map(|(id, tree)| (id.to_string(), shape(tree)))
        .collect()
}

// ============================================================
// Rule-level scenarios
// ============================================================

#[test]
fn given_one_producer_when_building_forest_then_consumer_tree_has_producer() {
    testing::init_test_setup();
    let shapes = requires_forest_shapes(vec![rule("A", &["x"], &[]), rule("B", &[], &["x"])]);

    assert_eq!(
        shapes,
        vec![("A".into(), "A(B)".into()), ("B".into(), "B".into())]
    );
}

#[test]
fn given_mutual_requirements_when_building_forest_then_root_is_not_repeated() {
    let shapes = requires_forest_shapes(vec![
        rule("A", &["x"], &["y"]),
        rule("B", &["y"], &["x"]),
    ]);

    assert_eq!(
        shapes,
        vec![("A".into(), "A(B)".into()), ("B".into(), "B(A)".into())]
    );
}

#[test]
fn given_two_producers_when_building_tree_then_leaf_children_in_order() {
    let shapes = requires_forest_shapes(vec![
        rule("A", &["x", "z"], &[]),
        rule("B", &[], &["x"]),
        rule("C", &[], &["z"]),
    ]);

    assert_eq!(shapes[0], ("A".into(), "A(B,C)".into()));
}

#[test]
fn given_producer_of_several_predicates_when_building_tree_then_single_child() {
    let shapes = requires_forest_shapes(vec![rule("A", &["x", "z"], &[]), rule("B", &[], &["x", "z"])]);

    assert_eq!(shapes[0], ("A".into(), "A(B)".into()));
}

#[test]
fn given_self_producing_rule_when_building_tree_then_single_self_child_leaf() {
    let shapes = requires_forest_shapes(vec![rule("A", &["p"], &["p"])]);

    assert_eq!(shapes, vec![("A".into(), "A(A)".into())]);
}

// ============================================================
// Relation-map level shapes
// ============================================================

#[rstest]
#[case::no_relations(&[("A", &[] as &[&str])], "A", "A")]
#[case::chain(&[("A", &["B"] as &[&str]), ("B", &["C"] as &[&str]), ("C", &[] as &[&str])], "A", "A(B(C))")]
#[case::back_edge_to_root(&[("A", &["B"] as &[&str]), ("B", &["A", "C"] as &[&str]), ("C", &["A"] as &[&str])], "A", "A(B(C))")]
#[case::diamond(&[("A", &["B", "C"] as &[&str]), ("B", &["D"] as &[&str]), ("C", &["D"] as &[&str]), ("D", &[] as &[&str])], "A", "A(B(D),C(D))")]
#[case::unknown_root(&[("A", &["B"] as &[&str])], "Z", "Z")]
fn given_relation_map_when_building_tree_then_has_expected_shape(
    #[case] entries: &[(&str, &[&str])],
    #[case] root: &str,
    #[case] expected: &str,
) {
    assert_eq!(tree_shape(&relations(entries), root), expected);
}

#[test]
fn given_second_route_within_branch_when_building_tree_then_rule_attached_once() {
    let map = relations(&[("A", &["B"]), ("B", &["C", "D"]), ("C", &["D"]), ("D", &[])]);

    // D is reached through C first; the direct B->D route is a sibling repeat
    assert_eq!(tree_shape(&map, "A"), "A(B(C(D)))");
}

#[test]
fn given_empty_relation_map_when_building_forest_then_forest_is_empty() {
    let forest = DependencyTreeBuilder::new(&RelationMap::default()).build_forest();
    assert!(forest.is_empty());
}

#[test]
fn given_empty_rule_set_when_building_forest_then_no_trees() {
    assert!(requires_forest_shapes(vec![]).is_empty());
}

#[test]
fn given_cycle_not_through_root_when_building_tree_then_branch_head_reappears_once() {
    let map = relations(&[("A", &["B"]), ("B", &["C"]), ("C", &["D"]), ("D", &["B"])]);

    assert_eq!(tree_shape(&map, "A"), "A(B(C(D(B))))");
}

#[test]
fn given_two_branches_when_building_tree_then_groups_are_independent() {
    let map = relations(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &["B"])]);

    assert_eq!(tree_shape(&map, "A"), "A(B(C(B)),C(B(C)))");
}

#[test]
fn given_fully_connected_rules_when_building_forest_then_trees_are_finite() {
    let all = ["A", "B", "C", "D"];
    let entries: Vec<(&str, &[&str])> = all.iter().map(|id| (*id, &all[..])).collect();
    let map = relations(&entries);

    let forest = DependencyTreeBuilder::new(&map).build_forest();

    assert_eq!(forest.len(), 4);
    for (root, tree) in &forest {
        // root child (self loop) first, then one branch per other rule
        assert_eq!(tree.children().len(), 4);
        for branch in tree.children() {
            assert!(
                branch.children().iter().flat_map(TreeNode::iter).all(|n| n.data() != root),
                "root {root} repeated below depth 1"
            );
            // every rule but the root at most once below the branch head, plus the head
            assert!(branch.len() <= all.len());
        }
    }
}

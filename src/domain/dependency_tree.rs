//! Dependency trees: per-rule rendering of a relation map's transitive closure.
//!
//! Every rule becomes the root of its own tree. All directly related rules are
//! attached below the root; each of those heads a *branch* that is expanded
//! depth-first, candidates in ascending identifier order. Two guards keep
//! trees finite:
//!
//! - root-repeat: a candidate equal to the root is never attached below a
//!   branch head;
//! - sibling-repeat: a candidate already attached within the current branch is
//!   not attached again.
//!
//! The branch head itself is not part of its branch's sibling group, so it can
//! reappear once deeper in its own branch when a cycle among non-root rules
//! leads back to it. Different branches are independent: the same rule may
//! show up in several of them. No ancestor-path check is performed.

use std::collections::btree_set;
use std::collections::{BTreeMap, BTreeSet};

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::arena::TreeArena;
use crate::domain::entities::RuleId;
use crate::domain::predicate_index::RelationMap;
use crate::domain::tree::TreeNode;

/// One tree per rule identifier.
pub type DependencyForest = BTreeMap<RuleId, TreeNode<RuleId>>;

/// Worklist entry: a node being expanded and the candidates not yet considered.
struct Frame<'a> {
    node: Index,
    pending: btree_set::Iter<'a, RuleId>,
}

/// Builds dependency trees from a relation map.
pub struct DependencyTreeBuilder<'a> {
    relations: &'a RelationMap,
}

impl<'a> DependencyTreeBuilder<'a> {
    pub fn new(relations: &'a RelationMap) -> Self {
        Self { relations }
    }

    /// Build a tree for every rule of the relation map.
    #[instrument(level = "debug", skip(self))]
    pub fn build_forest(&self) -> DependencyForest {
        let forest: DependencyForest = self
            .relations
            .rules()
            .map(|rule| (rule.clone(), self.build_tree(rule)))
            .collect();
        debug!(
            trees = forest.len(),
            nodes = forest.values().map(TreeNode::len).sum::<usize>(),
            "built dependency forest"
        );
        forest
    }

    /// Build the tree rooted at `root`.
    pub fn build_tree(&self, root: &RuleId) -> TreeNode<RuleId> {
        let mut tree = TreeArena::new();
        let root_idx = tree.insert_node(root.clone(), None);

        for head in self.relations.get(root.as_str()) {
            let head_idx = tree.insert_node(head.clone(), Some(root_idx));
            self.expand_branch(&mut tree, head_idx, head, root);
        }

        tree.into_tree()
            .unwrap_or_else(|| TreeNode::new(root.clone()))
    }

    /// Expand the branch headed by `head` with an explicit stack.
    fn expand_branch(&self, tree: &mut TreeArena<RuleId>, head_idx: Index, head: &RuleId, root: &RuleId) {
        let relations: &'a RelationMap = self.relations;
        let mut sibling_group: BTreeSet<&'a RuleId> = BTreeSet::new();
        let mut stack = vec![Frame {
            node: head_idx,
            pending: relations.get(head.as_str()).iter(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(candidate) = frame.pending.next() else {
                stack.pop();
                continue;
            };
            if is_root_repeat(candidate, root) {
                trace!(%root, %candidate, "root repeat suppressed");
                continue;
            }
            if is_sibling_repeat(candidate, &sibling_group) {
                trace!(%root, %head, %candidate, "sibling repeat suppressed");
                continue;
            }

            let parent = frame.node;
            sibling_group.insert(candidate);
            let child = tree.insert_node(candidate.clone(), Some(parent));
            stack.push(Frame {
                node: child,
                pending: relations.get(candidate.as_str()).iter(),
            });
        }
    }
}

fn is_root_repeat(candidate: &RuleId, root: &RuleId) -> bool {
    candidate == root
}

fn is_sibling_repeat(candidate: &RuleId, sibling_group: &BTreeSet<&RuleId>) -> bool {
    sibling_group.contains(candidate)
}

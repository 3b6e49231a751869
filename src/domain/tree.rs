//! Owned, ordered tree node.

use std::fmt;

use termtree::Tree;

/// Tree node with one payload and ordered, owned children.
///
/// There is no parent link. Trees are assembled by the builder arena and
/// read through shared references only once handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<T> {
    data: T,
    children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            children: Vec::new(),
        }
    }

    pub(crate) fn from_parts(data: T, children: Vec<TreeNode<T>>) -> Self {
        Self { data, children }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn children(&self) -> &[TreeNode<T>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of levels; a single node has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeNode::depth)
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes including this one.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Payloads of all leaves, left to right.
    pub fn leaves(&self) -> Vec<&T> {
        self.iter()
            .filter(|node| node.is_leaf())
            .map(TreeNode::data)
            .collect()
    }

    /// Preorder traversal.
    pub fn iter(&self) -> TreeIterator<'_, T> {
        TreeIterator { stack: vec![self] }
    }
}

impl<T: fmt::Display> TreeNode<T> {
    /// Convert to a `termtree` for terminal display.
    pub fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(self.data.to_string()).with_leaves(leaves)
    }
}

pub struct TreeIterator<'a, T> {
    stack: Vec<&'a TreeNode<T>>,
}

impl<'a, T> Iterator for TreeIterator<'a, T> {
    type Item = &'a TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(current.children.iter().rev());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode<&'static str> {
        let a = TreeNode::from_parts("a", vec![TreeNode::new("a1"), TreeNode::new("a2")]);
        TreeNode::from_parts("root", vec![a, TreeNode::new("b")])
    }

    #[test]
    fn given_single_node_when_measuring_then_depth_and_len_are_one() {
        let node = TreeNode::new(1);
        assert_eq!(node.depth(), 1);
        assert_eq!(node.len(), 1);
        assert!(node.is_leaf());
        assert_eq!(node.leaves(), vec![&1]);
    }

    #[test]
    fn given_nested_tree_when_iterating_then_visits_preorder() {
        let tree = sample();
        let order: Vec<_> = tree.iter().map(|n| *n.data()).collect();
        assert_eq!(order, vec!["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn given_nested_tree_when_measuring_then_reports_depth_len_and_leaves() {
        let tree = sample();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.leaves(), vec![&"a1", &"a2", &"b"]);
    }

    #[test]
    fn given_nested_tree_when_rendering_termtree_then_draws_branches() {
        let rendered = sample().to_tree_string().to_string();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "root");
        assert!(lines[1].ends_with("a"));
        assert!(lines[2].ends_with("a1"));
        assert!(lines.last().is_some_and(|l| l.ends_with("b")));
    }
}

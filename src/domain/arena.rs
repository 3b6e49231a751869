use generational_arena::{Arena, Index};
use std::collections::HashMap;
use tracing::instrument;

use crate::domain::tree::TreeNode;

/// Node stored in the arena while a tree is under construction.
#[derive(Debug)]
pub struct ArenaNode<T> {
    /// Payload of this node
    pub data: T,
    /// Indices of child nodes in the arena, in attachment order
    pub children: Vec<Index>,
}

/// Arena-backed tree used as scratch space while building a tree.
///
/// Nodes are addressed by index so a worklist can keep handles to nodes
/// while others are being attached. Once complete, [`TreeArena::into_tree`]
/// freezes the arena into an owned [`TreeNode`].
#[derive(Debug)]
pub struct TreeArena<T> {
    /// Arena storage for all tree nodes
    arena: Arena<ArenaNode<T>>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl<T> Default for TreeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeArena<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert a node below `parent`, or as the root when `parent` is None.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, data: T, parent: Option<Index>) -> Index {
        let node_idx = self.arena.insert(ArenaNode {
            data,
            children: Vec::new(),
        });

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode<T>> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_, T> {
        PostOrderIterator::new(self)
    }

    /// Freeze into an owned tree, children before parents.
    ///
    /// Returns None for an empty arena.
    #[instrument(level = "trace", skip(self))]
    pub fn into_tree(mut self) -> Option<TreeNode<T>> {
        let root = self.root?;
        let order: Vec<Index> = self.iter_postorder().map(|(idx, _)| idx).collect();

        let mut built: HashMap<Index, TreeNode<T>> = HashMap::with_capacity(order.len());
        for idx in order {
            let node = self.arena.remove(idx)?;
            let children = node
                .children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(idx, TreeNode::from_parts(node.data, children));
        }
        built.remove(&root)
    }
}

pub struct PostOrderIterator<'a, T> {
    arena: &'a TreeArena<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIterator<'a, T> {
    fn new(arena: &'a TreeArena<T>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a, T> Iterator for PostOrderIterator<'a, T> {
    type Item = (Index, &'a ArenaNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

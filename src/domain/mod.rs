//! Domain layer: entities and dependency logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod dependency_tree;
pub mod entities;
pub mod error;
pub mod predicate_index;
pub mod summary;
pub mod tree;

pub use arena::TreeArena;
pub use dependency_tree::{DependencyForest, DependencyTreeBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use predicate_index::{PredicateIndexBuilder, PredicateLinks, RelationMap};
pub use summary::parse_rule_summary;
pub use tree::TreeNode;

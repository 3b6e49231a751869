//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the FileSystem boundary trait
//! but are themselves concrete structs, not traits.

mod docgen;
mod rules;

pub use docgen::{DependencyGraphs, DocumentationService, GenerationReport};
pub use rules::RuleService;

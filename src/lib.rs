//! ruledoc: documentation generator for rule sets.
//!
//! Rules state which predicates they require and which they ensure. ruledoc
//! links every rule to the rules satisfying its requirements (and the reverse),
//! expands those relations into finite per-rule dependency trees and renders
//! one HTML page per rule.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

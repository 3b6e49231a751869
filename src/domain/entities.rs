//! Domain entities: core data structures

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Fully-qualified rule identifier, e.g. `javax.crypto.Cipher`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the qualified name: `Cipher` for `javax.crypto.Cipher`.
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Relative path of the API documentation page: `javax/crypto/Cipher.html`.
    pub fn api_doc_path(&self) -> String {
        format!("{}.html", self.0.replace('.', "/"))
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Name of a predicate ensured or required by a rule.
///
/// Only the name takes part in dependency linking; arguments are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredicateName(String);

impl PredicateName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PredicateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PredicateName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PredicateName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Set of predicate names, ordered for deterministic output.
pub type PredicateSet = BTreeSet<PredicateName>;

/// Rule identifier to predicate names, one side (requires or ensures) of every rule.
pub type PredicateMap = BTreeMap<RuleId, PredicateSet>;

/// A usage rule as needed for documentation.
///
/// `requires` and `ensures` drive dependency linking; the remaining fields
/// are carried verbatim for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    /// Predicates this rule guarantees
    pub ensures: PredicateSet,
    /// Predicates that must hold before this rule can be used
    pub requires: PredicateSet,
    /// Predicates this rule invalidates
    pub negates: PredicateSet,
    /// ORDER section text
    pub order: Option<String>,
    /// CONSTRAINTS section text
    pub constraints: Option<String>,
    /// FORBIDDEN section text
    pub forbidden: Option<String>,
    /// File the rule was read from
    pub source: Option<PathBuf>,
}

impl Rule {
    pub fn new(id: impl Into<RuleId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_requires<I, P>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PredicateName>,
    {
        self.requires.extend(predicates.into_iter().map(Into::into));
        self
    }

    pub fn with_ensures<I, P>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PredicateName>,
    {
        self.ensures.extend(predicates.into_iter().map(Into::into));
        self
    }
}

/// Which side of a rule consumes predicates and which side produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// A rule is related to the rules ensuring what it requires.
    RequiresToEnsures,
    /// A rule is related to the rules requiring what it ensures.
    EnsuresToRequires,
}

impl Direction {
    pub fn consumer(self, rule: &Rule) -> &PredicateSet {
        match self {
            Direction::RequiresToEnsures => &rule.requires,
            Direction::EnsuresToRequires => &rule.ensures,
        }
    }

    pub fn producer(self, rule: &Rule) -> &PredicateSet {
        match self {
            Direction::RequiresToEnsures => &rule.ensures,
            Direction::EnsuresToRequires => &rule.requires,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::RequiresToEnsures => "requires",
            Direction::EnsuresToRequires => "ensures",
        }
    }
}

/// All rules of one documentation run, keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<RuleId, Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rule set, rejecting duplicate identifiers.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> DomainResult<Self> {
        let mut set = Self::new();
        for rule in rules {
            set.insert(rule)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, rule: Rule) -> DomainResult<()> {
        if self.rules.contains_key(&rule.id) {
            return Err(DomainError::DuplicateRule(rule.id));
        }
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Project every rule onto the predicate set selected by `side`.
    pub fn predicate_map(&self, side: impl Fn(&Rule) -> &PredicateSet) -> PredicateMap {
        self.rules
            .iter()
            .map(|(id, rule)| (id.clone(), side(rule).clone()))
            .collect()
    }
}

/// Expand environment variables and `~` in a path string.
///
/// Supports `$VAR`, `${VAR}`; unresolvable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

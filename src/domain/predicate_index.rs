//! Predicate index: which rules satisfy which other rules' predicates.
//!
//! Rule A is related to rule B when some predicate A consumes is produced by B.
//! Consuming "requires" and producing "ensures" gives the requires relation;
//! swapping both maps gives the ensures relation. There is no
//! direction-specific logic.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::domain::entities::{Direction, PredicateMap, PredicateName, RuleId, RuleSet};

static NO_RELATION: BTreeSet<RuleId> = BTreeSet::new();

/// Per rule, the consumed predicates that some rule produces, and the producers.
///
/// Consumed predicates nobody produces are absent.
pub type PredicateLinks = BTreeMap<RuleId, BTreeMap<PredicateName, BTreeSet<RuleId>>>;

/// Rule identifier to the set of directly related rule identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationMap(BTreeMap<RuleId, BTreeSet<RuleId>>);

impl RelationMap {
    /// Related rules of `id`; unknown identifiers have no relation.
    pub fn get(&self, id: &str) -> &BTreeSet<RuleId> {
        self.0.get(id).unwrap_or(&NO_RELATION)
    }

    pub fn contains_rule(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn rules(&self) -> impl Iterator<Item = &RuleId> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RuleId, &BTreeSet<RuleId>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of rule-to-rule links.
    pub fn link_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }
}

impl FromIterator<(RuleId, BTreeSet<RuleId>)> for RelationMap {
    fn from_iter<I: IntoIterator<Item = (RuleId, BTreeSet<RuleId>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Stateless builder for predicate links and relation maps.
pub struct PredicateIndexBuilder;

impl PredicateIndexBuilder {
    /// Link every consumed predicate to the rules producing it.
    ///
    /// Every rule of `consumers` gets an entry, empty when nothing it consumes
    /// is produced anywhere. A rule producing what it consumes links to itself.
    pub fn build_predicate_links(consumers: &PredicateMap, producers: &PredicateMap) -> PredicateLinks {
        let index = Self::producer_index(producers);

        let mut links = PredicateLinks::new();
        for (rule, consumed) in consumers {
            let entry = links.entry(rule.clone()).or_default();
            for predicate in consumed {
                match index.get(predicate) {
                    Some(producing) => {
                        entry.insert(predicate.clone(), producing.clone());
                    }
                    None => trace!(%rule, %predicate, "predicate not produced by any rule"),
                }
            }
        }
        links
    }

    /// Drop the predicate level, keeping rule-to-rule relations only.
    pub fn strip_predicates(links: &PredicateLinks) -> RelationMap {
        links
            .iter()
            .map(|(rule, by_predicate)| {
                let related = by_predicate.values().flatten().cloned().collect();
                (rule.clone(), related)
            })
            .collect()
    }

    pub fn build_relation_map(consumers: &PredicateMap, producers: &PredicateMap) -> RelationMap {
        let relations = Self::strip_predicates(&Self::build_predicate_links(consumers, producers));
        debug!(
            rules = relations.len(),
            links = relations.link_count(),
            "built relation map"
        );
        relations
    }

    /// Predicate links of a rule set in the given direction.
    pub fn links_for(rules: &RuleSet, direction: Direction) -> PredicateLinks {
        let consumers = rules.predicate_map(|rule| direction.consumer(rule));
        let producers = rules.predicate_map(|rule| direction.producer(rule));
        Self::build_predicate_links(&consumers, &producers)
    }

    /// Relation map of a rule set in the given direction.
    pub fn relation_map(rules: &RuleSet, direction: Direction) -> RelationMap {
        let consumers = rules.predicate_map(|rule| direction.consumer(rule));
        let producers = rules.predicate_map(|rule| direction.producer(rule));
        Self::build_relation_map(&consumers, &producers)
    }

    fn producer_index(producers: &PredicateMap) -> BTreeMap<PredicateName, BTreeSet<RuleId>> {
        let mut index: BTreeMap<PredicateName, BTreeSet<RuleId>> = BTreeMap::new();
        for (rule, produced) in producers {
            for predicate in produced {
                index.entry(predicate.clone()).or_default().insert(rule.clone());
            }
        }
        index
    }
}

//! Documentation site generation
//!
//! Builds both dependency directions of a rule set and writes the site:
//!
//! ```text
//! <report_dir>/
//!   frontpage.html
//!   index.html
//!   rules/<rule id>.html
//!   sources/<rule id>.crysl     (copy_sources)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, instrument};

use crate::application::render::{
    render_frontpage, render_index, render_rule_page, rule_page_name, RulePage, SiteStats,
};
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    DependencyForest, DependencyTreeBuilder, Direction, PredicateIndexBuilder, PredicateLinks,
    RelationMap, Rule, RuleSet,
};
use crate::infrastructure::traits::FileSystem;

/// Predicate links, relation maps and forests of both directions.
#[derive(Debug, Clone)]
pub struct DependencyGraphs {
    pub requires_links: PredicateLinks,
    pub ensures_links: PredicateLinks,
    pub requires_relations: RelationMap,
    pub ensures_relations: RelationMap,
    pub requires_forest: DependencyForest,
    pub ensures_forest: DependencyForest,
}

impl DependencyGraphs {
    /// Build every graph of a fully loaded rule set.
    #[instrument(level = "debug", skip(rules), fields(rules = rules.len()))]
    pub fn build(rules: &RuleSet) -> Self {
        let requires_links = PredicateIndexBuilder::links_for(rules, Direction::RequiresToEnsures);
        let ensures_links = PredicateIndexBuilder::links_for(rules, Direction::EnsuresToRequires);
        let requires_relations = PredicateIndexBuilder::strip_predicates(&requires_links);
        let ensures_relations = PredicateIndexBuilder::strip_predicates(&ensures_links);
        let requires_forest = DependencyTreeBuilder::new(&requires_relations).build_forest();
        let ensures_forest = DependencyTreeBuilder::new(&ensures_relations).build_forest();

        Self {
            requires_links,
            ensures_links,
            requires_relations,
            ensures_relations,
            requires_forest,
            ensures_forest,
        }
    }

    pub fn relations(&self, direction: Direction) -> &RelationMap {
        match direction {
            Direction::RequiresToEnsures => &self.requires_relations,
            Direction::EnsuresToRequires => &self.ensures_relations,
        }
    }

    pub fn forest(&self, direction: Direction) -> &DependencyForest {
        match direction {
            Direction::RequiresToEnsures => &self.requires_forest,
            Direction::EnsuresToRequires => &self.ensures_forest,
        }
    }

    pub fn stats(&self) -> SiteStats {
        SiteStats {
            rules: self.requires_relations.len(),
            requires_links: self.requires_relations.link_count(),
            ensures_links: self.ensures_relations.link_count(),
        }
    }
}

/// Outcome of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub report_dir: PathBuf,
    pub rule_pages: usize,
    pub requires_links: usize,
    pub ensures_links: usize,
    pub copied_sources: usize,
}

/// Writes the documentation site of a rule set.
pub struct DocumentationService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl DocumentationService {
    /// Create a new documentation service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Generate the complete site into the configured report directory.
    ///
    /// Graphs are built before anything is written; any write failure aborts
    /// the run.
    #[instrument(skip(self, rules), fields(rules = rules.len(), report_dir = %self.settings.report_dir.display()))]
    pub fn generate(&self, rules: &RuleSet) -> ApplicationResult<GenerationReport> {
        let graphs = DependencyGraphs::build(rules);
        let footer = self.footer();
        let report_dir = &self.settings.report_dir;
        let pages_dir = self.settings.rules_pages_dir();

        self.fs
            .create_dir_all(&pages_dir)
            .with_path_context("create report directory", &pages_dir)?;

        let mut copied_sources = 0;
        for rule in rules.iter() {
            let source_link = if self.settings.features.copy_sources {
                self.copy_source(rule)?
            } else {
                None
            };
            if source_link.is_some() {
                copied_sources += 1;
            }

            let page = RulePage {
                rule,
                requires_links: graphs.requires_links.get(&rule.id),
                ensures_links: graphs.ensures_links.get(&rule.id),
                requires_tree: graphs.requires_forest.get(&rule.id),
                ensures_tree: graphs.ensures_forest.get(&rule.id),
                api_link: self.api_link(rule),
                source_link,
            };
            let html = render_rule_page(&page, &self.settings.features, &footer);
            let path = pages_dir.join(rule_page_name(&rule.id));
            self.fs.write(&path, &html).with_path_context("write rule page", &path)?;
            debug!(rule = %rule.id, "wrote rule page");
        }

        let index = report_dir.join("index.html");
        self.fs
            .write(&index, &render_index(rules.iter(), &footer))
            .with_path_context("write index", &index)?;

        let stats = graphs.stats();
        let frontpage = report_dir.join("frontpage.html");
        self.fs
            .write(&frontpage, &render_frontpage(&stats, &footer))
            .with_path_context("write front page", &frontpage)?;

        let report = GenerationReport {
            report_dir: report_dir.clone(),
            rule_pages: rules.len(),
            requires_links: stats.requires_links,
            ensures_links: stats.ensures_links,
            copied_sources,
        };
        info!(
            pages = report.rule_pages,
            sources = report.copied_sources,
            "generated documentation"
        );
        Ok(report)
    }

    /// Copy a rule's source into the report; returns the link from its page.
    fn copy_source(&self, rule: &Rule) -> ApplicationResult<Option<String>> {
        let Some(source) = &rule.source else {
            return Ok(None);
        };
        let file_name = format!("{}.crysl", rule.id.as_str());
        let target = self.settings.sources_dir().join(&file_name);
        self.fs
            .ensure_parent(&target)
            .with_path_context("create sources directory", &target)?;
        self.fs
            .copy(source, &target)
            .with_path_context("copy rule source", source)?;
        Ok(Some(format!("../sources/{file_name}")))
    }

    fn api_link(&self, rule: &Rule) -> Option<String> {
        self.settings.javadoc_base_url.as_ref().map(|base| {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                rule.id.api_doc_path()
            )
        })
    }

    fn footer(&self) -> String {
        format!(
            "Generated by ruledoc {} on {}",
            env!("CARGO_PKG_VERSION"),
            Local::now().format("%Y-%m-%d %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_two_rules_when_building_graphs_then_both_directions_are_populated() {
        let rules = RuleSet::from_rules([
            Rule::new("a.A").with_requires(["x"]),
            Rule::new("b.B").with_ensures(["x"]),
        ])
        .unwrap();

        let graphs = DependencyGraphs::build(&rules);

        assert_eq!(graphs.relations(Direction::RequiresToEnsures).get("a.A").len(), 1);
        assert!(graphs.relations(Direction::RequiresToEnsures).get("b.B").is_empty());
        assert_eq!(graphs.relations(Direction::EnsuresToRequires).get("b.B").len(), 1);
        assert_eq!(graphs.forest(Direction::EnsuresToRequires).len(), 2);
        assert_eq!(
            graphs.stats(),
            SiteStats {
                rules: 2,
                requires_links: 1,
                ensures_links: 1
            }
        );
    }

    #[test]
    fn given_empty_rule_set_when_generating_then_writes_empty_site() {
        let temp = tempfile::TempDir::new().unwrap();
        let settings = Settings {
            report_dir: temp.path().join("site"),
            ..Settings::default()
        };
        let service = DocumentationService::new(
            Arc::new(crate::infrastructure::traits::RealFileSystem),
            Arc::new(settings),
        );

        let report = service.generate(&RuleSet::new()).unwrap();

        assert_eq!(report.rule_pages, 0);
        assert_eq!(report.requires_links, 0);
        assert_eq!(report.copied_sources, 0);
        let frontpage = std::fs::read_to_string(temp.path().join("site/frontpage.html")).unwrap();
        assert!(frontpage.contains("0 rules, 0 requires links, 0 ensures links."));
        assert!(temp.path().join("site/index.html").is_file());
        assert!(temp.path().join("site/rules").is_dir());
    }

    #[test]
    fn given_base_url_with_slash_when_linking_then_joins_once() {
        let settings = Settings {
            javadoc_base_url: Some("https://docs.example.org/api/".to_string()),
            ..Settings::default()
        };
        let service = DocumentationService::new(
            Arc::new(crate::infrastructure::traits::RealFileSystem),
            Arc::new(settings),
        );

        let link = service.api_link(&Rule::new("javax.crypto.Cipher"));

        assert_eq!(
            link.as_deref(),
            Some("https://docs.example.org/api/javax/crypto/Cipher.html")
        );
    }
}

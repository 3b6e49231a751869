//! HTML rendering of the documentation site.
//!
//! Pages are plain strings; rule pages live in `rules/`, the index and
//! front page at the report root.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;

use crate::config::FeatureToggles;
use crate::domain::{PredicateName, PredicateSet, Rule, RuleId, TreeNode};

const STYLE: &str = "body{font-family:sans-serif;margin:2em;max-width:60em}\
pre{background:#f4f4f4;padding:.5em}\
ul.tree,ul.tree ul{list-style:none;padding-left:1.2em;border-left:1px solid #ccc}\
.missing{color:#a00}";

/// Everything rendered on one rule page.
#[derive(Debug)]
pub struct RulePage<'a> {
    pub rule: &'a Rule,
    /// Rules ensuring each predicate this rule requires
    pub requires_links: Option<&'a BTreeMap<PredicateName, BTreeSet<RuleId>>>,
    /// Rules requiring each predicate this rule ensures
    pub ensures_links: Option<&'a BTreeMap<PredicateName, BTreeSet<RuleId>>>,
    pub requires_tree: Option<&'a TreeNode<RuleId>>,
    pub ensures_tree: Option<&'a TreeNode<RuleId>>,
    /// Link to the API documentation of the rule's class
    pub api_link: Option<String>,
    /// Link to the copied rule source, relative to the page
    pub source_link: Option<String>,
}

/// Counts shown on the front page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteStats {
    pub rules: usize,
    pub requires_links: usize,
    pub ensures_links: usize,
}

/// Escape text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// File name of a rule page.
pub fn rule_page_name(id: &RuleId) -> String {
    format!("{}.html", id.as_str())
}

fn layout(title: &str, body: &str, footer: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n<footer><small>{}</small></footer>\n</body>\n</html>\n",
        escape(title),
        STYLE,
        body,
        escape(footer)
    )
}

fn rule_link(id: &RuleId, prefix: &str) -> String {
    format!(
        "<a href=\"{}{}\" title=\"{}\">{}</a>",
        prefix,
        escape(&rule_page_name(id)),
        escape(id.as_str()),
        escape(id.short_name())
    )
}

/// Render a dependency tree as nested lists; node links point at sibling rule pages.
pub fn render_tree(tree: &TreeNode<RuleId>) -> String {
    let mut html = String::from("<ul class=\"tree\">\n");
    push_tree_node(&mut html, tree);
    html.push_str("</ul>\n");
    html
}

fn push_tree_node(html: &mut String, node: &TreeNode<RuleId>) {
    html.push_str(&format!("<li>{}", rule_link(node.data(), "")));
    if !node.is_leaf() {
        html.push_str("\n<ul>\n");
        for child in node.children() {
            push_tree_node(html, child);
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</li>\n");
}

fn push_section(html: &mut String, title: &str, content: &str) {
    html.push_str(&format!("<section>\n<h2>{}</h2>\n{}</section>\n", escape(title), content));
}

fn predicate_list(
    predicates: &PredicateSet,
    links: Option<&BTreeMap<PredicateName, BTreeSet<RuleId>>>,
    relation: &str,
) -> String {
    if predicates.is_empty() {
        return "<p>None.</p>\n".to_string();
    }
    let mut html = String::from("<ul>\n");
    for predicate in predicates {
        let related = links.and_then(|l| l.get(predicate));
        match related {
            Some(rules) if !rules.is_empty() => {
                let rules = rules.iter().map(|id| rule_link(id, "")).join(", ");
                html.push_str(&format!(
                    "<li><code>{}</code> {} {}</li>\n",
                    escape(predicate.as_str()),
                    relation,
                    rules
                ));
            }
            _ => html.push_str(&format!(
                "<li><code>{}</code> <span class=\"missing\">(no linked rule)</span></li>\n",
                escape(predicate.as_str())
            )),
        }
    }
    html.push_str("</ul>\n");
    html
}

fn plain_list(predicates: &PredicateSet) -> String {
    if predicates.is_empty() {
        return "<p>None.</p>\n".to_string();
    }
    let items = predicates
        .iter()
        .map(|p| format!("<li><code>{}</code></li>", escape(p.as_str())))
        .join("\n");
    format!("<ul>\n{items}\n</ul>\n")
}

fn verbatim(text: Option<&str>) -> String {
    match text {
        Some(text) => format!("<pre>{}</pre>\n", escape(text)),
        None => "<p>None.</p>\n".to_string(),
    }
}

/// Render one rule page.
pub fn render_rule_page(page: &RulePage<'_>, features: &FeatureToggles, footer: &str) -> String {
    let rule = page.rule;
    let mut body = format!(
        "<nav><a href=\"../index.html\">Index</a></nav>\n<h1>{}</h1>\n<p><code>{}</code></p>\n",
        escape(rule.id.short_name()),
        escape(rule.id.as_str())
    );
    if let Some(link) = &page.api_link {
        body.push_str(&format!(
            "<p><a href=\"{}\">API documentation</a></p>\n",
            escape(link)
        ));
    }
    if let Some(link) = &page.source_link {
        body.push_str(&format!("<p><a href=\"{}\">Rule source</a></p>\n", escape(link)));
    }
    if features.help {
        body.push_str(
            "<p class=\"help\">The requires tree lists the rules that ensure what this rule \
requires, transitively. The ensures tree lists the rules that require what this rule ensures.</p>\n",
        );
    }

    push_section(&mut body, "Order", &verbatim(rule.order.as_deref()));
    push_section(&mut body, "Constraints", &verbatim(rule.constraints.as_deref()));
    push_section(&mut body, "Forbidden methods", &verbatim(rule.forbidden.as_deref()));
    push_section(
        &mut body,
        "Requires",
        &predicate_list(&rule.requires, page.requires_links, "is ensured by"),
    );
    push_section(
        &mut body,
        "Ensures",
        &predicate_list(&rule.ensures, page.ensures_links, "is required by"),
    );
    push_section(&mut body, "Negates", &plain_list(&rule.negates));

    if features.requires_tree {
        if let Some(tree) = page.requires_tree {
            push_section(&mut body, "Requires tree", &render_tree(tree));
        }
    }
    if features.ensures_tree {
        if let Some(tree) = page.ensures_tree {
            push_section(&mut body, "Ensures tree", &render_tree(tree));
        }
    }

    layout(rule.id.as_str(), &body, footer)
}

/// Render the index page listing all rules.
pub fn render_index<'a>(rules: impl Iterator<Item = &'a Rule>, footer: &str) -> String {
    let mut body = String::from("<h1>Rules</h1>\n<ul>\n");
    for rule in rules {
        body.push_str(&format!(
            "<li>{} <code>{}</code></li>\n",
            rule_link(&rule.id, "rules/"),
            escape(rule.id.as_str())
        ));
    }
    body.push_str("</ul>\n");
    layout("Rules", &body, footer)
}

/// Render the front page.
pub fn render_frontpage(stats: &SiteStats, footer: &str) -> String {
    let body = format!(
        "<h1>Rule documentation</h1>\n<p>{} rules, {} requires links, {} ensures links.</p>\n\
<p><a href=\"index.html\">Browse all rules</a></p>\n",
        stats.rules, stats.requires_links, stats.ensures_links
    );
    layout("Rule documentation", &body, footer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_markup_when_escaping_then_replaces_special_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn given_nested_tree_when_rendering_then_nests_lists_and_links_pages() {
        let b = TreeNode::from_parts(RuleId::from("b.B"), vec![TreeNode::new(RuleId::from("c.C"))]);
        let root = TreeNode::from_parts(RuleId::from("a.A"), vec![b]);

        let html = render_tree(&root);

        assert!(html.starts_with("<ul class=\"tree\">"));
        assert!(html.contains("href=\"b.B.html\""));
        assert_eq!(html.matches("<ul").count(), 3);
        assert_eq!(html.matches("<li>").count(), 3);
    }

    #[test]
    fn given_unlinked_predicate_when_rendering_page_then_marks_it_missing() {
        let rule = Rule::new("a.A").with_requires(["key"]);
        let page = RulePage {
            rule: &rule,
            requires_links: None,
            ensures_links: None,
            requires_tree: None,
            ensures_tree: None,
            api_link: None,
            source_link: None,
        };

        let html = render_rule_page(&page, &FeatureToggles::default(), "footer");

        assert!(html.contains("<code>key</code> <span class=\"missing\">"));
        assert!(html.contains("<h1>A</h1>"));
    }
}

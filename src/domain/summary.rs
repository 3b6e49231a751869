//! Rule summary reader.
//!
//! Extracts from a rule source the parts documentation needs: the `SPEC`
//! identifier, predicate names of `REQUIRES`, `ENSURES` and `NEGATES`, and
//! the raw text of `ORDER`, `CONSTRAINTS` and `FORBIDDEN`. Other sections
//! are skipped and nothing is validated.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::domain::entities::{PredicateName, PredicateSet, Rule, RuleId};
use crate::domain::error::{DomainError, DomainResult};

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment regex"));
static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//[^\n]*").expect("line comment regex"));
static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(SPEC|OBJECTS|EVENTS|ORDER|CONSTRAINTS|FORBIDDEN|REQUIRES|ENSURES|NEGATES)\b(.*)$",
    )
    .expect("section header regex")
});
static PREDICATE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)").expect("predicate name regex"));

/// Parse the summary of one rule source file.
pub fn parse_rule_summary(content: &str, source: &Path) -> DomainResult<Rule> {
    let sections = split_sections(content);

    let id = sections
        .get("SPEC")
        .and_then(|body| body.split_whitespace().next())
        .ok_or_else(|| DomainError::MissingSpec(source.to_path_buf()))?;

    let mut rule = Rule::new(RuleId::new(id));
    rule.requires = predicate_names(&sections, "REQUIRES", source)?;
    rule.ensures = predicate_names(&sections, "ENSURES", source)?;
    rule.negates = predicate_names(&sections, "NEGATES", source)?;
    rule.order = section_text(&sections, "ORDER");
    rule.constraints = section_text(&sections, "CONSTRAINTS");
    rule.forbidden = section_text(&sections, "FORBIDDEN");
    rule.source = Some(source.to_path_buf());

    trace!(
        rule = %rule.id,
        requires = rule.requires.len(),
        ensures = rule.ensures.len(),
        "read rule summary"
    );
    Ok(rule)
}

/// Split comment-free content into section bodies keyed by section keyword.
fn split_sections(content: &str) -> BTreeMap<&'static str, String> {
    let without_blocks = BLOCK_COMMENT.replace_all(content, "");
    let stripped = LINE_COMMENT.replace_all(&without_blocks, "");

    let mut sections: BTreeMap<&'static str, String> = BTreeMap::new();
    let mut current: Option<&'static str> = None;
    for line in stripped.lines() {
        if let Some(caps) = SECTION_HEADER.captures(line) {
            let keyword = section_keyword(&caps[1]);
            current = keyword;
            if let Some(keyword) = keyword {
                let body = sections.entry(keyword).or_default();
                push_line(body, &caps[2]);
            }
        } else if let Some(keyword) = current {
            push_line(sections.entry(keyword).or_default(), line);
        }
    }
    sections
}

fn section_keyword(raw: &str) -> Option<&'static str> {
    [
        "SPEC",
        "OBJECTS",
        "EVENTS",
        "ORDER",
        "CONSTRAINTS",
        "FORBIDDEN",
        "REQUIRES",
        "ENSURES",
        "NEGATES",
    ]
    .into_iter()
    .find(|keyword| *keyword == raw)
}

fn push_line(body: &mut String, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if !body.is_empty() {
        body.push('\n');
    }
    body.push_str(line);
}

fn section_text(sections: &BTreeMap<&'static str, String>, keyword: &str) -> Option<String> {
    sections
        .get(keyword)
        .map(|body| body.trim().to_string())
        .filter(|body| !body.is_empty())
}

/// Predicate names of a `;`-separated predicate section.
///
/// `a[x] || b[y]` contributes both names; a statement starting with `!`
/// states that a predicate must not hold and contributes nothing.
fn predicate_names(
    sections: &BTreeMap<&'static str, String>,
    keyword: &str,
    source: &Path,
) -> DomainResult<PredicateSet> {
    let mut names = PredicateSet::new();
    let Some(body) = sections.get(keyword) else {
        return Ok(names);
    };

    for statement in body.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        for alternative in statement.split("||").map(str::trim) {
            if alternative.starts_with('!') {
                continue;
            }
            let name = PREDICATE_NAME
                .captures(alternative)
                .map(|caps| caps[1].to_string())
                .ok_or_else(|| DomainError::InvalidRule {
                    path: source.to_path_buf(),
                    message: format!("no predicate name in {keyword} statement: {alternative}"),
                })?;
            names.insert(PredicateName::new(name));
        }
    }
    Ok(names)
}

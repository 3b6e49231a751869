//! Rule loading service
//!
//! Reads every rule source below a directory into a [`RuleSet`].

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{parse_rule_summary, Rule, RuleSet};
use crate::infrastructure::traits::FileSystem;

/// File extension of rule sources
pub const RULE_EXTENSION: &str = "crysl";

/// Loads rule summaries from the filesystem.
pub struct RuleService {
    fs: Arc<dyn FileSystem>,
}

impl RuleService {
    /// Create a new rule service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read one rule source file.
    pub fn load_file(&self, path: &Path) -> ApplicationResult<Rule> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read rule", path)?;
        Ok(parse_rule_summary(&content, path)?)
    }

    /// Read all rule sources below `dir`.
    ///
    /// Any unreadable or malformed file fails the whole load, as does a
    /// rule identifier declared twice. A directory without rule sources
    /// yields an empty set.
    #[instrument(level = "debug", skip(self))]
    pub fn load_directory(&self, dir: &Path) -> ApplicationResult<RuleSet> {
        if !self.fs.is_dir(dir) {
            return Err(ApplicationError::NoRulesFound(dir.to_path_buf()));
        }

        let files = self
            .fs
            .find_files(dir, RULE_EXTENSION)
            .with_path_context("scan rules directory", dir)?;

        let mut rules = RuleSet::new();
        for file in &files {
            let rule = self.load_file(file)?;
            debug!(rule = %rule.id, file = %file.display(), "loaded rule");
            rules.insert(rule)?;
        }

        debug!("loaded {} rules from {}", rules.len(), dir.display());
        Ok(rules)
    }
}

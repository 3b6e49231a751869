//! Command dispatch

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{DependencyTreeBuilder, Direction, PredicateIndexBuilder, RuleId, RuleSet};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => {
            let settings = Settings::load(cli.rules_dir.as_deref())?;
            execute_config(command, &settings)
        }
        Commands::Generate {
            out,
            no_requires_tree,
            no_ensures_tree,
            no_sources,
        } => {
            let mut settings = Settings::load(cli.rules_dir.as_deref())?;
            if let Some(out) = out {
                settings.report_dir = out.clone();
            }
            settings.features.requires_tree &= !no_requires_tree;
            settings.features.ensures_tree &= !no_ensures_tree;
            settings.features.copy_sources &= !no_sources;
            cmd_generate(settings)
        }
        Commands::Tree { rule, direction } => {
            let container = ServiceContainer::new(Settings::load(cli.rules_dir.as_deref())?);
            let rules = load_rules(&container)?;
            cmd_tree(&rules, rule, (*direction).into())
        }
        Commands::Deps { direction } => {
            let container = ServiceContainer::new(Settings::load(cli.rules_dir.as_deref())?);
            let rules = load_rules(&container)?;
            cmd_deps(&rules, (*direction).into());
            Ok(())
        }
        Commands::List => {
            let container = ServiceContainer::new(Settings::load(cli.rules_dir.as_deref())?);
            let rules = load_rules(&container)?;
            cmd_list(&rules);
            Ok(())
        }
    }
}

fn rules_dir(container: &ServiceContainer) -> CliResult<PathBuf> {
    container.settings.rules_dir.clone().ok_or_else(|| {
        CliError::Usage("no rules directory: pass -C <dir> or set rules_dir in config".into())
    })
}

fn load_rules(container: &ServiceContainer) -> CliResult<RuleSet> {
    let dir = rules_dir(container)?;
    Ok(container.rule_service().load_directory(&dir)?)
}

#[instrument(skip(settings))]
fn cmd_generate(settings: Settings) -> CliResult<()> {
    let container = ServiceContainer::new(settings);
    let rules = load_rules(&container)?;
    let report = container.docs_service().generate(&rules)?;

    output::success(&format!(
        "Generated {} rule pages in {}",
        report.rule_pages,
        report.report_dir.display()
    ));
    output::detail(&format!(
        "{} requires links, {} ensures links",
        report.requires_links, report.ensures_links
    ));
    if report.copied_sources > 0 {
        output::detail(&format!("{} rule sources copied", report.copied_sources));
    }
    Ok(())
}

fn cmd_tree(rules: &RuleSet, rule: &str, direction: Direction) -> CliResult<()> {
    if !rules.contains(rule) {
        return Err(ApplicationError::UnknownRule(rule.to_string()).into());
    }
    let relations = PredicateIndexBuilder::relation_map(rules, direction);
    let tree = DependencyTreeBuilder::new(&relations).build_tree(&RuleId::from(rule));
    debug!(nodes = tree.len(), depth = tree.depth(), "built tree");

    output::header(&format!("{} tree of {}", direction.label(), rule));
    output::info(&tree.to_tree_string());
    Ok(())
}

fn cmd_deps(rules: &RuleSet, direction: Direction) {
    let relations = PredicateIndexBuilder::relation_map(rules, direction);
    output::header(&format!(
        "{} relations ({} rules, {} links)",
        direction.label(),
        relations.len(),
        relations.link_count()
    ));
    for (rule, related) in relations.iter() {
        if related.is_empty() {
            output::info(&format!("{rule}: -"));
        } else {
            output::info(&format!("{rule}: {}", related.iter().join(", ")));
        }
    }
}

fn cmd_list(rules: &RuleSet) {
    output::header(&format!("{} rules", rules.len()));
    for rule in rules.iter() {
        output::info(&rule.id);
        output::detail(&format!("requires: {}", rule.requires.iter().join(", ")));
        output::detail(&format!("ensures:  {}", rule.ensures.iter().join(", ")));
    }
}

fn execute_config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    output::action("global", &format!("{}{}", path.display(), state));
                }
                None => output::warning("cannot determine global config directory"),
            }
            if let Some(dir) = &settings.rules_dir {
                let path = local_config_path(dir);
                let state = if path.exists() { "" } else { " (not found)" };
                output::action("local", &format!("{}{}", path.display(), state));
            }
        }
    }
    Ok(())
}

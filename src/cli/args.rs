//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::Direction;

/// Documentation generator for rule sets: dependency trees and HTML pages per rule
#[derive(Parser, Debug)]
#[command(name = "ruledoc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Rules directory (default: from config)
    #[arg(short = 'C', long, global = true, env = "RULEDOC_RULES_DIR", value_hint = ValueHint::DirPath)]
    pub rules_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the documentation site
    Generate {
        /// Output directory (overrides report_dir)
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        out: Option<PathBuf>,
        /// Omit requires trees
        #[arg(long)]
        no_requires_tree: bool,
        /// Omit ensures trees
        #[arg(long)]
        no_ensures_tree: bool,
        /// Do not copy rule sources
        #[arg(long)]
        no_sources: bool,
    },

    /// Show the dependency tree of a rule
    Tree {
        /// Fully-qualified rule identifier
        rule: String,
        /// Relation direction
        #[arg(short, long, value_enum, default_value_t = DirectionArg::Requires)]
        direction: DirectionArg,
    },

    /// Show directly related rules of every rule
    Deps {
        /// Relation direction
        #[arg(short, long, value_enum, default_value_t = DirectionArg::Requires)]
        direction: DirectionArg,
    },

    /// List loaded rules with their predicates
    List,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Relation direction as given on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionArg {
    /// Rules ensuring what a rule requires
    Requires,
    /// Rules requiring what a rule ensures
    Ensures,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Requires => Direction::RequiresToEnsures,
            DirectionArg::Ensures => Direction::EnsuresToRequires,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Template,

    /// Show config paths
    Path,
}

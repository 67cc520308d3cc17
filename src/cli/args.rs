//! CLI argument definitions using clap

use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::Key;
use crate::domain::{CyclePolicy, Priority, Shape};

/// Resolve flat parent-linked records into linked trees and unlinked clusters
#[derive(Parser, Debug)]
#[command(name = "forestry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Directory holding a local .forestry.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Handling of parent cycles: reject or unlink
    #[arg(long, global = true, env = "FORESTRY_CYCLE_POLICY")]
    pub cycle_policy: Option<CyclePolicy>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Which part of the forest a command looks at.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Trees attached to a genuine root
    Linked,
    /// Clusters whose parent is missing or self-referencing
    Unlinked,
    /// Both, ordered by priority
    Both,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render trees
    Tree {
        /// Record file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Scope::Both)]
        scope: Scope,

        /// linked or unlinked first (default from settings)
        #[arg(long)]
        priority: Option<Priority>,
    },

    /// List nodes in depth-first order
    List {
        /// Record file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Scope::Both)]
        scope: Scope,

        /// tree (tops only) or linear (every node); default from settings
        #[arg(long)]
        shape: Option<Shape>,

        /// linked or unlinked first (default from settings)
        #[arg(long)]
        priority: Option<Priority>,

        /// Show distance to base
        #[arg(long)]
        distance: bool,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// List descendants of one node
    Descendants {
        /// Record file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Node id (integer if it parses as one)
        #[arg(value_parser = Key::from_str)]
        id: Key,

        /// Maximum hops below the node (unlimited if omitted)
        #[arg(short, long)]
        max_depth: Option<usize>,

        /// Include the node itself
        #[arg(short, long)]
        include_self: bool,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show forest statistics
    Info {
        /// Record file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

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

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
}

//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Hierarchical enumerations: inspect trees of named categories
#[derive(Parser, Debug)]
#[command(name = "fortnum")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Catalog file (default: from settings)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show categories as a tree (all trees if no path given)
    Tree {
        /// Category path, e.g. Color/Green
        path: Option<String>,
    },

    /// List direct children in declaration order
    Children {
        /// Category path
        path: String,
    },

    /// List descendants depth-first
    Descendants {
        /// Category path
        path: String,
        /// Start with the category itself
        #[arg(long)]
        include_self: bool,
    },

    /// List ancestors (root first)
    Ancestors {
        /// Category path
        path: String,
        /// Nearest ancestor first
        #[arg(long)]
        ascending: bool,
        /// Include the category itself
        #[arg(long)]
        include_self: bool,
    },

    /// List ancestors, the category and its descendants
    Family {
        /// Category path
        path: String,
    },

    /// Compare two categories by declaration order
    Compare {
        /// Left category path
        left: String,
        /// Right category path
        right: String,
    },

    /// Look up a name among the children of a category
    Resolve {
        /// Category path to search in
        tree: String,
        /// Child name
        name: String,
    },

    /// Show categories linked onto an item class
    Related {
        /// Item class name
        item: String,
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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Template,

    /// Show config paths
    Path,
}

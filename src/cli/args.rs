//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Browse, filter and render a design system documentation tree
#[derive(Parser, Debug)]
#[command(name = "dskview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Backend base url (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::Url)]
    pub api_url: Option<String>,

    /// Source (version) to browse (overrides config)
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Directory holding a local .dskview.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Print machine readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the documentation tree
    Tree {
        /// Only show nodes matching this query, their ancestors and subtrees
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// List every node, parents before children
    Flatten,

    /// Show the tree pruned to a filter query
    Filter {
        /// Filter query
        query: String,
    },

    /// Full-text search
    Search {
        /// Search query
        query: String,
    },

    /// Render the documents of a node
    Show {
        /// Node url, e.g. "colors/primary"
        url: String,
    },

    /// Select a node interactively (fzf) and render it
    Pick,

    /// Stay connected and re-render when the backend tree changes
    Watch {
        /// Filter query to keep applied
        #[arg(short, long)]
        filter: Option<String>,
        /// Node to keep rendered
        #[arg(short, long)]
        node: Option<String>,
    },

    /// Show the backend banner
    Hello,

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
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}

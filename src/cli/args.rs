//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Tidy-tree layout and spring animation for flat parent-referencing records
#[derive(Parser, Debug)]
#[command(name = "springtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file, layered over the global one
    #[arg(short, long, global = true, env = "SPRINGTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the hierarchy as a tree
    Tree {
        /// JSON array of records, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the settled position of every node
    Layout {
        /// JSON array of records, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Canvas width (overrides config)
        #[arg(long)]
        width: Option<f64>,

        /// Canvas height (overrides config)
        #[arg(long)]
        height: Option<f64>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the scene as JSON
    Scene {
        /// JSON array of records, `-` for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Identifier of the selected node
        #[arg(short, long)]
        select: Option<String>,

        /// Advance this many frames instead of settling
        #[arg(short, long)]
        frames: Option<usize>,
    },

    /// Animate from one snapshot to another, one JSON line per frame
    Animate {
        /// Snapshot the view settles on first
        #[arg(value_hint = ValueHint::FilePath)]
        from: PathBuf,

        /// Snapshot the view animates to
        #[arg(value_hint = ValueHint::FilePath)]
        to: PathBuf,

        /// Identifier of the selected node
        #[arg(short, long)]
        select: Option<String>,

        /// Frames per second of the emitted timeline
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Stop after this many frames even if still moving
        #[arg(long, default_value_t = 600)]
        max_frames: usize,
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
    /// Show merged config
    Show,

    /// Print a commented config template
    Template,

    /// Show config paths
    Path,
}

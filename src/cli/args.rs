//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Diagnostic decision-tree engine: validate troubleshooting trees and walk them step by step
#[derive(Parser, Debug)]
#[command(name = "diagtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Base directory for relative paths and local config (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate every tree file in a directory (or a single file)
    Validate {
        /// Directory or file (default: trees_dir from config)
        #[arg(value_hint = ValueHint::AnyPath)]
        path: Option<PathBuf>,
        /// Fail on lint warnings too
        #[arg(long)]
        strict: bool,
        /// Report format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print a tree from its start step
    Show {
        /// Tree description file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Walk a tree interactively on the terminal
    Walk {
        /// Tree description file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
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

    /// Show config paths
    Path,

    /// Write a config template to <base_dir>/.diagtree.toml
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

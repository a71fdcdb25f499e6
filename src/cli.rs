//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::config::OpenMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// vizdeck dashboard compiler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: vizdeck.toml)
    #[arg(short = 'C', long, default_value = "vizdeck.toml")]
    pub config: PathBuf,

    /// Suppress log output and progress bars
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared arguments for Build and Batch commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Output directory for the generated project (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run the renderer after writing the project
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub render: Option<bool>,

    /// Open the rendered site afterwards
    #[arg(long, value_enum)]
    pub open: Option<OpenMode>,

    /// Fail on unsupported block types instead of skipping them
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub strict: Option<bool>,

    /// Clean output directory completely before building
    #[arg(long)]
    pub clean: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Init an example project
    Init {
        /// the name(path) of project directory, related to `root`
        name: Option<PathBuf>,
    },

    /// Compile the project and write the Quarto files
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Compile without writing anything and report problems
    Check {
        /// Treat unsupported blocks as errors
        #[arg(long)]
        strict: bool,
    },

    /// Build every project found under the given directories
    Batch {
        /// Directories searched recursively for config files
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Keep building remaining projects after a failure
        #[arg(long)]
        continue_on_error: bool,

        #[command(flatten)]
        build_args: BuildArgs,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_check(&self) -> bool {
        matches!(self.command, Commands::Check { .. })
    }
    pub const fn is_batch(&self) -> bool {
        matches!(self.command, Commands::Batch { .. })
    }

    /// Build arguments of the current command, if it has any.
    pub fn build_args(&self) -> Option<&BuildArgs> {
        match &self.command {
            Commands::Build { build_args } | Commands::Batch { build_args, .. } => Some(build_args),
            _ => None,
        }
    }
}

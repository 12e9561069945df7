//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Turn image imports into JSX components
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Variant output directory (overrides `[output].dir`)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: jsximg.toml)
    #[arg(short = 'C', long, global = true, default_value = "jsximg.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate JSX modules for image files and directories
    #[command(visible_alias = "b")]
    Build {
        /// Identifiers (`a.jpg?w=400`) or directories to scan. Defaults to `.`
        #[arg(value_name = "PATH")]
        paths: Vec<String>,

        /// Directory for generated modules (overrides `[output].modules`)
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        modules: Option<PathBuf>,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Print the generated module for one identifier
    #[command(visible_alias = "t")]
    Transform {
        /// Asset identifier, e.g. `logo.svg?jsx`
        id: String,

        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Print the resolved directive set for one identifier
    #[command(visible_alias = "d")]
    Directives {
        /// Asset identifier, e.g. `photo.jpg?w=400&jsx`
        id: String,
    },

    /// Run the raster engine on an identifier without the marker
    Variants {
        /// Asset identifier, e.g. `photo.jpg?w=200;400&as=srcset`
        id: String,
    },
}

/// Build mode and verbosity shared by generating commands
#[derive(clap::Args, Debug, Clone)]
pub struct ModeArgs {
    /// Development build (`enabled = "only-production"` turns the pipeline off)
    #[arg(long)]
    pub dev: bool,

    /// Enable verbose output
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

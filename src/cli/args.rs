//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Lume live LaTeX preview CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: lume.toml)
    #[arg(short = 'C', long, default_value = "lume.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Watch a LaTeX file and keep a rendered preview up to date
    #[command(visible_alias = "p")]
    Preview {
        /// Source file to watch
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Debounce window in milliseconds (overrides config)
        #[arg(short, long)]
        debounce_ms: Option<u64>,

        /// Skip the immediate compile on startup
        #[arg(long)]
        no_initial: bool,
    },

    /// Compile a LaTeX file once and export the PDF
    #[command(visible_alias = "b")]
    Build {
        /// Source file to compile
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Output path (default: source name with .pdf extension)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Print the document structure as JSON
    #[command(visible_alias = "o")]
    Outline {
        /// Source file to scan
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_preview(&self) -> bool {
        matches!(self.command, Commands::Preview { .. })
    }
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_outline(&self) -> bool {
        matches!(self.command, Commands::Outline { .. })
    }
}

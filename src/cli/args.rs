//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Rewrite HTML with a pipeline of delete / unwrap / keep / replace rules
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input HTML file; `-` or omitted reads stdin
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Rule file path (default: pipeline.toml, if present)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Delete every element with this tag (repeatable, runs after config rules)
    #[arg(long, value_name = "TAG")]
    pub delete: Vec<String>,

    /// Unwrap every element with this tag (repeatable, runs after config rules)
    #[arg(long, value_name = "TAG")]
    pub unwrap: Vec<String>,

    /// Keep adjacent text nodes separate
    #[arg(long)]
    pub no_normalize: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

impl Cli {
    /// Input path, or `None` for stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }
}

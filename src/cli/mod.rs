//! Command-line interface module.

mod args;

pub use args::Cli;

use anyhow::{Context, Result};
use std::{
    fs,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use html_pipeline::{
    config::{DEFAULT_CONFIG_FILE, PipelineConfig},
    debug, html,
    pipeline::Pipeline,
    rules::{Action, Rule},
};

/// Read, rewrite and write one document as the CLI describes.
pub fn run(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    add_cli_rules(&mut config, cli);
    if cli.no_normalize {
        config.pipeline.normalize = false;
    }

    let mut pipeline = config.build_pipeline()?;
    debug!("pipeline"; "{} transforms", pipeline.len());

    let input = read_input(cli.input_path().map(PathBuf::as_path))?;
    let output = rewrite(&mut pipeline, &input)?;
    write_output(cli.output.as_deref(), &output)
}

/// Parse `input`, run the pipeline over it and render the result.
pub fn rewrite(pipeline: &mut Pipeline<'_>, input: &str) -> Result<String> {
    let mut doc = html::parse(input).context("failed to parse input HTML")?;
    let root = doc.root();
    pipeline.run(&mut doc, root)?;
    Ok(html::render_children(&doc, root))
}

/// Explicit path must exist; the default file is optional.
fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => Ok(PipelineConfig::from_path(path)?),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                Ok(PipelineConfig::from_path(default)?)
            } else {
                debug!("config"; "no {} found, using defaults", DEFAULT_CONFIG_FILE);
                Ok(PipelineConfig::default())
            }
        }
    }
}

fn add_cli_rules(config: &mut PipelineConfig, cli: &Cli) {
    let deletes = cli.delete.iter().map(|tag| Rule::new(tag, Action::Delete));
    let unwraps = cli.unwrap.iter().map(|tag| Rule::new(tag, Action::Unwrap));
    config.rules.extend(deletes.chain(unwraps));
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

fn write_output(path: Option<&Path>, output: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

//! Command-line interface for colfmt
//! Aligns a token-stream document (JSON) into tabular source text.
//!
//! Usage:
//!   colfmt `<path>` [--config `<file>`] [--format `<format>`]   - Align a document
//!   colfmt `<path>` --check                                     - Exit nonzero if anything would change

use clap::{Arg, ArgAction, Command};

use colfmt_config::Loader;

mod document;
mod error;

use document::Document;
use error::CliError;

fn main() {
    let matches = Command::new("colfmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for aligning classified token streams into tabular source text")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the token-stream document (JSON)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: text (aligned source) or json (per-line results)")
                .default_value("text"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Print nothing; exit 1 when any line would change")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let path = matches.get_one::<String>("path").expect("path is required");
    let config = matches.get_one::<String>("config");
    let format = matches.get_one::<String>("format").expect("format has a default");
    let check = matches.get_flag("check");

    let (output, any_changed) = run(path, config, format).unwrap_or_else(|err| {
        eprintln!("colfmt: {}", err);
        std::process::exit(1);
    });

    if check {
        if any_changed {
            std::process::exit(1);
        }
        return;
    }
    print!("{}", output);
}

/// Load configuration, align the document, and format the output.
fn run(
    path: &str,
    config_path: Option<&String>,
    format: &str,
) -> Result<(String, bool), CliError> {
    let mut loader = Loader::new();
    if let Some(config_path) = config_path {
        loader = loader.with_file(config_path);
    }
    let config = loader.build()?;
    let settings = config.alignment.to_settings();

    let source = std::fs::read_to_string(path)?;
    let parsed = Document::parse(&source)?;
    let results = parsed.align(settings);
    let any_changed = results.iter().any(|line| line.changed);

    let output = match format {
        "text" => document::to_text(&results),
        "json" => document::to_json(&results)?,
        other => return Err(CliError::UnknownFormat(other.to_string())),
    };
    Ok((output, any_changed))
}

//! # globsrc
//!
//! A CLI that opens a glob-driven source stream and lists every virtual file
//! it emits.
//!
//! ## Usage
//!
//! ```bash
//! # List files matching a glob
//! globsrc 'templates/**/*.hbs'
//!
//! # Several patterns, later ones excluding
//! globsrc 'pages/*.md' '!pages/draft.md'
//!
//! # Do not read contents, output JSON
//! globsrc 'src/**' --no-read --output json
//!
//! # Load options from a JSON file, flags override it
//! globsrc 'src/**' --config globsrc.json --no-buffer
//! ```

mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use console::Style;
use futures::StreamExt;
use globsrclib::{Features, PatternSet, SourceStream, SrcOptions};
use tracing_subscriber::EnvFilter;

use render::{render_json, render_text, FileRecord, OutputMode};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("globsrc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve glob patterns and list the files they emit")
        .arg(
            Arg::new("pattern")
                .required(true)
                .action(ArgAction::Append)
                .help("Glob or literal path; prefix with ! to exclude"),
        )
        .arg(
            Arg::new("cwd")
                .long("cwd")
                .help("Directory relative patterns resolve against"),
        )
        .arg(
            Arg::new("base")
                .long("base")
                .help("Base recorded on emitted files"),
        )
        .arg(
            Arg::new("dot")
                .long("dot")
                .action(ArgAction::SetTrue)
                .help("Let wildcards match dotfiles"),
        )
        .arg(
            Arg::new("nodir")
                .long("nodir")
                .action(ArgAction::SetTrue)
                .help("Skip directories"),
        )
        .arg(
            Arg::new("no-read")
                .long("no-read")
                .action(ArgAction::SetTrue)
                .help("Do not load contents"),
        )
        .arg(
            Arg::new("no-buffer")
                .long("no-buffer")
                .action(ArgAction::SetTrue)
                .help("Stream contents instead of buffering them"),
        )
        .arg(
            Arg::new("no-streaming")
                .long("no-streaming")
                .action(ArgAction::SetTrue)
                .help("Disallow streamed contents"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON file with source options"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Output format"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log resolution and emission"),
        )
}

/// Build source options: config file first, then flags on top
fn build_options(matches: &ArgMatches) -> Result<SrcOptions, anyhow::Error> {
    let mut options = match matches.get_one::<String>("config") {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{path}'"))?;
            serde_json::from_str::<SrcOptions>(&raw)
                .with_context(|| format!("invalid config '{path}'"))?
        }
        None => SrcOptions::new(),
    };

    if let Some(cwd) = matches.get_one::<String>("cwd") {
        options.cwd = Some(PathBuf::from(cwd));
    }
    if let Some(base) = matches.get_one::<String>("base") {
        options.base = Some(PathBuf::from(base));
    }
    if matches.get_flag("dot") {
        options.dot = true;
    }
    if matches.get_flag("nodir") {
        options.nodir = true;
    }
    if matches.get_flag("no-read") {
        options.load.read = false;
    }
    if matches.get_flag("no-buffer") {
        options.load.buffer = false;
    }

    Ok(options)
}

/// Extract patterns from matches
fn extract_patterns(matches: &ArgMatches) -> PatternSet {
    matches
        .get_many::<String>("pattern")
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(matches: &ArgMatches) -> Result<ExitCode, anyhow::Error> {
    let options = build_options(matches)?;
    let patterns = extract_patterns(matches);
    let features = if matches.get_flag("no-streaming") {
        Features::without_streaming()
    } else {
        Features::default()
    };
    let output = OutputMode::parse(
        matches
            .get_one::<String>("output")
            .map(|s| s.as_str())
            .unwrap_or("text"),
    );

    tracing::debug!(?options, ?features, "opening source stream");
    let mut stream = SourceStream::open(patterns, options, features);
    let mut records = Vec::new();
    let mut failure = None;

    while let Some(item) = stream.next().await {
        match item {
            Ok(file) => records.push(FileRecord::from_file(file).await?),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    match output {
        OutputMode::Json => println!("{}", render_json(&records)?),
        OutputMode::Text => print!("{}", render_text(&records)),
    }

    match failure {
        Some(e) => {
            eprintln!("{} {e}", Style::new().red().bold().apply_to("error:"));
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(matches.get_flag("verbose"));

    match run(&matches).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", Style::new().red().bold().apply_to("error:"));
            ExitCode::FAILURE
        }
    }
}

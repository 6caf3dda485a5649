//! `crafttree` -- command-line driver for the crafting core.

mod cli;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use crafttree_core::data_loader::load_recipe_file;
use crafttree_core::{Limits, Registry};
use session::Session;
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use tracing::{Level, debug, error};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let args = CliArgs::parse();
    init_logging(&args);
    debug!("crafttree v{} starting", env!("CARGO_PKG_VERSION"));

    let exit_code = match run(&args) {
        Ok(0) => 0,
        Ok(_) => 1,
        Err(err) => {
            error!("{err:#}");
            2
        }
    };
    std::process::exit(exit_code);
}

/// Run the session. Returns how many commands failed.
fn run(args: &CliArgs) -> Result<usize> {
    let mut limits = Limits::default();
    if let Some(depth) = args.max_depth {
        limits.max_depth = depth;
    }
    if let Some(items) = args.max_items {
        limits.max_items = items;
    }
    let mut registry = Registry::with_limits(limits);

    if let Some(path) = &args.recipes {
        load_recipe_file(&mut registry, path)
            .with_context(|| format!("failed to load recipes from {}", path.display()))?;
        debug!(items = registry.item_count(), "preloaded recipe set");
    }

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut session = Session::new(registry, args.format);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failed = 0;

    for (number, line) in input.lines().enumerate() {
        let line = line.context("failed to read command input")?;
        match session.run_line(&line) {
            Ok(Some(text)) => writeln!(out, "{text}")?,
            Ok(None) => {}
            Err(err) => {
                failed += 1;
                eprintln!("line {}: error: {err}", number + 1);
            }
        }
    }

    debug!(
        items = session.registry().item_count(),
        failed, "session finished"
    );
    Ok(failed)
}

fn init_logging(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let mut filter = EnvFilter::from_default_env();
    if env::var("RUST_LOG").is_err() {
        for crate_name in ["crafttree", "crafttree_core"] {
            if let Ok(directive) = format!("{crate_name}={level}").parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .init();
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{level_str}', defaulting to WARN. Valid levels: trace, debug, info, warn, error"
            );
            Level::WARN
        }
    }
}

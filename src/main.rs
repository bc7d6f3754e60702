//! `license-expr`: parse, expand and check license expressions.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`license_expr::config::load_config`]) and build the engine.
//! 3. Run the requested command.
//! 4. For `check` and `scan`, render the requested report ([`report`]) and
//!    exit `1` when at least one license is [`Verdict::Reject`].

mod cli;
mod report;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Command, ReportFormat};
use license_expr::config::load_config;
use license_expr::license::FreeText;
use license_expr::models::{CheckedLicense, Verdict};
use license_expr::sources::read_licenses;
use license_expr::{parse, Engine};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let project = std::env::current_dir().context("Failed to read the current directory")?;
    let config =
        load_config(&project, cli.config.as_deref()).context("Failed to load configuration")?;
    let engine = Engine::from_config(&config).context("Invalid configuration")?;

    let rows = match cli.command {
        Command::Parse { expression } => {
            let expr = parse(&expression)?;
            println!("{}", expr);
            println!("{} {}", "weight:".dimmed(), expr.weight());
            return Ok(());
        }
        Command::Expand { expression } => {
            let expr = engine.normalizer().normalize(&parse(&expression)?);
            println!("{}", engine.expander().expand_all(&expr));
            return Ok(());
        }
        Command::Normalize { title, uris } => {
            let text = uris
                .into_iter()
                .fold(FreeText::new(title), |text, uri| text.with_uri(uri));
            match engine.normalizer().resolve(&text) {
                Ok(expr) => {
                    println!("{}", expr);
                    return Ok(());
                }
                Err(err) => {
                    eprintln!("{} {}", "unresolved:".red(), err);
                    std::process::exit(1);
                }
            }
        }
        Command::Classify { text, file, limit } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("Provide the text to classify or --file"),
            };
            classify(&engine, &text, limit);
            return Ok(());
        }
        Command::Check { expressions } => expressions
            .iter()
            .map(|e| engine.check_expression(e))
            .collect::<license_expr::Result<Vec<_>>>()?,
        Command::Scan { files } => {
            let mut rows = Vec::new();
            for path in &files {
                rows.extend(scan_file(&engine, path)?);
            }
            rows
        }
    };

    match cli.report {
        ReportFormat::Terminal => {
            let heading = format!("Checked {} license(s)", rows.len());
            report::terminal::render(&rows, &heading, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    // Exit code: 1 if any reject verdict found
    if rows.iter().any(|r| r.verdict == Verdict::Reject) {
        std::process::exit(1);
    }

    Ok(())
}

fn scan_file(engine: &Engine, path: &Path) -> Result<Vec<CheckedLicense>> {
    let (source, licenses) =
        read_licenses(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(engine.check_declared(&path.display().to_string(), source, &licenses))
}

fn classify(engine: &Engine, text: &str, limit: usize) {
    for (id, score) in engine.classifier().rank(text, limit) {
        println!("{:>6.1}%  {}", score * 100.0, id);
    }
    match engine.classifier().classify(text) {
        Ok((id, _)) => println!("{} {}", "best match:".green(), id),
        Err(err) => println!("{} {}", "unresolved:".yellow(), err),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = match (verbose, quiet) {
        (_, true) => "error",
        (true, _) => "debug",
        _ => "warn",
    };
    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(verbose)
        .init();
}

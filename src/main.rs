mod cli;

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use clap::Parser;

use navgator::config::{self, ConfigFile};
use navgator::context::{self, ContextRequest, CreatePolicy};
use navgator::session::Session;
use navgator::{index, logging, ui};

use cli::{Cli, Command, ContextArgs};

const OUTPUT_ENV: &str = "NAVGATOR_OUTPUT";

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Navigate);
    logging::init(command == Command::Navigate);

    match run(command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("navgator: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Navigate => navigate(),
        Command::Context(args) => resolve_context(args),
        Command::Schema => {
            let schema = schemars::schema_for!(ConfigFile);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn navigate() -> Result<ExitCode> {
    let config = Arc::new(config::load()?);
    let (index, report) = index::build(&config);
    if index.is_empty() {
        bail!("no directories found in the configured index folders or static items");
    }
    ui::terminal::ensure_tty_stdin().context("cannot read keys from the terminal")?;

    let mut session = Session::new(config, index, report);
    match ui::run(&mut session)? {
        Some(path) => {
            write_selection(&path)?;
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}

fn resolve_context(args: ContextArgs) -> Result<ExitCode> {
    let config = config::load()?;
    let policy = if args.create {
        CreatePolicy::Create
    } else if args.no_create {
        CreatePolicy::NoCreate
    } else {
        CreatePolicy::Unspecified
    };
    let request = ContextRequest {
        name: args.name,
        policy,
        template: args.template,
        description: args.description,
        tags: args.tags,
    };
    let entry = context::resolve(&config, &request)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        write_selection(&entry.path.to_string_lossy())?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Writes `path` to `$NAVGATOR_OUTPUT` when set, otherwise to stdout with no
/// trailing newline.
fn write_selection(path: &str) -> Result<()> {
    if let Some(output_path) = env::var_os(OUTPUT_ENV).filter(|value| !value.is_empty()) {
        fs::write(&output_path, path).with_context(|| {
            format!("cannot write selection to {}", output_path.to_string_lossy())
        })?;
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(path.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

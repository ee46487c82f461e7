use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::cli::args::{Cli, Command};
use crate::cli::commands::{backup, exit_for_error, prepare, restore};
use crate::config::load::{load_config, load_config_or_default, resolve, Overrides};
use crate::config::model::RuntimeConfig;
use crate::types::RunMode;

pub mod args;
pub mod commands;

const CONFIG_FILE: &str = "/etc/xtravault.yaml";
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    println!("xtravault {}", VERSION);

    let run_mode = RunMode {
        dry_run: cli.dry_run,
        safe_mode: cli.safe,
        verbose: cli.verbose,
    };

    let cfg = match resolve_config(&cli) {
        Ok(cfg) => cfg,
        Err(err) => exit_for_error(&err),
    };

    let outcome = match &cli.command {
        Command::Backup(args) => backup::run_backup_command(&cfg, args.kind, run_mode),
        Command::Prepare => prepare::run_prepare_command(&cfg, run_mode),
        Command::Restore(args) => restore::run_restore_command(&cfg, args, run_mode),
    };
    if let Err(err) = outcome {
        exit_for_error(&err);
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> crate::error::Result<RuntimeConfig> {
    // an explicit --config must exist; the default path is optional
    let file = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_config_or_default(&PathBuf::from(CONFIG_FILE))?,
    };
    let overrides = Overrides {
        backup_root: cli.target_dir.clone(),
        user: cli.user.clone(),
        password: cli.password.clone(),
    };
    resolve(file, overrides)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .try_init();
}

use chrono::Local;

use crate::backup::engine::Xtrabackup;
use crate::backup::ChainManager;
use crate::config::model::RuntimeConfig;
use crate::error::Result;
use crate::types::{BackupKind, RunMode};
use crate::util::lock::acquire_root_lock;
use crate::util::paths::ensure_root;

pub fn run_backup_command(cfg: &RuntimeConfig, kind: BackupKind, run_mode: RunMode) -> Result<()> {
    println!("{}", Local::now().format("%d-%m-%Y %H:%M"));
    if run_mode.verbose {
        println!(
            "{} backup into {}",
            kind.as_str(),
            cfg.backup_root.display()
        );
    }

    ensure_root(&cfg.backup_root, run_mode)?;
    let _lock = acquire_root_lock(&cfg.backup_root, run_mode)?;

    let engine = Xtrabackup::new(cfg.credentials.clone());
    let manager = ChainManager::new(&cfg.backup_root, engine, run_mode);
    match kind {
        BackupKind::Base => manager.full_backup()?,
        BackupKind::Incr => manager.incremental_backup()?,
    };

    println!("{}", Local::now().format("%d-%m-%Y %H:%M"));
    Ok(())
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::types::{BackupKind, RunMode};

/// Chain logs hold absolute paths only, so entries stay valid no matter
/// where a later invocation is started from.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(env::current_dir()?.join(path))
}

pub fn ensure_root(root: &Path, run_mode: RunMode) -> Result<()> {
    if run_mode.dry_run {
        if !root.exists() {
            println!("dry-run: mkdir -p {}", root.display());
        }
        return Ok(());
    }
    fs::create_dir_all(root)?;
    Ok(())
}

pub fn backup_dir_name_at(kind: BackupKind, at: &DateTime<Local>) -> String {
    format!("{}-{}", at.format("%Y-%m-%d-%H-%M-%S"), kind.dir_suffix())
}

/// Second resolution matches what operators already have on disk; two
/// backups inside the same second would collide, which cron-driven use
/// never produces.
pub fn backup_dir_name(kind: BackupKind) -> String {
    backup_dir_name_at(kind, &Local::now())
}

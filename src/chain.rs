//! On-disk bookkeeping for a backup chain.
//!
//! A backup root carries two plain-text logs, `base.log` and `incr.log`,
//! one absolute directory path per line in the order the backups were
//! taken. The last line of `base.log` is the current base; `incr.log`
//! lists every incremental taken on top of it since the last full backup
//! pruned the chain.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::RunMode;

pub const BASE_LOG: &str = "base.log";
pub const INCR_LOG: &str = "incr.log";
pub const PREPARED_MARKER: &str = "prepared.yaml";

pub struct ChainLog {
    root: PathBuf,
    base_log: PathBuf,
    incr_log: PathBuf,
}

impl ChainLog {
    pub fn new(root: &Path) -> Self {
        ChainLog {
            root: root.to_path_buf(),
            base_log: root.join(BASE_LOG),
            incr_log: root.join(INCR_LOG),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn marker_path(&self) -> PathBuf {
        self.root.join(PREPARED_MARKER)
    }

    pub fn base_entries(&self) -> Result<Vec<PathBuf>> {
        read_entries(&self.base_log)
    }

    pub fn incr_entries(&self) -> Result<Vec<PathBuf>> {
        read_entries(&self.incr_log)
    }

    pub fn last_base(&self) -> Result<Option<PathBuf>> {
        Ok(self.base_entries()?.pop())
    }

    pub fn last_incr(&self) -> Result<Option<PathBuf>> {
        Ok(self.incr_entries()?.pop())
    }

    /// The directory the next incremental is delta-relative to: the newest
    /// incremental when one exists, otherwise the newest base.
    pub fn select_basedir(&self) -> Result<Option<PathBuf>> {
        if let Some(incr) = self.last_incr()? {
            return Ok(Some(incr));
        }
        self.last_base()
    }

    pub fn record_base(&self, dir: &Path) -> Result<()> {
        append_entry(&self.base_log, dir)
    }

    pub fn record_incr(&self, dir: &Path) -> Result<()> {
        append_entry(&self.incr_log, dir)
    }

    /// Deletes every directory either log references and truncates
    /// `incr.log`; the caller records the new base afterwards. `base.log`
    /// itself keeps its history. Safe mode keeps the directories but still
    /// advances the bookkeeping, so the new chain starts clean either way.
    pub fn prune(&self, run_mode: RunMode) -> Result<()> {
        let mut referenced = self.base_entries()?;
        referenced.extend(self.incr_entries()?);
        for dir in referenced {
            if run_mode.dry_run {
                println!("dry-run: rm -rf {}", dir.display());
                continue;
            }
            if run_mode.safe_mode {
                println!("skip delete (safe-mode): {}", dir.display());
                continue;
            }
            match fs::remove_dir_all(&dir) {
                Ok(()) => println!("deleted {}", dir.display()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => tracing::warn!("delete {} failed: {}", dir.display(), err),
            }
        }
        if run_mode.dry_run {
            println!("dry-run: truncate {}", self.incr_log.display());
            return Ok(());
        }
        remove_if_exists(&self.marker_path())?;
        fs::write(&self.incr_log, b"")?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<Vec<PathBuf>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}

fn append_entry(path: &Path, dir: &Path) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", dir.display())?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

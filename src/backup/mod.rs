use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::chain::{ChainLog, BASE_LOG, INCR_LOG};
use crate::error::{ChainError, Result, XtravaultError};
use crate::types::{BackupKind, RunMode};
use crate::util::paths::backup_dir_name;

pub mod engine;

use engine::{ApplyOptions, BackupEngine};

pub const MARKER_VERSION: u32 = 1;

/// Written next to the logs once a base has had its final apply. Merging
/// further incrementals into a finalized base corrupts it, so prepare
/// refuses to continue a chain past this point.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrepareMarker {
    pub version: u32,
    pub base: String,
    pub applied: Vec<String>,
    pub finished: String,
}

pub struct ChainManager<E> {
    chain: ChainLog,
    engine: E,
    run_mode: RunMode,
}

impl<E: BackupEngine> ChainManager<E> {
    pub fn new(root: &Path, engine: E, run_mode: RunMode) -> Self {
        ChainManager {
            chain: ChainLog::new(root),
            engine,
            run_mode,
        }
    }

    pub fn chain(&self) -> &ChainLog {
        &self.chain
    }

    /// Takes a full backup and starts a fresh chain. The previous chain is
    /// pruned only after the engine reports success, so a failed run leaves
    /// the existing chain restorable.
    pub fn full_backup(&self) -> Result<PathBuf> {
        let target = self.chain.root().join(backup_dir_name(BackupKind::Base));
        self.engine.backup(&target, self.run_mode)?;
        self.chain.prune(self.run_mode)?;
        if self.run_mode.dry_run {
            println!("dry-run: record {} in {}", target.display(), BASE_LOG);
        } else {
            self.chain.record_base(&target)?;
            println!("recorded full backup {}", target.display());
        }
        Ok(target)
    }

    /// Takes an incremental against the newest link of the chain. An empty
    /// chain gets one implicit full backup first; if that fails the error
    /// says so instead of retrying.
    pub fn incremental_backup(&self) -> Result<PathBuf> {
        let basedir = match self.chain.select_basedir()? {
            Some(dir) => dir,
            None => {
                println!("backup chain is empty; taking a full backup first");
                self.full_backup().map_err(|err| {
                    XtravaultError::Chain(ChainError::BaseUnavailable(err.to_string()))
                })?
            }
        };
        tracing::debug!(basedir = %basedir.display(), "chain selection");
        let target = self.chain.root().join(backup_dir_name(BackupKind::Incr));
        self.engine.incremental(&target, &basedir, self.run_mode)?;
        if self.run_mode.dry_run {
            println!("dry-run: record {} in {}", target.display(), INCR_LOG);
        } else {
            self.chain.record_incr(&target)?;
            println!("recorded incremental backup {}", target.display());
        }
        Ok(target)
    }

    /// Replays redo logs across the chain so the base directory becomes a
    /// consistent datadir image. Every apply except the last is log-only;
    /// with no incrementals the base itself gets the final apply.
    pub fn prepare(&self) -> Result<PathBuf> {
        let base = match self.chain.last_base()? {
            Some(base) => base,
            None => return Err(ChainError::EmptyChain.into()),
        };
        let incrs = self.chain.incr_entries()?;

        if let Some(marker) = self.read_marker()? {
            if marker.base == base.display().to_string() {
                let applied: Vec<String> =
                    incrs.iter().map(|p| p.display().to_string()).collect();
                if marker.applied == applied {
                    println!("base {} is already prepared; nothing to apply", base.display());
                    return Ok(base);
                }
                return Err(ChainError::AlreadyFinalized(base.display().to_string()).into());
            }
            // marker belongs to a pruned chain; this prepare rewrites it
            tracing::debug!(marker_base = %marker.base, "ignoring stale prepare marker");
        }

        if incrs.is_empty() {
            self.engine.apply_log(
                &base,
                ApplyOptions {
                    log_only: false,
                    incremental: None,
                },
                self.run_mode,
            )?;
        } else {
            self.engine.apply_log(
                &base,
                ApplyOptions {
                    log_only: true,
                    incremental: None,
                },
                self.run_mode,
            )?;
            if let Some((last, rest)) = incrs.split_last() {
                for incr in rest {
                    self.engine.apply_log(
                        &base,
                        ApplyOptions {
                            log_only: true,
                            incremental: Some(incr),
                        },
                        self.run_mode,
                    )?;
                }
                self.engine.apply_log(
                    &base,
                    ApplyOptions {
                        log_only: false,
                        incremental: Some(last),
                    },
                    self.run_mode,
                )?;
            }
        }

        if self.run_mode.dry_run {
            println!("dry-run: write {}", self.chain.marker_path().display());
        } else {
            self.write_marker(&base, &incrs)?;
        }
        println!("prepared base {}", base.display());
        Ok(base)
    }

    fn read_marker(&self) -> Result<Option<PrepareMarker>> {
        let path = self.chain.marker_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let marker: PrepareMarker = serde_yaml::from_str(&contents)
            .map_err(|e| XtravaultError::message(format!("parse {}: {}", path.display(), e)))?;
        if marker.version != MARKER_VERSION {
            return Err(XtravaultError::message(format!(
                "unsupported prepare marker version {} in {}",
                marker.version,
                path.display()
            )));
        }
        Ok(Some(marker))
    }

    fn write_marker(&self, base: &Path, incrs: &[PathBuf]) -> Result<()> {
        let marker = PrepareMarker {
            version: MARKER_VERSION,
            base: base.display().to_string(),
            applied: incrs.iter().map(|p| p.display().to_string()).collect(),
            finished: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        };
        let data = serde_yaml::to_string(&marker)
            .map_err(|e| XtravaultError::message(format!("encode prepare marker: {}", e)))?;
        fs::write(self.chain.marker_path(), data)?;
        Ok(())
    }
}

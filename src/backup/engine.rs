use std::path::Path;
use std::process::Command;

use crate::error::{CommandError, Result};
use crate::types::{Credentials, RunMode};
use crate::util::command::run_captured;

pub const ENGINE_PROGRAM: &str = "xtrabackup";

#[derive(Debug, Clone, Copy)]
pub struct ApplyOptions<'a> {
    /// Replays committed transactions only, leaving the redo log open for
    /// further incrementals. The last apply of a chain clears this.
    pub log_only: bool,
    pub incremental: Option<&'a Path>,
}

/// The engine invocations the chain needs. One production implementation
/// shells out to xtrabackup; tests substitute a recording fake.
pub trait BackupEngine {
    fn backup(&self, target: &Path, run_mode: RunMode) -> Result<()>;
    fn incremental(&self, target: &Path, basedir: &Path, run_mode: RunMode) -> Result<()>;
    fn apply_log(&self, target: &Path, opts: ApplyOptions<'_>, run_mode: RunMode) -> Result<()>;
}

impl<T: BackupEngine + ?Sized> BackupEngine for &T {
    fn backup(&self, target: &Path, run_mode: RunMode) -> Result<()> {
        (**self).backup(target, run_mode)
    }

    fn incremental(&self, target: &Path, basedir: &Path, run_mode: RunMode) -> Result<()> {
        (**self).incremental(target, basedir, run_mode)
    }

    fn apply_log(&self, target: &Path, opts: ApplyOptions<'_>, run_mode: RunMode) -> Result<()> {
        (**self).apply_log(target, opts, run_mode)
    }
}

pub struct Xtrabackup {
    credentials: Credentials,
}

impl Xtrabackup {
    pub fn new(credentials: Credentials) -> Self {
        Xtrabackup { credentials }
    }
}

struct FullBackupCmd<'a> {
    credentials: &'a Credentials,
    target: &'a Path,
}

struct IncrBackupCmd<'a> {
    credentials: &'a Credentials,
    target: &'a Path,
    basedir: &'a Path,
}

struct ApplyLogCmd<'a> {
    target: &'a Path,
    opts: ApplyOptions<'a>,
}

fn credential_args(cmd: &mut Command, credentials: &Credentials) {
    cmd.arg(format!("--user={}", credentials.user));
    if let Some(password) = &credentials.password {
        cmd.arg(format!("--password={}", password));
    }
}

impl From<FullBackupCmd<'_>> for Command {
    fn from(c: FullBackupCmd<'_>) -> Self {
        let mut cmd = Command::new(ENGINE_PROGRAM);
        credential_args(&mut cmd, c.credentials);
        cmd.arg("--backup");
        cmd.arg(format!("--target-dir={}", c.target.display()));
        cmd
    }
}

impl From<IncrBackupCmd<'_>> for Command {
    fn from(c: IncrBackupCmd<'_>) -> Self {
        let mut cmd = Command::new(ENGINE_PROGRAM);
        credential_args(&mut cmd, c.credentials);
        cmd.arg("--backup");
        cmd.arg(format!("--target-dir={}", c.target.display()));
        cmd.arg(format!("--incremental-basedir={}", c.basedir.display()));
        cmd
    }
}

impl From<ApplyLogCmd<'_>> for Command {
    fn from(c: ApplyLogCmd<'_>) -> Self {
        let mut cmd = Command::new(ENGINE_PROGRAM);
        cmd.arg("--prepare");
        if c.opts.log_only {
            cmd.arg("--apply-log-only");
        }
        cmd.arg(format!("--target-dir={}", c.target.display()));
        if let Some(incremental) = c.opts.incremental {
            cmd.arg(format!("--incremental-dir={}", incremental.display()));
        }
        cmd
    }
}

fn run_engine(mut cmd: Command, run_mode: RunMode) -> Result<()> {
    let code = run_captured(&mut cmd, run_mode)?;
    if code != 0 {
        return Err(CommandError::Failed {
            program: ENGINE_PROGRAM.to_string(),
            code,
        }
        .into());
    }
    Ok(())
}

impl BackupEngine for Xtrabackup {
    fn backup(&self, target: &Path, run_mode: RunMode) -> Result<()> {
        run_engine(
            FullBackupCmd {
                credentials: &self.credentials,
                target,
            }
            .into(),
            run_mode,
        )
    }

    fn incremental(&self, target: &Path, basedir: &Path, run_mode: RunMode) -> Result<()> {
        run_engine(
            IncrBackupCmd {
                credentials: &self.credentials,
                target,
                basedir,
            }
            .into(),
            run_mode,
        )
    }

    fn apply_log(&self, target: &Path, opts: ApplyOptions<'_>, run_mode: RunMode) -> Result<()> {
        run_engine(ApplyLogCmd { target, opts }.into(), run_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    fn creds(password: Option<&str>) -> Credentials {
        Credentials {
            user: "root".to_string(),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn full_backup_command_line() {
        let creds = creds(Some("secret"));
        let cmd: Command = FullBackupCmd {
            credentials: &creds,
            target: Path::new("/mysql_bak/2024-01-01-00-00-00-base"),
        }
        .into();
        assert_eq!(cmd.get_program(), ENGINE_PROGRAM);
        assert_eq!(
            argv(&cmd),
            vec![
                "--user=root",
                "--password=secret",
                "--backup",
                "--target-dir=/mysql_bak/2024-01-01-00-00-00-base",
            ]
        );
    }

    #[test]
    fn password_flag_is_omitted_without_password() {
        let creds = creds(None);
        let cmd: Command = FullBackupCmd {
            credentials: &creds,
            target: Path::new("/b/t-base"),
        }
        .into();
        assert!(!argv(&cmd).iter().any(|a| a.starts_with("--password")));
    }

    #[test]
    fn incremental_names_its_basedir() {
        let creds = creds(Some("secret"));
        let cmd: Command = IncrBackupCmd {
            credentials: &creds,
            target: Path::new("/b/t-inc"),
            basedir: Path::new("/b/prev-inc"),
        }
        .into();
        assert_eq!(
            argv(&cmd),
            vec![
                "--user=root",
                "--password=secret",
                "--backup",
                "--target-dir=/b/t-inc",
                "--incremental-basedir=/b/prev-inc",
            ]
        );
    }

    #[test]
    fn log_only_apply_keeps_redo_open() {
        let cmd: Command = ApplyLogCmd {
            target: Path::new("/b/t-base"),
            opts: ApplyOptions {
                log_only: true,
                incremental: None,
            },
        }
        .into();
        assert_eq!(
            argv(&cmd),
            vec!["--prepare", "--apply-log-only", "--target-dir=/b/t-base"]
        );
    }

    #[test]
    fn final_apply_merges_an_incremental() {
        let cmd: Command = ApplyLogCmd {
            target: Path::new("/b/t-base"),
            opts: ApplyOptions {
                log_only: false,
                incremental: Some(Path::new("/b/t-inc")),
            },
        }
        .into();
        assert_eq!(
            argv(&cmd),
            vec![
                "--prepare",
                "--target-dir=/b/t-base",
                "--incremental-dir=/b/t-inc",
            ]
        );
    }
}

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::Result;
use crate::types::RunMode;
use crate::util::command::run_command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncDest {
    Local(PathBuf),
    Remote {
        user: String,
        host: String,
        dir: PathBuf,
    },
}

impl SyncDest {
    pub fn argument(&self) -> String {
        match self {
            SyncDest::Local(dir) => dir.display().to_string(),
            SyncDest::Remote { user, host, dir } => {
                format!("{}@{}:{}", user, host, dir.display())
            }
        }
    }
}

/// Copies a prepared base into a datadir. Tests substitute a recording
/// fake; production goes through rsync.
pub trait FileSync {
    fn sync(&self, source: &Path, dest: &SyncDest, run_mode: RunMode) -> Result<i32>;
}

pub struct Rsync;

impl Rsync {
    fn build(source: &Path, dest: &SyncDest) -> Command {
        let mut cmd = Command::new("rsync");
        cmd.arg("-avrP");
        // trailing slash copies the directory contents, not the directory;
        // no --delete flags, files already in the datadir are left in place
        cmd.arg(format!("{}/", source.display()));
        cmd.arg(dest.argument());
        cmd
    }
}

impl FileSync for Rsync {
    fn sync(&self, source: &Path, dest: &SyncDest, run_mode: RunMode) -> Result<i32> {
        run_command(&mut Rsync::build(source, dest), run_mode)
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

    #[test]
    fn local_sync_command_line() {
        let dest = SyncDest::Local(PathBuf::from("/var/lib/mysql"));
        let cmd = Rsync::build(Path::new("/mysql_bak/2024-01-01-00-00-00-base"), &dest);
        assert_eq!(cmd.get_program(), "rsync");
        assert_eq!(
            argv(&cmd),
            vec![
                "-avrP",
                "/mysql_bak/2024-01-01-00-00-00-base/",
                "/var/lib/mysql",
            ]
        );
    }

    #[test]
    fn remote_dest_uses_scp_style_address() {
        let dest = SyncDest::Remote {
            user: "root".to_string(),
            host: "db2".to_string(),
            dir: PathBuf::from("/var/lib/mysql"),
        };
        assert_eq!(dest.argument(), "root@db2:/var/lib/mysql");
    }

    #[test]
    fn source_always_carries_trailing_slash() {
        let dest = SyncDest::Local(PathBuf::from("/var/lib/mysql"));
        let cmd = Rsync::build(Path::new("/b/base"), &dest);
        assert_eq!(argv(&cmd)[1], "/b/base/");
    }

    #[test]
    fn no_delete_flags_ever() {
        let dest = SyncDest::Local(PathBuf::from("/var/lib/mysql"));
        let cmd = Rsync::build(Path::new("/b/base"), &dest);
        assert!(!argv(&cmd).iter().any(|a| a.contains("--delete")));
    }
}

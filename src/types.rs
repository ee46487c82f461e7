use clap::ValueEnum;

use crate::error::{Result, XtravaultError};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunMode {
    pub dry_run: bool,
    pub safe_mode: bool,
    pub verbose: bool,
}

/// The two links a chain is made of. `Base` starts a fresh chain,
/// `Incr` extends the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackupKind {
    Base,
    Incr,
}

impl BackupKind {
    /// Suffix of the on-disk directory name. Kept short for `Incr` to stay
    /// compatible with chains written by earlier deployments.
    pub fn dir_suffix(&self) -> &'static str {
        match self {
            BackupKind::Base => "base",
            BackupKind::Incr => "inc",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackupKind::Base => "base",
            BackupKind::Incr => "incr",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    /// None means the engine authenticates without a password flag,
    /// e.g. over the local socket.
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreTarget {
    Local,
    Remote { user: String, host: String },
}

impl RestoreTarget {
    /// A complete user/host pair selects the remote target even when
    /// --local is also set; --local alone selects this host; anything
    /// else is a usage error caught before any service is touched.
    pub fn resolve(local: bool, user: Option<&str>, host: Option<&str>) -> Result<Self> {
        match (user, host) {
            (Some(user), Some(host)) => Ok(RestoreTarget::Remote {
                user: user.to_string(),
                host: host.to_string(),
            }),
            _ if local => Ok(RestoreTarget::Local),
            _ => Err(XtravaultError::MissingArguments),
        }
    }

    pub fn label(&self) -> String {
        match self {
            RestoreTarget::Local => "local host".to_string(),
            RestoreTarget::Remote { user, host } => format!("{}@{}", user, host),
        }
    }
}

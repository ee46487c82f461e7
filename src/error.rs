use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XtravaultError {
    #[error("{0}")]
    Message(String),
    #[error("{0}")]
    Chain(ChainError),
    #[error("{0}")]
    Command(CommandError),
    #[error("{0}")]
    Config(ConfigError),
    #[error("missing --target-user/--target-host for remote restore (pass --local for a local restore)")]
    MissingArguments,
    #[error("xtravault is already running (lock {0})")]
    AlreadyRunning(String),
    #[error("{0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("backup chain is empty; take a full backup first")]
    EmptyChain,
    #[error("implicit full backup failed, chain is still empty: {0}")]
    BaseUnavailable(String),
    #[error("base {0} is already finalized; take a fresh full backup before preparing again")]
    AlreadyFinalized(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{program} exited with code {code}")]
    Failed { program: String, code: i32 },
    #[error("{program}: {source}")]
    Spawn { program: String, source: io::Error },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse config: {0}")]
    Parse(String),
    #[error("{0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, XtravaultError>;

impl XtravaultError {
    pub fn message(msg: impl Into<String>) -> Self {
        XtravaultError::Message(msg.into())
    }
}

impl From<ChainError> for XtravaultError {
    fn from(err: ChainError) -> Self {
        XtravaultError::Chain(err)
    }
}

impl From<CommandError> for XtravaultError {
    fn from(err: CommandError) -> Self {
        XtravaultError::Command(err)
    }
}

impl From<ConfigError> for XtravaultError {
    fn from(err: ConfigError) -> Self {
        XtravaultError::Config(err)
    }
}

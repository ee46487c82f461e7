use std::process::Command;

use crate::error::Result;
use crate::types::RunMode;
use crate::util::command::run_command;

/// Where restore-side commands (service control, chown) execute. Local
/// restores run them directly; remote restores wrap them in ssh.
pub trait CommandChannel {
    fn label(&self) -> String;
    fn run(&self, program: &str, args: &[&str], run_mode: RunMode) -> Result<i32>;
}

pub struct LocalChannel;

impl CommandChannel for LocalChannel {
    fn label(&self) -> String {
        "local host".to_string()
    }

    fn run(&self, program: &str, args: &[&str], run_mode: RunMode) -> Result<i32> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        run_command(&mut cmd, run_mode)
    }
}

pub struct SshChannel {
    pub user: String,
    pub host: String,
}

impl SshChannel {
    fn destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// The remote side gets the whole command as one shell line;
    /// key-based trust to the target is assumed.
    fn remote_line(program: &str, args: &[&str]) -> String {
        let mut line = String::from(program);
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl CommandChannel for SshChannel {
    fn label(&self) -> String {
        self.destination()
    }

    fn run(&self, program: &str, args: &[&str], run_mode: RunMode) -> Result<i32> {
        let mut cmd = Command::new("ssh");
        cmd.arg(self.destination());
        cmd.arg(SshChannel::remote_line(program, args));
        run_command(&mut cmd, run_mode)
    }
}

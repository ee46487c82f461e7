use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

use crate::types::BackupKind;

#[derive(Parser, Debug)]
#[command(name = "xtravault", version, about = "MySQL backup chains on top of xtrabackup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true)]
    pub dry_run: bool,
    #[arg(long, global = true)]
    pub safe: bool,
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database user handed to xtrabackup
    #[arg(long, global = true)]
    pub user: Option<String>,
    /// Database password; omit to let xtrabackup use socket auth
    #[arg(long, global = true)]
    pub password: Option<String>,
    /// Backup root holding the chain and its logs
    #[arg(long, global = true, alias = "target_dir")]
    pub target_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Take a backup and record it in the chain
    Backup(BackupArgs),
    /// Replay logs across the chain so the base is restorable
    Prepare,
    /// Prepare, then push the base into a MySQL datadir and restart it
    Restore(RestoreArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BackupArgs {
    /// base starts a fresh chain, incr extends the current one
    #[arg(long = "type", value_enum)]
    pub kind: BackupKind,
}

#[derive(Args, Debug, Clone)]
pub struct RestoreArgs {
    /// ssh user on the restore target
    #[arg(long, alias = "target_user")]
    pub target_user: Option<String>,
    /// Host to restore to; with --target-user this selects a remote restore
    #[arg(long, alias = "target_host")]
    pub target_host: Option<String>,
    /// Restore into this host's datadir
    #[arg(
        long,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub local: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(argv.iter().copied()).expect("parse")
    }

    #[test]
    fn backup_requires_a_type() {
        assert!(Cli::try_parse_from(["xtravault", "backup"]).is_err());
        let cli = parse(&["xtravault", "backup", "--type", "incr"]);
        match cli.command {
            Command::Backup(args) => assert_eq!(args.kind, BackupKind::Incr),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(Cli::try_parse_from(["xtravault", "backup", "--type", "differential"]).is_err());
    }

    #[test]
    fn credentials_and_root_are_global() {
        let cli = parse(&[
            "xtravault",
            "backup",
            "--type=base",
            "--user=backup",
            "--password=secret",
            "--target-dir=/srv/bak",
        ]);
        assert_eq!(cli.user.as_deref(), Some("backup"));
        assert_eq!(cli.password.as_deref(), Some("secret"));
        assert_eq!(cli.target_dir, Some(PathBuf::from("/srv/bak")));
    }

    #[test]
    fn underscore_spellings_still_work() {
        let cli = parse(&["xtravault", "backup", "--type=base", "--target_dir=/b"]);
        assert_eq!(cli.target_dir, Some(PathBuf::from("/b")));

        let cli = parse(&[
            "xtravault",
            "restore",
            "--target_user=root",
            "--target_host=db2",
        ]);
        match cli.command {
            Command::Restore(args) => {
                assert_eq!(args.target_user.as_deref(), Some("root"));
                assert_eq!(args.target_host.as_deref(), Some("db2"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn local_accepts_flag_and_boolish_values() {
        let local = |argv: &[&str]| match parse(argv).command {
            Command::Restore(args) => args.local,
            other => panic!("unexpected command {:?}", other),
        };
        assert!(!local(&["xtravault", "restore"]));
        assert!(local(&["xtravault", "restore", "--local"]));
        assert!(local(&["xtravault", "restore", "--local=1"]));
        assert!(local(&["xtravault", "restore", "--local=true"]));
        assert!(!local(&["xtravault", "restore", "--local=0"]));
    }

    #[test]
    fn run_mode_flags_apply_to_any_subcommand() {
        let cli = parse(&["xtravault", "prepare", "--dry-run", "-v", "--safe"]);
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert!(cli.safe);
        assert!(matches!(cli.command, Command::Prepare));
    }
}

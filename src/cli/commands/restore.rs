use chrono::Local;

use crate::backup::engine::Xtrabackup;
use crate::backup::ChainManager;
use crate::cli::args::RestoreArgs;
use crate::config::model::RuntimeConfig;
use crate::error::Result;
use crate::restore::exec::{CommandChannel, LocalChannel, SshChannel};
use crate::restore::sync::{Rsync, SyncDest};
use crate::restore::{run_restore, RestorePlan};
use crate::types::{RestoreTarget, RunMode};
use crate::util::lock::acquire_root_lock;
use crate::util::paths::ensure_root;

pub fn run_restore_command(
    cfg: &RuntimeConfig,
    args: &RestoreArgs,
    run_mode: RunMode,
) -> Result<()> {
    println!("{}", Local::now().format("%d-%m-%Y %H:%M"));

    // the target must be settled before anything stops a database
    let target = resolve_target(cfg, args)?;
    if run_mode.verbose {
        println!("restore target: {}", target.label());
    }

    ensure_root(&cfg.backup_root, run_mode)?;
    let _lock = acquire_root_lock(&cfg.backup_root, run_mode)?;

    let engine = Xtrabackup::new(cfg.credentials.clone());
    let manager = ChainManager::new(&cfg.backup_root, engine, run_mode);
    let base = manager.prepare()?;

    let channel: Box<dyn CommandChannel> = match &target {
        RestoreTarget::Local => Box::new(LocalChannel),
        RestoreTarget::Remote { user, host } => Box::new(SshChannel {
            user: user.clone(),
            host: host.clone(),
        }),
    };
    let dest = match &target {
        RestoreTarget::Local => SyncDest::Local(cfg.data_dir.clone()),
        RestoreTarget::Remote { user, host } => SyncDest::Remote {
            user: user.clone(),
            host: host.clone(),
            dir: cfg.data_dir.clone(),
        },
    };
    let plan = RestorePlan {
        base: &base,
        data_dir: &cfg.data_dir,
        service: &cfg.service,
        owner_user: &cfg.owner_user,
        owner_group: &cfg.owner_group,
    };
    run_restore(&plan, &dest, channel.as_ref(), &Rsync, run_mode)?;

    println!("{}", Local::now().format("%d-%m-%Y %H:%M"));
    Ok(())
}

/// Flags win; a configured default target fills in only when --local was
/// not given, so `restore --local` on a box with a configured standby
/// still restores here.
fn resolve_target(cfg: &RuntimeConfig, args: &RestoreArgs) -> Result<RestoreTarget> {
    let (user, host) = if args.local {
        (args.target_user.clone(), args.target_host.clone())
    } else {
        (
            args.target_user.clone().or_else(|| cfg.target_user.clone()),
            args.target_host.clone().or_else(|| cfg.target_host.clone()),
        )
    };
    RestoreTarget::resolve(args.local, user.as_deref(), host.as_deref())
}

//! Pushing a prepared base into a live datadir.
//!
//! The sequence is stop, copy, chown, restart. Once the service is
//! stopped, a failure in any later step leaves it stopped on purpose: a
//! half-copied datadir must not come back up, and the operator message
//! says exactly that.

use std::path::Path;

use crate::error::{CommandError, Result};
use crate::types::RunMode;

pub mod exec;
pub mod sync;

use exec::CommandChannel;
use sync::{FileSync, SyncDest};

pub struct RestorePlan<'a> {
    pub base: &'a Path,
    pub data_dir: &'a Path,
    pub service: &'a str,
    pub owner_user: &'a str,
    pub owner_group: &'a str,
}

pub fn run_restore(
    plan: &RestorePlan<'_>,
    dest: &SyncDest,
    channel: &dyn CommandChannel,
    sync: &dyn FileSync,
    run_mode: RunMode,
) -> Result<()> {
    println!("restoring {} to {}", plan.base.display(), channel.label());

    channel_checked(channel, "service", &[plan.service, "stop"], run_mode)?;

    if let Err(err) = copy_and_restart(plan, dest, channel, sync, run_mode) {
        tracing::warn!("restore aborted on {}; service left stopped", channel.label());
        println!(
            "restore did not complete; service {} is left stopped on {}",
            plan.service,
            channel.label()
        );
        return Err(err);
    }
    Ok(())
}

fn copy_and_restart(
    plan: &RestorePlan<'_>,
    dest: &SyncDest,
    channel: &dyn CommandChannel,
    sync: &dyn FileSync,
    run_mode: RunMode,
) -> Result<()> {
    let code = sync.sync(plan.base, dest, run_mode)?;
    if code != 0 {
        return Err(CommandError::Failed {
            program: "rsync".to_string(),
            code,
        }
        .into());
    }

    let owner = format!("{}:{}", plan.owner_user, plan.owner_group);
    let data_dir = plan.data_dir.display().to_string();
    channel_checked(channel, "chown", &["-R", &owner, &data_dir], run_mode)?;
    channel_checked(channel, "service", &[plan.service, "restart"], run_mode)?;

    println!(
        "restore finished; service {} restarted on {}",
        plan.service,
        channel.label()
    );
    Ok(())
}

fn channel_checked(
    channel: &dyn CommandChannel,
    program: &str,
    args: &[&str],
    run_mode: RunMode,
) -> Result<()> {
    let code = channel.run(program, args, run_mode)?;
    if code != 0 {
        return Err(CommandError::Failed {
            program: program.to_string(),
            code,
        }
        .into());
    }
    Ok(())
}

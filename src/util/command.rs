use std::process::Command;

use crate::error::{CommandError, Result};
use crate::types::RunMode;

pub fn maybe_print_command(cmd: &Command, run_mode: RunMode) {
    if !run_mode.dry_run && !run_mode.verbose {
        return;
    }
    let program = cmd.get_program().to_string_lossy();
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().to_string())
        .collect();
    println!("{} {}", program, args.join(" "));
}

fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().to_string()
}

pub fn run_command(cmd: &mut Command, run_mode: RunMode) -> Result<i32> {
    maybe_print_command(cmd, run_mode);
    if run_mode.dry_run {
        return Ok(0);
    }
    let status = cmd.status().map_err(|e| CommandError::Spawn {
        program: program_name(cmd),
        source: e,
    })?;
    Ok(status.code().unwrap_or(1))
}

/// xtrabackup writes its progress to stderr; capture both streams and
/// relay them so the operator still sees the engine output.
pub fn run_captured(cmd: &mut Command, run_mode: RunMode) -> Result<i32> {
    maybe_print_command(cmd, run_mode);
    if run_mode.dry_run {
        return Ok(0);
    }
    let output = cmd.output().map_err(|e| CommandError::Spawn {
        program: program_name(cmd),
        source: e,
    })?;
    print!("{}", String::from_utf8_lossy(&output.stdout));
    print!("{}", String::from_utf8_lossy(&output.stderr));
    Ok(output.status.code().unwrap_or(1))
}

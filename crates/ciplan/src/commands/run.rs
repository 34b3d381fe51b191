use std::path::Path;
use std::process::Command;

use tracing::info;

use super::{RunArgs, baseline, compute_plan};
use crate::error::{CliError, Result};

pub(crate) fn run(args: &RunArgs, start_path: &Path) -> Result<()> {
    let base = baseline(args.base.as_deref(), args.merge_base.as_deref(), args.all);
    let planned = compute_plan(start_path, base, args.provenance.resolve())?;

    for warning in &planned.decision.warnings {
        eprintln!("warning: {warning}");
    }

    for surface in &planned.decision.surfaces {
        if !surface.enabled {
            continue;
        }

        let Some(command) = planned.config.command_for(&surface.surface) else {
            println!("skipped {}: no command configured", surface.surface);
            continue;
        };

        println!("running {}: {command}", surface.surface);
        if args.dry_run {
            continue;
        }

        info!(surface = %surface.surface, command, "executing surface command");
        let status = shell(command).current_dir(&planned.root).status()?;
        if !status.success() {
            return Err(CliError::CommandFailed {
                surface: surface.surface.to_string(),
                code: status.code().unwrap_or(-1),
            });
        }
    }

    Ok(())
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use sysinfo::{get_current_pid, Signal, System};
use tracing::info;

use super::daemon_path::to_daemon_path;

/// Location of the reminder daemon binary.
pub fn daemon_executable() -> Result<PathBuf> {
    Ok(to_daemon_path(env::current_exe()?))
}

/// Terminates every process started from `name`, except this one. Returns how many were found.
pub fn kill_previous_servers(name: &Path) -> Result<usize> {
    let system = System::new_all();
    let current_id = get_current_pid().map_err(|e| anyhow!("Can't get current pid {e}"))?;
    let mut killed = 0;
    for (pid, process) in system.processes().iter() {
        if *pid == current_id {
            continue;
        }

        if process
            .exe()
            .filter(|v| v.exists())
            .filter(|v| name == *v)
            .is_some()
        {
            info!("Stopping reminder daemon {pid}");
            // This will forcefully terminate the process on Windows. Anything better will require a
            // lot more work.
            if process.kill_with(Signal::Term).is_none() {
                process.kill();
            }
            process.wait();
            killed += 1;
        }
    }
    Ok(killed)
}

/// Shuts down previous reminder daemon and starts a new one for `dir`. The daemon binary detaches
/// by itself, so the launcher process exits right away.
pub fn restart_server(dir: &Path) -> Result<()> {
    let daemon = daemon_executable()?;
    kill_previous_servers(&daemon)?;

    let status = std::process::Command::new(&daemon)
        .arg("--dir")
        .arg(dir)
        .status()
        .map_err(|e| anyhow!("Failed to launch {daemon:?}: {e}"))?;

    if !status.success() {
        return Err(anyhow!("Reminder daemon exited with {status}"));
    }
    Ok(())
}

//! Process primitives: shell spawn, forced termination, stdin close.

use std::process::{Child, Command, Stdio};

use crate::utils::config::{DEFAULT_SHELL, EnvVars};

/// Build a shell invocation for `command` with stdout piped and stdin detached.
/// When `environ` is set, the child sees exactly those variables and nothing inherited.
pub fn shell_command(command: &str, environ: Option<&[(String, String)]>) -> Command {
    let shell = std::env::var(EnvVars::SHELL)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string());
    let mut cmd = Command::new(shell);
    cmd.arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    if let Some(vars) = environ {
        cmd.env_clear();
        cmd.envs(vars.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    set_process_group(&mut cmd);
    cmd
}

#[cfg(unix)]
fn set_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn set_process_group(_cmd: &mut Command) {}

/// Forcibly terminate `child` and everything in its process group.
/// No-op once the child has been reaped.
pub fn kill_command(child: &mut Child) {
    if matches!(child.try_wait(), Ok(Some(_))) {
        return;
    }
    kill_process_group(child);
    if let Err(e) = child.kill() {
        log::debug!("kill pid {}: {}", child.id(), e);
    }
}

#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        log::debug!(
            "kill process group {}: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

/// Close the process's stdin so a blocked read returns.
#[cfg(unix)]
pub fn close_stdin() {
    if unsafe { libc::close(libc::STDIN_FILENO) } != 0 {
        log::debug!("close stdin: {}", std::io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
pub fn close_stdin() {
    log::debug!("closing stdin is not supported on this platform");
}

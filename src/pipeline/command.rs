//! Command driver: run a shell command and split its stdout into records.

use anyhow::{Context, anyhow, bail};
use log::debug;
use std::process::ExitStatus;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::Result;
use crate::engine::slab::Record;
use crate::engine::splitter::Splitter;
use crate::pipeline::context::{ReaderState, lock_state};
use crate::utils::process::shell_command;

/// Spawn `command`, stream its output into `on_record`, and wait for it.
///
/// The child and the command text live in `state` while the command runs so
/// that `terminate` can kill it and a failure can be reported for retry.
/// Fails on spawn errors and non-zero exit. Returns early without spawning if
/// the pass was already cancelled.
pub fn read_from_command<F>(
    state: &Mutex<ReaderState>,
    command: &str,
    environ: Option<&[(String, String)]>,
    splitter: &mut Splitter,
    on_record: F,
    poll: Duration,
) -> Result<()>
where
    F: FnMut(Record),
{
    let stdout = {
        let mut st = lock_state(state);
        st.command = Some(command.to_string());
        if st.killed {
            debug!("command: cancelled before start");
            return Ok(());
        }
        let mut child = shell_command(command, environ)
            .spawn()
            .with_context(|| format!("failed to start command: {command}"))?;
        let stdout = child.stdout.take();
        st.child = Some(child);
        stdout.ok_or_else(|| anyhow!("command stdout not captured: {command}"))?
    };

    match splitter.feed(stdout, on_record) {
        Ok(n) => debug!("command: {} records", n),
        Err(e) => debug!("command: output stopped: {}", e),
    }

    let status = wait_for_exit(state, poll)
        .with_context(|| format!("failed to wait for command: {command}"))?;
    if !status.success() {
        bail!("command exited with {status}: {command}");
    }
    Ok(())
}

/// Poll the child in `state` until it exits, then drop the handle. The lock is
/// released between polls so `terminate` can still reach the child.
fn wait_for_exit(state: &Mutex<ReaderState>, poll: Duration) -> Result<ExitStatus> {
    loop {
        {
            let mut st = lock_state(state);
            let child = st
                .child
                .as_mut()
                .ok_or_else(|| anyhow!("command handle missing"))?;
            if let Some(status) = child.try_wait()? {
                st.child = None;
                return Ok(status);
            }
        }
        thread::sleep(poll);
    }
}

//! Child process lifecycle: spawn, line-oriented writes, teardown.
//!
//! The child is spawned with all three stdio streams piped (not a PTY) so
//! stdout and stderr stay distinguishable and no terminal emulation is
//! involved. Reading happens in the manager's pump tasks via the taken
//! stream handles; this type owns spawning, input, and termination.

use std::process::Stdio;
use std::time::Duration;
use tabsh_core::{SpawnConfig, TabshError, TabshResult};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// A managed child process with piped stdio.
pub struct ProcessHandle {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    write_timeout: Duration,
    exited: bool,
}

impl ProcessHandle {
    /// Spawn the configured executable with stdin/stdout/stderr piped.
    pub fn spawn(config: &SpawnConfig) -> TabshResult<Self> {
        if !config.workdir.is_dir() {
            return Err(TabshError::WorkingDirInvalid(
                config.workdir.display().to_string(),
            ));
        }

        let mut child = Command::new(&config.executable)
            .args(&config.args)
            .current_dir(&config.workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| classify_spawn_error(&config.executable, e))?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        info!(
            executable = %config.executable,
            pid = child.id().unwrap_or(0),
            "child spawned"
        );

        Ok(Self {
            child,
            stdin,
            stdout,
            stderr,
            write_timeout: config.write_timeout(),
            exited: false,
        })
    }

    /// Send one line of input to the child, bounded by the write timeout.
    ///
    /// A trailing newline is appended. Writing to a child that has exited
    /// fails with `ProcessNotRunning`; a stalled pipe fails with
    /// `WriteTimeout` and leaves the handle usable. A timed-out write may
    /// already have placed a prefix of the line in the pipe — retrying
    /// resubmits the whole line, so treat a timeout as "possibly partially
    /// delivered", not as dropped.
    pub async fn write_line(&mut self, text: &str) -> TabshResult<()> {
        if self.exited {
            return Err(TabshError::ProcessNotRunning);
        }
        let stdin = self.stdin.as_mut().ok_or(TabshError::ProcessNotRunning)?;

        let mut buf = Vec::with_capacity(text.len() + 1);
        buf.extend_from_slice(text.as_bytes());
        buf.push(b'\n');

        let write = async {
            stdin.write_all(&buf).await?;
            stdin.flush().await
        };
        match timeout(self.write_timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("stdin pipe broken, marking child exited");
                self.exited = true;
                Err(TabshError::ProcessNotRunning)
            }
            Ok(Err(e)) => Err(TabshError::Io(e)),
            Err(_) => Err(TabshError::WriteTimeout),
        }
    }

    /// Take the stdout pipe for a reader task. Returns `None` after the
    /// first call.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    /// Take the stderr pipe for a reader task. Returns `None` after the
    /// first call.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Whether the child is still running. Reaps the exit status if it has
    /// already ended.
    pub fn is_running(&mut self) -> bool {
        if self.exited {
            return false;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!(code = status.code().unwrap_or(-1), "child exited");
                self.exited = true;
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "try_wait failed");
                false
            }
        }
    }

    /// Stop the child: close stdin so it sees end-of-input, wait up to
    /// `grace`, then force-kill. Safe to call more than once.
    pub async fn terminate(&mut self, grace: Duration) -> TabshResult<()> {
        if self.exited {
            return Ok(());
        }
        // Dropping stdin is the graceful stop for a line-driven tool: the
        // child reads EOF and runs its normal exit path.
        self.stdin.take();
        match timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                info!(code = status.code().unwrap_or(-1), "child exited after stdin close");
            }
            Ok(Err(e)) => {
                warn!(error = %e, "wait failed, forcing kill");
                let _ = self.child.start_kill();
            }
            Err(_) => {
                warn!(grace_ms = grace.as_millis() as u64, "grace elapsed, forcing kill");
                self.child.start_kill().map_err(TabshError::Io)?;
                let _ = self.child.wait().await;
            }
        }
        self.exited = true;
        Ok(())
    }

    /// OS process id, if the child has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

/// Map a spawn failure onto the session error taxonomy.
fn classify_spawn_error(executable: &str, err: std::io::Error) -> TabshError {
    match err.kind() {
        std::io::ErrorKind::NotFound => TabshError::ExecutableNotFound(executable.to_string()),
        std::io::ErrorKind::PermissionDenied => {
            TabshError::PermissionDenied(executable.to_string())
        }
        _ => TabshError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabsh_core::SpawnConfig;

    fn config_for(executable: &str, dir: &std::path::Path) -> SpawnConfig {
        SpawnConfig::new(executable, dir)
    }

    #[tokio::test]
    async fn spawn_missing_executable_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProcessHandle::spawn(&config_for("no-such-binary-tabsh", dir.path()))
            .err()
            .unwrap();
        assert!(matches!(err, TabshError::ExecutableNotFound(_)));
    }

    #[tokio::test]
    async fn spawn_invalid_workdir_fails() {
        let err = ProcessHandle::spawn(&config_for("cat", std::path::Path::new("/no/such/dir")))
            .err()
            .unwrap();
        assert!(matches!(err, TabshError::WorkingDirInvalid(_)));
    }

    #[tokio::test]
    async fn write_after_exit_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = ProcessHandle::spawn(&config_for("true", dir.path())).unwrap();
        // Give `true` time to exit and close its end of the stdin pipe.
        tokio::time::sleep(Duration::from_millis(300)).await;
        let err = handle.write_line("hello").await.unwrap_err();
        assert!(matches!(err, TabshError::ProcessNotRunning));
        assert!(!handle.is_running());
    }

    #[tokio::test]
    async fn terminate_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut handle = ProcessHandle::spawn(&config_for("cat", dir.path())).unwrap();
        assert!(handle.is_running());
        handle.terminate(Duration::from_secs(2)).await.unwrap();
        handle.terminate(Duration::from_secs(2)).await.unwrap();
        assert!(!handle.is_running());
    }
}

/// Process spawning, wall-clock enforcement, and group termination
///
/// Every child runs in its own session (setsid before exec) so the wall
/// clock kill reaches the full process tree, not just the direct child.
/// Compiled-language runners fork compilers and helpers; a single-PID
/// signal would leave those running.
use crate::config::types::{Result, SandboxError};
use crate::sandbox::output::{self, CollectedOutput, OutputLimits};
use crossbeam_channel::{bounded, RecvTimeoutError};
use nix::sys::signal::{kill, killpg, Signal};
use nix::unistd::Pid;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const FALLBACK_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Grace period between SIGTERM and SIGKILL on timeout.
const KILL_GRACE: Duration = Duration::from_millis(200);

/// Ceiling on waiting for the kill to be reaped.
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw result of one bounded child run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub exit_code: Option<i32>,
    pub signal: Option<i32>,
    pub output: CollectedOutput,
    pub timed_out: bool,
    pub duration_ms: u64,
}

/// Resolve a runner binary: absolute/relative paths are checked directly,
/// bare names are searched on PATH. Returns `None` when nothing executable
/// is found, which the sandbox maps to `RuntimeUnavailable` without
/// spawning anything.
pub fn resolve_binary(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var("PATH").unwrap_or_else(|_| FALLBACK_PATH.to_string());
    for dir in path_var.split(':').filter(|d| !d.is_empty()) {
        let full = Path::new(dir).join(name);
        if is_executable(&full) {
            return Some(full);
        }
    }
    None
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Spawn `argv` rooted at `workdir` and race it against `wall_limit`.
///
/// On expiry the whole process group is terminated (SIGTERM, short grace,
/// SIGKILL) and whatever output was captured is still returned.
pub fn run_bounded(
    argv: &[String],
    workdir: &Path,
    wall_limit: Duration,
    limits: &OutputLimits,
) -> Result<RunOutcome> {
    if argv.is_empty() {
        return Err(SandboxError::Process("empty command".to_string()));
    }

    let mut command = Command::new(&argv[0]);
    command
        .args(&argv[1..])
        .current_dir(workdir)
        .env_clear()
        .env(
            "PATH",
            std::env::var("PATH").unwrap_or_else(|_| FALLBACK_PATH.to_string()),
        )
        .env("HOME", workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // New session makes the child its own process-group leader, so the
    // timeout path can signal the whole tree at once.
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }

    let start = Instant::now();
    let mut child = command
        .spawn()
        .map_err(|e| SandboxError::Process(format!("failed to spawn {}: {e}", argv[0])))?;
    let pid = child.id() as i32;

    let stdout = child
        .stdout
        .take()
        .map(|s| output::spawn_collector(s, limits.stdout_limit));
    let stderr = child
        .stderr
        .take()
        .map(|s| output::spawn_collector(s, limits.stderr_limit));

    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let _ = tx.send(child.wait());
    });

    let (status, timed_out) = match rx.recv_timeout(wall_limit) {
        Ok(wait_result) => (
            wait_result.map_err(|e| SandboxError::Process(format!("wait failed: {e}")))?,
            false,
        ),
        Err(RecvTimeoutError::Timeout) => {
            terminate_group(pid);
            let status = rx.recv_timeout(REAP_TIMEOUT).map_err(|_| {
                SandboxError::Process(format!("process group {pid} survived SIGKILL"))
            })?;
            (
                status.map_err(|e| SandboxError::Process(format!("wait failed: {e}")))?,
                true,
            )
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(SandboxError::Process(
                "wait thread exited without reporting".to_string(),
            ));
        }
    };

    // Collectors hit EOF once every pipe writer in the group is gone.
    let output = output::finish(stdout, stderr, limits);
    let duration_ms = start.elapsed().as_millis() as u64;

    Ok(RunOutcome {
        exit_code: status.code(),
        signal: status.signal(),
        output,
        timed_out,
        duration_ms,
    })
}

/// SIGTERM the group, allow a short grace, then SIGKILL. Falls back to
/// single-PID signals when the group signal fails (the leader may already
/// be gone).
fn terminate_group(pid: i32) {
    let group = Pid::from_raw(pid);

    if killpg(group, Signal::SIGTERM).is_err() {
        let _ = kill(group, Signal::SIGTERM);
        log::warn!("group SIGTERM failed for {pid}, fell back to single-PID signal");
    }

    thread::sleep(KILL_GRACE);

    if killpg(group, Signal::SIGKILL).is_err() {
        let _ = kill(group, Signal::SIGKILL);
        log::warn!("group SIGKILL failed for {pid}, fell back to single-PID signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_resolve_absolute_binary() {
        assert!(resolve_binary("/bin/sh").is_some());
        assert!(resolve_binary("/bin/definitely-not-a-binary").is_none());
    }

    #[test]
    fn test_resolve_on_path() {
        assert!(resolve_binary("sh").is_some());
        assert!(resolve_binary("definitely-not-a-binary").is_none());
    }

    #[test]
    fn test_run_captures_exit_and_output() {
        let outcome = run_bounded(
            &sh("echo out; echo err >&2; exit 3"),
            Path::new("/tmp"),
            Duration::from_secs(5),
            &OutputLimits::default(),
        )
        .unwrap();
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.output.stdout, "out\n");
        assert_eq!(outcome.output.stderr, "err\n");
        assert!(!outcome.timed_out);
    }

    #[test]
    fn test_timeout_kills_process_tree() {
        let start = Instant::now();
        // The sleep runs as a grandchild; a single-PID kill would miss it.
        let outcome = run_bounded(
            &sh("sh -c 'sleep 30' & wait"),
            Path::new("/tmp"),
            Duration::from_millis(500),
            &OutputLimits::default(),
        )
        .unwrap();
        assert!(outcome.timed_out);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_timeout_preserves_partial_output() {
        let outcome = run_bounded(
            &sh("echo before; sleep 30"),
            Path::new("/tmp"),
            Duration::from_millis(500),
            &OutputLimits::default(),
        )
        .unwrap();
        assert!(outcome.timed_out);
        assert_eq!(outcome.output.stdout, "before\n");
    }

    #[test]
    fn test_spawn_failure_is_error() {
        let result = run_bounded(
            &["/bin/definitely-not-a-binary".to_string()],
            Path::new("/tmp"),
            Duration::from_secs(1),
            &OutputLimits::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_runaway_output_is_bounded() {
        let limits = OutputLimits {
            stdout_limit: 64 * 1024,
            stderr_limit: 1024,
            combined_limit: 64 * 1024,
        };
        let outcome = run_bounded(
            &sh("yes | head -c 1000000"),
            Path::new("/tmp"),
            Duration::from_secs(10),
            &limits,
        )
        .unwrap();
        assert!(outcome.output.truncated);
        assert_eq!(outcome.output.stdout.len(), 64 * 1024);
        assert!(!outcome.timed_out);
    }
}

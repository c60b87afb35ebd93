//! Execution sandbox
//!
//! Runs one approved submission: run-scoped workspace, per-language
//! compile/run stages, bounded output capture, wall-clock kill of the
//! whole process group, and guaranteed workspace deletion on every exit
//! path.

pub mod output;
pub mod runner;
pub mod workspace;

use crate::config::config::SandboxConfig;
use crate::config::types::{ExecutionOutcome, ExecutionStatus, Result, SandboxError, Submission};
use crate::languages::adapter::LanguageAdapter;
use crate::languages::adapter_for;
use crate::observability::audit::events;
use output::OutputLimits;
use regex::Regex;
use workspace::RunWorkspace;

pub struct ExecutionSandbox {
    config: SandboxConfig,
    path_re: Regex,
    ip_re: Regex,
}

impl ExecutionSandbox {
    pub fn new(config: SandboxConfig) -> Result<Self> {
        let path_re = Regex::new(r"(?:/[\w.-]+)+/?")
            .map_err(|e| SandboxError::Config(format!("redaction pattern: {e}")))?;
        let ip_re = Regex::new(r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b")
            .map_err(|e| SandboxError::Config(format!("redaction pattern: {e}")))?;
        Ok(Self {
            config,
            path_re,
            ip_re,
        })
    }

    /// Execute one already-approved submission. Every failure class maps
    /// to a populated outcome status; this never panics the caller and
    /// never leaves a workspace behind.
    pub fn run(&self, submission: &Submission) -> ExecutionOutcome {
        let runner_override = self
            .config
            .runners
            .get(&submission.language)
            .map(String::as_str);
        let adapter = adapter_for(submission.language, runner_override);

        // Fail fast before touching disk when the toolchain is missing.
        for binary in adapter.required_binaries() {
            if runner::resolve_binary(&binary).is_none() {
                events::runtime_missing(submission, &binary);
                return ExecutionOutcome::runtime_unavailable(format!(
                    "required binary not found: {binary}"
                ));
            }
        }

        let mut workspace = match RunWorkspace::create(&self.config.workspace_root) {
            Ok(ws) => ws,
            Err(e) => return ExecutionOutcome::internal_error(e.to_string()),
        };
        let run_id = workspace.run_id().to_string();

        events::execution_start(&run_id, submission);
        let mut outcome = self.run_stages(adapter.as_ref(), submission, &workspace, &run_id);

        if let Err(e) = workspace.cleanup() {
            events::cleanup_failure(&run_id, &e.to_string());
            log::warn!("workspace cleanup failed for run {run_id}: {e}");
        }

        if self.config.redact_output {
            outcome.stdout = self.redact(&outcome.stdout);
            outcome.stderr = self.redact(&outcome.stderr);
        }

        events::execution_end(&run_id, submission, outcome.status, outcome.duration_ms);
        outcome
    }

    fn run_stages(
        &self,
        adapter: &dyn LanguageAdapter,
        submission: &Submission,
        workspace: &RunWorkspace,
        run_id: &str,
    ) -> ExecutionOutcome {
        let source_file = adapter.source_file_name(&submission.source);
        if let Err(e) = workspace.write_source(&source_file, &submission.source) {
            return ExecutionOutcome::internal_error(e.to_string());
        }

        let limits = self.output_limits();
        let mut compile_ms = 0;

        if let Some(compile_cmd) = adapter.compile_command(workspace, &source_file) {
            let compiled = match runner::run_bounded(
                &compile_cmd,
                workspace.dir(),
                self.config.compile_time_limit(),
                &limits,
            ) {
                Ok(run) => run,
                Err(e) => {
                    return ExecutionOutcome::internal_error(format!("compile stage: {e}"))
                }
            };

            if compiled.timed_out {
                events::forced_kill(run_id, submission, self.config.compile_time_limit_ms);
                return timed_out_outcome(compiled);
            }
            if compiled.exit_code != Some(0) {
                // Compiler diagnostics are the user's result, not a
                // sandbox fault.
                return completed_outcome(compiled);
            }
            compile_ms = compiled.duration_ms;
        }

        let run_cmd = adapter.run_command(workspace, &source_file);
        let run = match runner::run_bounded(
            &run_cmd,
            workspace.dir(),
            self.config.wall_time_limit(),
            &limits,
        ) {
            Ok(run) => run,
            Err(e) => return ExecutionOutcome::internal_error(format!("run stage: {e}")),
        };

        let mut outcome = if run.timed_out {
            events::forced_kill(run_id, submission, self.config.wall_time_limit_ms);
            timed_out_outcome(run)
        } else {
            completed_outcome(run)
        };
        outcome.duration_ms += compile_ms;
        outcome
    }

    fn output_limits(&self) -> OutputLimits {
        OutputLimits {
            stdout_limit: self.config.stdout_limit_bytes,
            stderr_limit: self.config.stderr_limit_bytes,
            combined_limit: self.config.combined_limit_bytes,
        }
    }

    /// Strip filesystem paths and IPv4 addresses from captured output.
    fn redact(&self, text: &str) -> String {
        let text = self.path_re.replace_all(text, "[path]");
        self.ip_re.replace_all(&text, "[addr]").into_owned()
    }
}

fn timed_out_outcome(run: runner::RunOutcome) -> ExecutionOutcome {
    ExecutionOutcome {
        status: ExecutionStatus::TimedOut,
        stdout: run.output.stdout,
        stderr: run.output.stderr,
        exit_code: None,
        signal: run.signal,
        duration_ms: run.duration_ms,
        timed_out: true,
        truncated: run.output.truncated,
        violations: Vec::new(),
        error_message: None,
    }
}

fn completed_outcome(run: runner::RunOutcome) -> ExecutionOutcome {
    // Signal-terminated children report the shell convention 128+signal
    // so `exit_code` stays present for every completed run.
    let exit_code = run.exit_code.or(run.signal.map(|s| 128 + s));
    ExecutionOutcome {
        status: ExecutionStatus::Completed,
        stdout: run.output.stdout,
        stderr: run.output.stderr,
        exit_code,
        signal: run.signal,
        duration_ms: run.duration_ms,
        timed_out: false,
        truncated: run.output.truncated,
        violations: Vec::new(),
        error_message: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::Language;

    fn sandbox_with_root(root: &std::path::Path) -> ExecutionSandbox {
        let config = SandboxConfig {
            workspace_root: root.to_path_buf(),
            ..SandboxConfig::default()
        };
        ExecutionSandbox::new(config).unwrap()
    }

    #[test]
    fn test_missing_runtime_fails_fast_without_workspace() {
        let root = std::env::temp_dir().join("codebox_test_sandbox_missing");
        let _ = std::fs::remove_dir_all(&root);
        let config = SandboxConfig {
            workspace_root: root.clone(),
            runners: [(Language::Python, "/nonexistent/python".to_string())]
                .into_iter()
                .collect(),
            ..SandboxConfig::default()
        };
        let sandbox = ExecutionSandbox::new(config).unwrap();
        let outcome = sandbox.run(&Submission::new("print(1)", Language::Python));
        assert_eq!(outcome.status, ExecutionStatus::RuntimeUnavailable);
        // No workspace was ever created.
        assert!(!root.exists());
    }

    #[test]
    fn test_workspace_removed_after_run() {
        let root = std::env::temp_dir().join("codebox_test_sandbox_cleanup");
        let _ = std::fs::remove_dir_all(&root);
        let sandbox = sandbox_with_root(&root);
        let outcome = sandbox.run(&Submission::new("print(\"ok\")", Language::Python));
        if outcome.status == ExecutionStatus::RuntimeUnavailable {
            return; // no interpreter on this host
        }
        let leftover: Vec<_> = std::fs::read_dir(&root)
            .map(|entries| entries.flatten().collect())
            .unwrap_or_default();
        assert!(leftover.is_empty(), "workspace left behind: {leftover:?}");
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn test_redaction_strips_paths_and_addresses() {
        let root = std::env::temp_dir().join("codebox_test_sandbox_redact");
        let sandbox = sandbox_with_root(&root);
        let redacted = sandbox.redact("wrote /etc/passwd from 10.0.0.1 twice");
        assert_eq!(redacted, "wrote [path] from [addr] twice");
        let _ = std::fs::remove_dir_all(&root);
    }
}

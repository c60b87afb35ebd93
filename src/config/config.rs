use crate::config::types::{Language, Result, SandboxError};
/// Configuration loading from config.json
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_wall_time_limit_ms() -> u64 {
    10_000
}

fn default_compile_time_limit_ms() -> u64 {
    30_000
}

fn default_stdout_limit_bytes() -> usize {
    1024 * 1024
}

fn default_stderr_limit_bytes() -> usize {
    256 * 1024
}

fn default_combined_limit_bytes() -> usize {
    1024 * 1024
}

fn default_max_source_bytes() -> usize {
    10_000
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir().join("codebox")
}

/// Sandbox configuration, loadable from a JSON file.
///
/// Deliberately carries no memory or CPU rlimit knobs: the wall-clock
/// timeout and the denylist are the only enforcement layers in this
/// deployment model. Hosts that need hard caps should wrap the runner
/// commands in their own isolation primitives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Base directory for run-scoped workspaces.
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,

    /// Wall-clock limit for the run stage, in milliseconds.
    #[serde(default = "default_wall_time_limit_ms")]
    pub wall_time_limit_ms: u64,

    /// Wall-clock limit for compile stages (Java, C++), in milliseconds.
    #[serde(default = "default_compile_time_limit_ms")]
    pub compile_time_limit_ms: u64,

    #[serde(default = "default_stdout_limit_bytes")]
    pub stdout_limit_bytes: usize,

    #[serde(default = "default_stderr_limit_bytes")]
    pub stderr_limit_bytes: usize,

    #[serde(default = "default_combined_limit_bytes")]
    pub combined_limit_bytes: usize,

    /// Submissions larger than this are blocked by the validator.
    #[serde(default = "default_max_source_bytes")]
    pub max_source_bytes: usize,

    /// Strip filesystem paths and IPv4 addresses from captured output.
    #[serde(default)]
    pub redact_output: bool,

    /// Optional JSON rule table replacing the builtin denylist.
    #[serde(default)]
    pub rules_file: Option<PathBuf>,

    /// Per-language override for the runner entrypoint binary
    /// (e.g. `{"python": "/usr/local/bin/python3.12"}`).
    #[serde(default)]
    pub runners: HashMap<Language, String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
            wall_time_limit_ms: default_wall_time_limit_ms(),
            compile_time_limit_ms: default_compile_time_limit_ms(),
            stdout_limit_bytes: default_stdout_limit_bytes(),
            stderr_limit_bytes: default_stderr_limit_bytes(),
            combined_limit_bytes: default_combined_limit_bytes(),
            max_source_bytes: default_max_source_bytes(),
            redact_output: false,
            rules_file: None,
            runners: HashMap::new(),
        }
    }
}

impl SandboxConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SandboxError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: SandboxConfig = serde_json::from_str(&content).map_err(|e| {
            SandboxError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot work before any run starts.
    pub fn validate(&self) -> Result<()> {
        if self.wall_time_limit_ms == 0 {
            return Err(SandboxError::Config(
                "wall_time_limit_ms must be non-zero".to_string(),
            ));
        }
        if self.compile_time_limit_ms == 0 {
            return Err(SandboxError::Config(
                "compile_time_limit_ms must be non-zero".to_string(),
            ));
        }
        if self.stdout_limit_bytes == 0 || self.combined_limit_bytes == 0 {
            return Err(SandboxError::Config(
                "output limits must be non-zero".to_string(),
            ));
        }
        if self.max_source_bytes == 0 {
            return Err(SandboxError::Config(
                "max_source_bytes must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn wall_time_limit(&self) -> Duration {
        Duration::from_millis(self.wall_time_limit_ms)
    }

    pub fn compile_time_limit(&self) -> Duration {
        Duration::from_millis(self.compile_time_limit_ms)
    }
}

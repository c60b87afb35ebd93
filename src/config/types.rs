/// Core types and structures shared across the codebox system
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Supported submission languages (closed set)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Cpp,
}

impl Language {
    /// Canonical lowercase name, matching the rule table and config keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    /// Parse a language name, accepting the aliases accepted on the CLI.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            "java" => Ok(Language::Java),
            "cpp" | "c++" | "cxx" | "cc" => Ok(Language::Cpp),
            other => Err(SandboxError::Config(format!(
                "unsupported language: {other}"
            ))),
        }
    }

    /// Comment prefix used by the metrics and issue scanners.
    pub fn comment_prefix(&self) -> &'static str {
        match self {
            Language::Python => "#",
            _ => "//",
        }
    }

    pub fn all() -> &'static [Language] {
        &[
            Language::Python,
            Language::JavaScript,
            Language::Java,
            Language::Cpp,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single piece of user code to validate, analyze, or execute.
/// Immutable once constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    pub source: String,
    pub language: Language,
}

impl Submission {
    pub fn new(source: impl Into<String>, language: Language) -> Self {
        Self {
            source: source.into(),
            language,
        }
    }
}

/// Severity of a denylist rule match.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Match rejects the submission before execution.
    Block,
    /// Match is reported but never flips the allow decision.
    Warn,
}

/// One rule match found in a submission.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    /// Human-readable description of the rule that fired.
    pub rule: String,
    /// The text slice that matched.
    pub matched_text: String,
    pub severity: Severity,
}

/// Validator decision for one submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Verdict {
    pub allowed: bool,
    /// All matches, in rule-table order. Warn entries never affect `allowed`.
    pub violations: Vec<Violation>,
}

impl Verdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            violations: Vec::new(),
        }
    }

    pub fn blocking_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Block)
    }
}

/// Status of one execution request. Exactly one holds per outcome.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Process ran to exit; `exit_code` is faithful, non-zero included.
    Completed,
    /// Rejected by the validator; never spawned, never touched disk.
    Blocked,
    /// Killed at the wall-clock limit; partial output is still returned.
    TimedOut,
    /// Required interpreter or compiler missing on the host.
    RuntimeUnavailable,
    /// Workspace I/O or spawn failure inside the sandbox itself.
    InternalError,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Blocked => "blocked",
            ExecutionStatus::TimedOut => "timed_out",
            ExecutionStatus::RuntimeUnavailable => "runtime_unavailable",
            ExecutionStatus::InternalError => "internal_error",
        };
        f.write_str(name)
    }
}

/// Result of one `submit` call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    pub stdout: String,
    pub stderr: String,
    /// Absent when `Blocked` or `TimedOut`.
    pub exit_code: Option<i32>,
    /// Signal that terminated the process, if any.
    pub signal: Option<i32>,
    pub duration_ms: u64,
    pub timed_out: bool,
    /// True when captured output hit a byte cap.
    pub truncated: bool,
    /// Populated only for `Blocked`: the verdict's violations, for display.
    pub violations: Vec<Violation>,
    /// Diagnostic for `InternalError` / `RuntimeUnavailable`.
    pub error_message: Option<String>,
}

impl ExecutionOutcome {
    pub fn blocked(verdict: &Verdict) -> Self {
        Self {
            status: ExecutionStatus::Blocked,
            violations: verdict.violations.clone(),
            ..Self::empty()
        }
    }

    pub fn runtime_unavailable(message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::RuntimeUnavailable,
            error_message: Some(message.into()),
            ..Self::empty()
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::InternalError,
            error_message: Some(message.into()),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            status: ExecutionStatus::InternalError,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            signal: None,
            duration_ms: 0,
            timed_out: false,
            truncated: false,
            violations: Vec::new(),
            error_message: None,
        }
    }
}

/// Source-level counters feeding the quality score.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeMetrics {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    pub function_count: usize,
    pub class_count: usize,
    /// Branching-keyword count; a cheap cyclomatic-complexity proxy.
    pub complexity: usize,
}

/// Result of one `analyze` call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub syntax_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub metrics: CodeMetrics,
    /// 1..=10, deterministic for identical input.
    pub quality_score: i32,
}

/// Error taxonomy for codebox operations
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Runtime not available: {0}")]
    RuntimeMissing(String),

    #[error("Rule table error: {0}")]
    Rule(String),
}

impl From<nix::errno::Errno> for SandboxError {
    fn from(err: nix::errno::Errno) -> Self {
        SandboxError::Process(err.to_string())
    }
}

/// Result type alias for codebox operations
pub type Result<T> = std::result::Result<T, SandboxError>;

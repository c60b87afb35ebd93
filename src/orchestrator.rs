//! Orchestrator
//!
//! The single entry point consumed by outer layers. Owns the compiled
//! rule table, the sandbox, the analysis pipeline, and the execution
//! mutex; constructed once per process and passed by reference, so there
//! is no ambient global state and each call is self-contained.

use crate::analysis::AnalysisPipeline;
use crate::config::config::SandboxConfig;
use crate::config::types::{
    AnalysisReport, ExecutionOutcome, Language, Result, Submission, Verdict,
};
use crate::observability::audit::events;
use crate::rules::RuleTable;
use crate::sandbox::ExecutionSandbox;
use crate::validator::SecurityValidator;
use std::sync::Mutex;

pub struct Orchestrator {
    validator: SecurityValidator,
    sandbox: ExecutionSandbox,
    analysis: AnalysisPipeline,
    /// Serializes executions: at most one sandboxed child at a time,
    /// held across spawn, wait, and cleanup so a slow cleanup can never
    /// race a new spawn.
    exec_lock: Mutex<()>,
}

impl Orchestrator {
    pub fn new(config: SandboxConfig) -> Result<Self> {
        config.validate()?;
        let table = match &config.rules_file {
            Some(path) => RuleTable::load(path)?,
            None => RuleTable::builtin()?,
        };
        let validator = SecurityValidator::new(table, config.max_source_bytes)?;
        let sandbox = ExecutionSandbox::new(config)?;
        let analysis = AnalysisPipeline::new()?;
        Ok(Self {
            validator,
            sandbox,
            analysis,
            exec_lock: Mutex::new(()),
        })
    }

    /// Validate and, if allowed, execute. Blocked submissions return
    /// immediately with the verdict's violations; the sandbox and the
    /// lock are never touched for them.
    pub fn submit(&self, source: &str, language: Language) -> ExecutionOutcome {
        let submission = Submission::new(source, language);
        let verdict = self.validator.check(&submission);
        if !verdict.allowed {
            events::submission_blocked(&submission, verdict.violations.len());
            return ExecutionOutcome::blocked(&verdict);
        }

        // A poisoned lock only records a panic in a previous holder; the
        // guard protects no data, so recover and continue.
        let _guard = self
            .exec_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.sandbox.run(&submission)
    }

    /// Static quality analysis. Unserialized: pure computation, safe to
    /// run concurrently with executions and other analyses.
    pub fn analyze(&self, source: &str, language: Language) -> AnalysisReport {
        self.analysis.analyze(&Submission::new(source, language))
    }

    /// Pre-check a submission without running it.
    pub fn validate(&self, source: &str, language: Language) -> Verdict {
        self.validator.check(&Submission::new(source, language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{ExecutionStatus, Severity};

    fn orchestrator() -> Orchestrator {
        let config = SandboxConfig {
            workspace_root: std::env::temp_dir().join("codebox_test_orchestrator"),
            ..SandboxConfig::default()
        };
        Orchestrator::new(config).unwrap()
    }

    #[test]
    fn test_blocked_submission_never_reaches_sandbox() {
        let orch = orchestrator();
        let outcome = orch.submit("import os\nos.system('ls')\n", Language::Python);
        assert_eq!(outcome.status, ExecutionStatus::Blocked);
        assert!(!outcome.violations.is_empty());
        assert_eq!(outcome.exit_code, None);
    }

    #[test]
    fn test_validate_exposed_separately() {
        let orch = orchestrator();
        let verdict = orch.validate("eval('1')", Language::Python);
        assert!(!verdict.allowed);
        assert!(verdict
            .violations
            .iter()
            .any(|v| v.severity == Severity::Block));
    }

    #[test]
    fn test_analyze_does_not_gate_on_verdict() {
        let orch = orchestrator();
        // Rejected by the validator, still analyzable.
        let report = orch.analyze("import os\nprint(os.name)\n", Language::Python);
        assert!((1..=10).contains(&report.quality_score));
    }

    #[test]
    fn test_rules_file_override() {
        let dir = std::env::temp_dir().join("codebox_test_orch_rules");
        std::fs::create_dir_all(&dir).unwrap();
        let rules_path = dir.join("rules.json");
        std::fs::write(
            &rules_path,
            r#"[{"pattern": "forbidden_word", "description": "test rule",
                 "severity": "block", "languages": ["python"]}]"#,
        )
        .unwrap();

        let config = SandboxConfig {
            workspace_root: dir.join("ws"),
            rules_file: Some(rules_path),
            ..SandboxConfig::default()
        };
        let orch = Orchestrator::new(config).unwrap();
        assert!(!orch.validate("forbidden_word", Language::Python).allowed);
        // The builtin table was replaced wholesale.
        assert!(orch.validate("eval('1')", Language::Python).allowed);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
